//! Per-platform behavior deltas, resolved once at startup.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    MacOs,
    Linux,
    Windows,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Platform::MacOs
        } else if cfg!(target_os = "windows") {
            Platform::Windows
        } else {
            Platform::Linux
        }
    }
}

/// What closing the main window does while the app is still running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseBehavior {
    /// Veto the close and hide the application.
    HideApp,
    /// Veto the close and quit the application instead.
    QuitApp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleBarStyle {
    Default,
    /// Traffic lights inset into the content, no visible title.
    HiddenInset,
}

/// Capability table for one platform.
#[derive(Debug, Clone, PartialEq)]
pub struct PlatformProfile {
    pub platform: Platform,
    /// Themed icon name for the window; only set where the window manager
    /// does not take it from the application bundle.
    pub window_icon: Option<&'static str>,
    pub title_bar: TitleBarStyle,
    pub auto_hide_menu_bar: bool,
    pub close_behavior: CloseBehavior,
    /// Prepend the About/Hide/Quit submenu named after the app.
    pub identity_menu: bool,
    /// Vertical offset of attached sheets, in points.
    pub sheet_offset: Option<f64>,
}

impl PlatformProfile {
    pub fn for_platform(platform: Platform) -> Self {
        match platform {
            Platform::MacOs => PlatformProfile {
                platform,
                window_icon: None,
                title_bar: TitleBarStyle::HiddenInset,
                auto_hide_menu_bar: true,
                close_behavior: CloseBehavior::HideApp,
                identity_menu: true,
                sheet_offset: Some(40.0),
            },
            Platform::Linux => PlatformProfile {
                platform,
                window_icon: Some("com.trellis.Trellis"),
                title_bar: TitleBarStyle::HiddenInset,
                auto_hide_menu_bar: true,
                close_behavior: CloseBehavior::QuitApp,
                identity_menu: false,
                sheet_offset: None,
            },
            Platform::Windows => PlatformProfile {
                platform,
                window_icon: None,
                title_bar: TitleBarStyle::HiddenInset,
                auto_hide_menu_bar: true,
                close_behavior: CloseBehavior::QuitApp,
                identity_menu: false,
                sheet_offset: None,
            },
        }
    }

    pub fn current() -> Self {
        Self::for_platform(Platform::current())
    }
}
