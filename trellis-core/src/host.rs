//! Contract between the controller and the windowing/browser runtime.
//!
//! The host owns every native object. It reports what happens as
//! [`HostEvent`]s, one per registered [`Hook`], and carries out the
//! requests the controller makes through [`Host`].

use crate::download::{DownloadId, DownloadState, Progress};
use crate::error::ShellError;
use crate::menu::Menu;
use crate::platform::TitleBarStyle;
use crate::window_state::WindowState;

/// Signals the controller listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hook {
    Ready,
    WindowAllClosed,
    Activate,
    BeforeQuit,
    Close,
    DomReady,
    LoadFailed,
    NewWindow,
    WillDownload,
    DownloadUpdated,
    DownloadDone,
}

impl Hook {
    /// Application-level hooks, registered before the host starts.
    pub const APP: [Hook; 4] = [
        Hook::Ready,
        Hook::WindowAllClosed,
        Hook::Activate,
        Hook::BeforeQuit,
    ];

    /// Hooks on the main window and its content, registered once the
    /// window exists.
    pub const WINDOW: [Hook; 7] = [
        Hook::Close,
        Hook::DomReady,
        Hook::LoadFailed,
        Hook::NewWindow,
        Hook::WillDownload,
        Hook::DownloadUpdated,
        Hook::DownloadDone,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Hook::Ready => "ready",
            Hook::WindowAllClosed => "window-all-closed",
            Hook::Activate => "activate",
            Hook::BeforeQuit => "before-quit",
            Hook::Close => "close",
            Hook::DomReady => "dom-ready",
            Hook::LoadFailed => "load-failed",
            Hook::NewWindow => "new-window",
            Hook::WillDownload => "will-download",
            Hook::DownloadUpdated => "download-updated",
            Hook::DownloadDone => "download-done",
        }
    }
}

/// Opaque handle of a host window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowId(pub u32);

#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    Ready,
    WindowAllClosed,
    Activate,
    BeforeQuit,
    Close { window: WindowId },
    DomReady { window: WindowId },
    LoadFailed { url: String, message: String },
    NewWindow { url: String },
    WillDownload { id: DownloadId, total_bytes: u64 },
    DownloadUpdated { id: DownloadId, received_bytes: u64 },
    DownloadDone { id: DownloadId, state: DownloadState },
}

impl HostEvent {
    pub fn hook(&self) -> Hook {
        match self {
            HostEvent::Ready => Hook::Ready,
            HostEvent::WindowAllClosed => Hook::WindowAllClosed,
            HostEvent::Activate => Hook::Activate,
            HostEvent::BeforeQuit => Hook::BeforeQuit,
            HostEvent::Close { .. } => Hook::Close,
            HostEvent::DomReady { .. } => Hook::DomReady,
            HostEvent::LoadFailed { .. } => Hook::LoadFailed,
            HostEvent::NewWindow { .. } => Hook::NewWindow,
            HostEvent::WillDownload { .. } => Hook::WillDownload,
            HostEvent::DownloadUpdated { .. } => Hook::DownloadUpdated,
            HostEvent::DownloadDone { .. } => Hook::DownloadDone,
        }
    }
}

/// Whether the host should carry out its default action for an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    Proceed,
    Stop,
}

/// Isolation policy for the embedded page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebPreferences {
    /// Page scripts may reach host APIs (never enabled by the shell).
    pub host_api_access: bool,
    /// Script run in the top frame before any page script.
    pub preload_script: &'static str,
    pub plugins: bool,
    pub developer_extras: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WindowOptions {
    pub title: String,
    pub state: WindowState,
    pub min_width: u32,
    pub min_height: u32,
    /// Created hidden, revealed on first dom-ready.
    pub show: bool,
    pub icon: Option<&'static str>,
    pub title_bar: TitleBarStyle,
    pub auto_hide_menu_bar: bool,
    pub sheet_offset: Option<f64>,
    pub web: WebPreferences,
}

/// Windowing and browser runtime driven by the controller.
///
/// Methods take `&self`; hosts keep their native state behind interior
/// mutability. Implementations must not dispatch events back into the
/// controller from inside these calls.
pub trait Host {
    /// Start delivering events for `hook`.
    fn register(&self, hook: Hook);

    fn create_window(&self, options: &WindowOptions) -> Result<WindowId, ShellError>;

    fn load_url(&self, window: WindowId, url: &str) -> Result<(), ShellError>;

    fn insert_css(&self, window: WindowId, css: &str) -> Result<(), ShellError>;

    fn show_window(&self, window: WindowId);

    /// Hide every window of the application without quitting.
    fn hide_app(&self);

    /// Begin quitting: deliver `BeforeQuit`, close windows, stop the loop.
    fn quit(&self);

    fn is_fullscreen(&self, window: WindowId) -> bool;

    /// Current geometry as the window manager reports it.
    fn bounds(&self, window: WindowId) -> WindowState;

    fn set_progress(&self, window: WindowId, progress: Progress);

    fn set_application_menu(&self, menu: &Menu);

    /// Modal error dialog.
    fn show_error_box(&self, title: &str, message: &str);

    /// Hand `url` to the default browser.
    fn open_external(&self, url: &str) -> Result<(), ShellError>;
}
