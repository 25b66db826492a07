use crate::assets;
use crate::download::{DownloadId, DownloadState, DownloadTracker, Progress};
use crate::error::ShellError;
use crate::host::{Hook, Host, HostEvent, Propagation, WebPreferences, WindowId, WindowOptions};
use crate::menu;
use crate::platform::{CloseBehavior, PlatformProfile};
use crate::store::StateStore;
use crate::window_state::WindowState;
use crate::ShellConfig;

/// Process lifecycle. `Running -> Quitting` happens once and never reverts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Running,
    Quitting,
}

/// Progress of the initial navigation. Only a failure while `Pending` is
/// fatal; later navigations belong to the page. `Failed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Navigation {
    NotStarted,
    Pending,
    Settled,
    Failed,
}

/// Mutable state shared by every event handler.
#[derive(Debug)]
pub struct AppState {
    pub lifecycle: Lifecycle,
    pub main_window: Option<WindowId>,
    navigation: Navigation,
    downloads: DownloadTracker,
}

impl AppState {
    fn new() -> Self {
        AppState {
            lifecycle: Lifecycle::Running,
            main_window: None,
            navigation: Navigation::NotStarted,
            downloads: DownloadTracker::default(),
        }
    }

    pub fn active_downloads(&self) -> usize {
        self.downloads.active()
    }
}

/// Window lifecycle controller and host integration handlers.
pub struct Shell {
    config: ShellConfig,
    profile: PlatformProfile,
    store: Box<dyn StateStore>,
    state: AppState,
}

impl Shell {
    pub fn new(config: ShellConfig, profile: PlatformProfile, store: Box<dyn StateStore>) -> Self {
        Shell {
            config,
            profile,
            store,
            state: AppState::new(),
        }
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    pub fn profile(&self) -> &PlatformProfile {
        &self.profile
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.state.lifecycle
    }

    /// Register the application-level hooks. Window hooks follow once the
    /// main window exists.
    pub fn install(&self, host: &dyn Host) {
        for hook in Hook::APP {
            host.register(hook);
        }
    }

    /// Handle one host event to completion.
    ///
    /// `Propagation::Stop` asks the host to skip its default action (closing
    /// the window, opening a new one).
    pub fn dispatch(
        &mut self,
        host: &dyn Host,
        event: HostEvent,
    ) -> Result<Propagation, ShellError> {
        log::debug!("Host event: {}", event.hook().name());
        match event {
            HostEvent::Ready => self.on_ready(host)?,
            HostEvent::WindowAllClosed => host.quit(),
            HostEvent::Activate => {
                if let Some(window) = self.state.main_window {
                    host.show_window(window);
                }
            }
            HostEvent::BeforeQuit => self.begin_quit(),
            HostEvent::Close { window } => return Ok(self.on_close(host, window)),
            HostEvent::DomReady { window } => self.on_dom_ready(host, window)?,
            HostEvent::LoadFailed { url, message } => self.on_load_failed(url, message)?,
            HostEvent::NewWindow { url } => {
                if let Err(e) = host.open_external(&url) {
                    log::warn!("{}", e);
                }
                return Ok(Propagation::Stop);
            }
            HostEvent::WillDownload { id, total_bytes } => {
                log::info!("Download {:?} started ({} bytes)", id, total_bytes);
                self.state.downloads.start(id, total_bytes);
            }
            HostEvent::DownloadUpdated { id, received_bytes } => {
                match (self.state.main_window, self.state.downloads.progress(id, received_bytes)) {
                    (Some(window), Some(progress)) => host.set_progress(window, progress),
                    (_, None) => log::debug!("Update for unknown download {:?}", id),
                    (None, _) => {}
                }
            }
            HostEvent::DownloadDone { id, state } => self.on_download_done(host, id, state),
        }
        Ok(Propagation::Proceed)
    }

    fn on_ready(&mut self, host: &dyn Host) -> Result<(), ShellError> {
        if self.state.main_window.is_some() {
            log::warn!("Ready delivered twice; keeping the existing window");
            return Ok(());
        }
        self.create_main_window(host)?;
        let menu = menu::application_menu(&self.profile, &self.config.app_name);
        host.set_application_menu(&menu);
        Ok(())
    }

    /// Create the hidden main window from the stored geometry and start
    /// loading the home URL.
    pub fn create_main_window(&mut self, host: &dyn Host) -> Result<WindowId, ShellError> {
        let options = self.window_options();
        log::info!(
            "Creating main window {}x{} at {:?},{:?}",
            options.state.width,
            options.state.height,
            options.state.x,
            options.state.y
        );
        let window = host.create_window(&options)?;
        self.state.main_window = Some(window);

        for hook in Hook::WINDOW {
            host.register(hook);
        }

        let url = url::Url::parse(&self.config.home_url).map_err(|e| ShellError::Navigation {
            url: self.config.home_url.clone(),
            message: e.to_string(),
        })?;
        self.state.navigation = Navigation::Pending;
        if let Err(e) = host.load_url(window, url.as_str()) {
            self.state.navigation = Navigation::Failed;
            return Err(e);
        }
        Ok(window)
    }

    /// Options for the main window: stored geometry (or the default size),
    /// the minimum size floor, platform chrome, and the isolation policy.
    pub fn window_options(&self) -> WindowOptions {
        let state = self
            .store
            .load_window_state()
            .unwrap_or_else(|| {
                WindowState::sized(self.config.default_width, self.config.default_height)
            })
            .or_default_size(self.config.default_width, self.config.default_height);

        WindowOptions {
            title: self.config.app_name.clone(),
            state,
            min_width: self.config.min_width,
            min_height: self.config.min_height,
            show: false,
            icon: self.profile.window_icon,
            title_bar: self.profile.title_bar,
            auto_hide_menu_bar: self.profile.auto_hide_menu_bar,
            sheet_offset: self.profile.sheet_offset,
            web: WebPreferences {
                host_api_access: false,
                preload_script: assets::PRELOAD_JS,
                plugins: true,
                developer_extras: menu::debug_tools_enabled(),
            },
        }
    }

    fn begin_quit(&mut self) {
        if self.state.lifecycle == Lifecycle::Running {
            log::info!("Quitting");
            self.state.lifecycle = Lifecycle::Quitting;
        }
    }

    fn on_close(&mut self, host: &dyn Host, window: WindowId) -> Propagation {
        match self.state.lifecycle {
            Lifecycle::Running => {
                match self.profile.close_behavior {
                    CloseBehavior::HideApp => host.hide_app(),
                    CloseBehavior::QuitApp => host.quit(),
                }
                Propagation::Stop
            }
            Lifecycle::Quitting => {
                if host.is_fullscreen(window) {
                    log::debug!("Window is full-screen; keeping previous geometry");
                } else {
                    let bounds = host
                        .bounds(window)
                        .or_default_size(self.config.default_width, self.config.default_height);
                    match self.store.save_window_state(&bounds) {
                        Ok(()) => log::info!("Saved window state {:?}", bounds),
                        Err(e) => log::warn!("Failed to save window state: {}", e),
                    }
                }
                if self.state.main_window == Some(window) {
                    self.state.main_window = None;
                }
                Propagation::Proceed
            }
        }
    }

    fn on_dom_ready(&mut self, host: &dyn Host, window: WindowId) -> Result<(), ShellError> {
        if self.state.navigation == Navigation::Failed {
            log::debug!("Ignoring dom-ready after a failed initial navigation");
            return Ok(());
        }
        host.insert_css(window, assets::BROWSER_CSS)?;
        host.show_window(window);
        self.state.navigation = Navigation::Settled;
        Ok(())
    }

    fn on_load_failed(&mut self, url: String, message: String) -> Result<(), ShellError> {
        match self.state.navigation {
            Navigation::Pending => {
                self.state.navigation = Navigation::Failed;
                Err(ShellError::Navigation { url, message })
            }
            Navigation::Failed => Ok(()),
            Navigation::NotStarted | Navigation::Settled => {
                log::warn!("Navigation to {} failed: {}", url, message);
                Ok(())
            }
        }
    }

    fn on_download_done(&mut self, host: &dyn Host, id: DownloadId, state: DownloadState) {
        self.state.downloads.finish(id);
        log::info!("Download {:?} finished: {:?}", id, state);
        if let Some(window) = self.state.main_window {
            host.set_progress(window, Progress::Cleared);
        }
        if state == DownloadState::Interrupted {
            host.show_error_box("Download error", "The download was interrupted");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::Role;
    use crate::platform::Platform;
    use crate::testing::{Call, FakeHost, MemoryStore};

    fn shell_for(platform: Platform, store: MemoryStore) -> Shell {
        Shell::new(
            ShellConfig::default(),
            PlatformProfile::for_platform(platform),
            Box::new(store),
        )
    }

    fn started(platform: Platform, store: MemoryStore) -> (Shell, FakeHost, WindowId) {
        let mut shell = shell_for(platform, store);
        let host = FakeHost::new();
        shell.install(&host);
        shell.dispatch(&host, HostEvent::Ready).unwrap();
        let window = shell.state().main_window.unwrap();
        host.clear();
        (shell, host, window)
    }

    fn quit_and_close(shell: &mut Shell, host: &FakeHost, window: WindowId) -> Propagation {
        shell.dispatch(host, HostEvent::BeforeQuit).unwrap();
        shell.dispatch(host, HostEvent::Close { window }).unwrap()
    }

    #[test]
    fn install_registers_app_hooks_only() {
        let shell = shell_for(Platform::Linux, MemoryStore::default());
        let host = FakeHost::new();
        shell.install(&host);
        let expected: Vec<Call> = Hook::APP.iter().map(|h| Call::Register(*h)).collect();
        assert_eq!(host.calls(), expected);
    }

    #[test]
    fn ready_creates_hidden_window_then_loads_home_and_sets_menu() {
        let mut shell = shell_for(Platform::Linux, MemoryStore::default());
        let host = FakeHost::new();
        shell.dispatch(&host, HostEvent::Ready).unwrap();

        let calls = host.calls();
        let options = match &calls[0] {
            Call::CreateWindow(options) => options.clone(),
            other => panic!("expected window creation, got {:?}", other),
        };
        assert!(!options.show);
        assert_eq!(options.title, "Trellis");
        assert_eq!((options.min_width, options.min_height), (400, 200));
        assert!(!options.web.host_api_access);
        assert!(options.web.plugins);
        assert_eq!(options.web.preload_script, assets::PRELOAD_JS);

        let window = shell.state().main_window.unwrap();
        assert!(calls.contains(&Call::LoadUrl(window, "https://trello.com/".to_string())));
        assert!(matches!(calls.last(), Some(Call::SetMenu(_))));
        for hook in Hook::WINDOW {
            assert!(calls.contains(&Call::Register(hook)));
        }
    }

    #[test]
    fn no_prior_state_uses_default_size_without_position() {
        let shell = shell_for(Platform::Linux, MemoryStore::default());
        let options = shell.window_options();
        assert_eq!(options.state, WindowState::sized(1000, 800));
    }

    #[test]
    fn stored_size_is_restored_exactly() {
        for (w, h) in [(400, 200), (1280, 720), (2560, 1440)] {
            let stored = WindowState {
                x: Some(10),
                y: Some(20),
                width: w,
                height: h,
            };
            let shell = shell_for(Platform::Linux, MemoryStore::with(stored));
            assert_eq!(shell.window_options().state, stored);
        }
    }

    #[test]
    fn platform_chrome_comes_from_profile() {
        let linux = shell_for(Platform::Linux, MemoryStore::default()).window_options();
        assert_eq!(linux.icon, Some("com.trellis.Trellis"));
        assert!(linux.auto_hide_menu_bar);

        let mac = shell_for(Platform::MacOs, MemoryStore::default()).window_options();
        assert_eq!(mac.icon, None);
        assert_eq!(mac.sheet_offset, Some(40.0));
    }

    #[test]
    fn ready_twice_keeps_one_window() {
        let (mut shell, host, window) = started(Platform::Linux, MemoryStore::default());
        shell.dispatch(&host, HostEvent::Ready).unwrap();
        assert_eq!(host.count(|c| matches!(c, Call::CreateWindow(_))), 0);
        assert_eq!(shell.state().main_window, Some(window));
    }

    #[test]
    fn close_while_running_hides_on_macos_without_persisting() {
        let store = MemoryStore::default();
        let (mut shell, host, window) = started(Platform::MacOs, store.clone());

        let result = shell.dispatch(&host, HostEvent::Close { window }).unwrap();

        assert_eq!(result, Propagation::Stop);
        assert_eq!(host.calls(), vec![Call::HideApp]);
        assert_eq!(store.writes.get(), 0);
        assert_eq!(shell.lifecycle(), Lifecycle::Running);
    }

    #[test]
    fn close_while_running_quits_elsewhere_without_persisting() {
        let store = MemoryStore::default();
        let (mut shell, host, window) = started(Platform::Linux, store.clone());

        let result = shell.dispatch(&host, HostEvent::Close { window }).unwrap();

        assert_eq!(result, Propagation::Stop);
        assert_eq!(host.calls(), vec![Call::Quit]);
        assert_eq!(store.writes.get(), 0);
    }

    #[test]
    fn close_while_quitting_persists_exact_bounds() {
        let store = MemoryStore::default();
        let (mut shell, host, window) = started(Platform::Linux, store.clone());
        let bounds = WindowState {
            x: Some(-300),
            y: Some(45),
            width: 1111,
            height: 666,
        };
        host.bounds.set(Some(bounds));

        assert_eq!(quit_and_close(&mut shell, &host, window), Propagation::Proceed);
        assert_eq!(*store.slot.borrow(), Some(bounds));
        assert_eq!(store.writes.get(), 1);
        assert_eq!(shell.state().main_window, None);
    }

    #[test]
    fn close_while_quitting_in_fullscreen_keeps_previous_state() {
        let previous = WindowState::sized(900, 700);
        let store = MemoryStore::with(previous);
        let (mut shell, host, window) = started(Platform::Linux, store.clone());
        host.fullscreen.set(true);
        host.bounds.set(Some(WindowState::sized(3840, 2160)));

        assert_eq!(quit_and_close(&mut shell, &host, window), Propagation::Proceed);
        assert_eq!(*store.slot.borrow(), Some(previous));
        assert_eq!(store.writes.get(), 0);
    }

    #[test]
    fn quitting_never_reverts() {
        let (mut shell, host, _) = started(Platform::Linux, MemoryStore::default());
        shell.dispatch(&host, HostEvent::BeforeQuit).unwrap();
        shell.dispatch(&host, HostEvent::BeforeQuit).unwrap();
        shell.dispatch(&host, HostEvent::Activate).unwrap();
        assert_eq!(shell.lifecycle(), Lifecycle::Quitting);
    }

    #[test]
    fn window_all_closed_quits() {
        let (mut shell, host, _) = started(Platform::MacOs, MemoryStore::default());
        shell.dispatch(&host, HostEvent::WindowAllClosed).unwrap();
        assert_eq!(host.calls(), vec![Call::Quit]);
    }

    #[test]
    fn activate_shows_main_window() {
        let (mut shell, host, window) = started(Platform::MacOs, MemoryStore::default());
        shell.dispatch(&host, HostEvent::Activate).unwrap();
        assert_eq!(host.calls(), vec![Call::ShowWindow(window)]);
    }

    #[test]
    fn dom_ready_styles_before_showing() {
        let (mut shell, host, window) = started(Platform::Linux, MemoryStore::default());
        shell.dispatch(&host, HostEvent::DomReady { window }).unwrap();
        assert_eq!(
            host.calls(),
            vec![Call::InsertCss(window), Call::ShowWindow(window)]
        );
    }

    #[test]
    fn style_injection_failure_is_fatal_and_window_stays_hidden() {
        let (mut shell, host, window) = started(Platform::Linux, MemoryStore::default());
        host.fail_css.set(true);
        let err = shell
            .dispatch(&host, HostEvent::DomReady { window })
            .unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(host.count(|c| matches!(c, Call::ShowWindow(_))), 0);
    }

    #[test]
    fn initial_navigation_failure_is_fatal() {
        let (mut shell, host, _) = started(Platform::Linux, MemoryStore::default());
        let err = shell
            .dispatch(
                &host,
                HostEvent::LoadFailed {
                    url: "https://trello.com/".to_string(),
                    message: "offline".to_string(),
                },
            )
            .unwrap_err();
        assert!(matches!(err, ShellError::Navigation { .. }));
    }

    #[test]
    fn rejected_load_request_is_fatal() {
        let mut shell = shell_for(Platform::Linux, MemoryStore::default());
        let host = FakeHost::new();
        host.fail_load.set(true);
        let err = shell.dispatch(&host, HostEvent::Ready).unwrap_err();
        assert!(matches!(err, ShellError::Navigation { .. }));
        assert_eq!(host.count(|c| matches!(c, Call::LoadUrl(..))), 1);
    }

    #[test]
    fn invalid_home_url_is_fatal() {
        let config = ShellConfig {
            home_url: "not a url".to_string(),
            ..ShellConfig::default()
        };
        let mut shell = Shell::new(
            config,
            PlatformProfile::for_platform(Platform::Linux),
            Box::new(MemoryStore::default()),
        );
        let host = FakeHost::new();
        assert!(shell.dispatch(&host, HostEvent::Ready).is_err());
        assert_eq!(host.count(|c| matches!(c, Call::LoadUrl(..))), 0);
    }

    #[test]
    fn failed_initial_navigation_never_shows_the_window() {
        let (mut shell, host, window) = started(Platform::Linux, MemoryStore::default());
        let failed = shell.dispatch(
            &host,
            HostEvent::LoadFailed {
                url: "https://trello.com/".to_string(),
                message: "offline".to_string(),
            },
        );
        assert!(failed.unwrap_err().is_fatal());

        // WebKit follows load-failed with a finished load of its error page.
        shell.dispatch(&host, HostEvent::DomReady { window }).unwrap();
        assert_eq!(host.count(|c| matches!(c, Call::ShowWindow(_))), 0);
        assert_eq!(host.count(|c| matches!(c, Call::InsertCss(_))), 0);

        // Still terminal: a second failure is not reported again.
        let again = shell.dispatch(
            &host,
            HostEvent::LoadFailed {
                url: "https://trello.com/".to_string(),
                message: "offline".to_string(),
            },
        );
        assert!(again.is_ok());
    }

    #[test]
    fn later_navigation_failures_are_ignored() {
        let (mut shell, host, window) = started(Platform::Linux, MemoryStore::default());
        shell.dispatch(&host, HostEvent::DomReady { window }).unwrap();
        let result = shell.dispatch(
            &host,
            HostEvent::LoadFailed {
                url: "https://trello.com/b/xyz".to_string(),
                message: "offline".to_string(),
            },
        );
        assert!(result.is_ok());
    }

    #[test]
    fn new_window_opens_externally_once_and_is_suppressed() {
        let (mut shell, host, _) = started(Platform::Linux, MemoryStore::default());
        let url = "https://example.com/a?b=c#d".to_string();
        let result = shell
            .dispatch(&host, HostEvent::NewWindow { url: url.clone() })
            .unwrap();
        assert_eq!(result, Propagation::Stop);
        assert_eq!(host.calls(), vec![Call::OpenExternal(url)]);
    }

    #[test]
    fn failed_external_open_still_suppresses() {
        let (mut shell, host, _) = started(Platform::Linux, MemoryStore::default());
        host.fail_open.set(true);
        let result = shell
            .dispatch(
                &host,
                HostEvent::NewWindow {
                    url: "https://example.com".to_string(),
                },
            )
            .unwrap();
        assert_eq!(result, Propagation::Stop);
        assert_eq!(host.count(|c| matches!(c, Call::CreateWindow(_))), 0);
    }

    #[test]
    fn download_progress_then_cleared() {
        let (mut shell, host, window) = started(Platform::Linux, MemoryStore::default());
        let id = DownloadId(1);
        shell
            .dispatch(&host, HostEvent::WillDownload { id, total_bytes: 1000 })
            .unwrap();
        shell
            .dispatch(&host, HostEvent::DownloadUpdated { id, received_bytes: 250 })
            .unwrap();
        shell
            .dispatch(
                &host,
                HostEvent::DownloadDone {
                    id,
                    state: DownloadState::Completed,
                },
            )
            .unwrap();

        assert_eq!(
            host.calls(),
            vec![
                Call::SetProgress(window, Progress::Fraction(0.25)),
                Call::SetProgress(window, Progress::Cleared),
            ]
        );
        assert_eq!(shell.state().active_downloads(), 0);
    }

    #[test]
    fn interrupted_download_shows_one_error() {
        let (mut shell, host, window) = started(Platform::Linux, MemoryStore::default());
        let id = DownloadId(3);
        shell
            .dispatch(&host, HostEvent::WillDownload { id, total_bytes: 10 })
            .unwrap();
        shell
            .dispatch(
                &host,
                HostEvent::DownloadDone {
                    id,
                    state: DownloadState::Interrupted,
                },
            )
            .unwrap();

        assert_eq!(
            host.calls(),
            vec![
                Call::SetProgress(window, Progress::Cleared),
                Call::ErrorBox(
                    "Download error".to_string(),
                    "The download was interrupted".to_string()
                ),
            ]
        );
    }

    #[test]
    fn cancelled_download_shows_no_error() {
        let (mut shell, host, _) = started(Platform::Linux, MemoryStore::default());
        let id = DownloadId(4);
        shell
            .dispatch(&host, HostEvent::WillDownload { id, total_bytes: 10 })
            .unwrap();
        shell
            .dispatch(
                &host,
                HostEvent::DownloadDone {
                    id,
                    state: DownloadState::Cancelled,
                },
            )
            .unwrap();
        assert_eq!(host.count(|c| matches!(c, Call::ErrorBox(..))), 0);
    }

    #[test]
    fn concurrent_downloads_write_the_shared_indicator() {
        let (mut shell, host, window) = started(Platform::Linux, MemoryStore::default());
        let (a, b) = (DownloadId(1), DownloadId(2));
        shell
            .dispatch(&host, HostEvent::WillDownload { id: a, total_bytes: 100 })
            .unwrap();
        shell
            .dispatch(&host, HostEvent::WillDownload { id: b, total_bytes: 400 })
            .unwrap();
        shell
            .dispatch(&host, HostEvent::DownloadUpdated { id: a, received_bytes: 50 })
            .unwrap();
        shell
            .dispatch(&host, HostEvent::DownloadUpdated { id: b, received_bytes: 100 })
            .unwrap();
        assert_eq!(
            host.calls(),
            vec![
                Call::SetProgress(window, Progress::Fraction(0.5)),
                Call::SetProgress(window, Progress::Fraction(0.25)),
            ]
        );
    }

    #[test]
    fn identity_menu_only_on_macos() {
        let mut shell = shell_for(Platform::MacOs, MemoryStore::default());
        let host = FakeHost::new();
        shell.dispatch(&host, HostEvent::Ready).unwrap();
        let menu = host
            .calls()
            .into_iter()
            .find_map(|c| match c {
                Call::SetMenu(menu) => Some(menu),
                _ => None,
            })
            .unwrap();
        assert_eq!(menu.submenus[0].label, "Trellis");
        assert!(menu.roles().any(|r| r == Role::Quit));
    }
}
