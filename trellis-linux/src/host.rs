use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Weak;

use gtk4::glib;
use gtk4::prelude::*;
use libadwaita as adw;
use libadwaita::prelude::*;
use webkit6::prelude::*;

use trellis_core::download::{DownloadId, Progress};
use trellis_core::host::{Hook, Host, HostEvent, Propagation, WindowId, WindowOptions};
use trellis_core::menu::{EditCommand, Menu, Role};
use trellis_core::window_state::WindowState;
use trellis_core::ShellError;

use crate::downloads;
use crate::launcher::LauncherEntry;
use crate::menu;
use crate::runtime::Runtime;
use crate::window::{self, MainWindow};

const MAIN_WINDOW: WindowId = WindowId(1);

/// `Host` backed by GTK 4, libadwaita, and WebKitGTK.
pub struct GtkHost {
    app: adw::Application,
    app_name: String,
    runtime: Weak<Runtime>,
    main: RefCell<Option<MainWindow>>,
    registered: HookSet,
    launcher: LauncherEntry,
    quit_scheduled: Cell<bool>,
}

impl GtkHost {
    pub fn new(app: &adw::Application, app_id: &str, app_name: &str, runtime: Weak<Runtime>) -> Self {
        GtkHost {
            app: app.clone(),
            app_name: app_name.to_string(),
            runtime,
            main: RefCell::new(None),
            registered: HookSet::default(),
            launcher: LauncherEntry::new(app_id),
            quit_scheduled: Cell::new(false),
        }
    }

    pub fn app(&self) -> &adw::Application {
        &self.app
    }

    pub fn main_window(&self) -> Option<MainWindow> {
        self.main.borrow().clone()
    }

    pub fn is_registered(&self, hook: Hook) -> bool {
        self.registered.contains(hook)
    }

    fn window_for(&self, id: WindowId) -> Option<MainWindow> {
        self.main_window().filter(|main| main.id == id)
    }

    pub fn execute_editing(&self, command: EditCommand) {
        if let Some(main) = self.main_window() {
            main.webview
                .execute_editing_command(menu::editing_command(command));
        }
    }

    pub fn perform_role(&self, role: Role) {
        let main = self.main_window();
        match role {
            Role::Minimize => {
                if let Some(main) = main {
                    main.window.minimize();
                }
            }
            Role::Zoom => {
                if let Some(main) = main {
                    if main.window.is_maximized() {
                        main.window.unmaximize();
                    } else {
                        main.window.maximize();
                    }
                }
            }
            Role::Close => {
                if let Some(main) = main {
                    main.window.close();
                }
            }
            Role::About => self.show_about(),
            Role::Hide => self.hide_app(),
            Role::Unhide => {
                if let Some(main) = main {
                    main.window.present();
                }
            }
            Role::Quit => self.quit(),
            Role::HideOthers => log::debug!("Hide Others has no effect on this platform"),
        }
    }

    fn show_about(&self) {
        let dialog = adw::AboutDialog::builder()
            .application_name(self.app_name.as_str())
            .version(env!("CARGO_PKG_VERSION"))
            .license_type(gtk4::License::Gpl30Only)
            .build();
        match self.main_window() {
            Some(main) => dialog.present(Some(&main.window)),
            None => dialog.present(None::<&gtk4::Widget>),
        }
    }

    fn connect_app_hook(&self, hook: Hook) -> bool {
        let runtime = self.runtime.clone();
        match hook {
            Hook::Ready => {
                self.app.connect_startup(move |_| {
                    emit(&runtime, HostEvent::Ready);
                });
            }
            Hook::Activate => {
                let launched = Cell::new(false);
                self.app.connect_activate(move |_| {
                    // The first activation is the launch itself.
                    if !launched.replace(true) {
                        return;
                    }
                    emit(&runtime, HostEvent::Activate);
                });
            }
            Hook::WindowAllClosed => {
                self.app.connect_window_removed(move |app, _| {
                    if app.windows().is_empty() {
                        emit(&runtime, HostEvent::WindowAllClosed);
                    }
                });
            }
            Hook::BeforeQuit => {
                // `quit` drives before-quit itself; the session ending
                // runs the same sequence.
                self.app.connect_query_end(move |_| {
                    if let Some(rt) = runtime.upgrade() {
                        rt.finish_quit();
                    }
                });
            }
            _ => unreachable!("{} is a window hook", hook.name()),
        }
        true
    }

    /// Connect a window hook's signals. `false` when nothing was connected.
    fn connect_window_hook(&self, hook: Hook, main: &MainWindow) -> bool {
        let runtime = self.runtime.clone();
        let id = main.id;
        match hook {
            Hook::Close => {
                main.window.connect_close_request(move |_| {
                    match emit(&runtime, HostEvent::Close { window: id }) {
                        Propagation::Proceed => glib::Propagation::Proceed,
                        Propagation::Stop => glib::Propagation::Stop,
                    }
                });
            }
            Hook::DomReady => {
                main.webview.connect_load_changed(move |_, event| {
                    if event == webkit6::LoadEvent::Finished {
                        emit(&runtime, HostEvent::DomReady { window: id });
                    }
                });
            }
            Hook::LoadFailed => {
                main.webview
                    .connect_load_failed(move |_, _event, uri, error| {
                        // Navigating away, or a navigation turning into a
                        // download, are not failures.
                        if error.matches(webkit6::NetworkError::Cancelled)
                            || error.matches(webkit6::PolicyError::FrameLoadInterruptedByPolicyChange)
                        {
                            return false;
                        }
                        emit(
                            &runtime,
                            HostEvent::LoadFailed {
                                url: uri.to_string(),
                                message: error.to_string(),
                            },
                        );
                        false
                    });
            }
            Hook::NewWindow => {
                main.webview
                    .connect_decide_policy(move |_, decision, decision_type| {
                        if decision_type != webkit6::PolicyDecisionType::NewWindowAction {
                            return false;
                        }
                        let url = decision
                            .downcast_ref::<webkit6::NavigationPolicyDecision>()
                            .and_then(|nav| nav.navigation_action())
                            .and_then(|mut action| action.request())
                            .and_then(|request| request.uri());
                        match url {
                            Some(url) => {
                                if emit(&runtime, HostEvent::NewWindow { url: url.to_string() })
                                    == Propagation::Stop
                                {
                                    decision.ignore();
                                    return true;
                                }
                                false
                            }
                            None => {
                                decision.ignore();
                                true
                            }
                        }
                    });
            }
            Hook::WillDownload => {
                let Some(session) = main.webview.network_session() else {
                    log::warn!("Web view has no network session; downloads untracked");
                    return false;
                };
                let next_download = Cell::new(0u64);
                session.connect_download_started(move |_, download| {
                    let id = DownloadId(next_download.get() + 1);
                    next_download.set(id.0);
                    downloads::track(download, id, runtime.clone());
                });
            }
            // Delivered by the per-download wiring of `WillDownload`.
            Hook::DownloadUpdated | Hook::DownloadDone => {}
            _ => unreachable!("{} is an application hook", hook.name()),
        }
        true
    }
}

impl Host for GtkHost {
    fn register(&self, hook: Hook) {
        self.registered.register(hook, || {
            if Hook::APP.contains(&hook) {
                self.connect_app_hook(hook)
            } else if let Some(main) = self.main_window() {
                self.connect_window_hook(hook, &main)
            } else {
                log::warn!("'{}' registered before the main window exists", hook.name());
                false
            }
        });
    }

    fn create_window(&self, options: &WindowOptions) -> Result<WindowId, ShellError> {
        if self.main.borrow().is_some() {
            return Err(ShellError::WindowCreation(
                "main window already exists".to_string(),
            ));
        }
        let main = window::build_window(&self.app, MAIN_WINDOW, options);
        if options.show {
            main.window.present();
        }
        *self.main.borrow_mut() = Some(main);
        Ok(MAIN_WINDOW)
    }

    fn load_url(&self, window: WindowId, url: &str) -> Result<(), ShellError> {
        let main = self.window_for(window).ok_or_else(|| ShellError::Navigation {
            url: url.to_string(),
            message: "no such window".to_string(),
        })?;
        main.webview.load_uri(url);
        Ok(())
    }

    fn insert_css(&self, window: WindowId, css: &str) -> Result<(), ShellError> {
        let main = self
            .window_for(window)
            .ok_or_else(|| ShellError::StyleInjection("no such window".to_string()))?;
        let sheet = webkit6::UserStyleSheet::new(
            css,
            webkit6::UserContentInjectedFrames::AllFrames,
            webkit6::UserStyleLevel::User,
            &[],
            &[],
        );
        main.content.remove_all_style_sheets();
        main.content.add_style_sheet(&sheet);
        Ok(())
    }

    fn show_window(&self, window: WindowId) {
        if let Some(main) = self.window_for(window) {
            main.window.present();
        }
    }

    fn hide_app(&self) {
        for window in self.app.windows() {
            window.set_visible(false);
        }
    }

    fn quit(&self) {
        if self.quit_scheduled.replace(true) {
            return;
        }
        let runtime = self.runtime.clone();
        glib::idle_add_local_once(move || {
            if let Some(rt) = runtime.upgrade() {
                rt.finish_quit();
            }
        });
    }

    fn is_fullscreen(&self, window: WindowId) -> bool {
        self.window_for(window)
            .map(|main| main.window.is_fullscreen())
            .unwrap_or(false)
    }

    fn bounds(&self, window: WindowId) -> WindowState {
        match self.window_for(window) {
            // GTK 4 does not expose the window position.
            Some(main) => WindowState::sized(
                main.window.width().max(0) as u32,
                main.window.height().max(0) as u32,
            ),
            None => WindowState::sized(0, 0),
        }
    }

    fn set_progress(&self, _window: WindowId, progress: Progress) {
        self.launcher.update(progress);
    }

    fn set_application_menu(&self, menu: &Menu) {
        menu::install_actions(&self.app, menu, &self.runtime);
        let model = menu::build_model(menu, &self.app_name);
        if let Some(main) = self.main_window() {
            main.menu_bar.set_menu_model(Some(&model));
        }
    }

    fn show_error_box(&self, title: &str, message: &str) {
        let dialog = adw::AlertDialog::builder()
            .heading(title)
            .body(message)
            .build();
        dialog.add_response("close", "Close");
        dialog.set_default_response(Some("close"));
        dialog.set_close_response("close");
        match self.main_window() {
            Some(main) => dialog.present(Some(&main.window)),
            None => dialog.present(None::<&gtk4::Widget>),
        }
    }

    fn open_external(&self, url: &str) -> Result<(), ShellError> {
        log::info!("Opening {} in the default browser", url);
        open::that_detached(url).map_err(|e| ShellError::ExternalOpen {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}

/// Hooks whose signals are connected. A hook is connected at most once, and
/// a hook whose signals could not be connected stays unregistered.
#[derive(Default)]
struct HookSet {
    hooks: RefCell<HashSet<Hook>>,
}

impl HookSet {
    fn contains(&self, hook: Hook) -> bool {
        self.hooks.borrow().contains(&hook)
    }

    fn register(&self, hook: Hook, connect: impl FnOnce() -> bool) {
        if !self.hooks.borrow_mut().insert(hook) {
            return;
        }
        if !connect() {
            self.hooks.borrow_mut().remove(&hook);
        }
    }
}

fn emit(runtime: &Weak<Runtime>, event: HostEvent) -> Propagation {
    match runtime.upgrade() {
        Some(rt) => rt.dispatch(event),
        None => Propagation::Proceed,
    }
}
