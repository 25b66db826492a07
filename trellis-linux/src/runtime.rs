use std::cell::{Cell, RefCell};
use std::rc::Rc;

use gtk4::prelude::*;
use libadwaita as adw;

use trellis_core::host::{HostEvent, Propagation};
use trellis_core::{Shell, ShellError};

use crate::host::GtkHost;

/// Owns the controller and the GTK host, and routes host signals into the
/// controller one at a time.
pub struct Runtime {
    shell: RefCell<Shell>,
    host: GtkHost,
    failed: Cell<bool>,
    quit_finished: Cell<bool>,
}

impl Runtime {
    pub fn new(app: &adw::Application, shell: Shell) -> Rc<Self> {
        let app_id = shell.config().app_id.clone();
        let app_name = shell.config().app_name.clone();
        Rc::new_cyclic(|weak| Runtime {
            shell: RefCell::new(shell),
            host: GtkHost::new(app, &app_id, &app_name, weak.clone()),
            failed: Cell::new(false),
            quit_finished: Cell::new(false),
        })
    }

    pub fn host(&self) -> &GtkHost {
        &self.host
    }

    pub fn install(&self) {
        self.shell.borrow().install(&self.host);
    }

    /// Deliver `event` to the controller if its hook is registered and no
    /// fatal error has stopped the application.
    pub fn dispatch(&self, event: HostEvent) -> Propagation {
        let hook = event.hook();
        if !self.host.is_registered(hook) {
            return Propagation::Proceed;
        }
        if self.failed.get() {
            log::debug!("Dropped '{}' event after a fatal error", hook.name());
            return Propagation::Proceed;
        }
        let result = match self.shell.try_borrow_mut() {
            Ok(mut shell) => shell.dispatch(&self.host, event),
            Err(_) => {
                log::error!("Dropped re-entrant '{}' event", hook.name());
                return Propagation::Proceed;
            }
        };
        match result {
            Ok(propagation) => propagation,
            Err(e) => {
                self.fail(e);
                Propagation::Proceed
            }
        }
    }

    /// Quit sequence: before-quit, close the main window (which persists
    /// its geometry), stop the main loop. Runs once.
    pub fn finish_quit(&self) {
        if self.quit_finished.replace(true) {
            return;
        }
        self.dispatch(HostEvent::BeforeQuit);
        if let Some(main) = self.host.main_window() {
            main.window.close();
        }
        self.host.app().quit();
    }

    fn fail(&self, error: ShellError) {
        if !error.is_fatal() {
            log::warn!("{}", error);
            return;
        }
        log::error!("Fatal: {}", error);
        self.failed.set(true);
        self.host.app().quit();
    }

    /// Whether a fatal error stopped the application.
    pub fn failed(&self) -> bool {
        self.failed.get()
    }
}
