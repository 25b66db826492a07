use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::download::Progress;
use crate::error::ShellError;
use crate::host::{Hook, Host, WindowId, WindowOptions};
use crate::menu::Menu;
use crate::store::StateStore;
use crate::window_state::WindowState;

/// Every request the controller made, in order.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Register(Hook),
    CreateWindow(WindowOptions),
    LoadUrl(WindowId, String),
    InsertCss(WindowId),
    ShowWindow(WindowId),
    HideApp,
    Quit,
    SetProgress(WindowId, Progress),
    SetMenu(Menu),
    ErrorBox(String, String),
    OpenExternal(String),
}

/// Host stand-in that records calls and answers queries from its fields.
#[derive(Default)]
pub(crate) struct FakeHost {
    pub calls: RefCell<Vec<Call>>,
    pub fullscreen: Cell<bool>,
    pub bounds: Cell<Option<WindowState>>,
    pub fail_load: Cell<bool>,
    pub fail_css: Cell<bool>,
    pub fail_open: Cell<bool>,
    next_window: Cell<u32>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.borrow().iter().filter(|c| pred(c)).count()
    }

    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }
}

impl Host for FakeHost {
    fn register(&self, hook: Hook) {
        self.record(Call::Register(hook));
    }

    fn create_window(&self, options: &WindowOptions) -> Result<WindowId, ShellError> {
        self.record(Call::CreateWindow(options.clone()));
        let id = self.next_window.get() + 1;
        self.next_window.set(id);
        Ok(WindowId(id))
    }

    fn load_url(&self, window: WindowId, url: &str) -> Result<(), ShellError> {
        self.record(Call::LoadUrl(window, url.to_string()));
        if self.fail_load.get() {
            return Err(ShellError::Navigation {
                url: url.to_string(),
                message: "refused".to_string(),
            });
        }
        Ok(())
    }

    fn insert_css(&self, window: WindowId, _css: &str) -> Result<(), ShellError> {
        self.record(Call::InsertCss(window));
        if self.fail_css.get() {
            return Err(ShellError::StyleInjection("page gone".to_string()));
        }
        Ok(())
    }

    fn show_window(&self, window: WindowId) {
        self.record(Call::ShowWindow(window));
    }

    fn hide_app(&self) {
        self.record(Call::HideApp);
    }

    fn quit(&self) {
        self.record(Call::Quit);
    }

    fn is_fullscreen(&self, _window: WindowId) -> bool {
        self.fullscreen.get()
    }

    fn bounds(&self, _window: WindowId) -> WindowState {
        self.bounds
            .get()
            .unwrap_or_else(|| WindowState::sized(1000, 800))
    }

    fn set_progress(&self, window: WindowId, progress: Progress) {
        self.record(Call::SetProgress(window, progress));
    }

    fn set_application_menu(&self, menu: &Menu) {
        self.record(Call::SetMenu(menu.clone()));
    }

    fn show_error_box(&self, title: &str, message: &str) {
        self.record(Call::ErrorBox(title.to_string(), message.to_string()));
    }

    fn open_external(&self, url: &str) -> Result<(), ShellError> {
        self.record(Call::OpenExternal(url.to_string()));
        if self.fail_open.get() {
            return Err(ShellError::ExternalOpen {
                url: url.to_string(),
                message: "no handler".to_string(),
            });
        }
        Ok(())
    }
}

/// In-memory store whose contents stay observable after it is handed to
/// the controller.
#[derive(Clone, Default)]
pub(crate) struct MemoryStore {
    pub slot: Rc<RefCell<Option<WindowState>>>,
    pub writes: Rc<Cell<usize>>,
}

impl MemoryStore {
    pub fn with(state: WindowState) -> Self {
        let store = Self::default();
        *store.slot.borrow_mut() = Some(state);
        store
    }
}

impl StateStore for MemoryStore {
    fn load_window_state(&self) -> Option<WindowState> {
        *self.slot.borrow()
    }

    fn save_window_state(&mut self, state: &WindowState) -> Result<(), ShellError> {
        *self.slot.borrow_mut() = Some(*state);
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}
