//! Static application menu template.

use crate::platform::PlatformProfile;

/// Editing commands forwarded to the focused web content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditCommand {
    Undo,
    Redo,
    Cut,
    Copy,
    Paste,
    SelectAll,
}

impl EditCommand {
    pub const ALL: [EditCommand; 6] = [
        EditCommand::Undo,
        EditCommand::Redo,
        EditCommand::Cut,
        EditCommand::Copy,
        EditCommand::Paste,
        EditCommand::SelectAll,
    ];

    /// Stable identifier, usable as an action name.
    pub fn id(self) -> &'static str {
        match self {
            EditCommand::Undo => "undo",
            EditCommand::Redo => "redo",
            EditCommand::Cut => "cut",
            EditCommand::Copy => "copy",
            EditCommand::Paste => "paste",
            EditCommand::SelectAll => "select-all",
        }
    }
}

/// Menu items whose behavior is supplied by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Minimize,
    Zoom,
    Close,
    About,
    Hide,
    HideOthers,
    Unhide,
    Quit,
}

impl Role {
    pub fn id(self) -> &'static str {
        match self {
            Role::Minimize => "minimize",
            Role::Zoom => "zoom",
            Role::Close => "close",
            Role::About => "about",
            Role::Hide => "hide",
            Role::HideOthers => "hide-others",
            Role::Unhide => "unhide",
            Role::Quit => "quit",
        }
    }

    pub fn label(self, app_name: &str) -> String {
        match self {
            Role::Minimize => "Minimize".to_string(),
            Role::Zoom => "Zoom".to_string(),
            Role::Close => "Close Window".to_string(),
            Role::About => format!("About {}", app_name),
            Role::Hide => format!("Hide {}", app_name),
            Role::HideOthers => "Hide Others".to_string(),
            Role::Unhide => "Show All".to_string(),
            Role::Quit => format!("Quit {}", app_name),
        }
    }

    pub fn accelerator(self) -> Option<&'static str> {
        match self {
            Role::Minimize => Some("CmdOrCtrl+M"),
            Role::Close => Some("CmdOrCtrl+W"),
            Role::Hide => Some("CmdOrCtrl+H"),
            Role::HideOthers => Some("CmdOrCtrl+Alt+H"),
            Role::Quit => Some("CmdOrCtrl+Q"),
            Role::Zoom | Role::About | Role::Unhide => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuItem {
    Command {
        label: &'static str,
        accelerator: &'static str,
        command: EditCommand,
    },
    Role(Role),
    Separator,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submenu {
    pub label: String,
    pub items: Vec<MenuItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Menu {
    pub submenus: Vec<Submenu>,
}

impl Menu {
    /// Every role reachable from the menu, in menu order.
    pub fn roles(&self) -> impl Iterator<Item = Role> + '_ {
        self.submenus.iter().flat_map(|s| &s.items).filter_map(|item| match item {
            MenuItem::Role(role) => Some(*role),
            _ => None,
        })
    }
}

/// Build the application menu for `profile`.
pub fn application_menu(profile: &PlatformProfile, app_name: &str) -> Menu {
    let mut submenus = Vec::with_capacity(3);

    if profile.identity_menu {
        submenus.push(Submenu {
            label: app_name.to_string(),
            items: vec![
                MenuItem::Role(Role::About),
                MenuItem::Separator,
                MenuItem::Role(Role::Hide),
                MenuItem::Role(Role::HideOthers),
                MenuItem::Role(Role::Unhide),
                MenuItem::Separator,
                MenuItem::Role(Role::Quit),
            ],
        });
    }

    submenus.push(Submenu {
        label: "Edit".to_string(),
        items: vec![
            command("Undo", "CmdOrCtrl+Z", EditCommand::Undo),
            command("Redo", "Shift+CmdOrCtrl+Z", EditCommand::Redo),
            MenuItem::Separator,
            command("Cut", "CmdOrCtrl+X", EditCommand::Cut),
            command("Copy", "CmdOrCtrl+C", EditCommand::Copy),
            command("Paste", "CmdOrCtrl+V", EditCommand::Paste),
            command("Select All", "CmdOrCtrl+A", EditCommand::SelectAll),
        ],
    });

    submenus.push(Submenu {
        label: "Window".to_string(),
        items: vec![
            MenuItem::Role(Role::Minimize),
            MenuItem::Role(Role::Zoom),
            MenuItem::Separator,
            MenuItem::Role(Role::Close),
        ],
    });

    Menu { submenus }
}

fn command(label: &'static str, accelerator: &'static str, command: EditCommand) -> MenuItem {
    MenuItem::Command {
        label,
        accelerator,
        command,
    }
}

/// Developer shortcuts, active only in debug builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugAction {
    ToggleDevTools,
    Reload,
}

impl DebugAction {
    pub const ALL: [DebugAction; 2] = [DebugAction::ToggleDevTools, DebugAction::Reload];

    pub fn id(self) -> &'static str {
        match self {
            DebugAction::ToggleDevTools => "toggle-devtools",
            DebugAction::Reload => "reload",
        }
    }

    pub fn accelerators(self) -> &'static [&'static str] {
        match self {
            DebugAction::ToggleDevTools => &["F12", "CmdOrCtrl+Shift+I"],
            DebugAction::Reload => &["F5", "CmdOrCtrl+R"],
        }
    }
}

pub fn debug_tools_enabled() -> bool {
    cfg!(debug_assertions)
}

/// A parsed `Modifier+...+Key` accelerator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accelerator {
    /// Command on macOS, Control elsewhere.
    pub primary: bool,
    pub shift: bool,
    pub alt: bool,
    /// Key name as written, e.g. `Z` or `F12`.
    pub key: String,
}

impl Accelerator {
    pub fn parse(text: &str) -> Option<Self> {
        let mut accel = Accelerator {
            primary: false,
            shift: false,
            alt: false,
            key: String::new(),
        };
        let parts: Vec<&str> = text.split('+').map(str::trim).collect();
        let (key, modifiers) = parts.split_last()?;
        if key.is_empty() {
            return None;
        }
        for modifier in modifiers {
            match modifier.to_ascii_lowercase().as_str() {
                "cmdorctrl" | "commandorcontrol" | "cmd" | "command" | "ctrl" | "control" => {
                    accel.primary = true
                }
                "shift" => accel.shift = true,
                "alt" | "option" => accel.alt = true,
                _ => return None,
            }
        }
        accel.key = key.to_string();
        Some(accel)
    }
}
