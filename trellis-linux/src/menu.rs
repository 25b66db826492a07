use std::rc::Weak;

use gtk4::gio;
use gtk4::prelude::*;
use libadwaita as adw;

use trellis_core::menu::{Accelerator, EditCommand, Menu, MenuItem};

use crate::runtime::Runtime;

/// GTK accelerator string, e.g. `<Primary><Shift>z`.
pub fn gtk_accel(accel: &Accelerator) -> String {
    let mut out = String::new();
    if accel.primary {
        out.push_str("<Primary>");
    }
    if accel.shift {
        out.push_str("<Shift>");
    }
    if accel.alt {
        out.push_str("<Alt>");
    }
    if accel.key.chars().count() == 1 {
        out.push_str(&accel.key.to_lowercase());
    } else {
        out.push_str(&accel.key);
    }
    out
}

/// WebKit editing command name for an edit menu entry.
pub fn editing_command(command: EditCommand) -> &'static str {
    match command {
        EditCommand::Undo => "Undo",
        EditCommand::Redo => "Redo",
        EditCommand::Cut => "Cut",
        EditCommand::Copy => "Copy",
        EditCommand::Paste => "Paste",
        EditCommand::SelectAll => "SelectAll",
    }
}

/// Convert the template into a menu model. Separators start a new section.
pub fn build_model(menu: &Menu, app_name: &str) -> gio::Menu {
    let model = gio::Menu::new();
    for submenu in &menu.submenus {
        let sections = gio::Menu::new();
        let mut section = gio::Menu::new();
        for item in &submenu.items {
            match item {
                MenuItem::Separator => {
                    if section.n_items() > 0 {
                        sections.append_section(None, &section);
                        section = gio::Menu::new();
                    }
                }
                MenuItem::Command { label, command, .. } => {
                    section.append(Some(*label), Some(&format!("app.{}", command.id())));
                }
                MenuItem::Role(role) => {
                    section.append(
                        Some(&role.label(app_name)),
                        Some(&format!("app.{}", role.id())),
                    );
                }
            }
        }
        if section.n_items() > 0 {
            sections.append_section(None, &section);
        }
        model.append_submenu(Some(&submenu.label), &sections);
    }
    model
}

/// Register an application action for every menu entry and bind its
/// accelerator.
pub fn install_actions(app: &adw::Application, menu: &Menu, runtime: &Weak<Runtime>) {
    for item in menu.submenus.iter().flat_map(|s| &s.items) {
        match *item {
            MenuItem::Separator => {}
            MenuItem::Command {
                accelerator,
                command,
                ..
            } => {
                let action = gio::SimpleAction::new(command.id(), None);
                let runtime = runtime.clone();
                action.connect_activate(move |_, _| {
                    if let Some(rt) = runtime.upgrade() {
                        rt.host().execute_editing(command);
                    }
                });
                app.add_action(&action);
                set_accel(app, command.id(), Some(accelerator));
            }
            MenuItem::Role(role) => {
                let action = gio::SimpleAction::new(role.id(), None);
                let runtime = runtime.clone();
                action.connect_activate(move |_, _| {
                    if let Some(rt) = runtime.upgrade() {
                        rt.host().perform_role(role);
                    }
                });
                app.add_action(&action);
                set_accel(app, role.id(), role.accelerator());
            }
        }
    }
}

fn set_accel(app: &adw::Application, id: &str, text: Option<&str>) {
    let Some(text) = text else {
        return;
    };
    match Accelerator::parse(text) {
        Some(accel) => {
            let gtk = gtk_accel(&accel);
            app.set_accels_for_action(&format!("app.{}", id), &[gtk.as_str()]);
        }
        None => log::warn!("Unparseable accelerator '{}' for {}", text, id),
    }
}
