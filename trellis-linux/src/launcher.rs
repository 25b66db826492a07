use std::collections::HashMap;

use gtk4::gio;
use gtk4::glib::{self, ToVariant};

use trellis_core::download::Progress;

const LAUNCHER_INTERFACE: &str = "com.canonical.Unity.LauncherEntry";
const LAUNCHER_PATH: &str = "/com/trellis/Trellis/LauncherEntry";

/// Taskbar/dock progress through the `LauncherEntry` D-Bus signal, which
/// GNOME's Dash-to-Dock, KDE Plasma, and Unity all listen to.
pub struct LauncherEntry {
    app_uri: String,
    connection: Option<gio::DBusConnection>,
}

impl LauncherEntry {
    pub fn new(app_id: &str) -> Self {
        let connection = match gio::bus_get_sync(gio::BusType::Session, None::<&gio::Cancellable>) {
            Ok(c) => Some(c),
            Err(e) => {
                log::warn!("No session bus, taskbar progress disabled: {}", e);
                None
            }
        };
        LauncherEntry {
            app_uri: format!("application://{}.desktop", app_id),
            connection,
        }
    }

    pub fn update(&self, progress: Progress) {
        let Some(connection) = &self.connection else {
            return;
        };
        let (value, visible) = progress_properties(progress);
        let mut props: HashMap<String, glib::Variant> = HashMap::new();
        props.insert("progress".to_string(), value.to_variant());
        props.insert("progress-visible".to_string(), visible.to_variant());

        let params = (self.app_uri.clone(), props).to_variant();
        if let Err(e) = connection.emit_signal(
            None,
            LAUNCHER_PATH,
            LAUNCHER_INTERFACE,
            "Update",
            Some(&params),
        ) {
            log::warn!("Failed to update launcher progress: {}", e);
        }
    }
}

/// `(progress, progress-visible)` for a launcher update.
fn progress_properties(progress: Progress) -> (f64, bool) {
    match progress {
        Progress::Fraction(f) => (f, true),
        Progress::Cleared => (0.0, false),
    }
}
