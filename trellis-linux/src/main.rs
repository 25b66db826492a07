mod downloads;
mod host;
mod launcher;
mod menu;
mod runtime;
mod window;

use gtk4::glib;
use libadwaita as adw;
use libadwaita::prelude::*;

use trellis_core::platform::PlatformProfile;
use trellis_core::store::JsonStore;
use trellis_core::{Shell, ShellConfig};

fn main() -> glib::ExitCode {
    env_logger::init();

    let config = ShellConfig::default();
    let store = JsonStore::open_default("trellis");
    log::info!("Using store {:?}", store.path());

    let app = adw::Application::builder()
        .application_id(config.app_id.as_str())
        .register_session(true)
        .build();

    let shell = Shell::new(config, PlatformProfile::current(), Box::new(store));
    let runtime = runtime::Runtime::new(&app, shell);
    runtime.install();

    let status = app.run();
    if runtime.failed() {
        return glib::ExitCode::FAILURE;
    }
    status
}
