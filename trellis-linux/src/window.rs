use gtk4::gio;
use gtk4::prelude::*;
use libadwaita as adw;
use libadwaita::prelude::*;
use webkit6::prelude::*;

use trellis_core::host::{WindowId, WindowOptions};
use trellis_core::menu::{debug_tools_enabled, Accelerator, DebugAction};
use trellis_core::platform::TitleBarStyle;

use crate::menu::gtk_accel;

/// Native objects making up the main window.
#[derive(Clone)]
pub struct MainWindow {
    pub id: WindowId,
    pub window: adw::ApplicationWindow,
    pub webview: webkit6::WebView,
    pub content: webkit6::UserContentManager,
    pub menu_bar: gtk4::PopoverMenuBar,
}

/// Build the main window from `options` without presenting it.
pub fn build_window(app: &adw::Application, id: WindowId, options: &WindowOptions) -> MainWindow {
    let window = adw::ApplicationWindow::builder()
        .application(app)
        .title(options.title.as_str())
        .default_width(options.state.width as i32)
        .default_height(options.state.height as i32)
        .build();
    window.set_size_request(options.min_width as i32, options.min_height as i32);
    if let Some(icon) = options.icon {
        window.set_icon_name(Some(icon));
    }
    if options.state.has_position() {
        // GTK 4 leaves placement to the compositor.
        log::debug!(
            "Ignoring stored position {:?},{:?}",
            options.state.x,
            options.state.y
        );
    }

    // Page scripts get no message handler, so nothing in the page can reach
    // the host. The preload runs in the top frame before the page's scripts.
    let content = webkit6::UserContentManager::new();
    if options.web.host_api_access {
        log::warn!("Host API access requested for web content; not supported");
    }
    let preload = webkit6::UserScript::new(
        options.web.preload_script,
        webkit6::UserContentInjectedFrames::TopFrame,
        webkit6::UserScriptInjectionTime::Start,
        &[],
        &[],
    );
    content.add_script(&preload);

    let webview = webkit6::WebView::builder()
        .user_content_manager(&content)
        .hexpand(true)
        .vexpand(true)
        .build();

    if let Some(wk_settings) = webkit6::prelude::WebViewExt::settings(&webview) {
        wk_settings.set_enable_javascript(true);
        wk_settings.set_enable_developer_extras(options.web.developer_extras);
        wk_settings.set_javascript_can_open_windows_automatically(true);
        // WebKitGTK 6 has no NPAPI plugins; `plugins` maps to media support.
        wk_settings.set_enable_media(options.web.plugins);
    }

    let header = adw::HeaderBar::new();
    if options.title_bar == TitleBarStyle::HiddenInset {
        header.set_show_title(false);
        header.add_css_class("flat");
    }

    let menu_bar = gtk4::PopoverMenuBar::from_model(None::<&gio::MenuModel>);
    let menu_revealer = gtk4::Revealer::builder()
        .transition_type(gtk4::RevealerTransitionType::SlideDown)
        .reveal_child(!options.auto_hide_menu_bar)
        .child(&menu_bar)
        .build();

    let toolbar = adw::ToolbarView::new();
    toolbar.add_top_bar(&header);
    toolbar.add_top_bar(&menu_revealer);
    toolbar.set_content(Some(&webview));
    window.set_content(Some(&toolbar));

    if options.auto_hide_menu_bar {
        setup_menu_bar_toggle(&window, &menu_revealer);
    }
    if debug_tools_enabled() {
        setup_debug_actions(app, &window, &webview);
    }

    MainWindow {
        id,
        window,
        webview,
        content,
        menu_bar,
    }
}

/// A lone Alt press shows or hides the menu bar.
fn setup_menu_bar_toggle(window: &adw::ApplicationWindow, revealer: &gtk4::Revealer) {
    let key_controller = gtk4::EventControllerKey::new();
    key_controller.set_propagation_phase(gtk4::PropagationPhase::Capture);
    let revealer = revealer.clone();
    key_controller.connect_key_released(move |_, key, _, state| {
        let is_alt = key == gtk4::gdk::Key::Alt_L || key == gtk4::gdk::Key::Alt_R;
        let other_mods = state.intersects(
            gtk4::gdk::ModifierType::CONTROL_MASK
                | gtk4::gdk::ModifierType::SHIFT_MASK
                | gtk4::gdk::ModifierType::SUPER_MASK,
        );
        if is_alt && !other_mods {
            revealer.set_reveal_child(!revealer.reveals_child());
        }
    });
    window.add_controller(key_controller);
}

fn setup_debug_actions(
    app: &adw::Application,
    window: &adw::ApplicationWindow,
    webview: &webkit6::WebView,
) {
    for debug_action in DebugAction::ALL {
        let action = gio::SimpleAction::new(debug_action.id(), None);
        let webview = webview.clone();
        action.connect_activate(move |_, _| match debug_action {
            DebugAction::ToggleDevTools => {
                if let Some(inspector) = webview.inspector() {
                    if inspector.web_view().is_some() {
                        inspector.close();
                    } else {
                        inspector.show();
                    }
                }
            }
            DebugAction::Reload => webview.reload(),
        });
        window.add_action(&action);

        let accels: Vec<String> = debug_action
            .accelerators()
            .iter()
            .filter_map(|accel| Accelerator::parse(accel))
            .map(|accel| gtk_accel(&accel))
            .collect();
        let accel_refs: Vec<&str> = accels.iter().map(String::as_str).collect();
        app.set_accels_for_action(&format!("win.{}", debug_action.id()), &accel_refs);
    }
}
