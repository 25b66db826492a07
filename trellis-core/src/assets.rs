/// Stylesheet injected on every dom-ready.
pub const BROWSER_CSS: &str = include_str!("../web/browser.css");

/// Script run in the top frame before the page's own scripts.
pub const PRELOAD_JS: &str = include_str!("../web/preload.js");
