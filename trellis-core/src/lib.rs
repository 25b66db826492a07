pub mod assets;
pub mod download;
pub mod error;
pub mod host;
pub mod menu;
pub mod platform;
pub mod shell;
pub mod store;
pub mod window_state;

#[cfg(test)]
mod testing;

pub use error::ShellError;
pub use shell::{Lifecycle, Shell};

/// Fixed, compile-time description of the shell.
///
/// The running application always uses [`ShellConfig::default`]; tests build
/// their own values to exercise other sizes and URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellConfig {
    pub app_name: String,
    pub app_id: String,
    pub home_url: String,
    pub default_width: u32,
    pub default_height: u32,
    pub min_width: u32,
    pub min_height: u32,
}

impl Default for ShellConfig {
    fn default() -> Self {
        ShellConfig {
            app_name: String::from("Trellis"),
            app_id: String::from("com.trellis.Trellis"),
            home_url: String::from("https://trello.com/"),
            default_width: 1000,
            default_height: 800,
            min_width: 400,
            min_height: 200,
        }
    }
}
