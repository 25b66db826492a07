use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ShellError;
use crate::window_state::WindowState;

/// Key holding the main window geometry.
pub const LAST_WINDOW_STATE_KEY: &str = "lastWindowState";

/// Persistence collaborator of the window lifecycle controller.
pub trait StateStore {
    /// The stored geometry, or `None` if nothing usable was stored.
    fn load_window_state(&self) -> Option<WindowState>;

    fn save_window_state(&mut self, state: &WindowState) -> Result<(), ShellError>;
}

/// Key-value store backed by a single JSON object file,
/// `~/.config/trellis/config.json` by default.
///
/// Unknown keys survive a write, so the file can be shared with other
/// tools without losing their entries.
#[derive(Debug)]
pub struct JsonStore {
    path: PathBuf,
    values: Map<String, Value>,
}

impl JsonStore {
    /// Open the store in the per-user configuration directory.
    pub fn open_default(app_dir: &str) -> Self {
        Self::open(default_path(app_dir))
    }

    /// Open the store at `path`. A missing, unreadable, or corrupt file
    /// yields an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<Value>(&contents) {
                Ok(Value::Object(map)) => map,
                Ok(_) => {
                    log::warn!("Ignoring {:?}: top level is not an object", path);
                    Map::new()
                }
                Err(e) => {
                    log::warn!("Ignoring corrupt store {:?}: {}", path, e);
                    Map::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Map::new(),
            Err(e) => {
                log::warn!("Failed to read store {:?}: {}", path, e);
                Map::new()
            }
        };
        JsonStore { path, values }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Typed read of `key`. A value of the wrong shape reads as absent.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.values.get(key)?;
        match serde_json::from_value(value.clone()) {
            Ok(v) => Some(v),
            Err(e) => {
                log::warn!("Store key '{}' has unexpected shape: {}", key, e);
                None
            }
        }
    }

    /// Set `key` and write the whole file.
    pub fn set<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), ShellError> {
        self.values
            .insert(key.to_string(), serde_json::to_value(value)?);
        self.flush()
    }

    fn flush(&self) -> Result<(), ShellError> {
        let io_err = |source: std::io::Error| ShellError::StoreIo {
            path: self.path.display().to_string(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(&self.values)?;
        std::fs::write(&self.path, json).map_err(io_err)
    }
}

/// `<config dir>/<app_dir>/config.json`, falling back to `~/.config`.
pub fn default_path(app_dir: &str) -> PathBuf {
    dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
        .unwrap_or_else(std::env::temp_dir)
        .join(app_dir)
        .join("config.json")
}

impl StateStore for JsonStore {
    fn load_window_state(&self) -> Option<WindowState> {
        self.get(LAST_WINDOW_STATE_KEY)
    }

    fn save_window_state(&mut self, state: &WindowState) -> Result<(), ShellError> {
        self.set(LAST_WINDOW_STATE_KEY, state)
    }
}
