use serde::{Deserialize, Serialize};

/// Main window geometry as persisted under `lastWindowState`.
///
/// A missing `x`/`y` means the window manager picks the position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<i32>,
    pub width: u32,
    pub height: u32,
}

impl WindowState {
    /// Unpositioned state of the given size.
    pub fn sized(width: u32, height: u32) -> Self {
        WindowState {
            x: None,
            y: None,
            width,
            height,
        }
    }

    /// Replace a zero dimension with the fallback so the size stays positive.
    ///
    /// Anything else is kept as stored, including sizes below the minimum
    /// floor, which the host enforces itself.
    pub fn or_default_size(self, default_width: u32, default_height: u32) -> Self {
        WindowState {
            width: if self.width == 0 { default_width } else { self.width },
            height: if self.height == 0 {
                default_height
            } else {
                self.height
            },
            ..self
        }
    }

    pub fn has_position(&self) -> bool {
        self.x.is_some() && self.y.is_some()
    }
}
