use thiserror::Error;

/// Failures surfaced by the controller and the host.
///
/// `Navigation` and `StyleInjection` are terminal: the frontend stops the
/// application when `Shell::dispatch` returns them.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("failed to load {url}: {message}")]
    Navigation { url: String, message: String },

    #[error("failed to inject stylesheet: {0}")]
    StyleInjection(String),

    #[error("failed to create window: {0}")]
    WindowCreation(String),

    #[error("failed to open {url} externally: {message}")]
    ExternalOpen { url: String, message: String },

    #[error("store I/O error at {path}: {source}")]
    StoreIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("store JSON error: {0}")]
    StoreJson(#[from] serde_json::Error),
}

impl ShellError {
    /// Whether the application must stop when this error reaches the top.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ShellError::Navigation { .. }
                | ShellError::StyleInjection(_)
                | ShellError::WindowCreation(_)
        )
    }
}
