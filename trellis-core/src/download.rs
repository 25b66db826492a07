use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Host-assigned identity of one transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DownloadId(pub u64);

/// How a transfer ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadState {
    Completed,
    Cancelled,
    Interrupted,
}

/// Value of the window's OS-level progress indicator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Progress {
    Fraction(f64),
    /// Indicator removed.
    Cleared,
}

impl Progress {
    /// Numeric form; `Cleared` is the `-1.0` sentinel.
    pub fn value(self) -> f64 {
        match self {
            Progress::Fraction(f) => f,
            Progress::Cleared => -1.0,
        }
    }
}

/// Total byte counts of the transfers currently in flight.
///
/// Entries live from "download started" to "download done" and are not
/// coordinated with each other: every update writes the single shared
/// indicator.
#[derive(Debug, Default)]
pub struct DownloadTracker {
    totals: HashMap<DownloadId, u64>,
}

impl DownloadTracker {
    pub fn start(&mut self, id: DownloadId, total_bytes: u64) {
        self.totals.insert(id, total_bytes);
    }

    /// Progress for `received` bytes of transfer `id`, or `None` for a
    /// transfer that was never started.
    ///
    /// A zero total is divided as-is.
    pub fn progress(&self, id: DownloadId, received: u64) -> Option<Progress> {
        let total = *self.totals.get(&id)?;
        Some(Progress::Fraction(received as f64 / total as f64))
    }

    pub fn finish(&mut self, id: DownloadId) -> bool {
        self.totals.remove(&id).is_some()
    }

    pub fn active(&self) -> usize {
        self.totals.len()
    }
}

/// Pick a non-existing path in `dir` for a file the page suggested as
/// `suggested`, appending ` (1)`, ` (2)`, ... before the extension as needed.
pub fn unique_destination(dir: &Path, suggested: &str) -> PathBuf {
    let name = Path::new(suggested)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty() && *n != "." && *n != "..")
        .unwrap_or("download");

    let candidate = dir.join(name);
    if !candidate.exists() {
        return candidate;
    }

    let path = Path::new(name);
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name);
    let ext = path.extension().and_then(|e| e.to_str());

    let mut n = 1u32;
    loop {
        let file_name = match ext {
            Some(ext) => format!("{} ({}).{}", stem, n, ext),
            None => format!("{} ({})", stem, n),
        };
        let candidate = dir.join(file_name);
        if !candidate.exists() {
            return candidate;
        }
        n += 1;
    }
}

/// Directory downloads are saved to without prompting.
pub fn downloads_dir() -> PathBuf {
    dirs::download_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(std::env::temp_dir)
}
