//! Last-used writing app.

use std::path::{Path, PathBuf};

use writerdeck_types::paths;

/// File name inside the state directory.
pub const LAST_USED_FILE: &str = "last_used.txt";

/// One-line file recording the id of the last launched writing app
/// (`vim`, `nano`, `wordgrinder`, ...).
#[derive(Debug, Clone)]
pub struct LastUsedStore {
    path: PathBuf,
}

impl LastUsedStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `$XDG_STATE_HOME/silo11writerdeck/last_used.txt`.
    pub fn default_location() -> Self {
        Self::new(paths::state_dir().join(LAST_USED_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The recorded id, or `None` when missing, unreadable or blank.
    pub fn get(&self) -> Option<String> {
        let text = std::fs::read_to_string(&self.path).ok()?;
        let id = text.trim();
        (!id.is_empty()).then(|| id.to_string())
    }

    /// Record `app_id`. Failures are logged; launching an app must not fail
    /// because state could not be written.
    pub fn record(&self, app_id: &str) {
        let result = self
            .path
            .parent()
            .map_or(Ok(()), std::fs::create_dir_all)
            .and_then(|()| std::fs::write(&self.path, format!("{}\n", app_id.trim())));
        if let Err(e) = result {
            log::warn!("could not record last-used app in {}: {e}", self.path.display());
        }
    }
}
