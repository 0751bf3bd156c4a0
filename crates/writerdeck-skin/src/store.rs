//! Persisted theme selection.
//!
//! The chosen theme lives in a one-line file under the XDG config directory.
//! Persistence is best-effort: failures are logged and never surface to the
//! caller, since a missing theme file only means the default is used.

use std::path::{Path, PathBuf};

use writerdeck_types::env::EnvSource;
use writerdeck_types::paths;

use crate::theme::{Palette, fallback_preset, preset};

/// One-line theme file.
#[derive(Debug, Clone)]
pub struct ThemeStore {
    path: PathBuf,
}

impl ThemeStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `$XDG_CONFIG_HOME/silo11writerdeck/theme`.
    pub fn default_location() -> Self {
        Self::new(paths::config_dir().join("theme"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The persisted name, if the file exists and names a known preset.
    pub fn read_persisted(&self) -> Option<String> {
        let text = std::fs::read_to_string(&self.path).ok()?;
        let name = text.trim().to_lowercase();
        preset(&name).map(|p| p.name.to_string())
    }

    /// Write `name` followed by a newline, creating parent directories.
    pub fn persist(&self, name: &str) {
        let result = self
            .path
            .parent()
            .map_or(Ok(()), std::fs::create_dir_all)
            .and_then(|()| std::fs::write(&self.path, format!("{name}\n")));
        if let Err(e) = result {
            log::warn!("could not persist theme to {}: {e}", self.path.display());
        }
    }
}

/// The active theme for one session.
#[derive(Debug, Clone)]
pub struct ThemeSelection {
    current: String,
    store: ThemeStore,
}

impl ThemeSelection {
    /// Resolve the starting theme from `env` and `store`.
    pub fn load(env: &dyn EnvSource, store: ThemeStore) -> Self {
        let current = crate::resolve_theme_name(env, &store);
        Self { current, store }
    }

    pub fn current(&self) -> &str {
        &self.current
    }

    /// Switch to `name` and persist it. Unknown names are ignored; returns
    /// whether the selection changed to a valid preset.
    pub fn set(&mut self, name: &str) -> bool {
        let name = name.trim().to_lowercase();
        match preset(&name) {
            Some(p) => {
                self.current = p.name.to_string();
                self.store.persist(p.name);
                true
            },
            None => {
                log::debug!("ignoring unknown theme '{name}'");
                false
            },
        }
    }

    /// The palette of the current theme with `WD_*` overrides applied.
    pub fn palette(&self, env: &dyn EnvSource) -> Palette {
        let p = preset(&self.current).unwrap_or_else(fallback_preset);
        Palette::resolve(p, env)
    }
}
