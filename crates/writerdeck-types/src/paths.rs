//! Well-known locations: home, XDG config/state directories, `~` expansion.
//!
//! Directory names keep the appliance's historical `silo11writerdeck` name so
//! state written by earlier installs is picked up.

use std::path::{Path, PathBuf};

/// Directory name used under the XDG config and state roots.
pub const APP_DIR_NAME: &str = "silo11writerdeck";

/// The user's home directory (`$HOME`, falling back to `/`).
pub fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .filter(|h| !h.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("/"))
}

/// `$XDG_CONFIG_HOME/silo11writerdeck`, or `~/.config/silo11writerdeck`.
pub fn config_dir() -> PathBuf {
    config_dir_from(std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from), &home_dir())
}

/// `$XDG_STATE_HOME/silo11writerdeck`, or `~/.local/state/silo11writerdeck`.
pub fn state_dir() -> PathBuf {
    state_dir_from(std::env::var_os("XDG_STATE_HOME").map(PathBuf::from), &home_dir())
}

fn config_dir_from(xdg: Option<PathBuf>, home: &Path) -> PathBuf {
    xdg.filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| home.join(".config"))
        .join(APP_DIR_NAME)
}

fn state_dir_from(xdg: Option<PathBuf>, home: &Path) -> PathBuf {
    xdg.filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| home.join(".local").join("state"))
        .join(APP_DIR_NAME)
}

/// Expand a leading `~` or `~/` against `home`. Other paths are returned as-is.
pub fn expand_tilde(path: &str, home: &Path) -> PathBuf {
    if path == "~" {
        home.to_path_buf()
    } else if let Some(rest) = path.strip_prefix("~/") {
        home.join(rest)
    } else {
        PathBuf::from(path)
    }
}

/// Make `path` absolute against the current directory without touching the
/// filesystem beyond `current_dir`.
pub fn absolutize(path: &Path) -> std::io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_dir_prefers_xdg() {
        let dir = config_dir_from(Some(PathBuf::from("/xdg/cfg")), Path::new("/home/pi"));
        assert_eq!(dir, PathBuf::from("/xdg/cfg/silo11writerdeck"));
    }

    #[test]
    fn config_dir_falls_back_to_home() {
        let dir = config_dir_from(None, Path::new("/home/pi"));
        assert_eq!(dir, PathBuf::from("/home/pi/.config/silo11writerdeck"));
    }

    #[test]
    fn empty_xdg_is_ignored() {
        let dir = state_dir_from(Some(PathBuf::new()), Path::new("/home/pi"));
        assert_eq!(dir, PathBuf::from("/home/pi/.local/state/silo11writerdeck"));
    }

    #[test]
    fn state_dir_prefers_xdg() {
        let dir = state_dir_from(Some(PathBuf::from("/run/state")), Path::new("/home/pi"));
        assert_eq!(dir, PathBuf::from("/run/state/silo11writerdeck"));
    }

    #[test]
    fn tilde_expansion() {
        let home = Path::new("/home/pi");
        assert_eq!(expand_tilde("~", home), PathBuf::from("/home/pi"));
        assert_eq!(expand_tilde("~/docs", home), PathBuf::from("/home/pi/docs"));
        assert_eq!(expand_tilde("/srv/x", home), PathBuf::from("/srv/x"));
        assert_eq!(expand_tilde("~user/x", home), PathBuf::from("~user/x"));
    }

    #[test]
    fn absolutize_keeps_absolute() {
        let p = absolutize(Path::new("/etc")).unwrap();
        assert_eq!(p, PathBuf::from("/etc"));
    }

    #[test]
    fn absolutize_joins_relative() {
        let p = absolutize(Path::new("notes")).unwrap();
        assert!(p.is_absolute());
        assert!(p.ends_with("notes"));
    }
}
