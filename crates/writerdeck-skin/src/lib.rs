//! Theme system -- the visual personality of the menu HUD.
//!
//! A theme is a named preset mapping logical color slots (banner, frame,
//! body, footer...) to the eight terminal base colors. The active preset is
//! chosen from the environment or a persisted file, and individual slots can
//! be overridden through `WD_*` variables. Rendering itself lives elsewhere;
//! this crate only resolves data.

pub mod color;
pub mod effects;
pub mod store;
pub mod theme;

pub use color::TermColor;
pub use effects::VisualKnobs;
pub use store::{ThemeSelection, ThemeStore};
pub use theme::{ColorPair, Palette, Slot, ThemePreset, available_themes, preset};

use writerdeck_types::env::{EnvSource, str_env};

/// Theme used when neither the environment nor the persisted file name a
/// known preset.
pub const DEFAULT_THEME: &str = "night";

/// Resolve the active theme name.
///
/// Resolution order:
/// 1. `WD_THEME`, when it names a known preset
/// 2. The persisted theme file, when it names a known preset
/// 3. [`DEFAULT_THEME`]
pub fn resolve_theme_name(env: &dyn EnvSource, store: &ThemeStore) -> String {
    if let Some(name) = str_env(env, "WD_THEME").map(|n| n.to_lowercase())
        && preset(&name).is_some()
    {
        return name;
    }

    if let Some(name) = store.read_persisted() {
        return name;
    }

    DEFAULT_THEME.to_string()
}
