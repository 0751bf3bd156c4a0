//! Theme presets and palette resolution.
//!
//! A preset assigns a [`TermColor`] to every logical [`Slot`]. A [`Palette`]
//! is a preset after `WD_*` environment overrides have been applied, and
//! knows how to expand itself into the numbered color pairs a curses
//! renderer registers.

use std::collections::BTreeMap;

use writerdeck_types::env::{EnvSource, str_env};

use crate::color::TermColor;
use crate::color::TermColor::{Black, Blue, Cyan, Green, Magenta, Red, White, Yellow};

/// Logical color slots used by the HUD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Slot {
    /// Big title stripe background.
    BannerBg,
    /// Title text on the stripe.
    BannerFg,
    /// Chevrons at the stripe edges.
    HazardFg,
    BorderFg,
    RustFg,
    BoltFg,
    /// Rivets; derived from `RustFg` unless overridden.
    RivetFg,
    StaticFg,
    PatinaFg,
    /// Section headers other than the banner.
    HeaderFg,
    BodyFg,
    HighlightFg,
    HighlightBg,
    LabelFg,
    OkFg,
    WarnFg,
    DangerFg,
    HintFg,
}

impl Slot {
    pub const ALL: [Slot; 18] = [
        Slot::BannerBg,
        Slot::BannerFg,
        Slot::HazardFg,
        Slot::BorderFg,
        Slot::RustFg,
        Slot::BoltFg,
        Slot::RivetFg,
        Slot::StaticFg,
        Slot::PatinaFg,
        Slot::HeaderFg,
        Slot::BodyFg,
        Slot::HighlightFg,
        Slot::HighlightBg,
        Slot::LabelFg,
        Slot::OkFg,
        Slot::WarnFg,
        Slot::DangerFg,
        Slot::HintFg,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Slot::BannerBg => "banner_bg",
            Slot::BannerFg => "banner_fg",
            Slot::HazardFg => "hazard_fg",
            Slot::BorderFg => "border_fg",
            Slot::RustFg => "rust_fg",
            Slot::BoltFg => "bolt_fg",
            Slot::RivetFg => "rivet_fg",
            Slot::StaticFg => "static_fg",
            Slot::PatinaFg => "patina_fg",
            Slot::HeaderFg => "header_fg",
            Slot::BodyFg => "body_fg",
            Slot::HighlightFg => "highlight_fg",
            Slot::HighlightBg => "highlight_bg",
            Slot::LabelFg => "label_fg",
            Slot::OkFg => "ok_fg",
            Slot::WarnFg => "warn_fg",
            Slot::DangerFg => "danger_fg",
            Slot::HintFg => "hint_fg",
        }
    }

    /// Environment variable overriding this slot. Bolts follow the preset only.
    pub fn env_var(self) -> Option<&'static str> {
        match self {
            Slot::BannerBg => Some("WD_BANNER_BG"),
            Slot::BannerFg => Some("WD_BANNER_FG"),
            Slot::HazardFg => Some("WD_HAZARD_FG"),
            Slot::BorderFg => Some("WD_BORDER_FG"),
            Slot::RustFg => Some("WD_RUST_FG"),
            Slot::BoltFg => None,
            Slot::RivetFg => Some("WD_RIVET_FG"),
            Slot::StaticFg => Some("WD_STATIC_FG"),
            Slot::PatinaFg => Some("WD_PATINA_FG"),
            Slot::HeaderFg => Some("WD_HEADER_FG"),
            Slot::BodyFg => Some("WD_BODY_FG"),
            Slot::HighlightFg => Some("WD_HIGHLIGHT_FG"),
            Slot::HighlightBg => Some("WD_HIGHLIGHT_BG"),
            Slot::LabelFg => Some("WD_LABEL_FG"),
            Slot::OkFg => Some("WD_OK_FG"),
            Slot::WarnFg => Some("WD_WARN_FG"),
            Slot::DangerFg => Some("WD_DANGER_FG"),
            Slot::HintFg => Some("WD_HINT_FG"),
        }
    }
}

/// Legacy spelling of `WD_BANNER_BG`; applied last.
const LEGACY_BANNER_BG: &str = "WD_HAZARD_BG";

/// A named set of slot colors. `RivetFg` is never listed; it derives from
/// `RustFg`.
#[derive(Debug)]
pub struct ThemePreset {
    pub name: &'static str,
    colors: [(Slot, TermColor); 17],
}

impl ThemePreset {
    pub fn color(&self, slot: Slot) -> Option<TermColor> {
        self.colors.iter().find(|(s, _)| *s == slot).map(|(_, c)| *c)
    }
}

static PRESETS: [ThemePreset; 3] = [
    // Bright and friendly.
    ThemePreset {
        name: "day",
        colors: [
            (Slot::BannerBg, Yellow),
            (Slot::BannerFg, Black),
            (Slot::HazardFg, Black),
            (Slot::BorderFg, White),
            (Slot::RustFg, Yellow),
            (Slot::BoltFg, Yellow),
            (Slot::StaticFg, Yellow),
            (Slot::PatinaFg, Yellow),
            (Slot::HeaderFg, White),
            (Slot::BodyFg, White),
            (Slot::HighlightFg, Black),
            (Slot::HighlightBg, Yellow),
            (Slot::LabelFg, Blue),
            (Slot::OkFg, Green),
            (Slot::WarnFg, Magenta),
            (Slot::DangerFg, Red),
            (Slot::HintFg, Cyan),
        ],
    },
    // Cool neon.
    ThemePreset {
        name: "night",
        colors: [
            (Slot::BannerBg, Magenta),
            (Slot::BannerFg, Black),
            (Slot::HazardFg, Black),
            (Slot::BorderFg, Blue),
            (Slot::RustFg, Magenta),
            (Slot::BoltFg, Magenta),
            (Slot::StaticFg, Blue),
            (Slot::PatinaFg, Blue),
            (Slot::HeaderFg, Blue),
            (Slot::BodyFg, Blue),
            (Slot::HighlightFg, Black),
            (Slot::HighlightBg, Cyan),
            (Slot::LabelFg, Cyan),
            (Slot::OkFg, Green),
            (Slot::WarnFg, Magenta),
            (Slot::DangerFg, Red),
            (Slot::HintFg, Cyan),
        ],
    },
    // Loud hazard palette.
    ThemePreset {
        name: "toxic",
        colors: [
            (Slot::BannerBg, Red),
            (Slot::BannerFg, Yellow),
            (Slot::HazardFg, Yellow),
            (Slot::BorderFg, Magenta),
            (Slot::RustFg, Green),
            (Slot::BoltFg, Green),
            (Slot::StaticFg, Green),
            (Slot::PatinaFg, Green),
            (Slot::HeaderFg, Green),
            (Slot::BodyFg, Green),
            (Slot::HighlightFg, Yellow),
            (Slot::HighlightBg, Red),
            (Slot::LabelFg, Cyan),
            (Slot::OkFg, Green),
            (Slot::WarnFg, Yellow),
            (Slot::DangerFg, Red),
            (Slot::HintFg, Cyan),
        ],
    },
];

/// Look up a preset by (case-insensitive) name.
pub fn preset(name: &str) -> Option<&'static ThemePreset> {
    let name = name.trim().to_lowercase();
    PRESETS.iter().find(|p| p.name == name)
}

/// The `night` preset, used whenever a name cannot be resolved.
pub(crate) fn fallback_preset() -> &'static ThemePreset {
    &PRESETS[1]
}

/// Names of all presets, sorted.
pub fn available_themes() -> Vec<&'static str> {
    let mut names: Vec<_> = PRESETS.iter().map(|p| p.name).collect();
    names.sort_unstable();
    names
}

/// Stable curses pair IDs and their (fg, bg) colors. `None` as background
/// means the terminal default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorPair {
    pub id: i16,
    pub fg: TermColor,
    pub bg: Option<TermColor>,
}

pub const PAIR_HIGHLIGHT: i16 = 1;
pub const PAIR_RUST: i16 = 2;
pub const PAIR_HAZARD: i16 = 3;
pub const PAIR_BODY: i16 = 4;
pub const PAIR_DANGER: i16 = 6;
pub const PAIR_OK: i16 = 7;
pub const PAIR_WARN: i16 = 8;
pub const PAIR_LABEL: i16 = 9;
pub const PAIR_HINTS: i16 = 10;
pub const PAIR_PATINA: i16 = 11;
pub const PAIR_BORDER: i16 = 12;
pub const PAIR_BOLT: i16 = 13;
pub const PAIR_RIVET: i16 = 14;
pub const PAIR_STATIC: i16 = 15;
pub const PAIR_HEADER: i16 = 16;

/// A fully resolved slot -> color mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pub theme: &'static str,
    colors: BTreeMap<Slot, TermColor>,
}

impl Palette {
    /// The preset's colors with no overrides.
    pub fn from_preset(preset: &'static ThemePreset) -> Self {
        let mut colors: BTreeMap<Slot, TermColor> = preset.colors.iter().copied().collect();
        let rust = colors.get(&Slot::RustFg).copied().unwrap_or(TermColor::Yellow);
        colors.entry(Slot::RivetFg).or_insert(rust);
        Self {
            theme: preset.name,
            colors,
        }
    }

    /// The preset's colors with `WD_*` overrides applied. Unknown color names
    /// keep the preset value.
    pub fn resolve(preset: &'static ThemePreset, env: &dyn EnvSource) -> Self {
        let mut palette = Self::from_preset(preset);

        for slot in Slot::ALL {
            if let Some(var) = slot.env_var()
                && let Some(color) = str_env(env, var).and_then(|v| TermColor::from_name(&v))
            {
                palette.colors.insert(slot, color);
            }
        }

        if let Some(color) = str_env(env, LEGACY_BANNER_BG).and_then(|v| TermColor::from_name(&v))
        {
            palette.colors.insert(Slot::BannerBg, color);
        }

        palette
    }

    pub fn get(&self, slot: Slot) -> TermColor {
        // Every slot is populated by `from_preset`.
        self.colors.get(&slot).copied().unwrap_or(TermColor::White)
    }

    /// The pair table a renderer registers with `init_pair`.
    pub fn pairs(&self) -> Vec<ColorPair> {
        let fg = |id, slot| ColorPair {
            id,
            fg: self.get(slot),
            bg: None,
        };
        vec![
            ColorPair {
                id: PAIR_HIGHLIGHT,
                fg: self.get(Slot::HighlightFg),
                bg: Some(self.get(Slot::HighlightBg)),
            },
            fg(PAIR_RUST, Slot::RustFg),
            ColorPair {
                id: PAIR_HAZARD,
                fg: self.get(Slot::HazardFg),
                bg: Some(self.get(Slot::BannerBg)),
            },
            fg(PAIR_BODY, Slot::BodyFg),
            fg(PAIR_STATIC, Slot::StaticFg),
            ColorPair {
                id: PAIR_DANGER,
                fg: self.get(Slot::DangerFg),
                bg: Some(TermColor::Black),
            },
            fg(PAIR_OK, Slot::OkFg),
            fg(PAIR_WARN, Slot::WarnFg),
            fg(PAIR_LABEL, Slot::LabelFg),
            fg(PAIR_HINTS, Slot::HintFg),
            fg(PAIR_PATINA, Slot::PatinaFg),
            fg(PAIR_BORDER, Slot::BorderFg),
            fg(PAIR_BOLT, Slot::BoltFg),
            fg(PAIR_RIVET, Slot::RivetFg),
            ColorPair {
                id: PAIR_HEADER,
                fg: self.get(Slot::BannerFg),
                bg: Some(self.get(Slot::BannerBg)),
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn three_presets_sorted() {
        assert_eq!(available_themes(), vec!["day", "night", "toxic"]);
    }

    #[test]
    fn preset_lookup_is_case_insensitive() {
        assert_eq!(preset("Night").map(|p| p.name), Some("night"));
        assert!(preset("sepia").is_none());
    }

    #[test]
    fn every_preset_covers_every_slot() {
        for name in available_themes() {
            let palette = Palette::from_preset(preset(name).unwrap());
            for slot in Slot::ALL {
                assert!(palette.colors.contains_key(&slot), "{name} missing {slot:?}");
            }
        }
    }

    #[test]
    fn rivet_derives_from_rust() {
        let palette = Palette::from_preset(preset("toxic").unwrap());
        assert_eq!(palette.get(Slot::RivetFg), TermColor::Green);
        assert_eq!(palette.get(Slot::RivetFg), palette.get(Slot::RustFg));
    }

    #[test]
    fn night_banner() {
        let palette = Palette::resolve(preset("night").unwrap(), &no_env);
        assert_eq!(palette.get(Slot::BannerBg), TermColor::Magenta);
        assert_eq!(palette.get(Slot::HighlightBg), TermColor::Cyan);
    }

    #[test]
    fn env_override_applies() {
        let env = |name: &str| match name {
            "WD_BANNER_BG" => Some("green".to_string()),
            "WD_BODY_FG" => Some(" White ".to_string()),
            _ => None,
        };
        let palette = Palette::resolve(preset("day").unwrap(), &env);
        assert_eq!(palette.get(Slot::BannerBg), TermColor::Green);
        assert_eq!(palette.get(Slot::BodyFg), TermColor::White);
    }

    #[test]
    fn unknown_color_keeps_preset() {
        let env = |name: &str| (name == "WD_OK_FG").then(|| "chartreuse".to_string());
        let palette = Palette::resolve(preset("day").unwrap(), &env);
        assert_eq!(palette.get(Slot::OkFg), TermColor::Green);
    }

    #[test]
    fn legacy_hazard_bg_wins() {
        let env = |name: &str| match name {
            "WD_BANNER_BG" => Some("green".to_string()),
            "WD_HAZARD_BG" => Some("blue".to_string()),
            _ => None,
        };
        let palette = Palette::resolve(preset("night").unwrap(), &env);
        assert_eq!(palette.get(Slot::BannerBg), TermColor::Blue);
    }

    #[test]
    fn bolts_ignore_env() {
        let env = |name: &str| (name == "WD_BOLT_FG").then(|| "red".to_string());
        let palette = Palette::resolve(preset("day").unwrap(), &env);
        assert_eq!(palette.get(Slot::BoltFg), TermColor::Yellow);
    }

    #[test]
    fn pair_table() {
        let palette = Palette::resolve(preset("night").unwrap(), &no_env);
        let pairs = palette.pairs();
        assert_eq!(pairs.len(), 15);

        let header = pairs.iter().find(|p| p.id == PAIR_HEADER).unwrap();
        assert_eq!(header.fg, TermColor::Black);
        assert_eq!(header.bg, Some(TermColor::Magenta));

        let danger = pairs.iter().find(|p| p.id == PAIR_DANGER).unwrap();
        assert_eq!(danger.bg, Some(TermColor::Black));

        let body = pairs.iter().find(|p| p.id == PAIR_BODY).unwrap();
        assert_eq!(body.bg, None);
    }
}
