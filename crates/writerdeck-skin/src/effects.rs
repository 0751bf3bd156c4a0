//! Visual noise knobs for the HUD background texture.
//!
//! These only tune intensities; drawing the patina, static and bolt rail is
//! the renderer's job.

use writerdeck_types::env::{EnvSource, float_env, floats_env, int_env};

const DEFAULT_BOLT_STEP: i64 = 6;
const DEFAULT_PATINA_DENSITY: f64 = 0.08;
const DEFAULT_STATIC_DENSITY: f64 = 0.004;
const DEFAULT_STATIC_WEIGHTS: [f64; 3] = [0.70, 0.24, 0.06];

/// Env-driven noise intensities.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualKnobs {
    /// Columns between bolts on the bottom rail (`WD_BOLT_STEP`).
    pub bolt_step: i64,
    /// Fraction of cells carrying a patina dot (`WD_PATINA_DENSITY`).
    pub patina_density: f64,
    /// Fraction of cells carrying static (`WD_STATIC_DENSITY`).
    pub static_density: f64,
    /// Relative weights of the static glyph tiers (`WD_STATIC_WEIGHTS`).
    pub static_weights: Vec<f64>,
}

impl Default for VisualKnobs {
    fn default() -> Self {
        Self {
            bolt_step: DEFAULT_BOLT_STEP,
            patina_density: DEFAULT_PATINA_DENSITY,
            static_density: DEFAULT_STATIC_DENSITY,
            static_weights: DEFAULT_STATIC_WEIGHTS.to_vec(),
        }
    }
}

impl VisualKnobs {
    pub fn from_env(env: &dyn EnvSource) -> Self {
        Self {
            bolt_step: int_env(env, "WD_BOLT_STEP", DEFAULT_BOLT_STEP),
            patina_density: float_env(env, "WD_PATINA_DENSITY", DEFAULT_PATINA_DENSITY),
            static_density: float_env(env, "WD_STATIC_DENSITY", DEFAULT_STATIC_DENSITY),
            static_weights: floats_env(env, "WD_STATIC_WEIGHTS", &DEFAULT_STATIC_WEIGHTS),
        }
    }
}
