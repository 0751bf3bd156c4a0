//! Environment knob parsing.
//!
//! Every helper takes a lookup function so callers (and tests) can resolve
//! knobs from something other than the process environment. Values that fail
//! to parse fall back to the default.

/// Source of environment-style variables.
pub trait EnvSource {
    fn var(&self, name: &str) -> Option<String>;
}

/// Reads from the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl<F> EnvSource for F
where
    F: Fn(&str) -> Option<String>,
{
    fn var(&self, name: &str) -> Option<String> {
        self(name)
    }
}

/// Trimmed, non-empty value of `name`.
pub fn str_env(env: &dyn EnvSource, name: &str) -> Option<String> {
    env.var(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn int_env(env: &dyn EnvSource, name: &str, default: i64) -> i64 {
    str_env(env, name)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

pub fn float_env(env: &dyn EnvSource, name: &str, default: f64) -> f64 {
    str_env(env, name)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Comma-separated floats. A single bad element rejects the whole value.
pub fn floats_env(env: &dyn EnvSource, name: &str, default: &[f64]) -> Vec<f64> {
    str_env(env, name)
        .and_then(|v| {
            v.split(',')
                .map(|x| x.trim().parse::<f64>().ok())
                .collect::<Option<Vec<_>>>()
        })
        .unwrap_or_else(|| default.to_vec())
}
