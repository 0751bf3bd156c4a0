//! Foundation types for writerdeck.
//!
//! Shared by every writerdeck crate: the error enum, XDG state/config
//! locations, environment knob parsing and the optional `writerdeck.toml`.

pub mod config;
pub mod env;
pub mod error;
pub mod paths;
