//! Platform state and OS glue for writerdeck.
//!
//! Small persisted scalars (last-used writing app, HDMI rotation line in the
//! firmware config) and a subprocess runner that never blocks forever.

pub mod process;
pub mod rotation;
pub mod state;

pub use process::{EXIT_NOT_FOUND, EXIT_TIMEOUT, ToolOutput, run_with_timeout, which};
pub use rotation::{RotationConfig, rotation_label};
pub use state::LastUsedStore;
