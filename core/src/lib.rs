//! Root of the `dieroll-core` library: the roll choreography, its state, and
//! the seams it talks to (haptics, randomness, configuration).

// Prevent accidental direct writes to stdout/stderr in library code. All
// user-visible output goes through the presentation crates.
#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod config;
mod config_loader;
pub mod config_profile;
pub mod face;
pub mod haptics;
pub mod random;
pub mod rotation;
mod sequencer;
pub mod state;
pub mod timing;

pub use face::FaceId;
pub use sequencer::RollSequencer;
pub use state::RollOutcome;
pub use state::RollPhase;
pub use state::RollState;
