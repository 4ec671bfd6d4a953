//! pirwatch - host runtime for the motion-session sensor node
//!
//! Wires the node engine from `pirwatch-app` to simulated hardware and runs
//! it headless, streaming NDJSON events on stdout.

pub mod headless;

// Re-export main entry points
pub use headless::runner::{run_headless, RunOptions};
