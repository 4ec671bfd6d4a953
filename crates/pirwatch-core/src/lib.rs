//! # pirwatch-core - Core Domain Types
//!
//! Foundation crate for the pirwatch motion node. Provides the sensor domain
//! types, error handling and logging setup.
//!
//! This crate has **zero internal dependencies** -- it only depends on external
//! crates (serde, thiserror, toml, tracing).
//!
//! ## Public API
//!
//! ### Domain Types (`types`)
//! - [`SensorConfig`] - Sensitivity + range, with derived debounce/cooldown timing
//! - [`Sensitivity`] - Five-step sensitivity level (Very Low .. Very High)
//! - [`Range`] - Three-step detection range (Short, Medium, Long)
//! - [`Millis`] - Monotonic millisecond timestamps
//!
//! ### Error Handling (`error`)
//! - [`Error`] - Custom error enum with `fatal` vs `recoverable` classification
//! - [`Result`] - Type alias for `std::result::Result<T, Error>`
//! - [`ResultExt`] - Extension trait for adding error context
//!
//! ## Prelude
//!
//! Import commonly used types with:
//! ```rust
//! use pirwatch_core::prelude::*;
//! ```

pub mod error;
pub mod logging;
pub mod prelude;
pub mod types;

// Re-export commonly used types at crate root for convenience
pub use error::{Error, Result, ResultExt};
pub use types::{Millis, Range, SensorConfig, Sensitivity};
