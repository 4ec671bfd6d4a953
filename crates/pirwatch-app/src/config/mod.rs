//! Configuration for the pirwatch node
//!
//! Supports:
//! - `config.toml` - Node settings (timings, limits, message toggles)
//! - `sensor.toml` - Persisted sensitivity/range levels

pub mod settings;
pub mod store;
pub mod types;

pub use settings::{default_config_path, default_store_path, init_config_file, load_settings};
pub use store::TomlSensorStore;
pub use types::*;
