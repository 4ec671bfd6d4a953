//! Settings loader for config.toml

use super::types::Settings;
use pirwatch_core::prelude::*;
use std::path::{Path, PathBuf};

const CONFIG_FILENAME: &str = "config.toml";
const APP_DIR: &str = "pirwatch";

/// Default location of the node settings file
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join(CONFIG_FILENAME)
}

/// Default location of the persisted sensor levels
pub fn default_store_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("sensor.toml")
}

/// Load settings from a config file
///
/// A missing, unreadable or unparsable file yields the defaults.
pub fn load_settings(config_path: &Path) -> Settings {
    if !config_path.exists() {
        debug!("No config file at {:?}, using defaults", config_path);
        return Settings::default();
    }

    match std::fs::read_to_string(config_path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(settings) => {
                debug!("Loaded settings from {:?}", config_path);
                settings
            }
            Err(e) => {
                warn!("Failed to parse {:?}: {}", config_path, e);
                Settings::default()
            }
        },
        Err(e) => {
            warn!("Failed to read {:?}: {}", config_path, e);
            Settings::default()
        }
    }
}

/// Write a commented default config file if none exists
pub fn init_config_file(config_path: &Path) -> Result<()> {
    if config_path.exists() {
        return Ok(());
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| Error::config(format!("Failed to create config dir: {}", e)))?;
    }

    let default_content = r#"# pirwatch node configuration

[device]
name = "PIR-Motion-Node"
location = "Home"

[motion]
stabilization_ms = 30000   # PIR warm-up after boot

[notifications]
min_interval_ms = 10000    # Floor between motion alerts (>= 1000)
daily_limit = 60           # 0 = unlimited
motion_alert = "🚨 Motion detected"

[quiet_hours]
enabled = false
start_hour = 22
end_hour = 6

[config_mode]
hold_ms = 3000             # Long press to enter config mode
press_spacing_ms = 500     # Minimum spacing between step presses
timeout_ms = 60000         # Save and exit after this much inactivity
test_duration_ms = 10000   # Live detection trial

[messages]
startup = true
daily_reset = true
timestamps = true
device_info = true

[runtime]
loop_delay_ms = 100
watchdog_timeout_ms = 15000

[storage]
persist_remote_commands = true
"#;

    std::fs::write(config_path, default_content)
        .map_err(|e| Error::config(format!("Failed to write config.toml: {}", e)))?;

    info!("Created default config at {:?}", config_path);
    Ok(())
}
