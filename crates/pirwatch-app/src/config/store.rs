//! Persisted sensor levels (sensor.toml)
//!
//! Writes are rare (one per config-mode exit or accepted remote command), so
//! each save rewrites the whole file under an exclusive lock.

use crate::services::PersistenceStore;
use fs2::FileExt;
use pirwatch_core::prelude::*;
use pirwatch_core::SensorConfig;
use std::io::Write;
use std::path::{Path, PathBuf};

/// `PersistenceStore` backed by a small TOML file
#[derive(Debug, Clone)]
pub struct TomlSensorStore {
    path: PathBuf,
}

impl TomlSensorStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn try_load(&self) -> Result<Option<SensorConfig>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)?;
        let config = toml::from_str(&content)?;
        Ok(Some(config))
    }

    fn write(&self, config: &SensorConfig) -> Result<()> {
        let content = format!(
            "# pirwatch sensor settings\n# Written on config-mode exit\n\n{}",
            toml::to_string(config)?
        );

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::persistence(format!("Failed to create store dir: {}", e)))?;
        }

        let file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.path)
            .map_err(|e| Error::persistence(format!("Failed to open sensor store: {}", e)))?;

        file.lock_exclusive()
            .map_err(|e| Error::persistence(format!("Failed to lock sensor store: {}", e)))?;

        let mut file = file;
        file.write_all(content.as_bytes())
            .map_err(|e| Error::persistence(format!("Failed to write sensor store: {}", e)))?;
        file.flush()
            .map_err(|e| Error::persistence(format!("Failed to flush sensor store: {}", e)))?;

        // Lock is released when file is dropped
        Ok(())
    }
}

impl PersistenceStore for TomlSensorStore {
    fn load(&self) -> SensorConfig {
        match self.try_load() {
            Ok(Some(config)) => {
                info!(
                    "Loaded sensor settings from {:?}: sensitivity {}, range {}",
                    self.path, config.sensitivity, config.range
                );
                config
            }
            Ok(None) => {
                debug!("No sensor store at {:?}, using defaults", self.path);
                SensorConfig::default()
            }
            Err(e) => {
                warn!("Ignoring unreadable sensor store {:?}: {}", self.path, e);
                SensorConfig::default()
            }
        }
    }

    fn save(&mut self, config: &SensorConfig) -> Result<()> {
        self.write(config)?;
        info!(
            "Saved sensor settings to {:?}: sensitivity {}, range {}",
            self.path, config.sensitivity, config.range
        );
        Ok(())
    }
}
