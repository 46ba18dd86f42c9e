//! JSON configuration file adapter.
//!
//! Implements [`ConfigPort`] over a file on disk.  The global section
//! must deserialize; each zone entry is deserialized on its own and a
//! broken one lands in [`SystemConfig::rejected_zones`] instead of
//! rejecting the file.  Validation happens later in the controller.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::Deserialize;
use serde_json::Value;

use crate::app::ports::ConfigPort;
use crate::config::{GlobalConfig, SystemConfig, ZoneConfig};
use crate::error::ConfigError;

pub struct JsonConfigFile {
    path: PathBuf,
}

impl JsonConfigFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigPort for JsonConfigFile {
    fn load(&self) -> Result<SystemConfig, ConfigError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(ConfigError::NotFound),
            Err(e) => {
                warn!("config: {}: {}", self.path.display(), e);
                return Err(ConfigError::Corrupted);
            }
        };
        let config = parse(&raw).map_err(|e| {
            warn!("config: {}: {}", self.path.display(), e);
            ConfigError::Corrupted
        })?;
        info!(
            "config: loaded {} zone(s) from {}, {} unreadable",
            config.zones.len(),
            self.path.display(),
            config.rejected_zones.len()
        );
        Ok(config)
    }
}

#[derive(Deserialize)]
struct Document {
    #[serde(default)]
    global: GlobalConfig,
    #[serde(default)]
    zones: Vec<Value>,
}

/// Deserialize a configuration document.
///
/// Fails only when the document itself or its global section is
/// unreadable.
pub fn parse(raw: &str) -> serde_json::Result<SystemConfig> {
    let doc: Document = serde_json::from_str(raw)?;
    let mut config = SystemConfig {
        global: doc.global,
        ..SystemConfig::default()
    };
    for (i, entry) in doc.zones.into_iter().enumerate() {
        let name = entry
            .get("name")
            .and_then(Value::as_str)
            .map_or_else(|| format!("zone #{}", i + 1), str::to_owned);
        match serde_json::from_value::<ZoneConfig>(entry) {
            Ok(zone) => config.zones.push(zone),
            Err(e) => {
                warn!("config: zone {name}: {e}");
                config.rejected_zones.push((name, ConfigError::Corrupted));
            }
        }
    }
    Ok(config)
}
