//! Entity behaviour configuration.
//!
//! Usually left at its defaults. Hosts that want to tune behaviour per
//! deployment can load it from a TOML file:
//!
//! ```toml
//! validate_on_set = true
//! reject_duplicate_commands = false
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};
use vigil_types::{Error, Result};

/// Configuration for a validatable entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityConfig {
    /// Run a validation cycle synchronously after every field set.
    pub validate_on_set: bool,
    /// Fail `bind_command` when the name is already bound instead of
    /// replacing the old binding.
    pub reject_duplicate_commands: bool,
}

impl Default for EntityConfig {
    fn default() -> Self {
        Self {
            validate_on_set: true,
            reject_duplicate_commands: false,
        }
    }
}

impl EntityConfig {
    /// Parses a configuration from TOML text. Missing keys take defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| Error::Config(e.to_string()))
    }

    /// Loads a configuration file, falling back to defaults with a warning
    /// when the file is missing or cannot be parsed.
    pub fn load_from(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            warn!("No entity config found at {:?}, using defaults", path);
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(contents) => match Self::from_toml_str(&contents) {
                Ok(config) => {
                    info!("Loaded entity config from {:?}", path);
                    config
                }
                Err(e) => {
                    warn!("Failed to parse entity config {:?}: {}. Using defaults.", path, e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read entity config {:?}: {}. Using defaults.", path, e);
                Self::default()
            }
        }
    }
}
