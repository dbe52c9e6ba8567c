//! Circuit dimensions.
//!
//! Every array in a circuit-input record has a length fixed by the compiled
//! circuit. The defaults match the published circuit builds; override them
//! from a YAML or JSON file, or from the environment, when targeting a
//! differently compiled circuit.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use zkid_crypto::poseidon;

/// Largest tree depth accepted for any circuit role.
pub const MAX_LEVELS: usize = 254;

/// Tree depths and value capacity of the target circuits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CircuitConfig {
    /// Issuer tree proofs: claim inclusion, non-revocation and the
    /// issuer's authentication claim.
    pub claim_levels: usize,
    /// Holder authentication-claim proofs.
    pub id_ownership_levels: usize,
    /// Global identity state tree proofs.
    pub gist_levels: usize,
    /// Merklized document path proofs.
    pub claim_path_levels: usize,
    /// Query value array capacity.
    pub value_array_size: usize,
}

impl Default for CircuitConfig {
    fn default() -> Self {
        Self {
            claim_levels: 32,
            id_ownership_levels: 40,
            gist_levels: 64,
            claim_path_levels: 32,
            value_array_size: 64,
        }
    }
}

impl CircuitConfig {
    /// Parse a YAML document. Missing fields take their defaults.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON document. Missing fields take their defaults.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a `.yaml`/`.yml` or `.json` file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {e}", path.display())))?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&content),
            _ => Self::from_yaml_str(&content),
        }
    }

    /// Load from environment variables, falling back to defaults.
    ///
    /// Variables:
    /// - `ZKID_CLAIM_LEVELS` (default: 32)
    /// - `ZKID_ID_OWNERSHIP_LEVELS` (default: 40)
    /// - `ZKID_GIST_LEVELS` (default: 64)
    /// - `ZKID_CLAIM_PATH_LEVELS` (default: 32)
    /// - `ZKID_VALUE_ARRAY_SIZE` (default: 64)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_overrides()
    }

    /// Apply environment overrides on top of `self`.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        let config = Self {
            claim_levels: env_usize("ZKID_CLAIM_LEVELS", self.claim_levels)?,
            id_ownership_levels: env_usize("ZKID_ID_OWNERSHIP_LEVELS", self.id_ownership_levels)?,
            gist_levels: env_usize("ZKID_GIST_LEVELS", self.gist_levels)?,
            claim_path_levels: env_usize("ZKID_CLAIM_PATH_LEVELS", self.claim_path_levels)?,
            value_array_size: env_usize("ZKID_VALUE_ARRAY_SIZE", self.value_array_size)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject zero or oversized dimensions.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let levels = [
            ("claim_levels", self.claim_levels),
            ("id_ownership_levels", self.id_ownership_levels),
            ("gist_levels", self.gist_levels),
            ("claim_path_levels", self.claim_path_levels),
        ];
        for (name, value) in levels {
            if value == 0 || value > MAX_LEVELS {
                return Err(ConfigError::OutOfRange {
                    field: name,
                    value,
                    max: MAX_LEVELS,
                });
            }
        }
        // the sponge needs at least one full frame
        if self.value_array_size < poseidon::MIN_FRAME_SIZE {
            return Err(ConfigError::OutOfRange {
                field: "value_array_size",
                value: self.value_array_size,
                max: usize::MAX,
            });
        }
        Ok(())
    }
}

fn env_usize(var: &str, default: usize) -> Result<usize, ConfigError> {
    match std::env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidEnv(var.to_string(), raw)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(String),
    #[error("cannot parse config: {0}")]
    Parse(String),
    #[error("invalid value for {0}: {1:?}")]
    InvalidEnv(String, String),
    #[error("{field} = {value} is out of range (max {max})")]
    OutOfRange {
        field: &'static str,
        value: usize,
        max: usize,
    },
}
