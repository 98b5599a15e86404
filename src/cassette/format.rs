//! Cassette data structures.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CassetteError;

/// Port name under which a device's interactions are recorded.
#[must_use]
pub fn motor_port(device_id: i32) -> String {
    format!("motor:{device_id}")
}

/// A single recorded call on a port.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Interaction {
    /// Sequence number across the whole cassette.
    pub seq: u64,
    /// Port name, e.g. `clock` or `motor:10`.
    pub port: String,
    /// Method invoked on the port.
    pub method: String,
    /// Arguments passed to the method.
    pub input: serde_json::Value,
    /// Value the method returned.
    pub output: serde_json::Value,
}

/// A recorded health-check session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cassette {
    /// Human-readable name for this cassette.
    pub name: String,
    /// When this cassette was recorded.
    pub recorded_at: DateTime<Utc>,
    /// Configuration the session was recorded with.
    pub source: String,
    /// Ordered list of interactions.
    pub interactions: Vec<Interaction>,
}

impl Cassette {
    /// Reads a cassette from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, CassetteError> {
        let content = std::fs::read_to_string(path)
            .map_err(|source| CassetteError::Io { path: path.to_path_buf(), source })?;
        serde_yaml::from_str(&content)
            .map_err(|source| CassetteError::Format { path: path.to_path_buf(), source })
    }

    /// Returns how many interactions were recorded for a port.
    #[must_use]
    pub fn count_for(&self, port: &str) -> usize {
        self.interactions.iter().filter(|i| i.port == port).count()
    }
}
