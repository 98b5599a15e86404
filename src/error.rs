//! Error types for building, configuring and reporting health checks.

use std::path::PathBuf;

use thiserror::Error;

/// Fatal problems found while assembling a check tree.
///
/// Any of these aborts the build; no partial tree is ever produced.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    /// A device field declares more than one of timed, position and follow.
    #[error("subsystem '{subsystem}' field '{field}' declares more than one of timed, position, follow")]
    ConflictingChecks {
        /// Owning subsystem.
        subsystem: String,
        /// Offending field.
        field: String,
    },

    /// A lifecycle hook was declared but could not be resolved.
    #[error("subsystem '{subsystem}' lifecycle hook '{hook}' is not accessible")]
    InaccessibleHook {
        /// Owning subsystem.
        subsystem: String,
        /// Hook name.
        hook: String,
    },

    /// A health-check field holds something that is not a motor controller.
    #[error("subsystem '{subsystem}' field '{field}' has type '{type_name}', which is not a recognized device")]
    UnrecognizedDevice {
        /// Owning subsystem.
        subsystem: String,
        /// Offending field.
        field: String,
        /// Declared type of the field.
        type_name: String,
    },
}

/// Problems loading or interpreting a robot configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// Path that was read.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The file is not valid YAML for a robot configuration.
    #[error("failed to parse config {path}: {source}")]
    Parse {
        /// Path that was parsed.
        path: PathBuf,
        /// Underlying error.
        source: serde_yaml::Error,
    },

    /// The configuration parsed but is inconsistent.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Problems reading or writing a cassette.
#[derive(Debug, Error)]
pub enum CassetteError {
    /// File I/O failed.
    #[error("cassette I/O error on {path}: {source}")]
    Io {
        /// Cassette path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The cassette could not be (de)serialized.
    #[error("cassette format error on {path}: {source}")]
    Format {
        /// Cassette path.
        path: PathBuf,
        /// Underlying error.
        source: serde_yaml::Error,
    },
}

/// Top-level error for a health-check session.
#[derive(Debug, Error)]
pub enum HealthCheckError {
    /// The check tree could not be built.
    #[error(transparent)]
    Build(#[from] BuildError),

    /// The configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A cassette could not be loaded or saved.
    #[error(transparent)]
    Cassette(#[from] CassetteError),

    /// A report could not be serialized.
    #[error("report serialization failed: {0}")]
    Report(#[from] serde_json::Error),

    /// The HTTP transport failed.
    #[error("report transport error: {0}")]
    Transport(String),

    /// A run exceeded its tick cap without finishing.
    #[error("run did not finish within {0} ticks")]
    TickLimit(u64),
}
