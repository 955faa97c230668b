//! Vouch Configuration
//!
//! Run options merged from two layers (later overrides earlier):
//! 1. The project file (`.vouch.yml` at the project root)
//! 2. CLI flags
//!
//! A missing project file is not an error; every option has a default.
//!
//! # Example
//!
//! ```no_run
//! use vouch_config::Options;
//! use std::path::Path;
//!
//! let options = Options::load(Path::new(".")).unwrap();
//! ```

pub mod options;

use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid YAML syntax in {file}: {error}")]
    YamlParseError {
        file: PathBuf,
        error: serde_yaml::Error,
    },
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

pub use options::{CoverageOptions, Options, SuitePaths};
