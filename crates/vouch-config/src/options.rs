//! Run options (.vouch.yml)
//!
//! Handles the project-level options file stored as `.vouch.yml` at the
//! project root, plus the CLI overlay applied on top of it.

use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Name of the project options file.
pub const OPTIONS_FILE: &str = ".vouch.yml";

/// Paths belonging to one configured suite. YAML accepts either a single
/// path or a list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum SuitePaths {
    One(PathBuf),
    Many(Vec<PathBuf>),
}

impl SuitePaths {
    pub fn to_vec(&self) -> Vec<PathBuf> {
        match self {
            SuitePaths::One(path) => vec![path.clone()],
            SuitePaths::Many(paths) => paths.clone(),
        }
    }
}

impl From<&str> for SuitePaths {
    fn from(path: &str) -> Self {
        SuitePaths::One(PathBuf::from(path))
    }
}

/// Coverage options
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CoverageOptions {
    /// Collect coverage data during the run
    #[serde(default)]
    pub enable: bool,

    /// Glob patterns for files counted toward coverage
    #[serde(default = "default_include")]
    pub include: Vec<String>,

    /// Glob patterns for files excluded from coverage
    #[serde(default)]
    pub exclude: Vec<String>,
}

fn default_include() -> Vec<String> {
    vec!["src/**/*.rs".to_string()]
}

impl Default for CoverageOptions {
    fn default() -> Self {
        CoverageOptions {
            enable: false,
            include: default_include(),
            exclude: Vec::new(),
        }
    }
}

/// Run options from .vouch.yml, plus CLI-only settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Options {
    /// Shuffle the preferred execution order (dependencies still run first)
    #[serde(default)]
    pub shuffle: bool,

    /// Suite name -> paths; defaults to a single "tests" suite
    #[serde(default = "default_suites")]
    pub suites: BTreeMap<String, SuitePaths>,

    /// Coverage options
    #[serde(default)]
    pub coverage: CoverageOptions,

    /// Suite selected on the command line; never read from the file
    #[serde(skip)]
    pub suite: Option<String>,
}

fn default_suites() -> BTreeMap<String, SuitePaths> {
    let mut suites = BTreeMap::new();
    suites.insert("tests".to_string(), SuitePaths::from("tests"));
    suites
}

impl Default for Options {
    fn default() -> Self {
        Options {
            shuffle: false,
            suites: default_suites(),
            coverage: CoverageOptions::default(),
            suite: None,
        }
    }
}

impl Options {
    /// Load options from `.vouch.yml` in `dir`; defaults when absent.
    pub fn load(dir: &Path) -> ConfigResult<Self> {
        let file = dir.join(OPTIONS_FILE);
        if !file.exists() {
            return Ok(Options::default());
        }
        Self::from_file(&file)
    }

    /// Load options from a specific file.
    pub fn from_file(file: &Path) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(file)?;
        serde_yaml::from_str(&contents).map_err(|error| ConfigError::YamlParseError {
            file: file.to_path_buf(),
            error,
        })
    }

    /// Overlay CLI flags; flags only ever turn features on or narrow the
    /// run, never revert the file.
    pub fn apply_cli(&mut self, random: bool, suite: Option<String>, coverage: bool) {
        if random {
            self.shuffle = true;
        }
        if suite.is_some() {
            self.suite = suite;
        }
        if coverage {
            self.coverage.enable = true;
        }
    }
}
