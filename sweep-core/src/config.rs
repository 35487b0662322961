//! Repository configuration file.
//!
//! # Storage layout
//!
//! ```text
//! <repo>/
//!   .sweep.yaml   (optional, every field has a default)
//! ```
//!
//! ```yaml
//! number_of_files: 50
//! ignore_files: ["*test*", "re:^vendor/"]   # or "*test*, re:^vendor/"
//! formatter:
//!   command: black
//!   args: ["--quiet"]
//!   timeout_secs: 600
//! ```
//!
//! Command-line flags take precedence over file values; see
//! [`SweepConfig::criteria`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{io_err, ConfigError};
use crate::patterns::split_pattern_list;
use crate::selector::SelectionCriteria;

/// File name looked up at the repository root.
pub const CONFIG_FILE_NAME: &str = ".sweep.yaml";

/// Batch size used when neither the file nor the command line sets one.
pub const DEFAULT_NUMBER_OF_FILES: i64 = 10;

/// Matches `black`'s per-file error line: `error: cannot format a.py: Cannot parse: 1:4: ...`.
pub const DEFAULT_FAILURE_PATTERN: &str =
    r"(?m)^error: cannot format (?P<path>[^:\n]+): (?P<reason>.*)$";

/// Top-level `.sweep.yaml` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct SweepConfig {
    #[serde(default)]
    pub number_of_files: Option<i64>,
    #[serde(default)]
    pub ignore_files: IgnoreList,
    #[serde(default)]
    pub formatter: FormatterConfig,
}

/// Ignore patterns, either as a YAML list or a flat comma-separated string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IgnoreList {
    List(Vec<String>),
    Flat(String),
}

impl Default for IgnoreList {
    fn default() -> Self {
        IgnoreList::List(Vec::new())
    }
}

impl IgnoreList {
    pub fn patterns(&self) -> Vec<String> {
        match self {
            IgnoreList::List(items) => items
                .iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            IgnoreList::Flat(raw) => split_pattern_list(raw),
        }
    }
}

/// External formatter invocation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FormatterConfig {
    #[serde(default = "default_command")]
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Regex with named groups `path` and `reason`, applied to tool output.
    #[serde(default = "default_failure_pattern")]
    pub failure_pattern: String,
    #[serde(default = "default_success_exit_codes")]
    pub success_exit_codes: Vec<i32>,
    /// Exit codes meaning "some files could not be formatted".
    #[serde(default = "default_partial_failure_exit_codes")]
    pub partial_failure_exit_codes: Vec<i32>,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            command: default_command(),
            args: Vec::new(),
            timeout_secs: default_timeout_secs(),
            failure_pattern: default_failure_pattern(),
            success_exit_codes: default_success_exit_codes(),
            partial_failure_exit_codes: default_partial_failure_exit_codes(),
        }
    }
}

fn default_command() -> String {
    "black".to_string()
}

fn default_timeout_secs() -> u64 {
    600
}

fn default_failure_pattern() -> String {
    DEFAULT_FAILURE_PATTERN.to_string()
}

fn default_success_exit_codes() -> Vec<i32> {
    vec![0]
}

fn default_partial_failure_exit_codes() -> Vec<i32> {
    vec![1, 123]
}

impl SweepConfig {
    /// Build selection criteria, letting explicit overrides win over file values.
    pub fn criteria(
        &self,
        count_override: Option<i64>,
        ignore_override: Option<&[String]>,
    ) -> Result<SelectionCriteria, ConfigError> {
        let count = count_override
            .or(self.number_of_files)
            .unwrap_or(DEFAULT_NUMBER_OF_FILES);
        match ignore_override {
            Some(patterns) => SelectionCriteria::from_patterns(count, patterns),
            None => SelectionCriteria::from_patterns(count, self.ignore_files.patterns()),
        }
    }
}

/// `<root>/.sweep.yaml`. Pure, no I/O.
pub fn config_path_at(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE_NAME)
}

/// Load `<root>/.sweep.yaml`, or defaults when the file does not exist.
pub fn load_at(root: &Path) -> Result<SweepConfig, ConfigError> {
    let path = config_path_at(root);
    if !path.exists() {
        return Ok(SweepConfig::default());
    }
    load_file(&path)
}

/// Load an explicit config file. A missing file is an error here.
pub fn load_file(path: &Path) -> Result<SweepConfig, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    if contents.trim().is_empty() {
        return Ok(SweepConfig::default());
    }
    serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
