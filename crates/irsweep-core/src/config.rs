//! Sweep configuration loaded from TOML.
//!
//! ```toml
//! log_path = "Exp4.txt"
//!
//! [parameter_file]
//! path = "parameterFile"
//!
//! [sweep]
//! key = "fbTerms"
//! values = ["5", "10", "20"]
//!
//! [scoring]
//! url = "http://scorer.example/tes.cgi"
//! username = "student"
//! input_file = "HW1-queries-UB.teIn"
//!
//! [baseline]
//! "10" = 0.0170
//! "12" = 0.2721
//! ```

use std::path::{Path, PathBuf};

use irsweep_scoring::ScoringConfig;
use serde::{Deserialize, Serialize};

use crate::baseline::Baseline;
use crate::error::{Result, SweepError};

/// Placeholder replaced by the parameter-file path in evaluator arguments.
pub const PARAM_FILE_PLACEHOLDER: &str = "{param_file}";

/// Complete description of one sweep.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SweepConfig {
    /// Append-only report log
    #[serde(default = "default_log_path")]
    pub log_path: PathBuf,

    pub parameter_file: ParameterFileConfig,

    pub sweep: SweepValues,

    #[serde(default)]
    pub evaluator: EvaluatorConfig,

    pub scoring: ScoringConfig,

    /// Reference per-query MAP
    #[serde(default)]
    pub baseline: Baseline,
}

fn default_log_path() -> PathBuf {
    PathBuf::from("sweep.log")
}

/// One `key=value` line of a rendered parameter file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParamEntry {
    pub key: String,
    pub value: String,
}

/// Where the evaluator's parameter file lives and how to render it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParameterFileConfig {
    pub path: PathBuf,

    /// Entries used by `write-params`; empty when the file is maintained by hand
    #[serde(default)]
    pub entries: Vec<ParamEntry>,
}

/// The ordered tokens to try.
///
/// With `key` set, each value becomes `key=value`; otherwise values are
/// substituted verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SweepValues {
    #[serde(default)]
    pub key: Option<String>,

    /// Token currently present in the parameter file (defaults to the first value)
    #[serde(default)]
    pub initial: Option<String>,

    pub values: Vec<String>,
}

impl SweepValues {
    /// Tokens in sweep order.
    pub fn tokens(&self) -> Vec<String> {
        self.values.iter().map(|v| self.token_for(v)).collect()
    }

    /// Turn a raw value into the token written to the parameter file.
    pub fn token_for(&self, value: &str) -> String {
        match &self.key {
            Some(key) if !value.starts_with(&format!("{key}=")) => format!("{key}={value}"),
            _ => value.to_string(),
        }
    }

    /// Token expected in the parameter file before the first iteration.
    pub fn initial_token(&self) -> Option<String> {
        match &self.initial {
            Some(initial) => Some(self.token_for(initial)),
            None => self.values.first().map(|v| self.token_for(v)),
        }
    }
}

/// External evaluator invocation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EvaluatorConfig {
    pub program: String,

    #[serde(default)]
    pub args: Vec<String>,

    /// Seconds before the evaluator is abandoned; 0 waits forever
    #[serde(default)]
    pub timeout_secs: u64,

    /// Discard the evaluator's stdout/stderr instead of inheriting them
    #[serde(default)]
    pub quiet: bool,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            program: "java".to_string(),
            args: [
                "-Xms250m",
                "-Xmx2048m",
                "-cp",
                ".:lucene-4.3.0/*",
                "QryEval",
                PARAM_FILE_PLACEHOLDER,
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            timeout_secs: 0,
            quiet: false,
        }
    }
}

impl EvaluatorConfig {
    /// Arguments with the parameter-file placeholder resolved.
    ///
    /// If no argument mentions the placeholder the path is appended.
    pub fn resolved_args(&self, param_file: &Path) -> Vec<String> {
        let path = param_file.to_string_lossy();
        let mut args: Vec<String> = self
            .args
            .iter()
            .map(|a| a.replace(PARAM_FILE_PLACEHOLDER, &path))
            .collect();
        if !self.args.iter().any(|a| a.contains(PARAM_FILE_PLACEHOLDER)) {
            args.push(path.into_owned());
        }
        args
    }
}

impl SweepConfig {
    /// Parse a config from TOML text without consulting the environment.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: SweepConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file, apply `IRSWEEP_*` overrides and validate.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| SweepError::file(path, e))?;
        let mut config: SweepConfig = toml::from_str(&text)?;
        config.scoring.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Reject configs that cannot drive a sweep.
    pub fn validate(&self) -> Result<()> {
        if self.sweep.values.is_empty() {
            return Err(SweepError::InvalidConfig(
                "sweep.values must contain at least one value".to_string(),
            ));
        }
        if self.sweep.values.iter().any(|v| v.is_empty()) {
            return Err(SweepError::InvalidConfig(
                "sweep.values must not contain empty tokens".to_string(),
            ));
        }
        if self.evaluator.program.trim().is_empty() {
            return Err(SweepError::InvalidConfig(
                "evaluator.program must not be empty".to_string(),
            ));
        }
        self.scoring
            .validate()
            .map_err(|e| SweepError::InvalidConfig(e.to_string()))?;
        Ok(())
    }
}
