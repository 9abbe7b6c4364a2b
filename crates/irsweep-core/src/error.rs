//! Error taxonomy for sweep execution.

use std::path::PathBuf;

use irsweep_scoring::ScoringError;

/// Errors that abort a sweep.
#[derive(Debug, thiserror::Error)]
pub enum SweepError {
    #[error("invalid sweep config: {0}")]
    InvalidConfig(String),

    #[error("failed to parse sweep config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("io error on {path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no baseline entry for query {query}")]
    MissingBaseline { query: String },

    #[error("malformed metric line {line:?}: {reason}")]
    MalformedLine { line: String, reason: String },

    #[error("metric pattern error: {0}")]
    Pattern(#[from] regex::Error),

    #[error("failed to start evaluator {program}: {source}")]
    EvaluatorSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("evaluator {program} timed out after {secs} seconds")]
    EvaluatorTimeout { program: String, secs: u64 },

    #[error("scoring error: {0}")]
    Scoring(#[from] ScoringError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl SweepError {
    /// Attach a path to an I/O failure.
    pub fn file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SweepError::File {
            path: path.into(),
            source,
        }
    }
}

/// Result type for sweep operations.
pub type Result<T> = std::result::Result<T, SweepError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_baseline_display() {
        let err = SweepError::MissingBaseline {
            query: "149".to_string(),
        };
        assert_eq!(err.to_string(), "no baseline entry for query 149");
    }

    #[test]
    fn test_file_error_names_path() {
        let err = SweepError::file(
            "/tmp/parameterFile",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        let msg = err.to_string();
        assert!(msg.contains("/tmp/parameterFile"));
        assert!(msg.contains("gone"));
    }

    #[test]
    fn test_scoring_error_converts() {
        let err: SweepError = ScoringError::Http("connection refused".to_string()).into();
        assert!(err.to_string().contains("connection refused"));
    }
}
