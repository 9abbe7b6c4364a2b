//! Error types for irsweep-scoring

use thiserror::Error;

/// Errors that can occur while talking to the scoring service
#[derive(Error, Debug)]
pub enum ScoringError {
    /// The input file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Transport-level HTTP failure (connect, TLS, body read)
    #[error("HTTP error: {0}")]
    Http(String),

    /// Scoring configuration is unusable
    #[error("Invalid scoring configuration: {0}")]
    InvalidConfig(String),

    /// A fake service ran out of scripted responses
    #[error("No scripted response left for submission of {0}")]
    Exhausted(String),
}

impl From<reqwest::Error> for ScoringError {
    fn from(err: reqwest::Error) -> Self {
        ScoringError::Http(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_display() {
        let err: ScoringError =
            std::io::Error::new(std::io::ErrorKind::NotFound, "ranking.teIn").into();
        assert!(err.to_string().contains("IO error"));
        assert!(err.to_string().contains("ranking.teIn"));
    }

    #[test]
    fn test_invalid_config_display() {
        let err = ScoringError::InvalidConfig("url must not be empty".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid scoring configuration: url must not be empty"
        );
    }
}
