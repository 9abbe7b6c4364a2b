//! irsweep-scoring: remote relevance scoring for parameter sweeps
//!
//! A sweep iteration ends by uploading the evaluator's ranking file to a
//! scoring service and reading back a plain-text report of trec_eval-style
//! metric lines. This crate owns that exchange.
//!
//! ## Key Components
//!
//! - `ScoringService`: the async seam the sweep pipeline talks to
//! - `HttpScoringService`: multipart POST with basic auth via reqwest
//! - `fakes::MemoryScoringService`: scripted responses for tests

mod error;
pub mod fakes;
pub mod http;

use std::path::Path;

use async_trait::async_trait;

pub use error::ScoringError;
pub use http::{HttpScoringService, ScoringConfig};

/// Result type for scoring operations
pub type Result<T> = std::result::Result<T, ScoringError>;

/// Text response returned by a scoring service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoringResponse {
    /// HTTP status code (200 for fakes unless scripted otherwise).
    pub status: u16,

    /// Response body with `<br>` tags turned into newlines.
    pub body: String,
}

impl ScoringResponse {
    /// Build a response from a raw body, normalizing HTML line breaks.
    pub fn from_body(status: u16, raw: &str) -> Self {
        Self {
            status,
            body: raw.replace("<br>", "\n"),
        }
    }

    /// Whether the status code is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Iterate over the body's lines.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.body.lines()
    }
}

/// A service that scores a ranking file and returns its metric report.
#[async_trait]
pub trait ScoringService: Send + Sync {
    /// Upload `input_file` and return the service's text response.
    async fn submit(&self, input_file: &Path) -> Result<ScoringResponse>;
}
