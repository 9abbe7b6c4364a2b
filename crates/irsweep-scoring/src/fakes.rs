//! In-memory fakes for the scoring seam (testing only)
//!
//! `MemoryScoringService` replays scripted responses in order and records
//! every submission, without any network access.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::ScoringError;
use crate::{Result, ScoringResponse, ScoringService};

/// A file observed by the fake at submission time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub path: PathBuf,
    pub contents: String,
}

/// Scoring service that answers from a queue of canned responses.
#[derive(Debug, Default)]
pub struct MemoryScoringService {
    responses: Mutex<VecDeque<ScoringResponse>>,
    submissions: Mutex<Vec<Submission>>,
}

impl MemoryScoringService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue raw bodies, each answered with status 200.
    pub fn with_bodies<I, S>(bodies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let fake = Self::new();
        for body in bodies {
            fake.push(ScoringResponse::from_body(200, body.as_ref()));
        }
        fake
    }

    /// Queue one more response.
    pub fn push(&self, response: ScoringResponse) {
        self.responses.lock().unwrap().push_back(response);
    }

    /// Everything submitted so far, oldest first.
    pub fn submissions(&self) -> Vec<Submission> {
        self.submissions.lock().unwrap().clone()
    }
}

#[async_trait]
impl ScoringService for MemoryScoringService {
    async fn submit(&self, input_file: &Path) -> Result<ScoringResponse> {
        let contents = tokio::fs::read_to_string(input_file).await?;
        self.submissions.lock().unwrap().push(Submission {
            path: input_file.to_path_buf(),
            contents,
        });

        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ScoringError::Exhausted(input_file.display().to_string()))
    }
}
