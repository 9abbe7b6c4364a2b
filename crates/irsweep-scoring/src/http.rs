//! HTTP scoring client
//!
//! Uploads a ranking file as `multipart/form-data` with HTTP basic
//! authentication, alongside a fixed set of text form fields.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::ScoringError;
use crate::{Result, ScoringResponse, ScoringService};

const URL_ENV: &str = "IRSWEEP_SCORING_URL";
const USERNAME_ENV: &str = "IRSWEEP_USERNAME";
const PASSWORD_ENV: &str = "IRSWEEP_PASSWORD";

/// Scoring endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoringConfig {
    /// Endpoint URL
    #[serde(default)]
    pub url: String,
    /// Basic-auth user name
    #[serde(default)]
    pub username: String,
    /// Basic-auth password
    #[serde(default)]
    pub password: Option<String>,
    /// Ranking file uploaded (and removed) each iteration
    pub input_file: PathBuf,
    /// Form field carrying the file
    #[serde(default = "default_file_field")]
    pub file_field: String,
    /// Fixed text fields sent with every submission
    #[serde(default = "default_form")]
    pub form: BTreeMap<String, String>,
}

fn default_file_field() -> String {
    "infile".to_string()
}

fn default_form() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("hwid".to_string(), "HW4".to_string()),
        ("logtype".to_string(), "Detailed".to_string()),
    ])
}

impl ScoringConfig {
    /// Create config for a specific endpoint
    pub fn new(url: &str, input_file: impl Into<PathBuf>) -> Self {
        ScoringConfig {
            url: url.to_string(),
            username: String::new(),
            password: None,
            input_file: input_file.into(),
            file_field: default_file_field(),
            form: default_form(),
        }
    }

    /// Set basic-auth credentials
    pub fn with_credentials(mut self, username: &str, password: &str) -> Self {
        self.username = username.to_string();
        self.password = Some(password.to_string());
        self
    }

    /// Override url and credentials from `IRSWEEP_*` environment variables
    pub fn apply_env(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Override url and credentials from an arbitrary variable lookup
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(URL_ENV) {
            self.url = url;
        }
        if let Some(username) = lookup(USERNAME_ENV) {
            self.username = username;
        }
        if let Some(password) = lookup(PASSWORD_ENV) {
            self.password = Some(password);
        }
    }

    /// Check that the endpoint is usable
    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(ScoringError::InvalidConfig(
                "url must not be empty".to_string(),
            ));
        }
        if self.file_field.trim().is_empty() {
            return Err(ScoringError::InvalidConfig(
                "file_field must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Scoring client backed by reqwest
pub struct HttpScoringService {
    config: ScoringConfig,
    http_client: reqwest::Client,
}

impl HttpScoringService {
    /// Create a new scoring client
    pub fn new(config: ScoringConfig) -> Result<Self> {
        config.validate()?;
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("irsweep/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(HttpScoringService {
            config,
            http_client,
        })
    }

    /// Endpoint configuration
    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    fn build_form(&self, file_name: String, bytes: Vec<u8>) -> Form {
        let mut form = Form::new();
        for (name, value) in &self.config.form {
            form = form.text(name.clone(), value.clone());
        }
        form.part(
            self.config.file_field.clone(),
            Part::bytes(bytes).file_name(file_name),
        )
    }
}

#[async_trait]
impl ScoringService for HttpScoringService {
    async fn submit(&self, input_file: &Path) -> Result<ScoringResponse> {
        let bytes = tokio::fs::read(input_file).await?;
        let file_name = input_file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "input".to_string());

        info!(url = %self.config.url, file = %input_file.display(), bytes = bytes.len(), "Submitting ranking");

        let form = self.build_form(file_name, bytes);
        let mut request = self.http_client.post(&self.config.url).multipart(form);
        if !self.config.username.is_empty() {
            request = request.basic_auth(&self.config.username, self.config.password.as_deref());
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "Scoring service returned non-success status");
        }
        let text = response.text().await?;
        debug!(status = status.as_u16(), len = text.len(), "Scoring response received");

        Ok(ScoringResponse::from_body(status.as_u16(), &text))
    }
}
