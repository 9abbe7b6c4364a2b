//! Sweep orchestration.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use irsweep_scoring::ScoringService;
use serde::{Deserialize, Serialize};
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::baseline::Tally;
use crate::config::SweepConfig;
use crate::error::{Result, SweepError};
use crate::evaluator::{Evaluator, EvaluatorOutcome};
use crate::log::RunLog;
use crate::param_file::ParameterFile;
use crate::scorecard::{score_lines, Scorecard};
use crate::scrape::MetricScraper;

/// Written to the log after each iteration.
pub const SEPARATOR: &str = " ";

/// Result of one parameter value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IterationReport {
    /// Token written to the parameter file.
    pub parameter: String,

    pub started_at: DateTime<Utc>,

    /// Occurrences of the previous token that were replaced.
    pub replacements: usize,

    /// SHA-256 of the parameter file the evaluator saw.
    pub param_digest: String,

    pub evaluator: EvaluatorOutcome,

    pub http_status: u16,

    pub scorecard: Scorecard,

    pub duration_ms: u64,
}

/// Result of a complete sweep.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SweepReport {
    pub sweep_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub iterations: Vec<IterationReport>,
    pub duration_ms: u64,
}

impl SweepReport {
    /// Iteration with the highest aggregate MAP.
    pub fn best_by_map(&self) -> Option<&IterationReport> {
        self.iterations
            .iter()
            .filter_map(|it| it.scorecard.map_value().map(|m| (m, it)))
            .max_by(|(a, _), (b, _)| a.total_cmp(b))
            .map(|(_, it)| it)
    }

    /// Pretty-printed JSON form of the report.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Tallies summed over all iterations.
    pub fn combined_tally(&self) -> Tally {
        self.iterations.iter().fold(Tally::default(), |acc, it| Tally {
            wins: acc.wins + it.scorecard.tally.wins,
            losses: acc.losses + it.scorecard.tally.losses,
            ties: acc.ties + it.scorecard.tally.ties,
        })
    }
}

/// Sequential parameter sweep.
pub struct SweepPipeline;

impl SweepPipeline {
    /// Run every sweep value in order.
    ///
    /// Each iteration rewrites the parameter file, runs the evaluator,
    /// submits the ranking file, scores the response against the baseline
    /// and removes the ranking file. The first error aborts the sweep; lines
    /// already written to `log` are kept.
    pub async fn run(
        config: &SweepConfig,
        scoring: Arc<dyn ScoringService>,
        log: &mut RunLog,
    ) -> Result<SweepReport> {
        let start = Instant::now();
        let sweep_id = Uuid::new_v4();
        let started_at = Utc::now();
        let scraper = MetricScraper::new()?;
        let param_file = ParameterFile::new(&config.parameter_file.path);
        let tokens = config.sweep.tokens();

        info!(sweep_id = %sweep_id, values = tokens.len(), "Starting sweep");

        let mut previous = config
            .sweep
            .initial_token()
            .ok_or_else(|| SweepError::InvalidConfig("sweep has no values".to_string()))?;
        let mut iterations = Vec::with_capacity(tokens.len());

        for token in tokens {
            let span = info_span!("iteration", parameter = %token);
            let report = Self::run_iteration(
                config,
                scoring.as_ref(),
                &scraper,
                &param_file,
                &previous,
                &token,
                log,
            )
            .instrument(span)
            .await?;
            iterations.push(report);
            previous = token;
        }

        let report = SweepReport {
            sweep_id,
            started_at,
            iterations,
            duration_ms: start.elapsed().as_millis() as u64,
        };
        info!(sweep_id = %sweep_id, tally = %report.combined_tally(), "Sweep completed");
        Ok(report)
    }

    async fn run_iteration(
        config: &SweepConfig,
        scoring: &dyn ScoringService,
        scraper: &MetricScraper,
        param_file: &ParameterFile,
        previous: &str,
        token: &str,
        log: &mut RunLog,
    ) -> Result<IterationReport> {
        let start = Instant::now();
        let started_at = Utc::now();

        let replacements = param_file.substitute(previous, token)?;
        if replacements == 0 {
            warn!(previous, "Previous token not found in parameter file");
        }
        log.emit(token)?;
        let param_digest = param_file.digest()?;

        let evaluator = Evaluator::run(&config.evaluator, param_file.path()).await?;

        let input_file = &config.scoring.input_file;
        let response = scoring.submit(input_file).await?;
        if !response.is_success() {
            warn!(status = response.status, "Scoring response status is not 2xx");
        }

        let scorecard = score_lines(scraper, Some(&config.baseline), response.lines(), log)?;

        tokio::fs::remove_file(input_file)
            .await
            .map_err(|e| SweepError::file(input_file, e))?;

        log.emit(&scorecard.tally.to_string())?;
        log.record(SEPARATOR)?;

        info!(
            tally = %scorecard.tally,
            map = scorecard.map_or_default(),
            "Iteration finished"
        );

        Ok(IterationReport {
            parameter: token.to_string(),
            started_at,
            replacements,
            param_digest,
            evaluator,
            http_status: response.status,
            scorecard,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }
}
