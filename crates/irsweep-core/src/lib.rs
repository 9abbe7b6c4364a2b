//! irsweep core library
//!
//! Drives a retrieval parameter sweep: for each value, rewrite the
//! evaluator's parameter file, run the evaluator, submit its ranking to a
//! scoring service and compare the per-query MAP it reports against a fixed
//! baseline. Results are appended to a plain-text run log.

pub mod baseline;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod log;
pub mod param_file;
pub mod scorecard;
pub mod scrape;
pub mod sweep;
pub mod telemetry;

pub use baseline::{Baseline, Outcome, Tally};
pub use config::{EvaluatorConfig, ParamEntry, ParameterFileConfig, SweepConfig, SweepValues};
pub use error::{Result, SweepError};
pub use evaluator::{Evaluator, EvaluatorOutcome};
pub use log::RunLog;
pub use param_file::ParameterFile;
pub use scorecard::{score_lines, QueryOutcome, Scorecard};
pub use scrape::{AggregateMetric, MetricLine, MetricScraper};
pub use sweep::{IterationReport, SweepPipeline, SweepReport};
pub use telemetry::init_tracing;
