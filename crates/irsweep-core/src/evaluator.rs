//! External evaluator invocation.

use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tracing::{info, warn};

use crate::config::EvaluatorConfig;
use crate::error::{Result, SweepError};

/// How the evaluator exited.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EvaluatorOutcome {
    /// Exit code (-1 when terminated by a signal).
    pub exit_code: i32,

    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,

    pub success: bool,
}

/// Runs the evaluator once per sweep iteration.
pub struct Evaluator;

impl Evaluator {
    /// Run the evaluator on `param_file` and wait for it to exit.
    ///
    /// A non-zero exit is reported but is not an error; only a failure to
    /// start the process or a timeout is.
    pub async fn run(config: &EvaluatorConfig, param_file: &Path) -> Result<EvaluatorOutcome> {
        let start = Instant::now();
        let args = config.resolved_args(param_file);

        info!(program = %config.program, ?args, "Running evaluator");

        let (stdout, stderr) = if config.quiet {
            (Stdio::null(), Stdio::null())
        } else {
            (Stdio::inherit(), Stdio::inherit())
        };

        let mut child = Command::new(&config.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(stdout)
            .stderr(stderr)
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| SweepError::EvaluatorSpawn {
                program: config.program.clone(),
                source,
            })?;

        let status = if config.timeout_secs > 0 {
            tokio::time::timeout(Duration::from_secs(config.timeout_secs), child.wait())
                .await
                .map_err(|_| SweepError::EvaluatorTimeout {
                    program: config.program.clone(),
                    secs: config.timeout_secs,
                })??
        } else {
            child.wait().await?
        };

        let outcome = EvaluatorOutcome {
            exit_code: status.code().unwrap_or(-1),
            duration_ms: start.elapsed().as_millis() as u64,
            success: status.success(),
        };

        if !outcome.success {
            warn!(program = %config.program, exit_code = outcome.exit_code, "Evaluator exited unsuccessfully");
        }

        Ok(outcome)
    }
}
