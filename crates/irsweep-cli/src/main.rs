//! irsweep - retrieval parameter sweep CLI
//!
//! ## Commands
//!
//! - `run`: sweep every configured value and append results to the run log
//! - `scrape`: score a saved scoring-service response offline
//! - `write-params`: render the parameter file from the config
//! - `values`: list the tokens a sweep would try

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use irsweep_core::{
    init_tracing, score_lines, MetricScraper, ParameterFile, RunLog, SweepConfig, SweepPipeline,
};
use irsweep_scoring::{HttpScoringService, ScoringResponse};
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "irsweep")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Parameter sweeps for retrieval experiments", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Sweep configuration file
    #[arg(short, long, global = true, default_value = "irsweep.toml", env = "IRSWEEP_CONFIG")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the sweep
    Run {
        /// Also write per-iteration reports as JSON
        #[arg(long)]
        summary_json: Option<PathBuf>,
    },

    /// Score a saved scoring-service response
    Scrape {
        /// Response body saved to disk
        response: PathBuf,

        /// Print per-query MAP instead of comparing with the baseline
        #[arg(long)]
        no_compare: bool,
    },

    /// Write the parameter file from `[parameter_file].entries`
    WriteParams {
        /// Substitute this sweep value for the initial token
        #[arg(long)]
        value: Option<String>,
    },

    /// List the tokens the sweep will try, in order
    Values,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    init_tracing(cli.json, level);

    match cli.command {
        Commands::Run { summary_json } => cmd_run(&cli.config, summary_json.as_deref()).await,
        Commands::Scrape {
            response,
            no_compare,
        } => cmd_scrape(&cli.config, &response, no_compare),
        Commands::WriteParams { value } => cmd_write_params(&cli.config, value.as_deref()),
        Commands::Values => cmd_values(&cli.config),
    }
}

fn load_config(path: &Path) -> Result<SweepConfig> {
    SweepConfig::load(path).with_context(|| format!("Failed to load {}", path.display()))
}

async fn cmd_run(config_path: &Path, summary_json: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let scoring = HttpScoringService::new(config.scoring.clone())
        .context("Failed to create scoring client")?;
    let mut log = RunLog::open(&config.log_path)?;

    let report = SweepPipeline::run(&config, Arc::new(scoring), &mut log)
        .await
        .context("Sweep aborted")?;

    if let Some(best) = report.best_by_map() {
        info!(
            parameter = %best.parameter,
            map = best.scorecard.map_or_default(),
            "Best aggregate MAP"
        );
    }

    if let Some(path) = summary_json {
        let json = report.to_json_pretty()?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!(path = %path.display(), "Wrote sweep summary");
    }

    Ok(())
}

fn cmd_scrape(config_path: &Path, response: &Path, no_compare: bool) -> Result<()> {
    let raw = std::fs::read_to_string(response)
        .with_context(|| format!("Failed to read {}", response.display()))?;
    let response = ScoringResponse::from_body(200, &raw);

    let config = if no_compare {
        None
    } else {
        Some(load_config(config_path)?)
    };

    let scraper = MetricScraper::new()?;
    let mut log = RunLog::stdout_only();
    let card = score_lines(
        &scraper,
        config.as_ref().map(|c| &c.baseline),
        response.lines(),
        &mut log,
    )?;

    if config.is_some() {
        log.emit(&card.tally.to_string())?;
    }
    Ok(())
}

fn cmd_write_params(config_path: &Path, value: Option<&str>) -> Result<()> {
    let config = load_config(config_path)?;
    if config.parameter_file.entries.is_empty() {
        bail!("[parameter_file].entries is empty; nothing to write");
    }

    let file = ParameterFile::new(&config.parameter_file.path);
    file.render(&config.parameter_file.entries)?;

    if let Some(value) = value {
        let token = config.sweep.token_for(value);
        let initial = config
            .sweep
            .initial_token()
            .context("Sweep has no initial token")?;
        let replaced = file.substitute(&initial, &token)?;
        if replaced == 0 {
            bail!(
                "Initial token {initial:?} not found in {}",
                file.path().display()
            );
        }
    }

    println!("{}", file.path().display());
    Ok(())
}

fn cmd_values(config_path: &Path) -> Result<()> {
    let config = load_config(config_path)?;
    for token in config.sweep.tokens() {
        println!("{token}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn write_config(dir: &Path) -> PathBuf {
        let path = dir.join("irsweep.toml");
        let params = dir.join("parameterFile");
        let text = format!(
            r#"
log_path = "{log}"

[parameter_file]
path = "{params}"
entries = [
    {{ key = "retrievalAlgorithm", value = "Indri" }},
    {{ key = "fbMu", value = "0" }},
]

[sweep]
key = "fbMu"
values = ["0", "2500"]

[scoring]
url = "http://scorer.invalid/tes.cgi"
input_file = "{input}"

[baseline]
"10" = 0.0170
"12" = 0.2721
"#,
            log = dir.join("sweep.log").display(),
            params = params.display(),
            input = dir.join("ranking.teIn").display(),
        );
        std::fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run_with_summary() {
        let cli = Cli::try_parse_from([
            "irsweep",
            "--config",
            "exp.toml",
            "run",
            "--summary-json",
            "out.json",
        ])
        .unwrap();
        assert_eq!(cli.config, PathBuf::from("exp.toml"));
        match cli.command {
            Commands::Run { summary_json } => {
                assert_eq!(summary_json, Some(PathBuf::from("out.json")))
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_parse_scrape_no_compare() {
        let cli = Cli::try_parse_from(["irsweep", "scrape", "resp.txt", "--no-compare"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Scrape {
                no_compare: true,
                ..
            }
        ));
    }

    #[test]
    fn test_write_params_with_value() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_config(dir.path());
        cmd_write_params(&config, Some("2500")).unwrap();
        assert_eq!(
            std::fs::read_to_string(dir.path().join("parameterFile")).unwrap(),
            "retrievalAlgorithm=Indri\nfbMu=2500\n"
        );
    }

    #[test]
    fn test_write_params_without_entries_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_config(dir.path());
        let text = std::fs::read_to_string(&config).unwrap();
        let start = text.find("entries").unwrap();
        let end = text.find("]\n\n[sweep]").unwrap() + 1;
        let stripped = format!("{}{}", &text[..start], &text[end..]);
        std::fs::write(&config, stripped).unwrap();

        let err = cmd_write_params(&config, None).unwrap_err();
        assert!(err.to_string().contains("entries is empty"));
    }

    #[test]
    fn test_scrape_against_baseline() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_config(dir.path());
        let response = dir.path().join("response.txt");
        std::fs::write(&response, "map 10 0.02<br>map 12 0.1<br>map all 0.06<br>").unwrap();
        cmd_scrape(&config, &response, false).unwrap();
    }

    #[test]
    fn test_scrape_unknown_query_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_config(dir.path());
        let response = dir.path().join("response.txt");
        std::fs::write(&response, "map 99 0.02\n").unwrap();
        let err = cmd_scrape(&config, &response, false).unwrap_err();
        assert!(err.to_string().contains("99"));
    }

    #[test]
    fn test_scrape_without_config_when_not_comparing() {
        let dir = tempfile::tempdir().unwrap();
        let response = dir.path().join("response.txt");
        std::fs::write(&response, "map 99 0.02\n").unwrap();
        cmd_scrape(&dir.path().join("missing.toml"), &response, true).unwrap();
    }

    #[test]
    fn test_values_requires_config() {
        let err = cmd_values(Path::new("/nonexistent/irsweep.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to load"));
    }
}
