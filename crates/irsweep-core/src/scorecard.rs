//! Turning a scoring report into per-query outcomes and aggregates.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::baseline::{Baseline, Outcome, Tally};
use crate::error::Result;
use crate::log::RunLog;
use crate::scrape::{AggregateMetric, MetricLine, MetricScraper};

/// Printed when a report carries no aggregate MAP row.
pub const MISSING_MAP: &str = "0.0";

/// A per-query MAP compared with its baseline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryOutcome {
    pub query: String,
    pub map: f64,
    pub baseline: f64,
    pub outcome: Outcome,
}

/// Everything extracted from one scoring report.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Scorecard {
    /// Per-query MAP rows in report order.
    pub per_query: Vec<(String, f64)>,
    /// Baseline comparisons; empty when scored without a baseline.
    pub outcomes: Vec<QueryOutcome>,
    pub tally: Tally,
    pub p10: Option<String>,
    pub p20: Option<String>,
    pub p30: Option<String>,
    /// Last aggregate MAP row seen.
    pub map: Option<String>,
}

impl Scorecard {
    /// Aggregate MAP as reported, or [`MISSING_MAP`].
    pub fn map_or_default(&self) -> &str {
        self.map.as_deref().unwrap_or(MISSING_MAP)
    }

    /// Aggregate MAP as a number, when present and numeric.
    pub fn map_value(&self) -> Option<f64> {
        self.map.as_deref().and_then(|m| m.parse().ok())
    }
}

/// Walk report lines in order, writing per-query verdicts and precision
/// aggregates to `log` as they are met, then the aggregate MAP.
///
/// With a baseline, each per-query MAP line becomes `"<query>\t<outcome>"`
/// and an unknown query aborts scoring. Without one, the line is
/// `"<query>\t<map>"`.
pub fn score_lines<'a, I>(
    scraper: &MetricScraper,
    baseline: Option<&Baseline>,
    lines: I,
    log: &mut RunLog,
) -> Result<Scorecard>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut card = Scorecard::default();

    for line in lines {
        match scraper.classify(line)? {
            MetricLine::PerQueryMap { query, value, raw } => {
                card.per_query.push((query.clone(), value));
                match baseline {
                    Some(baseline) => {
                        let outcome = baseline.compare(&query, value)?;
                        log.emit(&format!("{query}\t{outcome}"))?;
                        card.tally.record(outcome);
                        card.outcomes.push(QueryOutcome {
                            baseline: baseline.get(&query).unwrap_or_default(),
                            query,
                            map: value,
                            outcome,
                        });
                    }
                    None => log.emit(&format!("{query}\t{raw}"))?,
                }
            }
            MetricLine::Aggregate { metric, value } => {
                let slot = match metric {
                    AggregateMetric::Map => {
                        debug!(map = %value, "Aggregate MAP");
                        card.map = Some(value);
                        continue;
                    }
                    AggregateMetric::P10 => &mut card.p10,
                    AggregateMetric::P20 => &mut card.p20,
                    AggregateMetric::P30 => &mut card.p30,
                };
                log.emit(&value)?;
                *slot = Some(value);
            }
            MetricLine::Ignored => {}
        }
    }

    log.emit(card.map_or_default())?;
    Ok(card)
}
