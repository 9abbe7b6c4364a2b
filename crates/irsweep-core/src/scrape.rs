//! Classification of scoring-service report lines.
//!
//! The service answers with trec_eval-style rows, `<metric> <query> <value>`,
//! where the aggregate rows use `all` as the query. Only MAP (per query and
//! overall) and overall P10/P20/P30 are of interest.

use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SweepError};

/// Aggregate metrics picked out of a report.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AggregateMetric {
    Map,
    P10,
    P20,
    P30,
}

impl AggregateMetric {
    pub fn name(&self) -> &'static str {
        match self {
            AggregateMetric::Map => "map",
            AggregateMetric::P10 => "P10",
            AggregateMetric::P20 => "P20",
            AggregateMetric::P30 => "P30",
        }
    }
}

impl fmt::Display for AggregateMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One classified report line.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricLine {
    /// `map <query> <value>`; `raw` is the value token as reported.
    PerQueryMap {
        query: String,
        value: f64,
        raw: String,
    },

    /// `<metric> all <value>`; the value token is kept verbatim.
    Aggregate {
        metric: AggregateMetric,
        value: String,
    },

    Ignored,
}

/// Compiled line patterns, tried in declaration order.
#[derive(Debug, Clone)]
pub struct MetricScraper {
    per_query_map: Regex,
    aggregates: Vec<(AggregateMetric, Regex)>,
}

impl MetricScraper {
    pub fn new() -> Result<Self> {
        Ok(Self {
            per_query_map: Regex::new(r"(?i)^MAP\s+\d+")?,
            aggregates: vec![
                (AggregateMetric::Map, Regex::new(r"(?i)^MAP.*all.*")?),
                (AggregateMetric::P10, Regex::new(r"(?i)^P10\s.*all.*")?),
                (AggregateMetric::P20, Regex::new(r"(?i)^P20\s.*all.*")?),
                (AggregateMetric::P30, Regex::new(r"(?i)^P30\s.*all.*")?),
            ],
        })
    }

    /// Classify a single line.
    ///
    /// A line that matches a pattern but lacks the expected fields is an error.
    pub fn classify(&self, line: &str) -> Result<MetricLine> {
        if self.per_query_map.is_match(line) {
            let (query, raw) = split_fields(line)?;
            let value = raw.parse::<f64>().map_err(|e| SweepError::MalformedLine {
                line: line.to_string(),
                reason: format!("value {raw:?} is not a number: {e}"),
            })?;
            return Ok(MetricLine::PerQueryMap {
                query: query.to_string(),
                value,
                raw: raw.to_string(),
            });
        }

        for (metric, pattern) in &self.aggregates {
            if pattern.is_match(line) {
                let (_, value) = split_fields(line)?;
                return Ok(MetricLine::Aggregate {
                    metric: *metric,
                    value: value.to_string(),
                });
            }
        }

        Ok(MetricLine::Ignored)
    }

    /// Classify every line, dropping the ignored ones.
    pub fn classify_all<'a, I>(&self, lines: I) -> Result<Vec<MetricLine>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut out = Vec::new();
        for line in lines {
            match self.classify(line)? {
                MetricLine::Ignored => {}
                classified => out.push(classified),
            }
        }
        Ok(out)
    }
}

/// Second and third whitespace-separated fields.
fn split_fields(line: &str) -> Result<(&str, &str)> {
    let mut fields = line.split_whitespace().skip(1);
    match (fields.next(), fields.next()) {
        (Some(query), Some(value)) => Ok((query, value)),
        _ => Err(SweepError::MalformedLine {
            line: line.to_string(),
            reason: "expected `<metric> <query> <value>`".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scraper() -> MetricScraper {
        MetricScraper::new().unwrap()
    }

    #[test]
    fn test_per_query_map() {
        let line = scraper().classify("map                   \t12\t0.3000").unwrap();
        assert_eq!(
            line,
            MetricLine::PerQueryMap {
                query: "12".to_string(),
                value: 0.3,
                raw: "0.3000".to_string(),
            }
        );
    }

    #[test]
    fn test_case_insensitive() {
        assert!(matches!(
            scraper().classify("MAP 10 0.0170").unwrap(),
            MetricLine::PerQueryMap { .. }
        ));
        assert!(matches!(
            scraper().classify("p10 ALL 0.4000").unwrap(),
            MetricLine::Aggregate {
                metric: AggregateMetric::P10,
                ..
            }
        ));
    }

    #[test]
    fn test_aggregate_map_keeps_token() {
        let line = scraper().classify("map  all  0.1250").unwrap();
        assert_eq!(
            line,
            MetricLine::Aggregate {
                metric: AggregateMetric::Map,
                value: "0.1250".to_string()
            }
        );
    }

    #[test]
    fn test_aggregate_precisions() {
        let s = scraper();
        for (text, metric) in [
            ("P10 all 0.3100", AggregateMetric::P10),
            ("P20 all 0.2650", AggregateMetric::P20),
            ("P30 all 0.2233", AggregateMetric::P30),
        ] {
            match s.classify(text).unwrap() {
                MetricLine::Aggregate { metric: m, .. } => assert_eq!(m, metric),
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn test_per_query_precision_ignored() {
        assert_eq!(scraper().classify("P10 12 0.5000").unwrap(), MetricLine::Ignored);
    }

    #[test]
    fn test_prefix_only_match() {
        assert_eq!(
            scraper().classify("  map 12 0.3").unwrap(),
            MetricLine::Ignored
        );
        assert_eq!(scraper().classify("gm_map all 0.1").unwrap(), MetricLine::Ignored);
        assert_eq!(scraper().classify("P100 all 0.1").unwrap(), MetricLine::Ignored);
    }

    #[test]
    fn test_noise_lines_ignored() {
        let s = scraper();
        assert_eq!(s.classify("HTTP/1.1 200 OK").unwrap(), MetricLine::Ignored);
        assert_eq!(s.classify("").unwrap(), MetricLine::Ignored);
        assert_eq!(s.classify("num_rel all 1200").unwrap(), MetricLine::Ignored);
    }

    #[test]
    fn test_missing_value_is_malformed() {
        let err = scraper().classify("map 12").unwrap_err();
        assert!(matches!(err, SweepError::MalformedLine { .. }));
    }

    #[test]
    fn test_non_numeric_value_is_malformed() {
        let err = scraper().classify("map 12 n/a").unwrap_err();
        assert!(err.to_string().contains("not a number"));
    }

    #[test]
    fn test_classify_all_preserves_order() {
        let lines = "map 10 0.02\nnum_q all 10\nP10 all 0.3\nmap all 0.12\n";
        let classified = scraper().classify_all(lines.lines()).unwrap();
        assert_eq!(classified.len(), 3);
        assert!(matches!(classified[0], MetricLine::PerQueryMap { .. }));
        assert!(matches!(
            classified[2],
            MetricLine::Aggregate {
                metric: AggregateMetric::Map,
                ..
            }
        ));
    }
}
