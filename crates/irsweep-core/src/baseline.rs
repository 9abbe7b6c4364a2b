//! Reference per-query MAP and win/lose comparison.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SweepError};

/// How a query fared against its baseline.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Win,
    Lose,
    Equal,
}

impl Outcome {
    /// Label written to the report.
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Win => "win",
            Outcome::Lose => "lose",
            Outcome::Equal => "equal",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Query id to reference MAP. Fixed for the lifetime of a sweep.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Baseline(BTreeMap<String, f64>);

impl Baseline {
    pub fn new(entries: BTreeMap<String, f64>) -> Self {
        Self(entries)
    }

    pub fn get(&self, query: &str) -> Option<f64> {
        self.0.get(query).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Compare `value` with the baseline for `query`.
    ///
    /// A query without a baseline entry is an error.
    pub fn compare(&self, query: &str, value: f64) -> Result<Outcome> {
        let reference = self.get(query).ok_or_else(|| SweepError::MissingBaseline {
            query: query.to_string(),
        })?;

        Ok(if value > reference {
            Outcome::Win
        } else if value < reference {
            Outcome::Lose
        } else {
            Outcome::Equal
        })
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for Baseline {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Running count of per-query outcomes.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tally {
    pub wins: usize,
    pub losses: usize,
    pub ties: usize,
}

impl Tally {
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Win => self.wins += 1,
            Outcome::Lose => self.losses += 1,
            Outcome::Equal => self.ties += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.wins + self.losses + self.ties
    }
}

/// Rendered as `wins/losses`; ties are not shown.
impl fmt::Display for Tally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.wins, self.losses)
    }
}
