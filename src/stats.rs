use itertools::{Itertools, MinMaxResult};
use serde::{Deserialize, Serialize};

use crate::session::TrialResult;

/// Which trials feed the timing statistics. Accuracy always counts every trial.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum TimingScope {
    /// Every recorded response, decoy picks included
    #[default]
    AllTrials,
    HitsOnly,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingStats {
    pub samples: usize,
    pub mean_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
    pub range_ms: f64,
    pub std_dev_ms: f64,
}

/// Descriptive aggregates over a finished session. Derived on demand, never stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResultsSummary {
    pub count: usize,
    pub hits: usize,
    /// `None` when there are no trials
    pub accuracy_pct: Option<f64>,
    /// `None` when no trial falls inside the timing scope
    pub timing: Option<TimingStats>,
}

impl ResultsSummary {
    pub fn has_data(&self) -> bool {
        self.count > 0
    }

    pub fn misses(&self) -> usize {
        self.count - self.hits
    }
}

pub fn summarize(results: &[TrialResult], scope: TimingScope) -> ResultsSummary {
    let count = results.len();
    let hits = results.iter().filter(|r| r.hit).count();

    let accuracy_pct = match count {
        0 => None,
        n => Some(hits as f64 / n as f64 * 100.0),
    };

    let samples = results
        .iter()
        .filter(|r| match scope {
            TimingScope::AllTrials => true,
            TimingScope::HitsOnly => r.hit,
        })
        .map(TrialResult::elapsed_ms)
        .collect::<Vec<f64>>();

    ResultsSummary {
        count,
        hits,
        accuracy_pct,
        timing: timing_stats(&samples),
    }
}

fn timing_stats(samples: &[f64]) -> Option<TimingStats> {
    let (min_ms, max_ms) = match samples.iter().copied().minmax_by(f64::total_cmp) {
        MinMaxResult::NoElements => return None,
        MinMaxResult::OneElement(x) => (x, x),
        MinMaxResult::MinMax(lo, hi) => (lo, hi),
    };

    Some(TimingStats {
        samples: samples.len(),
        mean_ms: mean(samples)?,
        min_ms,
        max_ms,
        range_ms: max_ms - min_ms,
        std_dev_ms: std_dev(samples)?,
    })
}

pub fn mean(data: &[f64]) -> Option<f64> {
    match data.len() {
        0 => None,
        count => Some(data.iter().sum::<f64>() / count as f64),
    }
}

/// Population standard deviation
pub fn std_dev(data: &[f64]) -> Option<f64> {
    let data_mean = mean(data)?;
    let variance = data
        .iter()
        .map(|value| {
            let diff = data_mean - *value;

            diff * diff
        })
        .sum::<f64>()
        / data.len() as f64;

    Some(variance.sqrt())
}
