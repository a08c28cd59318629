use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::ConfigError;

/// Parameters of one session. Validated when the session starts and left
/// untouched while it runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub trial_count: usize,
    pub grid_rows: usize,
    pub grid_cols: usize,
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl SessionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_rows == 0 || self.grid_cols == 0 {
            return Err(ConfigError::ZeroGridDimension {
                rows: self.grid_rows,
                cols: self.grid_cols,
            });
        }
        if self.grid_rows.checked_mul(self.grid_cols).is_none() {
            return Err(ConfigError::GridTooLarge {
                rows: self.grid_rows,
                cols: self.grid_cols,
            });
        }
        if self.max_delay_ms < self.min_delay_ms {
            return Err(ConfigError::InvertedDelayRange {
                min: self.min_delay_ms,
                max: self.max_delay_ms,
            });
        }
        Ok(())
    }

    /// Number of selectable positions. Only meaningful on a validated config.
    pub fn slot_count(&self) -> usize {
        self.grid_rows * self.grid_cols
    }

    /// Row and column of a slot, row-major.
    pub fn slot_position(&self, slot: usize) -> (usize, usize) {
        (slot / self.grid_cols, slot % self.grid_cols)
    }
}

/// One trial as handed out by the generator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrialSpec {
    pub index: usize,
    pub target_slot: usize,
    pub arm_delay: Duration,
}

/// Recorded outcome of a single trial
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialResult {
    pub index: usize,
    pub hit: bool,
    pub elapsed: Duration,
}

impl TrialResult {
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed.as_nanos() as f64 / 1_000_000.0
    }
}
