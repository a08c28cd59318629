use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::error::ConfigError;
use crate::feedback::{default_baselines, Baseline, FeedbackTables};
use crate::session::SessionConfig;
use crate::stats::TimingScope;

/// Presentation variants of the same engine
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum, strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "lowercase")]
pub enum Mode {
    /// single target after a random 1-3s delay
    Reaction,
    /// one row of five slots, no delay
    Row,
    /// 3x6 grid, no delay
    Grid,
    /// 6x6 grid, no delay
    Field,
    /// reaction followed by row, as two stages
    Battery,
}

impl Mode {
    /// Single-stage modes that make up this mode, in run order
    pub fn stages(&self) -> Vec<Mode> {
        match self {
            Mode::Battery => vec![Mode::Reaction, Mode::Row],
            single => vec![*single],
        }
    }

    pub fn is_multi_stage(&self) -> bool {
        self.stages().len() > 1
    }

    /// Default session parameters for a single-stage mode
    pub fn preset(&self) -> SessionConfig {
        let (trial_count, grid_rows, grid_cols, min_delay_ms, max_delay_ms) = match self {
            Mode::Reaction => (5, 1, 1, 1000, 3000),
            Mode::Row | Mode::Battery => (8, 1, 5, 0, 0),
            Mode::Grid => (10, 3, 6, 0, 0),
            Mode::Field => (15, 6, 6, 0, 0),
        };
        SessionConfig {
            trial_count,
            grid_rows,
            grid_cols,
            min_delay_ms,
            max_delay_ms,
        }
    }

    pub fn default_feedback(&self) -> FeedbackTables {
        match self {
            Mode::Reaction => FeedbackTables::reaction(),
            Mode::Row => FeedbackTables::tracking(),
            Mode::Grid | Mode::Field | Mode::Battery => FeedbackTables::default(),
        }
    }
}

/// One engine session of a run, with the tables used to judge it
#[derive(Debug, Clone, PartialEq)]
pub struct Stage {
    pub mode: Mode,
    pub session: SessionConfig,
    pub feedback: FeedbackTables,
}

/// User settings, loaded from the config file and overridden by CLI flags
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub mode: Mode,
    pub trials: Option<usize>,
    pub rows: Option<usize>,
    pub cols: Option<usize>,
    pub min_delay_ms: Option<u64>,
    pub max_delay_ms: Option<u64>,
    /// How long the per-trial toast stays up before the next delay starts
    pub feedback_ms: u64,
    pub timing_scope: TimingScope,
    /// Replaces every stage's default tables when set
    pub feedback: Option<FeedbackTables>,
    pub baselines: Vec<Baseline>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: Mode::Battery,
            trials: None,
            rows: None,
            cols: None,
            min_delay_ms: None,
            max_delay_ms: None,
            feedback_ms: 300,
            timing_scope: TimingScope::AllTrials,
            feedback: None,
            baselines: default_baselines(),
        }
    }
}

impl Config {
    /// Build the validated stage list. Overrides only apply to single-stage modes.
    pub fn stages(&self) -> Result<Vec<Stage>, ConfigError> {
        let multi = self.mode.is_multi_stage();

        self.mode
            .stages()
            .into_iter()
            .map(|mode| {
                let mut session = mode.preset();
                if !multi {
                    self.apply_overrides(&mut session);
                }
                session.validate()?;
                Ok(Stage {
                    mode,
                    session,
                    feedback: self
                        .feedback
                        .clone()
                        .unwrap_or_else(|| mode.default_feedback()),
                })
            })
            .collect()
    }

    fn apply_overrides(&self, session: &mut SessionConfig) {
        if let Some(trials) = self.trials {
            session.trial_count = trials;
        }
        if let Some(rows) = self.rows {
            session.grid_rows = rows;
        }
        if let Some(cols) = self.cols {
            session.grid_cols = cols;
        }
        if let Some(min) = self.min_delay_ms {
            session.min_delay_ms = min;
            // a raised minimum drags the preset maximum along unless both were given
            if self.max_delay_ms.is_none() && session.max_delay_ms < min {
                session.max_delay_ms = min;
            }
        }
        if let Some(max) = self.max_delay_ms {
            session.max_delay_ms = max;
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        let path = AppDirs::config_path().unwrap_or_else(|| PathBuf::from("reflex_config.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        match fs::read(&self.path) {
            Ok(bytes) => match serde_json::from_slice::<Config>(&bytes) {
                Ok(cfg) => return cfg,
                Err(e) => log::warn!(
                    "ignoring malformed config {}: {}",
                    self.path.display(),
                    e
                ),
            },
            Err(e) => log::debug!("no config at {}: {}", self.path.display(), e),
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).map_err(std::io::Error::other)?;
        fs::write(&self.path, data)
    }
}
