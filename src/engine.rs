use log::{debug, info, trace};
use rand::Rng;
use std::time::Duration;

use crate::clock::Clock;
use crate::error::ConfigError;
use crate::generator::next_spec;
use crate::session::{SessionConfig, TrialResult, TrialSpec};

/// Phase of a session. The engine is the only writer.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Idle,
    /// Trial generated, target not yet selectable. Input is ignored here.
    Delaying(TrialSpec),
    /// Target selectable since `armed_at`.
    Armed { spec: TrialSpec, armed_at: Duration },
    /// Passed through inside `select` before advancing; never left standing.
    TrialResolved(TrialResult),
    Completed(Vec<TrialResult>),
}

/// What happened to the session when the adapter called into the engine
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// The call did not apply to the current phase. Not an error.
    Ignored,
    /// A trial entered the delay phase and is waiting for `arm()`.
    Queued(TrialSpec),
    Armed(TrialSpec),
    Resolved { result: TrialResult, next: Advance },
    /// The session finished without a trial resolving (zero-trial session).
    Completed,
}

impl Step {
    pub fn is_ignored(&self) -> bool {
        matches!(self, Step::Ignored)
    }
}

/// Where the session went after a trial resolved
#[derive(Debug, Clone, PartialEq)]
pub enum Advance {
    Next(TrialSpec),
    Completed,
}

/// Trial engine: sequences one session of trials and records one result per trial.
#[derive(Debug)]
pub struct Engine<C: Clock, R: Rng> {
    config: SessionConfig,
    clock: C,
    rng: R,
    state: SessionState,
    results: Vec<TrialResult>,
}

impl<C: Clock, R: Rng> Engine<C, R> {
    pub fn new(config: SessionConfig, clock: C, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            clock,
            rng,
            state: SessionState::Idle,
            results: Vec::new(),
        })
    }

    /// Validate `config` and start a session with it. Only applies from `Idle`;
    /// an invalid config is rejected in every phase.
    pub fn start_session(&mut self, config: SessionConfig) -> Result<Step, ConfigError> {
        config.validate()?;
        if self.state != SessionState::Idle {
            trace!("start_session ignored in {}", self.phase_name());
            return Ok(Step::Ignored);
        }
        self.config = config;
        Ok(self.start())
    }

    /// Start a session with the current config.
    pub fn start(&mut self) -> Step {
        if self.state != SessionState::Idle {
            trace!("start ignored in {}", self.phase_name());
            return Step::Ignored;
        }

        self.results.clear();
        info!(
            "session started: {} trials on a {}x{} grid, delay {}..={}ms",
            self.config.trial_count,
            self.config.grid_rows,
            self.config.grid_cols,
            self.config.min_delay_ms,
            self.config.max_delay_ms
        );

        match self.queue_trial(0) {
            Some(spec) => Step::Queued(spec),
            None => Step::Completed,
        }
    }

    /// Make the pending trial selectable and start its response clock.
    pub fn arm(&mut self) -> Step {
        let spec = match self.state {
            SessionState::Delaying(spec) => spec,
            _ => {
                trace!("arm ignored in {}", self.phase_name());
                return Step::Ignored;
            }
        };

        let armed_at = self.clock.now();
        debug!(
            "trial {} armed at {:?}, target slot {}",
            spec.index, armed_at, spec.target_slot
        );
        self.state = SessionState::Armed { spec, armed_at };
        Step::Armed(spec)
    }

    /// Resolve the armed trial with the slot the user picked. A decoy resolves
    /// the trial as a miss; anything outside `Armed` is ignored.
    pub fn select(&mut self, slot: usize) -> Step {
        let (spec, armed_at) = match self.state {
            SessionState::Armed { spec, armed_at } => (spec, armed_at),
            _ => {
                trace!("select({}) ignored in {}", slot, self.phase_name());
                return Step::Ignored;
            }
        };

        let result = TrialResult {
            index: spec.index,
            hit: slot == spec.target_slot,
            elapsed: self.clock.since(armed_at),
        };
        debug!(
            "trial {} resolved: slot {} ({}), {:.1}ms",
            result.index,
            slot,
            if result.hit { "hit" } else { "miss" },
            result.elapsed_ms()
        );

        self.results.push(result);
        self.state = SessionState::TrialResolved(result);

        let next = self.advance(result);
        Step::Resolved { result, next }
    }

    /// Drop the session, including any pending trial, and go back to `Idle`.
    pub fn reset(&mut self) {
        if self.state != SessionState::Idle {
            debug!("reset from {}", self.phase_name());
        }
        self.state = SessionState::Idle;
        self.results.clear();
    }

    /// Reset and swap in a new config for the next session.
    pub fn reset_with(&mut self, config: SessionConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.reset();
        self.config = config;
        Ok(())
    }

    /// Leave `TrialResolved` for the next trial or for `Completed`.
    fn advance(&mut self, resolved: TrialResult) -> Advance {
        match self.queue_trial(resolved.index + 1) {
            Some(spec) => Advance::Next(spec),
            None => Advance::Completed,
        }
    }

    /// Enter `Delaying` for trial `index`, or `Completed` if the session is done.
    fn queue_trial(&mut self, index: usize) -> Option<TrialSpec> {
        if index < self.config.trial_count {
            let spec = next_spec(&self.config, index, &mut self.rng);
            debug!(
                "trial {} queued, arming after {:?}",
                spec.index, spec.arm_delay
            );
            self.state = SessionState::Delaying(spec);
            Some(spec)
        } else {
            let results = std::mem::take(&mut self.results);
            info!("session completed with {} results", results.len());
            self.state = SessionState::Completed(results);
            None
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Results recorded so far, or the final list once completed.
    pub fn results(&self) -> &[TrialResult] {
        match &self.state {
            SessionState::Completed(results) => results,
            _ => &self.results,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.state, SessionState::Completed(_))
    }

    pub fn accepts_input(&self) -> bool {
        matches!(self.state, SessionState::Armed { .. })
    }

    /// The trial currently in flight, delaying or armed.
    pub fn current_trial(&self) -> Option<&TrialSpec> {
        match &self.state {
            SessionState::Delaying(spec) | SessionState::Armed { spec, .. } => Some(spec),
            _ => None,
        }
    }

    /// 1-based number of the trial in flight and the session length
    pub fn progress(&self) -> Option<(usize, usize)> {
        self.current_trial()
            .map(|spec| (spec.index + 1, self.config.trial_count))
    }

    fn phase_name(&self) -> &'static str {
        match self.state {
            SessionState::Idle => "Idle",
            SessionState::Delaying(_) => "Delaying",
            SessionState::Armed { .. } => "Armed",
            SessionState::TrialResolved(_) => "TrialResolved",
            SessionState::Completed(_) => "Completed",
        }
    }
}
