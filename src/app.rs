use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use rand::{rngs::StdRng, SeedableRng};
use ratatui::layout::Rect;
use std::path::PathBuf;
use std::time::Duration;

use crate::clock::{Clock, MonotonicClock};
use crate::config::{Config, Mode, Stage};
use crate::engine::{Advance, Engine, Step};
use crate::error::ConfigError;
use crate::export;
use crate::session::{TrialResult, TrialSpec};
use crate::stats::{summarize, ResultsSummary};
use crate::ui::grid::{grid_fits, running_layout, slot_at, step_cursor};

pub const TICK_RATE_MS: u64 = 10;

#[derive(Debug, Clone, PartialEq)]
pub enum AppState {
    Welcome,
    Running,
    Results,
}

/// What the event loop should do after an input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Results of one finished stage, copied out of the engine
#[derive(Debug, Clone, PartialEq)]
pub struct StageRecord {
    pub mode: Mode,
    pub results: Vec<TrialResult>,
}

/// Short message shown after a trial resolves
#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub message: String,
    pub hit: bool,
    pub until: Duration,
}

/// Terminal front end around one engine. Owns the wall-clock side of a run:
/// when to arm, how long a toast stays up, which stage comes next.
#[derive(Debug)]
pub struct App<C: Clock + Clone = MonotonicClock> {
    pub config: Config,
    pub stages: Vec<Stage>,
    pub stage_idx: usize,
    pub engine: Engine<C, StdRng>,
    pub clock: C,
    pub state: AppState,
    pub completed: Vec<StageRecord>,
    /// Clock reading at which the delaying trial gets armed
    pub arm_at: Option<Duration>,
    pub toast: Option<Toast>,
    pub cursor: usize,
    pub seed: u64,
    pub export_path: Option<PathBuf>,
    /// Last export outcome, shown on the results screen
    pub status: Option<String>,
    /// Size of the last drawn frame, unknown until the first draw
    pub area: Option<Rect>,
}

impl App<MonotonicClock> {
    pub fn with_monotonic_clock(config: Config, seed: Option<u64>) -> Result<Self, ConfigError> {
        Self::new(config, MonotonicClock::new(), seed)
    }
}

impl<C: Clock + Clone> App<C> {
    pub fn new(config: Config, clock: C, seed: Option<u64>) -> Result<Self, ConfigError> {
        let stages = config.stages()?;
        let seed = seed.unwrap_or_else(rand::random);
        let engine = Engine::new(
            stages[0].session,
            clock.clone(),
            StdRng::seed_from_u64(seed),
        )?;

        Ok(Self {
            config,
            stages,
            stage_idx: 0,
            engine,
            clock,
            state: AppState::Welcome,
            completed: Vec::new(),
            arm_at: None,
            toast: None,
            cursor: 0,
            seed,
            export_path: None,
            status: None,
            area: None,
        })
    }

    pub fn current_stage(&self) -> &Stage {
        &self.stages[self.stage_idx]
    }

    /// Start the run from the first stage.
    pub fn begin(&mut self) {
        self.completed.clear();
        self.toast = None;
        self.status = None;
        self.state = AppState::Running;
        self.start_stage(0);
    }

    /// Run again. With `reseed` the trial sequence is new, otherwise it replays.
    pub fn restart(&mut self, reseed: bool) {
        if reseed {
            self.seed = rand::random();
        }
        self.engine = match Engine::new(
            self.stages[0].session,
            self.clock.clone(),
            StdRng::seed_from_u64(self.seed),
        ) {
            Ok(engine) => engine,
            Err(e) => {
                log::error!("stage config rejected on restart: {}", e);
                return;
            }
        };
        self.begin();
    }

    /// Abandon the run and go back to the welcome screen.
    pub fn cancel(&mut self) {
        log::info!("run cancelled at stage {}", self.stage_idx + 1);
        self.engine.reset();
        self.arm_at = None;
        self.toast = None;
        self.completed.clear();
        self.stage_idx = 0;
        self.state = AppState::Welcome;
    }

    fn start_stage(&mut self, idx: usize) {
        self.stage_idx = idx;
        self.cursor = 0;
        let session = self.stages[idx].session;
        if let Err(e) = self.engine.reset_with(session) {
            log::error!("stage {} config rejected: {}", idx + 1, e);
            self.state = AppState::Welcome;
            return;
        }
        let step = self.engine.start();
        self.apply(step);
    }

    /// Arm the pending trial once its delay has passed, and expire the toast.
    pub fn on_tick(&mut self) {
        let now = self.clock.now();

        if let Some(toast) = &self.toast {
            if now >= toast.until {
                self.toast = None;
            }
        }

        if self.state == AppState::Running {
            if let Some(due) = self.arm_at {
                // a target that can't be drawn must not start the timer
                if now >= due && self.board_fits() {
                    let step = self.engine.arm();
                    self.apply(step);
                }
            }
        }
    }

    /// Record the frame size the renderer last drew into.
    pub fn set_area(&mut self, area: Rect) {
        if self.area != Some(area) {
            log::debug!("terminal area is now {}x{}", area.width, area.height);
        }
        self.area = Some(area);
    }

    /// Whether every slot of the current stage is visible in the last drawn frame
    pub fn board_fits(&self) -> bool {
        let session = self.current_stage().session;
        match self.area {
            Some(area) => grid_fits(
                running_layout(area).board,
                session.grid_rows,
                session.grid_cols,
            ),
            None => true,
        }
    }

    /// Forward a slot pick to the engine. Stale or early picks are ignored there.
    pub fn select(&mut self, slot: usize) -> Step {
        if self.state != AppState::Running {
            return Step::Ignored;
        }
        let step = self.engine.select(slot);
        self.apply(step.clone());
        step
    }

    fn apply(&mut self, step: Step) {
        match step {
            Step::Ignored => {}
            Step::Queued(spec) => self.schedule(&spec, Duration::ZERO),
            Step::Armed(_) => self.arm_at = None,
            Step::Resolved { result, next } => {
                let now = self.clock.now();
                let pause = Duration::from_millis(self.config.feedback_ms);
                self.toast = Some(Toast {
                    message: self.toast_message(&result),
                    hit: result.hit,
                    until: now + pause,
                });
                match next {
                    Advance::Next(spec) => self.schedule(&spec, pause),
                    Advance::Completed => self.finish_stage(),
                }
            }
            Step::Completed => self.finish_stage(),
        }
    }

    fn schedule(&mut self, spec: &TrialSpec, pause: Duration) {
        self.arm_at = Some(self.clock.now() + pause + spec.arm_delay);
    }

    fn toast_message(&self, result: &TrialResult) -> String {
        let ms = result.elapsed_ms().round();
        if self.current_stage().session.slot_count() == 1 {
            format!("Reaction time: {} ms", ms)
        } else if result.hit {
            format!("Hit! ({} ms)", ms)
        } else {
            "Missed!".to_string()
        }
    }

    fn finish_stage(&mut self) {
        self.arm_at = None;
        self.completed.push(StageRecord {
            mode: self.current_stage().mode,
            results: self.engine.results().to_vec(),
        });

        if self.stage_idx + 1 < self.stages.len() {
            // the last toast of this stage stays up through the next stage's first delay
            self.start_stage(self.stage_idx + 1);
            if let (Some(due), Some(toast)) = (self.arm_at, &self.toast) {
                self.arm_at = Some(due.max(toast.until));
            }
        } else {
            log::info!("run finished after {} stage(s)", self.completed.len());
            self.state = AppState::Results;
            self.export_results();
        }
    }

    fn export_results(&mut self) {
        if let Some(path) = &self.export_path {
            self.status = Some(match export::export_to_path(path, &self.completed) {
                Ok(()) => format!("exported to {}", path.display()),
                Err(e) => {
                    log::error!("export to {} failed: {}", path.display(), e);
                    format!("export failed: {}", e)
                }
            });
        }
    }

    /// Summaries of finished stages, recomputed from the raw results each call
    pub fn summaries(&self) -> Vec<(Mode, ResultsSummary)> {
        self.completed
            .iter()
            .map(|record| (record.mode, summarize(&record.results, self.config.timing_scope)))
            .collect()
    }

    pub fn is_armed(&self) -> bool {
        self.engine.accepts_input()
    }

    pub fn on_key(&mut self, key: KeyEvent) -> Flow {
        if key.code == KeyCode::Esc
            || (key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c'))
        {
            return Flow::Quit;
        }

        match self.state {
            AppState::Welcome => {
                if matches!(key.code, KeyCode::Char(' ') | KeyCode::Enter) {
                    self.begin();
                }
            }
            AppState::Running => self.on_running_key(key),
            AppState::Results => match key.code {
                KeyCode::Char('r') => self.restart(false),
                KeyCode::Char('n') => self.restart(true),
                KeyCode::Char('b') => self.state = AppState::Welcome,
                _ => {}
            },
        }
        Flow::Continue
    }

    fn on_running_key(&mut self, key: KeyEvent) {
        let session = self.current_stage().session;
        let (rows, cols) = (session.grid_rows, session.grid_cols);

        match key.code {
            KeyCode::Char('c') => self.cancel(),
            KeyCode::Char(' ') | KeyCode::Enter => {
                self.select(self.cursor);
            }
            KeyCode::Char(d @ '1'..='9') => {
                let slot = d as usize - '1' as usize;
                if slot < session.slot_count() {
                    self.cursor = slot;
                    self.select(slot);
                }
            }
            KeyCode::Left => self.cursor = step_cursor(self.cursor, rows, cols, 0, -1),
            KeyCode::Right => self.cursor = step_cursor(self.cursor, rows, cols, 0, 1),
            KeyCode::Up => self.cursor = step_cursor(self.cursor, rows, cols, -1, 0),
            KeyCode::Down => self.cursor = step_cursor(self.cursor, rows, cols, 1, 0),
            _ => {}
        }
    }

    /// Map a click on the terminal to a slot using the same layout the renderer draws.
    pub fn on_click(&mut self, column: u16, row: u16, area: Rect) {
        if self.state != AppState::Running || !self.is_armed() {
            return;
        }
        let session = self.current_stage().session;
        let board = running_layout(area).board;
        if let Some(slot) = slot_at(board, session.grid_rows, session.grid_cols, column, row) {
            self.cursor = slot;
            self.select(slot);
        }
    }
}
