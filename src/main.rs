use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::Rect,
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    time::Duration,
};

use reflex::{
    app::{Flow, TICK_RATE_MS},
    config::{Config, ConfigStore, FileConfigStore, Mode},
    logging,
    runtime::{CrosstermEventSource, FixedTicker, ReflexEvent, Runner},
    stats::TimingScope,
    App,
};

/// reaction time and spatial tracking trainer for the terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Measures how fast you react to a target and how accurately you pick it out among decoys, then scores the session against reference times."
)]
pub struct Cli {
    /// which test to run (defaults to the config file, else battery)
    #[clap(short = 'm', long, value_enum)]
    mode: Option<Mode>,

    /// number of trials per session
    #[clap(short = 't', long)]
    trials: Option<usize>,

    /// grid rows
    #[clap(long)]
    rows: Option<usize>,

    /// grid columns
    #[clap(long)]
    cols: Option<usize>,

    /// shortest wait before a target appears, in ms
    #[clap(long = "min-delay")]
    min_delay: Option<u64>,

    /// longest wait before a target appears, in ms
    #[clap(long = "max-delay")]
    max_delay: Option<u64>,

    /// compute timing statistics over hits only
    #[clap(long)]
    hits_only: bool,

    /// seed for a reproducible trial sequence
    #[clap(long)]
    seed: Option<u64>,

    /// write the results to this CSV file when the run finishes
    #[clap(long)]
    export: Option<PathBuf>,

    /// persist the effective settings to the config file
    #[clap(long)]
    save_config: bool,
}

impl Cli {
    /// Layer the flags that were given over the stored settings
    fn apply_to(&self, config: &mut Config) {
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if self.trials.is_some() {
            config.trials = self.trials;
        }
        if self.rows.is_some() {
            config.rows = self.rows;
        }
        if self.cols.is_some() {
            config.cols = self.cols;
        }
        if self.min_delay.is_some() {
            config.min_delay_ms = self.min_delay;
        }
        if self.max_delay.is_some() {
            config.max_delay_ms = self.max_delay;
        }
        if self.hits_only {
            config.timing_scope = TimingScope::HitsOnly;
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    if let Err(e) = logging::init() {
        eprintln!("logging disabled: {}", e);
    }

    let store = FileConfigStore::new();
    let mut config = store.load();
    cli.apply_to(&mut config);

    if cli.save_config {
        match store.save(&config) {
            Ok(()) => log::info!("saved config to {}", store.path().display()),
            Err(e) => log::error!("could not save config to {}: {}", store.path().display(), e),
        }
    }

    let mut app = match App::with_monotonic_clock(config, cli.seed) {
        Ok(app) => app,
        Err(e) => {
            let mut cmd = Cli::command();
            cmd.error(ErrorKind::ValueValidation, e).exit();
        }
    };
    app.export_path = cli.export.clone();
    log::info!("starting {} with seed {}", app.config.mode, app.seed);

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    res
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );
    let mut area: Rect = terminal.draw(|f| f.render_widget(&*app, f.area()))?.area;
    app.set_area(area);

    loop {
        match runner.step() {
            ReflexEvent::Key(key) => {
                if app.on_key(key) == Flow::Quit {
                    break;
                }
            }
            ReflexEvent::Click { column, row } => app.on_click(column, row, area),
            ReflexEvent::Resize => {}
            ReflexEvent::Tick => app.on_tick(),
        }

        area = terminal.draw(|f| f.render_widget(&*app, f.area()))?.area;
        app.set_area(area);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["reflex"]);

        assert_eq!(cli.mode, None);
        assert_eq!(cli.trials, None);
        assert_eq!(cli.seed, None);
        assert_eq!(cli.export, None);
        assert!(!cli.hits_only);
        assert!(!cli.save_config);
    }

    #[test]
    fn test_cli_mode() {
        let cli = Cli::parse_from(["reflex", "-m", "grid"]);
        assert_eq!(cli.mode, Some(Mode::Grid));

        let cli = Cli::parse_from(["reflex", "--mode", "reaction"]);
        assert_eq!(cli.mode, Some(Mode::Reaction));
    }

    #[test]
    fn test_cli_rejects_unknown_mode() {
        assert!(Cli::try_parse_from(["reflex", "-m", "marathon"]).is_err());
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::parse_from([
            "reflex",
            "-t",
            "12",
            "--rows",
            "2",
            "--cols",
            "4",
            "--min-delay",
            "500",
            "--max-delay",
            "900",
            "--seed",
            "42",
            "--export",
            "out.csv",
        ]);

        assert_eq!(cli.trials, Some(12));
        assert_eq!(cli.rows, Some(2));
        assert_eq!(cli.cols, Some(4));
        assert_eq!(cli.min_delay, Some(500));
        assert_eq!(cli.max_delay, Some(900));
        assert_eq!(cli.seed, Some(42));
        assert_eq!(cli.export, Some(PathBuf::from("out.csv")));
    }

    #[test]
    fn test_apply_to_keeps_stored_values_when_flags_absent() {
        let cli = Cli::parse_from(["reflex"]);
        let mut config = Config {
            mode: Mode::Field,
            trials: Some(3),
            ..Config::default()
        };
        cli.apply_to(&mut config);

        assert_eq!(config.mode, Mode::Field);
        assert_eq!(config.trials, Some(3));
        assert_eq!(config.timing_scope, TimingScope::AllTrials);
    }

    #[test]
    fn test_apply_to_overrides_stored_values() {
        let cli = Cli::parse_from(["reflex", "-m", "row", "-t", "4", "--hits-only"]);
        let mut config = Config {
            mode: Mode::Field,
            trials: Some(3),
            ..Config::default()
        };
        cli.apply_to(&mut config);

        assert_eq!(config.mode, Mode::Row);
        assert_eq!(config.trials, Some(4));
        assert_eq!(config.timing_scope, TimingScope::HitsOnly);
        assert_eq!(config.stages().unwrap()[0].session.trial_count, 4);
    }

    #[test]
    fn test_cli_flags_reach_engine_validation() {
        let cli = Cli::parse_from([
            "reflex",
            "-m",
            "reaction",
            "--min-delay",
            "900",
            "--max-delay",
            "100",
        ]);
        let mut config = Config::default();
        cli.apply_to(&mut config);

        assert!(config.stages().is_err());
    }
}
