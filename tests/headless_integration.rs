use std::sync::mpsc::{self, Sender};
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::layout::Rect;

use reflex::app::{App, AppState, Flow, TICK_RATE_MS};
use reflex::clock::{Clock, ManualClock};
use reflex::config::{Config, Mode};
use reflex::runtime::{FixedTicker, ReflexEvent, Runner, TestEventSource};
use reflex::ui::grid::{cell_rects, running_layout};

// Headless integration using the internal runtime + App without a TTY.
// Ticks advance a manual clock, so delays elapse without real waiting.

type TestRunner = Runner<TestEventSource, FixedTicker>;

fn key(code: KeyCode) -> ReflexEvent {
    ReflexEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

fn harness(
    config: Config,
    seed: u64,
) -> (App<ManualClock>, ManualClock, TestRunner, Sender<ReflexEvent>) {
    let clock = ManualClock::new();
    let app = App::new(config, clock.clone(), Some(seed)).unwrap();
    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(1)),
    );
    (app, clock, runner, tx)
}

/// One pass of the binary's event loop, with a simulated tick length.
fn pump(app: &mut App<ManualClock>, clock: &ManualClock, runner: &TestRunner, area: Rect) -> Flow {
    app.set_area(area);
    match runner.step() {
        ReflexEvent::Key(k) => return app.on_key(k),
        ReflexEvent::Click { column, row } => app.on_click(column, row, area),
        ReflexEvent::Resize => {}
        ReflexEvent::Tick => {
            clock.advance_ms(TICK_RATE_MS);
            app.on_tick();
        }
    }
    Flow::Continue
}

#[test]
fn headless_reaction_flow_completes() {
    let config = Config {
        mode: Mode::Reaction,
        ..Config::default()
    };
    let (mut app, clock, runner, tx) = harness(config, 9);
    let area = Rect::new(0, 0, 80, 24);

    tx.send(key(KeyCode::Char(' '))).unwrap();

    let mut pressed = 0;
    for _ in 0..10_000u32 {
        pump(&mut app, &clock, &runner, area);
        if app.state == AppState::Results {
            break;
        }
        // react on the first tick the target is up
        if app.is_armed() && pressed == app.engine.results().len() {
            tx.send(key(KeyCode::Enter)).unwrap();
            pressed += 1;
        }
    }

    assert_eq!(app.state, AppState::Results);
    let summaries = app.summaries();
    assert_eq!(summaries.len(), 1);
    let summary = summaries[0].1;
    assert_eq!(summary.count, 5);
    assert_eq!(summary.hits, 5);
    // a key sent after arming lands on the very next step, before another tick
    assert_eq!(summary.timing.unwrap().max_ms, 0.0);
}

#[test]
fn headless_row_flow_with_clicks() {
    let config = Config {
        mode: Mode::Row,
        ..Config::default()
    };
    let (mut app, clock, runner, tx) = harness(config, 4);
    let area = Rect::new(0, 0, 80, 24);
    let cells = cell_rects(running_layout(area).board, 1, 5);

    app.begin();
    let mut sent = 0;
    for _ in 0..10_000u32 {
        pump(&mut app, &clock, &runner, area);
        if app.state == AppState::Results {
            break;
        }
        if app.is_armed() && sent == app.engine.results().len() {
            // alternate between clicking the target and the slot after it
            let target = app.engine.current_trial().unwrap().target_slot;
            let slot = if sent % 2 == 0 { target } else { (target + 1) % 5 };
            let cell = cells[slot];
            tx.send(ReflexEvent::Click {
                column: cell.x + cell.width / 2,
                row: cell.y + cell.height / 2,
            })
            .unwrap();
            sent += 1;
        }
    }

    assert_eq!(app.state, AppState::Results);
    let summary = app.summaries()[0].1;
    assert_eq!(summary.count, 8);
    assert_eq!(summary.hits, 4);
    assert_eq!(summary.accuracy_pct, Some(50.0));
}

#[test]
fn headless_battery_moves_through_both_stages() {
    let (mut app, clock, runner, tx) = harness(Config::default(), 21);
    let area = Rect::new(0, 0, 80, 24);

    app.begin();
    let mut sent = 0;
    let mut stages_seen = vec![];
    for _ in 0..20_000u32 {
        pump(&mut app, &clock, &runner, area);
        if app.state == AppState::Results {
            break;
        }
        if !stages_seen.contains(&app.stage_idx) {
            stages_seen.push(app.stage_idx);
        }
        let done = app.completed.iter().map(|r| r.results.len()).sum::<usize>()
            + app.engine.results().len();
        if app.is_armed() && sent == done {
            let target = app.engine.current_trial().unwrap().target_slot;
            let digit = char::from_digit(target as u32 + 1, 10).unwrap();
            tx.send(key(KeyCode::Char(digit))).unwrap();
            sent += 1;
        }
    }

    assert_eq!(app.state, AppState::Results);
    assert_eq!(stages_seen, vec![0, 1]);
    let summaries = app.summaries();
    assert_eq!(summaries[0].0, Mode::Reaction);
    assert_eq!(summaries[0].1.count, 5);
    assert_eq!(summaries[1].0, Mode::Row);
    assert_eq!(summaries[1].1.count, 8);
    assert_eq!(summaries[1].1.hits, 8);
}

#[test]
fn headless_escape_quits_mid_run() {
    let config = Config {
        mode: Mode::Grid,
        ..Config::default()
    };
    let (mut app, clock, runner, tx) = harness(config, 2);
    let area = Rect::new(0, 0, 80, 24);

    app.begin();
    pump(&mut app, &clock, &runner, area);
    tx.send(key(KeyCode::Esc)).unwrap();

    let mut flow = Flow::Continue;
    for _ in 0..10u32 {
        flow = pump(&mut app, &clock, &runner, area);
        if flow == Flow::Quit {
            break;
        }
    }
    assert_eq!(flow, Flow::Quit);
}

#[test]
fn headless_grid_resumes_after_the_terminal_grows() {
    let config = Config {
        mode: Mode::Grid,
        trials: Some(1),
        rows: Some(1),
        cols: Some(100),
        ..Config::default()
    };
    let (mut app, clock, runner, tx) = harness(config, 5);

    app.begin();
    for _ in 0..200u32 {
        pump(&mut app, &clock, &runner, Rect::new(0, 0, 80, 24));
    }
    assert!(!app.is_armed());
    assert_eq!(app.state, AppState::Running);

    let wide = Rect::new(0, 0, 520, 24);
    pump(&mut app, &clock, &runner, wide);
    assert!(app.is_armed());

    let slot = app.engine.current_trial().unwrap().target_slot;
    let cell = cell_rects(running_layout(wide).board, 1, 100)[slot];
    tx.send(ReflexEvent::Click {
        column: cell.x + cell.width / 2,
        row: cell.y + cell.height / 2,
    })
    .unwrap();
    while app.state == AppState::Running {
        pump(&mut app, &clock, &runner, wide);
    }

    let summary = app.summaries()[0].1;
    assert_eq!(summary.hits, 1);
    // armed and clicked within one loop pass
    assert_eq!(summary.timing.unwrap().max_ms, 0.0);
}

#[test]
fn headless_delay_is_measured_on_the_manual_clock() {
    let config = Config {
        mode: Mode::Reaction,
        trials: Some(1),
        min_delay_ms: Some(500),
        max_delay_ms: Some(500),
        ..Config::default()
    };
    let (mut app, clock, runner, _tx) = harness(config, 0);
    let area = Rect::new(0, 0, 80, 24);

    app.begin();
    while !app.is_armed() {
        pump(&mut app, &clock, &runner, area);
    }

    assert_eq!(clock.now(), Duration::from_millis(500));
}
