use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph, Widget, Wrap},
};

use crate::app::App;
use crate::clock::Clock;
use crate::feedback::{FeedbackTables, ThresholdTable, Tier};
use crate::stats::ResultsSummary;
use crate::ui::charting::{
    baseline_bars, compute_bar_max, fit_bar_width, format_label, format_ms, trial_bars, BarPoint,
};
use crate::ui::grid::{
    cell_rects, grid_fits, running_layout, HORIZONTAL_MARGIN, VERTICAL_MARGIN,
};

/// A UI Screen boundary: renders one app state into the buffer
pub trait Screen {
    fn render<C: Clock + Clone>(&self, app: &App<C>, area: Rect, buf: &mut Buffer);
}

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn dim() -> Style {
    Style::default().add_modifier(Modifier::DIM)
}

fn italic() -> Style {
    Style::default().add_modifier(Modifier::ITALIC)
}

/// Mode summary and how to start
pub struct WelcomeScreen;

impl Screen for WelcomeScreen {
    fn render<C: Clock + Clone>(&self, app: &App<C>, area: Rect, buf: &mut Buffer) {
        let mut lines = vec![
            Line::from(Span::styled("reflex", bold().fg(Color::Green))),
            Line::from(""),
            Line::from(Span::styled(format!("mode: {}", app.config.mode), bold())),
        ];

        for (idx, stage) in app.stages.iter().enumerate() {
            let s = &stage.session;
            let delay = if s.max_delay_ms == 0 {
                "no delay".to_string()
            } else {
                format!("{}-{} ms delay", s.min_delay_ms, s.max_delay_ms)
            };
            lines.push(Line::from(format!(
                "{}. {}: {} trials on a {}x{} grid, {}",
                idx + 1,
                stage.mode,
                s.trial_count,
                s.grid_rows,
                s.grid_cols,
                delay
            )));
        }

        lines.push(Line::from(""));
        let hint = if app.stages.iter().all(|s| s.session.slot_count() == 1) {
            "Wait for the target to turn green, then press space as fast as you can."
        } else {
            "Pick the green target as fast as you can. Decoys count as misses."
        };
        lines.push(Line::from(Span::styled(hint, italic())));

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(area);

        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(chunks[0], buf);

        Paragraph::new(Span::styled("(space) start / (esc)ape", italic())).render(chunks[1], buf);
    }
}

/// Delay notice, then the board of slots with the target lit
pub struct RunningScreen;

impl Screen for RunningScreen {
    fn render<C: Clock + Clone>(&self, app: &App<C>, area: Rect, buf: &mut Buffer) {
        let layout = running_layout(area);
        let stage = app.current_stage();
        let session = &stage.session;

        let mut header = vec![Line::from(Span::styled(
            format!(
                "stage {}/{}: {}",
                app.stage_idx + 1,
                app.stages.len(),
                stage.mode
            ),
            bold(),
        ))];
        if let Some((n, total)) = app.engine.progress() {
            header.push(Line::from(Span::styled(
                format!("Trial {} of {}", n, total),
                dim(),
            )));
        }
        Paragraph::new(header)
            .alignment(Alignment::Center)
            .render(layout.header, buf);

        let mid = Rect {
            y: layout.board.y + layout.board.height / 2,
            height: layout.board.height.min(1),
            ..layout.board
        };
        let pending = app.engine.current_trial().is_some();

        if pending && !grid_fits(layout.board, session.grid_rows, session.grid_cols) {
            Paragraph::new(Span::styled(
                format!(
                    "Terminal too small for a {}x{} grid, please resize",
                    session.grid_rows, session.grid_cols
                ),
                bold().fg(Color::Red),
            ))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(mid, buf);
        } else if app.is_armed() {
            let target = app.engine.current_trial().map(|spec| spec.target_slot);
            let numbered = session.slot_count() <= 9;

            for (slot, cell) in cell_rects(layout.board, session.grid_rows, session.grid_cols)
                .into_iter()
                .enumerate()
            {
                let is_target = Some(slot) == target;
                let border = if slot == app.cursor && session.slot_count() > 1 {
                    Style::default().fg(Color::Yellow)
                } else {
                    dim()
                };
                let fill = if is_target {
                    Style::default().bg(Color::Green).fg(Color::Black)
                } else {
                    Style::default()
                };
                let label = match (is_target, numbered) {
                    (true, _) if session.slot_count() == 1 => "PRESS!".to_string(),
                    (_, true) => (slot + 1).to_string(),
                    (_, false) => String::new(),
                };

                Paragraph::new(Span::styled(label, bold()))
                    .alignment(Alignment::Center)
                    .style(fill)
                    .block(Block::default().borders(Borders::ALL).border_style(border))
                    .render(cell, buf);
            }
        } else if pending {
            let waiting = Paragraph::new(Span::styled(
                "Get ready...",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD | Modifier::ITALIC),
            ))
            .alignment(Alignment::Center);
            waiting.render(mid, buf);
        }

        if let Some(toast) = &app.toast {
            let color = if toast.hit { Color::Green } else { Color::Red };
            Paragraph::new(Span::styled(toast.message.clone(), bold().fg(color)))
                .alignment(Alignment::Center)
                .render(layout.toast, buf);
        }

        let legend = if session.slot_count() > 1 {
            "(arrows) move / (space) select / (1-9) pick / (c)ancel / (esc)ape"
        } else {
            "(space) react / (c)ancel / (esc)ape"
        };
        Paragraph::new(Span::styled(legend, italic())).render(layout.legend, buf);
    }
}

/// Per-stage summary with tier labels, trial chart and baseline comparison
pub struct ResultsScreen;

impl Screen for ResultsScreen {
    fn render<C: Clock + Clone>(&self, app: &App<C>, area: Rect, buf: &mut Buffer) {
        let summaries = app.summaries();

        let mut lines = Vec::new();
        for (idx, (mode, summary)) in summaries.iter().enumerate() {
            let stage = &app.stages[idx];
            lines.push(Line::from(Span::styled(
                format!("{}: {} trials", mode, summary.count),
                bold(),
            )));
            lines.extend(summary_lines(
                summary,
                &stage.feedback,
                stage.session.slot_count() > 1,
            ));
        }
        if lines.is_empty() {
            lines.push(Line::from("no trials recorded"));
        }

        let baseline_mean = summaries
            .iter()
            .find_map(|(_, s)| s.timing.map(|t| t.mean_ms));
        let charted: Vec<_> = app
            .completed
            .iter()
            .filter(|record| !record.results.is_empty())
            .collect();

        let text_height = u16::try_from(lines.len()).unwrap_or(u16::MAX);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(text_height), // summaries
                Constraint::Min(0),              // charts
                Constraint::Length(1),           // seed + export status
                Constraint::Length(1),           // legend
            ])
            .split(area);

        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .render(chunks[0], buf);

        let charts = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(chunks[1]);

        // one chart per stage so each keeps its own trial numbers and scale
        let stage_count = u32::try_from(charted.len()).unwrap_or(1).max(1);
        let per_stage = Layout::default()
            .direction(Direction::Vertical)
            .constraints(vec![Constraint::Ratio(1, stage_count); charted.len()])
            .split(charts[0]);
        for (record, slot) in charted.iter().zip(per_stage.iter()) {
            render_bars(
                &trial_bars(&record.results),
                &format!("{} ms per trial", record.mode),
                *slot,
                buf,
            );
        }
        if let Some(mean) = baseline_mean {
            render_bars(
                &baseline_bars(mean, &app.config.baselines),
                "vs baselines",
                charts[1],
                buf,
            );
        }

        let mut footer = format!("seed {}", app.seed);
        if let Some(status) = &app.status {
            footer.push_str("   ");
            footer.push_str(status);
        }
        Paragraph::new(Span::styled(footer, dim()))
            .alignment(Alignment::Center)
            .render(chunks[2], buf);

        Paragraph::new(Span::styled(
            "(r)etry / (n)ew / (b)ack / (esc)ape",
            italic(),
        ))
        .render(chunks[3], buf);
    }
}

fn tier_span(tier: Tier<'_>, table: &ThresholdTable) -> Span<'static> {
    let color = match tier.rank {
        0 => Color::Green,
        _ if tier.is_fallback(table) => Color::Red,
        _ => Color::Yellow,
    };
    Span::styled(tier.label.to_string(), Style::default().fg(color))
}

fn summary_lines(
    summary: &ResultsSummary,
    feedback: &FeedbackTables,
    show_accuracy: bool,
) -> Vec<Line<'static>> {
    let assessment = feedback.assess(summary);
    let mut lines = Vec::new();

    if let Some(t) = summary.timing {
        let mut spans = vec![Span::raw(format!(
            "mean {}  min {}  max {}  sd {} ms  ",
            format_ms(t.mean_ms),
            format_ms(t.min_ms),
            format_ms(t.max_ms),
            format_label(t.std_dev_ms)
        ))];
        if let Some(tier) = assessment.speed {
            spans.push(tier_span(tier, &feedback.speed));
        }
        lines.push(Line::from(spans));

        let mut spans = vec![Span::raw(format!("range {}  ", format_ms(t.range_ms)))];
        if let Some(tier) = assessment.consistency {
            spans.push(tier_span(tier, &feedback.consistency));
        }
        lines.push(Line::from(spans));
    }

    if show_accuracy {
        if let (Some(pct), Some(tier)) = (summary.accuracy_pct, assessment.accuracy) {
            lines.push(Line::from(vec![
                Span::raw(format!(
                    "accuracy {}% ({} hit / {} missed)  ",
                    pct.round(),
                    summary.hits,
                    summary.misses()
                )),
                tier_span(tier, &feedback.accuracy),
            ]));
        }
    }

    lines
}

fn render_bars(points: &[BarPoint], title: &str, area: Rect, buf: &mut Buffer) {
    if points.is_empty() || area.width < 3 || area.height < 3 {
        return;
    }

    let bars: Vec<Bar> = points
        .iter()
        .map(|p| {
            let color = if p.hit { Color::Green } else { Color::Red };
            Bar::default()
                .value(p.value_ms)
                .label(Line::from(p.label.clone()))
                .text_value(p.value_ms.to_string())
                .style(Style::default().fg(color))
        })
        .collect();

    let inner_width = area.width.saturating_sub(2);
    BarChart::default()
        .block(Block::default().borders(Borders::ALL).title(title))
        .bar_width(fit_bar_width(inner_width, bars.len(), 1))
        .bar_gap(1)
        .max(compute_bar_max(points))
        .data(BarGroup::default().bars(&bars))
        .render(area, buf);
}
