//! Play screen: question, answer field, countdown, runner grid and coach.

use super::game_common::{
    create_game_layout, render_game_over_overlay, render_info_panel_frame, render_status_bar,
    time_color,
};
use crate::input::PlayState;
use crate::runner::{Position, RunnerGame};
use crate::session::{EndReason, GameSession, Verdict};
use crate::stats::SessionSummary;
use crate::store::StatsRecorder;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};

const RUNNER_COLOR: Color = Color::LightBlue;
const TARGET_COLOR: Color = Color::LightGreen;
const EMPTY_COLOR: Color = Color::Rgb(60, 60, 70);

pub fn render_play_scene<R: StatsRecorder>(frame: &mut Frame, area: Rect, state: &PlayState<R>) {
    let session = &state.game.session;

    if !session.is_active() {
        if let Some(summary) = state.game.last_summary() {
            render_session_over(frame, area, summary, state);
            return;
        }
    }

    let layout = create_game_layout(frame, area, " Math Runner ", Color::Cyan, 16, 30);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Level / score
            Constraint::Length(1), // Spacer
            Constraint::Length(1), // Time gauge
            Constraint::Length(1), // Spacer
            Constraint::Length(1), // Question
            Constraint::Length(3), // Answer box
            Constraint::Length(1), // Feedback
            Constraint::Min(0),    // Runner grid
        ])
        .split(layout.content);

    render_header(frame, chunks[0], session);
    render_time_gauge(frame, chunks[2], session.time_remaining);
    render_question(frame, chunks[4], session);
    render_answer_box(frame, chunks[5], &state.answer, session.awaiting_next());
    render_feedback(frame, chunks[6], session);
    render_runner_grid(frame, chunks[7], &state.runner);

    render_status_bar(
        frame,
        layout.status_bar,
        &format!("Runner targets: {}", state.runner.hits),
        Color::Gray,
        &[
            ("[0-9]", "Answer"),
            ("[Enter]", "Submit"),
            ("[Arrows]", "Run"),
            ("[Esc]", "Stop"),
        ],
    );

    render_side_panel(frame, layout.info_panel, state);
}

fn render_header(frame: &mut Frame, area: Rect, session: &GameSession) {
    let line = Line::from(vec![
        Span::styled("Level ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            session.level.to_string(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("   Score ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            session.score.to_string(),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("   Streak ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!(
                "{}/{}",
                session.consecutive_correct,
                session.config().streak_for_level_up
            ),
            Style::default().fg(Color::White),
        ),
    ]);
    frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

fn render_time_gauge(frame: &mut Frame, area: Rect, time_remaining: f64) {
    let ratio = (time_remaining / 100.0).clamp(0.0, 1.0);
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(time_color(time_remaining)))
        .ratio(ratio)
        .label(format!("{:.0}", time_remaining));
    frame.render_widget(gauge, area);
}

fn render_question(frame: &mut Frame, area: Rect, session: &GameSession) {
    let text = format!("{} = ?", session.current_problem.question);
    let question = Paragraph::new(text)
        .style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center);
    frame.render_widget(question, area);
}

fn render_answer_box(frame: &mut Frame, area: Rect, answer: &str, locked: bool) {
    let width = 16.min(area.width);
    let boxed = Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        width,
        ..area
    };
    let border = if locked { Color::DarkGray } else { Color::White };
    let input = Paragraph::new(format!("{}_", answer))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border)),
        )
        .alignment(Alignment::Center);
    frame.render_widget(input, boxed);
}

fn render_feedback(frame: &mut Frame, area: Rect, session: &GameSession) {
    let line = match session.feedback.map(|f| f.verdict) {
        Some(Verdict::Correct) => Line::from(Span::styled(
            "✓ Correct!",
            Style::default().fg(Color::Green),
        )),
        Some(Verdict::Incorrect) => Line::from(Span::styled(
            "✗ Not quite, try again",
            Style::default().fg(Color::Red),
        )),
        None => Line::from(""),
    };
    frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

/// Draw the runner grid, each cell 3 columns wide.
fn render_runner_grid(frame: &mut Frame, area: Rect, runner: &RunnerGame) {
    let size = runner.grid_size;
    if area.height < size as u16 || area.width < (size as u16) * 3 {
        return;
    }

    let mut lines = Vec::with_capacity(size as usize);
    for y in 0..size {
        let mut spans = Vec::with_capacity(size as usize);
        for x in 0..size {
            let pos = Position { x, y };
            let span = if pos == runner.runner {
                Span::styled("[@]", Style::default().fg(RUNNER_COLOR))
            } else if pos == runner.target {
                Span::styled("[*]", Style::default().fg(TARGET_COLOR))
            } else {
                Span::styled("[ ]", Style::default().fg(EMPTY_COLOR))
            };
            spans.push(span);
        }
        lines.push(Line::from(spans));
    }

    let y_off = area.y + (area.height.saturating_sub(size as u16)) / 2;
    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center),
        Rect {
            y: y_off,
            height: size as u16,
            ..area
        },
    );
}

fn render_side_panel<R: StatsRecorder>(frame: &mut Frame, area: Rect, state: &PlayState<R>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(6), Constraint::Length(8)])
        .split(area);

    let coach_area = render_info_panel_frame(frame, chunks[0], " Coach ");
    let tip = Paragraph::new(state.coach.message())
        .style(Style::default().fg(Color::Magenta))
        .wrap(Wrap { trim: true });
    frame.render_widget(tip, coach_area);

    let stats_area = render_info_panel_frame(frame, chunks[1], " Session ");
    let stats = &state.game.session.stats;
    let accuracy = stats
        .accuracy_percent()
        .map_or("-".to_string(), |a| format!("{:.0}%", a));
    let mut lines = vec![
        stat_line("Player", state.game.player().to_string()),
        stat_line("Questions", stats.total_questions.to_string()),
        stat_line("Accuracy", accuracy),
        stat_line("Avg time", format!("{:.1}s", stats.avg_response_secs())),
    ];
    if let Some(profile) = state.game.profile() {
        lines.push(stat_line("Best", profile.best_score.to_string()));
    }
    frame.render_widget(Paragraph::new(lines), stats_area);
}

fn stat_line(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:<10}", label), Style::default().fg(Color::DarkGray)),
        Span::styled(value, Style::default().fg(Color::White)),
    ])
}

fn session_over_title(reason: Option<EndReason>) -> &'static str {
    match reason {
        Some(EndReason::TimeUp) => "TIME'S UP",
        _ => "SESSION ENDED",
    }
}

fn render_session_over<R: StatsRecorder>(
    frame: &mut Frame,
    area: Rect,
    summary: &SessionSummary,
    state: &PlayState<R>,
) {
    let mut message = vec![
        format!("Score: {}", summary.score),
        format!("Level reached: {}", summary.max_level),
        format!(
            "Correct: {}   Incorrect: {}",
            summary.total_correct, summary.total_incorrect
        ),
        format!("Average response: {:.1}s", summary.avg_response_secs),
    ];
    if let Some(profile) = state.game.profile() {
        message.push(String::new());
        message.push(format!(
            "Best score: {}   Games played: {}",
            profile.best_score, profile.games_played
        ));
    }

    render_game_over_overlay(
        frame,
        area,
        Color::Yellow,
        session_over_title(state.game.session.end_reason),
        &message,
        "[R] Play again   [D] Dashboard   [Q] Quit",
    );
}
