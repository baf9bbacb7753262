//! Per-player stats dashboard, as a screen and as plain text.

use super::game_common::render_info_panel_frame;
use crate::problem::Operation;
use crate::stats::Dashboard;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

fn accuracy_color(percent: u32) -> Color {
    if percent >= 80 {
        Color::Green
    } else if percent >= 60 {
        Color::Yellow
    } else {
        Color::Red
    }
}

fn operation_list(operations: &[Operation]) -> String {
    if operations.is_empty() {
        return "-".to_string();
    }
    operations
        .iter()
        .map(|op| op.name())
        .collect::<Vec<_>>()
        .join(", ")
}

fn labeled(label: &str, value: String, color: Color) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:<16}", label), Style::default().fg(Color::DarkGray)),
        Span::styled(value, Style::default().fg(color)),
    ])
}

pub fn render_dashboard(frame: &mut Frame, area: Rect, player: &str, dashboard: &Dashboard) {
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(format!(" {} - Stats ", player))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(9), // Totals + last game
            Constraint::Min(4),    // Operations + recent
            Constraint::Length(1), // Controls
        ])
        .split(inner);

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[0]);
    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);

    let totals_area = render_info_panel_frame(frame, top[0], " Overall ");
    let totals = vec![
        labeled("Games", dashboard.total_games.to_string(), Color::White),
        labeled("Best score", dashboard.best_score.to_string(), Color::Yellow),
        labeled("Average score", dashboard.average_score.to_string(), Color::White),
        labeled(
            "Accuracy",
            format!("{}%", dashboard.accuracy_percent),
            accuracy_color(dashboard.accuracy_percent),
        ),
        labeled(
            "Answered",
            format!(
                "{} ({} right, {} wrong)",
                dashboard.total_questions, dashboard.total_correct, dashboard.total_incorrect
            ),
            Color::White,
        ),
        labeled(
            "Avg response",
            format!("{:.2}s", dashboard.avg_response_secs),
            Color::White,
        ),
    ];
    frame.render_widget(Paragraph::new(totals), totals_area);

    let last_area = render_info_panel_frame(frame, top[1], " Last game ");
    let last = &dashboard.last_game;
    let last_lines = if dashboard.total_games == 0 {
        vec![Line::from(Span::styled(
            "No games played yet.",
            Style::default().fg(Color::Gray),
        ))]
    } else {
        vec![
            labeled("Score", last.score.to_string(), Color::Yellow),
            labeled("Level", last.level.to_string(), Color::Cyan),
            labeled("Correct", last.correct.to_string(), Color::Green),
            labeled("Incorrect", last.incorrect.to_string(), Color::Red),
            labeled("Avg response", format!("{:.2}s", last.response_secs), Color::White),
            labeled(
                "Best operation",
                last.best_operation.map_or("-", |op| op.name()).to_string(),
                Color::Magenta,
            ),
        ]
    };
    frame.render_widget(Paragraph::new(last_lines), last_area);

    let ops_area = render_info_panel_frame(frame, bottom[0], " By operation ");
    let op_lines: Vec<Line> = dashboard
        .by_operation
        .iter()
        .map(|(op, acc)| {
            let color = if acc.total == 0 {
                Color::DarkGray
            } else {
                accuracy_color(acc.accuracy_percent)
            };
            labeled(
                op.name(),
                format!("{:>3}%  {}/{}", acc.accuracy_percent, acc.correct, acc.total),
                color,
            )
        })
        .collect();
    frame.render_widget(Paragraph::new(op_lines), ops_area);

    let recent_area = render_info_panel_frame(frame, bottom[1], " Recent games ");
    let recent_lines: Vec<Line> = dashboard
        .recent
        .iter()
        .map(|game| {
            Line::from(vec![
                Span::styled(
                    game.created_at.format("%m-%d %H:%M  ").to_string(),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(
                    format!("{:>5}", game.score),
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("  L{}  {}", game.level, operation_list(&game.operations)),
                    Style::default().fg(Color::White),
                ),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(recent_lines), recent_area);

    let controls = Paragraph::new("[Enter] Play again    [Esc] Players    [Q] Quit")
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Gray));
    frame.render_widget(controls, rows[2]);
}

/// Plain-text dashboard for the `stats` command.
pub fn text_report(player: &str, dashboard: &Dashboard) -> String {
    let mut out = vec![
        format!("Stats for {}", player),
        String::new(),
        format!("Games played:     {}", dashboard.total_games),
        format!("Best score:       {}", dashboard.best_score),
        format!("Average score:    {}", dashboard.average_score),
        format!(
            "Accuracy:         {}% ({}/{})",
            dashboard.accuracy_percent, dashboard.total_correct, dashboard.total_questions
        ),
        format!("Avg response:     {:.2}s", dashboard.avg_response_secs),
        String::new(),
        "By operation:".to_string(),
    ];
    for (op, acc) in &dashboard.by_operation {
        out.push(format!(
            "  {:<16}{:>3}%  {}/{}",
            op.name(),
            acc.accuracy_percent,
            acc.correct,
            acc.total
        ));
    }
    if !dashboard.recent.is_empty() {
        out.push(String::new());
        out.push("Recent games:".to_string());
        for game in &dashboard.recent {
            out.push(format!(
                "  {}  score {:>5}  level {}  {}",
                game.created_at.format("%Y-%m-%d %H:%M"),
                game.score,
                game.level,
                operation_list(&game.operations)
            ));
        }
    }
    out.join("\n")
}
