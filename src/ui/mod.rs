//! Terminal screens. Rendering only; state lives in the library modules.

pub mod dashboard_scene;
pub mod game_common;
pub mod play_scene;
pub mod player_select;

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};

/// Smallest terminal the play screen lays out cleanly in.
pub const MIN_WIDTH: u16 = 60;
pub const MIN_HEIGHT: u16 = 20;

/// Returns false (after drawing a notice) when the terminal is too small.
pub fn ensure_min_size(frame: &mut Frame, area: Rect) -> bool {
    if area.width >= MIN_WIDTH && area.height >= MIN_HEIGHT {
        return true;
    }
    let notice = Paragraph::new(format!(
        "Terminal too small ({}x{}), need {}x{}",
        area.width, area.height, MIN_WIDTH, MIN_HEIGHT
    ))
    .style(Style::default().fg(Color::Yellow))
    .alignment(Alignment::Center);
    frame.render_widget(notice, area);
    false
}
