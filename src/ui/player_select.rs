use crate::store::{validate_name, PlayerInfo};
use crossterm::event::KeyCode;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// What the main loop should do after a key on the select screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectAction {
    None,
    Play(String),
    Quit,
}

/// Player list with an inline "new player" name field.
pub struct PlayerSelectScreen {
    pub selected_index: usize,
    pub creating: bool,
    pub name_input: String,
    pub cursor_position: usize,
    pub validation_error: Option<String>,
}

impl PlayerSelectScreen {
    pub fn new(player_count: usize) -> Self {
        Self {
            selected_index: 0,
            // Nobody to pick yet, start on the name field
            creating: player_count == 0,
            name_input: String::new(),
            cursor_position: 0,
            validation_error: None,
        }
    }

    pub fn draw(&self, f: &mut Frame, area: Rect, players: &[PlayerInfo]) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(2)
            .constraints([
                Constraint::Length(3), // Title
                Constraint::Min(0),    // Player list
                Constraint::Length(3), // Name input
                Constraint::Length(1), // Validation
                Constraint::Length(2), // Controls
            ])
            .split(area);

        let title = Paragraph::new("Math Runner")
            .style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .alignment(Alignment::Center);
        f.render_widget(title, chunks[0]);

        self.draw_player_list(f, chunks[1], players);

        if self.creating {
            self.draw_name_input(f, chunks[2]);
            self.draw_validation(f, chunks[3]);
        }

        let controls = if self.creating {
            "[Enter] Start    [Esc] Back"
        } else {
            "[Enter] Play    [N] New player    [Q] Quit"
        };
        let controls = Paragraph::new(controls)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Gray));
        f.render_widget(controls, chunks[4]);
    }

    fn draw_player_list(&self, f: &mut Frame, area: Rect, players: &[PlayerInfo]) {
        let block = Block::default().borders(Borders::ALL).title("Players");
        let inner_area = block.inner(area);
        f.render_widget(block, area);

        if players.is_empty() {
            let empty_message = Paragraph::new("No players yet.\nType a name below to start.")
                .style(Style::default().fg(Color::Gray))
                .alignment(Alignment::Center);
            f.render_widget(empty_message, inner_area);
            return;
        }

        let mut lines = Vec::new();
        for (i, player) in players.iter().enumerate() {
            let is_selected = !self.creating && i == self.selected_index;
            let marker = if is_selected { ">" } else { " " };

            let text = if player.is_corrupted {
                format!("{} {} (CORRUPTED)", marker, player.filename)
            } else {
                format!(
                    "{} {}  Lv {}  Best {}  Games {}",
                    marker, player.name, player.current_level, player.best_score, player.games_played
                )
            };

            let style = if player.is_corrupted {
                Style::default().fg(Color::DarkGray)
            } else if is_selected {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };

            lines.push(Line::from(Span::styled(text, style)));
        }

        f.render_widget(Paragraph::new(lines), inner_area);
    }

    fn draw_name_input(&self, f: &mut Frame, area: Rect) {
        let input_text = {
            let chars: Vec<char> = self.name_input.chars().collect();
            if self.cursor_position < chars.len() {
                let before: String = chars[..self.cursor_position].iter().collect();
                let after: String = chars[self.cursor_position..].iter().collect();
                format!("{}_{}", before, after)
            } else {
                format!("{}_", self.name_input)
            }
        };

        let input_widget = Paragraph::new(input_text)
            .block(Block::default().borders(Borders::ALL).title("New player"))
            .style(Style::default().fg(Color::White));
        f.render_widget(input_widget, area);
    }

    fn draw_validation(&self, f: &mut Frame, area: Rect) {
        let line = if let Some(error) = &self.validation_error {
            Line::from(Span::styled(
                format!("✗ {}", error),
                Style::default().fg(Color::Red),
            ))
        } else if !self.name_input.trim().is_empty() {
            Line::from(Span::styled(
                "✓ Name is valid",
                Style::default().fg(Color::Green),
            ))
        } else {
            Line::from("")
        };
        f.render_widget(Paragraph::new(line), area);
    }

    pub fn handle_char_input(&mut self, c: char) {
        let byte_index = self
            .name_input
            .char_indices()
            .nth(self.cursor_position)
            .map_or(self.name_input.len(), |(i, _)| i);
        self.name_input.insert(byte_index, c);
        self.cursor_position += 1;
        self.validate();
    }

    pub fn handle_backspace(&mut self) {
        if self.cursor_position == 0 {
            return;
        }
        if let Some((byte_index, _)) = self.name_input.char_indices().nth(self.cursor_position - 1)
        {
            self.name_input.remove(byte_index);
            self.cursor_position -= 1;
            self.validate();
        }
    }

    pub fn validate(&mut self) {
        self.validation_error = validate_name(&self.name_input).err();
    }

    pub fn is_valid(&self) -> bool {
        self.validation_error.is_none() && !self.name_input.trim().is_empty()
    }

    pub fn get_name(&self) -> String {
        self.name_input.trim().to_string()
    }

    pub fn handle_key(&mut self, code: KeyCode, players: &[PlayerInfo]) -> SelectAction {
        if self.creating {
            match code {
                KeyCode::Char(c) => self.handle_char_input(c),
                KeyCode::Backspace => self.handle_backspace(),
                KeyCode::Enter => {
                    self.validate();
                    if self.is_valid() {
                        return SelectAction::Play(self.get_name());
                    }
                }
                KeyCode::Esc if !players.is_empty() => {
                    self.creating = false;
                    self.name_input.clear();
                    self.cursor_position = 0;
                    self.validation_error = None;
                }
                KeyCode::Esc => return SelectAction::Quit,
                _ => {}
            }
            return SelectAction::None;
        }

        match code {
            KeyCode::Up if self.selected_index > 0 => self.selected_index -= 1,
            KeyCode::Down if self.selected_index + 1 < players.len() => self.selected_index += 1,
            KeyCode::Char('n') | KeyCode::Char('N') => self.creating = true,
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return SelectAction::Quit,
            KeyCode::Enter => {
                if let Some(player) = players.get(self.selected_index) {
                    if !player.is_corrupted {
                        return SelectAction::Play(player.name.clone());
                    }
                }
            }
            _ => {}
        }
        SelectAction::None
    }
}
