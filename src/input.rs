//! Input handling for the play screen.
//!
//! Keys are first mapped to UI-agnostic [`PlayInput`] values, then dispatched
//! against the current session phase.

use crate::coach::Coach;
use crate::config::GameConfig;
use crate::game_loop::GameLoop;
use crate::problem::RandomProblems;
use crate::runner::{Direction, RunnerGame};
use crate::session::{SessionEvent, Transition};
use crate::stats::PlayerProfile;
use crate::store::StatsRecorder;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use rand::rngs::ThreadRng;

/// Longest answer the input field accepts.
const MAX_ANSWER_LEN: usize = 8;

/// UI-agnostic input actions for the play screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayInput {
    Char(char),
    Backspace,
    Submit, // Enter
    Move(Direction),
    Escape,
    Other,
}

pub fn map_key(key: KeyEvent) -> PlayInput {
    if key.kind == KeyEventKind::Release {
        return PlayInput::Other;
    }
    match key.code {
        KeyCode::Char(c) => PlayInput::Char(c),
        KeyCode::Backspace => PlayInput::Backspace,
        KeyCode::Enter => PlayInput::Submit,
        KeyCode::Up => PlayInput::Move(Direction::Up),
        KeyCode::Down => PlayInput::Move(Direction::Down),
        KeyCode::Left => PlayInput::Move(Direction::Left),
        KeyCode::Right => PlayInput::Move(Direction::Right),
        KeyCode::Esc => PlayInput::Escape,
        _ => PlayInput::Other,
    }
}

/// Result of handling a play-screen input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputResult {
    Continue,
    OpenDashboard,
    Quit,
}

/// Everything the play screen owns.
pub struct PlayState<R: StatsRecorder> {
    pub game: GameLoop<RandomProblems<ThreadRng>, R>,
    pub answer: String,
    pub runner: RunnerGame,
    pub coach: Coach,
    rng: ThreadRng,
}

impl<R: StatsRecorder> PlayState<R> {
    pub fn new(
        config: GameConfig,
        player: &str,
        profile: Option<PlayerProfile>,
        recorder: R,
    ) -> Self {
        let mut rng = rand::thread_rng();
        Self {
            game: GameLoop::new(
                config,
                player,
                profile,
                RandomProblems::thread_local(),
                recorder,
            ),
            answer: String::new(),
            runner: RunnerGame::new(&mut rng),
            coach: Coach::new(config.coach_refresh_seconds),
            rng,
        }
    }

    /// Advance the session clock and the coach.
    pub fn tick(&mut self, dt_ms: u64) -> Transition {
        let transition = self.game.handle(SessionEvent::Tick { dt_ms });
        if self.game.session.is_active() {
            let snapshot = self.game.session.coach_snapshot();
            self.coach.update(dt_ms, &snapshot, &mut self.rng);
        }
        transition
    }

    pub fn process_input(&mut self, input: PlayInput) -> InputResult {
        if self.game.session.is_active() {
            self.process_active(input);
            InputResult::Continue
        } else {
            self.process_ended(input)
        }
    }

    fn process_active(&mut self, input: PlayInput) {
        match input {
            PlayInput::Char(c) if c.is_ascii_digit() || (c == '-' && self.answer.is_empty()) => {
                if self.answer.len() < MAX_ANSWER_LEN {
                    self.answer.push(c);
                }
            }
            PlayInput::Backspace => {
                self.answer.pop();
            }
            PlayInput::Submit => {
                let raw = std::mem::take(&mut self.answer);
                let transition = self.game.handle(SessionEvent::Submit(raw.clone()));
                // Locked during feedback: keep what was typed
                if transition.verdict.is_none() {
                    self.answer = raw;
                }
            }
            PlayInput::Move(direction) => {
                if self.runner.step(direction, &mut self.rng) {
                    self.game.handle(SessionEvent::TargetReached);
                }
            }
            PlayInput::Escape => {
                self.game.handle(SessionEvent::Stop);
            }
            PlayInput::Char(_) | PlayInput::Other => {}
        }
    }

    fn process_ended(&mut self, input: PlayInput) -> InputResult {
        match input {
            PlayInput::Char('r') | PlayInput::Char('R') | PlayInput::Submit => {
                self.game.handle(SessionEvent::Restart);
                self.answer.clear();
                self.runner.respawn(&mut self.rng);
                self.coach.reset();
                InputResult::Continue
            }
            PlayInput::Char('d') | PlayInput::Char('D') => InputResult::OpenDashboard,
            PlayInput::Char('q') | PlayInput::Char('Q') | PlayInput::Escape => InputResult::Quit,
            _ => InputResult::Continue,
        }
    }
}
