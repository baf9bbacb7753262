//! Tunable game parameters.

use crate::constants::*;
use crate::persistence;
use serde::{Deserialize, Serialize};

/// Timing, scoring and leveling parameters for a play session.
///
/// Every field falls back to its default when missing from the config file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Length of one decay step in milliseconds
    pub tick_interval_ms: u64,

    /// Time removed per decay step before slowdown is applied
    pub base_decrement: f64,

    /// Growth of the slowdown factor per elapsed session second
    pub decay_rate: f64,

    /// Growth of the pressure factor per elapsed session second. Kept above
    /// `decay_rate` so the drain per second rises over a long run.
    pub pressure_rate: f64,

    /// Points per correct answer
    pub correct_reward: u32,

    /// Consecutive correct answers needed to advance a level
    pub streak_for_level_up: u32,

    /// Time granted by the Runner minigame
    pub time_bonus: f64,

    /// Pause after an answer before the next question is shown
    pub feedback_delay_ms: u64,

    /// How often the coach picks a new tip
    pub coach_refresh_seconds: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: TICK_INTERVAL_MS,
            base_decrement: BASE_DECREMENT,
            decay_rate: DECAY_RATE,
            pressure_rate: PRESSURE_RATE,
            correct_reward: CORRECT_REWARD,
            streak_for_level_up: STREAK_FOR_LEVEL_UP,
            time_bonus: TIME_BONUS,
            feedback_delay_ms: FEEDBACK_DELAY_MS,
            coach_refresh_seconds: COACH_REFRESH_SECONDS,
        }
    }
}

impl GameConfig {
    /// Load the config file from the data directory, using defaults when the
    /// file is missing or invalid. Degenerate values are repaired.
    pub fn load() -> Self {
        persistence::load_json_or_default::<Self>(CONFIG_FILENAME).sanitized()
    }

    /// Quick config for tests: no display delay between questions.
    pub fn instant_feedback() -> Self {
        Self {
            feedback_delay_ms: 0,
            ..Default::default()
        }
    }

    /// Replace values that would stall or break the loop with defaults.
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let decay_rate = if self.decay_rate.is_finite() && self.decay_rate >= 0.0 {
            self.decay_rate
        } else {
            defaults.decay_rate
        };
        Self {
            tick_interval_ms: if self.tick_interval_ms == 0 {
                defaults.tick_interval_ms
            } else {
                self.tick_interval_ms
            },
            base_decrement: if self.base_decrement.is_finite() && self.base_decrement > 0.0 {
                self.base_decrement
            } else {
                defaults.base_decrement
            },
            decay_rate,
            pressure_rate: if self.pressure_rate.is_finite() && self.pressure_rate > decay_rate {
                self.pressure_rate
            } else {
                decay_rate + (PRESSURE_RATE - DECAY_RATE)
            },
            streak_for_level_up: self.streak_for_level_up.max(1),
            time_bonus: if self.time_bonus.is_finite() {
                self.time_bonus.max(0.0)
            } else {
                defaults.time_bonus
            },
            coach_refresh_seconds: self.coach_refresh_seconds.max(1),
            ..self
        }
    }
}
