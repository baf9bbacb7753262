//! Drives a [`GameSession`] and hands finished sessions to a recorder.

use crate::config::GameConfig;
use crate::problem::ProblemSource;
use crate::session::{GameSession, SessionEvent, Transition};
use crate::stats::{PlayerProfile, SessionSummary};
use crate::store::StatsRecorder;

/// Owns one player's session, its problem source and the stats recorder.
///
/// Every ended session is recorded exactly once. Recording failures are
/// logged and dropped; they never affect the session.
pub struct GameLoop<P: ProblemSource, R: StatsRecorder> {
    pub session: GameSession,
    problems: P,
    recorder: R,
    player: String,
    profile: Option<PlayerProfile>,
    last_summary: Option<SessionSummary>,
}

impl<P: ProblemSource, R: StatsRecorder> GameLoop<P, R> {
    /// Start a session for `player`. `profile` is the caller's current view of
    /// the player, replaced after each recorded session.
    pub fn new(
        config: GameConfig,
        player: impl Into<String>,
        profile: Option<PlayerProfile>,
        mut problems: P,
        recorder: R,
    ) -> Self {
        let session = GameSession::new(config, &mut problems);
        Self {
            session,
            problems,
            recorder,
            player: player.into(),
            profile,
            last_summary: None,
        }
    }

    pub fn player(&self) -> &str {
        &self.player
    }

    pub fn profile(&self) -> Option<&PlayerProfile> {
        self.profile.as_ref()
    }

    /// Summary of the most recently ended session.
    pub fn last_summary(&self) -> Option<&SessionSummary> {
        self.last_summary.as_ref()
    }

    pub fn recorder(&self) -> &R {
        &self.recorder
    }

    pub fn handle(&mut self, event: SessionEvent) -> Transition {
        let transition = self.session.handle(event, &mut self.problems);
        if let Some(summary) = &transition.ended {
            self.flush(summary);
        }
        transition
    }

    fn flush(&mut self, summary: &SessionSummary) {
        match self.recorder.record_game_session(&self.player, summary) {
            Ok(profile) => {
                tracing::debug!(
                    player = %self.player,
                    games = profile.games_played,
                    best = profile.best_score,
                    "session recorded"
                );
                self.profile = Some(profile);
            }
            Err(e) => {
                tracing::warn!(player = %self.player, error = %e, "failed to record session");
            }
        }
        self.last_summary = Some(summary.clone());
    }
}
