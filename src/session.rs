//! Timed quiz session: countdown decay, answer checking and leveling.
//!
//! All mutation goes through [`GameSession::handle`]. Time is virtual: the
//! caller reports elapsed milliseconds with `Tick` events, so the machine can
//! be driven by a real timer or stepped directly in tests.

use crate::coach::CoachSnapshot;
use crate::config::GameConfig;
use crate::constants::{MAX_TICK_DT_MS, MAX_TIME};
use crate::problem::{Problem, ProblemSource};
use crate::stats::{RunningStats, SessionSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Active,
    Ended,
}

/// Input to the state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// `dt_ms` milliseconds of real time have passed.
    Tick { dt_ms: u64 },
    /// Raw answer text as typed by the player.
    Submit(String),
    /// The Runner minigame reached its target.
    TargetReached,
    /// The player ended the session.
    Stop,
    /// Start over (also used for the very first start).
    Restart,
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// The countdown reached zero.
    TimeUp,
    /// The player stopped (or restarted) the session.
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Correct,
    Incorrect,
}

/// Answer feedback shown until the display delay runs out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Feedback {
    pub verdict: Verdict,
    pub remaining_ms: u64,
}

/// What a single event did to the session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transition {
    /// Verdict for a `Submit` that was accepted
    pub verdict: Option<Verdict>,
    /// Level advanced on this event
    pub leveled_up: bool,
    /// A new problem was fetched
    pub new_problem: bool,
    /// A time bonus was applied
    pub bonus_applied: bool,
    /// The session ended on this event; stats to hand to the recorder
    pub ended: Option<SessionSummary>,
}

/// Mutable state for one play session.
#[derive(Debug, Clone)]
pub struct GameSession {
    config: GameConfig,
    pub phase: SessionPhase,
    /// Set when the phase moves to `Ended`, cleared on restart
    pub end_reason: Option<EndReason>,
    pub score: u32,
    pub time_remaining: f64,
    pub level: u32,
    pub consecutive_correct: u32,
    pub current_problem: Problem,
    pub stats: RunningStats,
    pub feedback: Option<Feedback>,

    // Virtual clock
    elapsed_ms: u64,
    accumulated_ms: u64,
    question_started_ms: u64,
}

impl GameSession {
    /// Start a new active session at level 1.
    pub fn new<P: ProblemSource + ?Sized>(config: GameConfig, problems: &mut P) -> Self {
        Self {
            config,
            phase: SessionPhase::Active,
            end_reason: None,
            score: 0,
            time_remaining: MAX_TIME,
            level: 1,
            consecutive_correct: 0,
            current_problem: problems.next_problem(1),
            stats: RunningStats::new(),
            feedback: None,
            elapsed_ms: 0,
            accumulated_ms: 0,
            question_started_ms: 0,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn is_active(&self) -> bool {
        self.phase == SessionPhase::Active
    }

    /// Milliseconds since the session started.
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    /// True while answer feedback is displayed and input is locked.
    pub fn awaiting_next(&self) -> bool {
        self.feedback.is_some()
    }

    /// Read-only view for the coach.
    pub fn coach_snapshot(&self) -> CoachSnapshot<'_> {
        CoachSnapshot {
            stats: &self.stats,
            level: self.level,
            time_remaining: self.time_remaining,
        }
    }

    /// Stats as they would be recorded if the session ended now.
    pub fn summary(&self) -> SessionSummary {
        SessionSummary::from_stats(self.score, self.level, &self.stats)
    }

    /// Apply one event. Events other than `Restart` are ignored once ended.
    pub fn handle<P: ProblemSource + ?Sized>(
        &mut self,
        event: SessionEvent,
        problems: &mut P,
    ) -> Transition {
        let mut transition = Transition::default();

        match event {
            SessionEvent::Restart => {
                if self.is_active() {
                    transition.ended = Some(self.end(EndReason::Stopped));
                }
                self.reset(problems);
                transition.new_problem = true;
            }
            _ if !self.is_active() => {}
            SessionEvent::Tick { dt_ms } => self.tick(dt_ms, problems, &mut transition),
            SessionEvent::Submit(raw) => self.submit(&raw, problems, &mut transition),
            SessionEvent::TargetReached => {
                self.time_remaining = (self.time_remaining + self.config.time_bonus).min(MAX_TIME);
                transition.bonus_applied = true;
            }
            SessionEvent::Stop => transition.ended = Some(self.end(EndReason::Stopped)),
        }

        transition
    }

    fn reset<P: ProblemSource + ?Sized>(&mut self, problems: &mut P) {
        self.phase = SessionPhase::Active;
        self.end_reason = None;
        self.score = 0;
        self.time_remaining = MAX_TIME;
        self.level = 1;
        self.consecutive_correct = 0;
        self.stats = RunningStats::new();
        self.feedback = None;
        self.elapsed_ms = 0;
        self.accumulated_ms = 0;
        self.question_started_ms = 0;
        self.current_problem = problems.next_problem(self.level);
    }

    fn end(&mut self, reason: EndReason) -> SessionSummary {
        self.phase = SessionPhase::Ended;
        self.end_reason = Some(reason);
        self.feedback = None;
        let summary = self.summary();
        tracing::info!(
            ?reason,
            score = summary.score,
            level = summary.max_level,
            questions = summary.total_questions,
            "session ended"
        );
        summary
    }

    /// Time removed by one decay step at the current point of the session.
    ///
    /// `base / (1 + t * decay_rate)` scaled by a pressure factor
    /// `1 + t * pressure_rate`. With `pressure_rate > decay_rate` the step
    /// grows with elapsed time toward `base * pressure_rate / decay_rate`.
    pub fn decay_step(&self) -> f64 {
        let elapsed_secs = self.elapsed_ms as f64 / 1000.0;
        let slowdown = 1.0 + elapsed_secs * self.config.decay_rate;
        let pressure = 1.0 + elapsed_secs * self.config.pressure_rate;
        self.config.base_decrement * pressure / slowdown
    }

    fn tick<P: ProblemSource + ?Sized>(
        &mut self,
        dt_ms: u64,
        problems: &mut P,
        transition: &mut Transition,
    ) {
        // Clamp so a stalled terminal doesn't drain the clock in one step
        let dt_ms = dt_ms.min(MAX_TICK_DT_MS);
        self.elapsed_ms += dt_ms;

        if let Some(feedback) = self.feedback.as_mut() {
            feedback.remaining_ms = feedback.remaining_ms.saturating_sub(dt_ms);
            if feedback.remaining_ms == 0 {
                self.finish_feedback(problems, transition);
            }
        }

        self.accumulated_ms += dt_ms;
        let interval = self.config.tick_interval_ms.max(1);
        while self.accumulated_ms >= interval {
            self.accumulated_ms -= interval;
            self.time_remaining = (self.time_remaining - self.decay_step()).max(0.0);
            if self.time_remaining <= 0.0 {
                transition.ended = Some(self.end(EndReason::TimeUp));
                return;
            }
        }
    }

    fn submit<P: ProblemSource + ?Sized>(
        &mut self,
        raw: &str,
        problems: &mut P,
        transition: &mut Transition,
    ) {
        if self.feedback.is_some() {
            return;
        }

        let operation = self.current_problem.operation;
        let verdict = if self.current_problem.is_correct(raw) {
            let response_ms = self.elapsed_ms.saturating_sub(self.question_started_ms);
            self.score += self.config.correct_reward;
            self.consecutive_correct += 1;
            self.stats.record_correct(operation, response_ms);
            self.time_remaining = MAX_TIME;

            if self.consecutive_correct >= self.config.streak_for_level_up {
                self.level += 1;
                self.consecutive_correct = 0;
                transition.leveled_up = true;
                tracing::debug!(level = self.level, "level up");
            }
            Verdict::Correct
        } else {
            self.stats.record_incorrect(operation);
            Verdict::Incorrect
        };

        transition.verdict = Some(verdict);
        self.feedback = Some(Feedback {
            verdict,
            remaining_ms: self.config.feedback_delay_ms,
        });
        if self.config.feedback_delay_ms == 0 {
            self.finish_feedback(problems, transition);
        }
    }

    fn finish_feedback<P: ProblemSource + ?Sized>(
        &mut self,
        problems: &mut P,
        transition: &mut Transition,
    ) {
        if let Some(feedback) = self.feedback.take() {
            if feedback.verdict == Verdict::Correct {
                self.current_problem = problems.next_problem(self.level);
                transition.new_problem = true;
            }
            self.question_started_ms = self.elapsed_ms;
        }
    }
}
