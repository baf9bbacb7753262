//! Session statistics, player profiles and the dashboard aggregate.

use crate::constants::RECENT_GAMES_LIMIT;
use crate::problem::Operation;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Correct/total counter for one operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationStats {
    pub correct: u32,
    pub total: u32,
}

impl OperationStats {
    /// Accuracy as a ratio in [0, 1], or `None` before the first attempt.
    pub fn ratio(&self) -> Option<f64> {
        if self.total == 0 {
            None
        } else {
            Some(self.correct as f64 / self.total as f64)
        }
    }

    /// Accuracy as a rounded percentage, 0 before the first attempt.
    pub fn percent(&self) -> u32 {
        self.ratio().map_or(0, |r| (r * 100.0).round() as u32)
    }

    fn merge(&mut self, other: &OperationStats) {
        self.correct += other.correct;
        self.total += other.total;
    }
}

/// In-memory aggregate for the session in progress.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunningStats {
    pub total_questions: u32,
    pub total_correct: u32,
    pub total_incorrect: u32,
    pub by_operation: BTreeMap<Operation, OperationStats>,
    /// Sum of response times of correct answers
    pub total_response_ms: u64,
    /// Operations answered correctly at least once
    pub encountered: BTreeSet<Operation>,
}

impl RunningStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_correct(&mut self, operation: Operation, response_ms: u64) {
        self.total_questions += 1;
        self.total_correct += 1;
        self.total_response_ms += response_ms;
        self.encountered.insert(operation);
        let entry = self.by_operation.entry(operation).or_default();
        entry.correct += 1;
        entry.total += 1;
    }

    pub fn record_incorrect(&mut self, operation: Operation) {
        self.total_questions += 1;
        self.total_incorrect += 1;
        self.by_operation.entry(operation).or_default().total += 1;
    }

    pub fn operation(&self, operation: Operation) -> OperationStats {
        self.by_operation.get(&operation).copied().unwrap_or_default()
    }

    /// Mean response time of correct answers, in seconds.
    pub fn avg_response_secs(&self) -> f64 {
        if self.total_correct == 0 {
            0.0
        } else {
            self.total_response_ms as f64 / self.total_correct as f64 / 1000.0
        }
    }

    /// Overall accuracy as a percentage, or `None` before the first answer.
    pub fn accuracy_percent(&self) -> Option<f64> {
        if self.total_questions == 0 {
            None
        } else {
            Some(self.total_correct as f64 / self.total_questions as f64 * 100.0)
        }
    }
}

/// Aggregated statistics handed to the recorder when a session ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub score: u32,
    pub max_level: u32,
    pub operations: BTreeSet<Operation>,
    pub total_questions: u32,
    pub total_correct: u32,
    pub total_incorrect: u32,
    pub avg_response_secs: f64,
    pub by_operation: BTreeMap<Operation, OperationStats>,
}

impl SessionSummary {
    pub fn from_stats(score: u32, max_level: u32, stats: &RunningStats) -> Self {
        Self {
            score,
            max_level,
            operations: stats.encountered.clone(),
            total_questions: stats.total_questions,
            total_correct: stats.total_correct,
            total_incorrect: stats.total_incorrect,
            avg_response_secs: stats.avg_response_secs(),
            by_operation: stats.by_operation.clone(),
        }
    }
}

/// Cumulative per-player totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub id: String,
    pub name: String,
    /// Highest level ever reached
    pub current_level: u32,
    pub total_score: u64,
    pub games_played: u32,
    pub best_score: u32,
    pub created_at: DateTime<Utc>,
}

impl PlayerProfile {
    pub fn new(name: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            current_level: 1,
            total_score: 0,
            games_played: 0,
            best_score: 0,
            created_at,
        }
    }

    /// Profile after folding in one finished session. Does not mutate `self`.
    pub fn with_session(&self, summary: &SessionSummary) -> Self {
        Self {
            current_level: self.current_level.max(summary.max_level),
            total_score: self.total_score + summary.score as u64,
            games_played: self.games_played + 1,
            best_score: self.best_score.max(summary.score),
            ..self.clone()
        }
    }
}

/// One recorded session, as kept in the player's file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub score: u32,
    pub level: u32,
    pub operations: Vec<Operation>,
    pub total_questions: u32,
    pub total_correct: u32,
    pub total_incorrect: u32,
    pub avg_response_secs: f64,
    #[serde(default)]
    pub by_operation: BTreeMap<Operation, OperationStats>,
}

impl GameRecord {
    pub fn from_summary(summary: &SessionSummary, created_at: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            created_at,
            score: summary.score,
            level: summary.max_level,
            operations: summary.operations.iter().copied().collect(),
            total_questions: summary.total_questions,
            total_correct: summary.total_correct,
            total_incorrect: summary.total_incorrect,
            avg_response_secs: summary.avg_response_secs,
            by_operation: summary.by_operation.clone(),
        }
    }

    /// Operation with the highest accuracy in this game. Ties keep the
    /// earlier operation; a game with no correct answers has none.
    pub fn best_operation(&self) -> Option<Operation> {
        let mut best: Option<(Operation, f64)> = None;
        for op in Operation::ALL {
            let Some(ratio) = self.by_operation.get(&op).and_then(|s| s.ratio()) else {
                continue;
            };
            if ratio > best.map_or(0.0, |(_, r)| r) {
                best = Some((op, ratio));
            }
        }
        best.map(|(op, _)| op)
    }
}

/// Accuracy line for one operation on the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OperationAccuracy {
    pub correct: u32,
    pub total: u32,
    pub accuracy_percent: u32,
}

/// Summary of the most recent game.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LastGame {
    pub score: u32,
    pub level: u32,
    pub correct: u32,
    pub incorrect: u32,
    pub response_secs: f64,
    pub best_operation: Option<Operation>,
}

/// Entry in the recent games list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentGame {
    pub id: String,
    pub score: u32,
    pub level: u32,
    pub operations: Vec<Operation>,
    pub created_at: DateTime<Utc>,
}

/// Everything the stats dashboard shows for one player.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub best_score: u32,
    pub average_score: u32,
    pub total_games: u32,
    pub total_correct: u32,
    pub total_questions: u32,
    pub total_incorrect: u32,
    pub avg_response_secs: f64,
    pub accuracy_percent: u32,
    pub by_operation: BTreeMap<Operation, OperationAccuracy>,
    pub last_game: LastGame,
    pub recent: Vec<RecentGame>,
}

fn round_2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl Dashboard {
    /// Build the dashboard from records in chronological order.
    pub fn from_records(records: &[GameRecord]) -> Self {
        let mut by_operation: BTreeMap<Operation, OperationStats> =
            Operation::ALL.iter().map(|&op| (op, OperationStats::default())).collect();

        let Some(last) = records.last() else {
            return Self {
                best_score: 0,
                average_score: 0,
                total_games: 0,
                total_correct: 0,
                total_questions: 0,
                total_incorrect: 0,
                avg_response_secs: 0.0,
                accuracy_percent: 0,
                by_operation: accuracy_table(&by_operation),
                last_game: LastGame::default(),
                recent: Vec::new(),
            };
        };

        let total_games = records.len() as u32;
        let score_sum: u64 = records.iter().map(|r| r.score as u64).sum();
        let total_correct = records.iter().map(|r| r.total_correct).sum();
        let total_questions: u32 = records.iter().map(|r| r.total_questions).sum();
        let total_incorrect = records.iter().map(|r| r.total_incorrect).sum();
        let response_sum: f64 = records.iter().map(|r| r.avg_response_secs).sum();

        for record in records {
            for (op, stats) in &record.by_operation {
                by_operation.entry(*op).or_default().merge(stats);
            }
        }

        let accuracy_percent = OperationStats {
            correct: total_correct,
            total: total_questions,
        }
        .percent();

        Self {
            best_score: records.iter().map(|r| r.score).max().unwrap_or(0),
            average_score: (score_sum as f64 / total_games as f64).round() as u32,
            total_games,
            total_correct,
            total_questions,
            total_incorrect,
            avg_response_secs: round_2(response_sum / total_games as f64),
            accuracy_percent,
            by_operation: accuracy_table(&by_operation),
            last_game: LastGame {
                score: last.score,
                level: last.level,
                correct: last.total_correct,
                incorrect: last.total_incorrect,
                response_secs: round_2(last.avg_response_secs),
                best_operation: last.best_operation(),
            },
            recent: records
                .iter()
                .rev()
                .take(RECENT_GAMES_LIMIT)
                .map(|r| RecentGame {
                    id: r.id.clone(),
                    score: r.score,
                    level: r.level,
                    operations: r.operations.clone(),
                    created_at: r.created_at,
                })
                .collect(),
        }
    }
}

fn accuracy_table(
    stats: &BTreeMap<Operation, OperationStats>,
) -> BTreeMap<Operation, OperationAccuracy> {
    stats
        .iter()
        .map(|(op, s)| {
            (
                *op,
                OperationAccuracy {
                    correct: s.correct,
                    total: s.total,
                    accuracy_percent: s.percent(),
                },
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn record(score: u32, correct: u32, incorrect: u32, secs: i64) -> GameRecord {
        let mut stats = RunningStats::new();
        for _ in 0..correct {
            stats.record_correct(Operation::Addition, 2000);
        }
        for _ in 0..incorrect {
            stats.record_incorrect(Operation::Subtraction);
        }
        GameRecord::from_summary(&SessionSummary::from_stats(score, 2, &stats), at(secs))
    }

    #[test]
    fn test_running_stats_counts() {
        let mut stats = RunningStats::new();
        stats.record_correct(Operation::Addition, 1500);
        stats.record_correct(Operation::Addition, 2500);
        stats.record_incorrect(Operation::Division);

        assert_eq!(stats.total_questions, 3);
        assert_eq!(stats.total_correct, 2);
        assert_eq!(stats.total_incorrect, 1);
        assert_eq!(stats.operation(Operation::Addition), OperationStats { correct: 2, total: 2 });
        assert_eq!(stats.operation(Operation::Division), OperationStats { correct: 0, total: 1 });
        assert_eq!(stats.operation(Operation::Mixed), OperationStats::default());
        assert!((stats.avg_response_secs() - 2.0).abs() < 1e-9);
        // Only correct answers mark an operation as encountered
        assert!(stats.encountered.contains(&Operation::Addition));
        assert!(!stats.encountered.contains(&Operation::Division));
    }

    #[test]
    fn test_running_stats_empty() {
        let stats = RunningStats::new();
        assert_eq!(stats.avg_response_secs(), 0.0);
        assert_eq!(stats.accuracy_percent(), None);
    }

    #[test]
    fn test_profile_with_session_is_pure() {
        let profile = PlayerProfile::new("Ada", at(0));
        let mut stats = RunningStats::new();
        stats.record_correct(Operation::Addition, 1000);
        let summary = SessionSummary::from_stats(40, 3, &stats);

        let updated = profile.with_session(&summary);
        assert_eq!(updated.games_played, 1);
        assert_eq!(updated.total_score, 40);
        assert_eq!(updated.best_score, 40);
        assert_eq!(updated.current_level, 3);
        assert_eq!(updated.id, profile.id);
        assert_eq!(profile.games_played, 0);

        let lower = SessionSummary::from_stats(10, 1, &stats);
        let again = updated.with_session(&lower);
        assert_eq!(again.best_score, 40);
        assert_eq!(again.current_level, 3);
        assert_eq!(again.total_score, 50);
    }

    #[test]
    fn test_best_operation() {
        let mut rec = record(10, 0, 0, 0);
        assert_eq!(rec.best_operation(), None);

        rec.by_operation.insert(Operation::Addition, OperationStats { correct: 1, total: 2 });
        rec.by_operation.insert(Operation::Division, OperationStats { correct: 3, total: 3 });
        rec.by_operation.insert(Operation::Mixed, OperationStats { correct: 0, total: 4 });
        assert_eq!(rec.best_operation(), Some(Operation::Division));

        // Ties keep the earlier operation
        rec.by_operation.insert(Operation::Subtraction, OperationStats { correct: 2, total: 2 });
        assert_eq!(rec.best_operation(), Some(Operation::Subtraction));
    }

    #[test]
    fn test_dashboard_empty() {
        let dashboard = Dashboard::from_records(&[]);
        assert_eq!(dashboard.total_games, 0);
        assert_eq!(dashboard.best_score, 0);
        assert_eq!(dashboard.accuracy_percent, 0);
        assert_eq!(dashboard.by_operation.len(), Operation::ALL.len());
        assert_eq!(dashboard.last_game.best_operation, None);
        assert!(dashboard.recent.is_empty());
    }

    #[test]
    fn test_dashboard_aggregates() {
        let records = vec![record(30, 3, 1, 100), record(55, 5, 0, 200), record(0, 0, 2, 300)];
        let dashboard = Dashboard::from_records(&records);

        assert_eq!(dashboard.total_games, 3);
        assert_eq!(dashboard.best_score, 55);
        assert_eq!(dashboard.average_score, 28); // 85 / 3 = 28.33
        assert_eq!(dashboard.total_correct, 8);
        assert_eq!(dashboard.total_incorrect, 3);
        assert_eq!(dashboard.total_questions, 11);
        assert_eq!(dashboard.accuracy_percent, 73); // 8 / 11 = 72.7
        // (2.0 + 2.0 + 0.0) / 3
        assert!((dashboard.avg_response_secs - 1.33).abs() < 1e-9);

        let add = dashboard.by_operation[&Operation::Addition];
        assert_eq!((add.correct, add.total, add.accuracy_percent), (8, 8, 100));
        let sub = dashboard.by_operation[&Operation::Subtraction];
        assert_eq!((sub.correct, sub.total, sub.accuracy_percent), (0, 3, 0));

        assert_eq!(dashboard.last_game.score, 0);
        assert_eq!(dashboard.last_game.incorrect, 2);
        assert_eq!(dashboard.last_game.best_operation, None);

        // Newest first
        let scores: Vec<u32> = dashboard.recent.iter().map(|r| r.score).collect();
        assert_eq!(scores, vec![0, 55, 30]);
    }

    #[test]
    fn test_dashboard_recent_limit() {
        let records: Vec<GameRecord> = (0..15).map(|i| record(i * 10, 1, 0, i as i64)).collect();
        let dashboard = Dashboard::from_records(&records);
        assert_eq!(dashboard.recent.len(), RECENT_GAMES_LIMIT);
        assert_eq!(dashboard.recent[0].score, 140);
        assert_eq!(dashboard.recent[9].score, 50);
    }
}
