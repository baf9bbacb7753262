//! Rule-based tips from a read-only view of the running session.

use crate::constants::*;
use crate::stats::RunningStats;
use rand::Rng;

/// What the coach is allowed to see. Borrowed, never mutated.
#[derive(Debug, Clone, Copy)]
pub struct CoachSnapshot<'a> {
    pub stats: &'a RunningStats,
    pub level: u32,
    pub time_remaining: f64,
}

/// Shown when no rule applies yet.
pub const IDLE_TIP: &str = "I'm here to help. Start answering!";

/// Every tip that applies to the snapshot, in rule order.
pub fn generate_tips(snapshot: &CoachSnapshot) -> Vec<String> {
    let stats = snapshot.stats;
    let mut tips = Vec::new();

    let avg_secs = stats.avg_response_secs();
    if avg_secs > COACH_SLOW_RESPONSE_SECS {
        tips.push("Picture the problem before you answer.".to_string());
    }

    if let Some(accuracy) = stats.accuracy_percent() {
        if accuracy < COACH_LOW_ACCURACY_PERCENT {
            tips.push("Take your time. Accuracy matters more than speed.".to_string());
        }
    }

    for (op, op_stats) in &stats.by_operation {
        if op_stats
            .ratio()
            .is_some_and(|ratio| ratio < COACH_WEAK_OPERATION_RATIO)
        {
            tips.push(format!("Focus a little more on {} problems.", op.name()));
        }
    }

    if snapshot.level == 1 && stats.total_correct > 10 {
        tips.push(format!(
            "Your average time is {:.1}s. Try to keep a steady pace.",
            avg_secs
        ));
    }

    if stats.total_questions > 0 && snapshot.time_remaining < COACH_LOW_TIME {
        tips.push("The clock is running low. Trust your first answer!".to_string());
    }

    tips
}

/// Pick one applicable tip at random, or `None` if no rule fires.
pub fn pick_tip<R: Rng + ?Sized>(snapshot: &CoachSnapshot, rng: &mut R) -> Option<String> {
    let mut tips = generate_tips(snapshot);
    if tips.is_empty() {
        return None;
    }
    let index = rng.gen_range(0..tips.len());
    Some(tips.swap_remove(index))
}

/// Holds the current tip and decides when to refresh it.
#[derive(Debug, Clone)]
pub struct Coach {
    tip: Option<String>,
    refresh_ms: u64,
    since_refresh_ms: u64,
}

impl Coach {
    pub fn new(refresh_seconds: u64) -> Self {
        Self {
            tip: None,
            refresh_ms: refresh_seconds.saturating_mul(1000),
            // Refresh on the first update
            since_refresh_ms: u64::MAX,
        }
    }

    /// Text to display right now.
    pub fn message(&self) -> &str {
        self.tip.as_deref().unwrap_or(IDLE_TIP)
    }

    /// Advance the refresh timer; picks a new tip when it is due.
    /// An empty rule set keeps the previous tip. Returns true if it changed.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        dt_ms: u64,
        snapshot: &CoachSnapshot,
        rng: &mut R,
    ) -> bool {
        self.since_refresh_ms = self.since_refresh_ms.saturating_add(dt_ms);
        if self.since_refresh_ms < self.refresh_ms {
            return false;
        }
        self.since_refresh_ms = 0;
        match pick_tip(snapshot, rng) {
            Some(tip) if self.tip.as_deref() != Some(tip.as_str()) => {
                self.tip = Some(tip);
                true
            }
            _ => false,
        }
    }

    pub fn reset(&mut self) {
        self.tip = None;
        self.since_refresh_ms = u64::MAX;
    }
}
