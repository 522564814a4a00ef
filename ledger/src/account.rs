use std::collections::BTreeMap;

use chrono::{DateTime, TimeZone, Utc};
use core_types::tier::TierTable;
use core_types::types::UserId;
use serde::{Deserialize, Serialize};

/// Earning windows reset at the top of each hour, UTC.
pub const SECONDS_PER_WINDOW: i64 = 3_600;

/// Durable per-user record; the source of truth for balances and lifetime
/// rolled-tier counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: UserId,
    /// Lifetime matched-group count per tier name; holds an entry for every
    /// configured tier.
    pub rolled_counts: BTreeMap<String, u64>,
    pub points: i64,
    /// Points earned since the current window opened.
    pub earned_this_window: u32,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub window_reset_at: DateTime<Utc>,
}

impl Account {
    /// Fresh account with zero counters for every configured tier and the
    /// window closing at the next top of hour.
    pub fn fresh(id: UserId, table: &TierTable, now: DateTime<Utc>) -> Self {
        Self {
            id,
            rolled_counts: table.zeroed_counts(),
            points: 0,
            earned_this_window: 0,
            window_reset_at: next_window_reset(now),
        }
    }

    /// Applies the hourly reset when `now` has reached the boundary. Runs
    /// before any cap check; returns whether a reset was applied.
    pub fn reset_window_if_due(&mut self, now: DateTime<Utc>) -> bool {
        if now >= self.window_reset_at {
            self.earned_this_window = 0;
            self.window_reset_at = next_window_reset(now);
            true
        } else {
            false
        }
    }

    /// Folds a winning roll into the record. The window counter may overshoot
    /// the cap here; the cap gates roll attempts, not partial winnings.
    pub fn settle_roll(&mut self, points_won: i64, matched_counts: &BTreeMap<String, u64>) {
        for (name, count) in matched_counts {
            *self.rolled_counts.entry(name.clone()).or_insert(0) += count;
        }
        self.points += points_won;
        self.earned_this_window = self
            .earned_this_window
            .saturating_add(points_won.max(0) as u32);
    }
}

/// Next top-of-hour boundary strictly after `now`.
pub fn next_window_reset(now: DateTime<Utc>) -> DateTime<Utc> {
    let ts = now.timestamp();
    let next = ts - ts.rem_euclid(SECONDS_PER_WINDOW) + SECONDS_PER_WINDOW;
    Utc.timestamp_opt(next, 0)
        .single()
        .expect("valid window timestamp")
}
