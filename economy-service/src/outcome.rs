use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use core_types::types::{ChannelId, UserId};
use roll_engine::RollResult;

/// Result payload of a roll attempt, handed to the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum RollOutcome {
    Rolled {
        roll: RollResult,
        /// Balance after settlement; unchanged on a whiff.
        total_points: i64,
        earned_this_window: u32,
    },
    /// Hourly cap reached; no roll was performed.
    RateLimited { resets_at: DateTime<Utc> },
}

/// Read-only account view; zeroed defaults for users without an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileView {
    pub rolled_counts: BTreeMap<String, u64>,
    pub points: i64,
}

/// Structured transfer invocation from the dispatch layer.
#[derive(Debug, Clone)]
pub struct TransferRequest {
    pub giver: UserId,
    pub receiver: UserId,
    pub points: i64,
    /// Scope the confirmation reply must arrive in.
    pub scope: ChannelId,
    /// Policy flag bound by the dispatch layer; automated/service accounts
    /// are not eligible receivers.
    pub receiver_is_participant: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferRejection {
    SelfTransfer,
    NonPositiveAmount,
    IneligibleReceiver,
    InsufficientFunds { available: i64 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum TransferOutcome {
    Committed {
        points: i64,
        giver_points: i64,
        receiver_points: i64,
    },
    Declined,
    /// The requester answered, but not with an accept/cancel word.
    InvalidReply,
    TimedOut,
    Rejected(TransferRejection),
}
