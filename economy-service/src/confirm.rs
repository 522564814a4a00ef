use async_trait::async_trait;
use core_types::types::{ChannelId, UserId};

/// Token parsed from a confirmation reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmToken {
    Accept,
    Decline,
}

impl ConfirmToken {
    /// Case-insensitive parse of the accept/cancel words. Anything else is
    /// an invalid answer, which ends the flow without committing.
    pub fn parse(reply: &str) -> Option<Self> {
        match reply.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" => Some(Self::Accept),
            "n" | "no" => Some(Self::Decline),
            _ => None,
        }
    }
}

/// Transport seam for the transfer confirmation wait. Implementations must
/// only yield replies authored by `user` within `scope`; the service applies
/// the timeout and parses the reply.
#[async_trait]
pub trait ConfirmationSource: Send + Sync {
    /// Next reply from the requester, or `None` when the transport closed.
    async fn next_reply(&self, user: UserId, scope: ChannelId) -> Option<String>;
}
