// Copyright (c) James Kassemi, SC, US. All rights reserved.

//! Platform identifiers, opaque to the economy core.

/// Platform-unique user identifier.
pub type UserId = u64;

/// Identifier of the scope (channel) a command arrived in; confirmation
/// replies must come from the same scope.
pub type ChannelId = u64;
