// Copyright (c) James Kassemi, SC, US. All rights reserved.

//! Shared vocabulary for the gacha economy: ids, the reward-tier table,
//! configuration, and the conflict retry policy.

pub mod config;
pub mod retry;
pub mod tier;
pub mod types;
