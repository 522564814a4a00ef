// Copyright (c) James Kassemi, SC, US. All rights reserved.

//! Reward roller: the randomized draw algorithm of the gacha economy.
//!
//! Pure given a [`RandomSource`]; the roller knows nothing about accounts,
//! earning caps, or persistence. One roll is [`GROUP_COUNT`] groups of
//! [`DRAWS_PER_GROUP`] tier draws; a group scores when all of its draws land
//! on one tier. One slot index is drawn from `0..ASSURED_SLOTS`, and when it
//! names a real group that group repeats a single pre-drawn tier, forcing a
//! match.

use std::collections::BTreeMap;
use std::sync::Arc;

use core_types::tier::{TierId, TierTable};
use rand::Rng;

pub const GROUP_COUNT: usize = 3;
pub const DRAWS_PER_GROUP: usize = 3;
/// One more slot than there are groups: drawing the extra slot forces no
/// group, so three rolls in four carry an assured match.
pub const ASSURED_SLOTS: usize = GROUP_COUNT + 1;

/// Source of uniform integer draws. Production code uses
/// [`ThreadRandomSource`]; tests inject scripted or seeded sources.
pub trait RandomSource: Send {
    /// Uniform draw over the inclusive range `[low, high]`.
    fn uniform(&mut self, low: u32, high: u32) -> u32;
}

/// Draws from the thread-local rng.
#[derive(Debug, Default)]
pub struct ThreadRandomSource;

impl RandomSource for ThreadRandomSource {
    fn uniform(&mut self, low: u32, high: u32) -> u32 {
        rand::thread_rng().gen_range(low..=high)
    }
}

/// Outcome of one group of draws within a roll.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroupOutcome {
    pub draws: [TierId; DRAWS_PER_GROUP],
    /// Whether this group was the assured one.
    pub assured: bool,
    /// The shared tier when every draw in the group matched.
    pub matched: Option<TierId>,
}

/// Full transcript of one roll, enough for the presentation layer to
/// rebuild the per-draw glyph rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollResult {
    pub groups: [GroupOutcome; GROUP_COUNT],
    /// Sum of the tier values of every matched group; zero on a whiff.
    pub points_won: i64,
    /// Matched groups per tier name, for folding into lifetime counters.
    pub matched_counts: BTreeMap<String, u64>,
}

impl RollResult {
    pub fn is_whiff(&self) -> bool {
        self.points_won == 0
    }
}

#[derive(Clone)]
pub struct RewardRoller {
    table: Arc<TierTable>,
}

impl RewardRoller {
    pub fn new(table: Arc<TierTable>) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &TierTable {
        &self.table
    }

    /// Samples one tier: a uniform draw over `[1, draw_bound]` mapped through
    /// the cumulative bounds of the table.
    pub fn draw_tier(&self, rng: &mut dyn RandomSource) -> TierId {
        let draw = rng.uniform(1, self.table.draw_bound());
        self.table.tier_for_draw(draw)
    }

    /// Executes one full roll. Consumes, in order: the assured tier draw,
    /// the assured slot draw, then three independent draws per non-assured
    /// group.
    pub fn perform_roll(&self, rng: &mut dyn RandomSource) -> RollResult {
        let assured_tier = self.draw_tier(rng);
        let assured_slot = rng.uniform(0, (ASSURED_SLOTS - 1) as u32) as usize;

        let mut groups = [GroupOutcome::default(); GROUP_COUNT];
        let mut points_won = 0i64;
        let mut matched_counts = BTreeMap::new();

        for (index, group) in groups.iter_mut().enumerate() {
            group.assured = index == assured_slot;
            for draw in group.draws.iter_mut() {
                *draw = if group.assured {
                    assured_tier
                } else {
                    self.draw_tier(rng)
                };
            }
            let first = group.draws[0];
            group.matched = group.draws.iter().all(|d| *d == first).then_some(first);
            if let Some(tier) = group.matched {
                let spec = self.table.get(tier);
                points_won += spec.value;
                *matched_counts.entry(spec.name.clone()).or_insert(0) += 1;
            }
        }

        RollResult {
            groups,
            points_won,
            matched_counts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::VecDeque;

    /// Replays a fixed script of draws; panics when the script runs dry.
    struct ScriptedSource {
        values: VecDeque<u32>,
    }

    impl ScriptedSource {
        fn new(values: impl IntoIterator<Item = u32>) -> Self {
            Self {
                values: values.into_iter().collect(),
            }
        }

        fn exhausted(&self) -> bool {
            self.values.is_empty()
        }
    }

    impl RandomSource for ScriptedSource {
        fn uniform(&mut self, low: u32, high: u32) -> u32 {
            let value = self.values.pop_front().expect("script exhausted");
            assert!((low..=high).contains(&value), "scripted draw out of range");
            value
        }
    }

    struct SeededSource(StdRng);

    impl RandomSource for SeededSource {
        fn uniform(&mut self, low: u32, high: u32) -> u32 {
            self.0.gen_range(low..=high)
        }
    }

    fn roller() -> RewardRoller {
        RewardRoller::new(Arc::new(TierTable::default()))
    }

    #[test]
    fn draw_tier_maps_cumulative_boundaries() {
        let roller = roller();
        let table = roller.table().clone();
        for (draw, name) in [
            (1, "blue"),
            (50, "blue"),
            (51, "green"),
            (75, "green"),
            (76, "yellow"),
            (90, "yellow"),
            (91, "orange"),
            (98, "orange"),
            (99, "red"),
            (100, "red"),
        ] {
            let mut rng = ScriptedSource::new([draw]);
            let tier = roller.draw_tier(&mut rng);
            assert_eq!(table.get(tier).name, name, "draw {draw}");
        }
    }

    #[test]
    fn assured_group_always_matches() {
        let roller = roller();
        // Assured tier green (60), slot 0; groups 1 and 2 deliberately mixed.
        let mut rng = ScriptedSource::new([60, 0, 1, 60, 1, 1, 60, 1]);
        let result = roller.perform_roll(&mut rng);

        assert!(result.groups[0].assured);
        assert_eq!(result.groups[0].matched, Some(1));
        assert_eq!(result.groups[1].matched, None);
        assert_eq!(result.groups[2].matched, None);
        assert_eq!(result.points_won, 2);
        assert_eq!(result.matched_counts.get("green"), Some(&1));
        assert!(rng.exhausted());
    }

    #[test]
    fn slot_three_forces_no_group() {
        let roller = roller();
        // Slot 3 leaves all three groups independent: one assured draw, one
        // slot draw, then the full nine draws.
        let mut rng = ScriptedSource::new([60, 3, 1, 60, 1, 60, 1, 60, 1, 60, 1]);
        let result = roller.perform_roll(&mut rng);

        assert!(result.groups.iter().all(|g| !g.assured));
        assert!(result.groups.iter().all(|g| g.matched.is_none()));
        assert!(result.is_whiff());
        assert!(result.matched_counts.is_empty());
        assert!(rng.exhausted());
    }

    #[test]
    fn independent_groups_can_match_by_chance() {
        let roller = roller();
        // Slot 3; group 0 rolls triple red, group 1 triple blue, group 2 mixed.
        let mut rng = ScriptedSource::new([60, 3, 99, 99, 100, 1, 50, 25, 1, 60, 1]);
        let result = roller.perform_roll(&mut rng);

        assert_eq!(result.groups[0].matched, Some(4));
        assert_eq!(result.groups[1].matched, Some(0));
        assert_eq!(result.groups[2].matched, None);
        assert_eq!(result.points_won, 25 + 1);
        assert_eq!(result.matched_counts.get("red"), Some(&1));
        assert_eq!(result.matched_counts.get("blue"), Some(&1));
    }

    #[test]
    fn total_equals_sum_of_matched_tier_values() {
        let roller = roller();
        let table = roller.table().clone();
        let mut rng = SeededSource(StdRng::seed_from_u64(7));
        for _ in 0..1_000 {
            let result = roller.perform_roll(&mut rng);
            let expected: i64 = result
                .groups
                .iter()
                .filter_map(|g| g.matched)
                .map(|t| table.get(t).value)
                .sum();
            assert_eq!(result.points_won, expected);
        }
    }

    #[test]
    fn draw_distribution_converges_to_weights() {
        let roller = roller();
        let mut rng = SeededSource(StdRng::seed_from_u64(42));
        let trials = 200_000;
        let mut counts = vec![0u64; roller.table().len()];
        for _ in 0..trials {
            counts[roller.draw_tier(&mut rng)] += 1;
        }
        let expected = [0.50, 0.25, 0.15, 0.08, 0.02];
        for (tier, want) in expected.iter().enumerate() {
            let got = counts[tier] as f64 / trials as f64;
            assert!(
                (got - want).abs() < 0.01,
                "tier {tier}: got {got}, want {want}"
            );
        }
    }
}
