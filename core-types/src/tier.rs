// Copyright (c) James Kassemi, SC, US. All rights reserved.

//! The fixed, ordered reward-tier table.
//!
//! Tiers are ordered from lowest to highest value and carry a cumulative
//! weight: a uniform draw in `[1, draw_bound]` maps to the first tier whose
//! bound covers it. The default table draws over d100 with bounds
//! 50/75/90/98/100.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Index into the ordered tier table.
pub type TierId = usize;

#[derive(Debug, Error)]
pub enum TierTableError {
    #[error("tier table is empty")]
    Empty,
    #[error("duplicate tier name {name}")]
    DuplicateName { name: String },
    #[error("cumulative weight for tier {name} does not increase")]
    NonIncreasingWeight { name: String },
    #[error("tier {name} has non-positive value")]
    NonPositiveValue { name: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierSpec {
    pub name: String,
    /// Display glyph, passed through untouched to the presentation layer.
    pub glyph: String,
    pub value: i64,
    /// Inclusive upper bound of this tier in the cumulative draw range.
    pub cumulative_weight: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierTable {
    tiers: Vec<TierSpec>,
}

impl TierTable {
    pub fn new(tiers: Vec<TierSpec>) -> Result<Self, TierTableError> {
        if tiers.is_empty() {
            return Err(TierTableError::Empty);
        }
        let mut prev_bound = 0u32;
        for (idx, tier) in tiers.iter().enumerate() {
            if tier.value <= 0 {
                return Err(TierTableError::NonPositiveValue {
                    name: tier.name.clone(),
                });
            }
            if tier.cumulative_weight <= prev_bound {
                return Err(TierTableError::NonIncreasingWeight {
                    name: tier.name.clone(),
                });
            }
            prev_bound = tier.cumulative_weight;
            if tiers[..idx].iter().any(|t| t.name == tier.name) {
                return Err(TierTableError::DuplicateName {
                    name: tier.name.clone(),
                });
            }
        }
        Ok(Self { tiers })
    }

    pub fn get(&self, id: TierId) -> &TierSpec {
        &self.tiers[id]
    }

    pub fn id_of(&self, name: &str) -> Option<TierId> {
        self.tiers.iter().position(|t| t.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (TierId, &TierSpec)> {
        self.tiers.iter().enumerate()
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    /// Upper end of the uniform draw range, 100 for the default table.
    pub fn draw_bound(&self) -> u32 {
        self.tiers
            .last()
            .map(|t| t.cumulative_weight)
            .unwrap_or_default()
    }

    /// Maps a draw in `[1, draw_bound]` to its tier: the first tier whose
    /// cumulative bound is at or above the draw.
    pub fn tier_for_draw(&self, draw: u32) -> TierId {
        self.tiers
            .iter()
            .position(|t| draw <= t.cumulative_weight)
            .unwrap_or(self.tiers.len() - 1)
    }

    /// Zero count for every tier, keyed by name.
    pub fn zeroed_counts(&self) -> BTreeMap<String, u64> {
        self.tiers.iter().map(|t| (t.name.clone(), 0)).collect()
    }
}

impl Default for TierTable {
    fn default() -> Self {
        let tiers = [
            ("blue", ":blue_circle:", 1, 50),
            ("green", ":green_circle:", 2, 75),
            ("yellow", ":yellow_circle:", 5, 90),
            ("orange", ":orange_circle:", 10, 98),
            ("red", ":red_circle:", 25, 100),
        ]
        .into_iter()
        .map(|(name, glyph, value, cumulative_weight)| TierSpec {
            name: name.to_string(),
            glyph: glyph.to_string(),
            value,
            cumulative_weight,
        })
        .collect();
        Self::new(tiers).expect("default tier table")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_draw_boundaries() {
        let table = TierTable::default();
        assert_eq!(table.draw_bound(), 100);

        let blue = table.id_of("blue").unwrap();
        let green = table.id_of("green").unwrap();
        let yellow = table.id_of("yellow").unwrap();
        let orange = table.id_of("orange").unwrap();
        let red = table.id_of("red").unwrap();

        assert_eq!(table.tier_for_draw(1), blue);
        assert_eq!(table.tier_for_draw(50), blue);
        assert_eq!(table.tier_for_draw(51), green);
        assert_eq!(table.tier_for_draw(75), green);
        assert_eq!(table.tier_for_draw(76), yellow);
        assert_eq!(table.tier_for_draw(90), yellow);
        assert_eq!(table.tier_for_draw(91), orange);
        assert_eq!(table.tier_for_draw(98), orange);
        assert_eq!(table.tier_for_draw(99), red);
        assert_eq!(table.tier_for_draw(100), red);
    }

    #[test]
    fn default_table_values_in_order() {
        let table = TierTable::default();
        let values: Vec<i64> = table.iter().map(|(_, t)| t.value).collect();
        assert_eq!(values, vec![1, 2, 5, 10, 25]);
    }

    #[test]
    fn zeroed_counts_cover_every_tier() {
        let table = TierTable::default();
        let counts = table.zeroed_counts();
        assert_eq!(counts.len(), table.len());
        assert!(counts.values().all(|c| *c == 0));
    }

    #[test]
    fn rejects_non_increasing_weights() {
        let err = TierTable::new(vec![
            TierSpec {
                name: "a".into(),
                glyph: ":a:".into(),
                value: 1,
                cumulative_weight: 60,
            },
            TierSpec {
                name: "b".into(),
                glyph: ":b:".into(),
                value: 2,
                cumulative_weight: 60,
            },
        ])
        .unwrap_err();
        assert!(matches!(err, TierTableError::NonIncreasingWeight { .. }));
    }

    #[test]
    fn rejects_duplicate_names() {
        let err = TierTable::new(vec![
            TierSpec {
                name: "a".into(),
                glyph: ":a:".into(),
                value: 1,
                cumulative_weight: 50,
            },
            TierSpec {
                name: "a".into(),
                glyph: ":a2:".into(),
                value: 2,
                cumulative_weight: 100,
            },
        ])
        .unwrap_err();
        assert!(matches!(err, TierTableError::DuplicateName { .. }));
    }

    #[test]
    fn rejects_empty_table() {
        assert!(matches!(TierTable::new(vec![]), Err(TierTableError::Empty)));
    }
}
