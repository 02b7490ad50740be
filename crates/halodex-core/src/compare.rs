//! Side-by-side comparison of two characters.

use std::cmp::Ordering;

use crate::model::{Character, Stat};

/// One attribute of a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatComparison {
    pub stat: Stat,
    pub left: u8,
    pub right: u8,
}

impl StatComparison {
    /// `Greater` when the left character has the higher value.
    pub fn outcome(&self) -> Ordering {
        self.left.cmp(&self.right)
    }
}

/// Compare every numeric attribute of `left` against `right`.
pub fn compare(left: &Character, right: &Character) -> Vec<StatComparison> {
    Stat::ALL
        .into_iter()
        .map(|stat| StatComparison {
            stat,
            left: left.stats.get(stat),
            right: right.stats.get(stat),
        })
        .collect()
}
