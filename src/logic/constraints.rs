//! Hard constraints shared by assignment, refinement, and final validation.

use crate::models::{Participant, PlayerId};
use std::collections::{HashMap, HashSet};

/// Symmetric set of roster-index pairs that must never share a team.
pub(crate) struct AvoidPairs {
    pairs: HashSet<(usize, usize)>,
}

impl AvoidPairs {
    /// Collect avoid links by roster index; either side listing the other counts.
    pub fn from_roster(roster: &[Participant], index: &HashMap<PlayerId, usize>) -> Self {
        let mut pairs = HashSet::new();
        for (i, p) in roster.iter().enumerate() {
            for other in &p.avoid_with {
                if let Some(&j) = index.get(other) {
                    if i != j {
                        pairs.insert((i.min(j), i.max(j)));
                    }
                }
            }
        }
        Self { pairs }
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn forbids(&self, a: usize, b: usize) -> bool {
        self.pairs.contains(&(a.min(b), a.max(b)))
    }

    /// True if `member` may not join a team holding `occupants`.
    pub fn conflicts<'a>(&self, member: usize, occupants: impl IntoIterator<Item = &'a usize>) -> bool {
        !self.is_empty() && occupants.into_iter().any(|&o| self.forbids(member, o))
    }
}

/// Allowed team sizes for `n` players over `k` teams.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct SizeBounds {
    /// floor(n / k)
    pub min: usize,
    /// ceil(n / k)
    pub max: usize,
    /// How many teams end up with `max` players when `max > min` (n % k).
    pub remainder: usize,
}

impl SizeBounds {
    /// `k` must be non-zero.
    pub fn new(n: usize, k: usize) -> Self {
        let min = n / k;
        let remainder = n % k;
        let max = if remainder == 0 { min } else { min + 1 };
        Self { min, max, remainder }
    }

    /// True if `sizes` can still grow into a valid final distribution:
    /// no team above `max`, and no more than `remainder` teams above `min`.
    pub fn admits(&self, sizes: impl IntoIterator<Item = usize>) -> bool {
        let mut above_min = 0;
        for size in sizes {
            if size > self.max {
                return false;
            }
            if size > self.min {
                above_min += 1;
            }
        }
        above_min <= self.remainder
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_even_split() {
        let b = SizeBounds::new(8, 2);
        assert_eq!((b.min, b.max, b.remainder), (4, 4, 0));
        assert!(b.admits([4, 3]));
        assert!(!b.admits([5, 3]));
    }

    #[test]
    fn bounds_uneven_split_limits_large_teams() {
        let b = SizeBounds::new(7, 3);
        assert_eq!((b.min, b.max, b.remainder), (2, 3, 1));
        assert!(b.admits([3, 2, 0]));
        assert!(!b.admits([3, 3, 0]));
    }

    #[test]
    fn avoid_pairs_are_symmetric() {
        let a = Participant::new(5.0);
        let b = Participant::new(5.0).avoid(a.id);
        let roster = vec![a, b];
        let index = crate::logic::grouping::index_by_id(&roster);
        let avoid = AvoidPairs::from_roster(&roster, &index);
        assert!(avoid.forbids(0, 1));
        assert!(avoid.forbids(1, 0));
        assert!(avoid.conflicts(0, &[1]));
        assert!(!avoid.conflicts(0, std::iter::empty()));
    }
}
