//! Grouping stage: collapse must-play links into indivisible units.

use crate::models::{Participant, PlayerId};
use std::collections::HashMap;

/// Disjoint-set forest over roster indices, with path compression.
struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, i: usize) -> usize {
        let mut root = i;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut cur = i;
        while self.parent[cur] != root {
            let next = self.parent[cur];
            self.parent[cur] = root;
            cur = next;
        }
        root
    }

    /// Merge the sets of `a` and `b`; the smaller root index becomes the parent.
    fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            let (keep, join) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[join] = keep;
        }
    }
}

/// A group of participants that must be placed together.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Unit {
    /// Roster indices, in roster order.
    pub members: Vec<usize>,
    pub skill_sum: f64,
}

impl Unit {
    pub fn size(&self) -> usize {
        self.members.len()
    }

    pub fn average_skill(&self) -> f64 {
        self.skill_sum / self.members.len() as f64
    }
}

/// Map participant id -> roster index.
pub(crate) fn index_by_id(roster: &[Participant]) -> HashMap<PlayerId, usize> {
    roster.iter().enumerate().map(|(i, p)| (p.id, i)).collect()
}

/// Build the must-play units for `roster`, highest priority first.
///
/// 1. Union every pair where either side lists the other in `must_with`
///    (ids not in the roster are ignored).
/// 2. Collect one unit per component, in order of first appearance.
/// 3. Stable sort by (average skill, size), both descending.
pub(crate) fn group_units(roster: &[Participant], index: &HashMap<PlayerId, usize>) -> Vec<Unit> {
    let mut uf = UnionFind::new(roster.len());
    for (i, p) in roster.iter().enumerate() {
        for other in &p.must_with {
            if let Some(&j) = index.get(other) {
                uf.union(i, j);
            }
        }
    }

    let mut slot_of_root: HashMap<usize, usize> = HashMap::new();
    let mut units: Vec<Unit> = Vec::new();
    for (i, p) in roster.iter().enumerate() {
        let root = uf.find(i);
        let slot = *slot_of_root.entry(root).or_insert_with(|| {
            units.push(Unit {
                members: Vec::new(),
                skill_sum: 0.0,
            });
            units.len() - 1
        });
        units[slot].members.push(i);
        units[slot].skill_sum += p.skill;
    }

    units.sort_by(|a, b| {
        b.average_skill()
            .total_cmp(&a.average_skill())
            .then_with(|| b.size().cmp(&a.size()))
    });
    units
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster(skills: &[f64]) -> Vec<Participant> {
        skills.iter().map(|&s| Participant::new(s)).collect()
    }

    #[test]
    fn singletons_without_links() {
        let r = roster(&[3.0, 7.0, 5.0]);
        let units = group_units(&r, &index_by_id(&r));
        assert_eq!(units.len(), 3);
        let order: Vec<usize> = units.iter().map(|u| u.members[0]).collect();
        assert_eq!(order, vec![1, 2, 0]);
    }

    #[test]
    fn one_directional_links_are_merged_transitively() {
        let mut r = roster(&[4.0, 6.0, 8.0, 2.0]);
        let b = r[1].id;
        r[0].must_with.push(b);
        // third lists second: still joins the same component
        r[2].must_with.push(b);
        let units = group_units(&r, &index_by_id(&r));
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].members, vec![0, 1, 2]);
        assert_eq!(units[0].skill_sum, 18.0);
        assert_eq!(units[0].average_skill(), 6.0);
        assert_eq!(units[1].members, vec![3]);
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let mut r = roster(&[5.0, 5.0]);
        r[0].must_with.push(PlayerId::new_v4());
        let units = group_units(&r, &index_by_id(&r));
        assert_eq!(units.len(), 2);
    }

    #[test]
    fn ties_on_average_prefer_larger_units() {
        let mut r = roster(&[5.0, 5.0, 5.0]);
        let c = r[2].id;
        r[1].must_with.push(c);
        let units = group_units(&r, &index_by_id(&r));
        assert_eq!(units[0].members, vec![1, 2]);
        assert_eq!(units[1].members, vec![0]);
    }
}
