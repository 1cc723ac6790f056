//! Initial assignment: greedy, constrained placement of units into teams.

use crate::logic::constraints::{AvoidPairs, SizeBounds};
use crate::logic::grouping::Unit;
use crate::models::Participant;

/// In-progress team: roster indices plus a running skill sum.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct TeamDraft {
    pub members: Vec<usize>,
    pub skill_sum: f64,
}

impl TeamDraft {
    pub fn size(&self) -> usize {
        self.members.len()
    }

    fn place(&mut self, unit: &Unit) {
        self.members.extend_from_slice(&unit.members);
        self.skill_sum += unit.skill_sum;
    }
}

/// Per-team ideal skill total and headcount.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Targets {
    pub skill_sum: f64,
    pub size: f64,
}

impl Targets {
    pub fn new(roster: &[Participant], team_count: usize) -> Self {
        let total_skill: f64 = roster.iter().map(|p| p.skill).sum();
        Self {
            skill_sum: total_skill / team_count as f64,
            size: roster.len() as f64 / team_count as f64,
        }
    }
}

/// Place every unit (already in priority order) into one of `team_count` teams.
///
/// For each unit, teams that would hold an avoid-pair or break the size bounds
/// are skipped; among the rest the lowest
/// `|sum + unit_sum - target_sum| + size_weight * |size + unit_size - target_size|`
/// wins (lowest index on ties). If every team is skipped the unit goes to the
/// smallest team; final validation catches what that breaks.
pub(crate) fn assign_units(
    units: &[Unit],
    team_count: usize,
    bounds: SizeBounds,
    targets: Targets,
    avoid: &AvoidPairs,
    size_weight: f64,
) -> Vec<TeamDraft> {
    let mut teams = vec![TeamDraft::default(); team_count];

    for unit in units {
        let mut best: Option<(usize, f64)> = None;
        for (t, team) in teams.iter().enumerate() {
            if unit
                .members
                .iter()
                .any(|&m| avoid.conflicts(m, &team.members))
            {
                continue;
            }
            let sizes = teams.iter().enumerate().map(|(j, other)| {
                if j == t {
                    other.size() + unit.size()
                } else {
                    other.size()
                }
            });
            if !bounds.admits(sizes) {
                continue;
            }
            let cost = (team.skill_sum + unit.skill_sum - targets.skill_sum).abs()
                + size_weight * ((team.size() + unit.size()) as f64 - targets.size).abs();
            if best.map_or(true, |(_, c)| cost < c) {
                best = Some((t, cost));
            }
        }

        let chosen = match best {
            Some((t, _)) => t,
            None => {
                let t = smallest_team(&teams);
                log::warn!(
                    "No team admits a unit of {} player(s); falling back to team {}",
                    unit.size(),
                    t + 1
                );
                t
            }
        };
        teams[chosen].place(unit);
    }

    teams
}

/// Index of the team with the fewest members (lowest index on ties).
fn smallest_team(teams: &[TeamDraft]) -> usize {
    teams
        .iter()
        .enumerate()
        .min_by_key(|(_, t)| t.size())
        .map(|(i, _)| i)
        .unwrap_or(0)
}
