//! Team balancer entry point: grouping -> assignment -> refinement -> validation.

use crate::logic::assignment::{assign_units, Targets, TeamDraft};
use crate::logic::constraints::{AvoidPairs, SizeBounds};
use crate::logic::grouping::{group_units, index_by_id};
use crate::logic::refinement::{refine, RefineParams};
use crate::models::{
    BalanceError, Participant, Team, AVOID_RULE_BROKEN, NO_TEAMS, OVERSIZED_UNIT, SIZE_RULE_BROKEN,
};
use rand::Rng;

/// Tuning for one balancing call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BalanceConfig {
    /// Upper bound on refinement swaps (each swap restarts the scan).
    pub max_passes: usize,
    /// Weight of the size term in the assignment cost.
    pub size_weight: f64,
    /// Weight of the size term in the refinement metric.
    pub size_penalty: f64,
    /// Scale of the random tie-break added to each swap evaluation. 0 disables it.
    pub tie_jitter: f64,
}

impl Default for BalanceConfig {
    fn default() -> Self {
        Self {
            max_passes: 100,
            size_weight: 0.9,
            size_penalty: 0.15,
            tie_jitter: 1e-9,
        }
    }
}

impl BalanceConfig {
    /// Default config without the random tie-break: identical input gives identical output.
    pub fn deterministic() -> Self {
        Self {
            tie_jitter: 0.0,
            ..Self::default()
        }
    }
}

/// Split `roster` into `team_count` balanced teams with the default config.
///
/// See [`balance_with`].
pub fn balance(roster: &[Participant], team_count: usize) -> Result<Vec<Team>, BalanceError> {
    balance_with(roster, team_count, &BalanceConfig::default(), &mut rand::thread_rng())
}

/// Split `roster` into `team_count` balanced teams.
///
/// 1. Group must-play links into units; fail if a unit exceeds `ceil(n / team_count)`.
/// 2. Greedily place units, skipping teams that break avoid links or size bounds.
/// 3. Swap single players between teams while the imbalance metric improves.
/// 4. Sort members by descending skill and check the final partition.
///
/// Returns `team_count` teams in index order. Nothing partial is returned on error.
pub fn balance_with<R: Rng + ?Sized>(
    roster: &[Participant],
    team_count: usize,
    config: &BalanceConfig,
    rng: &mut R,
) -> Result<Vec<Team>, BalanceError> {
    if team_count == 0 {
        return Err(BalanceError::violation(NO_TEAMS));
    }

    let index = index_by_id(roster);
    let units = group_units(roster, &index);
    let bounds = SizeBounds::new(roster.len(), team_count);
    if let Some(unit) = units.iter().find(|u| u.size() > bounds.max) {
        log::debug!(
            "Must-play unit of {} exceeds max team size {}",
            unit.size(),
            bounds.max
        );
        return Err(BalanceError::violation(OVERSIZED_UNIT));
    }
    log::debug!(
        "Balancing {} player(s) in {} unit(s) into {} team(s)",
        roster.len(),
        units.len(),
        team_count
    );

    let avoid = AvoidPairs::from_roster(roster, &index);
    let targets = Targets::new(roster, team_count);
    let mut drafts = assign_units(&units, team_count, bounds, targets, &avoid, config.size_weight);

    let mut swappable = vec![false; roster.len()];
    for unit in units.iter().filter(|u| u.size() == 1) {
        swappable[unit.members[0]] = true;
    }
    let params = RefineParams {
        target_size: targets.size,
        size_penalty: config.size_penalty,
        tie_jitter: config.tie_jitter,
        max_passes: config.max_passes,
    };
    let swaps = refine(roster, &mut drafts, &swappable, &avoid, params, rng);
    log::debug!("Refinement applied {} swap(s)", swaps);

    validate(&drafts, &avoid)?;
    Ok(finish(roster, drafts))
}

/// Final safety net: size gap at most one and no avoid-pair sharing a team.
fn validate(drafts: &[TeamDraft], avoid: &AvoidPairs) -> Result<(), BalanceError> {
    let max = drafts.iter().map(TeamDraft::size).max().unwrap_or(0);
    let min = drafts.iter().map(TeamDraft::size).min().unwrap_or(0);
    if max - min > 1 {
        return Err(BalanceError::violation(SIZE_RULE_BROKEN));
    }
    for team in drafts {
        for (i, &a) in team.members.iter().enumerate() {
            if avoid.conflicts(a, &team.members[i + 1..]) {
                return Err(BalanceError::violation(AVOID_RULE_BROKEN));
            }
        }
    }
    Ok(())
}

/// Freeze drafts into teams: members by descending skill, sums recomputed.
fn finish(roster: &[Participant], drafts: Vec<TeamDraft>) -> Vec<Team> {
    drafts
        .into_iter()
        .enumerate()
        .map(|(i, draft)| {
            let mut members: Vec<Participant> =
                draft.members.iter().map(|&m| roster[m].clone()).collect();
            members.sort_by(|a, b| b.skill.total_cmp(&a.skill));
            Team::new(i + 1, members)
        })
        .collect()
}
