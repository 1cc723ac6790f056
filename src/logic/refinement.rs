//! Local refinement: first-improvement hill-climbing over single-player swaps.
//!
//! This is a heuristic. It stops at the first arrangement that no single
//! swap can improve, which is a local optimum and not necessarily the best
//! possible partition.

use crate::logic::assignment::TeamDraft;
use crate::logic::constraints::AvoidPairs;
use crate::models::Participant;
use rand::Rng;

/// Improvements smaller than this are treated as no improvement.
pub(crate) const EPSILON: f64 = 1e-9;

/// Knobs for the swap search.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct RefineParams {
    pub target_size: f64,
    pub size_penalty: f64,
    pub tie_jitter: f64,
    pub max_passes: usize,
}

/// `variance(team averages) + size_penalty * mean(|size - target_size|)`.
/// Empty teams count with an average of 0.
pub(crate) fn imbalance(sums: &[f64], sizes: &[usize], target_size: f64, size_penalty: f64) -> f64 {
    let k = sums.len();
    if k == 0 {
        return 0.0;
    }
    let averages: Vec<f64> = sums
        .iter()
        .zip(sizes)
        .map(|(&s, &n)| if n == 0 { 0.0 } else { s / n as f64 })
        .collect();
    let mean = averages.iter().sum::<f64>() / k as f64;
    let variance = averages.iter().map(|a| (a - mean).powi(2)).sum::<f64>() / k as f64;
    let size_dev = sizes
        .iter()
        .map(|&n| (n as f64 - target_size).abs())
        .sum::<f64>()
        / k as f64;
    variance + size_penalty * size_dev
}

/// A swap of `teams[a].members[ia]` with `teams[b].members[ib]`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct Swap {
    a: usize,
    ia: usize,
    b: usize,
    ib: usize,
}

/// Swap single players between teams while the metric improves.
///
/// Only players with `swappable[i]` set (members of one-player units) move.
/// A pass scans team pairs in index order and players in member order, applies
/// the first swap that improves by more than [`EPSILON`], and starts over.
/// Stops when a pass finds nothing or after `max_passes`. Returns the number
/// of swaps applied.
pub(crate) fn refine<R: Rng + ?Sized>(
    roster: &[Participant],
    teams: &mut [TeamDraft],
    swappable: &[bool],
    avoid: &AvoidPairs,
    params: RefineParams,
    rng: &mut R,
) -> usize {
    let mut swaps = 0;
    for _ in 0..params.max_passes {
        match find_improving_swap(roster, teams, swappable, avoid, params, rng) {
            Some(s) => {
                apply_swap(roster, teams, s);
                swaps += 1;
            }
            None => break,
        }
    }
    swaps
}

fn find_improving_swap<R: Rng + ?Sized>(
    roster: &[Participant],
    teams: &[TeamDraft],
    swappable: &[bool],
    avoid: &AvoidPairs,
    params: RefineParams,
    rng: &mut R,
) -> Option<Swap> {
    let mut sums: Vec<f64> = teams.iter().map(|t| t.skill_sum).collect();
    let sizes: Vec<usize> = teams.iter().map(TeamDraft::size).collect();
    let current = imbalance(&sums, &sizes, params.target_size, params.size_penalty);

    for a in 0..teams.len() {
        for b in (a + 1)..teams.len() {
            for (ia, &pa) in teams[a].members.iter().enumerate() {
                if !swappable[pa] {
                    continue;
                }
                for (ib, &pb) in teams[b].members.iter().enumerate() {
                    if !swappable[pb] {
                        continue;
                    }
                    let delta = roster[pb].skill - roster[pa].skill;
                    let (sum_a, sum_b) = (sums[a], sums[b]);
                    sums[a] = sum_a + delta;
                    sums[b] = sum_b - delta;
                    let mut candidate =
                        imbalance(&sums, &sizes, params.target_size, params.size_penalty);
                    sums[a] = sum_a;
                    sums[b] = sum_b;
                    if params.tie_jitter > 0.0 {
                        candidate += params.tie_jitter * rng.gen::<f64>();
                    }
                    if candidate >= current - EPSILON {
                        continue;
                    }
                    let a_rest = teams[a].members.iter().filter(|&&m| m != pa);
                    let b_rest = teams[b].members.iter().filter(|&&m| m != pb);
                    if avoid.conflicts(pb, a_rest) || avoid.conflicts(pa, b_rest) {
                        continue;
                    }
                    return Some(Swap { a, ia, b, ib });
                }
            }
        }
    }
    None
}

fn apply_swap(roster: &[Participant], teams: &mut [TeamDraft], s: Swap) {
    let pa = teams[s.a].members[s.ia];
    let pb = teams[s.b].members[s.ib];
    let delta = roster[pb].skill - roster[pa].skill;
    teams[s.a].members[s.ia] = pb;
    teams[s.b].members[s.ib] = pa;
    teams[s.a].skill_sum += delta;
    teams[s.b].skill_sum -= delta;
}
