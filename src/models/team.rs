//! Team (balancer output) and BalanceError.

use crate::models::participant::{Participant, PlayerId};
use serde::{Deserialize, Serialize};

/// Reason used when a must-play group cannot fit any team.
pub const OVERSIZED_UNIT: &str = "must-play unit larger than allowed team size";
/// Reason used when the final sizes differ by more than one.
pub const SIZE_RULE_BROKEN: &str = "final size distribution violates ±1 rule";
/// Reason used when the final partition puts an avoid-pair together.
pub const AVOID_RULE_BROKEN: &str = "final partition places an avoid-pair on the same team";
/// Reason used when asked for zero teams.
pub const NO_TEAMS: &str = "team count must be at least 1";

/// Errors produced by the balancer. There is exactly one kind.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum BalanceError {
    /// The requested partition is impossible under the hard constraints.
    ConstraintViolation(String),
}

impl BalanceError {
    pub(crate) fn violation(reason: &str) -> Self {
        BalanceError::ConstraintViolation(reason.to_string())
    }

    /// Human-readable reason.
    pub fn reason(&self) -> &str {
        match self {
            BalanceError::ConstraintViolation(reason) => reason,
        }
    }
}

impl std::fmt::Display for BalanceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BalanceError::ConstraintViolation(reason) => write!(f, "Constraint violation: {}", reason),
        }
    }
}

impl std::error::Error for BalanceError {}

/// One balanced team. Members are sorted by descending skill.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Team {
    /// 1-based position in the output.
    pub index: usize,
    pub name: String,
    pub members: Vec<Participant>,
    pub skill_sum: f64,
    pub size: usize,
}

impl Team {
    /// Build a team from its final membership; sum and size are derived from `members`.
    pub fn new(index: usize, members: Vec<Participant>) -> Self {
        let skill_sum = members.iter().map(|p| p.skill).sum();
        let size = members.len();
        Self {
            index,
            name: format!("Team {}", index),
            members,
            skill_sum,
            size,
        }
    }

    /// Mean skill, or 0 for an empty team.
    pub fn average_skill(&self) -> f64 {
        if self.size == 0 {
            0.0
        } else {
            self.skill_sum / self.size as f64
        }
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.members.iter().any(|p| p.id == id)
    }
}
