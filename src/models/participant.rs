//! Participant: the balancer's view of one player.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a player (opaque to the balancer).
pub type PlayerId = Uuid;

/// A roster entrant that the balancer places on a team.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: PlayerId,
    pub skill: f64,
    /// Players that must end up on the same team. Treated as symmetric.
    #[serde(default)]
    pub must_with: Vec<PlayerId>,
    /// Players that must never share a team. Treated as symmetric.
    #[serde(default)]
    pub avoid_with: Vec<PlayerId>,
}

impl Participant {
    /// New participant with a fresh id and no links.
    pub fn new(skill: f64) -> Self {
        Self::with_id(Uuid::new_v4(), skill)
    }

    pub fn with_id(id: PlayerId, skill: f64) -> Self {
        Self {
            id,
            skill,
            must_with: Vec::new(),
            avoid_with: Vec::new(),
        }
    }

    /// Add a must-play-together link to `other`.
    pub fn must_play_with(mut self, other: PlayerId) -> Self {
        self.must_with.push(other);
        self
    }

    /// Add a must-not-play-together link to `other`.
    pub fn avoid(mut self, other: PlayerId) -> Self {
        self.avoid_with.push(other);
        self
    }
}
