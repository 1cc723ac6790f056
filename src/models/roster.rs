//! Roster, PlayerRecord, and RosterError.

use crate::models::participant::{Participant, PlayerId};
use crate::models::sheet::TeamSheet;
use crate::models::team::BalanceError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lowest skill a player can be rated.
pub const MIN_SKILL: f64 = 1.0;
/// Highest skill a player can be rated.
pub const MAX_SKILL: f64 = 10.0;

/// Errors that can occur during roster operations.
#[derive(Clone, Debug, PartialEq)]
pub enum RosterError {
    /// Player name is empty after trimming.
    EmptyName,
    /// A player with this name already exists (names are unique, case-insensitive).
    DuplicatePlayerName,
    /// No player with this id in the roster.
    PlayerNotFound(PlayerId),
    /// A CSV link column names a player that is not in the roster.
    UnknownPlayerName(String),
    /// Skill is not a finite number in MIN_SKILL..=MAX_SKILL.
    InvalidSkill(f64),
    /// A player cannot be linked to themselves.
    SelfLink,
    /// The pair already has the opposite link kind (must vs avoid).
    ConflictingLink,
    /// Team count must be at least 1.
    InvalidTeamCount,
    /// No team sheet with this id in the history.
    SheetNotFound(Uuid),
    /// CSV could not be read or written.
    Csv(String),
    /// The balancer rejected the roster.
    Balance(BalanceError),
}

impl std::fmt::Display for RosterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RosterError::EmptyName => write!(f, "Player name cannot be empty"),
            RosterError::DuplicatePlayerName => write!(f, "A player with this name already exists"),
            RosterError::PlayerNotFound(_) => write!(f, "Player not found"),
            RosterError::UnknownPlayerName(name) => write!(f, "Unknown player name: {}", name),
            RosterError::InvalidSkill(skill) => {
                write!(f, "Skill must be between {} and {} (got {})", MIN_SKILL, MAX_SKILL, skill)
            }
            RosterError::SelfLink => write!(f, "A player cannot be linked to themselves"),
            RosterError::ConflictingLink => {
                write!(f, "Players cannot both have to play together and be kept apart")
            }
            RosterError::InvalidTeamCount => write!(f, "Team count must be at least 1"),
            RosterError::SheetNotFound(_) => write!(f, "Team sheet not found"),
            RosterError::Csv(msg) => write!(f, "CSV error: {}", msg),
            RosterError::Balance(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for RosterError {}

impl From<BalanceError> for RosterError {
    fn from(e: BalanceError) -> Self {
        RosterError::Balance(e)
    }
}

impl From<csv::Error> for RosterError {
    fn from(e: csv::Error) -> Self {
        RosterError::Csv(e.to_string())
    }
}

/// Kind of link between two players.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    /// Must play on the same team.
    Must,
    /// Must never share a team.
    Avoid,
}

/// A stored player record (what the store keeps; the balancer only sees `Participant`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub id: PlayerId,
    pub name: String,
    pub position: Option<String>,
    pub skill: f64,
    pub must_with: Vec<PlayerId>,
    pub avoid_with: Vec<PlayerId>,
    /// Inactive players are kept on the roster but not balanced.
    pub active: bool,
}

impl PlayerRecord {
    /// Create an active player with no links.
    pub fn new(name: impl Into<String>, position: Option<String>, skill: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            position,
            skill,
            must_with: Vec::new(),
            avoid_with: Vec::new(),
            active: true,
        }
    }

    /// The balancer's view of this player.
    pub fn participant(&self) -> Participant {
        Participant {
            id: self.id,
            skill: self.skill,
            must_with: self.must_with.clone(),
            avoid_with: self.avoid_with.clone(),
        }
    }

    fn links_mut(&mut self, kind: LinkKind) -> &mut Vec<PlayerId> {
        match kind {
            LinkKind::Must => &mut self.must_with,
            LinkKind::Avoid => &mut self.avoid_with,
        }
    }

    fn links(&self, kind: LinkKind) -> &[PlayerId] {
        match kind {
            LinkKind::Must => &self.must_with,
            LinkKind::Avoid => &self.avoid_with,
        }
    }
}

fn validate_skill(skill: f64) -> Result<(), RosterError> {
    if skill.is_finite() && (MIN_SKILL..=MAX_SKILL).contains(&skill) {
        Ok(())
    } else {
        Err(RosterError::InvalidSkill(skill))
    }
}

/// Unique identifier for a roster.
pub type RosterId = Uuid;

/// A named roster of players plus the history of generated team sheets.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Roster {
    pub id: RosterId,
    pub name: String,
    pub players: Vec<PlayerRecord>,
    /// Past balancing runs, oldest first.
    pub history: Vec<TeamSheet>,
}

impl Roster {
    /// Create an empty roster.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            players: Vec::new(),
            history: Vec::new(),
        }
    }

    pub fn get_player(&self, id: PlayerId) -> Option<&PlayerRecord> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn get_player_mut(&mut self, id: PlayerId) -> Option<&mut PlayerRecord> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    /// Look up a player by name (case-insensitive, trimmed).
    pub fn find_by_name(&self, name: &str) -> Option<&PlayerRecord> {
        let name = name.trim();
        self.players.iter().find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Add a player. Names must be unique (case-insensitive); skill must be in range.
    pub fn add_player(
        &mut self,
        name: impl Into<String>,
        position: Option<String>,
        skill: f64,
    ) -> Result<PlayerId, RosterError> {
        let name = name.into();
        let name_trimmed = name.trim();
        if name_trimmed.is_empty() {
            return Err(RosterError::EmptyName);
        }
        if self.find_by_name(name_trimmed).is_some() {
            return Err(RosterError::DuplicatePlayerName);
        }
        validate_skill(skill)?;
        let position = position
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());
        let player = PlayerRecord::new(name_trimmed, position, skill);
        let id = player.id;
        self.players.push(player);
        Ok(id)
    }

    /// Remove a player and scrub them from everyone else's links.
    pub fn remove_player(&mut self, player_id: PlayerId) -> Result<(), RosterError> {
        let idx = self
            .players
            .iter()
            .position(|p| p.id == player_id)
            .ok_or(RosterError::PlayerNotFound(player_id))?;
        self.players.remove(idx);
        for p in &mut self.players {
            p.must_with.retain(|id| *id != player_id);
            p.avoid_with.retain(|id| *id != player_id);
        }
        Ok(())
    }

    pub fn set_skill(&mut self, player_id: PlayerId, skill: f64) -> Result<(), RosterError> {
        validate_skill(skill)?;
        self.get_player_mut(player_id)
            .ok_or(RosterError::PlayerNotFound(player_id))?
            .skill = skill;
        Ok(())
    }

    /// Mark a player as playing (or sitting out) the next balancing run.
    pub fn set_active(&mut self, player_id: PlayerId, active: bool) -> Result<(), RosterError> {
        self.get_player_mut(player_id)
            .ok_or(RosterError::PlayerNotFound(player_id))?
            .active = active;
        Ok(())
    }

    pub fn set_position(
        &mut self,
        player_id: PlayerId,
        position: Option<String>,
    ) -> Result<(), RosterError> {
        let position = position
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());
        self.get_player_mut(player_id)
            .ok_or(RosterError::PlayerNotFound(player_id))?
            .position = position;
        Ok(())
    }

    /// Link two players (stored on both records). Linking an already linked pair is a no-op.
    pub fn link(&mut self, a: PlayerId, b: PlayerId, kind: LinkKind) -> Result<(), RosterError> {
        if a == b {
            return Err(RosterError::SelfLink);
        }
        let opposite = match kind {
            LinkKind::Must => LinkKind::Avoid,
            LinkKind::Avoid => LinkKind::Must,
        };
        let pa = self.get_player(a).ok_or(RosterError::PlayerNotFound(a))?;
        let pb = self.get_player(b).ok_or(RosterError::PlayerNotFound(b))?;
        if pa.links(opposite).contains(&b) || pb.links(opposite).contains(&a) {
            return Err(RosterError::ConflictingLink);
        }
        for (from, to) in [(a, b), (b, a)] {
            if let Some(p) = self.get_player_mut(from) {
                let links = p.links_mut(kind);
                if !links.contains(&to) {
                    links.push(to);
                }
            }
        }
        Ok(())
    }

    pub fn link_must(&mut self, a: PlayerId, b: PlayerId) -> Result<(), RosterError> {
        self.link(a, b, LinkKind::Must)
    }

    pub fn link_avoid(&mut self, a: PlayerId, b: PlayerId) -> Result<(), RosterError> {
        self.link(a, b, LinkKind::Avoid)
    }

    /// Remove every link between `a` and `b`, both kinds and both directions.
    pub fn unlink(&mut self, a: PlayerId, b: PlayerId) -> Result<(), RosterError> {
        if self.get_player(a).is_none() {
            return Err(RosterError::PlayerNotFound(a));
        }
        if self.get_player(b).is_none() {
            return Err(RosterError::PlayerNotFound(b));
        }
        for (from, to) in [(a, b), (b, a)] {
            if let Some(p) = self.get_player_mut(from) {
                p.must_with.retain(|id| *id != to);
                p.avoid_with.retain(|id| *id != to);
            }
        }
        Ok(())
    }

    /// Active players as balancer input, in roster order.
    pub fn participants(&self) -> Vec<Participant> {
        self.players
            .iter()
            .filter(|p| p.active)
            .map(PlayerRecord::participant)
            .collect()
    }

    pub fn get_sheet(&self, sheet_id: Uuid) -> Option<&TeamSheet> {
        self.history.iter().find(|s| s.id == sheet_id)
    }

    /// Like [`Roster::get_sheet`], but a missing sheet is `SheetNotFound`.
    pub fn sheet(&self, sheet_id: Uuid) -> Result<&TeamSheet, RosterError> {
        self.get_sheet(sheet_id)
            .ok_or(RosterError::SheetNotFound(sheet_id))
    }
}
