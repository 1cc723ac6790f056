//! Data structures for the balancer: participants, teams, rosters, saved team sheets.

mod participant;
mod roster;
mod sheet;
mod team;

pub use participant::{Participant, PlayerId};
pub use roster::{LinkKind, PlayerRecord, Roster, RosterError, RosterId, MAX_SKILL, MIN_SKILL};
pub use sheet::{SheetMember, SheetTeam, TeamSheet};
pub use team::{BalanceError, Team, AVOID_RULE_BROKEN, NO_TEAMS, OVERSIZED_UNIT, SIZE_RULE_BROKEN};
