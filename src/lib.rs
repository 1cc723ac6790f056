//! Team balancer web app: library with models and balancing logic.

pub mod logic;
pub mod models;

pub use logic::{
    balance, balance_with, export_team_sheet_csv, generate_teams, import_players_csv,
    BalanceConfig,
};
pub use models::{
    BalanceError, LinkKind, Participant, PlayerId, PlayerRecord, Roster, RosterError, RosterId,
    SheetMember, SheetTeam, Team, TeamSheet, AVOID_RULE_BROKEN, MAX_SKILL, MIN_SKILL, NO_TEAMS,
    OVERSIZED_UNIT, SIZE_RULE_BROKEN,
};
