//! Team generation for a stored roster: balance the active players and keep a team sheet.

use crate::logic::balance::{balance_with, BalanceConfig};
use crate::models::{Roster, RosterError, TeamSheet};
use rand::Rng;

/// Balance the roster's active players into `team_count` teams and append the
/// result to `roster.history`. The roster is left untouched on error.
pub fn generate_teams<R: Rng + ?Sized>(
    roster: &mut Roster,
    team_count: usize,
    config: &BalanceConfig,
    rng: &mut R,
) -> Result<TeamSheet, RosterError> {
    if team_count == 0 {
        return Err(RosterError::InvalidTeamCount);
    }
    let participants = roster.participants();
    let teams = balance_with(&participants, team_count, config, rng)?;
    let sheet = TeamSheet::from_teams(&teams, &roster.players);
    log::info!(
        "Roster {}: {} player(s) into {} team(s), skill spread {:.2}",
        roster.id,
        participants.len(),
        team_count,
        sheet.skill_spread
    );
    roster.history.push(sheet.clone());
    Ok(sheet)
}
