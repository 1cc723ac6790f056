//! TeamSheet: a saved balancing run, readable without the roster.

use crate::models::participant::PlayerId;
use crate::models::roster::PlayerRecord;
use crate::models::team::Team;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One player line on a team sheet.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SheetMember {
    pub id: PlayerId,
    pub name: String,
    pub position: Option<String>,
    pub skill: f64,
}

/// One team on a team sheet.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SheetTeam {
    pub name: String,
    pub members: Vec<SheetMember>,
    pub skill_sum: f64,
    pub size: usize,
}

/// Snapshot of one balancing run, keyed by id and creation time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TeamSheet {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub team_count: usize,
    pub teams: Vec<SheetTeam>,
    /// Highest minus lowest team skill sum.
    pub skill_spread: f64,
}

impl TeamSheet {
    /// Snapshot `teams`, copying names and positions from `players`.
    pub fn from_teams(teams: &[Team], players: &[PlayerRecord]) -> Self {
        let sheet_teams: Vec<SheetTeam> = teams
            .iter()
            .map(|t| SheetTeam {
                name: t.name.clone(),
                members: t
                    .members
                    .iter()
                    .map(|m| {
                        let record = players.iter().find(|p| p.id == m.id);
                        SheetMember {
                            id: m.id,
                            name: record.map(|r| r.name.clone()).unwrap_or_default(),
                            position: record.and_then(|r| r.position.clone()),
                            skill: m.skill,
                        }
                    })
                    .collect(),
                skill_sum: t.skill_sum,
                size: t.size,
            })
            .collect();
        let max = sheet_teams.iter().map(|t| t.skill_sum).fold(f64::MIN, f64::max);
        let min = sheet_teams.iter().map(|t| t.skill_sum).fold(f64::MAX, f64::min);
        let skill_spread = if sheet_teams.is_empty() { 0.0 } else { max - min };
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            team_count: teams.len(),
            teams: sheet_teams,
            skill_spread,
        }
    }
}
