//! CSV roster import and team sheet export.
//!
//! Import header: `name,position,skill,active,must_with,avoid_with`. Only `name`
//! and `skill` are required. The link columns hold `;`-separated player names,
//! which may refer to rows later in the file or to players already on the roster.

use crate::models::{Roster, RosterError, TeamSheet};
use csv::{ReaderBuilder, Trim, WriterBuilder};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

#[derive(Debug, Deserialize)]
struct PlayerRow {
    name: String,
    #[serde(default)]
    position: Option<String>,
    skill: f64,
    #[serde(default)]
    active: Option<bool>,
    #[serde(default)]
    must_with: Option<String>,
    #[serde(default)]
    avoid_with: Option<String>,
}

#[derive(Debug, Serialize)]
struct SheetRow<'a> {
    team: &'a str,
    name: &'a str,
    position: Option<&'a str>,
    skill: f64,
}

fn split_names(field: &Option<String>) -> Vec<String> {
    field
        .as_deref()
        .unwrap_or("")
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Add every row of `reader` to `roster`, then resolve link columns by name.
/// All or nothing: on any error the roster is unchanged. Returns the number of players added.
pub fn import_players_csv<R: Read>(roster: &mut Roster, reader: R) -> Result<usize, RosterError> {
    let mut rdr = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    let mut staged = roster.clone();
    let mut links: Vec<(String, Vec<String>, Vec<String>)> = Vec::new();

    for result in rdr.deserialize() {
        let row: PlayerRow = result?;
        let id = staged.add_player(row.name.as_str(), row.position, row.skill)?;
        if row.active == Some(false) {
            staged.set_active(id, false)?;
        }
        links.push((row.name, split_names(&row.must_with), split_names(&row.avoid_with)));
    }

    for (name, must, avoid) in &links {
        let id = staged
            .find_by_name(name)
            .map(|p| p.id)
            .ok_or_else(|| RosterError::UnknownPlayerName(name.clone()))?;
        for other in must {
            let other_id = staged
                .find_by_name(other)
                .map(|p| p.id)
                .ok_or_else(|| RosterError::UnknownPlayerName(other.clone()))?;
            staged.link_must(id, other_id)?;
        }
        for other in avoid {
            let other_id = staged
                .find_by_name(other)
                .map(|p| p.id)
                .ok_or_else(|| RosterError::UnknownPlayerName(other.clone()))?;
            staged.link_avoid(id, other_id)?;
        }
    }

    let added = links.len();
    *roster = staged;
    log::info!("Imported {} player(s) into roster {}", added, roster.id);
    Ok(added)
}

/// Write `sheet` as `team,name,position,skill` rows.
pub fn export_team_sheet_csv<W: Write>(sheet: &TeamSheet, writer: W) -> Result<(), RosterError> {
    let mut wtr = WriterBuilder::new().from_writer(writer);
    for team in &sheet.teams {
        for m in &team.members {
            wtr.serialize(SheetRow {
                team: &team.name,
                name: &m.name,
                position: m.position.as_deref(),
                skill: m.skill,
            })?;
        }
    }
    wtr.flush().map_err(|e| RosterError::Csv(e.to_string()))?;
    Ok(())
}
