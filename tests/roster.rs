//! Integration tests for the roster store, team generation, and CSV import/export.

use rand::rngs::StdRng;
use rand::SeedableRng;
use team_balancer_web::{
    export_team_sheet_csv, generate_teams, import_players_csv, BalanceConfig, BalanceError,
    LinkKind, Roster, RosterError, OVERSIZED_UNIT,
};

fn roster_with_players(skills: &[f64]) -> Roster {
    let mut r = Roster::new("Tuesday");
    for (i, &s) in skills.iter().enumerate() {
        r.add_player(format!("P{i}"), None, s).unwrap();
    }
    r
}

fn rng() -> StdRng {
    StdRng::seed_from_u64(5)
}

#[test]
fn add_player_rejects_duplicates_and_bad_skill() {
    let mut r = Roster::new("R");
    r.add_player("Alice", Some("Keeper".into()), 7.0).unwrap();
    assert_eq!(
        r.add_player("  alice ", None, 5.0),
        Err(RosterError::DuplicatePlayerName)
    );
    assert_eq!(r.add_player("   ", None, 5.0), Err(RosterError::EmptyName));
    assert_eq!(r.add_player("Bob", None, 11.0), Err(RosterError::InvalidSkill(11.0)));
    assert!(matches!(
        r.add_player("Bob", None, f64::NAN),
        Err(RosterError::InvalidSkill(_))
    ));
    assert_eq!(r.players.len(), 1);
    assert_eq!(r.players[0].position.as_deref(), Some("Keeper"));
}

#[test]
fn links_are_stored_on_both_players() {
    let mut r = roster_with_players(&[5.0, 6.0, 7.0]);
    let (a, b, c) = (r.players[0].id, r.players[1].id, r.players[2].id);
    r.link_must(a, b).unwrap();
    r.link_must(b, a).unwrap();
    r.link_avoid(a, c).unwrap();
    assert_eq!(r.get_player(a).unwrap().must_with, vec![b]);
    assert_eq!(r.get_player(b).unwrap().must_with, vec![a]);
    assert_eq!(r.get_player(c).unwrap().avoid_with, vec![a]);

    assert_eq!(r.link(a, a, LinkKind::Must), Err(RosterError::SelfLink));
    assert_eq!(r.link_avoid(b, a), Err(RosterError::ConflictingLink));

    r.unlink(a, b).unwrap();
    assert!(r.get_player(a).unwrap().must_with.is_empty());
    assert!(r.get_player(b).unwrap().must_with.is_empty());
}

#[test]
fn remove_player_scrubs_links() {
    let mut r = roster_with_players(&[5.0, 6.0]);
    let (a, b) = (r.players[0].id, r.players[1].id);
    r.link_avoid(a, b).unwrap();
    r.remove_player(b).unwrap();
    assert!(r.get_player(a).unwrap().avoid_with.is_empty());
    assert_eq!(r.remove_player(b), Err(RosterError::PlayerNotFound(b)));
}

#[test]
fn inactive_players_are_not_balanced() {
    let mut r = roster_with_players(&[9.0, 8.0, 7.0, 6.0, 5.0]);
    let sitting = r.players[4].id;
    r.set_active(sitting, false).unwrap();
    assert_eq!(r.participants().len(), 4);

    let sheet = generate_teams(&mut r, 2, &BalanceConfig::deterministic(), &mut rng()).unwrap();
    assert_eq!(sheet.team_count, 2);
    assert!(sheet
        .teams
        .iter()
        .all(|t| t.size == 2 && t.members.iter().all(|m| m.id != sitting)));
    assert_eq!(sheet.teams[0].skill_sum, 15.0);
    assert_eq!(sheet.teams[1].skill_sum, 15.0);
    assert_eq!(sheet.skill_spread, 0.0);
}

#[test]
fn generate_teams_records_history_with_names() {
    let mut r = roster_with_players(&[9.0, 8.0, 7.0, 6.0]);
    let first = generate_teams(&mut r, 2, &BalanceConfig::default(), &mut rng()).unwrap();
    generate_teams(&mut r, 2, &BalanceConfig::default(), &mut rng()).unwrap();
    assert_eq!(r.history.len(), 2);
    assert_eq!(r.get_sheet(first.id), Some(&first));
    assert_eq!(r.sheet(first.id), Ok(&first));
    let missing = uuid::Uuid::new_v4();
    assert_eq!(r.sheet(missing), Err(RosterError::SheetNotFound(missing)));
    let names: Vec<&str> = first
        .teams
        .iter()
        .flat_map(|t| t.members.iter().map(|m| m.name.as_str()))
        .collect();
    assert_eq!(names.len(), 4);
    assert!(names.iter().all(|n| n.starts_with('P')));
}

#[test]
fn generate_teams_errors_leave_history_untouched() {
    let mut r = roster_with_players(&[5.0, 5.0, 5.0, 5.0]);
    let (a, b, c) = (r.players[0].id, r.players[1].id, r.players[2].id);
    r.link_must(a, b).unwrap();
    r.link_must(b, c).unwrap();

    let err = generate_teams(&mut r, 2, &BalanceConfig::default(), &mut rng()).unwrap_err();
    assert_eq!(
        err,
        RosterError::Balance(BalanceError::ConstraintViolation(OVERSIZED_UNIT.to_string()))
    );
    assert_eq!(
        generate_teams(&mut r, 0, &BalanceConfig::default(), &mut rng()),
        Err(RosterError::InvalidTeamCount)
    );
    assert!(r.history.is_empty());
}

#[test]
fn csv_import_resolves_links_by_name() {
    let csv = "\
name,position,skill,active,must_with,avoid_with
Ann,Forward,8,true,Ben,
Ben,Back,4,,,Cat
Cat,,6,false,,
Dan,Keeper,5,true,,Ann
";
    let mut r = Roster::new("Imported");
    let added = import_players_csv(&mut r, csv.as_bytes()).unwrap();
    assert_eq!(added, 4);

    let ann = r.find_by_name("ann").unwrap().clone();
    let ben = r.find_by_name("Ben").unwrap().clone();
    let cat = r.find_by_name("Cat").unwrap().clone();
    let dan = r.find_by_name("Dan").unwrap().clone();
    assert_eq!(ann.position.as_deref(), Some("Forward"));
    assert_eq!(cat.position, None);
    assert!(ben.active);
    assert!(!cat.active);
    assert_eq!(ann.must_with, vec![ben.id]);
    assert_eq!(ben.must_with, vec![ann.id]);
    assert_eq!(ben.avoid_with, vec![cat.id]);
    assert_eq!(dan.avoid_with, vec![ann.id]);
}

#[test]
fn csv_import_with_minimal_columns() {
    let csv = "name,skill\nEve,3\nFay,9\n";
    let mut r = Roster::new("Minimal");
    assert_eq!(import_players_csv(&mut r, csv.as_bytes()).unwrap(), 2);
    assert!(r.players.iter().all(|p| p.active && p.position.is_none()));
}

#[test]
fn csv_import_is_all_or_nothing() {
    let mut r = roster_with_players(&[5.0]);
    let csv = "name,skill,must_with\nGus,5,Nobody\n";
    assert_eq!(
        import_players_csv(&mut r, csv.as_bytes()),
        Err(RosterError::UnknownPlayerName("Nobody".to_string()))
    );
    assert_eq!(r.players.len(), 1);

    let bad_skill = "name,skill\nHal,lots\n";
    assert!(matches!(
        import_players_csv(&mut r, bad_skill.as_bytes()),
        Err(RosterError::Csv(_))
    ));
    assert_eq!(r.players.len(), 1);
}

#[test]
fn team_sheet_exports_as_csv() {
    let mut r = Roster::new("Export");
    r.add_player("Ivy", Some("Wing".into()), 7.0).unwrap();
    r.add_player("Jon", None, 3.0).unwrap();
    let sheet = generate_teams(&mut r, 2, &BalanceConfig::deterministic(), &mut rng()).unwrap();

    let mut out = Vec::new();
    export_team_sheet_csv(&sheet, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "team,name,position,skill");
    assert_eq!(lines[1], "Team 1,Ivy,Wing,7.0");
    assert_eq!(lines[2], "Team 2,Jon,,3.0");
}
