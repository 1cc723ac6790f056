//! Balancer logic: grouping, assignment, refinement, plus roster-level helpers.

mod assignment;
mod balance;
mod constraints;
mod csv_io;
mod grouping;
mod refinement;
mod sheets;

pub use balance::{balance, balance_with, BalanceConfig};
pub use csv_io::{export_team_sheet_csv, import_players_csv};
pub use sheets::generate_teams;
