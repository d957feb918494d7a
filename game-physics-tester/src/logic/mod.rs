pub mod reports;
pub mod scenarios;
pub mod seeds;
pub mod tester;

pub use scenarios::{Scenario, parse_scenarios};
pub use seeds::{resolve_games, resolve_seed_inputs, split_csv};
pub use tester::*;
