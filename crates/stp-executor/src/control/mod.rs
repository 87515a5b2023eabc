mod player_input;
mod team_controller;

pub use player_input::*;
pub use team_controller::{CycleOutput, TacticId, TeamController};
