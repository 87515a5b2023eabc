//! Role assignment and skill execution for a team of players.
//!
//! Every cycle the [`TeamController`] collects role requests from the active
//! [`tactics::Tactic`]s, assigns players with the [`roles::RoleAssigner`], and
//! steps the skills the tactics select. The result is one [`PlayerControlInput`]
//! per executing player.

pub mod control;
pub mod roles;
pub mod skills;
pub mod tactics;

pub use control::{
    CycleOutput, KickerControlInput, PlayerControlInput, PlayerInputs, TacticId, TeamController,
};
