mod capture;
mod collect;
mod pivot_kick;
mod receive;
mod settle;

pub use capture::{Capture, CaptureObservation, CaptureState, CaptureTransition};
pub use collect::Collect;
pub use pivot_kick::{PivotKick, PivotKickPhase};
pub use receive::Receive;
pub use settle::Settle;

use stp_core::{ExecutorSettings, PlayerData, WorldData};

use crate::control::PlayerControlInput;

/// Executable behaviour bound to a filled role.
#[derive(Debug)]
pub enum Skill {
    Capture(Capture),
    Settle(Settle),
    Collect(Collect),
    PivotKick(PivotKick),
    Receive(Receive),
}

impl Skill {
    /// Advance the skill by one cycle.
    pub fn update(&mut self, ctx: SkillCtx<'_>) -> SkillProgress {
        match self {
            Skill::Capture(skill) => skill.update(ctx),
            Skill::Settle(skill) => skill.update(ctx),
            Skill::Collect(skill) => skill.update(ctx),
            Skill::PivotKick(skill) => skill.update(ctx),
            Skill::Receive(skill) => skill.update(ctx),
        }
    }

    /// Whether the skill has reached its terminal state.
    pub fn is_done(&self) -> bool {
        match self {
            Skill::Capture(skill) => skill.is_done(),
            Skill::Settle(_) => false,
            Skill::Collect(skill) => skill.is_done(),
            Skill::PivotKick(skill) => skill.is_done(),
            Skill::Receive(skill) => skill.is_done(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Skill::Capture(_) => "capture",
            Skill::Settle(_) => "settle",
            Skill::Collect(_) => "collect",
            Skill::PivotKick(_) => "pivot_kick",
            Skill::Receive(_) => "receive",
        }
    }

    pub fn as_pivot_kick(&self) -> Option<&PivotKick> {
        match self {
            Skill::PivotKick(skill) => Some(skill),
            _ => None,
        }
    }

    pub fn as_pivot_kick_mut(&mut self) -> Option<&mut PivotKick> {
        match self {
            Skill::PivotKick(skill) => Some(skill),
            _ => None,
        }
    }
}

#[derive(Clone, Copy)]
pub struct SkillCtx<'a> {
    /// The player bound to the skill's role
    pub player: &'a PlayerData,
    pub world: &'a WorldData,
    pub settings: &'a ExecutorSettings,
}

/// The result of a skill execution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkillResult {
    Success,
    Failure,
}

/// The progress of a skill execution
#[derive(Debug, PartialEq)]
pub enum SkillProgress {
    Continue(PlayerControlInput),
    Done(SkillResult),
}

impl SkillProgress {
    /// Creates a new `SkillProgress` with a `Success` result
    pub fn success() -> SkillProgress {
        SkillProgress::Done(SkillResult::Success)
    }
}
