mod capture;
mod pass;

pub use capture::CaptureTactic;
pub use pass::PassTactic;

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use stp_core::WorldData;

use crate::{
    roles::{RoleRequests, RoleResults},
    skills::Skill,
};

static NEXT_ENTRY_ID: AtomicU64 = AtomicU64::new(0);

/// Stable identity of a skill entry, unique for the lifetime of the process.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SkillEntryId(u64);

impl SkillEntryId {
    /// Allocate a fresh id.
    pub fn next() -> Self {
        SkillEntryId(NEXT_ENTRY_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for SkillEntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "entry{}", self.0)
    }
}

/// A skill together with the identity a tactic uses to tie it to its role results.
#[derive(Debug)]
pub struct SkillEntry {
    id: SkillEntryId,
    skill: Skill,
}

impl SkillEntry {
    pub fn new(skill: Skill) -> Self {
        Self {
            id: SkillEntryId::next(),
            skill,
        }
    }

    pub fn id(&self) -> SkillEntryId {
        self.id
    }

    pub fn skill(&self) -> &Skill {
        &self.skill
    }

    pub fn skill_mut(&mut self) -> &mut Skill {
        &mut self.skill
    }
}

/// A strategy unit that asks for players and decides which of its skills run.
///
/// Each cycle the controller calls [`Tactic::get_requests`], assigns players for
/// all tactics at once, then calls [`Tactic::tick`] with the results. Only the
/// entries returned by `tick` are stepped in that cycle.
///
/// A tactic keeps no state between cycles besides what its skills hold.
pub trait Tactic: Send {
    fn name(&self) -> &str;

    /// Role requests for this cycle, keyed by skill entry. Must not change the
    /// tactic.
    fn get_requests(&self, world: &WorldData) -> RoleRequests;

    /// Pick the entries to execute this cycle, in execution order.
    ///
    /// An entry may only be returned if its primary role is filled.
    fn tick(&mut self, results: &RoleResults, world: &WorldData) -> Vec<SkillEntryId>;

    fn is_done(&self, world: &WorldData) -> bool;

    fn entry_mut(&mut self, id: SkillEntryId) -> Option<&mut SkillEntry>;
}
