use std::sync::Arc;

use stp_core::{CaptureSettings, PlayerId, Vector2, WorldData};

use super::{SkillEntry, SkillEntryId, Tactic};
use crate::{
    roles::{CostFn, PasserCost, Priority, ReceiverCost, RoleRequest, RoleRequests, RoleResults},
    skills::{PivotKick, Receive, Skill},
};

/// Kick speed of a pass, in mm/s.
pub const DEFAULT_PASS_SPEED: f64 = 4000.0;

/// Captures the ball with one player and passes it to another.
///
/// The receiver only starts moving once the passer is aimed, so that it does not
/// give away where the pass is going.
pub struct PassTactic {
    passer: SkillEntry,
    receiver: SkillEntry,
    passer_cost: Arc<dyn CostFn>,
    receiver_cost: Arc<dyn CostFn>,
}

impl PassTactic {
    pub fn new(
        settings: &CaptureSettings,
        passer: Option<PlayerId>,
        receiver: Option<PlayerId>,
        kick_speed: f64,
    ) -> Self {
        Self {
            passer: SkillEntry::new(Skill::PivotKick(PivotKick::new(
                Vector2::zeros(),
                kick_speed,
                settings,
            ))),
            receiver: SkillEntry::new(Skill::Receive(Receive::new(settings))),
            passer_cost: Arc::new(PasserCost::new(passer)),
            receiver_cost: Arc::new(ReceiverCost::new(receiver)),
        }
    }

    pub fn passer_entry(&self) -> SkillEntryId {
        self.passer.id()
    }

    pub fn receiver_entry(&self) -> SkillEntryId {
        self.receiver.id()
    }
}

impl Tactic for PassTactic {
    fn name(&self) -> &str {
        "pass"
    }

    fn get_requests(&self, _world: &WorldData) -> RoleRequests {
        let mut requests = RoleRequests::new();
        requests.insert(
            self.passer.id(),
            vec![RoleRequest::shared(
                Priority::High,
                true,
                self.passer_cost.clone(),
            )],
        );
        requests.insert(
            self.receiver.id(),
            vec![RoleRequest::shared(
                Priority::High,
                true,
                self.receiver_cost.clone(),
            )],
        );
        requests
    }

    fn tick(&mut self, results: &RoleResults, world: &WorldData) -> Vec<SkillEntryId> {
        let passer = results.primary_player(self.passer.id());
        let receiver = results.primary_player(self.receiver.id());

        match (passer, receiver) {
            (Some(_), Some(receiver)) => {
                let pivot = self.passer.skill_mut().as_pivot_kick_mut();
                let receiver_pos = world.get_player(receiver).map(|p| p.position);
                if let (Some(pivot), Some(target)) = (pivot, receiver_pos) {
                    pivot.set_target(target);
                }

                let ready = self
                    .passer
                    .skill()
                    .as_pivot_kick()
                    .map_or(false, PivotKick::is_ready);
                if ready {
                    vec![self.passer.id(), self.receiver.id()]
                } else {
                    vec![self.passer.id()]
                }
            }
            (Some(_), None) => vec![self.passer.id()],
            _ => Vec::new(),
        }
    }

    fn is_done(&self, _world: &WorldData) -> bool {
        self.receiver.skill().is_done()
    }

    fn entry_mut(&mut self, id: SkillEntryId) -> Option<&mut SkillEntry> {
        if id == self.passer.id() {
            Some(&mut self.passer)
        } else if id == self.receiver.id() {
            Some(&mut self.receiver)
        } else {
            None
        }
    }
}
