use std::sync::Arc;

use stp_core::{ExecutorSettings, WorldData};

use super::{SkillEntry, SkillEntryId, Tactic};
use crate::{
    roles::{CaptureCost, CostFn, Priority, RoleRequest, RoleRequests, RoleResults},
    skills::{Capture, Skill},
};

/// Gets the ball with whichever player can reach it first.
pub struct CaptureTactic {
    capture: SkillEntry,
    cost: Arc<dyn CostFn>,
}

impl CaptureTactic {
    pub fn new(settings: &ExecutorSettings) -> Self {
        Self {
            capture: SkillEntry::new(Skill::Capture(Capture::new(&settings.capture))),
            cost: Arc::new(CaptureCost::new(
                settings.capture.clone(),
                settings.motion.clone(),
            )),
        }
    }

    pub fn capture_entry(&self) -> SkillEntryId {
        self.capture.id()
    }
}

impl Tactic for CaptureTactic {
    fn name(&self) -> &str {
        "capture"
    }

    fn get_requests(&self, _world: &WorldData) -> RoleRequests {
        let mut requests = RoleRequests::new();
        requests.insert(
            self.capture.id(),
            vec![RoleRequest::shared(Priority::High, true, self.cost.clone())],
        );
        requests
    }

    fn tick(&mut self, results: &RoleResults, _world: &WorldData) -> Vec<SkillEntryId> {
        match results.primary_player(self.capture.id()) {
            Some(_) => vec![self.capture.id()],
            None => Vec::new(),
        }
    }

    fn is_done(&self, _world: &WorldData) -> bool {
        self.capture.skill().is_done()
    }

    fn entry_mut(&mut self, id: SkillEntryId) -> Option<&mut SkillEntry> {
        (id == self.capture.id()).then_some(&mut self.capture)
    }
}

#[cfg(test)]
mod tests {
    use stp_core::{BallData, PlayerData, PlayerId, Vector2};

    use super::*;
    use crate::roles::RoleAssigner;

    #[test]
    fn closest_player_captures_slow_ball() {
        let settings = ExecutorSettings::default();
        let mut tactic = CaptureTactic::new(&settings);
        let world = WorldData {
            own_players: vec![
                PlayerData::new(PlayerId::new(0)).with_position(Vector2::new(3000.0, 0.0)),
                PlayerData::new(PlayerId::new(1)).with_position(Vector2::new(500.0, 0.0)),
            ],
            ball: Some(BallData::new(Vector2::zeros(), Vector2::zeros())),
            ..Default::default()
        };

        let requests = tactic.get_requests(&world);
        let assignment =
            RoleAssigner::new(settings.assignment.clone()).assign(requests.iter(), &world);
        assert_eq!(
            assignment.results.primary_player(tactic.capture_entry()),
            Some(PlayerId::new(1))
        );
        assert_eq!(
            tactic.tick(&assignment.results, &world),
            vec![tactic.capture_entry()]
        );
        assert!(!tactic.is_done(&world));
    }

    #[test]
    fn unknown_entry_is_not_found() {
        let settings = ExecutorSettings::default();
        let mut tactic = CaptureTactic::new(&settings);
        assert!(tactic.entry_mut(SkillEntryId::next()).is_none());
        let id = tactic.capture_entry();
        assert!(tactic.entry_mut(id).is_some());
    }
}
