use serde::Serialize;
use stp_core::{ExecutorSettings, PlayerId, WorldData};

use super::player_input::PlayerInputs;
use crate::{
    roles::{RoleAssigner, RoleRequests, RoleResults, Shortfall},
    skills::{SkillCtx, SkillProgress},
    tactics::{SkillEntryId, Tactic},
};

/// Handle of a tactic registered with a [`TeamController`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct TacticId(u32);

impl std::fmt::Display for TacticId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "tactic{}", self.0)
    }
}

/// Everything produced in one control cycle.
#[derive(Debug, Default, Serialize)]
pub struct CycleOutput {
    /// At most one input per player
    pub inputs: PlayerInputs,
    pub results: RoleResults,
    /// Required requests that could not be filled
    pub shortfalls: Vec<Shortfall>,
    /// Entries that were stepped this cycle, in execution order
    pub executed: Vec<(TacticId, SkillEntryId, PlayerId)>,
    /// Tactics reporting done at the end of the cycle
    pub done: Vec<TacticId>,
}

/// Runs the active tactics against one shared pool of players.
pub struct TeamController {
    settings: ExecutorSettings,
    assigner: RoleAssigner,
    tactics: Vec<(TacticId, Box<dyn Tactic>)>,
    next_tactic_id: u32,
}

impl TeamController {
    pub fn new(settings: ExecutorSettings) -> Self {
        Self {
            assigner: RoleAssigner::new(settings.assignment.clone()),
            settings,
            tactics: Vec::new(),
            next_tactic_id: 0,
        }
    }

    pub fn settings(&self) -> &ExecutorSettings {
        &self.settings
    }

    pub fn update_settings(&mut self, settings: ExecutorSettings) {
        self.assigner.update_settings(settings.assignment.clone());
        self.settings = settings;
    }

    /// Register a tactic. Tactics added earlier submit their requests earlier and
    /// win ties in the assignment.
    pub fn add_tactic(&mut self, tactic: Box<dyn Tactic>) -> TacticId {
        let id = TacticId(self.next_tactic_id);
        self.next_tactic_id += 1;
        log::info!("Adding tactic {} ({})", tactic.name(), id);
        self.tactics.push((id, tactic));
        id
    }

    /// Drop a tactic together with its skills. Running skills are discarded
    /// without completing.
    pub fn remove_tactic(&mut self, id: TacticId) -> Option<Box<dyn Tactic>> {
        let index = self.tactics.iter().position(|(tid, _)| *tid == id)?;
        let (_, tactic) = self.tactics.remove(index);
        log::info!("Removed tactic {} ({})", tactic.name(), id);
        Some(tactic)
    }

    pub fn tactic_ids(&self) -> impl Iterator<Item = TacticId> + '_ {
        self.tactics.iter().map(|(id, _)| *id)
    }

    pub fn tactic(&self, id: TacticId) -> Option<&dyn Tactic> {
        self.tactics
            .iter()
            .find(|(tid, _)| *tid == id)
            .map(|(_, tactic)| tactic.as_ref())
    }

    /// Run one control cycle.
    ///
    /// 1. Collect the role requests of every tactic, in registration order.
    /// 2. Assign all requests at once.
    /// 3. Let each tactic pick the entries to run.
    /// 4. Step each picked entry once with the player filling its primary role.
    /// 5. Report the tactics that are done.
    pub fn update(&mut self, world: &WorldData) -> CycleOutput {
        let requests: Vec<RoleRequests> = self
            .tactics
            .iter()
            .map(|(_, tactic)| tactic.get_requests(world))
            .collect();

        let assignment = self
            .assigner
            .assign(requests.iter().flat_map(|r| r.iter()), world);

        let mut inputs = PlayerInputs::new();
        let mut executed = Vec::new();
        for (tactic_id, tactic) in self.tactics.iter_mut() {
            for entry_id in tactic.tick(&assignment.results, world) {
                let Some(player_id) = assignment.results.primary_player(entry_id) else {
                    log::error!(
                        "Tactic {} selected {} without a filled role",
                        tactic.name(),
                        entry_id
                    );
                    continue;
                };
                if inputs.contains(player_id) {
                    log::error!("Player {} already has an input this cycle", player_id);
                    continue;
                }
                let Some(player) = world.get_player(player_id) else {
                    continue;
                };
                let Some(entry) = tactic.entry_mut(entry_id) else {
                    log::error!("Tactic {} has no entry {}", tactic.name(), entry_id);
                    continue;
                };

                let progress = entry.skill_mut().update(SkillCtx {
                    player,
                    world,
                    settings: &self.settings,
                });
                if let SkillProgress::Continue(input) = progress {
                    inputs.insert(player_id, input);
                }
                executed.push((*tactic_id, entry_id, player_id));
            }
        }

        let done = self
            .tactics
            .iter()
            .filter(|(_, tactic)| tactic.is_done(world))
            .map(|(id, _)| *id)
            .collect();

        CycleOutput {
            inputs,
            results: assignment.results,
            shortfalls: assignment.shortfalls,
            executed,
            done,
        }
    }
}
