mod cost;
mod role_assignment;

pub use cost::*;
pub use role_assignment::*;

use std::sync::Arc;

use serde::Serialize;
use stp_core::{PlayerData, PlayerId, WorldData};

use crate::tactics::SkillEntryId;

/// Order in which role requests are resolved. Higher tiers are resolved first and
/// take their players out of the pool for lower tiers. Priority never scales cost.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Priority {
    Low,
    Medium,
    High,
}

/// Scores how well a player fits a role. Lower is better.
///
/// Implementations must be pure: the same inputs always give the same score. The
/// `previous` result is the result of the same request in the last cycle (if any)
/// and is the place to add hysteresis, e.g. by favouring the player that already
/// holds the role.
///
/// Returning a non-finite value (or one beyond the assigner's `max_cost`) excludes
/// the player from the request.
pub trait CostFn: Send + Sync {
    fn cost(&self, player: &PlayerData, previous: Option<&RoleResult>, world: &WorldData) -> f64;
}

impl<F> CostFn for F
where
    F: Fn(&PlayerData, Option<&RoleResult>, &WorldData) -> f64 + Send + Sync,
{
    fn cost(&self, player: &PlayerData, previous: Option<&RoleResult>, world: &WorldData) -> f64 {
        self(player, previous, world)
    }
}

/// A request for one player to fill a role.
#[derive(Clone)]
pub struct RoleRequest {
    pub priority: Priority,
    /// If set, leaving the request unfilled is reported as a shortfall.
    pub required: bool,
    pub cost: Arc<dyn CostFn>,
}

impl RoleRequest {
    pub fn new(priority: Priority, required: bool, cost: impl CostFn + 'static) -> Self {
        Self {
            priority,
            required,
            cost: Arc::new(cost),
        }
    }

    /// Create a request from a cost function that is shared between cycles.
    pub fn shared(priority: Priority, required: bool, cost: Arc<dyn CostFn>) -> Self {
        Self {
            priority,
            required,
            cost,
        }
    }
}

impl std::fmt::Debug for RoleRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "RoleRequest {{ priority: {:?}, required: {} }}",
            self.priority, self.required
        )
    }
}

/// Identifies a single request across cycles: the `index`-th request of a skill entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RoleKey {
    pub entry: SkillEntryId,
    pub index: usize,
}

/// The outcome of one role request in one cycle.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RoleResult {
    pub key: RoleKey,
    pub priority: Priority,
    pub required: bool,
    /// The player that fills the role, if any.
    pub player: Option<PlayerId>,
}

impl RoleResult {
    pub fn is_filled(&self) -> bool {
        self.player.is_some()
    }
}

/// Role requests of one tactic, keyed by skill entry, in submission order.
#[derive(Clone, Debug, Default)]
pub struct RoleRequests {
    entries: Vec<(SkillEntryId, Vec<RoleRequest>)>,
}

impl RoleRequests {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the requests for an entry. Re-inserting an entry replaces its requests but
    /// keeps its original position.
    pub fn insert(&mut self, entry: SkillEntryId, requests: Vec<RoleRequest>) {
        if let Some((_, existing)) = self.entries.iter_mut().find(|(id, _)| *id == entry) {
            *existing = requests;
        } else {
            self.entries.push((entry, requests));
        }
    }

    pub fn get(&self, entry: SkillEntryId) -> Option<&[RoleRequest]> {
        self.entries
            .iter()
            .find(|(id, _)| *id == entry)
            .map(|(_, requests)| requests.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (SkillEntryId, &[RoleRequest])> {
        self.entries
            .iter()
            .map(|(id, requests)| (*id, requests.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Extend<(SkillEntryId, Vec<RoleRequest>)> for RoleRequests {
    fn extend<T: IntoIterator<Item = (SkillEntryId, Vec<RoleRequest>)>>(&mut self, iter: T) {
        for (entry, requests) in iter {
            self.insert(entry, requests);
        }
    }
}

impl IntoIterator for RoleRequests {
    type Item = (SkillEntryId, Vec<RoleRequest>);
    type IntoIter = std::vec::IntoIter<(SkillEntryId, Vec<RoleRequest>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Role results of one cycle, keyed by skill entry, in submission order. Every
/// submitted request has exactly one result.
#[derive(Clone, Debug, Default, Serialize)]
pub struct RoleResults {
    entries: Vec<(SkillEntryId, Vec<RoleResult>)>,
}

impl RoleResults {
    pub fn get(&self, entry: SkillEntryId) -> Option<&[RoleResult]> {
        self.entries
            .iter()
            .find(|(id, _)| *id == entry)
            .map(|(_, results)| results.as_slice())
    }

    /// The first result of an entry -- the role its skill runs with.
    pub fn primary(&self, entry: SkillEntryId) -> Option<&RoleResult> {
        self.get(entry).and_then(|results| results.first())
    }

    /// The player filling the primary role of an entry.
    pub fn primary_player(&self, entry: SkillEntryId) -> Option<PlayerId> {
        self.primary(entry).and_then(|result| result.player)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RoleResult> {
        self.entries.iter().flat_map(|(_, results)| results.iter())
    }

    /// Number of results (equal to the number of submitted requests).
    pub fn len(&self) -> usize {
        self.entries.iter().map(|(_, results)| results.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn push(&mut self, entry: SkillEntryId, results: Vec<RoleResult>) {
        self.entries.push((entry, results));
    }
}

/// A required request that could not be filled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Shortfall {
    pub key: RoleKey,
    pub priority: Priority,
}

/// Everything the assigner produced for one cycle.
#[derive(Clone, Debug, Default)]
pub struct Assignment {
    pub results: RoleResults,
    pub shortfalls: Vec<Shortfall>,
}
