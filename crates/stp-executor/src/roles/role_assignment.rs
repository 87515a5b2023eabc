use std::collections::{HashMap, HashSet};

use pathfinding::{kuhn_munkres::kuhn_munkres_min, matrix::Matrix};
use stp_core::{AssignmentMethod, AssignmentSettings, PlayerData, PlayerId, WorldData};

use super::{Assignment, Priority, RoleKey, RoleRequest, RoleResult, RoleResults, Shortfall};
use crate::tactics::SkillEntryId;

/// Assigns players to role requests, one tier of priority at a time.
///
/// Within a tier the assigner finds a matching between requests and the players
/// not taken by higher tiers. Players are never assigned to more than one request
/// per cycle, and every request receives exactly one [`RoleResult`].
///
/// Ties are deterministic: among assignments of equal cost, the one filling more
/// requests wins, then earlier-submitted requests are filled first and take
/// earlier players (in the order of `WorldData::own_players`).
pub struct RoleAssigner {
    settings: AssignmentSettings,
    /// Last cycle's results, handed to cost functions for hysteresis
    previous: HashMap<RoleKey, RoleResult>,
}

impl RoleAssigner {
    pub fn new(settings: AssignmentSettings) -> Self {
        Self {
            settings,
            previous: HashMap::new(),
        }
    }

    pub fn update_settings(&mut self, settings: AssignmentSettings) {
        self.settings = settings;
    }

    /// The result a request received in the last cycle.
    pub fn previous_result(&self, key: RoleKey) -> Option<&RoleResult> {
        self.previous.get(&key)
    }

    /// Resolve all requests of this cycle.
    pub fn assign<'a, I>(&mut self, requests: I, world: &WorldData) -> Assignment
    where
        I: IntoIterator<Item = (SkillEntryId, &'a [RoleRequest])>,
    {
        // Flatten in submission order
        let mut entries = Vec::new();
        let mut flat: Vec<(RoleKey, &RoleRequest)> = Vec::new();
        for (entry, entry_requests) in requests {
            entries.push((entry, entry_requests.len()));
            for (index, request) in entry_requests.iter().enumerate() {
                flat.push((RoleKey { entry, index }, request));
            }
        }

        let mut seen = HashSet::new();
        let candidates: Vec<&PlayerData> = world
            .own_players
            .iter()
            .filter(|player| player.valid && seen.insert(player.id))
            .collect();

        let mut taken = vec![false; candidates.len()];
        let mut assigned: Vec<Option<PlayerId>> = vec![None; flat.len()];

        let mut tiers: Vec<Priority> = flat.iter().map(|(_, request)| request.priority).collect();
        tiers.sort_unstable_by(|a, b| b.cmp(a));
        tiers.dedup();

        for tier in tiers {
            let rows: Vec<usize> = (0..flat.len())
                .filter(|&i| flat[i].1.priority == tier)
                .collect();
            let cols: Vec<usize> = (0..candidates.len()).filter(|&j| !taken[j]).collect();
            if cols.is_empty() {
                break;
            }

            let costs: Vec<Vec<Option<f64>>> = rows
                .iter()
                .map(|&i| {
                    let (key, request) = flat[i];
                    let previous = self.previous.get(&key);
                    cols.iter()
                        .map(|&j| {
                            let cost = request.cost.cost(candidates[j], previous, world);
                            self.sanitize(cost)
                        })
                        .collect()
                })
                .collect();

            let matching = match self.settings.method {
                AssignmentMethod::Exact => solve_exact(&costs, self.settings.cost_resolution),
                AssignmentMethod::Greedy => solve_greedy(&costs),
            };

            for (row, col) in matching.into_iter().enumerate() {
                if let Some(col) = col {
                    let j = cols[col];
                    debug_assert!(!taken[j]);
                    taken[j] = true;
                    assigned[rows[row]] = Some(candidates[j].id);
                }
            }
        }

        let mut results = RoleResults::default();
        let mut shortfalls = Vec::new();
        let mut previous = HashMap::with_capacity(flat.len());
        let mut flat_index = 0;
        for (entry, count) in entries {
            let mut entry_results = Vec::with_capacity(count);
            for _ in 0..count {
                let (key, request) = flat[flat_index];
                let result = RoleResult {
                    key,
                    priority: request.priority,
                    required: request.required,
                    player: assigned[flat_index],
                };
                if request.required && !result.is_filled() {
                    log::warn!(
                        "Required role {:?} (priority {:?}) could not be filled",
                        key,
                        request.priority
                    );
                    shortfalls.push(Shortfall {
                        key,
                        priority: request.priority,
                    });
                }
                previous.insert(key, result.clone());
                entry_results.push(result);
                flat_index += 1;
            }
            results.push(entry, entry_results);
        }
        self.previous = previous;

        log::debug!(
            "Assigned {} of {} roles to {} players",
            assigned.iter().filter(|p| p.is_some()).count(),
            flat.len(),
            candidates.len()
        );

        Assignment {
            results,
            shortfalls,
        }
    }

    /// Map a raw cost to `None` if it excludes the player.
    fn sanitize(&self, cost: f64) -> Option<f64> {
        if cost.is_finite() && cost.abs() < self.settings.max_cost {
            Some(cost)
        } else {
            None
        }
    }
}

impl Default for RoleAssigner {
    fn default() -> Self {
        Self::new(AssignmentSettings::default())
    }
}

/// Repeatedly take the cheapest remaining (row, column) pair. Ties go to the
/// earliest row, then the earliest column.
fn solve_greedy(costs: &[Vec<Option<f64>>]) -> Vec<Option<usize>> {
    let n = costs.len();
    let m = costs.first().map_or(0, |row| row.len());
    let mut result = vec![None; n];
    let mut col_used = vec![false; m];

    loop {
        let mut best: Option<(f64, usize, usize)> = None;
        for (i, row) in costs.iter().enumerate() {
            if result[i].is_some() {
                continue;
            }
            for (j, cost) in row.iter().enumerate() {
                if col_used[j] {
                    continue;
                }
                if let Some(cost) = *cost {
                    if best.map_or(true, |(best_cost, _, _)| cost < best_cost) {
                        best = Some((cost, i, j));
                    }
                }
            }
        }

        match best {
            Some((_, i, j)) => {
                result[i] = Some(j);
                col_used[j] = true;
            }
            None => break,
        }
    }

    result
}

/// Quantised costs are clamped to this many quanta so the matrix arithmetic below
/// cannot overflow, whatever `max_cost` and `cost_resolution` are configured to.
const MAX_QUANTA: f64 = 9_007_199_254_740_992.0;

/// Minimum-cost matching of rows to columns, filling as many rows as possible.
///
/// Besides the real columns there are `n` "unfilled" slots, each priced above any
/// change in real cost, so the number of filled rows is maximised first. Costs are
/// quantised to `resolution` and a small rank term is added below the quantum so
/// that equal-cost matchings resolve deterministically: earlier rows are filled
/// first and take earlier columns.
fn solve_exact(costs: &[Vec<Option<f64>>], resolution: f64) -> Vec<Option<usize>> {
    let n = costs.len();
    if n == 0 {
        return Vec::new();
    }
    let m = costs[0].len();
    let resolution = if resolution.is_finite() && resolution > 0.0 {
        resolution
    } else {
        1e-3
    };

    let quantised: Vec<Vec<Option<i128>>> = costs
        .iter()
        .map(|row| {
            row.iter()
                .map(|cost| {
                    cost.map(|c| (c / resolution).round().clamp(-MAX_QUANTA, MAX_QUANTA) as i128)
                })
                .collect()
        })
        .collect();
    let max_abs = quantised
        .iter()
        .flatten()
        .flatten()
        .map(|q| q.abs())
        .max()
        .unwrap_or(0);

    let n_i = n as i128;
    let m_i = m as i128;
    // Any swap of a real cost changes a row by at most 2 * max_abs
    let unfilled = 2 * (max_abs + 1) * n_i + 1;
    let forbidden = 2 * unfilled;
    // Rank terms sum to at most n * n * m, which must stay below one quantum
    let scale = n_i * n_i * (m_i + 1) + 1;

    // Columns: m players followed by n "unfilled" slots
    let matrix = Matrix::from_fn(n, m + n, |(i, j)| {
        let row_weight = n_i - i as i128;
        if j < m {
            match quantised[i][j] {
                Some(q) => q * scale + row_weight * j as i128,
                None => forbidden * scale,
            }
        } else {
            unfilled * scale + row_weight * m_i
        }
    });

    let (_, columns) = kuhn_munkres_min(&matrix);
    columns
        .into_iter()
        .enumerate()
        .map(|(i, j)| (j < m && quantised[i][j].is_some()).then_some(j))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rand::{rngs::StdRng, Rng, SeedableRng};
    use stp_core::{BallData, Vector2};

    use super::*;
    use crate::roles::{CostFn, HysteresisCost, RoleRequests};

    fn create_test_world(num_players: usize) -> WorldData {
        WorldData {
            own_players: (0..num_players)
                .map(|i| {
                    PlayerData::new(PlayerId::new(i as u32))
                        .with_position(Vector2::new(i as f64 * 100.0, 0.0))
                })
                .collect(),
            ball: Some(BallData::new(Vector2::zeros(), Vector2::zeros())),
            ..Default::default()
        }
    }

    fn constant(cost: f64) -> impl CostFn {
        move |_: &PlayerData, _: Option<&RoleResult>, _: &WorldData| cost
    }

    /// Cost is the distance of the player from `x` along the x axis.
    fn near(x: f64) -> impl CostFn {
        move |p: &PlayerData, _: Option<&RoleResult>, _: &WorldData| (p.position.x - x).abs()
    }

    fn prefer(id: u32) -> impl CostFn {
        move |p: &PlayerData, _: Option<&RoleResult>, _: &WorldData| {
            if p.id == PlayerId::new(id) {
                0.0
            } else {
                1.0
            }
        }
    }

    fn single(entry: SkillEntryId, request: RoleRequest) -> RoleRequests {
        let mut requests = RoleRequests::new();
        requests.insert(entry, vec![request]);
        requests
    }

    fn assign(assigner: &mut RoleAssigner, requests: &RoleRequests, world: &WorldData) -> Assignment {
        assigner.assign(requests.iter(), world)
    }

    fn assert_no_double_booking(assignment: &Assignment) {
        let filled: Vec<_> = assignment.results.iter().filter_map(|r| r.player).collect();
        let distinct: HashSet<_> = filled.iter().collect();
        assert_eq!(filled.len(), distinct.len());
    }

    fn methods() -> [AssignmentMethod; 2] {
        [AssignmentMethod::Exact, AssignmentMethod::Greedy]
    }

    fn assigner_with(method: AssignmentMethod) -> RoleAssigner {
        RoleAssigner::new(AssignmentSettings {
            method,
            ..Default::default()
        })
    }

    #[test]
    fn test_simple_assignment() {
        for method in methods() {
            let mut assigner = assigner_with(method);
            let world = create_test_world(3);
            let (a, b, c) = (SkillEntryId::next(), SkillEntryId::next(), SkillEntryId::next());
            let mut requests = RoleRequests::new();
            requests.insert(a, vec![RoleRequest::new(Priority::High, true, near(200.0))]);
            requests.insert(b, vec![RoleRequest::new(Priority::High, true, near(0.0))]);
            requests.insert(c, vec![RoleRequest::new(Priority::High, true, near(100.0))]);

            let assignment = assign(&mut assigner, &requests, &world);
            assert!(assignment.shortfalls.is_empty());
            assert_eq!(assignment.results.primary_player(a), Some(PlayerId::new(2)));
            assert_eq!(assignment.results.primary_player(b), Some(PlayerId::new(0)));
            assert_eq!(assignment.results.primary_player(c), Some(PlayerId::new(1)));
        }
    }

    #[test]
    fn test_same_agent_tie_goes_to_first_submitted() {
        for method in methods() {
            let mut assigner = assigner_with(method);
            let world = create_test_world(1);
            let (first, second) = (SkillEntryId::next(), SkillEntryId::next());
            let mut requests = RoleRequests::new();
            requests.insert(first, vec![RoleRequest::new(Priority::High, false, constant(1.0))]);
            requests.insert(second, vec![RoleRequest::new(Priority::High, false, constant(1.0))]);

            for _ in 0..3 {
                let assignment = assign(&mut assigner, &requests, &world);
                assert_eq!(assignment.results.len(), 2);
                assert_eq!(assignment.results.primary_player(first), Some(PlayerId::new(0)));
                assert_eq!(assignment.results.primary_player(second), None);
                assert!(assignment.shortfalls.is_empty());
            }
        }
    }

    #[test]
    fn test_equal_costs_follow_player_order() {
        for method in methods() {
            let mut assigner = assigner_with(method);
            let world = create_test_world(3);
            let (a, b) = (SkillEntryId::next(), SkillEntryId::next());
            let mut requests = RoleRequests::new();
            requests.insert(a, vec![RoleRequest::new(Priority::Low, false, constant(5.0))]);
            requests.insert(b, vec![RoleRequest::new(Priority::Low, false, constant(5.0))]);

            let assignment = assign(&mut assigner, &requests, &world);
            assert_eq!(assignment.results.primary_player(a), Some(PlayerId::new(0)));
            assert_eq!(assignment.results.primary_player(b), Some(PlayerId::new(1)));
        }
    }

    #[test]
    fn test_higher_priority_resolved_first() {
        for method in methods() {
            let mut assigner = assigner_with(method);
            let world = create_test_world(1);
            let (low, high) = (SkillEntryId::next(), SkillEntryId::next());
            let mut requests = RoleRequests::new();
            // Submitted first, but lower priority
            requests.insert(low, vec![RoleRequest::new(Priority::Low, true, constant(0.0))]);
            requests.insert(high, vec![RoleRequest::new(Priority::High, true, constant(100.0))]);

            let assignment = assign(&mut assigner, &requests, &world);
            assert_eq!(assignment.results.primary_player(high), Some(PlayerId::new(0)));
            assert_eq!(assignment.results.primary_player(low), None);
            assert_eq!(
                assignment.shortfalls,
                vec![Shortfall {
                    key: RoleKey { entry: low, index: 0 },
                    priority: Priority::Low
                }]
            );
        }
    }

    #[test]
    fn test_required_without_players_reports_shortfall() {
        let mut assigner = RoleAssigner::default();
        let world = create_test_world(0);
        let (required, optional) = (SkillEntryId::next(), SkillEntryId::next());
        let mut requests = RoleRequests::new();
        requests.insert(required, vec![RoleRequest::new(Priority::High, true, constant(0.0))]);
        requests.insert(optional, vec![RoleRequest::new(Priority::High, false, constant(0.0))]);

        let assignment = assign(&mut assigner, &requests, &world);
        assert_eq!(assignment.results.len(), 2);
        assert!(assignment.results.iter().all(|r| !r.is_filled()));
        assert_eq!(assignment.shortfalls.len(), 1);
        assert_eq!(assignment.shortfalls[0].key.entry, required);
    }

    #[test]
    fn test_non_finite_costs_are_ineligible() {
        for method in methods() {
            let mut assigner = assigner_with(method);
            let world = create_test_world(3);
            let entry = SkillEntryId::next();
            let cost = |p: &PlayerData, _: Option<&RoleResult>, _: &WorldData| match p.id.as_u32() {
                0 => f64::NAN,
                1 => f64::INFINITY,
                _ => 1e12,
            };
            let requests = single(entry, RoleRequest::new(Priority::High, true, cost));

            let assignment = assign(&mut assigner, &requests, &world);
            assert_eq!(assignment.results.primary_player(entry), None);
            assert_eq!(assignment.shortfalls.len(), 1);
        }
    }

    #[test]
    fn test_nan_does_not_hide_eligible_player() {
        for method in methods() {
            let mut assigner = assigner_with(method);
            let world = create_test_world(3);
            let entry = SkillEntryId::next();
            let cost = |p: &PlayerData, _: Option<&RoleResult>, _: &WorldData| match p.id.as_u32() {
                0 => f64::NAN,
                1 => 3.0,
                _ => f64::NEG_INFINITY,
            };
            let requests = single(entry, RoleRequest::new(Priority::High, true, cost));

            let assignment = assign(&mut assigner, &requests, &world);
            assert_eq!(assignment.results.primary_player(entry), Some(PlayerId::new(1)));
        }
    }

    #[test]
    fn test_invalid_players_are_skipped() {
        let mut assigner = RoleAssigner::default();
        let mut world = create_test_world(2);
        world.own_players[0].valid = false;
        let entry = SkillEntryId::next();
        let requests = single(entry, RoleRequest::new(Priority::High, true, prefer(0)));

        let assignment = assign(&mut assigner, &requests, &world);
        assert_eq!(assignment.results.primary_player(entry), Some(PlayerId::new(1)));
    }

    #[test]
    fn test_exact_finds_global_optimum() {
        let world = create_test_world(2);
        let (a, b) = (SkillEntryId::next(), SkillEntryId::next());
        // Greedy takes (a, p0) at cost 1 and leaves b with p1 at cost 100.
        // The optimum is (a, p1) + (b, p0) at cost 2 + 2.
        let cost_a = |p: &PlayerData, _: Option<&RoleResult>, _: &WorldData| {
            if p.id.as_u32() == 0 {
                1.0
            } else {
                2.0
            }
        };
        let cost_b = |p: &PlayerData, _: Option<&RoleResult>, _: &WorldData| {
            if p.id.as_u32() == 0 {
                2.0
            } else {
                100.0
            }
        };
        let mut requests = RoleRequests::new();
        requests.insert(a, vec![RoleRequest::new(Priority::High, true, cost_a)]);
        requests.insert(b, vec![RoleRequest::new(Priority::High, true, cost_b)]);

        let exact = assign(&mut assigner_with(AssignmentMethod::Exact), &requests, &world);
        assert_eq!(exact.results.primary_player(a), Some(PlayerId::new(1)));
        assert_eq!(exact.results.primary_player(b), Some(PlayerId::new(0)));

        let greedy = assign(&mut assigner_with(AssignmentMethod::Greedy), &requests, &world);
        assert_eq!(greedy.results.primary_player(a), Some(PlayerId::new(0)));
        assert_eq!(greedy.results.primary_player(b), Some(PlayerId::new(1)));
    }

    #[test]
    fn test_exact_prefers_filling_more_roles() {
        let world = create_test_world(2);
        let (a, b) = (SkillEntryId::next(), SkillEntryId::next());
        // a can use either player but strongly prefers p1; b can only use p1
        let cost_a = |p: &PlayerData, _: Option<&RoleResult>, _: &WorldData| {
            if p.id.as_u32() == 1 {
                0.0
            } else {
                500.0
            }
        };
        let cost_b = |p: &PlayerData, _: Option<&RoleResult>, _: &WorldData| {
            if p.id.as_u32() == 1 {
                0.0
            } else {
                f64::INFINITY
            }
        };
        let mut requests = RoleRequests::new();
        requests.insert(a, vec![RoleRequest::new(Priority::High, false, cost_a)]);
        requests.insert(b, vec![RoleRequest::new(Priority::High, false, cost_b)]);

        let assignment = assign(&mut RoleAssigner::default(), &requests, &world);
        assert_eq!(assignment.results.primary_player(a), Some(PlayerId::new(0)));
        assert_eq!(assignment.results.primary_player(b), Some(PlayerId::new(1)));
    }

    #[test]
    fn test_multiple_requests_per_entry() {
        let mut assigner = RoleAssigner::default();
        let world = create_test_world(3);
        let entry = SkillEntryId::next();
        let mut requests = RoleRequests::new();
        requests.insert(
            entry,
            vec![
                RoleRequest::new(Priority::High, true, near(100.0)),
                RoleRequest::new(Priority::Medium, true, near(100.0)),
            ],
        );

        let assignment = assign(&mut assigner, &requests, &world);
        let results = assignment.results.get(entry).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].player, Some(PlayerId::new(1)));
        // Both remaining players are 100 away; the earlier one wins
        assert_eq!(results[1].player, Some(PlayerId::new(0)));
        assert_eq!(results[1].key.index, 1);
    }

    #[test]
    fn test_previous_result_is_passed_to_cost() {
        let mut assigner = RoleAssigner::default();
        let world = create_test_world(3);
        let entry = SkillEntryId::next();
        // Sticky: the previous holder costs nothing, everyone else costs by id
        let sticky = |p: &PlayerData, prev: Option<&RoleResult>, _: &WorldData| {
            match prev.and_then(|r| r.player) {
                Some(id) if id == p.id => 0.0,
                _ => 10.0 - p.id.as_u32() as f64,
            }
        };
        let requests = single(entry, RoleRequest::new(Priority::High, true, sticky));

        let first = assign(&mut assigner, &requests, &world);
        assert_eq!(first.results.primary_player(entry), Some(PlayerId::new(2)));
        assert_eq!(
            assigner.previous_result(RoleKey { entry, index: 0 }).and_then(|r| r.player),
            Some(PlayerId::new(2))
        );

        // Player 2 disappears, player 1 takes over and then keeps the role
        let mut world2 = world.clone();
        world2.own_players.retain(|p| p.id.as_u32() != 2);
        let second = assign(&mut assigner, &requests, &world2);
        assert_eq!(second.results.primary_player(entry), Some(PlayerId::new(1)));

        let third = assign(&mut assigner, &requests, &world);
        assert_eq!(third.results.primary_player(entry), Some(PlayerId::new(1)));
    }

    #[test]
    fn test_hysteresis_keeps_holder() {
        let mut assigner = RoleAssigner::default();
        let entry = SkillEntryId::next();
        let requests = single(
            entry,
            RoleRequest::new(Priority::High, true, HysteresisCost::new(near(0.0), 100.0)),
        );

        let world = create_test_world(2);
        let first = assign(&mut assigner, &requests, &world);
        assert_eq!(first.results.primary_player(entry), Some(PlayerId::new(0)));

        // Player 1 is now closer, but not by more than the change cost
        let mut world = world;
        world.own_players[0].position.x = 50.0;
        world.own_players[1].position.x = 5.0;
        let second = assign(&mut assigner, &requests, &world);
        assert_eq!(second.results.primary_player(entry), Some(PlayerId::new(0)));

        world.own_players[0].position.x = 500.0;
        let third = assign(&mut assigner, &requests, &world);
        assert_eq!(third.results.primary_player(entry), Some(PlayerId::new(1)));
    }

    #[test]
    fn test_previous_result_forgotten_when_not_requested() {
        let mut assigner = RoleAssigner::default();
        let world = create_test_world(2);
        let entry = SkillEntryId::next();
        let requests = single(entry, RoleRequest::new(Priority::High, true, constant(0.0)));
        assign(&mut assigner, &requests, &world);
        assert!(assigner.previous_result(RoleKey { entry, index: 0 }).is_some());

        assign(&mut assigner, &RoleRequests::new(), &world);
        assert!(assigner.previous_result(RoleKey { entry, index: 0 }).is_none());
    }

    #[test]
    fn test_no_double_booking_random() {
        let mut rng = StdRng::seed_from_u64(7);
        for method in methods() {
            let mut assigner = assigner_with(method);
            for _ in 0..200 {
                let world = create_test_world(rng.gen_range(0..7));
                let mut requests = RoleRequests::new();
                for _ in 0..rng.gen_range(0..9) {
                    let priority = match rng.gen_range(0..3) {
                        0 => Priority::Low,
                        1 => Priority::Medium,
                        _ => Priority::High,
                    };
                    let table: Arc<Vec<f64>> = Arc::new(
                        (0..7)
                            .map(|_| match rng.gen_range(0..10) {
                                0 => f64::NAN,
                                1 => f64::INFINITY,
                                _ => rng.gen_range(-50.0..50.0),
                            })
                            .collect(),
                    );
                    let cost = move |p: &PlayerData, _: Option<&RoleResult>, _: &WorldData| {
                        table[p.id.as_u32() as usize]
                    };
                    requests.insert(
                        SkillEntryId::next(),
                        vec![RoleRequest::new(priority, rng.gen_bool(0.5), cost)],
                    );
                }

                let assignment = assign(&mut assigner, &requests, &world);
                assert_eq!(assignment.results.len(), requests.len());
                assert_no_double_booking(&assignment);
                for result in assignment.results.iter() {
                    let is_shortfall = assignment.shortfalls.iter().any(|s| s.key == result.key);
                    assert_eq!(is_shortfall, result.required && !result.is_filled());
                }
            }
        }
    }

    #[test]
    fn test_exact_matches_brute_force() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let n = rng.gen_range(1..5);
            let m = rng.gen_range(1..5);
            let costs: Vec<Vec<Option<f64>>> = (0..n)
                .map(|_| {
                    (0..m)
                        .map(|_| rng.gen_bool(0.8).then(|| rng.gen_range(0..20) as f64))
                        .collect()
                })
                .collect();

            let result = solve_exact(&costs, 1e-3);
            let filled = result.iter().filter(|c| c.is_some()).count();
            let total: f64 = result
                .iter()
                .enumerate()
                .filter_map(|(i, c)| c.map(|j| costs[i][j].unwrap()))
                .sum();

            let (best_filled, best_total) = brute_force(&costs, 0, &mut vec![false; m]);
            assert_eq!(filled, best_filled);
            assert!((total - best_total).abs() < 1e-9, "{costs:?} {result:?}");
        }
    }

    #[test]
    fn test_huge_costs_with_unbounded_max_cost() {
        let mut assigner = RoleAssigner::new(AssignmentSettings {
            max_cost: f64::INFINITY,
            ..Default::default()
        });
        let world = create_test_world(2);
        let entry = SkillEntryId::next();
        let cost = |p: &PlayerData, _: Option<&RoleResult>, _: &WorldData| {
            if p.id == PlayerId::new(0) {
                1e40
            } else {
                1.0
            }
        };
        let requests = single(entry, RoleRequest::new(Priority::High, true, cost));

        let assignment = assign(&mut assigner, &requests, &world);
        assert!(assignment.shortfalls.is_empty());
        assert_eq!(assignment.results.primary_player(entry), Some(PlayerId::new(1)));
    }

    #[test]
    fn test_fine_cost_resolution() {
        for resolution in [1e-40, 0.0, -1.0, f64::NAN, f64::INFINITY] {
            let mut assigner = RoleAssigner::new(AssignmentSettings {
                cost_resolution: resolution,
                ..Default::default()
            });
            let world = create_test_world(3);
            let (a, b) = (SkillEntryId::next(), SkillEntryId::next());
            let mut requests = RoleRequests::new();
            requests.insert(a, vec![RoleRequest::new(Priority::High, true, constant(1.0))]);
            requests.insert(b, vec![RoleRequest::new(Priority::High, true, near(200.0))]);

            let assignment = assign(&mut assigner, &requests, &world);
            assert!(assignment.shortfalls.is_empty(), "resolution {resolution}");
            assert_no_double_booking(&assignment);
        }
    }

    /// Best (most filled, then lowest cost) over all matchings of rows `i..`.
    fn brute_force(costs: &[Vec<Option<f64>>], i: usize, used: &mut Vec<bool>) -> (usize, f64) {
        if i == costs.len() {
            return (0, 0.0);
        }
        let mut best = brute_force(costs, i + 1, used);
        for j in 0..used.len() {
            if used[j] {
                continue;
            }
            if let Some(c) = costs[i][j] {
                used[j] = true;
                let (filled, total) = brute_force(costs, i + 1, used);
                used[j] = false;
                let candidate = (filled + 1, total + c);
                if candidate.0 > best.0 || (candidate.0 == best.0 && candidate.1 < best.1) {
                    best = candidate;
                }
            }
        }
        best
    }
}
