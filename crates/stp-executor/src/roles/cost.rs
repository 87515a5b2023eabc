use std::f64::consts::FRAC_PI_2;

use stp_core::{
    math::{angle_between, nearest_point_on_line, trapezoidal_time},
    BallData, CaptureSettings, MotionSettings, PlayerData, PlayerId, WorldData, BALL_RADIUS,
    PLAYER_RADIUS,
};

use super::{CostFn, RoleResult};

/// Added to the intercept time of a player that can never catch the ball, in seconds.
const CANNOT_CATCH_UP_PENALTY: f64 = 100.0;

/// Whether the previous result of a request was filled by a different player.
fn changed_player(player: &PlayerData, previous: Option<&RoleResult>) -> bool {
    previous
        .and_then(|result| result.player)
        .map_or(false, |id| id != player.id)
}

/// Scores the receiver of a pass: 0 for the preferred player, 1 for everyone else.
#[derive(Clone, Debug, Default)]
pub struct ReceiverCost {
    pub preferred: Option<PlayerId>,
}

impl ReceiverCost {
    pub fn new(preferred: Option<PlayerId>) -> Self {
        Self { preferred }
    }
}

impl CostFn for ReceiverCost {
    fn cost(&self, player: &PlayerData, _previous: Option<&RoleResult>, _world: &WorldData) -> f64 {
        if Some(player.id) == self.preferred {
            0.0
        } else {
            1.0
        }
    }
}

/// Scores the passer: 0 for a player that already senses the ball or for the
/// preferred player, 1 for everyone else.
#[derive(Clone, Debug, Default)]
pub struct PasserCost {
    pub preferred: Option<PlayerId>,
}

impl PasserCost {
    pub fn new(preferred: Option<PlayerId>) -> Self {
        Self { preferred }
    }
}

impl CostFn for PasserCost {
    fn cost(&self, player: &PlayerData, _previous: Option<&RoleResult>, _world: &WorldData) -> f64 {
        if player.breakbeam_ball_detected || Some(player.id) == self.preferred {
            0.0
        } else {
            1.0
        }
    }
}

/// Wraps a cost function and charges `change_cost` to every player except the one
/// that held the role in the previous cycle, so that equally good players do not
/// swap the role back and forth.
#[derive(Clone, Debug)]
pub struct HysteresisCost<C> {
    inner: C,
    change_cost: f64,
}

impl<C: CostFn> HysteresisCost<C> {
    pub fn new(inner: C, change_cost: f64) -> Self {
        Self { inner, change_cost }
    }
}

impl<C: CostFn> CostFn for HysteresisCost<C> {
    fn cost(&self, player: &PlayerData, previous: Option<&RoleResult>, world: &WorldData) -> f64 {
        let cost = self.inner.cost(player, previous, world);
        if changed_player(player, previous) {
            cost + self.change_cost
        } else {
            cost
        }
    }
}

/// Cost of assigning a player to capture the ball.
///
/// For a slow ball this is the distance to the ball (in m) scaled by
/// `position_cost_multiplier`, so the closest player almost always wins. For a
/// fast ball it is the estimated time to intercept scaled by
/// `settle_cost_multiplier`.
#[derive(Clone, Debug)]
pub struct CaptureCost {
    capture: CaptureSettings,
    motion: MotionSettings,
}

impl CaptureCost {
    pub fn new(capture: CaptureSettings, motion: MotionSettings) -> Self {
        Self { capture, motion }
    }

    /// Estimated time in seconds for the player to intercept a moving ball.
    ///
    /// The player first has to reach the closest point on the ball's line of travel.
    /// If the player is behind the ball it additionally has to make up the distance
    /// the ball travels, at the speed difference between the two. A player slower
    /// than the ball gets a large fixed penalty instead.
    pub fn intercept_time(&self, player: &PlayerData, ball: &BallData) -> f64 {
        let intercept = nearest_point_on_line(ball.position, ball.velocity, player.position);
        let ball_to_player = player.position - ball.position;
        let ball_to_intercept = intercept - ball.position;
        let player_to_intercept = intercept - player.position;

        // Close enough counts as in front, the ball may have just bounced off us
        let in_front = angle_between(ball.velocity, ball_to_player) < FRAC_PI_2
            || ball_to_player.norm() < 1.5 * (PLAYER_RADIUS + BALL_RADIUS);

        let max_speed = self.motion.max_speed;
        let max_acc = self.motion.max_acceleration;
        let mut time = trapezoidal_time(player_to_intercept.norm(), max_speed, max_acc);

        if !in_front {
            let delta_speed = max_speed - ball.speed();
            if delta_speed <= 0.0 {
                time += CANNOT_CATCH_UP_PENALTY;
            } else {
                time += trapezoidal_time(ball_to_intercept.norm(), delta_speed, max_acc);
            }
        }

        time
    }
}

impl CostFn for CaptureCost {
    fn cost(&self, player: &PlayerData, previous: Option<&RoleResult>, world: &WorldData) -> f64 {
        let change_cost = if changed_player(player, previous) {
            self.capture.robot_change_cost
        } else {
            0.0
        };

        let Some(ball) = world.valid_ball() else {
            // Nothing to go for, only keep the current holder
            return change_cost;
        };

        if ball.speed() < self.capture.collect_speed_threshold {
            let distance_m = (player.position - ball.position).norm() / 1000.0;
            distance_m * self.capture.position_cost_multiplier + change_cost
        } else {
            self.intercept_time(player, ball) * self.capture.settle_cost_multiplier + change_cost
        }
    }
}
