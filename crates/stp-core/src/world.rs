use serde::{Deserialize, Serialize};

use crate::{Angle, PlayerId, Vector2};

/// A struct to store the ball state from a single frame.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct BallData {
    /// Position of the ball, in mm
    pub position: Vector2,
    /// Velocity of the ball, in mm/s
    pub velocity: Vector2,
    /// Whether the ball was seen in this frame. A ball that is not detected is
    /// extrapolated by perception and should not be trusted.
    pub detected: bool,
}

impl BallData {
    pub fn new(position: Vector2, velocity: Vector2) -> Self {
        Self {
            position,
            velocity,
            detected: true,
        }
    }

    pub fn speed(&self) -> f64 {
        self.velocity.norm()
    }
}

/// A struct to store the player state from a single frame.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PlayerData {
    /// The player's unique id
    pub id: PlayerId,
    /// Position of the player, in mm
    pub position: Vector2,
    /// Velocity of the player, in mm/s
    pub velocity: Vector2,
    /// Yaw of the player, where `0` is the positive x direction
    pub yaw: Angle,
    /// Whether the breakbeam sensor detected a ball
    pub breakbeam_ball_detected: bool,
    /// Whether perception currently trusts this player's data. Invalid players
    /// are never assigned to roles.
    pub valid: bool,
}

impl PlayerData {
    pub fn new(id: PlayerId) -> Self {
        Self {
            id,
            position: Vector2::zeros(),
            velocity: Vector2::zeros(),
            yaw: Angle::default(),
            breakbeam_ball_detected: false,
            valid: true,
        }
    }

    pub fn with_position(mut self, position: Vector2) -> Self {
        self.position = position;
        self
    }

    pub fn with_velocity(mut self, velocity: Vector2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_yaw(mut self, yaw: Angle) -> Self {
        self.yaw = yaw;
        self
    }

    pub fn with_breakbeam(mut self, detected: bool) -> Self {
        self.breakbeam_ball_detected = detected;
        self
    }
}

/// Immutable snapshot of the world for one control cycle.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct WorldData {
    /// Time at which the snapshot was taken, in seconds
    pub t_received: f64,
    /// Duration between this and the previous snapshot, in seconds
    pub dt: f64,
    pub own_players: Vec<PlayerData>,
    pub ball: Option<BallData>,
}

impl WorldData {
    pub fn get_player(&self, id: PlayerId) -> Option<&PlayerData> {
        self.own_players.iter().find(|p| p.id == id)
    }

    /// The ball, if it is currently detected.
    pub fn valid_ball(&self) -> Option<&BallData> {
        self.ball.as_ref().filter(|ball| ball.detected)
    }

    /// Speed of the ball in mm/s, zero when the ball is not detected.
    pub fn ball_speed(&self) -> f64 {
        self.valid_ball().map(|ball| ball.speed()).unwrap_or(0.0)
    }
}
