use std::collections::HashMap;

use serde::Serialize;
use stp_core::{Angle, PlayerId, Vector2};

/// A collection of player inputs.
#[derive(Debug, Default, Serialize)]
pub struct PlayerInputs {
    inputs: HashMap<PlayerId, PlayerControlInput>,
}

impl PlayerInputs {
    /// Create a new instance of `PlayerInputs`.
    pub fn new() -> Self {
        Self {
            inputs: HashMap::with_capacity(6),
        }
    }

    /// Get an iterator over the player inputs.
    pub fn iter(&self) -> impl Iterator<Item = (&PlayerId, &PlayerControlInput)> {
        self.inputs.iter()
    }

    /// Get the input for a player, if one was produced this cycle.
    pub fn get(&self, id: PlayerId) -> Option<&PlayerControlInput> {
        self.inputs.get(&id)
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.inputs.contains_key(&id)
    }

    /// Set the input for a player
    pub fn insert(&mut self, id: PlayerId, input: PlayerControlInput) {
        self.inputs.insert(id, input);
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }
}

impl IntoIterator for PlayerInputs {
    type Item = (PlayerId, PlayerControlInput);
    type IntoIter = std::collections::hash_map::IntoIter<PlayerId, PlayerControlInput>;

    fn into_iter(self) -> Self::IntoIter {
        self.inputs.into_iter()
    }
}

/// Actuation intent for one player, handed to the motion controller.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlayerControlInput {
    /// Target position. If `None`, the player will just follow the given velocity
    pub position: Option<Vector2>,
    /// Target velocity (in global frame). This is added to the output of the position
    /// controller.
    pub velocity: Vector2,
    /// Target heading. If `None` the heading is left to the controller.
    pub yaw: Option<Angle>,
    /// Dribbler speed normalised to [0, 1]
    pub dribbling_speed: f64,
    /// Use the fine approach controller to drive onto the ball
    pub collect: bool,
    /// Kicker control input
    pub kicker: KickerControlInput,
}

impl PlayerControlInput {
    /// Create a new instance of `PlayerControlInput`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target position of the player.
    pub fn with_position(&mut self, pos: Vector2) -> &mut Self {
        self.position = Some(pos);
        self
    }

    /// Set the target heading of the player.
    pub fn with_yaw(&mut self, yaw: Angle) -> &mut Self {
        self.yaw = Some(yaw);
        self
    }

    /// Set the dribbling speed of the player.
    pub fn with_dribbling(&mut self, speed: f64) -> &mut Self {
        self.dribbling_speed = speed;
        self
    }

    /// Engage the fine approach onto the ball.
    pub fn with_collect(&mut self) -> &mut Self {
        self.collect = true;
        self
    }

    /// Set the kicker control input.
    pub fn with_kicker(&mut self, kicker: KickerControlInput) -> &mut Self {
        self.kicker = kicker;
        self
    }
}

/// Kicker state in the current update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub enum KickerControlInput {
    /// Kicker is not used
    #[default]
    Idle,
    /// Charge the kicker capacitor
    Arm,
    /// Engage the kicker with the given ball speed, in mm/s.
    Kick { speed: f64 },
}
