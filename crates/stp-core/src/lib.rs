mod angle;
mod player_id;
mod settings;
mod world;

pub mod math;

pub use angle::*;
pub use player_id::*;
pub use settings::*;
pub use world::*;

pub type Vector2 = nalgebra::Vector2<f64>;

/// Radius of a player, in mm.
pub const PLAYER_RADIUS: f64 = 90.0;
/// Radius of the ball, in mm.
pub const BALL_RADIUS: f64 = 21.5;
