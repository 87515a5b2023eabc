use clap::ValueEnum;
use stp_core::{Angle, ExecutorSettings, PlayerId, Vector2};
use stp_executor::tactics::{CaptureTactic, PassTactic, Tactic};

use crate::toy_world::ToyWorld;

/// Kick speed used by the pass scenario, in mm/s.
const PASS_SPEED: f64 = 3000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Scenario {
    /// Three players race for a ball lying still
    Capture,
    /// Three players intercept a fast rolling ball
    Intercept,
    /// Player 1 passes to player 7
    Pass,
}

impl Scenario {
    pub fn world(&self, settings: &ExecutorSettings, sensor_noise: f64, seed: u64) -> ToyWorld {
        let mut world = ToyWorld::new(settings.motion.clone(), sensor_noise, seed);
        match self {
            Scenario::Capture => {
                world
                    .add_player(0, Vector2::new(-2000.0, -1000.0), Angle::default())
                    .add_player(1, Vector2::new(1500.0, 1200.0), Angle::PI)
                    .add_player(2, Vector2::new(0.0, -2500.0), Angle::PI_2)
                    .set_ball(Vector2::new(500.0, 0.0), Vector2::zeros());
            }
            Scenario::Intercept => {
                world
                    .add_player(0, Vector2::new(-1500.0, 1000.0), Angle::default())
                    .add_player(1, Vector2::new(2500.0, 800.0), Angle::PI)
                    .add_player(2, Vector2::new(1000.0, -1500.0), Angle::PI_2)
                    .set_ball(Vector2::new(-2000.0, 0.0), Vector2::new(2500.0, 300.0));
            }
            Scenario::Pass => {
                world
                    .add_player(1, Vector2::new(-1000.0, 0.0), Angle::default())
                    .add_player(7, Vector2::new(2000.0, 1500.0), Angle::PI)
                    .add_player(3, Vector2::new(0.0, -2000.0), Angle::PI_2)
                    .set_ball(Vector2::new(-500.0, 0.0), Vector2::zeros());
            }
        }
        world
    }

    pub fn tactics(&self, settings: &ExecutorSettings) -> Vec<Box<dyn Tactic>> {
        match self {
            Scenario::Capture | Scenario::Intercept => {
                vec![Box::new(CaptureTactic::new(settings))]
            }
            Scenario::Pass => vec![Box::new(PassTactic::new(
                &settings.capture,
                Some(PlayerId::new(1)),
                Some(PlayerId::new(7)),
                PASS_SPEED,
            ))],
        }
    }
}
