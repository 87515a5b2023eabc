use std::f64::consts::FRAC_PI_2;

use stp_core::{math::angle_between, Angle, CaptureSettings};

use super::{Capture, SkillCtx, SkillProgress};
use crate::control::PlayerControlInput;

/// Start capturing once the ball is this close, in mm, even if it is not moving
/// towards us.
const RECEIVE_DISTANCE: f64 = 1000.0;

/// Waits facing the ball until it comes our way, then captures it.
#[derive(Debug)]
pub struct Receive {
    capture: Capture,
    receiving: bool,
}

impl Receive {
    pub fn new(settings: &CaptureSettings) -> Self {
        Self {
            capture: Capture::new(settings),
            receiving: false,
        }
    }

    /// Whether the ball is on its way and the capture has started.
    pub fn is_receiving(&self) -> bool {
        self.receiving
    }

    pub fn capture(&self) -> &Capture {
        &self.capture
    }

    pub fn is_done(&self) -> bool {
        self.capture.is_done()
    }

    pub fn update(&mut self, ctx: SkillCtx<'_>) -> SkillProgress {
        if !self.receiving && self.ball_incoming(ctx) {
            log::debug!("p{} receive: ball incoming", ctx.player.id);
            self.receiving = true;
        }
        if self.receiving {
            return self.capture.update(ctx);
        }

        let mut input = PlayerControlInput::new();
        input
            .with_position(ctx.player.position)
            .with_dribbling(ctx.settings.capture.dribbling_speed);
        if let Some(ball) = ctx.world.valid_ball() {
            input.with_yaw(Angle::between_points(ctx.player.position, ball.position));
        }
        SkillProgress::Continue(input)
    }

    fn ball_incoming(&self, ctx: SkillCtx<'_>) -> bool {
        let Some(ball) = ctx.world.valid_ball() else {
            return false;
        };
        let ball_to_player = ctx.player.position - ball.position;
        if ball_to_player.norm() < RECEIVE_DISTANCE {
            return true;
        }
        ball.speed() >= ctx.settings.capture.collect_speed_threshold
            && angle_between(ball.velocity, ball_to_player) < FRAC_PI_2
    }
}

#[cfg(test)]
mod tests {
    use stp_core::{BallData, ExecutorSettings, PlayerData, PlayerId, Vector2, WorldData};

    use super::*;

    fn ctx<'a>(
        player: &'a PlayerData,
        world: &'a WorldData,
        settings: &'a ExecutorSettings,
    ) -> SkillCtx<'a> {
        SkillCtx {
            player,
            world,
            settings,
        }
    }

    #[test]
    fn waits_for_ball() {
        let settings = ExecutorSettings::default();
        let player = PlayerData::new(PlayerId::new(1)).with_position(Vector2::new(3000.0, 0.0));
        // Fast, but moving away from us
        let world = WorldData {
            ball: Some(BallData::new(Vector2::zeros(), Vector2::new(-2000.0, 0.0))),
            ..Default::default()
        };
        let mut receive = Receive::new(&settings.capture);

        let SkillProgress::Continue(input) = receive.update(ctx(&player, &world, &settings)) else {
            panic!("receive never finishes");
        };
        assert!(!receive.is_receiving());
        assert_eq!(input.position, Some(Vector2::new(3000.0, 0.0)));
        assert_eq!(input.yaw, Some(Angle::PI));
    }

    #[test]
    fn starts_capture_when_ball_approaches() {
        let settings = ExecutorSettings::default();
        let player = PlayerData::new(PlayerId::new(1)).with_position(Vector2::new(3000.0, 0.0));
        let world = WorldData {
            ball: Some(BallData::new(Vector2::zeros(), Vector2::new(2000.0, 0.0))),
            ..Default::default()
        };
        let mut receive = Receive::new(&settings.capture);
        receive.update(ctx(&player, &world, &settings));
        assert!(receive.is_receiving());
        assert!(!receive.is_done());
    }

    #[test]
    fn done_when_capture_completes() {
        let settings = ExecutorSettings::default();
        let player = PlayerData::new(PlayerId::new(1)).with_breakbeam(true);
        let world = WorldData {
            ball: Some(BallData::new(Vector2::new(90.0, 0.0), Vector2::zeros())),
            ..Default::default()
        };
        let mut receive = Receive::new(&settings.capture);
        for _ in 0..100 {
            receive.update(ctx(&player, &world, &settings));
            if receive.is_done() {
                break;
            }
        }
        assert!(receive.is_done());
    }
}
