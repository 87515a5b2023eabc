use stp_core::{math::nearest_point_on_line, Angle, Vector2};

use super::{SkillCtx, SkillProgress};
use crate::control::PlayerControlInput;

/// How far ahead of a ball moving away from us we aim, in seconds of ball travel.
const CHASE_LOOKAHEAD: f64 = 0.5;

/// Intercepts a moving ball by driving to the point on its path closest to the
/// player, with the dribbler running. Never finishes on its own.
#[derive(Debug, Clone, Default)]
pub struct Settle {
    last_target: Option<Vector2>,
}

impl Settle {
    pub fn new() -> Self {
        Self::default()
    }

    /// The point the player was last sent to.
    pub fn last_target(&self) -> Option<Vector2> {
        self.last_target
    }

    pub fn update(&mut self, ctx: SkillCtx<'_>) -> SkillProgress {
        let mut input = PlayerControlInput::new();
        input.with_dribbling(ctx.settings.capture.dribbling_speed);

        let Some(ball) = ctx.world.valid_ball() else {
            // Keep going where we were headed until the ball shows up again
            if let Some(target) = self.last_target {
                input.with_position(target);
            }
            return SkillProgress::Continue(input);
        };

        let player_pos = ctx.player.position;
        let intercept = nearest_point_on_line(ball.position, ball.velocity, player_pos);
        let target = if (intercept - ball.position).dot(&ball.velocity) > 0.0 {
            intercept
        } else {
            // The ball is moving away, chase it
            ball.position + ball.velocity * CHASE_LOOKAHEAD
        };
        self.last_target = Some(target);

        input.with_position(target);
        input.with_yaw(Angle::between_points(player_pos, ball.position));
        SkillProgress::Continue(input)
    }
}
