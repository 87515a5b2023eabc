use stp_core::Angle;

use super::{SkillCtx, SkillProgress};
use crate::control::PlayerControlInput;

/// Fine approach onto a slow ball. Done once the breakbeam fires with the ball
/// within `collect_done_distance`; stays done afterwards.
#[derive(Debug, Clone, Default)]
pub struct Collect {
    done: bool,
}

impl Collect {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn update(&mut self, ctx: SkillCtx<'_>) -> SkillProgress {
        if self.done {
            return SkillProgress::success();
        }

        let mut input = PlayerControlInput::new();
        input.with_dribbling(1.0).with_collect();

        if let Some(ball) = ctx.world.valid_ball() {
            let distance = (ball.position - ctx.player.position).norm();
            if ctx.player.breakbeam_ball_detected
                && distance <= ctx.settings.capture.collect_done_distance
            {
                self.done = true;
                return SkillProgress::success();
            }
            input.with_position(ball.position);
            input.with_yaw(Angle::between_points(ctx.player.position, ball.position));
        }

        SkillProgress::Continue(input)
    }
}
