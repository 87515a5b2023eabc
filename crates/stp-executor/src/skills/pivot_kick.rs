use serde::Serialize;
use stp_core::{Angle, CaptureSettings, Vector2};

use super::{Capture, SkillCtx, SkillProgress, SkillResult};
use crate::control::{KickerControlInput, PlayerControlInput};

/// Heading error below which the player counts as aimed, in radians.
const AIM_TOLERANCE: f64 = 0.05;
/// Consecutive aimed cycles needed before kicking.
const AIM_FRAMES: u32 = 3;
/// Cycles to wait for the ball to leave the dribbler after the kick command.
const MAX_KICK_FRAMES: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PivotKickPhase {
    Capture,
    Aim,
    Kick,
    Done,
}

/// Gets the ball, turns around it until facing `target`, then kicks.
#[derive(Debug)]
pub struct PivotKick {
    target: Vector2,
    kick_speed: f64,
    phase: PivotKickPhase,
    capture: Capture,
    aimed_frames: u32,
    kick_frames: u32,
    result: Option<SkillResult>,
}

impl PivotKick {
    pub fn new(target: Vector2, kick_speed: f64, settings: &CaptureSettings) -> Self {
        Self {
            target,
            kick_speed,
            phase: PivotKickPhase::Capture,
            capture: Capture::new(settings),
            aimed_frames: 0,
            kick_frames: 0,
            result: None,
        }
    }

    pub fn target(&self) -> Vector2 {
        self.target
    }

    /// Retarget the kick. Takes effect while aiming; a kick already fired is not
    /// affected.
    pub fn set_target(&mut self, target: Vector2) {
        self.target = target;
    }

    pub fn phase(&self) -> PivotKickPhase {
        self.phase
    }

    pub fn capture(&self) -> &Capture {
        &self.capture
    }

    /// Whether the player is aimed and about to kick (or already has).
    pub fn is_ready(&self) -> bool {
        matches!(self.phase, PivotKickPhase::Kick | PivotKickPhase::Done)
    }

    pub fn is_done(&self) -> bool {
        self.phase == PivotKickPhase::Done
    }

    pub fn update(&mut self, ctx: SkillCtx<'_>) -> SkillProgress {
        match self.phase {
            PivotKickPhase::Capture => {
                let progress = self.capture.update(ctx);
                if self.capture.is_done() {
                    self.enter(PivotKickPhase::Aim, ctx);
                }
                progress
            }
            PivotKickPhase::Aim => {
                // Keep verifying possession while turning
                self.capture.update(ctx);
                if !self.capture.is_done() {
                    self.enter(PivotKickPhase::Capture, ctx);
                    return SkillProgress::Continue(self.pivot_input(ctx));
                }

                let heading = Angle::between_points(ctx.player.position, self.target);
                if (heading - ctx.player.yaw).abs() < AIM_TOLERANCE {
                    self.aimed_frames += 1;
                } else {
                    self.aimed_frames = 0;
                }

                let mut input = self.pivot_input(ctx);
                if self.aimed_frames >= AIM_FRAMES {
                    self.enter(PivotKickPhase::Kick, ctx);
                    input.with_kicker(KickerControlInput::Kick {
                        speed: self.kick_speed,
                    });
                    self.kick_frames = 1;
                } else {
                    input.with_kicker(KickerControlInput::Arm);
                }
                SkillProgress::Continue(input)
            }
            PivotKickPhase::Kick => {
                if !ctx.player.breakbeam_ball_detected {
                    return self.finish(SkillResult::Success, ctx);
                }
                if self.kick_frames >= MAX_KICK_FRAMES {
                    log::warn!("p{} pivot kick: ball did not leave", ctx.player.id);
                    return self.finish(SkillResult::Failure, ctx);
                }
                self.kick_frames += 1;

                let mut input = self.pivot_input(ctx);
                input.with_dribbling(0.0);
                input.with_kicker(KickerControlInput::Kick {
                    speed: self.kick_speed,
                });
                SkillProgress::Continue(input)
            }
            PivotKickPhase::Done => {
                SkillProgress::Done(self.result.unwrap_or(SkillResult::Failure))
            }
        }
    }

    /// Turn in place towards the target, holding the ball.
    fn pivot_input(&self, ctx: SkillCtx<'_>) -> PlayerControlInput {
        let mut input = PlayerControlInput::new();
        input
            .with_position(ctx.player.position)
            .with_yaw(Angle::between_points(ctx.player.position, self.target))
            .with_dribbling(ctx.settings.capture.dribbling_speed);
        input
    }

    fn finish(&mut self, result: SkillResult, ctx: SkillCtx<'_>) -> SkillProgress {
        self.result = Some(result);
        self.enter(PivotKickPhase::Done, ctx);
        SkillProgress::Done(result)
    }

    fn enter(&mut self, phase: PivotKickPhase, ctx: SkillCtx<'_>) {
        log::debug!(
            "p{} pivot kick: {:?} -> {:?}",
            ctx.player.id,
            self.phase,
            phase
        );
        self.phase = phase;
        self.aimed_frames = 0;
    }
}
