use serde::Serialize;
use stp_core::{Angle, CaptureSettings, PlayerData, WorldData};

use super::{Collect, Settle, SkillCtx, SkillProgress, SkillResult};
use crate::control::PlayerControlInput;

/// States of the ball capture state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CaptureState {
    /// Nothing decided yet
    Start,
    /// Intercept the moving ball
    Settle,
    /// Fine approach onto a slow ball
    Collect,
    /// The sensor says we may have the ball; verifying before trusting it
    Captured,
    /// We have the ball
    Completed,
}

/// What the state machine looks at in one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CaptureObservation {
    /// Whether a player is bound to the role
    pub player_bound: bool,
    /// Instantaneous "holding the ball" sensor reading
    pub ball_sensed: bool,
    /// Speed of the ball in mm/s, zero if the ball is not detected
    pub ball_speed: f64,
    /// Distance between player and ball in mm, if both are known
    pub distance_to_ball: Option<f64>,
    /// Whether the collect sub-behavior reported done this cycle
    pub collect_done: bool,
}

impl CaptureObservation {
    pub fn observe(player: Option<&PlayerData>, world: &WorldData) -> Self {
        let ball = world.valid_ball();
        Self {
            player_bound: player.is_some(),
            ball_sensed: player.map_or(false, |p| p.breakbeam_ball_detected),
            ball_speed: world.ball_speed(),
            distance_to_ball: player
                .zip(ball)
                .map(|(p, b)| (p.position - b.position).norm()),
            collect_done: false,
        }
    }
}

/// A state change, with the reason it fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CaptureTransition {
    pub from: CaptureState,
    pub to: CaptureState,
    pub label: &'static str,
}

struct TransitionRule {
    from: CaptureState,
    to: CaptureState,
    label: &'static str,
    condition: fn(&Capture, &CaptureObservation) -> bool,
}

/// Evaluated in order every cycle; the first rule leaving the current state whose
/// condition holds fires.
const TRANSITIONS: [TransitionRule; 8] = [
    TransitionRule {
        from: CaptureState::Start,
        to: CaptureState::Settle,
        label: "dont have ball",
        condition: |_, obs| !obs.player_bound || !obs.ball_sensed,
    },
    TransitionRule {
        from: CaptureState::Start,
        to: CaptureState::Captured,
        label: "may already have ball",
        condition: |_, obs| obs.player_bound && obs.ball_sensed,
    },
    TransitionRule {
        from: CaptureState::Captured,
        to: CaptureState::Settle,
        label: "actually dont have ball",
        condition: |capture, _| {
            capture.probably_not_held()
                || capture.frames_in_captured > capture.settings.max_frames_in_captured
        },
    },
    TransitionRule {
        from: CaptureState::Captured,
        to: CaptureState::Completed,
        label: "actually have ball",
        condition: |capture, _| capture.probably_held(),
    },
    TransitionRule {
        from: CaptureState::Settle,
        to: CaptureState::Collect,
        label: "collecting",
        condition: |capture, obs| obs.ball_speed < capture.settings.collect_speed_threshold,
    },
    TransitionRule {
        from: CaptureState::Collect,
        to: CaptureState::Settle,
        label: "settling again",
        condition: |capture, obs| {
            obs.ball_speed >= capture.settings.settle_speed_threshold
                && obs
                    .distance_to_ball
                    .map_or(false, |d| d > capture.settings.resettle_distance)
        },
    },
    TransitionRule {
        from: CaptureState::Collect,
        to: CaptureState::Completed,
        label: "captured",
        condition: |_, obs| obs.collect_done,
    },
    TransitionRule {
        from: CaptureState::Completed,
        to: CaptureState::Settle,
        label: "lost ball",
        condition: |capture, _| capture.probably_not_held(),
    },
];

/// The sub-behavior driving the player in `Settle` and `Collect`.
#[derive(Debug)]
enum SubBehavior {
    Settler(Settle),
    Collector(Collect),
}

impl SubBehavior {
    fn name(&self) -> &'static str {
        match self {
            SubBehavior::Settler(_) => "settler",
            SubBehavior::Collector(_) => "collector",
        }
    }
}

/// Gets the ball under control and decides, from a noisy breakbeam sensor, whether
/// we actually hold it.
///
/// The decision uses a bounded counter that moves one step per cycle towards
/// "held" or "not held". The machine only commits once the counter leaves the dead
/// zone between 40% and 60% of `history_len`, so a sensor flickering around 50%
/// cannot make it flap. A sensor stuck in the dead zone is cut off after
/// `max_frames_in_captured` cycles.
///
/// The capture never finishes by itself: in `Completed` it keeps verifying and
/// falls back to `Settle` if the ball is lost.
#[derive(Debug)]
pub struct Capture {
    settings: CaptureSettings,
    state: CaptureState,
    /// In `[0, history_len]`
    probably_held_count: u32,
    frames_in_captured: u32,
    sub: Option<SubBehavior>,
}

impl Capture {
    pub fn new(settings: &CaptureSettings) -> Self {
        Self {
            settings: settings.clone(),
            state: CaptureState::Start,
            probably_held_count: settings.history_len / 2,
            frames_in_captured: 0,
            sub: None,
        }
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn probably_held_count(&self) -> u32 {
        self.probably_held_count
    }

    pub fn frames_in_captured(&self) -> u32 {
        self.frames_in_captured
    }

    /// Name of the active sub-behavior, if any.
    pub fn sub_behavior(&self) -> Option<&'static str> {
        self.sub.as_ref().map(SubBehavior::name)
    }

    pub fn is_done(&self) -> bool {
        self.state == CaptureState::Completed
    }

    pub fn update(&mut self, ctx: SkillCtx<'_>) -> SkillProgress {
        let mut collect_done = false;
        let input = match self.sub.as_mut() {
            Some(SubBehavior::Settler(settle)) => match settle.update(ctx) {
                SkillProgress::Continue(input) => input,
                SkillProgress::Done(_) => hold_input(ctx, &self.settings),
            },
            Some(SubBehavior::Collector(collect)) => match collect.update(ctx) {
                SkillProgress::Continue(input) => input,
                SkillProgress::Done(result) => {
                    collect_done = result == SkillResult::Success;
                    hold_input(ctx, &self.settings)
                }
            },
            None => hold_input(ctx, &self.settings),
        };

        let mut observation = CaptureObservation::observe(Some(ctx.player), ctx.world);
        observation.collect_done = collect_done;
        if let Some(transition) = self.step(&observation) {
            log::debug!(
                "p{} capture: {:?} -> {:?} ({})",
                ctx.player.id,
                transition.from,
                transition.to,
                transition.label
            );
        }

        SkillProgress::Continue(input)
    }

    /// Run one cycle of the state machine: update the counters of the current
    /// state, then take at most one transition.
    pub fn step(&mut self, observation: &CaptureObservation) -> Option<CaptureTransition> {
        match self.state {
            CaptureState::Captured => {
                self.update_held_count(observation);
                self.frames_in_captured += 1;
            }
            CaptureState::Completed => self.update_held_count(observation),
            _ => {}
        }

        let rule = TRANSITIONS
            .iter()
            .find(|rule| rule.from == self.state && (rule.condition)(self, observation))?;
        let transition = CaptureTransition {
            from: rule.from,
            to: rule.to,
            label: rule.label,
        };
        self.enter(rule.to);
        Some(transition)
    }

    fn enter(&mut self, state: CaptureState) {
        self.state = state;
        match state {
            CaptureState::Settle => self.sub = Some(SubBehavior::Settler(Settle::new())),
            CaptureState::Collect => self.sub = Some(SubBehavior::Collector(Collect::new())),
            CaptureState::Captured => {
                self.frames_in_captured = 0;
                self.sub = None;
            }
            CaptureState::Completed => {
                self.probably_held_count = self.settings.history_len / 2;
                self.sub = None;
            }
            CaptureState::Start => self.sub = None,
        }
    }

    fn update_held_count(&mut self, observation: &CaptureObservation) {
        if !observation.player_bound {
            return;
        }
        if observation.ball_sensed {
            self.probably_held_count = self
                .probably_held_count
                .saturating_add(1)
                .min(self.settings.history_len);
        } else {
            self.probably_held_count = self.probably_held_count.saturating_sub(1);
        }
    }

    /// Counter below 40% of the history.
    fn probably_not_held(&self) -> bool {
        u64::from(self.probably_held_count) * 10 < u64::from(self.settings.history_len) * 4
    }

    /// Counter above 60% of the history.
    fn probably_held(&self) -> bool {
        u64::from(self.probably_held_count) * 10 > u64::from(self.settings.history_len) * 6
    }
}

/// Stay put facing the ball with the dribbler running.
fn hold_input(ctx: SkillCtx<'_>, settings: &CaptureSettings) -> PlayerControlInput {
    let mut input = PlayerControlInput::new();
    input.with_dribbling(settings.dribbling_speed);
    if let Some(ball) = ctx.world.valid_ball() {
        input.with_yaw(Angle::between_points(ctx.player.position, ball.position));
    }
    input
}
