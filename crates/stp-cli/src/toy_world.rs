use rand::{rngs::StdRng, Rng, SeedableRng};
use stp_core::{
    Angle, BallData, MotionSettings, PlayerData, PlayerId, Vector2, WorldData, BALL_RADIUS,
    PLAYER_RADIUS,
};
use stp_executor::{KickerControlInput, PlayerControlInput, PlayerInputs};

/// Rolling friction of a free ball, in mm/s^2.
const BALL_DECELERATION: f64 = 300.0;
/// rad/s
const MAX_TURN_RATE: f64 = 6.0;
/// Distance between player and ball centres at which the breakbeam sees the ball.
const BREAKBEAM_REACH: f64 = PLAYER_RADIUS + BALL_RADIUS + 15.0;
/// Half-width of the dribbler opening, in radians.
const BREAKBEAM_CONE: f64 = 0.4;
/// A kicked ball cannot be caught again for this long, in seconds.
const KICK_COOLDOWN: f64 = 0.3;

#[derive(Debug, Clone)]
struct ToyPlayer {
    id: PlayerId,
    position: Vector2,
    velocity: Vector2,
    yaw: Angle,
    breakbeam: bool,
}

impl ToyPlayer {
    fn sees(&self, ball: Vector2) -> bool {
        let to_ball = ball - self.position;
        to_ball.norm() <= BREAKBEAM_REACH
            && (Angle::of_vector(to_ball) - self.yaw).abs() <= BREAKBEAM_CONE
    }
}

#[derive(Debug, Clone)]
struct ToyBall {
    position: Vector2,
    velocity: Vector2,
    held_by: Option<PlayerId>,
    last_kick: Option<f64>,
}

/// A minimal kinematic stand-in for perception and actuation.
///
/// Players accelerate towards their target position and turn towards their target
/// heading within the motion limits. A dribbling player that touches the ball with
/// its front picks it up; a kick launches it along the player's heading. The
/// breakbeam reading handed to the controller can be made noisy.
pub struct ToyWorld {
    t: f64,
    players: Vec<ToyPlayer>,
    ball: Option<ToyBall>,
    motion: MotionSettings,
    sensor_noise: f64,
    rng: StdRng,
}

impl ToyWorld {
    pub fn new(motion: MotionSettings, sensor_noise: f64, seed: u64) -> Self {
        Self {
            t: 0.0,
            players: Vec::new(),
            ball: None,
            motion,
            sensor_noise: sensor_noise.clamp(0.0, 1.0),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn add_player(&mut self, id: u32, position: Vector2, yaw: Angle) -> &mut Self {
        self.players.push(ToyPlayer {
            id: PlayerId::new(id),
            position,
            velocity: Vector2::zeros(),
            yaw,
            breakbeam: false,
        });
        self
    }

    pub fn set_ball(&mut self, position: Vector2, velocity: Vector2) -> &mut Self {
        self.ball = Some(ToyBall {
            position,
            velocity,
            held_by: None,
            last_kick: None,
        });
        self
    }

    pub fn time(&self) -> f64 {
        self.t
    }

    /// Which player holds the ball, if any.
    pub fn ball_holder(&self) -> Option<PlayerId> {
        self.ball.as_ref().and_then(|ball| ball.held_by)
    }

    /// What perception would report right now.
    pub fn snapshot(&mut self, dt: f64) -> WorldData {
        let own_players = self
            .players
            .iter()
            .map(|player| {
                let flip = self.sensor_noise > 0.0 && self.rng.gen_bool(self.sensor_noise);
                PlayerData::new(player.id)
                    .with_position(player.position)
                    .with_velocity(player.velocity)
                    .with_yaw(player.yaw)
                    .with_breakbeam(player.breakbeam != flip)
            })
            .collect();
        WorldData {
            t_received: self.t,
            dt,
            own_players,
            ball: self
                .ball
                .as_ref()
                .map(|ball| BallData::new(ball.position, ball.velocity)),
        }
    }

    /// Advance by `dt` seconds, applying the given inputs. Players without an input
    /// brake to a stop.
    pub fn step(&mut self, dt: f64, inputs: &PlayerInputs) {
        let idle = PlayerControlInput::new();
        for player in self.players.iter_mut() {
            let input = inputs.get(player.id).unwrap_or(&idle);
            move_player(player, input, &self.motion, dt);
        }
        self.step_ball(dt, inputs);
        self.t += dt;

        for player in self.players.iter_mut() {
            player.breakbeam = self.ball.as_ref().map_or(false, |ball| {
                ball.held_by == Some(player.id) || player.sees(ball.position)
            });
        }
    }

    fn step_ball(&mut self, dt: f64, inputs: &PlayerInputs) {
        let t = self.t;
        let Some(ball) = self.ball.as_mut() else {
            return;
        };

        if let Some(holder_id) = ball.held_by {
            let holder = self.players.iter().find(|p| p.id == holder_id);
            let input = inputs.get(holder_id);
            match (holder, input) {
                (Some(holder), Some(input)) if input.dribbling_speed > 0.0 || is_kick(input) => {
                    let front = holder.yaw.to_vector();
                    ball.position = holder.position + front * (PLAYER_RADIUS + BALL_RADIUS);
                    ball.velocity = holder.velocity;
                    if let KickerControlInput::Kick { speed } = input.kicker {
                        ball.velocity = holder.velocity + front * speed;
                        ball.held_by = None;
                        ball.last_kick = Some(t);
                    }
                    return;
                }
                _ => ball.held_by = None,
            }
        }

        let speed = ball.velocity.norm();
        if speed > 0.0 {
            let new_speed = (speed - BALL_DECELERATION * dt).max(0.0);
            ball.velocity *= new_speed / speed;
        }
        ball.position += ball.velocity * dt;

        let cooling_down = ball.last_kick.map_or(false, |kick| t - kick < KICK_COOLDOWN);
        if cooling_down {
            return;
        }
        let catcher = self.players.iter().find(|player| {
            let dribbling = inputs
                .get(player.id)
                .map_or(false, |input| input.dribbling_speed > 0.0);
            dribbling && player.sees(ball.position)
        });
        if let Some(player) = catcher {
            ball.held_by = Some(player.id);
            ball.velocity = player.velocity;
        }
    }
}

fn is_kick(input: &PlayerControlInput) -> bool {
    matches!(input.kicker, KickerControlInput::Kick { .. })
}

fn move_player(player: &mut ToyPlayer, input: &PlayerControlInput, motion: &MotionSettings, dt: f64) {
    let mut desired = input.velocity;
    if let Some(target) = input.position {
        let to_target = target - player.position;
        let distance = to_target.norm();
        if distance > 1.0 {
            // Fastest speed from which we can still brake before the target
            let speed = motion
                .max_speed
                .min((2.0 * motion.max_acceleration * distance).sqrt());
            desired += to_target / distance * speed;
        }
    }

    let dv = desired - player.velocity;
    let max_dv = motion.max_acceleration * dt;
    player.velocity += if dv.norm() > max_dv {
        dv * (max_dv / dv.norm())
    } else {
        dv
    };
    if player.velocity.norm() > motion.max_speed {
        player.velocity *= motion.max_speed / player.velocity.norm();
    }
    player.position += player.velocity * dt;

    if let Some(target_yaw) = input.yaw {
        let error = (target_yaw - player.yaw).radians();
        let max_turn = MAX_TURN_RATE * dt;
        player.yaw = player.yaw + Angle::from_radians(error.clamp(-max_turn, max_turn));
    }
}
