use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// How a single priority tier is resolved.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignmentMethod {
    /// Minimum-cost bipartite matching.
    #[default]
    Exact,
    /// Repeatedly take the cheapest remaining (request, player) pair.
    Greedy,
}

/// Settings for the role assigner.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AssignmentSettings {
    pub method: AssignmentMethod,
    /// Costs at or above this value make a player ineligible for a request.
    pub max_cost: f64,
    /// Granularity used when quantising costs for exact matching. Costs closer
    /// than this are considered equal and fall back to submission order.
    pub cost_resolution: f64,
}

impl Default for AssignmentSettings {
    fn default() -> Self {
        Self {
            method: AssignmentMethod::Exact,
            max_cost: 1e6,
            cost_resolution: 1e-3,
        }
    }
}

/// Settings for the ball capture state machine and its role cost.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureSettings {
    /// Upper bound of the "probably held" counter. The counter starts at half
    /// of this value.
    pub history_len: u32,
    /// Maximum number of frames spent in `Captured` before giving up.
    pub max_frames_in_captured: u32,
    /// Ball speed below which settling hands over to collecting, in mm/s.
    pub collect_speed_threshold: f64,
    /// Ball speed at or above which collecting goes back to settling, in mm/s.
    pub settle_speed_threshold: f64,
    /// Collecting only goes back to settling if the player is further than this
    /// from the ball, in mm.
    pub resettle_distance: f64,
    /// Collect is done once the breakbeam fires with the ball closer than this, in mm.
    pub collect_done_distance: f64,
    /// Scales the intercept time (seconds) into role cost for a fast ball.
    pub settle_cost_multiplier: f64,
    /// Scales distance to the ball (m) into role cost for a slow ball.
    pub position_cost_multiplier: f64,
    /// Added to the cost of any player other than the previous holder of the role.
    pub robot_change_cost: f64,
    /// Dribbler speed while settling and collecting, normalised to [0, 1].
    pub dribbling_speed: f64,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            history_len: 60,
            max_frames_in_captured: 20,
            collect_speed_threshold: 400.0,
            settle_speed_threshold: 500.0,
            resettle_distance: 300.0,
            collect_done_distance: 200.0,
            settle_cost_multiplier: 20.0,
            position_cost_multiplier: 30.0,
            robot_change_cost: 10.0,
            dribbling_speed: 1.0,
        }
    }
}

/// Motion limits used for time estimates.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionSettings {
    /// Maximum velocity of the robot in mm/s.
    pub max_speed: f64,
    /// Maximum acceleration of the robot in mm/s².
    pub max_acceleration: f64,
}

impl Default for MotionSettings {
    fn default() -> Self {
        Self {
            max_speed: 2000.0,
            max_acceleration: 700.0,
        }
    }
}

/// Settings for the executor.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorSettings {
    pub assignment: AssignmentSettings,
    pub capture: CaptureSettings,
    pub motion: MotionSettings,
}

impl ExecutorSettings {
    /// Load the executor settings from a file, or store the default settings if the
    /// file does not exist. A file that exists but cannot be parsed is left alone and
    /// the defaults are used.
    pub fn load_or_insert(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(settings) => Ok(settings),
                Err(err) => {
                    log::error!("Failed to parse executor settings: {}", err);
                    Ok(Self::default())
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                let settings = Self::default();
                settings.store(path)?;
                Ok(settings)
            }
            Err(err) => Err(err)
                .with_context(|| format!("Failed to read executor settings from {}", path.display())),
        }
    }

    /// Store the executor settings in the given file.
    pub fn store(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)
            .with_context(|| format!("Failed to write executor settings to {}", path.display()))
    }
}
