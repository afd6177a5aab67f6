//! Tunable settings for the table, the physics calibration, the planner and
//! the rules. Every constant the engine depends on lives here.
//!
//! Several calibration values (force normalization, drag rate, stroke length)
//! were tuned against the bundled rapier2d table. Re-tune them when driving a
//! different physics engine.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::api::types::Pocket;
use crate::error::ConfigError;

/// Table width in meters.
pub const TABLE_WIDTH_M: f32 = 2.7;
/// Table height in meters (half the width).
pub const TABLE_HEIGHT_M: f32 = TABLE_WIDTH_M / 2.0;
/// Table width in pixels.
pub const WIDTH: f32 = 800.0;
/// Pixels per meter.
pub const PPM: f32 = WIDTH / TABLE_WIDTH_M;
/// Table height in pixels.
pub const HEIGHT: f32 = TABLE_HEIGHT_M * PPM;
/// Regulation ball diameter is 57.15 mm.
pub const BALL_RADIUS: f32 = (0.05715 * PPM) / 2.0;

/// Which kind of match to set up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameType {
    /// Caller supplies the players directly.
    Tests,
    /// One AI plays by itself.
    SingleAi,
    /// Two AIs play against each other.
    DoubleAi,
}

impl GameType {
    pub fn player_count(self) -> Option<usize> {
        match self {
            GameType::Tests => None,
            GameType::SingleAi => Some(1),
            GameType::DoubleAi => Some(2),
        }
    }
}

/// Table dimensions and fixed layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    pub width: f32,
    pub height: f32,
    pub ball_radius: f32,
    /// Capture radius of every pocket.
    pub pocket_radius: f32,
    /// Distance of a pocket's aim point from its center, toward the table.
    pub pocket_target_inset: f32,
    /// Cue ball start position and re-spot after a scratch.
    pub cue_spot: Vec2,
    /// Position of the rack apex.
    pub rack_apex: Vec2,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            width: WIDTH,
            height: HEIGHT,
            ball_radius: BALL_RADIUS,
            pocket_radius: BALL_RADIUS * 1.8,
            pocket_target_inset: BALL_RADIUS,
            cue_spot: Vec2::new(WIDTH / 4.0, HEIGHT / 2.0),
            rack_apex: Vec2::new(3.0 * WIDTH / 4.0, HEIGHT / 2.0),
        }
    }
}

impl TableConfig {
    /// The six pockets: four corners, then the two side pockets on the long rails.
    pub fn pockets(&self) -> [Pocket; 6] {
        let (w, h) = (self.width, self.height);
        let center = Vec2::new(w / 2.0, h / 2.0);
        let make = |pos: Vec2, toward: Vec2| {
            Pocket::inset_toward(pos, self.pocket_radius, self.pocket_target_inset, toward)
        };
        [
            make(Vec2::new(0.0, 0.0), center),
            make(Vec2::new(w, 0.0), center),
            make(Vec2::new(0.0, h), center),
            make(Vec2::new(w, h), center),
            // Side pocket targets move straight in, not diagonally.
            make(Vec2::new(w / 2.0, 0.0), Vec2::new(w / 2.0, h)),
            make(Vec2::new(w / 2.0, h), Vec2::new(w / 2.0, 0.0)),
        ]
    }

    /// Whether a ball center at `pos` lies on the playing surface.
    pub fn contains(&self, pos: Vec2) -> bool {
        pos.x >= 0.0 && pos.x <= self.width && pos.y >= 0.0 && pos.y <= self.height
    }
}

/// Physics calibration shared by the planner's model and the simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Calibration {
    pub ball_mass: f32,
    /// Linear damping rate (1/s). The drag coefficient is `drag_rate * ball_mass`.
    pub drag_rate: f32,
    pub restitution: f32,
    pub friction: f32,
    /// Distance over which the cue stick pushes the cue ball.
    pub stroke_length: f32,
    /// Raw stroke forces are divided by this before submission.
    pub force_normalization: f32,
    /// Largest normalized force a shot may carry.
    pub max_force: f32,
    /// Normalized force of the break, applied along +x.
    pub break_force: f32,
    /// Every ball below this speed counts as at rest.
    pub speed_threshold: f32,
    pub fixed_dt: f32,
    /// Physics steps per fixed tick.
    pub substeps: u32,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            ball_mass: 1.0,
            drag_rate: 0.9,
            restitution: 0.92,
            friction: 0.0001,
            stroke_length: 20.0,
            force_normalization: 1.0e5,
            max_force: 0.5,
            break_force: 0.2,
            speed_threshold: 3.0,
            fixed_dt: 1.0 / 60.0,
            substeps: 4,
        }
    }
}

impl Calibration {
    /// Drag coefficient for a ball of the calibrated mass.
    pub fn drag(&self) -> f32 {
        self.drag_rate * self.ball_mass
    }
}

/// Shot planner knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Expectimax depth. 0 uses the single-shot selector directly.
    pub lookahead_depth: u32,
    /// Multiplier on the speed that would stop the object ball exactly on the
    /// pocket target, so it still rolls in after losing energy in the hit.
    pub speed_margin: f32,
    /// Obstruction clearance, in ball radii.
    pub clearance_radii: f32,
    /// Cut angles at or beyond this are not playable.
    pub max_deviation_deg: f32,
    /// Plan against every object ball when the own group has no legal shot.
    pub fallback_any_ball: bool,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            lookahead_depth: 0,
            speed_margin: 1.25,
            clearance_radii: 2.0,
            max_deviation_deg: 90.0,
            fallback_any_ball: true,
        }
    }
}

/// Match-level limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Turns after which a game is abandoned.
    pub max_turns: u32,
    /// Ticks a single shot may keep balls moving before the game is abandoned.
    pub max_ticks_per_shot: u32,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            max_turns: 200,
            max_ticks_per_shot: 60 * 60,
        }
    }
}

/// All settings for one game.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    pub table: TableConfig,
    pub calibration: Calibration,
    pub planner: PlannerConfig,
    pub rules: RulesConfig,
}

impl GameSettings {
    /// Parse settings from a JSON string. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}
