use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Number painted on a ball. 0 is the cue ball, 8 the special ball.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BallNumber(pub u8);

impl BallNumber {
    pub const CUE: BallNumber = BallNumber(0);
    pub const EIGHT: BallNumber = BallNumber(8);

    pub fn is_cue(self) -> bool {
        self == Self::CUE
    }

    pub fn is_eight(self) -> bool {
        self == Self::EIGHT
    }

    /// The group this ball belongs to. The cue ball has none; the 8-ball is
    /// the singleton `Locked` group.
    pub fn group(self) -> Option<BallGroup> {
        match self.0 {
            1..=7 => Some(BallGroup::Solids),
            8 => Some(BallGroup::Locked),
            9..=15 => Some(BallGroup::Stripes),
            _ => None,
        }
    }
}

impl std::fmt::Display for BallNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_cue() {
            write!(f, "cue")
        } else {
            write!(f, "#{}", self.0)
        }
    }
}

/// Ball group a player may legally target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BallGroup {
    Solids,
    Stripes,
    /// Only the 8-ball remains legal.
    Locked,
}

impl BallGroup {
    const SOLIDS: [BallNumber; 7] = [
        BallNumber(1), BallNumber(2), BallNumber(3), BallNumber(4),
        BallNumber(5), BallNumber(6), BallNumber(7),
    ];
    const STRIPES: [BallNumber; 7] = [
        BallNumber(9), BallNumber(10), BallNumber(11), BallNumber(12),
        BallNumber(13), BallNumber(14), BallNumber(15),
    ];
    const LOCKED: [BallNumber; 1] = [BallNumber::EIGHT];

    /// All balls of this group, in ascending order.
    pub fn members(self) -> &'static [BallNumber] {
        match self {
            BallGroup::Solids => &Self::SOLIDS,
            BallGroup::Stripes => &Self::STRIPES,
            BallGroup::Locked => &Self::LOCKED,
        }
    }

    /// The opposing group. `Locked` has no opposite and maps to itself.
    pub fn other(self) -> BallGroup {
        match self {
            BallGroup::Solids => BallGroup::Stripes,
            BallGroup::Stripes => BallGroup::Solids,
            BallGroup::Locked => BallGroup::Locked,
        }
    }
}

/// Read-only snapshot of a ball on the table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub number: BallNumber,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub mass: f32,
    /// Linear drag coefficient: the ball decelerates at `drag / mass * speed`.
    pub drag: f32,
}

impl Ball {
    pub fn new(number: BallNumber, pos: Vec2, radius: f32, mass: f32, drag: f32) -> Self {
        Self {
            number,
            pos,
            vel: Vec2::ZERO,
            radius,
            mass,
            drag,
        }
    }

    pub fn with_vel(mut self, vel: Vec2) -> Self {
        self.vel = vel;
        self
    }

    pub fn speed(&self) -> f32 {
        self.vel.length()
    }
}

/// A pocket. Created once at table setup and never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pocket {
    pub pos: Vec2,
    /// Balls whose center comes within this distance are captured.
    pub radius: f32,
    /// Aim point, inset from the rim toward the table.
    pub target: Vec2,
}

impl Pocket {
    /// Build a pocket whose aim point sits `inset` units from `pos` toward `toward`.
    pub fn inset_toward(pos: Vec2, radius: f32, inset: f32, toward: Vec2) -> Self {
        let dir = (toward - pos).normalize_or_zero();
        Self {
            pos,
            radius,
            target: pos + dir * inset,
        }
    }
}

/// A force submitted to the physics collaborator for the cue ball.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShotCommand {
    /// Where the force is applied (the cue ball's current position).
    pub position: Vec2,
    pub force: Vec2,
}
