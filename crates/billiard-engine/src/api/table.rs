use glam::Vec2;

use crate::api::types::{Ball, BallNumber, Pocket};

/// The physics collaborator as the rules and players see it.
///
/// The engine only reads snapshots. The only way it changes physics state is
/// by submitting a force or re-spotting the cue ball after a scratch.
pub trait Table {
    /// Every ball still on the table, cue included. Pocketed balls are gone.
    fn balls_on_table(&self) -> Vec<Ball>;

    fn pockets(&self) -> &[Pocket];

    /// Apply `force` to `ball`, struck at `position`.
    fn apply_force(&mut self, ball: BallNumber, position: Vec2, force: Vec2);

    /// Put the cue ball back on the table at (or as near as possible to) `position`.
    fn place_cue(&mut self, position: Vec2);

    fn cue(&self) -> Option<Ball> {
        self.balls_on_table().into_iter().find(|b| b.number.is_cue())
    }

    /// Whether every ball on the table moves slower than `threshold`.
    fn balls_at_rest(&self, threshold: f32) -> bool {
        self.balls_on_table().iter().all(|b| b.speed() < threshold)
    }
}

/// A table that can be stepped tick by tick.
pub trait Simulation: Table {
    /// Advance one fixed tick. Returns the balls that dropped into a pocket
    /// during the tick, in the order they were detected.
    fn step(&mut self) -> Vec<BallNumber>;
}
