//! Anything that can take a turn: the planning AI or an input adapter.

mod ai;
mod human;

pub use ai::AiPlayer;
pub use human::HumanPlayer;

use crate::api::types::{Ball, BallGroup, Pocket, ShotCommand};
use crate::config::GameSettings;
use crate::error::PlanError;
use crate::planner::lookahead::SearchNode;

/// Everything a player may look at when asked to move.
#[derive(Debug, Clone)]
pub struct MoveContext<'a> {
    /// Index of the player being asked.
    pub player: usize,
    pub cue: Ball,
    /// Every ball on the table, cue included.
    pub balls: &'a [Ball],
    pub pockets: &'a [Pocket],
    /// The mover's group, then the opponent's.
    pub groups: [Option<BallGroup>; 2],
    /// Number of players in the game.
    pub players: usize,
    pub settings: &'a GameSettings,
}

impl MoveContext<'_> {
    /// The board as the search sees it, from the mover's point of view.
    pub fn search_node(&self) -> SearchNode {
        SearchNode::new(self.balls.to_vec(), self.cue, self.groups, self.players)
    }
}

/// A participant in the game.
pub trait Player {
    fn name(&self) -> &str;

    /// Choose the next shot.
    fn make_move(&mut self, ctx: &MoveContext<'_>) -> Result<ShotCommand, PlanError>;
}
