use crate::api::types::{Ball, ShotCommand};
use crate::config::GameSettings;
use crate::error::PlanError;
use crate::planner::lookahead::{Lookahead, SearchNode};
use crate::planner::shot::{Shot, ShotPlanner};
use crate::players::{MoveContext, Player};

/// Computer player backed by the shot selector, optionally through the
/// expectimax search.
pub struct AiPlayer {
    name: String,
    planner: ShotPlanner,
}

impl AiPlayer {
    pub fn new(name: impl Into<String>, settings: &GameSettings) -> Self {
        Self {
            name: name.into(),
            planner: ShotPlanner::new(settings),
        }
    }

    pub fn with_depth(mut self, depth: u32) -> Self {
        self.planner.config.lookahead_depth = depth;
        self
    }

    pub fn depth(&self) -> u32 {
        self.planner.config.lookahead_depth
    }

    /// Plan against the mover's own targets.
    fn plan(&self, node: &SearchNode, ctx: &MoveContext<'_>) -> Result<Shot, PlanError> {
        let depth = self.depth();
        if depth > 0 {
            let (score, shot) = Lookahead::new(&self.planner, ctx.pockets).best_action(node, depth);
            log::debug!("{}: lookahead depth {} expects {:.3}", self.name, depth, score);
            return shot.ok_or(PlanError::NoLegalShot);
        }
        self.planner
            .select_best_shot(&ctx.cue, &node.targets(0), ctx.pockets, ctx.balls)
    }

    /// Best-effort shot at any object ball except the 8.
    fn plan_any_ball(&self, node: &SearchNode, ctx: &MoveContext<'_>) -> Result<Shot, PlanError> {
        let others: Vec<Ball> = node
            .balls
            .iter()
            .filter(|b| !b.number.is_eight())
            .copied()
            .collect();
        self.planner
            .select_best_shot(&ctx.cue, &others, ctx.pockets, ctx.balls)
    }
}

impl Player for AiPlayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn make_move(&mut self, ctx: &MoveContext<'_>) -> Result<ShotCommand, PlanError> {
        let node = ctx.search_node();
        let shot = match self.plan(&node, ctx) {
            Ok(shot) => shot,
            Err(PlanError::NoLegalShot) if self.planner.config.fallback_any_ball => {
                log::warn!("{}: no legal shot at own group, playing any ball", self.name);
                self.plan_any_ball(&node, ctx)?
            }
            Err(e) => return Err(e),
        };

        log::info!(
            "{} aims {} at pocket {} (cut {:.1} deg, {} in the way)",
            self.name,
            shot.ball,
            shot.pocket,
            shot.deviation_deg(),
            shot.obstructions
        );
        Ok(shot.command(ctx.cue.pos))
    }
}
