//! Shallow expectimax over simplified board states.
//!
//! Each candidate shot branches into a success outcome (object ball gone,
//! same agent shoots again) and a failure outcome (board unchanged, turn
//! passes), weighted by `1 - deviation / max_deviation`. Agent 0 maximizes,
//! agent 1 minimizes, and both are scored from the root player's perspective.

use crate::api::types::{Ball, BallGroup, BallNumber, Pocket};
use crate::planner::shot::{Shot, ShotPlanner};

/// Score of a position where the perspective player has legally potted the 8-ball.
pub const WIN_SCORE: f32 = 100.0;

/// Simplified board used by the search.
#[derive(Debug, Clone)]
pub struct SearchNode {
    /// Object balls still on the table.
    pub balls: Vec<Ball>,
    pub cue: Ball,
    /// Group owned by each agent. `None` until the first ball is potted.
    pub groups: [Option<BallGroup>; 2],
    /// Agent to shoot: 0 is the player searching, 1 the opponent.
    pub agent: usize,
    /// 1 for solo play (the turn never leaves agent 0), otherwise 2.
    pub agents: usize,
    /// Set once an agent pots the 8-ball.
    pub winner: Option<usize>,
}

impl SearchNode {
    pub fn new(balls: Vec<Ball>, cue: Ball, groups: [Option<BallGroup>; 2], agents: usize) -> Self {
        Self {
            balls: balls.into_iter().filter(|b| !b.number.is_cue()).collect(),
            cue,
            groups,
            agent: 0,
            agents: agents.clamp(1, 2),
            winner: None,
        }
    }

    /// Balls `agent` may legally aim at.
    pub fn targets(&self, agent: usize) -> Vec<Ball> {
        let own: Vec<Ball> = match self.groups[agent] {
            Some(BallGroup::Locked) => Vec::new(),
            Some(group) => self
                .balls
                .iter()
                .filter(|b| b.number.group() == Some(group))
                .copied()
                .collect(),
            None => self
                .balls
                .iter()
                .filter(|b| !b.number.is_eight())
                .copied()
                .collect(),
        };
        if own.is_empty() {
            self.balls.iter().filter(|b| b.number.is_eight()).copied().collect()
        } else {
            own
        }
    }

    /// Balls of `agent`'s group still on the table. Before assignment every
    /// non-8 ball counts.
    pub fn own_remaining(&self, agent: usize) -> usize {
        match self.groups[agent] {
            Some(BallGroup::Locked) => 0,
            Some(group) => self.count(|n| n.group() == Some(group)),
            None => self.count(|n| !n.is_eight()),
        }
    }

    fn count(&self, pred: impl Fn(BallNumber) -> bool) -> usize {
        self.balls.iter().filter(|b| pred(b.number)).count()
    }

    fn pass_turn(&mut self) {
        self.agent = (self.agent + 1) % self.agents;
    }

    /// The outcome where `shot` goes in.
    pub fn after_success(&self, shot: &Shot) -> SearchNode {
        let mut next = self.clone();
        next.balls.retain(|b| b.number != shot.ball);
        next.cue.pos = shot.cue_after;
        if shot.ball.is_eight() {
            next.winner = Some(self.agent);
            return next;
        }
        if next.groups[self.agent].is_none() {
            if let Some(group) = shot.ball.group() {
                next.groups[self.agent] = Some(group);
                next.groups[1 - self.agent] = Some(group.other());
            }
        }
        next
    }

    /// The outcome where `shot` misses.
    pub fn after_failure(&self, shot: &Shot) -> SearchNode {
        let mut next = self.clone();
        next.cue.pos = shot.cue_after;
        next.pass_turn();
        next
    }

    fn all_balls(&self) -> Vec<Ball> {
        let mut all = Vec::with_capacity(self.balls.len() + 1);
        all.push(self.cue);
        all.extend_from_slice(&self.balls);
        all
    }
}

/// Static position score, from `perspective`'s point of view.
pub trait Evaluator {
    fn evaluate(&self, node: &SearchNode, perspective: usize) -> f32;
}

/// Own balls left on the table count against you, every other ball counts
/// for you. A potted 8-ball decides the game.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaterialCount;

impl Evaluator for MaterialCount {
    fn evaluate(&self, node: &SearchNode, perspective: usize) -> f32 {
        if let Some(winner) = node.winner {
            return if winner == perspective { WIN_SCORE } else { -WIN_SCORE };
        }
        let own = node.own_remaining(perspective);
        let others = node.balls.len() - own;
        others as f32 - own as f32
    }
}

/// Expectimax search driver.
pub struct Lookahead<'a, E: Evaluator = MaterialCount> {
    planner: &'a ShotPlanner,
    pockets: &'a [Pocket],
    evaluator: E,
}

impl<'a> Lookahead<'a, MaterialCount> {
    pub fn new(planner: &'a ShotPlanner, pockets: &'a [Pocket]) -> Self {
        Self::with_evaluator(planner, pockets, MaterialCount)
    }
}

impl<'a, E: Evaluator> Lookahead<'a, E> {
    pub fn with_evaluator(planner: &'a ShotPlanner, pockets: &'a [Pocket], evaluator: E) -> Self {
        Self {
            planner,
            pockets,
            evaluator,
        }
    }

    /// Best action for the agent to move at `node` and its expected score.
    /// Depth 0 returns the static evaluation and no action.
    pub fn best_action(&self, node: &SearchNode, depth: u32) -> (f32, Option<Shot>) {
        if depth == 0 || node.winner.is_some() {
            return (self.evaluator.evaluate(node, 0), None);
        }

        let shots = self.planner.legal_shots(
            &node.cue,
            &node.targets(node.agent),
            self.pockets,
            &node.all_balls(),
        );
        if shots.is_empty() {
            let mut passed = node.clone();
            passed.pass_turn();
            return (self.best_action(&passed, depth - 1).0, None);
        }

        let maximizing = node.agent == 0;
        let max_deviation = self.planner.config.max_deviation_deg;
        let mut best: Option<(f32, Shot)> = None;
        for shot in shots {
            let p = shot.success_probability(max_deviation);
            let hit = self.best_action(&node.after_success(&shot), depth - 1).0;
            let miss = self.best_action(&node.after_failure(&shot), depth - 1).0;
            let expected = p * hit + (1.0 - p) * miss;

            let better = match &best {
                None => true,
                Some((score, _)) if maximizing => expected > *score,
                Some((score, _)) => expected < *score,
            };
            if better {
                best = Some((expected, shot));
            }
        }

        match best {
            Some((score, shot)) => {
                log::debug!(
                    "lookahead depth {} agent {}: {} -> pocket {} scores {:.3}",
                    depth,
                    node.agent,
                    shot.ball,
                    shot.pocket,
                    score
                );
                (score, Some(shot))
            }
            None => (self.evaluator.evaluate(node, 0), None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn ball(n: u8, x: f32, y: f32) -> Ball {
        Ball::new(BallNumber(n), Vec2::new(x, y), 8.0, 1.0, 0.9)
    }

    fn pocket(x: f32, y: f32) -> Pocket {
        Pocket {
            pos: Vec2::new(x, y),
            radius: 15.0,
            target: Vec2::new(x, y),
        }
    }

    fn node(balls: Vec<Ball>, groups: [Option<BallGroup>; 2]) -> SearchNode {
        SearchNode::new(balls, ball(0, 100.0, 200.0), groups, 2)
    }

    const ASSIGNED: [Option<BallGroup>; 2] = [Some(BallGroup::Solids), Some(BallGroup::Stripes)];

    #[test]
    fn material_count_prefers_fewer_own_balls() {
        let groups = [Some(BallGroup::Solids), Some(BallGroup::Stripes)];
        let before = node(vec![ball(1, 0.0, 0.0), ball(2, 0.0, 0.0), ball(9, 0.0, 0.0)], groups);
        let after = node(vec![ball(2, 0.0, 0.0), ball(9, 0.0, 0.0)], groups);
        let eval = MaterialCount;
        assert_eq!(eval.evaluate(&before, 0), -1.0);
        assert_eq!(eval.evaluate(&after, 0), 0.0);
        assert_eq!(eval.evaluate(&before, 1), 1.0);
    }

    #[test]
    fn depth_zero_returns_static_score_without_action() {
        let planner = ShotPlanner::default();
        let pockets = [pocket(800.0, 200.0)];
        let n = node(vec![ball(1, 300.0, 200.0)], ASSIGNED);
        let (score, action) = Lookahead::new(&planner, &pockets).best_action(&n, 0);
        assert_eq!(score, -1.0);
        assert!(action.is_none());
    }

    #[test]
    fn targets_fall_back_to_eight_when_group_cleared() {
        let n = node(
            vec![ball(8, 400.0, 200.0), ball(9, 500.0, 100.0)],
            [Some(BallGroup::Solids), Some(BallGroup::Stripes)],
        );
        let targets: Vec<u8> = n.targets(0).iter().map(|b| b.number.0).collect();
        assert_eq!(targets, vec![8]);
        let targets: Vec<u8> = n.targets(1).iter().map(|b| b.number.0).collect();
        assert_eq!(targets, vec![9]);
    }

    #[test]
    fn success_assigns_groups_and_keeps_turn() {
        let n = node(vec![ball(3, 300.0, 200.0), ball(12, 500.0, 100.0)], [None, None]);
        let planner = ShotPlanner::default();
        let pockets = [pocket(800.0, 200.0)];
        let shot = planner
            .candidate(&n.cue, &n.balls[0], 0, &pockets, &n.all_balls())
            .unwrap();

        let hit = n.after_success(&shot);
        assert_eq!(hit.groups, [Some(BallGroup::Solids), Some(BallGroup::Stripes)]);
        assert_eq!(hit.agent, 0);
        assert_eq!(hit.balls.len(), 1);
        assert_eq!(hit.cue.pos, shot.cue_after);

        let miss = n.after_failure(&shot);
        assert_eq!(miss.agent, 1);
        assert_eq!(miss.balls.len(), 2);
    }

    #[test]
    fn prefers_the_easier_pot() {
        let planner = ShotPlanner::default();
        let pockets = [pocket(800.0, 200.0), pocket(800.0, 20.0)];
        // Ball 1 is dead straight; ball 2 needs a cut.
        let n = node(
            vec![ball(1, 300.0, 200.0), ball(2, 300.0, 320.0), ball(9, 600.0, 390.0)],
            [Some(BallGroup::Solids), Some(BallGroup::Stripes)],
        );
        let (score, action) = Lookahead::new(&planner, &pockets).best_action(&n, 1);
        let action = action.expect("a shot should be found");
        assert_eq!(action.ball, BallNumber(1));
        // Certain success removes one solid: -2 + 1 -> -1 + 1.
        assert!((score - 0.0).abs() < 1e-4, "score was {}", score);
    }

    #[test]
    fn opponent_layer_minimizes() {
        let planner = ShotPlanner::default();
        let pockets = [pocket(800.0, 200.0)];
        let mut n = node(
            vec![ball(1, 300.0, 350.0), ball(9, 300.0, 200.0)],
            [Some(BallGroup::Solids), Some(BallGroup::Stripes)],
        );
        n.agent = 1;
        let (score, action) = Lookahead::new(&planner, &pockets).best_action(&n, 1);
        assert_eq!(action.map(|s| s.ball), Some(BallNumber(9)));
        // Opponent pots a stripe for certain, which is bad for agent 0.
        assert!(score < MaterialCount.evaluate(&n, 0), "score was {}", score);
    }

    #[test]
    fn potting_the_eight_wins() {
        let n = node(
            vec![ball(8, 300.0, 200.0)],
            [Some(BallGroup::Locked), Some(BallGroup::Stripes)],
        );
        let planner = ShotPlanner::default();
        let pockets = [pocket(800.0, 200.0)];
        let (score, action) = Lookahead::new(&planner, &pockets).best_action(&n, 2);
        assert_eq!(action.map(|s| s.ball), Some(BallNumber::EIGHT));
        assert!((score - WIN_SCORE).abs() < 1e-3, "score was {}", score);
    }

    #[test]
    fn solo_search_never_hands_over_the_turn() {
        let cue = ball(0, 100.0, 200.0);
        let n = SearchNode::new(vec![ball(1, 300.0, 200.0)], cue, [None, None], 1);
        let planner = ShotPlanner::default();
        let pockets = [pocket(800.0, 200.0)];
        let shot = planner
            .candidate(&n.cue, &n.balls[0], 0, &pockets, &n.all_balls())
            .unwrap();
        assert_eq!(n.after_failure(&shot).agent, 0);
    }

    #[test]
    fn cut_shot_mixes_hit_and_miss() {
        let planner = ShotPlanner::default();
        // The ball has to leave at 45 degrees to the cue line.
        let pockets = [pocket(500.0, 400.0)];
        let n = node(vec![ball(1, 300.0, 200.0)], ASSIGNED);
        let (score, action) = Lookahead::new(&planner, &pockets).best_action(&n, 1);
        let shot = action.expect("the cut is playable");

        let p = shot.success_probability(planner.config.max_deviation_deg);
        assert!((p - 0.5).abs() < 1e-3, "success probability was {}", p);
        let hit = MaterialCount.evaluate(&n.after_success(&shot), 0);
        let miss = MaterialCount.evaluate(&n.after_failure(&shot), 0);
        assert_eq!((hit, miss), (0.0, -1.0));
        assert!((score - (0.5 * hit + 0.5 * miss)).abs() < 1e-3, "score was {}", score);
    }
}
