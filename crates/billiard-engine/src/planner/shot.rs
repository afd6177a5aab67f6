//! Single-shot planner: scores every (ball, pocket) pair and picks the best
//! legal one.

use glam::Vec2;
use serde::Serialize;

use crate::api::types::{Ball, BallNumber, Pocket, ShotCommand};
use crate::config::{Calibration, GameSettings, PlannerConfig};
use crate::error::{GeometryError, PlanError};
use crate::planner::geometry::{
    angle_between_cue_and_ball, angle_deviation, contact_point_for_ball,
    cue_force_for_contact_velocity, required_ball_velocity,
};
use crate::planner::obstruction::count_obstacles;

/// A proposed pot of `ball` into pocket `pocket`. Computed fresh every turn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Shot {
    pub ball: BallNumber,
    /// Index into the pocket list the shot was planned against.
    pub pocket: usize,
    /// Normalized force to apply at the cue ball.
    pub force: Vec2,
    /// Bearing (radians) of the cue ball's path to the contact point.
    pub aim_angle: f32,
    /// Angle (radians) between the object ball's required travel and the
    /// cue-to-ball line.
    pub deviation: f32,
    pub obstructions: usize,
    pub contact_point: Vec2,
    pub ball_velocity: Vec2,
    /// Predicted cue ball rest position if the shot succeeds.
    pub cue_after: Vec2,
}

impl Shot {
    pub fn command(&self, cue_pos: Vec2) -> ShotCommand {
        ShotCommand {
            position: cue_pos,
            force: self.force,
        }
    }

    pub fn deviation_deg(&self) -> f32 {
        self.deviation.to_degrees()
    }

    /// `1 - deviation / max_deviation`, clamped to `[0, 1]`.
    pub fn success_probability(&self, max_deviation_deg: f32) -> f32 {
        (1.0 - self.deviation_deg() / max_deviation_deg).clamp(0.0, 1.0)
    }

    /// Whether `self` beats `best` under the selection policy: a clear shot
    /// beats any blocked one, fewer obstructions beat more, and equal counts
    /// fall back to the smaller deviation. Ties keep `best`.
    pub fn is_preferred_over(&self, best: &Shot) -> bool {
        if self.obstructions == 0 && best.obstructions > 0 {
            return true;
        }
        if self.obstructions == best.obstructions {
            return self.deviation < best.deviation;
        }
        self.obstructions < best.obstructions
    }
}

/// Builds and ranks candidate shots.
#[derive(Debug, Clone, Default)]
pub struct ShotPlanner {
    pub calibration: Calibration,
    pub config: PlannerConfig,
}

impl ShotPlanner {
    pub fn new(settings: &GameSettings) -> Self {
        Self {
            calibration: settings.calibration.clone(),
            config: settings.planner.clone(),
        }
    }

    /// Compute the shot that pots `ball` into `pockets[pocket]`.
    ///
    /// `table_balls` may contain the cue and the object ball; both are left
    /// out of the obstruction count.
    pub fn candidate(
        &self,
        cue: &Ball,
        ball: &Ball,
        pocket: usize,
        pockets: &[Pocket],
        table_balls: &[Ball],
    ) -> Result<Shot, GeometryError> {
        let target = pockets
            .get(pocket)
            .ok_or(GeometryError::Degenerate("unknown pocket"))?
            .target;
        let ball_velocity = required_ball_velocity(ball, target)? * self.config.speed_margin;
        let travel = target - ball.pos;
        let contact_point = contact_point_for_ball(ball, travel)?;

        let natural = angle_between_cue_and_ball(cue, ball)?;
        let deviation = angle_deviation(travel.y.atan2(travel.x), natural);

        let approach = contact_point - cue.pos;
        let aim_angle = approach.y.atan2(approach.x);
        let cut = angle_deviation(travel.y.atan2(travel.x), aim_angle);
        let force = cue_force_for_contact_velocity(
            cue,
            contact_point,
            ball_velocity,
            cut,
            &self.calibration,
        )?;

        let clearance = self.config.clearance_radii * ball.radius;
        let others = || {
            table_balls
                .iter()
                .filter(|b| !b.number.is_cue() && b.number != ball.number)
        };
        let obstructions = count_obstacles(others(), cue.pos, contact_point, clearance)
            + count_obstacles(others(), ball.pos, target, clearance);

        Ok(Shot {
            ball: ball.number,
            pocket,
            force,
            aim_angle,
            deviation,
            obstructions,
            contact_point,
            ball_velocity,
            cue_after: contact_point,
        })
    }

    /// Every legal candidate, best first. Degenerate and over-cut candidates
    /// are dropped.
    pub fn legal_shots(
        &self,
        cue: &Ball,
        candidate_balls: &[Ball],
        pockets: &[Pocket],
        table_balls: &[Ball],
    ) -> Vec<Shot> {
        let mut shots = Vec::new();
        self.for_each_legal(cue, candidate_balls, pockets, table_balls, |shot| shots.push(shot));
        // Stable, so equal candidates keep discovery order.
        shots.sort_by(|a, b| {
            a.obstructions
                .cmp(&b.obstructions)
                .then(a.deviation.total_cmp(&b.deviation))
        });
        shots
    }

    /// The best legal shot at `candidate_balls`.
    pub fn select_best_shot(
        &self,
        cue: &Ball,
        candidate_balls: &[Ball],
        pockets: &[Pocket],
        table_balls: &[Ball],
    ) -> Result<Shot, PlanError> {
        let mut best: Option<Shot> = None;
        self.for_each_legal(cue, candidate_balls, pockets, table_balls, |shot| {
            let replace = match &best {
                Some(current) => shot.is_preferred_over(current),
                None => true,
            };
            if replace {
                best = Some(shot);
            }
        });
        best.ok_or(PlanError::NoLegalShot)
    }

    fn for_each_legal(
        &self,
        cue: &Ball,
        candidate_balls: &[Ball],
        pockets: &[Pocket],
        table_balls: &[Ball],
        mut visit: impl FnMut(Shot),
    ) {
        let max_deviation = self.config.max_deviation_deg.to_radians();
        for ball in candidate_balls {
            for pocket in 0..pockets.len() {
                match self.candidate(cue, ball, pocket, pockets, table_balls) {
                    Ok(shot) if shot.deviation < max_deviation => visit(shot),
                    Ok(shot) => log::debug!(
                        "{} -> pocket {}: cut {:.1} deg not playable",
                        ball.number,
                        pocket,
                        shot.deviation_deg()
                    ),
                    Err(e) => log::debug!("{} -> pocket {}: {}", ball.number, pocket, e),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TableConfig;

    fn ball(n: u8, x: f32, y: f32) -> Ball {
        Ball::new(BallNumber(n), Vec2::new(x, y), 8.0, 1.0, 0.9)
    }

    fn planner() -> ShotPlanner {
        ShotPlanner::default()
    }

    fn pocket(x: f32, y: f32) -> Pocket {
        Pocket {
            pos: Vec2::new(x, y),
            radius: 15.0,
            target: Vec2::new(x, y),
        }
    }

    #[test]
    fn straight_shot_has_no_deviation() {
        let cue = ball(0, 100.0, 200.0);
        let target = ball(3, 300.0, 200.0);
        let pockets = [pocket(800.0, 200.0)];
        let shot = planner()
            .candidate(&cue, &target, 0, &pockets, &[cue, target])
            .unwrap();
        assert!(shot.deviation.abs() < 1e-5);
        assert_eq!(shot.obstructions, 0);
        assert!((shot.contact_point - Vec2::new(284.0, 200.0)).length() < 1e-3);
        assert!(shot.force.x > 0.0 && shot.force.y.abs() < 1e-6);
        assert_eq!(shot.cue_after, shot.contact_point);
    }

    #[test]
    fn backward_pocket_is_not_legal() {
        let cue = ball(0, 100.0, 200.0);
        let target = ball(3, 300.0, 200.0);
        let pockets = [pocket(0.0, 200.0)];
        let result = planner().select_best_shot(&cue, &[target], &pockets, &[cue, target]);
        assert_eq!(result, Err(PlanError::NoLegalShot));
    }

    #[test]
    fn clear_shot_beats_blocked_shot_with_smaller_cut() {
        let cue = ball(0, 100.0, 200.0);
        let straight = ball(3, 300.0, 200.0);
        let blocker = ball(9, 500.0, 200.0);
        let angled = ball(4, 300.0, 300.0);
        let pockets = [pocket(800.0, 200.0), pocket(600.0, 400.0)];
        let table = [cue, straight, blocker, angled];

        let best = planner()
            .select_best_shot(&cue, &[straight, angled], &pockets, &table)
            .unwrap();
        assert_eq!(best.obstructions, 0);
        assert!(best.deviation > 0.0);
    }

    #[test]
    fn fewer_obstructions_win_then_smaller_deviation() {
        let a = Shot {
            ball: BallNumber(1),
            pocket: 0,
            force: Vec2::X,
            aim_angle: 0.0,
            deviation: 0.5,
            obstructions: 2,
            contact_point: Vec2::ZERO,
            ball_velocity: Vec2::X,
            cue_after: Vec2::ZERO,
        };
        let b = Shot { obstructions: 1, deviation: 0.9, ..a.clone() };
        let c = Shot { obstructions: 1, deviation: 0.2, ..a.clone() };
        let d = Shot { obstructions: 0, deviation: 1.4, ..a.clone() };

        assert!(b.is_preferred_over(&a));
        assert!(c.is_preferred_over(&b));
        assert!(d.is_preferred_over(&c));
        assert!(!c.is_preferred_over(&c.clone()), "ties keep the first candidate");
    }

    #[test]
    fn selection_is_deterministic() {
        let table = TableConfig::default();
        let pockets = table.pockets();
        let cue = ball(0, 200.0, 200.0);
        let balls = [ball(2, 500.0, 150.0), ball(11, 450.0, 260.0), ball(5, 620.0, 90.0)];
        let mut on_table = vec![cue];
        on_table.extend_from_slice(&balls);

        let first = planner().select_best_shot(&cue, &balls, &pockets, &on_table).unwrap();
        for _ in 0..5 {
            let again = planner().select_best_shot(&cue, &balls, &pockets, &on_table).unwrap();
            assert_eq!(first, again);
        }
    }

    #[test]
    fn ranked_list_agrees_with_selector() {
        let table = TableConfig::default();
        let pockets = table.pockets();
        let cue = ball(0, 200.0, 200.0);
        let balls = [ball(2, 500.0, 150.0), ball(11, 450.0, 260.0), ball(5, 620.0, 90.0)];
        let mut on_table = vec![cue];
        on_table.extend_from_slice(&balls);

        let p = planner();
        let ranked = p.legal_shots(&cue, &balls, &pockets, &on_table);
        let best = p.select_best_shot(&cue, &balls, &pockets, &on_table).unwrap();
        assert_eq!(ranked.first(), Some(&best));
        assert!(ranked.iter().all(|s| s.deviation_deg() < 90.0));
    }

    #[test]
    fn success_probability_scales_with_deviation() {
        let shot = Shot {
            ball: BallNumber(1),
            pocket: 0,
            force: Vec2::X,
            aim_angle: 0.0,
            deviation: 45f32.to_radians(),
            obstructions: 0,
            contact_point: Vec2::ZERO,
            ball_velocity: Vec2::X,
            cue_after: Vec2::ZERO,
        };
        assert!((shot.success_probability(90.0) - 0.5).abs() < 1e-5);
    }
}
