//! A headless table backed by rapier2d.

use glam::Vec2;
use rand::Rng;

use crate::api::table::{Simulation, Table};
use crate::api::types::{Ball, BallNumber, Pocket};
use crate::config::{Calibration, GameSettings, TableConfig};
use crate::core::physics::{BodyDesc, ColliderDesc, ColliderMaterial, PhysicsBody, PhysicsWorld};
use crate::planner::geometry::launch_speed_for_force;
use crate::planner::obstruction::segment_point_distance;
use crate::rules::rack::{create_initial_ball_list, rack_positions};

/// Cushion thickness, in pixels. Only has to be thick enough that CCD keeps
/// balls in.
const CUSHION_THICKNESS: f32 = 40.0;

/// Cushions are tagged past the ball number range.
const CUSHION_TAG: u32 = 1000;

struct SimBall {
    number: BallNumber,
    body: PhysicsBody,
    /// Position at the start of the current substep, for swept pocket capture.
    prev_pos: Vec2,
}

/// A rapier2d world laid out as an 8-ball table: four cushions, six pockets
/// and up to sixteen balls.
pub struct SimTable {
    world: PhysicsWorld,
    layout: TableConfig,
    calibration: Calibration,
    pockets: Vec<Pocket>,
    balls: Vec<SimBall>,
}

impl SimTable {
    /// An empty table with cushions and pockets.
    pub fn new(settings: &GameSettings) -> Self {
        let layout = settings.table.clone();
        let calibration = settings.calibration.clone();
        let mut world = PhysicsWorld::new(Vec2::ZERO);
        world.set_dt(calibration.fixed_dt / calibration.substeps.max(1) as f32);

        let (w, h, t) = (layout.width, layout.height, CUSHION_THICKNESS);
        let material = ColliderMaterial {
            restitution: calibration.restitution,
            friction: calibration.friction,
            density: 1.0,
        };
        let horizontal = ColliderDesc::Cuboid {
            half_width: w / 2.0 + t,
            half_height: t / 2.0,
        };
        let vertical = ColliderDesc::Cuboid {
            half_width: t / 2.0,
            half_height: h / 2.0 + t,
        };
        let walls = [
            (horizontal, Vec2::new(w / 2.0, -t / 2.0)),
            (horizontal, Vec2::new(w / 2.0, h + t / 2.0)),
            (vertical, Vec2::new(-t / 2.0, h / 2.0)),
            (vertical, Vec2::new(w + t / 2.0, h / 2.0)),
        ];
        for (i, (shape, pos)) in walls.into_iter().enumerate() {
            world.create_body(
                CUSHION_TAG + i as u32,
                &BodyDesc::fixed(shape).with_position(pos),
                material,
            );
        }

        let pockets = layout.pockets().to_vec();
        Self {
            world,
            layout,
            calibration,
            pockets,
            balls: Vec::new(),
        }
    }

    /// A table with the cue ball on its spot and a freshly shuffled rack.
    pub fn racked<R: Rng + ?Sized>(settings: &GameSettings, rng: &mut R) -> Self {
        let mut table = Self::new(settings);
        table.add_ball(BallNumber::CUE, table.layout.cue_spot);
        let numbers = create_initial_ball_list(rng);
        let slots = rack_positions(table.layout.rack_apex, table.layout.ball_radius);
        for (number, pos) in numbers.into_iter().zip(slots) {
            table.add_ball(number, pos);
        }
        log::info!("racked {} balls", table.balls.len());
        table
    }

    /// Put a ball on the table at rest. Replaces a ball with the same number.
    pub fn add_ball(&mut self, number: BallNumber, pos: Vec2) {
        self.remove_ball(number);
        let radius = self.layout.ball_radius;
        let desc = BodyDesc::dynamic(ColliderDesc::Ball { radius })
            .with_position(pos)
            .with_ccd(true)
            .with_linear_damping(self.calibration.drag_rate);
        let material = ColliderMaterial::ball(
            self.calibration.ball_mass,
            radius,
            self.calibration.restitution,
            self.calibration.friction,
        );
        let body = self.world.create_body(number.0 as u32, &desc, material);
        self.balls.push(SimBall {
            number,
            body,
            prev_pos: pos,
        });
    }

    fn remove_ball(&mut self, number: BallNumber) -> bool {
        let Some(idx) = self.balls.iter().position(|b| b.number == number) else {
            return false;
        };
        let ball = self.balls.remove(idx);
        self.world.remove_body(&ball.body);
        true
    }

    pub fn ball_count(&self) -> usize {
        self.balls.len()
    }

    /// Set a ball's velocity directly, bypassing the stroke model.
    pub fn set_ball_velocity(&mut self, number: BallNumber, vel: Vec2) {
        if let Some(ball) = self.balls.iter().find(|b| b.number == number) {
            self.world.set_velocity(&ball.body, vel);
        }
    }

    fn snapshot(&self, ball: &SimBall) -> Ball {
        Ball::new(
            ball.number,
            self.world.body_position(&ball.body),
            self.layout.ball_radius,
            self.calibration.ball_mass,
            self.calibration.drag(),
        )
        .with_vel(self.world.velocity(&ball.body))
    }

    fn is_free(&self, pos: Vec2, ignore: BallNumber) -> bool {
        let min_gap = self.layout.ball_radius * 2.0;
        self.balls
            .iter()
            .filter(|b| b.number != ignore)
            .all(|b| self.world.body_position(&b.body).distance(pos) >= min_gap)
    }

    /// First free spot at or behind `spot`, stepping toward the head rail, then
    /// forward if the whole line is blocked.
    fn free_spot(&self, spot: Vec2) -> Vec2 {
        let r = self.layout.ball_radius;
        let step = r * 2.0;
        let min_x = r;
        let max_x = self.layout.width - r;
        let mut x = spot.x;
        while x >= min_x {
            let pos = Vec2::new(x, spot.y);
            if self.is_free(pos, BallNumber::CUE) {
                return pos;
            }
            x -= step;
        }
        x = spot.x + step;
        while x <= max_x {
            let pos = Vec2::new(x, spot.y);
            if self.is_free(pos, BallNumber::CUE) {
                return pos;
            }
            x += step;
        }
        log::warn!("no free spot on the cue line, placing at {:?}", spot);
        spot
    }

    /// Pocket captured by a ball that moved from `from` to `to`.
    fn captured_by(&self, from: Vec2, to: Vec2) -> Option<usize> {
        self.pockets
            .iter()
            .position(|p| segment_point_distance(from, to, p.pos) <= p.radius)
    }

    fn nearest_pocket(&self, pos: Vec2) -> usize {
        self.pockets
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.pos.distance(pos).total_cmp(&b.pos.distance(pos)))
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    /// Remove every ball that fell into a pocket or left the table during the
    /// last substep.
    fn collect_pocketed(&mut self, sunk: &mut Vec<BallNumber>) {
        let mut dropped = Vec::new();
        for ball in &self.balls {
            let pos = self.world.body_position(&ball.body);
            if let Some(pocket) = self.captured_by(ball.prev_pos, pos) {
                log::debug!("{} dropped into pocket {}", ball.number, pocket);
                dropped.push(ball.number);
            } else if !self.layout.contains(pos) {
                let pocket = self.nearest_pocket(pos);
                log::warn!(
                    "{} escaped the table at {:?}, sending it to pocket {}",
                    ball.number,
                    pos,
                    pocket
                );
                dropped.push(ball.number);
            }
        }
        for number in dropped {
            self.remove_ball(number);
            sunk.push(number);
        }
        for ball in &mut self.balls {
            ball.prev_pos = self.world.body_position(&ball.body);
        }
    }
}

impl Table for SimTable {
    fn balls_on_table(&self) -> Vec<Ball> {
        self.balls.iter().map(|b| self.snapshot(b)).collect()
    }

    fn pockets(&self) -> &[Pocket] {
        &self.pockets
    }

    /// The stroke is modelled as a push through the ball's center, so
    /// `_position` only matters to hosts that draw the cue stick.
    fn apply_force(&mut self, ball: BallNumber, _position: Vec2, force: Vec2) {
        let Some(body) = self.balls.iter().find(|b| b.number == ball).map(|b| b.body) else {
            log::warn!("force submitted for {} which is not on the table", ball);
            return;
        };
        let magnitude = force.length();
        let mass = self.calibration.ball_mass;
        let speed = launch_speed_for_force(magnitude, mass, &self.calibration);
        let dir = force.normalize_or_zero();
        log::debug!("{} struck with force {:.4}, launch speed {:.1}", ball, magnitude, speed);
        self.world.set_velocity(&body, dir * speed);
    }

    fn place_cue(&mut self, position: Vec2) {
        let spot = self.free_spot(position);
        match self.balls.iter_mut().find(|b| b.number.is_cue()) {
            Some(cue) => {
                self.world.set_position(&cue.body, spot);
                cue.prev_pos = spot;
            }
            None => self.add_ball(BallNumber::CUE, spot),
        }
    }
}

impl Simulation for SimTable {
    fn step(&mut self) -> Vec<BallNumber> {
        let mut sunk = Vec::new();
        for _ in 0..self.calibration.substeps.max(1) {
            self.world.step();
            self.collect_pocketed(&mut sunk);
        }
        sunk
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn run_until_rest(table: &mut SimTable, max_ticks: u32) -> Vec<BallNumber> {
        let threshold = table.calibration.speed_threshold;
        let mut sunk = Vec::new();
        for _ in 0..max_ticks {
            sunk.extend(table.step());
            if table.balls_at_rest(threshold) {
                break;
            }
        }
        sunk
    }

    #[test]
    fn racked_table_holds_sixteen_resting_balls() {
        let settings = GameSettings::default();
        let table = SimTable::racked(&settings, &mut ChaCha8Rng::seed_from_u64(1));
        assert_eq!(table.ball_count(), 16);
        assert_eq!(table.pockets().len(), 6);
        assert!(table.balls_at_rest(settings.calibration.speed_threshold));
        let cue = table.cue().unwrap();
        assert!((cue.pos - settings.table.cue_spot).length() < 1e-3);
    }

    #[test]
    fn straight_shot_drops_into_corner() {
        let settings = GameSettings::default();
        let mut table = SimTable::new(&settings);
        let start = Vec2::new(settings.table.width - 100.0, settings.table.height - 100.0);
        table.add_ball(BallNumber(5), start);
        table.apply_force(BallNumber(5), start, Vec2::new(0.3, 0.3));

        let sunk = run_until_rest(&mut table, 600);
        assert_eq!(sunk, vec![BallNumber(5)]);
        assert_eq!(table.ball_count(), 0);
    }

    #[test]
    fn cushions_keep_balls_on_the_table() {
        let settings = GameSettings::default();
        let mut table = SimTable::new(&settings);
        table.add_ball(BallNumber(2), Vec2::new(200.0, 200.0));
        // Straight up into the rail, away from any pocket.
        table.set_ball_velocity(BallNumber(2), Vec2::new(0.0, -600.0));

        let sunk = run_until_rest(&mut table, 1200);
        assert!(sunk.is_empty(), "sunk {:?}", sunk);
        let ball = table.balls_on_table()[0];
        assert!(settings.table.contains(ball.pos), "ball at {:?}", ball.pos);
    }

    #[test]
    fn escaped_ball_is_pocketed() {
        let settings = GameSettings::default();
        let mut table = SimTable::new(&settings);
        table.add_ball(BallNumber(9), Vec2::new(300.0, 200.0));
        table.add_ball(BallNumber(9), Vec2::new(300.0, -50.0));
        assert_eq!(table.ball_count(), 1);
        assert_eq!(table.step(), vec![BallNumber(9)]);
    }

    #[test]
    fn cue_respot_moves_off_an_occupied_spot() {
        let settings = GameSettings::default();
        let mut table = SimTable::new(&settings);
        let spot = settings.table.cue_spot;
        table.add_ball(BallNumber(4), spot);
        table.place_cue(spot);

        let cue = table.cue().unwrap();
        assert!(cue.pos.x < spot.x, "cue should shift toward the head rail: {:?}", cue.pos);
        assert!((cue.pos.y - spot.y).abs() < 1e-3);
        assert!(cue.pos.distance(spot) >= 2.0 * settings.table.ball_radius);
    }

    #[test]
    fn break_scatters_the_rack() {
        let settings = GameSettings::default();
        let mut table = SimTable::racked(&settings, &mut ChaCha8Rng::seed_from_u64(5));
        let cue = table.cue().unwrap();
        table.apply_force(BallNumber::CUE, cue.pos, Vec2::X * settings.calibration.break_force);
        table.step();
        assert!(!table.balls_at_rest(settings.calibration.speed_threshold));

        run_until_rest(&mut table, settings.rules.max_ticks_per_shot);
        assert!(table.balls_at_rest(settings.calibration.speed_threshold));
        for ball in table.balls_on_table() {
            assert!(settings.table.contains(ball.pos), "{} off the table", ball.number);
        }
    }
}
