//! Stateless shot geometry under a linear-drag ball model.
//!
//! A ball with mass `m` and drag coefficient `k` decelerates at `k/m * v`, so
//! its speed falls linearly with distance travelled (`dv/dx = -k/m`) and it
//! comes to rest after `v0 * m / k`.

use glam::Vec2;

use crate::api::types::Ball;
use crate::config::Calibration;
use crate::error::GeometryError;

const EPSILON: f32 = 1e-4;
/// Cuts thinner than this cosine cannot transfer a usable speed.
const MIN_CUT_COSINE: f32 = 0.05;

/// Velocity the ball needs, pointing at `target`, to come to rest exactly there.
pub fn required_ball_velocity(ball: &Ball, target: Vec2) -> Result<Vec2, GeometryError> {
    if ball.mass <= 0.0 || ball.drag <= 0.0 {
        return Err(GeometryError::Degenerate("ball has no mass or drag"));
    }
    let delta = target - ball.pos;
    let distance = delta.length();
    if distance < EPSILON {
        return Err(GeometryError::Degenerate("ball already at target"));
    }
    let speed = distance * ball.drag / ball.mass;
    Ok(delta / distance * speed)
}

/// Where the cue ball's center must be at impact to send `ball` along
/// `aim_direction` (ghost ball, two radii behind the object ball).
pub fn contact_point_for_ball(ball: &Ball, aim_direction: Vec2) -> Result<Vec2, GeometryError> {
    let dir = aim_direction
        .try_normalize()
        .ok_or(GeometryError::Degenerate("zero aim direction"))?;
    Ok(ball.pos - dir * (2.0 * ball.radius))
}

/// Bearing (radians) of the line from the cue ball to `ball`.
pub fn angle_between_cue_and_ball(cue: &Ball, ball: &Ball) -> Result<f32, GeometryError> {
    let delta = ball.pos - cue.pos;
    if delta.length_squared() < EPSILON * EPSILON {
        return Err(GeometryError::Degenerate("cue and ball coincide"));
    }
    Ok(delta.y.atan2(delta.x))
}

/// Absolute difference between two bearings, folded into `[0, PI]`.
pub fn angle_deviation(a: f32, b: f32) -> f32 {
    let diff = (a - b).rem_euclid(std::f32::consts::TAU);
    if diff > std::f32::consts::PI {
        std::f32::consts::TAU - diff
    } else {
        diff
    }
}

/// Normalized force to apply at the cue ball so it reaches `contact_point`
/// fast enough to give the object ball `desired_ball_velocity` at the given
/// cut angle.
///
/// The cue stick pushes over `stroke_length`, so `F * L = m * v0^2 / 2`.
pub fn cue_force_for_contact_velocity(
    cue: &Ball,
    contact_point: Vec2,
    desired_ball_velocity: Vec2,
    cut_angle: f32,
    calibration: &Calibration,
) -> Result<Vec2, GeometryError> {
    let cos = cut_angle.cos();
    if cos < MIN_CUT_COSINE {
        return Err(GeometryError::Degenerate("cut too thin"));
    }
    if cue.mass <= 0.0
        || calibration.stroke_length <= 0.0
        || calibration.force_normalization <= 0.0
    {
        return Err(GeometryError::Degenerate("invalid cue calibration"));
    }
    let to_contact = contact_point - cue.pos;
    let distance = to_contact.length();
    if distance < EPSILON {
        return Err(GeometryError::Degenerate("cue already at contact point"));
    }

    let contact_speed = desired_ball_velocity.length() / cos;
    let launch_speed = contact_speed + distance * cue.drag / cue.mass;
    let raw = 0.5 * cue.mass * launch_speed * launch_speed / calibration.stroke_length;
    let magnitude = (raw / calibration.force_normalization).min(calibration.max_force);
    Ok(to_contact / distance * magnitude)
}

/// Inverse of the stroke model: launch speed produced by a normalized force.
pub fn launch_speed_for_force(force: f32, mass: f32, calibration: &Calibration) -> f32 {
    if mass <= 0.0 || force <= 0.0 {
        return 0.0;
    }
    let raw = force * calibration.force_normalization;
    (2.0 * raw * calibration.stroke_length / mass).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::BallNumber;
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI};

    fn ball_at(x: f32, y: f32) -> Ball {
        Ball::new(BallNumber(3), Vec2::new(x, y), 8.0, 1.0, 0.9)
    }

    /// Closed-form position under linear drag after `t` seconds.
    fn drift(ball: &Ball, vel: Vec2, t: f32) -> Vec2 {
        let tau = ball.mass / ball.drag;
        ball.pos + vel * tau * (1.0 - (-t / tau).exp())
    }

    #[test]
    fn required_velocity_stops_ball_on_target() {
        for (start, target) in [
            (Vec2::new(100.0, 100.0), Vec2::new(400.0, 300.0)),
            (Vec2::new(700.0, 50.0), Vec2::new(8.0, 392.0)),
            (Vec2::new(400.0, 200.0), Vec2::new(400.0, 205.0)),
        ] {
            let ball = ball_at(start.x, start.y);
            let vel = required_ball_velocity(&ball, target).unwrap();
            let rest = drift(&ball, vel, 60.0);
            assert!(
                (rest - target).length() < 0.05,
                "ball came to rest at {:?}, expected {:?}",
                rest,
                target
            );
        }
    }

    #[test]
    fn required_velocity_points_at_target() {
        let ball = ball_at(0.0, 0.0);
        let vel = required_ball_velocity(&ball, Vec2::new(0.0, 50.0)).unwrap();
        assert!(vel.x.abs() < 1e-6);
        assert!(vel.y > 0.0);
    }

    #[test]
    fn zero_distance_is_degenerate() {
        let ball = ball_at(10.0, 10.0);
        assert!(required_ball_velocity(&ball, Vec2::new(10.0, 10.0)).is_err());
    }

    #[test]
    fn contact_point_is_two_radii_behind() {
        let ball = ball_at(100.0, 100.0);
        let p = contact_point_for_ball(&ball, Vec2::new(3.0, 0.0)).unwrap();
        assert!((p - Vec2::new(84.0, 100.0)).length() < 1e-4, "got {:?}", p);
        assert!(contact_point_for_ball(&ball, Vec2::ZERO).is_err());
    }

    #[test]
    fn bearing_and_deviation() {
        let cue = ball_at(0.0, 0.0);
        let ball = ball_at(0.0, 10.0);
        let bearing = angle_between_cue_and_ball(&cue, &ball).unwrap();
        assert!((bearing - FRAC_PI_2).abs() < 1e-5);
        assert!((angle_deviation(PI - 0.1, -PI + 0.1) - 0.2).abs() < 1e-5);
        assert!((angle_deviation(0.0, FRAC_PI_4) - FRAC_PI_4).abs() < 1e-6);
        assert!(angle_between_cue_and_ball(&cue, &cue).is_err());
    }

    #[test]
    fn force_round_trips_through_stroke_model() {
        let calibration = Calibration {
            max_force: f32::MAX,
            ..Calibration::default()
        };
        let cue = ball_at(0.0, 0.0);
        let contact = Vec2::new(100.0, 0.0);
        let desired = Vec2::new(200.0, 0.0);
        let force =
            cue_force_for_contact_velocity(&cue, contact, desired, 0.0, &calibration).unwrap();
        assert!(force.y.abs() < 1e-6 && force.x > 0.0);

        let launch = launch_speed_for_force(force.length(), cue.mass, &calibration);
        let arrival = launch - 100.0 * cue.drag / cue.mass;
        assert!((arrival - 200.0).abs() < 0.05, "arrived at {}", arrival);
    }

    #[test]
    fn cut_shots_need_more_force() {
        let calibration = Calibration {
            max_force: f32::MAX,
            ..Calibration::default()
        };
        let cue = ball_at(0.0, 0.0);
        let contact = Vec2::new(50.0, 0.0);
        let desired = Vec2::new(100.0, 0.0);
        let straight = cue_force_for_contact_velocity(&cue, contact, desired, 0.0, &calibration)
            .unwrap()
            .length();
        let cut = cue_force_for_contact_velocity(&cue, contact, desired, FRAC_PI_4, &calibration)
            .unwrap()
            .length();
        assert!(cut > straight);
    }

    #[test]
    fn force_is_capped() {
        let calibration = Calibration::default();
        let cue = ball_at(0.0, 0.0);
        let contact = Vec2::new(10.0, 0.0);
        let desired = Vec2::new(1.0e5, 0.0);
        let force =
            cue_force_for_contact_velocity(&cue, contact, desired, 0.0, &calibration).unwrap();
        assert!((force.length() - calibration.max_force).abs() < 1e-6);
    }

    #[test]
    fn grazing_cut_is_degenerate() {
        let cue = ball_at(0.0, 0.0);
        let result = cue_force_for_contact_velocity(
            &cue,
            Vec2::new(10.0, 0.0),
            Vec2::new(10.0, 0.0),
            FRAC_PI_2,
            &Calibration::default(),
        );
        assert_eq!(result, Err(GeometryError::Degenerate("cut too thin")));
    }
}
