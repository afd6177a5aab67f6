use glam::Vec2;

use crate::api::types::Ball;

/// Distance from `point` to the segment `p1`..`p2`.
pub fn segment_point_distance(p1: Vec2, p2: Vec2, point: Vec2) -> f32 {
    let line = p2 - p1;
    let len_sq = line.length_squared();
    if len_sq < 0.0001 {
        return p1.distance(point);
    }
    // Project onto the line, clamped to the segment
    let t = ((point - p1).dot(line) / len_sq).clamp(0.0, 1.0);
    (p1 + line * t).distance(point)
}

/// Count balls whose center lies within `clearance` of the straight path
/// `from`..`to`. The caller leaves the cue and the object ball out of `balls`.
pub fn count_obstacles<'a>(
    balls: impl IntoIterator<Item = &'a Ball>,
    from: Vec2,
    to: Vec2,
    clearance: f32,
) -> usize {
    balls
        .into_iter()
        .filter(|b| segment_point_distance(from, to, b.pos) < clearance)
        .count()
}
