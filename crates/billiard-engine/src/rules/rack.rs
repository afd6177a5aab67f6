//! Rack layout: which ball goes in which slot, and where the slots are.

use glam::Vec2;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::api::types::{BallGroup, BallNumber};

/// Slot of the 8-ball: middle of the third row.
pub const EIGHT_SLOT: usize = 4;
/// Back-row corner slots.
pub const SOLID_CORNER_SLOT: usize = 10;
pub const STRIPE_CORNER_SLOT: usize = 14;

/// Spacing added between racked balls so they start without overlap.
const RACK_GAP: f32 = 0.5;
/// Row spacing of an equilateral triangle, as a fraction of the ball pitch.
const ROW_PITCH: f32 = 0.866_025_4;

/// Ball numbers for the 15 rack slots, apex first then row by row.
///
/// The 8-ball sits in the middle of the third row, one back corner holds a
/// random solid and the other a random stripe; everything else is shuffled.
pub fn create_initial_ball_list<R: Rng + ?Sized>(rng: &mut R) -> [BallNumber; 15] {
    let mut solids = BallGroup::Solids.members().to_vec();
    let mut stripes = BallGroup::Stripes.members().to_vec();
    solids.shuffle(rng);
    stripes.shuffle(rng);

    let corner_solid = solids.pop().unwrap_or(BallNumber(1));
    let corner_stripe = stripes.pop().unwrap_or(BallNumber(9));

    let mut rest: Vec<BallNumber> = solids.into_iter().chain(stripes).collect();
    rest.shuffle(rng);
    let mut rest = rest.into_iter();

    let mut list = [BallNumber::CUE; 15];
    for (slot, entry) in list.iter_mut().enumerate() {
        *entry = match slot {
            EIGHT_SLOT => BallNumber::EIGHT,
            SOLID_CORNER_SLOT => corner_solid,
            STRIPE_CORNER_SLOT => corner_stripe,
            _ => rest.next().unwrap_or(BallNumber::CUE),
        };
    }
    list
}

/// Center of each rack slot. The apex points at the cue ball (toward -x),
/// rows advance along +x and spread along y.
///
/// ```text
///          0
///        1   2
///      3   4   5
///    6   7   8   9
/// 10  11  12  13  14
/// ```
pub fn rack_positions(apex: Vec2, ball_radius: f32) -> [Vec2; 15] {
    let gap = ball_radius * 2.0 + RACK_GAP;
    let row_offset = gap * ROW_PITCH;

    let mut positions = [Vec2::ZERO; 15];
    let mut slot = 0;
    for row in 0..5 {
        let x = apex.x + row as f32 * row_offset;
        let top = apex.y - row as f32 * gap / 2.0;
        for i in 0..=row {
            positions[slot] = Vec2::new(x, top + i as f32 * gap);
            slot += 1;
        }
    }
    positions
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn rack_holds_every_ball_once() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..20 {
            let list = create_initial_ball_list(&mut rng);
            let mut numbers: Vec<u8> = list.iter().map(|b| b.0).collect();
            numbers.sort_unstable();
            assert_eq!(numbers, (1..=15).collect::<Vec<u8>>());
        }
    }

    #[test]
    fn fixed_slots_are_respected() {
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        for _ in 0..20 {
            let list = create_initial_ball_list(&mut rng);
            assert_eq!(list[EIGHT_SLOT], BallNumber::EIGHT);
            assert_eq!(list[SOLID_CORNER_SLOT].group(), Some(BallGroup::Solids));
            assert_eq!(list[STRIPE_CORNER_SLOT].group(), Some(BallGroup::Stripes));
        }
    }

    #[test]
    fn same_seed_same_rack() {
        let a = create_initial_ball_list(&mut ChaCha8Rng::seed_from_u64(3));
        let b = create_initial_ball_list(&mut ChaCha8Rng::seed_from_u64(3));
        assert_eq!(a, b);
    }

    #[test]
    fn rack_slots_do_not_overlap() {
        let r = 8.0;
        let positions = rack_positions(Vec2::new(600.0, 200.0), r);
        assert_eq!(positions[0], Vec2::new(600.0, 200.0));
        for i in 0..15 {
            for j in (i + 1)..15 {
                let d = positions[i].distance(positions[j]);
                assert!(d >= 2.0 * r, "slots {} and {} overlap: {}", i, j, d);
            }
        }
        // Back row is symmetric about the apex line.
        assert!((positions[10].y + positions[14].y - 400.0).abs() < 1e-3);
        assert!((positions[12].y - 200.0).abs() < 1e-3);
    }

    #[test]
    fn neighbours_in_adjacent_rows_sit_one_pitch_apart() {
        let r = 8.0;
        let pitch = 2.0 * r + RACK_GAP;
        let positions = rack_positions(Vec2::new(600.0, 200.0), r);
        // Apex and both balls of the second row form an equilateral triangle.
        for (i, j) in [(0, 1), (0, 2), (1, 2), (3, 7), (7, 12)] {
            let d = positions[i].distance(positions[j]);
            assert!((d - pitch).abs() < 1e-3, "slots {} and {} are {} apart", i, j, d);
        }
    }
}
