//! Shot planning: geometry helpers, obstruction checks, single-shot selection
//! and a shallow expectimax search on top of it.

pub mod geometry;
pub mod lookahead;
pub mod obstruction;
pub mod shot;
