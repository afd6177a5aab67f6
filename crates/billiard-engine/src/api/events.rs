use glam::Vec2;
use serde::Serialize;

use crate::api::types::{BallGroup, BallNumber};

/// Notifications for the presentation layer. Buffered by the game and drained
/// by the host once per tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    CurrentPlayerChanged { player: usize },
    ShotTaken { player: usize, force: Vec2, is_break: bool },
    BallSunk { ball: BallNumber, player: usize },
    GroupsAssigned { player: usize, group: BallGroup },
    /// The player's group is cleared; only the 8-ball is left for them.
    GroupLocked { player: usize },
    ScoreUpdated { player: usize, score: u32 },
    Scratch { player: usize },
    /// The player had no shot and lost the turn.
    TurnForfeited { player: usize },
    GameOver {
        winner: Option<usize>,
        loser: Option<usize>,
        multiplayer: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_a_tag() {
        let json = serde_json::to_string(&GameEvent::BallSunk {
            ball: BallNumber(3),
            player: 1,
        })
        .unwrap();
        assert_eq!(json, r#"{"event":"ball_sunk","ball":3,"player":1}"#);

        let json = serde_json::to_string(&GameEvent::GroupsAssigned {
            player: 0,
            group: BallGroup::Stripes,
        })
        .unwrap();
        assert!(json.contains(r#""group":"stripes""#), "{}", json);
    }
}
