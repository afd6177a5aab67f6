use std::sync::mpsc::{Receiver, TryRecvError};

use crate::api::types::ShotCommand;
use crate::error::PlanError;
use crate::players::{MoveContext, Player};

/// Adapter over external input: shots arrive on a channel.
///
/// Until a shot is queued the turn waits. A closed channel forfeits.
pub struct HumanPlayer {
    name: String,
    input: Receiver<ShotCommand>,
}

impl HumanPlayer {
    pub fn new(name: impl Into<String>, input: Receiver<ShotCommand>) -> Self {
        Self {
            name: name.into(),
            input,
        }
    }
}

impl Player for HumanPlayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn make_move(&mut self, _ctx: &MoveContext<'_>) -> Result<ShotCommand, PlanError> {
        match self.input.try_recv() {
            Ok(shot) => Ok(shot),
            Err(TryRecvError::Empty) => Err(PlanError::AwaitingInput),
            Err(TryRecvError::Disconnected) => Err(PlanError::NoLegalShot),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::{Ball, BallNumber};
    use crate::config::GameSettings;
    use glam::Vec2;
    use std::sync::mpsc;

    #[test]
    fn waits_then_plays_queued_shot() {
        let settings = GameSettings::default();
        let cue = Ball::new(BallNumber::CUE, Vec2::new(200.0, 200.0), 8.0, 1.0, 0.9);
        let balls = [cue];
        let ctx = MoveContext {
            player: 0,
            cue,
            balls: &balls,
            pockets: &[],
            groups: [None, None],
            players: 1,
            settings: &settings,
        };

        let (tx, rx) = mpsc::channel();
        let mut human = HumanPlayer::new("alice", rx);
        assert_eq!(human.make_move(&ctx), Err(PlanError::AwaitingInput));

        let shot = ShotCommand {
            position: cue.pos,
            force: Vec2::new(0.1, 0.0),
        };
        tx.send(shot).unwrap();
        assert_eq!(human.make_move(&ctx), Ok(shot));

        drop(tx);
        assert_eq!(human.make_move(&ctx), Err(PlanError::NoLegalShot));
    }
}
