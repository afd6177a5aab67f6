//! The turn state machine: whose turn it is, group assignment, scoring,
//! fouls and the end of the game.
//!
//! ```text
//! AwaitingBreak -> BallsInMotion -> Resolving -> AwaitingShot(p) -> BallsInMotion -> ...
//!                                             \-> GameOver(outcome)
//! ```
//!
//! The physics collaborator reports each pocketed ball through
//! [`GameLogic::ball_sunk`] as it is detected, and the host calls
//! [`GameLogic::on_balls_stopped`] whenever the table is at rest. That signal is
//! level-triggered, so resolution is latched: it runs once per shot.

use glam::Vec2;
use serde::Serialize;

use crate::api::events::GameEvent;
use crate::api::table::Table;
use crate::api::types::{BallGroup, BallNumber, ShotCommand};
use crate::config::GameSettings;
use crate::error::{ConfigError, PlanError};
use crate::players::{MoveContext, Player};
use crate::rules::groups::GroupBook;

/// Where the game is in its turn cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TurnPhase {
    AwaitingBreak,
    AwaitingShot(usize),
    BallsInMotion,
    Resolving,
    GameOver(GameOutcome),
}

/// How a game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GameOutcome {
    Won { winner: usize },
    /// The only player of a solo game lost.
    Lost { loser: usize },
    /// Stopped without a result (turn or tick budget exhausted).
    Abandoned,
}

/// Flags collected during the shot in progress.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TurnState {
    pub go_again: bool,
    pub scratched: bool,
    pub special_sunk: bool,
    /// The mover's group was already locked when the 8-ball dropped.
    pub special_legal: bool,
    pub initial_break: bool,
    /// The mover potted a ball of their own group.
    pub potted_own: bool,
    pub sunk: Vec<BallNumber>,
}

struct PlayerSlot {
    player: Box<dyn Player>,
    group: Option<BallGroup>,
    score: u32,
}

/// Owns the rules, the players and the table collaborator.
pub struct GameLogic<T: Table> {
    table: T,
    settings: GameSettings,
    players: Vec<PlayerSlot>,
    current: usize,
    phase: TurnPhase,
    turn: TurnState,
    last_turn: Option<TurnState>,
    groups: GroupBook,
    awaiting_resolution: bool,
    turns_taken: u32,
    events: Vec<GameEvent>,
}

impl<T: Table> GameLogic<T> {
    /// Set up a game. One or two players, in turn order.
    pub fn new(
        table: T,
        players: Vec<Box<dyn Player>>,
        settings: GameSettings,
    ) -> Result<Self, ConfigError> {
        if players.is_empty() || players.len() > 2 {
            return Err(ConfigError::InvalidPlayerCount(players.len()));
        }
        let players = players
            .into_iter()
            .map(|player| PlayerSlot {
                player,
                group: None,
                score: 0,
            })
            .collect();
        Ok(Self {
            table,
            settings,
            players,
            current: 0,
            phase: TurnPhase::AwaitingBreak,
            turn: TurnState::default(),
            last_turn: None,
            groups: GroupBook::new(),
            awaiting_resolution: false,
            turns_taken: 0,
            events: Vec::new(),
        })
    }

    // -- Accessors --

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    pub fn current_player(&self) -> usize {
        self.current
    }

    pub fn num_players(&self) -> usize {
        self.players.len()
    }

    pub fn player_name(&self, player: usize) -> Option<&str> {
        self.players.get(player).map(|s| s.player.name())
    }

    pub fn player_group(&self, player: usize) -> Option<BallGroup> {
        self.players.get(player).and_then(|s| s.group)
    }

    pub fn player_score(&self, player: usize) -> u32 {
        self.players.get(player).map_or(0, |s| s.score)
    }

    /// Flags of the shot in progress.
    pub fn turn_state(&self) -> &TurnState {
        &self.turn
    }

    /// Flags of the most recently resolved shot.
    pub fn last_turn(&self) -> Option<&TurnState> {
        self.last_turn.as_ref()
    }

    pub fn remaining(&self, group: BallGroup) -> &[BallNumber] {
        self.groups.remaining(group)
    }

    pub fn turns_taken(&self) -> u32 {
        self.turns_taken
    }

    pub fn is_awaiting_resolution(&self) -> bool {
        self.awaiting_resolution
    }

    pub fn is_over(&self) -> bool {
        matches!(self.phase, TurnPhase::GameOver(_))
    }

    pub fn outcome(&self) -> Option<GameOutcome> {
        match self.phase {
            TurnPhase::GameOver(outcome) => Some(outcome),
            _ => None,
        }
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    pub fn table(&self) -> &T {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut T {
        &mut self.table
    }

    /// Take the events emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    fn is_multiplayer(&self) -> bool {
        self.players.len() > 1
    }

    fn opponent_of(&self, player: usize) -> Option<usize> {
        if self.is_multiplayer() {
            Some((player + 1) % self.players.len())
        } else {
            None
        }
    }

    fn owner_of(&self, group: BallGroup) -> Option<usize> {
        self.players.iter().position(|s| s.group == Some(group))
    }

    // -- Turn cycle --

    /// Move the game forward when it is waiting on a shot: fire the break, or
    /// ask the current player to move. Does nothing in any other phase.
    pub fn advance(&mut self) {
        match self.phase {
            TurnPhase::AwaitingBreak => self.break_rack(),
            TurnPhase::AwaitingShot(player) => self.request_move(player),
            _ => {}
        }
    }

    /// Fire the opening shot: a fixed force along the table's long axis,
    /// regardless of what the planner would do.
    fn break_rack(&mut self) {
        let Some(cue) = self.table.cue() else {
            self.table.place_cue(self.settings.table.cue_spot);
            return;
        };
        log::info!("{} breaks", self.players[self.current].player.name());
        self.emit(GameEvent::CurrentPlayerChanged {
            player: self.current,
        });
        let force = Vec2::X * self.settings.calibration.break_force;
        self.submit(
            ShotCommand {
                position: cue.pos,
                force,
            },
            true,
        );
    }

    fn request_move(&mut self, player: usize) {
        let Some(cue) = self.table.cue() else {
            self.table.place_cue(self.settings.table.cue_spot);
            return;
        };
        let balls = self.table.balls_on_table();
        let own = self.players[player].group;
        let opponent = self.opponent_of(player).and_then(|p| self.players[p].group);
        let ctx = MoveContext {
            player,
            cue,
            balls: &balls,
            pockets: self.table.pockets(),
            groups: [own, opponent],
            players: self.players.len(),
            settings: &self.settings,
        };

        match self.players[player].player.make_move(&ctx) {
            Ok(shot) => self.submit(shot, false),
            Err(PlanError::AwaitingInput) => {}
            Err(e) => self.forfeit(player, e),
        }
    }

    /// The player could not produce a shot: the turn passes without a stroke.
    fn forfeit(&mut self, player: usize, reason: PlanError) {
        log::warn!(
            "{} forfeits the turn: {}",
            self.players[player].player.name(),
            reason
        );
        self.emit(GameEvent::TurnForfeited { player });
        self.turn = TurnState::default();
        self.finish_turn();
        if !self.is_over() {
            self.take_next_turn();
        }
    }

    fn submit(&mut self, shot: ShotCommand, is_break: bool) {
        self.turn = TurnState {
            initial_break: is_break,
            ..TurnState::default()
        };
        self.table.apply_force(BallNumber::CUE, shot.position, shot.force);
        self.emit(GameEvent::ShotTaken {
            player: self.current,
            force: shot.force,
            is_break,
        });
        self.phase = TurnPhase::BallsInMotion;
        self.awaiting_resolution = true;
    }

    /// A ball dropped into a pocket. Called by the physics collaborator as
    /// soon as it detects the drop.
    pub fn ball_sunk(&mut self, ball: BallNumber) {
        if self.is_over() {
            return;
        }
        let current = self.current;
        log::info!("{} sunk", ball);
        self.turn.sunk.push(ball);
        self.emit(GameEvent::BallSunk {
            ball,
            player: current,
        });

        if ball.is_cue() {
            self.turn.scratched = true;
            return;
        }
        if ball.is_eight() {
            self.groups.remove(ball);
            self.turn.special_sunk = true;
            self.turn.special_legal = self.players[current].group == Some(BallGroup::Locked);
            return;
        }
        let Some(group) = ball.group() else {
            log::warn!("ignoring unknown ball {}", ball);
            return;
        };

        if self.players[current].group.is_none() {
            self.assign_groups(current, group);
        }
        if !self.groups.remove(ball) {
            log::warn!("{} reported sunk twice", ball);
            return;
        }

        if let Some(owner) = self.owner_of(group) {
            self.players[owner].score += 1;
            let score = self.players[owner].score;
            self.emit(GameEvent::ScoreUpdated {
                player: owner,
                score,
            });
            if owner == current {
                self.turn.potted_own = true;
            }
            if self.groups.is_cleared(group) {
                log::info!("{} cleared their group", self.players[owner].player.name());
                self.players[owner].group = Some(BallGroup::Locked);
                self.emit(GameEvent::GroupLocked { player: owner });
            }
        }
    }

    fn assign_groups(&mut self, player: usize, group: BallGroup) {
        log::info!("{} takes {:?}", self.players[player].player.name(), group);
        self.players[player].group = Some(group);
        self.emit(GameEvent::GroupsAssigned { player, group });
        if let Some(opponent) = self.opponent_of(player) {
            self.players[opponent].group = Some(group.other());
            self.emit(GameEvent::GroupsAssigned {
                player: opponent,
                group: group.other(),
            });
        }
    }

    /// The table came to rest. Resolves the shot once, then hands the table to
    /// the next player and asks them to move.
    pub fn on_balls_stopped(&mut self) {
        if !self.awaiting_resolution {
            return;
        }
        self.awaiting_resolution = false;
        self.phase = TurnPhase::Resolving;
        self.resolve_turn();
        if !self.is_over() {
            self.take_next_turn();
            self.advance();
        }
    }

    fn resolve_turn(&mut self) {
        let current = self.current;
        if self.turn.special_sunk {
            if self.turn.scratched {
                log::info!("scratch on the 8-ball");
                self.player_lose(current);
            } else if self.turn.special_legal {
                self.player_win(current);
            } else {
                log::info!("8-ball sunk early");
                self.player_lose(current);
            }
            self.finish_turn();
            return;
        }

        if self.turn.scratched {
            log::info!("{} scratched", self.players[current].player.name());
            self.emit(GameEvent::Scratch { player: current });
            self.table.place_cue(self.settings.table.cue_spot);
            self.turn.go_again = false;
        } else {
            self.turn.go_again = self.turn.potted_own;
        }
        self.finish_turn();
    }

    /// Close the books on the turn and enforce the turn budget.
    fn finish_turn(&mut self) {
        self.turns_taken += 1;
        self.last_turn = Some(self.turn.clone());
        if !self.is_over() && self.turns_taken >= self.settings.rules.max_turns {
            log::warn!("turn limit of {} reached", self.settings.rules.max_turns);
            self.abandon();
        }
    }

    /// Pick who shoots next: the same player after a legal pot, otherwise the
    /// next player in order. Returns the new current player.
    fn take_next_turn(&mut self) -> usize {
        if self.is_over() {
            return self.current;
        }
        let go_again = self.last_turn.as_ref().is_some_and(|t| t.go_again);
        let previous = self.current;
        if !go_again {
            self.current = (self.current + 1) % self.players.len();
        }
        if self.current != previous || !self.is_multiplayer() {
            self.emit(GameEvent::CurrentPlayerChanged {
                player: self.current,
            });
        }
        self.phase = TurnPhase::AwaitingShot(self.current);
        self.current
    }

    fn player_win(&mut self, player: usize) {
        if self.is_over() {
            return;
        }
        log::info!("{} wins", self.players[player].player.name());
        let loser = self.opponent_of(player);
        self.end_game(GameOutcome::Won { winner: player }, Some(player), loser);
    }

    fn player_lose(&mut self, player: usize) {
        if self.is_over() {
            return;
        }
        log::info!("{} loses", self.players[player].player.name());
        match self.opponent_of(player) {
            Some(winner) => self.end_game(GameOutcome::Won { winner }, Some(winner), Some(player)),
            None => self.end_game(GameOutcome::Lost { loser: player }, None, Some(player)),
        }
    }

    /// Stop the game without a result.
    pub fn abandon(&mut self) {
        if !self.is_over() {
            self.awaiting_resolution = false;
            self.end_game(GameOutcome::Abandoned, None, None);
        }
    }

    fn end_game(&mut self, outcome: GameOutcome, winner: Option<usize>, loser: Option<usize>) {
        self.phase = TurnPhase::GameOver(outcome);
        let multiplayer = self.is_multiplayer();
        self.emit(GameEvent::GameOver {
            winner,
            loser,
            multiplayer,
        });
    }
}
