//! Drives a [`GameLogic`] over a steppable table.

use crate::api::events::GameEvent;
use crate::api::table::{Simulation, Table};
use crate::core::time::FixedTimestep;
use crate::rules::turn::{GameLogic, GameOutcome, TurnPhase};

/// Owns the game and paces it tick by tick.
///
/// Every tick: ask the current player to move if the game is waiting on a shot,
/// step the table, forward pocketed balls to the rules, then check whether the
/// table is at rest. The rules latch resolution, so the at-rest check can run on
/// every tick.
pub struct MatchRunner<S: Simulation> {
    game: GameLogic<S>,
    timestep: FixedTimestep,
    ticks: u64,
    shot_ticks: u32,
}

impl<S: Simulation> MatchRunner<S> {
    pub fn new(game: GameLogic<S>) -> Self {
        let dt = game.settings().calibration.fixed_dt;
        Self {
            game,
            timestep: FixedTimestep::new(dt),
            ticks: 0,
            shot_ticks: 0,
        }
    }

    pub fn game(&self) -> &GameLogic<S> {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut GameLogic<S> {
        &mut self.game
    }

    pub fn into_game(self) -> GameLogic<S> {
        self.game
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.game.drain_events()
    }

    /// Run one fixed tick. Returns `false` once the game is over.
    pub fn tick(&mut self) -> bool {
        if self.game.is_over() {
            return false;
        }
        if matches!(
            self.game.phase(),
            TurnPhase::AwaitingBreak | TurnPhase::AwaitingShot(_)
        ) {
            self.game.advance();
        }

        let sunk = self.game.table_mut().step();
        for ball in sunk {
            self.game.ball_sunk(ball);
        }
        self.ticks += 1;

        if self.game.is_awaiting_resolution() {
            self.shot_ticks += 1;
            let threshold = self.game.settings().calibration.speed_threshold;
            if self.game.table().balls_at_rest(threshold) {
                self.shot_ticks = 0;
                self.game.on_balls_stopped();
            } else if self.shot_ticks >= self.game.settings().rules.max_ticks_per_shot {
                log::warn!("balls still moving after {} ticks, abandoning", self.shot_ticks);
                self.game.abandon();
            }
        }
        !self.game.is_over()
    }

    /// Run as many ticks as `frame_dt` seconds of wall-clock time cover.
    /// Returns the number of ticks run.
    pub fn advance_by(&mut self, frame_dt: f32) -> u32 {
        let steps = self.timestep.accumulate(frame_dt);
        let mut ran = 0;
        for _ in 0..steps {
            ran += 1;
            if !self.tick() {
                break;
            }
        }
        ran
    }

    /// Run headless until the game ends or `max_ticks` ticks have passed.
    pub fn run(&mut self, max_ticks: u64) -> GameOutcome {
        self.run_with(max_ticks, |_| {})
    }

    /// Like [`MatchRunner::run`], handing every event to `on_event` as it is
    /// drained.
    pub fn run_with(&mut self, max_ticks: u64, mut on_event: impl FnMut(GameEvent)) -> GameOutcome {
        let limit = self.ticks.saturating_add(max_ticks);
        while self.ticks < limit {
            let running = self.tick();
            for event in self.game.drain_events() {
                on_event(event);
            }
            if !running {
                break;
            }
        }
        if !self.game.is_over() {
            log::warn!("tick budget of {} exhausted", max_ticks);
            self.game.abandon();
            for event in self.game.drain_events() {
                on_event(event);
            }
        }
        self.game.outcome().unwrap_or(GameOutcome::Abandoned)
    }
}
