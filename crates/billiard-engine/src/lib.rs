pub mod api;
pub mod config;
pub mod core;
pub mod error;
pub mod planner;
pub mod players;
pub mod rules;

// Re-export key types at crate root for convenience
pub use api::events::GameEvent;
pub use api::table::{Simulation, Table};
pub use api::types::{Ball, BallGroup, BallNumber, Pocket, ShotCommand};
pub use config::{Calibration, GameSettings, GameType, PlannerConfig, RulesConfig, TableConfig};
pub use core::runner::MatchRunner;
pub use core::time::FixedTimestep;
pub use error::{ConfigError, GeometryError, PlanError};
pub use planner::lookahead::{Evaluator, Lookahead, MaterialCount, SearchNode};
pub use planner::shot::{Shot, ShotPlanner};
pub use players::{AiPlayer, HumanPlayer, MoveContext, Player};
pub use rules::rack::create_initial_ball_list;
pub use rules::turn::{GameLogic, GameOutcome, TurnPhase, TurnState};

#[cfg(feature = "physics")]
pub use core::physics::{BodyDesc, ColliderDesc, ColliderMaterial, PhysicsBody, PhysicsWorld};
#[cfg(feature = "physics")]
pub use core::sim_table::SimTable;
