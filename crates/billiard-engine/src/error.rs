use thiserror::Error;

/// Invalid game setup. Fatal; raised before the game starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("a game needs one or two players, got {0}")]
    InvalidPlayerCount(usize),
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),
}

/// A shot whose geometry has no meaningful solution. The planner discards
/// the candidate instead of propagating NaN or infinity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeometryError {
    #[error("degenerate geometry: {0}")]
    Degenerate(&'static str),
}

/// Why a player could not produce a shot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error("no legal shot")]
    NoLegalShot,
    /// A human player has not supplied a shot yet. The turn waits.
    #[error("waiting for player input")]
    AwaitingInput,
}
