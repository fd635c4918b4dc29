use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse game config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid game config: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum DeckError {
    #[error("failed to parse word database: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors from the move handler. Refused clicks are outcomes, not errors.
/// Config and deck problems surface before a session exists, so they keep
/// their own types.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("no pair is waiting for an association")]
    NoPendingPair,

    #[error("high score needs a player name")]
    EmptyPlayerName,
}
