use thiserror::Error;

use crate::store::StoreError;

/// Failures surfaced by [`crate::SyncChannel`]
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("session {0} not found")]
    SessionNotFound(String),
    #[error("session {0} is full")]
    SessionFull(String),
    #[error("could not connect to the shared store: {0}")]
    ConnectionFailure(#[source] StoreError),
    #[error("no free session code after {0} attempts")]
    NoFreeCode(usize),
    #[error("not in a session")]
    NotInSession,
    #[error("player {local} cannot publish during player {current}'s turn")]
    OutOfTurn { current: u8, local: u8 },
    #[error("turn must pass to player {expected}, not {requested}")]
    InvalidTurn { expected: u8, requested: u8 },
    #[error("score of player {player} cannot drop from {stored} to {requested}")]
    ScoreRegression {
        player: u8,
        stored: u32,
        requested: u32,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("malformed session data: {0}")]
    Codec(#[from] postcard::Error),
}
