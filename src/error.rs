//! Error types surfaced by the battle engine.
//!
//! The engine only fails before a turn mutates anything: either the
//! descriptors it was handed are incomplete, or the caller picked a move
//! slot that does not exist.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BattleError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BattleError {
    #[error("{what} unavailable: {reason}")]
    DataUnavailable { what: String, reason: String },

    #[error("move slot {index} is not one of the {available} configured moves")]
    InvalidMoveSelection { index: usize, available: usize },

    #[error("battle is already over")]
    BattleOver,

    #[error("invalid battle options: {0}")]
    InvalidConfig(String),
}

impl BattleError {
    pub fn unavailable(what: impl Into<String>, reason: impl Into<String>) -> Self {
        BattleError::DataUnavailable {
            what: what.into(),
            reason: reason.into(),
        }
    }
}
