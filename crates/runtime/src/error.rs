//! Unified error types surfaced by the runtime API.
//!
//! Rule rejections stay values inside [`tactics_core::ActionResolution`];
//! `RuntimeError` covers host-side failures such as unknown action ids or
//! references to board features that do not exist.

use tactics_core::{Cell, CoreError, Edge, TokenId};

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Clone, thiserror::Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("no action registered under id {0:?}")]
    UnknownAction(String),

    #[error("token {0} not found in the encounter")]
    TokenNotFound(TokenId),

    #[error("no door on edge {0:?}")]
    NoDoorAt(Edge),

    #[error("no obstacle covering cell {0:?}")]
    NoObstacleAt(Cell),
}
