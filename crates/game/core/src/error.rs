//! Hard-failure surface of the core.
//!
//! Rule rejections (bad target, out of range, unmet conditions) are values,
//! not errors — see [`crate::action::Rejection`]. `CoreError` covers the
//! cases where the caller handed the engine an inconsistent snapshot.

use crate::state::TokenId;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CoreError {
    /// Referenced token does not exist in the arena.
    #[error("token {0:?} not found")]
    TokenNotFound(TokenId),

    /// Referenced obstacle type has no registered definition.
    #[error("obstacle type {0} not registered")]
    ObstacleTypeNotFound(u16),
}
