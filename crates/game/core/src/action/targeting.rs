//! Targeting rules and the intent handed in by the host.

use crate::grid::Cell;
use crate::state::TokenId;

/// Who or what an action may legally strike.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TargetKind {
    /// The actor itself; no intent required.
    SelfOnly,
    /// Any token on the enemy team.
    Enemy,
    /// Any token hostile to the actor's team.
    Hostile,
    /// Any token on the actor's own team.
    Ally,
    /// Any token on the player team.
    Player,
    /// A bare board cell (movement, area effects).
    Cell,
    /// No target at all; the action affects only the actor or the board.
    None,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TargetingSpec {
    pub kind: TargetKind,
    pub min_range: u32,
    pub max_range: u32,
    /// Require both visibility and an unobstructed line of effect.
    pub requires_los: bool,
}

impl TargetingSpec {
    pub fn self_only() -> Self {
        Self {
            kind: TargetKind::SelfOnly,
            min_range: 0,
            max_range: 0,
            requires_los: false,
        }
    }

    pub fn melee(kind: TargetKind) -> Self {
        Self {
            kind,
            min_range: 0,
            max_range: 1,
            requires_los: true,
        }
    }

    pub fn ranged(kind: TargetKind, max_range: u32) -> Self {
        Self {
            kind,
            min_range: 0,
            max_range,
            requires_los: true,
        }
    }

    pub fn cell(max_range: u32) -> Self {
        Self {
            kind: TargetKind::Cell,
            min_range: 0,
            max_range,
            requires_los: false,
        }
    }

    pub fn with_min_range(mut self, min_range: u32) -> Self {
        self.min_range = min_range;
        self
    }

    pub fn without_los(mut self) -> Self {
        self.requires_los = false;
        self
    }
}

/// The target chosen by the host (direct input or a remote AI decision).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TargetIntent {
    Token(TokenId),
    Cell(Cell),
    #[default]
    None,
}

/// Intent after validation: the concrete token (if any) plus the cell every
/// downstream range/line computation uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResolvedTarget {
    pub token: Option<TokenId>,
    pub cell: Cell,
}
