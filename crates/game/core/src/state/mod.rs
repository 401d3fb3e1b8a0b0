//! Token and encounter state.
//!
//! The engine is handed an [`EncounterState`] snapshot and returns a new one;
//! it never mutates caller-owned data in place. Dead tokens stay in the arena
//! (the log and the UI still need them) and are filtered from targeting,
//! vision, and pathing by callers via [`Token::is_alive`].

mod token;

pub use token::{AbilityKind, AbilityScores, Token, TokenArena};

use std::collections::BTreeMap;
use std::fmt;

use crate::board::BoardState;

/// Stable identifier for a token. Ids are never reused within an encounter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TokenId(pub u32);

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which side a token fights for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Team {
    Player,
    Enemy,
    Neutral,
}

impl Team {
    pub fn is_hostile_to(self, other: Team) -> bool {
        matches!(
            (self, other),
            (Team::Player, Team::Enemy) | (Team::Enemy, Team::Player)
        )
    }
}

/// Integer resource meter (hit points) tracked per token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceMeter {
    pub current: u32,
    pub maximum: u32,
}

impl ResourceMeter {
    pub fn full(maximum: u32) -> Self {
        Self {
            current: maximum,
            maximum,
        }
    }

    /// Subtracts damage, clamping at zero. Returns the amount actually lost.
    pub fn deplete(&mut self, amount: u32) -> u32 {
        let lost = amount.min(self.current);
        self.current -= lost;
        lost
    }

    /// Adds healing, clamping at maximum. Returns the amount actually gained.
    pub fn restore(&mut self, amount: u32) -> u32 {
        let gained = amount.min(self.maximum - self.current);
        self.current += gained;
        gained
    }
}

bitflags::bitflags! {
    /// Per-turn action-economy flags, reset by the host at turn start.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct EconomyFlags: u8 {
        const ACTION_USED = 1 << 0;
        const BONUS_USED = 1 << 1;
        const REACTION_USED = 1 << 2;
        /// Set when a loading weapon has fired this turn.
        const WEAPON_LOADED = 1 << 3;
        const MOVED = 1 << 4;
    }
}

/// Closed status-effect vocabulary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StatusKind {
    Prone,
    Stunned,
    Poisoned,
    Slowed,
    Hidden,
    Blessed,
    Marked,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusInstance {
    pub kind: StatusKind,
    /// Rounds left; the host decrements between rounds.
    pub remaining_rounds: u32,
}

/// Which ledger a named resource lives in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ResourcePool {
    /// Owned by the acting token (spell slots, ki, ammunition).
    Personal,
    /// Shared across the encounter (party-wide momentum, objective charges).
    Shared,
}

/// Turn phase; some actions are only available in one of them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TurnPhase {
    #[default]
    Player,
    Enemy,
}

/// Per-action usage counters tracked on the acting token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UsageCounter {
    pub this_turn: u32,
    pub this_encounter: u32,
}

/// Complete encounter snapshot: the board plus every token on it.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EncounterState {
    pub board: BoardState,
    pub tokens: TokenArena,
    pub round: u32,
    pub phase: TurnPhase,
    /// Encounter-wide resources, addressed by name.
    pub shared_resources: BTreeMap<String, i32>,
}

impl EncounterState {
    pub fn new(board: BoardState) -> Self {
        Self {
            board,
            tokens: TokenArena::default(),
            round: 1,
            phase: TurnPhase::Player,
            shared_resources: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meter_clamps_both_ways() {
        let mut hp = ResourceMeter::full(5);
        assert_eq!(hp.deplete(3), 3);
        assert_eq!(hp.deplete(9), 2);
        assert_eq!(hp.current, 0);
        assert_eq!(hp.restore(99), 5);
        assert_eq!(hp.current, 5);
    }

    #[test]
    fn hostility_is_symmetric_and_excludes_neutrals() {
        assert!(Team::Player.is_hostile_to(Team::Enemy));
        assert!(Team::Enemy.is_hostile_to(Team::Player));
        assert!(!Team::Player.is_hostile_to(Team::Neutral));
        assert!(!Team::Neutral.is_hostile_to(Team::Enemy));
    }
}
