//! Declarative effects that compose into actions.
//!
//! An action is an ordered list of effects; the plan compiler lowers each
//! effect into primitive operations against the live snapshot. Effects are
//! immutable configuration, only token/board state mutates.

use crate::state::{AbilityKind, EconomyFlags, ResourcePool, StatusKind, Team};

// ============================================================================
// Execution phases
// ============================================================================

/// Execution phase for effect ordering. Effects run in phase order; within a
/// phase, higher priority runs first, then definition order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExecutionPhase {
    /// Setup before the main effects (self-buffs, marks).
    PreEffect = 0,
    /// Main damage/healing/movement phase.
    #[default]
    Primary = 1,
    /// Riders that follow the main effects (on-hit statuses, lifesteal).
    PostEffect = 2,
    /// Cleanup (resource spends, flag toggles).
    Finalize = 3,
}

// ============================================================================
// Formulas
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DamageType {
    Slashing,
    Piercing,
    Bludgeoning,
    Fire,
    Cold,
    Lightning,
    Poison,
    Radiant,
    Necrotic,
}

/// Numeric value resolved at plan-compilation time against the acting
/// token's stats.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Formula {
    Constant(i32),
    /// `count`d`sides` + flat bonus.
    Dice { count: u32, sides: u32, bonus: i32 },
    /// `count`d`sides` + the actor's ability modifier.
    AbilityDice {
        count: u32,
        sides: u32,
        ability: AbilityKind,
    },
}

// ============================================================================
// Displacement
// ============================================================================

/// Forced movement applied to the target, relative to the actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Displacement {
    /// Knock the target straight away from the actor.
    Push { distance: u32 },
    /// Drag the target toward the actor.
    Pull { distance: u32 },
}

// ============================================================================
// Effect kinds
// ============================================================================

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectKind {
    /// Attack roll against the target's armor class; the damage lands only
    /// on a hit and doubles its dice on a crit.
    Attack { formula: Formula, damage_type: DamageType },
    /// Unconditional damage (no attack roll). Halved when a saving throw in
    /// the same action succeeded.
    Damage { formula: Formula, damage_type: DamageType },
    /// Target rolls a saving throw against a difficulty class.
    Save { ability: AbilityKind, dc: i32 },
    Heal { formula: Formula },
    /// Temporary hit points never stack; the larger grant wins.
    GrantTempHp { formula: Formula },
    /// Actor walks toward the target cell through the pathfinder.
    Move { max_distance: u32 },
    /// Actor relocates to the target cell without traversal.
    Teleport,
    /// Forced movement of the target.
    Displace(Displacement),
    /// Actor and target trade places.
    Swap,
    ApplyStatus { status: StatusKind, rounds: u32 },
    RemoveStatus { status: StatusKind },
    SpendResource {
        name: String,
        pool: ResourcePool,
        amount: i32,
    },
    RestoreResource {
        name: String,
        pool: ResourcePool,
        amount: i32,
    },
    ToggleFlag { flag: EconomyFlags },
    /// Summon a fresh token at the target cell.
    Spawn { name: String, team: Team, hp: u32 },
    /// Remove the target from play.
    Despawn,
    /// Rendering cue forwarded to the host; no gameplay effect.
    PlayVisualEffect { name: String },
}

/// An effect with its execution ordering.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionEffect {
    pub kind: EffectKind,
    #[cfg_attr(feature = "serde", serde(default))]
    pub phase: ExecutionPhase,
    /// Higher runs earlier within the phase.
    #[cfg_attr(feature = "serde", serde(default))]
    pub priority: i32,
}

impl ActionEffect {
    pub fn new(kind: EffectKind) -> Self {
        Self {
            kind,
            phase: ExecutionPhase::Primary,
            priority: 0,
        }
    }

    pub fn in_phase(kind: EffectKind, phase: ExecutionPhase) -> Self {
        Self {
            kind,
            phase,
            priority: 0,
        }
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}
