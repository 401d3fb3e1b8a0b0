//! Declarative action definitions and the resolution engine.
//!
//! Actions are immutable configuration: a targeting spec, usage limits, a
//! condition tree, and an ordered effect list, all closed tagged unions
//! interpreted by exhaustive matches. Resolving one walks a fixed pipeline
//! (availability, target validation, plan compilation, effect execution) and
//! returns either a committed new snapshot with an event log or a rejection
//! value that touched nothing.

pub mod advantage;
pub mod condition;
pub mod effect;
pub mod events;
pub mod execute;
pub mod hooks;
pub mod plan;
pub mod targeting;

pub use advantage::{AdvantageState, AttackSpec};
pub use condition::{Condition, ConditionContext, ConditionSpec, ResourceLedger, SnapshotLedger};
pub use effect::{ActionEffect, DamageType, Displacement, EffectKind, ExecutionPhase, Formula};
pub use events::{
    ActionEvent, ActionResolution, EventKind, OutcomeKind, RejectReason, Rejection,
};
pub use execute::{ResolveContext, resolve_action};
pub use hooks::{EffectHooks, NoHooks};
pub use plan::{ActionPlan, DiceSpec, PrimitiveOp, compile};
pub use targeting::{ResolvedTarget, TargetIntent, TargetKind, TargetingSpec};

use crate::state::{ResourcePool, TurnPhase};

/// Per-use cost drawn from a resource ledger.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceCost {
    pub name: String,
    pub pool: ResourcePool,
    pub amount: i32,
}

/// Usage limits checked during availability; counters live on the token.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UsageSpec {
    /// Restrict to one turn phase; `None` allows both.
    pub phase: Option<TurnPhase>,
    pub per_turn: Option<u32>,
    pub per_encounter: Option<u32>,
    pub costs: Vec<ResourceCost>,
}

/// A complete declarative action record.
///
/// Loaded by the surrounding application; the core defines the shape but not
/// the storage. Only token/board state mutates during play.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionDefinition {
    /// Stable id; also the key for per-token usage counters.
    pub id: String,
    pub name: String,
    pub targeting: TargetingSpec,
    pub usage: UsageSpec,
    /// Actor-side requirements checked before a target exists.
    pub availability: Vec<ConditionSpec>,
    /// Target-side conditions evaluated during validation.
    pub conditions: Vec<ConditionSpec>,
    pub effects: Vec<ActionEffect>,
    /// Weapon tags feeding attack-roll compilation and the loading rule.
    pub attack: Option<AttackSpec>,
}

impl ActionDefinition {
    pub fn new(id: impl Into<String>, name: impl Into<String>, targeting: TargetingSpec) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            targeting,
            usage: UsageSpec::default(),
            availability: Vec::new(),
            conditions: Vec::new(),
            effects: Vec::new(),
            attack: None,
        }
    }

    pub fn with_effect(mut self, kind: EffectKind) -> Self {
        self.effects.push(ActionEffect::new(kind));
        self
    }

    pub fn with_effect_in(mut self, kind: EffectKind, phase: ExecutionPhase) -> Self {
        self.effects.push(ActionEffect::in_phase(kind, phase));
        self
    }

    pub fn with_attack(mut self, attack: AttackSpec) -> Self {
        self.attack = Some(attack);
        self
    }

    pub fn with_condition(mut self, condition: Condition, reason: impl Into<String>) -> Self {
        self.conditions.push(ConditionSpec::new(condition, reason));
        self
    }

    pub fn with_availability(mut self, condition: Condition, reason: impl Into<String>) -> Self {
        self.availability
            .push(ConditionSpec::new(condition, reason));
        self
    }

    pub fn with_usage(mut self, usage: UsageSpec) -> Self {
        self.usage = usage;
        self
    }
}
