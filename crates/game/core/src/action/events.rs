//! Structured results of an action resolution.
//!
//! Side effects are observable only through the returned snapshot and the
//! event list; rejections are values carrying a machine-checkable reason.

use crate::grid::Cell;
use crate::state::{EncounterState, TokenId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EventKind {
    Attack,
    SavingThrow,
    Damage,
    Heal,
    TempHp,
    Move,
    Teleport,
    Displace,
    Swap,
    StatusApplied,
    StatusRemoved,
    ResourceSpent,
    ResourceRestored,
    FlagToggled,
    Spawn,
    Despawn,
    Death,
    VisualEffect,
    /// A primitive that could not apply; logged, never fatal.
    NoOp,
}

/// One entry of the resolution log.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionEvent {
    pub kind: EventKind,
    pub actor: TokenId,
    pub target: Option<TokenId>,
    pub summary: String,
    pub amount: Option<i32>,
    pub cell: Option<Cell>,
}

impl ActionEvent {
    pub fn new(kind: EventKind, actor: TokenId, summary: impl Into<String>) -> Self {
        Self {
            kind,
            actor,
            target: None,
            summary: summary.into(),
            amount: None,
            cell: None,
        }
    }

    pub fn target(mut self, target: TokenId) -> Self {
        self.target = Some(target);
        self
    }

    pub fn amount(mut self, amount: i32) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn at(mut self, cell: Cell) -> Self {
        self.cell = Some(cell);
        self
    }
}

/// Headline outcome of the whole resolution. Actions without an attack roll
/// or saving throw resolve as plain `Resolved`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OutcomeKind {
    Hit,
    Miss,
    Crit,
    SaveSuccess,
    SaveFail,
    #[default]
    Resolved,
}

/// Machine-checkable rejection reasons.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RejectReason {
    ActorIncapacitated,
    WrongPhase,
    InsufficientResource,
    UsageExhausted,
    WeaponNotLoaded,
    RequirementFailed,
    InvalidTarget,
    TargetDead,
    HeightMismatch,
    OutOfRange,
    ConditionFailed,
    TargetNotVisible,
    LineOfEffectBlocked,
    /// A reaction hook cancelled the plan before any mutation committed.
    Interrupted,
}

/// A refused action: reason plus optional human-readable details. Carries no
/// state because nothing mutated.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rejection {
    pub reason: RejectReason,
    pub details: Vec<String>,
}

impl Rejection {
    pub fn new(reason: RejectReason) -> Self {
        Self {
            reason,
            details: Vec::new(),
        }
    }

    pub fn with_detail(reason: RejectReason, detail: impl Into<String>) -> Self {
        Self {
            reason,
            details: vec![detail.into()],
        }
    }
}

/// Terminal state of one resolution.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionResolution {
    /// The plan ran; the snapshot is the committed new state.
    Resolved {
        outcome: OutcomeKind,
        state: EncounterState,
        events: Vec<ActionEvent>,
    },
    /// Refused before execution; the caller's snapshot is untouched.
    Rejected(Rejection),
}

impl ActionResolution {
    pub fn is_rejected(&self) -> bool {
        matches!(self, ActionResolution::Rejected(_))
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            ActionResolution::Rejected(rejection) => Some(rejection),
            ActionResolution::Resolved { .. } => None,
        }
    }

    pub fn events(&self) -> &[ActionEvent] {
        match self {
            ActionResolution::Resolved { events, .. } => events,
            ActionResolution::Rejected(_) => &[],
        }
    }
}
