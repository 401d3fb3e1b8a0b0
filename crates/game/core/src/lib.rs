//! Deterministic combat-resolution rules for a grid-based tactical game.
//!
//! `tactics-core` covers the five coupled subsystems of turn resolution:
//! grid geometry and line tracing, blocking-set construction, shadowcasting
//! visibility, dynamic lighting, budgeted pathfinding, and the declarative
//! action engine. Everything is a pure, synchronous function of the snapshot
//! it is handed; randomness enters only through the injectable
//! [`rng::RngOracle`], and mutation only through returned snapshots.
pub mod action;
pub mod blocking;
pub mod board;
pub mod config;
pub mod error;
pub mod grid;
pub mod lighting;
pub mod path;
pub mod rng;
pub mod state;
pub mod vision;

pub use action::{
    ActionDefinition, ActionEvent, ActionResolution, AdvantageState, AttackSpec, Condition,
    ConditionSpec, DamageType, Displacement, EffectHooks, EffectKind, EventKind, ExecutionPhase,
    Formula, NoHooks, OutcomeKind, RejectReason, Rejection, ResolveContext, ResourceCost,
    ResourceLedger, TargetIntent, TargetKind, TargetingSpec, UsageSpec, resolve_action,
};
pub use blocking::{BlockingSets, BoardBlocking, WallEdgeSets};
pub use board::{
    BoardState, DoorState, LightSource, ObstacleInstance, ObstacleType, ObstacleTypeId, Tint,
    WallKind, WallSegment,
};
pub use config::GameConfig;
pub use error::CoreError;
pub use grid::{Cell, Edge, GridDimensions, Side, Topology, chebyshev};
pub use lighting::{TintCell, light_levels, tint_field};
pub use path::{MovementProfile, PathContext, PathOptions, find_path};
pub use rng::{PcgRng, RngOracle, ScriptedRolls, compute_seed};
pub use state::{
    AbilityKind, AbilityScores, EconomyFlags, EncounterState, ResourceMeter, ResourcePool,
    StatusInstance, StatusKind, Team, Token, TokenArena, TokenId, TurnPhase, UsageCounter,
};
pub use vision::{
    LightVisionMode, Visibility, VisibilityMap, VisionContext, VisionProfile, VisionShape,
    is_cell_visible, visibility_map,
};
