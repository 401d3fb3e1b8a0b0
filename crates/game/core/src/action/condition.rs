//! Condition trees evaluated during availability and target validation.
//!
//! Conditions form a closed tagged union interpreted by one exhaustive
//! `match`; new kinds extend the enum and the interpreter, never the callers.

use crate::grid::Cell;
use crate::state::{AbilityKind, EncounterState, ResourcePool, StatusKind, TokenId, TurnPhase};

// ============================================================================
// Resource ledger
// ============================================================================

/// Accessor for named resource amounts.
///
/// The default implementation reads the snapshot directly; hosts with an
/// external economy (party inventory, campaign currencies) substitute their
/// own.
pub trait ResourceLedger {
    fn amount(&self, name: &str, pool: ResourcePool) -> i32;
}

/// Ledger backed by the encounter snapshot itself.
pub struct SnapshotLedger<'a> {
    pub state: &'a EncounterState,
    pub actor: TokenId,
}

impl ResourceLedger for SnapshotLedger<'_> {
    fn amount(&self, name: &str, pool: ResourcePool) -> i32 {
        match pool {
            ResourcePool::Personal => self
                .state
                .tokens
                .get(self.actor)
                .map(|t| t.resource(name))
                .unwrap_or(0),
            ResourcePool::Shared => self
                .state
                .shared_resources
                .get(name)
                .copied()
                .unwrap_or(0),
        }
    }
}

// ============================================================================
// Condition tree
// ============================================================================

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Condition {
    /// Current turn phase matches.
    Phase(TurnPhase),
    /// Ledger holds at least this much of a named resource.
    ResourceAtLeast {
        name: String,
        pool: ResourcePool,
        amount: i32,
    },
    /// The actor's ability score meets a threshold.
    ActorAbilityAtLeast { ability: AbilityKind, score: i32 },
    ActorHasStatus(StatusKind),
    ActorMissingStatus(StatusKind),
    TargetHasStatus(StatusKind),
    TargetMissingStatus(StatusKind),
    /// Target hp is strictly below a percentage of maximum.
    TargetHpBelowPercent(u32),
    DistanceAtMost(u32),
    DistanceAtLeast(u32),
    /// Light level at the target cell meets a threshold.
    LightAtLeast(f32),
    LightBelow(f32),
    And(Vec<Condition>),
    Or(Vec<Condition>),
    Not(Box<Condition>),
}

/// A condition paired with the rejection reason reported when it fails.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConditionSpec {
    pub condition: Condition,
    pub reason: String,
}

impl ConditionSpec {
    pub fn new(condition: Condition, reason: impl Into<String>) -> Self {
        Self {
            condition,
            reason: reason.into(),
        }
    }
}

/// Everything a condition may inspect. Target fields are `None` during
/// availability checks; target conditions then evaluate to false.
pub struct ConditionContext<'a> {
    pub state: &'a EncounterState,
    pub actor: TokenId,
    pub target: Option<TokenId>,
    pub target_cell: Option<Cell>,
    pub ledger: &'a dyn ResourceLedger,
    pub light: Option<&'a [f32]>,
}

pub fn eval(condition: &Condition, ctx: &ConditionContext<'_>) -> bool {
    match condition {
        Condition::Phase(phase) => ctx.state.phase == *phase,
        Condition::ResourceAtLeast { name, pool, amount } => {
            ctx.ledger.amount(name, *pool) >= *amount
        }
        Condition::ActorAbilityAtLeast { ability, score } => ctx
            .state
            .tokens
            .get(ctx.actor)
            .is_some_and(|t| t.abilities.score(*ability) >= *score),
        Condition::ActorHasStatus(kind) => ctx
            .state
            .tokens
            .get(ctx.actor)
            .is_some_and(|t| t.has_status(*kind)),
        Condition::ActorMissingStatus(kind) => ctx
            .state
            .tokens
            .get(ctx.actor)
            .is_some_and(|t| !t.has_status(*kind)),
        Condition::TargetHasStatus(kind) => target_token(ctx).is_some_and(|t| t.has_status(*kind)),
        Condition::TargetMissingStatus(kind) => {
            target_token(ctx).is_some_and(|t| !t.has_status(*kind))
        }
        Condition::TargetHpBelowPercent(percent) => target_token(ctx)
            .is_some_and(|t| t.hp.current * 100 < t.hp.maximum * percent),
        Condition::DistanceAtMost(max) => distance(ctx).is_some_and(|d| d <= *max),
        Condition::DistanceAtLeast(min) => distance(ctx).is_some_and(|d| d >= *min),
        Condition::LightAtLeast(threshold) => light_at_target(ctx).is_some_and(|l| l >= *threshold),
        Condition::LightBelow(threshold) => light_at_target(ctx).is_some_and(|l| l < *threshold),
        Condition::And(all) => all.iter().all(|c| eval(c, ctx)),
        Condition::Or(any) => any.iter().any(|c| eval(c, ctx)),
        Condition::Not(inner) => !eval(inner, ctx),
    }
}

fn target_token<'a>(ctx: &'a ConditionContext<'_>) -> Option<&'a crate::state::Token> {
    ctx.target.and_then(|id| ctx.state.tokens.get(id))
}

fn distance(ctx: &ConditionContext<'_>) -> Option<u32> {
    let actor = ctx.state.tokens.get(ctx.actor)?;
    let cell = ctx.target_cell?;
    Some(ctx.state.board.topology.distance(actor.position, cell))
}

fn light_at_target(ctx: &ConditionContext<'_>) -> Option<f32> {
    let cell = ctx.target_cell?;
    let light = ctx.light?;
    let dims = ctx.state.board.dims;
    if !dims.contains(cell) {
        return None;
    }
    light.get(dims.index(cell)).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::BoardState;
    use crate::grid::GridDimensions;
    use crate::state::{StatusInstance, Team, Token};

    fn two_token_state() -> (EncounterState, TokenId, TokenId) {
        let mut state = EncounterState::new(BoardState::open(GridDimensions::new(10, 10)));
        let actor = state.tokens.insert(
            Token::new(TokenId(0), "pc", Team::Player, Cell::new(2, 2)).with_resource("mana", 3),
        );
        let foe = state
            .tokens
            .insert(Token::new(TokenId(0), "orc", Team::Enemy, Cell::new(5, 2)).with_hp(10));
        (state, actor, foe)
    }

    fn ctx_for<'a>(
        state: &'a EncounterState,
        actor: TokenId,
        target: TokenId,
        ledger: &'a dyn ResourceLedger,
    ) -> ConditionContext<'a> {
        let cell = state.tokens.get(target).unwrap().position;
        ConditionContext {
            state,
            actor,
            target: Some(target),
            target_cell: Some(cell),
            ledger,
            light: None,
        }
    }

    #[test]
    fn ledger_reads_personal_and_shared_pools() {
        let (mut state, actor, _) = two_token_state();
        state.shared_resources.insert("momentum".into(), 2);
        let ledger = SnapshotLedger { state: &state, actor };
        assert_eq!(ledger.amount("mana", ResourcePool::Personal), 3);
        assert_eq!(ledger.amount("momentum", ResourcePool::Shared), 2);
        assert_eq!(ledger.amount("missing", ResourcePool::Personal), 0);
    }

    #[test]
    fn boolean_operators_compose() {
        let (state, actor, foe) = two_token_state();
        let ledger = SnapshotLedger { state: &state, actor };
        let ctx = ctx_for(&state, actor, foe, &ledger);

        let tree = Condition::And(vec![
            Condition::DistanceAtMost(5),
            Condition::Not(Box::new(Condition::TargetHasStatus(StatusKind::Hidden))),
            Condition::Or(vec![
                Condition::ResourceAtLeast {
                    name: "mana".into(),
                    pool: ResourcePool::Personal,
                    amount: 99,
                },
                Condition::ActorAbilityAtLeast {
                    ability: AbilityKind::Strength,
                    score: 10,
                },
            ]),
        ]);
        assert!(eval(&tree, &ctx));
        assert!(!eval(&Condition::DistanceAtMost(2), &ctx));
    }

    #[test]
    fn execute_style_conditions_read_target_hp() {
        let (mut state, actor, foe) = two_token_state();
        state.tokens.get_mut(foe).unwrap().hp.deplete(8);
        let ledger = SnapshotLedger { state: &state, actor };
        let ctx = ctx_for(&state, actor, foe, &ledger);
        assert!(eval(&Condition::TargetHpBelowPercent(25), &ctx));
        assert!(!eval(&Condition::TargetHpBelowPercent(10), &ctx));
    }

    #[test]
    fn target_conditions_fail_without_a_target() {
        let (mut state, actor, foe) = two_token_state();
        state
            .tokens
            .get_mut(foe)
            .unwrap()
            .statuses
            .push(StatusInstance {
                kind: StatusKind::Marked,
                remaining_rounds: 2,
            });
        let ledger = SnapshotLedger { state: &state, actor };
        let ctx = ConditionContext {
            state: &state,
            actor,
            target: None,
            target_cell: None,
            ledger: &ledger,
            light: None,
        };
        assert!(!eval(&Condition::TargetHasStatus(StatusKind::Marked), &ctx));
        assert!(!eval(&Condition::DistanceAtMost(99), &ctx));
    }
}
