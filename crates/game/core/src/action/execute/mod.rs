//! The resolution pipeline: availability, validation, compilation, execution.
//!
//! Strictly sequential and deterministic for a given snapshot and seed. The
//! caller's state is read-only throughout; the committed result comes back
//! inside [`ActionResolution::Resolved`].

mod apply;
mod availability;
mod validate;

use crate::blocking::BoardBlocking;
use crate::error::CoreError;
use crate::rng::RngOracle;
use crate::state::{EncounterState, TokenId};

use super::advantage::AdvantageState;
use super::condition::{ResourceLedger, SnapshotLedger};
use super::events::{ActionResolution, RejectReason, Rejection};
use super::hooks::EffectHooks;
use super::plan;
use super::targeting::TargetIntent;
use super::ActionDefinition;

/// Board-derived inputs and collaborators for one resolution.
pub struct ResolveContext<'a> {
    pub blocking: &'a BoardBlocking,
    /// Precomputed light levels; `None` skips light-gated checks.
    pub light: Option<&'a [f32]>,
    /// External resource ledger; `None` reads the snapshot directly.
    pub ledger: Option<&'a dyn ResourceLedger>,
    pub rng: &'a dyn RngOracle,
    pub hooks: &'a dyn EffectHooks,
    /// Seed mixed into every random draw of this resolution.
    pub base_seed: u64,
    /// Caller-supplied advantage, merged with weapon tags at compile time.
    pub base_advantage: AdvantageState,
}

/// Resolves one action against a snapshot.
///
/// Returns `Err` only for inconsistent inputs (unknown actor). Every rules
/// outcome, including refusal, is an [`ActionResolution`] value.
pub fn resolve_action(
    def: &ActionDefinition,
    state: &EncounterState,
    actor: TokenId,
    intent: &TargetIntent,
    ctx: &ResolveContext<'_>,
) -> Result<ActionResolution, CoreError> {
    let actor_token = state
        .tokens
        .get(actor)
        .ok_or(CoreError::TokenNotFound(actor))?;
    if !actor_token.is_alive() {
        return Ok(ActionResolution::Rejected(Rejection::new(
            RejectReason::ActorIncapacitated,
        )));
    }

    let snapshot_ledger = SnapshotLedger { state, actor };
    let ledger: &dyn ResourceLedger = ctx.ledger.unwrap_or(&snapshot_ledger);

    if let Err(rejection) = availability::check(def, state, actor, ledger) {
        return Ok(ActionResolution::Rejected(rejection));
    }

    let target = match validate::validate(def, state, actor, intent, ctx, ledger) {
        Ok(target) => target,
        Err(rejection) => return Ok(ActionResolution::Rejected(rejection)),
    };

    let compiled = plan::compile(def, state, actor, &target, ctx.base_advantage)?;

    // Reaction window: the only hard abort, taken before any mutation.
    if ctx.hooks.interrupts(actor, &def.id) {
        return Ok(ActionResolution::Rejected(Rejection::new(
            RejectReason::Interrupted,
        )));
    }

    let (outcome, new_state, events) = apply::run(def, state, actor, &target, &compiled, ctx);
    Ok(ActionResolution::Resolved {
        outcome,
        state: new_state,
        events,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::advantage::AttackSpec;
    use crate::action::effect::{DamageType, EffectKind, Formula};
    use crate::action::events::{EventKind, OutcomeKind};
    use crate::action::hooks::NoHooks;
    use crate::action::targeting::{TargetKind, TargetingSpec};
    use crate::action::{ResourceCost, UsageSpec};
    use crate::board::{BoardState, DoorState, WallSegment};
    use crate::grid::{Cell, Edge, GridDimensions};
    use crate::rng::ScriptedRolls;
    use crate::state::{AbilityKind, ResourcePool, Team, Token};

    fn duel() -> (EncounterState, TokenId, TokenId) {
        let mut state = EncounterState::new(BoardState::open(GridDimensions::new(10, 10)));
        let pc = state.tokens.insert(
            Token::new(TokenId(0), "fighter", Team::Player, Cell::new(2, 2)).with_hp(20),
        );
        let orc = state
            .tokens
            .insert(Token::new(TokenId(0), "orc", Team::Enemy, Cell::new(3, 2)).with_hp(5));
        (state, pc, orc)
    }

    fn resolve_with(
        def: &ActionDefinition,
        state: &EncounterState,
        actor: TokenId,
        intent: TargetIntent,
        rolls: Vec<u32>,
    ) -> ActionResolution {
        let blocking = BoardBlocking::build(&state.board);
        let rng = ScriptedRolls::new(rolls);
        let ctx = ResolveContext {
            blocking: &blocking,
            light: None,
            ledger: None,
            rng: &rng,
            hooks: &NoHooks,
            base_seed: 0,
            base_advantage: AdvantageState::Normal,
        };
        resolve_action(def, state, actor, &intent, &ctx).unwrap()
    }

    fn strike() -> ActionDefinition {
        ActionDefinition::new("strike", "Strike", TargetingSpec::melee(TargetKind::Enemy))
            .with_attack(AttackSpec::new(AbilityKind::Strength))
            .with_effect(EffectKind::Attack {
                formula: Formula::Dice {
                    count: 1,
                    sides: 6,
                    bonus: 1,
                },
                damage_type: DamageType::Slashing,
            })
    }

    #[test]
    fn a_hit_deals_damage_and_leaves_the_input_untouched() {
        let (state, pc, orc) = duel();
        // d20 = 15 hits AC 10; d6 = 4, +1 = 5 damage.
        let result = resolve_with(&strike(), &state, pc, TargetIntent::Token(orc), vec![15, 4]);
        let ActionResolution::Resolved {
            outcome,
            state: after,
            events,
        } = result
        else {
            panic!("expected resolution");
        };
        assert_eq!(outcome, OutcomeKind::Hit);
        assert_eq!(after.tokens.get(orc).unwrap().hp.current, 0);
        assert!(events.iter().any(|e| e.kind == EventKind::Death));
        // Copy-on-write: the caller's snapshot is untouched.
        assert_eq!(state.tokens.get(orc).unwrap().hp.current, 5);
    }

    #[test]
    fn a_miss_skips_the_damage() {
        let (state, pc, orc) = duel();
        let result = resolve_with(&strike(), &state, pc, TargetIntent::Token(orc), vec![3]);
        let ActionResolution::Resolved {
            outcome,
            state: after,
            events,
        } = result
        else {
            panic!("expected resolution");
        };
        assert_eq!(outcome, OutcomeKind::Miss);
        assert_eq!(after.tokens.get(orc).unwrap().hp.current, 5);
        assert!(events.iter().any(|e| e.kind == EventKind::NoOp));
    }

    #[test]
    fn double_damage_clamps_hp_and_kills_exactly_once() {
        let (state, pc, orc) = duel();
        let def = ActionDefinition::new(
            "flurry",
            "Flurry",
            TargetingSpec::melee(TargetKind::Enemy),
        )
        .with_effect(EffectKind::Damage {
            formula: Formula::Constant(3),
            damage_type: DamageType::Bludgeoning,
        })
        .with_effect(EffectKind::Damage {
            formula: Formula::Constant(3),
            damage_type: DamageType::Bludgeoning,
        });

        let result = resolve_with(&def, &state, pc, TargetIntent::Token(orc), vec![]);
        let ActionResolution::Resolved { state: after, events, .. } = result else {
            panic!("expected resolution");
        };
        assert_eq!(after.tokens.get(orc).unwrap().hp.current, 0);
        let deaths = events.iter().filter(|e| e.kind == EventKind::Death).count();
        assert_eq!(deaths, 1);
    }

    #[test]
    fn wall_between_blocks_line_of_effect_until_the_door_opens() {
        let (mut state, pc, orc) = duel();
        let edge = Edge::between(Cell::new(2, 2), Cell::new(3, 2)).unwrap();
        state
            .board
            .walls
            .push(WallSegment::door(edge, DoorState::Closed));

        let rejected = resolve_with(&strike(), &state, pc, TargetIntent::Token(orc), vec![15, 4]);
        assert_eq!(
            rejected.rejection().unwrap().reason,
            RejectReason::LineOfEffectBlocked
        );

        state.board.set_door_state(edge, DoorState::Open);
        let resolved = resolve_with(&strike(), &state, pc, TargetIntent::Token(orc), vec![15, 4]);
        assert!(!resolved.is_rejected());
    }

    #[test]
    fn rejection_is_idempotent_and_mutation_free() {
        let (state, pc, orc) = duel();
        let def = strike();
        let intent = TargetIntent::Cell(Cell::new(5, 5));
        let first = resolve_with(&def, &state, pc, intent, vec![]);
        let second = resolve_with(&def, &state, pc, intent, vec![]);
        assert_eq!(first.rejection(), second.rejection());
        assert_eq!(state.tokens.get(orc).unwrap().hp.current, 5);
    }

    #[test]
    fn resource_costs_gate_and_then_deplete() {
        let (mut state, pc, orc) = duel();
        let mut def = ActionDefinition::new(
            "smite",
            "Smite",
            TargetingSpec::melee(TargetKind::Enemy),
        )
        .with_effect(EffectKind::Damage {
            formula: Formula::Constant(2),
            damage_type: DamageType::Radiant,
        });
        def.usage = UsageSpec {
            costs: vec![ResourceCost {
                name: "slots".into(),
                pool: ResourcePool::Personal,
                amount: 1,
            }],
            ..UsageSpec::default()
        };

        let broke = resolve_with(&def, &state, pc, TargetIntent::Token(orc), vec![]);
        assert_eq!(
            broke.rejection().unwrap().reason,
            RejectReason::InsufficientResource
        );

        state
            .tokens
            .get_mut(pc)
            .unwrap()
            .resources
            .insert("slots".into(), 2);
        let cast = resolve_with(&def, &state, pc, TargetIntent::Token(orc), vec![]);
        let ActionResolution::Resolved { state: after, .. } = cast else {
            panic!("expected resolution");
        };
        assert_eq!(after.tokens.get(pc).unwrap().resource("slots"), 1);
    }

    #[test]
    fn per_turn_usage_limits_reject_the_second_use() {
        let (state, pc, orc) = duel();
        let mut def = strike();
        def.usage.per_turn = Some(1);

        let first = resolve_with(&def, &state, pc, TargetIntent::Token(orc), vec![3]);
        let ActionResolution::Resolved { state: after, .. } = first else {
            panic!("expected resolution");
        };
        let second = resolve_with(&def, &after, pc, TargetIntent::Token(orc), vec![3]);
        assert_eq!(
            second.rejection().unwrap().reason,
            RejectReason::UsageExhausted
        );
    }

    #[test]
    fn teleport_lands_exactly_on_a_clear_cell() {
        let (state, pc, _) = duel();
        let def = ActionDefinition::new("blink", "Blink", TargetingSpec::cell(6))
            .with_effect(EffectKind::Teleport);
        let goal = Cell::new(7, 7);
        let result = resolve_with(&def, &state, pc, TargetIntent::Cell(goal), vec![]);
        let ActionResolution::Resolved { state: after, .. } = result else {
            panic!("expected resolution");
        };
        assert_eq!(after.tokens.get(pc).unwrap().position, goal);
    }

    #[test]
    fn interruption_rolls_everything_back() {
        struct AlwaysInterrupt;
        impl EffectHooks for AlwaysInterrupt {
            fn interrupts(&self, _actor: TokenId, _action_id: &str) -> bool {
                true
            }
        }

        let (state, pc, orc) = duel();
        let blocking = BoardBlocking::build(&state.board);
        let rng = ScriptedRolls::new(vec![15, 4]);
        let ctx = ResolveContext {
            blocking: &blocking,
            light: None,
            ledger: None,
            rng: &rng,
            hooks: &AlwaysInterrupt,
            base_seed: 0,
            base_advantage: AdvantageState::Normal,
        };
        let result =
            resolve_action(&strike(), &state, pc, &TargetIntent::Token(orc), &ctx).unwrap();
        assert_eq!(result.rejection().unwrap().reason, RejectReason::Interrupted);
        assert_eq!(state.tokens.get(orc).unwrap().hp.current, 5);
    }

    #[test]
    fn dead_actors_cannot_act() {
        let (mut state, pc, orc) = duel();
        state.tokens.get_mut(pc).unwrap().hp.deplete(99);
        let result = resolve_with(&strike(), &state, pc, TargetIntent::Token(orc), vec![]);
        assert_eq!(
            result.rejection().unwrap().reason,
            RejectReason::ActorIncapacitated
        );
    }
}
