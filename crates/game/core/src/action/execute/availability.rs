//! Actor-side availability: everything checked before a target even exists.

use crate::state::{EconomyFlags, EncounterState, TokenId};

use super::super::condition::{self, ConditionContext, ResourceLedger};
use super::super::events::{RejectReason, Rejection};
use super::super::ActionDefinition;

pub(crate) fn check(
    def: &ActionDefinition,
    state: &EncounterState,
    actor: TokenId,
    ledger: &dyn ResourceLedger,
) -> Result<(), Rejection> {
    let Some(token) = state.tokens.get(actor) else {
        return Err(Rejection::new(RejectReason::ActorIncapacitated));
    };

    if let Some(phase) = def.usage.phase
        && state.phase != phase
    {
        return Err(Rejection::new(RejectReason::WrongPhase));
    }

    let usage = token.usage_of(&def.id);
    if let Some(limit) = def.usage.per_turn
        && usage.this_turn >= limit
    {
        return Err(Rejection::with_detail(
            RejectReason::UsageExhausted,
            format!("{} already used {limit}x this turn", def.id),
        ));
    }
    if let Some(limit) = def.usage.per_encounter
        && usage.this_encounter >= limit
    {
        return Err(Rejection::with_detail(
            RejectReason::UsageExhausted,
            format!("{} already used {limit}x this encounter", def.id),
        ));
    }

    for cost in &def.usage.costs {
        if ledger.amount(&cost.name, cost.pool) < cost.amount {
            return Err(Rejection::with_detail(
                RejectReason::InsufficientResource,
                format!("needs {} {}", cost.amount, cost.name),
            ));
        }
    }

    // Loading weapons fire once per turn; the flag is set when they do.
    if def.attack.as_ref().is_some_and(|a| a.loading)
        && token.flags.contains(EconomyFlags::WEAPON_LOADED)
    {
        return Err(Rejection::new(RejectReason::WeaponNotLoaded));
    }

    let ctx = ConditionContext {
        state,
        actor,
        target: None,
        target_cell: None,
        ledger,
        light: None,
    };
    for spec in &def.availability {
        if !condition::eval(&spec.condition, &ctx) {
            return Err(Rejection::with_detail(
                RejectReason::RequirementFailed,
                spec.reason.clone(),
            ));
        }
    }

    Ok(())
}
