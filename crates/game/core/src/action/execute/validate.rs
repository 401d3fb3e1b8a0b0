//! Target validation: legality of the chosen target for this action.
//!
//! Line of effect and visibility are deliberately distinct checks. Vision
//! range and cone can differ from attack geometry, and a target can be seen
//! through a window an arrow cannot pass.

use crate::state::{EncounterState, Token, TokenId};
use crate::vision::{VisionContext, is_cell_visible};

use super::super::condition::{self, ConditionContext, ResourceLedger};
use super::super::events::{RejectReason, Rejection};
use super::super::targeting::{ResolvedTarget, TargetIntent, TargetKind};
use super::super::ActionDefinition;
use super::ResolveContext;

pub(crate) fn validate(
    def: &ActionDefinition,
    state: &EncounterState,
    actor: TokenId,
    intent: &TargetIntent,
    ctx: &ResolveContext<'_>,
    ledger: &dyn ResourceLedger,
) -> Result<ResolvedTarget, Rejection> {
    let Some(actor_token) = state.tokens.get(actor) else {
        return Err(Rejection::new(RejectReason::ActorIncapacitated));
    };

    let target = resolve_kind(def.targeting.kind, state, actor, actor_token, intent)?;

    // Token targets must share the actor's height level.
    if target.token.is_some()
        && state.board.heights.is_some()
        && state.board.height_at(actor_token.position) != state.board.height_at(target.cell)
    {
        return Err(Rejection::new(RejectReason::HeightMismatch));
    }

    let distance = state
        .board
        .topology
        .distance(actor_token.position, target.cell);
    if distance < def.targeting.min_range {
        return Err(Rejection::with_detail(RejectReason::OutOfRange, "too close"));
    }
    if distance > def.targeting.max_range {
        return Err(Rejection::with_detail(
            RejectReason::OutOfRange,
            format!("distance {distance} exceeds range {}", def.targeting.max_range),
        ));
    }

    let cond_ctx = ConditionContext {
        state,
        actor,
        target: target.token,
        target_cell: Some(target.cell),
        ledger,
        light: ctx.light,
    };
    for spec in &def.conditions {
        if !condition::eval(&spec.condition, &cond_ctx) {
            return Err(Rejection::with_detail(
                RejectReason::ConditionFailed,
                spec.reason.clone(),
            ));
        }
    }

    if def.targeting.requires_los && target.cell != actor_token.position {
        if !line_of_effect_clear(actor_token.position, target.cell, state, ctx) {
            return Err(Rejection::new(RejectReason::LineOfEffectBlocked));
        }
        let vision_ctx = VisionContext {
            dims: state.board.dims,
            topology: state.board.topology,
            blocking: ctx.blocking,
            light: ctx.light,
        };
        if !is_cell_visible(
            actor_token.position,
            target.cell,
            &actor_token.vision,
            actor_token.facing_deg,
            &vision_ctx,
        ) {
            return Err(Rejection::new(RejectReason::TargetNotVisible));
        }
    }

    Ok(target)
}

fn resolve_kind(
    kind: TargetKind,
    state: &EncounterState,
    actor: TokenId,
    actor_token: &Token,
    intent: &TargetIntent,
) -> Result<ResolvedTarget, Rejection> {
    match kind {
        TargetKind::SelfOnly => match intent {
            TargetIntent::None => Ok(ResolvedTarget {
                token: Some(actor),
                cell: actor_token.position,
            }),
            TargetIntent::Token(id) if *id == actor => Ok(ResolvedTarget {
                token: Some(actor),
                cell: actor_token.position,
            }),
            _ => Err(Rejection::with_detail(
                RejectReason::InvalidTarget,
                "action only targets the actor",
            )),
        },
        TargetKind::None => Ok(ResolvedTarget {
            token: None,
            cell: actor_token.position,
        }),
        TargetKind::Cell => match intent {
            TargetIntent::Cell(cell) => {
                if !state.board.is_playable(*cell) {
                    return Err(Rejection::with_detail(
                        RejectReason::InvalidTarget,
                        "cell is not playable",
                    ));
                }
                Ok(ResolvedTarget {
                    token: None,
                    cell: *cell,
                })
            }
            _ => Err(Rejection::with_detail(
                RejectReason::InvalidTarget,
                "action targets a cell",
            )),
        },
        TargetKind::Enemy | TargetKind::Hostile | TargetKind::Ally | TargetKind::Player => {
            let TargetIntent::Token(id) = intent else {
                return Err(Rejection::with_detail(
                    RejectReason::InvalidTarget,
                    "action targets a token",
                ));
            };
            let Some(token) = state.tokens.get(*id) else {
                return Err(Rejection::with_detail(
                    RejectReason::InvalidTarget,
                    "no such token",
                ));
            };
            if !token.is_alive() {
                return Err(Rejection::new(RejectReason::TargetDead));
            }
            let allowed = match kind {
                TargetKind::Enemy => token.team == crate::state::Team::Enemy,
                TargetKind::Hostile => actor_token.team.is_hostile_to(token.team),
                TargetKind::Ally => token.team == actor_token.team,
                TargetKind::Player => token.team == crate::state::Team::Player,
                _ => unreachable!(),
            };
            if !allowed {
                return Err(Rejection::with_detail(
                    RejectReason::InvalidTarget,
                    format!("{} is not a legal target", token.name),
                ));
            }
            Ok(ResolvedTarget {
                token: Some(*id),
                cell: token.position,
            })
        }
    }
}

/// Straight supercover line, blocked by the attack cell set and attack wall
/// edges. The target cell itself never blocks its own targeting.
fn line_of_effect_clear(
    from: crate::grid::Cell,
    to: crate::grid::Cell,
    state: &EncounterState,
    ctx: &ResolveContext<'_>,
) -> bool {
    let trace = state.board.topology.line(from, to);
    for pair in trace.windows(2) {
        if ctx.blocking.edges.blocks_attack_between(pair[0], pair[1]) {
            return false;
        }
        if pair[1] != to && ctx.blocking.cells.attack.contains(&pair[1]) {
            return false;
        }
    }
    true
}
