//! Primitive execution against the working copy.
//!
//! By the time this runs the action is accepted: every op either applies or
//! degrades to a logged no-op. The working copy is the commit; the caller's
//! snapshot is never touched.

use crate::config::GameConfig;
use crate::grid::Cell;
use crate::path::{PathContext, PathOptions, find_path};
use crate::rng::compute_seed;
use crate::state::{
    EconomyFlags, EncounterState, ResourcePool, StatusInstance, Token, TokenId,
};

use super::super::events::{ActionEvent, EventKind, OutcomeKind};
use super::super::plan::{ActionPlan, PrimitiveOp};
use super::super::targeting::ResolvedTarget;
use super::super::ActionDefinition;
use super::ResolveContext;

pub(crate) fn run(
    def: &ActionDefinition,
    state: &EncounterState,
    actor: TokenId,
    target: &ResolvedTarget,
    plan: &ActionPlan,
    ctx: &ResolveContext<'_>,
) -> (OutcomeKind, EncounterState, Vec<ActionEvent>) {
    let mut work = state.clone();
    let mut events: Vec<ActionEvent> = Vec::new();
    let mut outcome = OutcomeKind::Resolved;
    let mut save_passed: Option<bool> = None;
    // One draw context per random-consuming op keeps draws independent.
    let mut seq: u32 = 0;

    pay_costs(def, &mut work, actor, &mut events);

    for op in &plan.ops {
        match op {
            PrimitiveOp::AttackRoll { advantage, bonus } => {
                let Some(tid) = target.token else {
                    push_noop(&mut events, actor, "attack needs a token target");
                    continue;
                };
                let seed = compute_seed(ctx.base_seed, actor.0, seq);
                seq += 1;
                let roll = ctx.rng.roll_d20(seed, *advantage);
                let total = roll as i32 + bonus;
                let armor_class = work.tokens.get(tid).map(|t| t.armor_class).unwrap_or(10);
                outcome = if roll >= GameConfig::CRIT_THRESHOLD {
                    OutcomeKind::Crit
                } else if total >= armor_class {
                    OutcomeKind::Hit
                } else {
                    OutcomeKind::Miss
                };
                let verb: &'static str = outcome.into();
                events.push(
                    ActionEvent::new(
                        EventKind::Attack,
                        actor,
                        format!(
                            "{} attacks {}: {total} vs AC {armor_class} ({verb})",
                            name_of(&work, actor),
                            name_of(&work, tid),
                        ),
                    )
                    .target(tid)
                    .amount(total),
                );
            }

            PrimitiveOp::SavingThrow { ability, dc } => {
                let Some(tid) = target.token else {
                    push_noop(&mut events, actor, "saving throw needs a token target");
                    continue;
                };
                let seed = compute_seed(ctx.base_seed, actor.0, seq);
                seq += 1;
                let roll = ctx.rng.roll_d20(seed, Default::default());
                let modifier = work
                    .tokens
                    .get(tid)
                    .map(|t| t.abilities.modifier(*ability))
                    .unwrap_or(0);
                let total = roll as i32 + modifier;
                let success = total >= *dc;
                save_passed = Some(success);
                outcome = if success {
                    OutcomeKind::SaveSuccess
                } else {
                    OutcomeKind::SaveFail
                };
                events.push(
                    ActionEvent::new(
                        EventKind::SavingThrow,
                        actor,
                        format!(
                            "{} saves: {total} vs DC {dc} ({})",
                            name_of(&work, tid),
                            if success { "success" } else { "failure" },
                        ),
                    )
                    .target(tid)
                    .amount(total),
                );
            }

            PrimitiveOp::DealDamage {
                dice,
                damage_type,
                requires_hit,
                crit_doubles,
                halved_on_save,
            } => {
                let Some(tid) = target.token else {
                    push_noop(&mut events, actor, "damage needs a token target");
                    continue;
                };
                if *requires_hit && outcome == OutcomeKind::Miss {
                    push_noop(&mut events, actor, "attack missed");
                    continue;
                }
                let seed = compute_seed(ctx.base_seed, actor.0, seq);
                seq += 1;
                let mut amount = dice.roll(ctx.rng, seed);
                if *crit_doubles && outcome == OutcomeKind::Crit {
                    let crit_seed = compute_seed(ctx.base_seed, actor.0, seq);
                    seq += 1;
                    amount += dice.roll_dice_only(ctx.rng, crit_seed);
                }
                if *halved_on_save && save_passed == Some(true) {
                    amount /= 2;
                }
                let amount = amount.max(0) as u32;
                let name = name_of(&work, tid);
                let Some(token) = work.tokens.get_mut(tid) else {
                    continue;
                };
                let (lost, died) = token.take_damage(amount);
                let kind: &'static str = (*damage_type).into();
                events.push(
                    ActionEvent::new(
                        EventKind::Damage,
                        actor,
                        format!("{name} takes {lost} {kind} damage"),
                    )
                    .target(tid)
                    .amount(lost as i32),
                );
                if died {
                    events.push(
                        ActionEvent::new(EventKind::Death, actor, format!("{name} dies"))
                            .target(tid),
                    );
                }
            }

            PrimitiveOp::Heal { dice } => {
                let Some(tid) = target.token else {
                    push_noop(&mut events, actor, "heal needs a token target");
                    continue;
                };
                let seed = compute_seed(ctx.base_seed, actor.0, seq);
                seq += 1;
                let amount = dice.roll(ctx.rng, seed).max(0) as u32;
                let name = name_of(&work, tid);
                let Some(token) = work.tokens.get_mut(tid) else {
                    continue;
                };
                let gained = token.hp.restore(amount);
                events.push(
                    ActionEvent::new(
                        EventKind::Heal,
                        actor,
                        format!("{name} regains {gained} hp"),
                    )
                    .target(tid)
                    .amount(gained as i32),
                );
            }

            PrimitiveOp::GrantTempHp { dice } => {
                let Some(tid) = target.token else {
                    push_noop(&mut events, actor, "temp hp needs a token target");
                    continue;
                };
                let seed = compute_seed(ctx.base_seed, actor.0, seq);
                seq += 1;
                let amount = dice.roll(ctx.rng, seed).max(0) as u32;
                let name = name_of(&work, tid);
                let Some(token) = work.tokens.get_mut(tid) else {
                    continue;
                };
                // Temporary hit points never stack; the larger grant wins.
                token.temp_hp = token.temp_hp.max(amount);
                ctx.hooks.on_grant_temp_hp(tid, amount);
                events.push(
                    ActionEvent::new(
                        EventKind::TempHp,
                        actor,
                        format!("{name} gains {amount} temporary hp"),
                    )
                    .target(tid)
                    .amount(amount as i32),
                );
            }

            PrimitiveOp::MoveActor {
                destination,
                max_distance,
            } => {
                let (start, profile) = match work.tokens.get(actor) {
                    Some(t) => (t.position, t.movement_profile()),
                    None => continue,
                };
                let occupied = work.tokens.occupied_cells(Some(actor));
                let options = PathOptions {
                    max_distance: Some(*max_distance),
                    ..PathOptions::default()
                };
                let path = find_path(
                    start,
                    *destination,
                    &profile,
                    &options,
                    &PathContext {
                        board: &work.board,
                        blocking: ctx.blocking,
                        occupied: &occupied,
                    },
                );
                if path.len() < 2 {
                    push_noop(&mut events, actor, "no reachable cell to move to");
                    continue;
                }
                let end = *path.last().unwrap_or(&start);
                let steps = (path.len() - 1) as i32;
                let name = name_of(&work, actor);
                if let Some(token) = work.tokens.get_mut(actor) {
                    token.position = end;
                    token.flags.insert(EconomyFlags::MOVED);
                }
                ctx.hooks.on_move_to(actor, &path);
                events.push(
                    ActionEvent::new(
                        EventKind::Move,
                        actor,
                        format!("{name} moves {steps} cells to {end}"),
                    )
                    .amount(steps)
                    .at(end),
                );
            }

            PrimitiveOp::Teleport { destination } => {
                let from = match work.tokens.get(actor) {
                    Some(t) => t.position,
                    None => continue,
                };
                let occupied = work.tokens.occupied_cells(Some(actor));
                let clear = work.board.is_playable(*destination)
                    && !ctx.blocking.cells.movement.contains(destination)
                    && !occupied.contains(destination);
                if !clear {
                    push_noop(&mut events, actor, "teleport destination blocked");
                    continue;
                }
                let name = name_of(&work, actor);
                if let Some(token) = work.tokens.get_mut(actor) {
                    token.position = *destination;
                }
                ctx.hooks.on_teleport(actor, from, *destination);
                events.push(
                    ActionEvent::new(
                        EventKind::Teleport,
                        actor,
                        format!("{name} teleports to {destination}"),
                    )
                    .at(*destination),
                );
            }

            PrimitiveOp::Displace { displacement } => {
                let Some(tid) = target.token.filter(|t| *t != actor) else {
                    push_noop(&mut events, actor, "displacement needs another token");
                    continue;
                };
                let (Some(actor_pos), Some(target_pos)) = (
                    work.tokens.get(actor).map(|t| t.position),
                    work.tokens.get(tid).map(|t| t.position),
                ) else {
                    continue;
                };
                let dx = (target_pos.x - actor_pos.x).signum();
                let dy = (target_pos.y - actor_pos.y).signum();
                if dx == 0 && dy == 0 {
                    push_noop(&mut events, actor, "no displacement direction");
                    continue;
                }
                use super::super::effect::Displacement;
                let (dir, distance) = match displacement {
                    Displacement::Push { distance } => ((dx, dy), *distance),
                    Displacement::Pull { distance } => {
                        // Never drag the target past or onto the actor.
                        let gap = crate::grid::chebyshev(actor_pos, target_pos).saturating_sub(1);
                        ((-dx, -dy), (*distance).min(gap))
                    }
                };
                if distance == 0 {
                    push_noop(&mut events, actor, "nowhere to displace to");
                    continue;
                }
                let goal = target_pos.offset(dir.0 * distance as i32, dir.1 * distance as i32);
                let occupied = work.tokens.occupied_cells(Some(tid));
                let path = find_path(
                    target_pos,
                    goal,
                    &crate::path::MovementProfile::ground(distance),
                    &PathOptions::default(),
                    &PathContext {
                        board: &work.board,
                        blocking: ctx.blocking,
                        occupied: &occupied,
                    },
                );
                if path.len() < 2 {
                    push_noop(&mut events, actor, "target cannot be displaced");
                    continue;
                }
                let end = *path.last().unwrap_or(&target_pos);
                let name = name_of(&work, tid);
                if let Some(token) = work.tokens.get_mut(tid) {
                    token.position = end;
                }
                events.push(
                    ActionEvent::new(
                        EventKind::Displace,
                        actor,
                        format!("{name} is forced to {end}"),
                    )
                    .target(tid)
                    .amount((path.len() - 1) as i32)
                    .at(end),
                );
            }

            PrimitiveOp::Swap => {
                let Some(tid) = target.token.filter(|t| *t != actor) else {
                    push_noop(&mut events, actor, "swap needs another token");
                    continue;
                };
                let (Some(a), Some(b)) = (
                    work.tokens.get(actor).map(|t| t.position),
                    work.tokens.get(tid).map(|t| t.position),
                ) else {
                    continue;
                };
                let enterable = |cell: Cell| {
                    work.board.is_playable(cell) && !ctx.blocking.cells.movement.contains(&cell)
                };
                if !enterable(a) || !enterable(b) {
                    push_noop(&mut events, actor, "swap endpoints blocked");
                    continue;
                }
                if let Some(token) = work.tokens.get_mut(actor) {
                    token.position = b;
                }
                if let Some(token) = work.tokens.get_mut(tid) {
                    token.position = a;
                }
                events.push(
                    ActionEvent::new(
                        EventKind::Swap,
                        actor,
                        format!("{} and {} trade places", name_of(&work, actor), name_of(&work, tid)),
                    )
                    .target(tid),
                );
            }

            PrimitiveOp::ApplyStatus { status, rounds } => {
                let Some(tid) = target.token else {
                    push_noop(&mut events, actor, "status needs a token target");
                    continue;
                };
                let name = name_of(&work, tid);
                let Some(token) = work.tokens.get_mut(tid) else {
                    continue;
                };
                if let Some(existing) = token.statuses.iter_mut().find(|s| s.kind == *status) {
                    existing.remaining_rounds = existing.remaining_rounds.max(*rounds);
                } else if token.statuses.is_full() {
                    push_noop(&mut events, actor, "status limit reached");
                    continue;
                } else {
                    token.statuses.push(StatusInstance {
                        kind: *status,
                        remaining_rounds: *rounds,
                    });
                }
                let label: &'static str = (*status).into();
                events.push(
                    ActionEvent::new(
                        EventKind::StatusApplied,
                        actor,
                        format!("{name} is {label} for {rounds} rounds"),
                    )
                    .target(tid),
                );
            }

            PrimitiveOp::RemoveStatus { status } => {
                let Some(tid) = target.token else {
                    push_noop(&mut events, actor, "status needs a token target");
                    continue;
                };
                let name = name_of(&work, tid);
                let Some(token) = work.tokens.get_mut(tid) else {
                    continue;
                };
                let before = token.statuses.len();
                token.statuses.retain(|s| s.kind != *status);
                if token.statuses.len() == before {
                    push_noop(&mut events, actor, "status not present");
                    continue;
                }
                let label: &'static str = (*status).into();
                events.push(
                    ActionEvent::new(
                        EventKind::StatusRemoved,
                        actor,
                        format!("{name} is no longer {label}"),
                    )
                    .target(tid),
                );
            }

            PrimitiveOp::SpendResource { name, pool, amount } => {
                if !adjust_resource(&mut work, actor, name, *pool, -*amount, true) {
                    push_noop(&mut events, actor, format!("not enough {name}"));
                    continue;
                }
                events.push(
                    ActionEvent::new(
                        EventKind::ResourceSpent,
                        actor,
                        format!("spends {amount} {name}"),
                    )
                    .amount(*amount),
                );
            }

            PrimitiveOp::RestoreResource { name, pool, amount } => {
                adjust_resource(&mut work, actor, name, *pool, *amount, false);
                events.push(
                    ActionEvent::new(
                        EventKind::ResourceRestored,
                        actor,
                        format!("regains {amount} {name}"),
                    )
                    .amount(*amount),
                );
            }

            PrimitiveOp::ToggleFlag { flag } => {
                if let Some(token) = work.tokens.get_mut(actor) {
                    token.flags.toggle(*flag);
                }
                events.push(ActionEvent::new(
                    EventKind::FlagToggled,
                    actor,
                    format!("toggles {flag:?}"),
                ));
            }

            PrimitiveOp::Spawn {
                name,
                team,
                hp,
                cell,
            } => {
                let occupied = work.tokens.occupied_cells(None);
                let clear = work.board.is_playable(*cell)
                    && !ctx.blocking.cells.movement.contains(cell)
                    && !occupied.contains(cell);
                if !clear {
                    push_noop(&mut events, actor, "spawn cell blocked");
                    continue;
                }
                let id = work
                    .tokens
                    .insert(Token::new(TokenId(0), name.clone(), *team, *cell).with_hp(*hp));
                events.push(
                    ActionEvent::new(
                        EventKind::Spawn,
                        actor,
                        format!("{name} appears at {cell}"),
                    )
                    .target(id)
                    .at(*cell),
                );
            }

            PrimitiveOp::Despawn => {
                let Some(tid) = target.token else {
                    push_noop(&mut events, actor, "despawn needs a token target");
                    continue;
                };
                let name = name_of(&work, tid);
                if let Some(token) = work.tokens.get_mut(tid) {
                    token.hp.current = 0;
                }
                events.push(
                    ActionEvent::new(
                        EventKind::Despawn,
                        actor,
                        format!("{name} vanishes"),
                    )
                    .target(tid),
                );
            }

            PrimitiveOp::VisualEffect { name } => {
                ctx.hooks.on_play_visual_effect(name, target.cell);
                events.push(
                    ActionEvent::new(EventKind::VisualEffect, actor, name.clone())
                        .at(target.cell),
                );
            }
        }
    }

    (outcome, work, events)
}

/// Costs and counters are part of execution so a rejection never mutates.
fn pay_costs(
    def: &ActionDefinition,
    work: &mut EncounterState,
    actor: TokenId,
    events: &mut Vec<ActionEvent>,
) {
    for cost in &def.usage.costs {
        adjust_resource(work, actor, &cost.name, cost.pool, -cost.amount, false);
        events.push(
            ActionEvent::new(
                EventKind::ResourceSpent,
                actor,
                format!("spends {} {}", cost.amount, cost.name),
            )
            .amount(cost.amount),
        );
    }
    if let Some(token) = work.tokens.get_mut(actor) {
        let usage = token.usage.entry(def.id.clone()).or_default();
        usage.this_turn += 1;
        usage.this_encounter += 1;
        if def.attack.as_ref().is_some_and(|a| a.loading) {
            token.flags.insert(EconomyFlags::WEAPON_LOADED);
        }
    }
}

/// Applies a signed delta to a named resource. With `checked`, a delta that
/// would go negative is refused instead of clamped.
fn adjust_resource(
    work: &mut EncounterState,
    actor: TokenId,
    name: &str,
    pool: ResourcePool,
    delta: i32,
    checked: bool,
) -> bool {
    let slot = match pool {
        ResourcePool::Personal => match work.tokens.get_mut(actor) {
            Some(token) => token.resources.entry(name.to_string()).or_insert(0),
            None => return false,
        },
        ResourcePool::Shared => work.shared_resources.entry(name.to_string()).or_insert(0),
    };
    if checked && *slot + delta < 0 {
        return false;
    }
    *slot += delta;
    true
}

fn name_of(work: &EncounterState, id: TokenId) -> String {
    work.tokens
        .get(id)
        .map(|t| t.name.clone())
        .unwrap_or_else(|| id.to_string())
}

fn push_noop(events: &mut Vec<ActionEvent>, actor: TokenId, summary: impl Into<String>) {
    events.push(ActionEvent::new(EventKind::NoOp, actor, summary));
}
