//! Plan compilation: declarative effects lowered to primitive operations.
//!
//! Compilation is side-effect free. It resolves formulas against the acting
//! token's stats, orders effects by phase and priority, and computes the
//! advantage state for attack rolls, so execution is a straight walk over
//! the ops.

use crate::error::CoreError;
use crate::rng::RngOracle;
use crate::state::{AbilityKind, EconomyFlags, EncounterState, ResourcePool, StatusKind, Team, Token, TokenId};

use super::advantage::{AdvantageState, weapon_advantage_score};
use super::effect::{DamageType, Displacement, EffectKind, Formula};
use super::targeting::ResolvedTarget;
use super::ActionDefinition;

// ============================================================================
// Dice
// ============================================================================

/// A resolved dice expression: `count`d`sides` + modifier. A flat value has
/// zero dice.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiceSpec {
    pub count: u32,
    pub sides: u32,
    pub modifier: i32,
}

impl DiceSpec {
    pub const fn flat(value: i32) -> Self {
        Self {
            count: 0,
            sides: 0,
            modifier: value,
        }
    }

    /// Rolls the dice, one draw per die.
    pub fn roll(&self, rng: &dyn RngOracle, seed: u64) -> i32 {
        self.roll_dice_only(rng, seed) + self.modifier
    }

    /// Dice total without the modifier (crit doubling doubles dice, never
    /// the modifier).
    pub fn roll_dice_only(&self, rng: &dyn RngOracle, seed: u64) -> i32 {
        (0..self.count)
            .map(|i| rng.roll_die(seed.wrapping_add(i as u64), self.sides) as i32)
            .sum()
    }
}

fn resolve_formula(formula: &Formula, actor: &Token) -> DiceSpec {
    match formula {
        Formula::Constant(value) => DiceSpec::flat(*value),
        Formula::Dice { count, sides, bonus } => DiceSpec {
            count: *count,
            sides: *sides,
            modifier: *bonus,
        },
        Formula::AbilityDice { count, sides, ability } => DiceSpec {
            count: *count,
            sides: *sides,
            modifier: actor.abilities.modifier(*ability),
        },
    }
}

// ============================================================================
// Primitives
// ============================================================================

/// One primitive mutating operation. A primitive that cannot apply at
/// execution time is a no-op, never an abort.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PrimitiveOp {
    AttackRoll {
        advantage: AdvantageState,
        bonus: i32,
    },
    SavingThrow {
        ability: AbilityKind,
        dc: i32,
    },
    DealDamage {
        dice: DiceSpec,
        damage_type: DamageType,
        /// Skipped entirely when the action's attack roll missed.
        requires_hit: bool,
        crit_doubles: bool,
        halved_on_save: bool,
    },
    Heal {
        dice: DiceSpec,
    },
    GrantTempHp {
        dice: DiceSpec,
    },
    MoveActor {
        destination: crate::grid::Cell,
        max_distance: u32,
    },
    Teleport {
        destination: crate::grid::Cell,
    },
    Displace {
        displacement: Displacement,
    },
    Swap,
    ApplyStatus {
        status: StatusKind,
        rounds: u32,
    },
    RemoveStatus {
        status: StatusKind,
    },
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
    ToggleFlag {
        flag: EconomyFlags,
    },
    Spawn {
        name: String,
        team: Team,
        hp: u32,
        cell: crate::grid::Cell,
    },
    Despawn,
    VisualEffect {
        name: String,
    },
}

#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionPlan {
    pub ops: Vec<PrimitiveOp>,
}

// ============================================================================
// Compilation
// ============================================================================

/// Lowers an accepted action into an ordered plan.
pub fn compile(
    def: &ActionDefinition,
    state: &EncounterState,
    actor: TokenId,
    target: &ResolvedTarget,
    base_advantage: AdvantageState,
) -> Result<ActionPlan, CoreError> {
    let actor_token = state
        .tokens
        .get(actor)
        .ok_or(CoreError::TokenNotFound(actor))?;
    let distance = state
        .board
        .topology
        .distance(actor_token.position, target.cell);

    // A saving throw anywhere in the action makes standalone damage savable.
    let has_save = def
        .effects
        .iter()
        .any(|e| matches!(e.kind, EffectKind::Save { .. }));

    let mut ordered: Vec<(usize, &super::effect::ActionEffect)> =
        def.effects.iter().enumerate().collect();
    ordered.sort_by_key(|(index, e)| (e.phase, -e.priority, *index));

    let mut ops = Vec::with_capacity(ordered.len() + 1);
    for (_, effect) in ordered {
        match &effect.kind {
            EffectKind::Attack { formula, damage_type } => {
                let (advantage, bonus) = match &def.attack {
                    Some(spec) => {
                        let score = base_advantage.score()
                            + weapon_advantage_score(spec, actor_token, distance);
                        (
                            AdvantageState::from_score(score),
                            actor_token.attack_bonus
                                + actor_token.abilities.modifier(spec.ability),
                        )
                    }
                    None => (base_advantage, actor_token.attack_bonus),
                };
                ops.push(PrimitiveOp::AttackRoll { advantage, bonus });
                ops.push(PrimitiveOp::DealDamage {
                    dice: resolve_formula(formula, actor_token),
                    damage_type: *damage_type,
                    requires_hit: true,
                    crit_doubles: true,
                    halved_on_save: false,
                });
            }
            EffectKind::Damage { formula, damage_type } => ops.push(PrimitiveOp::DealDamage {
                dice: resolve_formula(formula, actor_token),
                damage_type: *damage_type,
                requires_hit: false,
                crit_doubles: false,
                halved_on_save: has_save,
            }),
            EffectKind::Save { ability, dc } => ops.push(PrimitiveOp::SavingThrow {
                ability: *ability,
                dc: *dc,
            }),
            EffectKind::Heal { formula } => ops.push(PrimitiveOp::Heal {
                dice: resolve_formula(formula, actor_token),
            }),
            EffectKind::GrantTempHp { formula } => ops.push(PrimitiveOp::GrantTempHp {
                dice: resolve_formula(formula, actor_token),
            }),
            EffectKind::Move { max_distance } => ops.push(PrimitiveOp::MoveActor {
                destination: target.cell,
                max_distance: *max_distance,
            }),
            EffectKind::Teleport => ops.push(PrimitiveOp::Teleport {
                destination: target.cell,
            }),
            EffectKind::Displace(displacement) => ops.push(PrimitiveOp::Displace {
                displacement: *displacement,
            }),
            EffectKind::Swap => ops.push(PrimitiveOp::Swap),
            EffectKind::ApplyStatus { status, rounds } => ops.push(PrimitiveOp::ApplyStatus {
                status: *status,
                rounds: *rounds,
            }),
            EffectKind::RemoveStatus { status } => {
                ops.push(PrimitiveOp::RemoveStatus { status: *status })
            }
            EffectKind::SpendResource { name, pool, amount } => {
                ops.push(PrimitiveOp::SpendResource {
                    name: name.clone(),
                    pool: *pool,
                    amount: *amount,
                })
            }
            EffectKind::RestoreResource { name, pool, amount } => {
                ops.push(PrimitiveOp::RestoreResource {
                    name: name.clone(),
                    pool: *pool,
                    amount: *amount,
                })
            }
            EffectKind::ToggleFlag { flag } => ops.push(PrimitiveOp::ToggleFlag { flag: *flag }),
            EffectKind::Spawn { name, team, hp } => ops.push(PrimitiveOp::Spawn {
                name: name.clone(),
                team: *team,
                hp: *hp,
                cell: target.cell,
            }),
            EffectKind::Despawn => ops.push(PrimitiveOp::Despawn),
            EffectKind::PlayVisualEffect { name } => {
                ops.push(PrimitiveOp::VisualEffect { name: name.clone() })
            }
        }
    }

    Ok(ActionPlan { ops })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::advantage::AttackSpec;
    use crate::action::effect::{ActionEffect, ExecutionPhase};
    use crate::action::targeting::TargetingSpec;
    use crate::board::BoardState;
    use crate::grid::{Cell, GridDimensions};
    use crate::rng::ScriptedRolls;
    use crate::state::AbilityScores;

    fn state_with_fighter() -> (EncounterState, TokenId, ResolvedTarget) {
        let mut state = EncounterState::new(BoardState::open(GridDimensions::new(12, 12)));
        let mut pc = Token::new(TokenId(0), "pc", Team::Player, Cell::new(2, 2));
        pc.abilities = AbilityScores {
            strength: 16,
            ..AbilityScores::default()
        };
        pc.attack_bonus = 2;
        let actor = state.tokens.insert(pc);
        let foe = state
            .tokens
            .insert(Token::new(TokenId(0), "orc", Team::Enemy, Cell::new(4, 2)));
        let target = ResolvedTarget {
            token: Some(foe),
            cell: Cell::new(4, 2),
        };
        (state, actor, target)
    }

    #[test]
    fn attack_formula_resolves_ability_modifier() {
        let (state, actor, target) = state_with_fighter();
        let def = ActionDefinition::new(
            "slash",
            "Slash",
            TargetingSpec::ranged(crate::action::TargetKind::Enemy, 5),
        )
        .with_attack(AttackSpec::new(AbilityKind::Strength))
        .with_effect(EffectKind::Attack {
            formula: Formula::AbilityDice {
                count: 1,
                sides: 8,
                ability: AbilityKind::Strength,
            },
            damage_type: DamageType::Slashing,
        });

        let plan = compile(&def, &state, actor, &target, AdvantageState::Normal).unwrap();
        assert_eq!(plan.ops.len(), 2);
        // +2 attack bonus, +3 strength modifier.
        assert!(matches!(
            plan.ops[0],
            PrimitiveOp::AttackRoll {
                bonus: 5,
                advantage: AdvantageState::Normal
            }
        ));
        assert!(matches!(
            plan.ops[1],
            PrimitiveOp::DealDamage {
                dice: DiceSpec {
                    count: 1,
                    sides: 8,
                    modifier: 3
                },
                requires_hit: true,
                ..
            }
        ));
    }

    #[test]
    fn long_range_attacks_compile_at_disadvantage() {
        let (state, actor, target) = state_with_fighter();
        let def = ActionDefinition::new(
            "shot",
            "Shot",
            TargetingSpec::ranged(crate::action::TargetKind::Enemy, 10),
        )
        .with_attack(AttackSpec::new(AbilityKind::Strength).with_normal_range(1))
        .with_effect(EffectKind::Attack {
            formula: Formula::Constant(1),
            damage_type: DamageType::Piercing,
        });

        let plan = compile(&def, &state, actor, &target, AdvantageState::Normal).unwrap();
        assert!(matches!(
            plan.ops[0],
            PrimitiveOp::AttackRoll {
                advantage: AdvantageState::Disadvantage,
                ..
            }
        ));
    }

    #[test]
    fn phases_order_the_plan() {
        let (state, actor, target) = state_with_fighter();
        let mut def = ActionDefinition::new(
            "combo",
            "Combo",
            TargetingSpec::ranged(crate::action::TargetKind::Enemy, 5),
        );
        def.effects.push(ActionEffect::in_phase(
            EffectKind::ToggleFlag {
                flag: EconomyFlags::ACTION_USED,
            },
            ExecutionPhase::Finalize,
        ));
        def.effects.push(ActionEffect::in_phase(
            EffectKind::ApplyStatus {
                status: StatusKind::Marked,
                rounds: 1,
            },
            ExecutionPhase::PreEffect,
        ));
        def.effects.push(ActionEffect::new(EffectKind::Damage {
            formula: Formula::Constant(3),
            damage_type: DamageType::Fire,
        }));

        let plan = compile(&def, &state, actor, &target, AdvantageState::Normal).unwrap();
        assert!(matches!(plan.ops[0], PrimitiveOp::ApplyStatus { .. }));
        assert!(matches!(plan.ops[1], PrimitiveOp::DealDamage { .. }));
        assert!(matches!(plan.ops[2], PrimitiveOp::ToggleFlag { .. }));
    }

    #[test]
    fn save_marks_standalone_damage_halvable() {
        let (state, actor, target) = state_with_fighter();
        let def = ActionDefinition::new(
            "burst",
            "Burst",
            TargetingSpec::ranged(crate::action::TargetKind::Enemy, 6),
        )
        .with_effect(EffectKind::Save {
            ability: AbilityKind::Dexterity,
            dc: 13,
        })
        .with_effect(EffectKind::Damage {
            formula: Formula::Dice {
                count: 2,
                sides: 6,
                bonus: 0,
            },
            damage_type: DamageType::Fire,
        });

        let plan = compile(&def, &state, actor, &target, AdvantageState::Normal).unwrap();
        assert!(matches!(
            plan.ops[1],
            PrimitiveOp::DealDamage {
                halved_on_save: true,
                ..
            }
        ));
    }

    #[test]
    fn scripted_dice_sum_with_modifier() {
        let dice = DiceSpec {
            count: 2,
            sides: 6,
            modifier: 3,
        };
        let rng = ScriptedRolls::new(vec![4, 5]);
        assert_eq!(dice.roll(&rng, 0), 12);
        assert_eq!(DiceSpec::flat(7).roll(&rng, 0), 7);
    }
}
