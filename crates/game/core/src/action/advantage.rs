//! Advantage and disadvantage on attack rolls.
//!
//! Situational modifiers never stack as rerolls; every contributing tag maps
//! to a signed score and the scores sum. Positive means advantage, negative
//! disadvantage, zero cancels out.

use crate::config::GameConfig;
use crate::state::{AbilityKind, Token};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AdvantageState {
    Advantage,
    #[default]
    Normal,
    Disadvantage,
}

impl AdvantageState {
    pub fn score(self) -> i32 {
        match self {
            AdvantageState::Advantage => 1,
            AdvantageState::Normal => 0,
            AdvantageState::Disadvantage => -1,
        }
    }

    pub fn from_score(score: i32) -> Self {
        match score {
            s if s > 0 => AdvantageState::Advantage,
            0 => AdvantageState::Normal,
            _ => AdvantageState::Disadvantage,
        }
    }

    /// Signed-score merge with another state.
    pub fn merge(self, other: AdvantageState) -> Self {
        Self::from_score(self.score() + other.score())
    }
}

/// Weapon tags that feed attack-roll compilation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttackSpec {
    /// Ability whose modifier adds to the attack bonus.
    pub ability: AbilityKind,
    /// Attacking past this distance (but within max range) is at
    /// disadvantage. `None` means no long-range penalty.
    pub normal_range: Option<u32>,
    /// Heavy weapons need either Strength or Dexterity at the stat floor.
    pub heavy: bool,
    /// Loading weapons fire once per turn.
    pub loading: bool,
}

impl AttackSpec {
    pub fn new(ability: AbilityKind) -> Self {
        Self {
            ability,
            normal_range: None,
            heavy: false,
            loading: false,
        }
    }

    pub fn with_normal_range(mut self, range: u32) -> Self {
        self.normal_range = Some(range);
        self
    }

    pub fn heavy(mut self) -> Self {
        self.heavy = true;
        self
    }

    pub fn loading(mut self) -> Self {
        self.loading = true;
        self
    }
}

/// Signed advantage score contributed by weapon tags at a given distance.
pub fn weapon_advantage_score(spec: &AttackSpec, actor: &Token, distance: u32) -> i32 {
    let mut score = 0;
    if spec.normal_range.is_some_and(|normal| distance > normal) {
        score -= 1;
    }
    if spec.heavy {
        let floor = GameConfig::HEAVY_WEAPON_STAT_FLOOR;
        let strong = actor.abilities.score(AbilityKind::Strength) >= floor;
        let nimble = actor.abilities.score(AbilityKind::Dexterity) >= floor;
        if !strong && !nimble {
            score -= 1;
        }
    }
    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Cell;
    use crate::state::{AbilityScores, Team, Token, TokenId};

    fn fighter(strength: i32, dexterity: i32) -> Token {
        let mut token = Token::new(TokenId(0), "fighter", Team::Player, Cell::ORIGIN);
        token.abilities = AbilityScores {
            strength,
            dexterity,
            ..AbilityScores::default()
        };
        token
    }

    #[test]
    fn signed_merge_cancels_and_saturates() {
        assert_eq!(
            AdvantageState::Advantage.merge(AdvantageState::Disadvantage),
            AdvantageState::Normal
        );
        assert_eq!(
            AdvantageState::Advantage.merge(AdvantageState::Normal),
            AdvantageState::Advantage
        );
        assert_eq!(AdvantageState::from_score(-2), AdvantageState::Disadvantage);
    }

    #[test]
    fn long_shots_are_at_disadvantage() {
        let spec = AttackSpec::new(AbilityKind::Dexterity).with_normal_range(4);
        let actor = fighter(10, 10);
        assert_eq!(weapon_advantage_score(&spec, &actor, 4), 0);
        assert_eq!(weapon_advantage_score(&spec, &actor, 5), -1);
    }

    #[test]
    fn heavy_weapons_need_a_stat_at_the_floor() {
        let spec = AttackSpec::new(AbilityKind::Strength).heavy();
        assert_eq!(weapon_advantage_score(&spec, &fighter(13, 8), 1), 0);
        assert_eq!(weapon_advantage_score(&spec, &fighter(8, 13), 1), 0);
        assert_eq!(weapon_advantage_score(&spec, &fighter(12, 12), 1), -1);
    }

    #[test]
    fn penalties_stack_through_the_score() {
        let spec = AttackSpec::new(AbilityKind::Strength)
            .with_normal_range(2)
            .heavy();
        let weakling = fighter(8, 8);
        // Two tags, one reroll state; a single advantage no longer cancels both.
        // Raw scores sum before collapsing, as attack compilation does.
        let score = weapon_advantage_score(&spec, &weakling, 5);
        assert_eq!(score, -2);
        assert_eq!(
            AdvantageState::from_score(AdvantageState::Advantage.score() + score),
            AdvantageState::Disadvantage
        );
    }
}
