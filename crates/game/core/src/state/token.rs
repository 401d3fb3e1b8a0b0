use std::collections::{BTreeMap, BTreeSet};

use arrayvec::ArrayVec;

use super::{
    EconomyFlags, ResourceMeter, StatusInstance, StatusKind, Team, TokenId, UsageCounter,
};
use crate::config::GameConfig;
use crate::grid::Cell;
use crate::path::MovementProfile;
use crate::vision::VisionProfile;

// ============================================================================
// Abilities
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AbilityKind {
    Strength,
    Dexterity,
    Constitution,
    Intelligence,
    Wisdom,
    Charisma,
}

/// The six ability scores, with the usual `(score - 10) / 2` modifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilityScores {
    pub strength: i32,
    pub dexterity: i32,
    pub constitution: i32,
    pub intelligence: i32,
    pub wisdom: i32,
    pub charisma: i32,
}

impl AbilityScores {
    pub fn flat(score: i32) -> Self {
        Self {
            strength: score,
            dexterity: score,
            constitution: score,
            intelligence: score,
            wisdom: score,
            charisma: score,
        }
    }

    pub fn score(&self, kind: AbilityKind) -> i32 {
        match kind {
            AbilityKind::Strength => self.strength,
            AbilityKind::Dexterity => self.dexterity,
            AbilityKind::Constitution => self.constitution,
            AbilityKind::Intelligence => self.intelligence,
            AbilityKind::Wisdom => self.wisdom,
            AbilityKind::Charisma => self.charisma,
        }
    }

    pub fn modifier(&self, kind: AbilityKind) -> i32 {
        (self.score(kind) - 10).div_euclid(2)
    }
}

impl Default for AbilityScores {
    fn default() -> Self {
        Self::flat(10)
    }
}

// ============================================================================
// Token
// ============================================================================

/// An actor on the board: player character, enemy, or summon.
///
/// Created at encounter start or by a spawn effect; mutated by move, damage,
/// and status effects; logically dead at zero hp but never removed from the
/// arena.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Token {
    pub id: TokenId,
    pub name: String,
    pub team: Team,
    pub position: Cell,
    pub hp: ResourceMeter,
    pub temp_hp: u32,
    pub abilities: AbilityScores,
    pub armor_class: i32,
    pub attack_bonus: i32,
    /// Explicit movement capability; `None` falls back to ground movement
    /// derived from the legacy `move_range` field.
    pub movement: Option<MovementProfile>,
    pub move_range: u32,
    pub vision: VisionProfile,
    /// Facing in degrees (0° = +x); only cone vision reads it.
    pub facing_deg: f32,
    pub flags: EconomyFlags,
    pub statuses: ArrayVec<StatusInstance, { GameConfig::MAX_STATUS_EFFECTS }>,
    /// Personal named resources (spell slots, ammunition, ...).
    pub resources: BTreeMap<String, i32>,
    /// Per-action usage counters, keyed by action id.
    pub usage: BTreeMap<String, UsageCounter>,
}

impl Token {
    pub fn new(id: TokenId, name: impl Into<String>, team: Team, position: Cell) -> Self {
        Self {
            id,
            name: name.into(),
            team,
            position,
            hp: ResourceMeter::full(10),
            temp_hp: 0,
            abilities: AbilityScores::default(),
            armor_class: 10,
            attack_bonus: 0,
            movement: None,
            move_range: 6,
            vision: VisionProfile::circle(12),
            facing_deg: 0.0,
            flags: EconomyFlags::empty(),
            statuses: ArrayVec::new(),
            resources: BTreeMap::new(),
            usage: BTreeMap::new(),
        }
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.hp.current > 0
    }

    pub fn movement_profile(&self) -> MovementProfile {
        self.movement
            .unwrap_or_else(|| MovementProfile::ground(self.move_range))
    }

    pub fn has_status(&self, kind: StatusKind) -> bool {
        self.statuses.iter().any(|s| s.kind == kind)
    }

    /// Applies damage, consuming temporary hit points first. Returns the hp
    /// actually lost and whether this blow killed the token.
    pub fn take_damage(&mut self, amount: u32) -> (u32, bool) {
        let was_alive = self.is_alive();
        let absorbed = amount.min(self.temp_hp);
        self.temp_hp -= absorbed;
        let lost = self.hp.deplete(amount - absorbed);
        (lost, was_alive && !self.is_alive())
    }

    pub fn resource(&self, name: &str) -> i32 {
        self.resources.get(name).copied().unwrap_or(0)
    }

    pub fn usage_of(&self, action_id: &str) -> UsageCounter {
        self.usage.get(action_id).copied().unwrap_or_default()
    }

    // Builder-style setup used by hosts and tests.

    pub fn with_hp(mut self, maximum: u32) -> Self {
        self.hp = ResourceMeter::full(maximum);
        self
    }

    pub fn with_movement(mut self, profile: MovementProfile) -> Self {
        self.movement = Some(profile);
        self
    }

    pub fn with_vision(mut self, vision: VisionProfile) -> Self {
        self.vision = vision;
        self
    }

    pub fn with_resource(mut self, name: impl Into<String>, amount: i32) -> Self {
        self.resources.insert(name.into(), amount);
        self
    }
}

// ============================================================================
// Arena
// ============================================================================

/// Id-addressed token storage.
///
/// Spawned ids increase monotonically; despawn marks a token dead rather
/// than freeing its slot, so ids stay stable for the whole encounter.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TokenArena {
    tokens: Vec<Token>,
    next_id: u32,
}

impl TokenArena {
    pub fn insert(&mut self, mut token: Token) -> TokenId {
        let id = TokenId(self.next_id);
        self.next_id += 1;
        token.id = id;
        self.tokens.push(token);
        id
    }

    pub fn get(&self, id: TokenId) -> Option<&Token> {
        self.tokens.iter().find(|t| t.id == id)
    }

    pub fn get_mut(&mut self, id: TokenId) -> Option<&mut Token> {
        self.tokens.iter_mut().find(|t| t.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter()
    }

    pub fn alive(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter().filter(|t| t.is_alive())
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Live token standing on `cell`, if any.
    pub fn at_cell(&self, cell: Cell) -> Option<&Token> {
        self.alive().find(|t| t.position == cell)
    }

    /// Cells held by live tokens, optionally excluding one (the mover).
    pub fn occupied_cells(&self, exclude: Option<TokenId>) -> BTreeSet<Cell> {
        self.alive()
            .filter(|t| Some(t.id) != exclude)
            .map(|t| t.position)
            .collect()
    }
}
