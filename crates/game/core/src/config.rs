/// Tuning constants shared by the resolution subsystems.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameConfig {
    /// Ambient light applied to every cell when no light map is supplied.
    pub default_ambient: f32,
}

impl GameConfig {
    // ===== compile-time constants used as type parameters =====
    /// Maximum tracked status effects per token.
    pub const MAX_STATUS_EFFECTS: usize = 8;

    // ===== lighting thresholds =====
    /// Light level below which a normal-vision observer cannot see a cell.
    pub const SHADOW_MIN: f32 = 0.25;
    /// Ambient level at or above which a cell counts as "lit" for the
    /// indoor-darkening rule.
    pub const BRIGHT_MIN: f32 = 0.75;

    // ===== combat tuning =====
    /// Ability score floor below which a heavy weapon imposes disadvantage.
    pub const HEAVY_WEAPON_STAT_FLOOR: i32 = 13;
    /// Natural d20 roll that always crits.
    pub const CRIT_THRESHOLD: u32 = 20;

    pub const DEFAULT_AMBIENT: f32 = 1.0;

    pub fn new() -> Self {
        Self {
            default_ambient: Self::DEFAULT_AMBIENT,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}
