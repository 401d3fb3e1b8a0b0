//! Injectable randomness for attack and damage rolls.
//!
//! The engine never owns an RNG. Every draw goes through [`RngOracle`] with
//! an explicit seed, so re-running a resolution with the same snapshot and
//! seed reproduces the same outcome and tests can supply fixed draws.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::action::AdvantageState;

/// Seed-addressed random source.
///
/// Implementations must be pure: the same seed always yields the same value.
pub trait RngOracle: Send + Sync {
    /// Generate a random u32 value from a seed.
    fn next_u32(&self, seed: u64) -> u32;

    /// Roll a die with N sides (1-N inclusive).
    fn roll_die(&self, seed: u64, sides: u32) -> u32 {
        (self.next_u32(seed) % sides.max(1)) + 1
    }

    /// Roll a d20, applying advantage or disadvantage by drawing twice.
    fn roll_d20(&self, seed: u64, advantage: AdvantageState) -> u32 {
        let first = self.roll_die(seed, 20);
        match advantage {
            AdvantageState::Normal => first,
            AdvantageState::Advantage => first.max(self.roll_die(seed ^ 0xad7a, 20)),
            AdvantageState::Disadvantage => first.min(self.roll_die(seed ^ 0xad7a, 20)),
        }
    }
}

/// PCG random number generator (Permuted Congruential Generator).
///
/// PCG-XSH-RR: single multiply + xorshift + rotate, 64-bit state, 32-bit
/// output, passes the usual statistical batteries. Stateless here because
/// every call derives its output purely from the supplied seed.
#[derive(Clone, Copy, Debug, Default)]
pub struct PcgRng;

impl PcgRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    #[inline]
    fn pcg_step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    #[inline]
    fn pcg_output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl RngOracle for PcgRng {
    fn next_u32(&self, seed: u64) -> u32 {
        Self::pcg_output(Self::pcg_step(seed))
    }
}

/// A test double that returns scripted d20/die values in order.
///
/// Draws past the end of the script repeat the final value.
#[derive(Debug, Default)]
pub struct ScriptedRolls {
    rolls: Vec<u32>,
    cursor: AtomicUsize,
}

impl ScriptedRolls {
    pub fn new(rolls: Vec<u32>) -> Self {
        Self {
            rolls,
            cursor: AtomicUsize::new(0),
        }
    }
}

// Scripted draws ignore the seed; ordering is what tests care about.
impl RngOracle for ScriptedRolls {
    fn next_u32(&self, _seed: u64) -> u32 {
        let i = self.cursor.fetch_add(1, Ordering::Relaxed);
        self.rolls
            .get(i)
            .or_else(|| self.rolls.last())
            .copied()
            .unwrap_or(0)
    }

    fn roll_die(&self, seed: u64, sides: u32) -> u32 {
        self.next_u32(seed).clamp(1, sides.max(1))
    }

    fn roll_d20(&self, seed: u64, _advantage: AdvantageState) -> u32 {
        // Scripted tests pick the exact sequence; advantage re-draws would
        // desync the script.
        self.roll_die(seed, 20)
    }
}

/// Mix snapshot identity into a per-draw seed.
///
/// Different `context` values keep multiple draws within one resolution
/// independent (0 = attack roll, 1.. = damage dice in order).
pub fn compute_seed(base_seed: u64, actor_id: u32, context: u32) -> u64 {
    let mut hash = base_seed;
    hash ^= (actor_id as u64).wrapping_mul(0x517cc1b727220a95);
    hash ^= (context as u64).wrapping_mul(0x9e3779b97f4a7c15);
    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;
    hash
}
