//! Host callbacks invoked while primitives execute.
//!
//! The rendering layer implements these to animate outcomes; no gameplay
//! logic flows back through them, with one exception: the interruption query,
//! which lets a reaction cancel the whole plan before anything commits.

use crate::grid::Cell;
use crate::state::TokenId;

pub trait EffectHooks {
    fn on_move_to(&self, _actor: TokenId, _path: &[Cell]) {}

    fn on_teleport(&self, _actor: TokenId, _from: Cell, _to: Cell) {}

    fn on_grant_temp_hp(&self, _target: TokenId, _amount: u32) {}

    fn on_play_visual_effect(&self, _name: &str, _cell: Cell) {}

    /// Asked once per resolution, after the plan compiles and before any
    /// mutation. Returning true aborts with a full rollback.
    fn interrupts(&self, _actor: TokenId, _action_id: &str) -> bool {
        false
    }
}

/// Default hooks: animate nothing, interrupt nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoHooks;

impl EffectHooks for NoHooks {}
