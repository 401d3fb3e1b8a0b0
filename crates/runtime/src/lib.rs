//! Host-side orchestration over the pure combat core.
//!
//! `tactics-core` is a library of snapshot-in/snapshot-out functions; this
//! crate gives an application something to hold on to. [`Encounter`] owns the
//! encounter state, keeps the board-derived caches (blocking sets, light
//! field) fresh across board edits, and exposes the query and command surface
//! a game loop drives.
//!
//! Modules are organized by responsibility:
//! - [`session`] hosts the encounter session and its query/command API
//! - [`registry`] stores the declarative action definitions by id
//! - [`error`] is the host-side failure surface (rule rejections stay values)
pub mod error;
pub mod registry;
pub mod session;

pub use error::{Result, RuntimeError};
pub use registry::ActionRegistry;
pub use session::{Encounter, ResolutionReport};
