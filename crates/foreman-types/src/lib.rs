//! Shared type definitions for the Foreman agent fleet.
//!
//! Every crate in the workspace speaks in these types: identifiers, block
//! geometry, the closed task vocabulary the language model may plan with,
//! and the command/snapshot pair that feeds the prompt composer.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for agents, reservations, commands
//! - [`geometry`] -- Block positions, dimensions, and axis-aligned volumes
//! - [`enums`] -- Structure kinds, block palette, ores, attack targets
//! - [`task`] -- The [`Task`] sum type and the validated [`TaskPlan`]
//! - [`command`] -- Player [`Command`] and per-command [`SituationSnapshot`]

pub mod command;
pub mod enums;
pub mod geometry;
pub mod ids;
pub mod task;

// Re-export all public types at crate root for convenience.
pub use command::{Command, SituationSnapshot};
pub use enums::{AttackTarget, BlockType, Ore, StructureCategory, StructureKind};
pub use geometry::{BlockPos, Dimensions, Volume};
pub use ids::{AgentId, CommandId, ReservationId};
pub use task::{BuildTask, Task, TaskKind, TaskPlan};
