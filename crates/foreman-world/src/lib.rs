//! The shared world as the orchestration engine sees it.
//!
//! The block world itself is an external collaborator. This crate holds
//! the parts of it the engine owns or depends on:
//!
//! # Modules
//!
//! - [`effects`] -- [`WorldEffects`] and [`WorldKnowledge`], the traits a
//!   world host implements so agents can sense and mutate it.
//! - [`error`] -- Error types for world-side operations.
//! - [`placement`] -- Deriving a build origin and candidate volume from an
//!   agent's position.
//! - [`registry`] -- [`StructureRegistry`], the process-wide table of
//!   spatial reservations held by in-progress builds.
//! - [`structure`] -- Static blueprints (category, default footprint) for
//!   every [`StructureKind`].
//!
//! [`StructureKind`]: foreman_types::StructureKind

pub mod effects;
pub mod error;
pub mod placement;
pub mod registry;
pub mod structure;

// Re-export primary types at crate root.
pub use effects::{EffectFailure, WorldEffects, WorldKnowledge};
pub use error::WorldError;
pub use placement::{build_origin, candidate_volume};
pub use registry::{ReservationConflict, StructureRegistry, StructureReservation};
pub use structure::{StructureBlueprint, blueprint, reserved_dimensions, resolve_dimensions};
