//! Error types for fleet management.

use foreman_types::BlockPos;

/// Errors returned by [`FleetManager`](crate::FleetManager) and
/// [`Session`](crate::Session).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FleetError {
    /// Two spawn specs share a display name (compared case-insensitively).
    #[error("duplicate agent name: {0}")]
    DuplicateName(String),

    /// A spawn spec has a blank display name.
    #[error("agent name must not be empty")]
    EmptyName,

    /// The spawn formation does not fit in block coordinates.
    #[error("spawn formation around {anchor} leaves the world grid")]
    FormationOutOfBounds {
        /// The player position the formation was anchored on.
        anchor: BlockPos,
    },
}
