//! Error types for the `foreman-world` crate.

use foreman_types::{BlockPos, Dimensions};

/// Errors that can occur while placing structures in the world grid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    /// The footprint would extend past the edge of the addressable grid.
    #[error("footprint {dimensions} at {origin} leaves the world grid")]
    FootprintOutOfBounds {
        /// The requested origin.
        origin: BlockPos,
        /// The requested footprint.
        dimensions: Dimensions,
    },

    /// The build origin offset from the agent overflowed a coordinate.
    #[error("no build origin can be derived from agent position {position}")]
    OriginOutOfBounds {
        /// The agent's position.
        position: BlockPos,
    },
}
