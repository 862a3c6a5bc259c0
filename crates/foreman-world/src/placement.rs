//! Build placement relative to the building agent.
//!
//! A plan never says where to build. When a Build task starts, the origin
//! is derived from the agent's current position: the footprint's minimum
//! corner sits a short step diagonally ahead so the agent never stands
//! inside its own structure.

use foreman_types::{BlockPos, Dimensions, Volume};

use crate::error::WorldError;

/// Horizontal clearance between the agent and the footprint corner.
const BUILD_CLEARANCE: i32 = 2;

/// Derive the build origin for an agent standing at `position`.
pub const fn build_origin(position: BlockPos) -> Result<BlockPos, WorldError> {
    match position.offset(BUILD_CLEARANCE, 0, BUILD_CLEARANCE) {
        Some(origin) => Ok(origin),
        None => Err(WorldError::OriginOutOfBounds { position }),
    }
}

/// Compute the volume a build would claim if started at `position`.
///
/// Returns the origin alongside the volume so the caller can hand the
/// same origin to the world host.
pub fn candidate_volume(
    position: BlockPos,
    dimensions: Dimensions,
) -> Result<(BlockPos, Volume), WorldError> {
    let origin = build_origin(position)?;
    let volume = Volume::from_origin(origin, dimensions)
        .ok_or(WorldError::FootprintOutOfBounds { origin, dimensions })?;
    Ok((origin, volume))
}
