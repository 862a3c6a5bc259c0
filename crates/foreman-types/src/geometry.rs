//! Block-grid geometry: positions, footprint dimensions, and volumes.
//!
//! The world is a grid of unit blocks addressed by signed 32-bit
//! coordinates. A [`Volume`] is an axis-aligned box with *inclusive*
//! bounds, so a 9x6x9 build anchored at the origin spans `0..=8` on x,
//! `0..=5` on y and `0..=8` on z. All coordinate arithmetic is checked;
//! a footprint that would leave the addressable grid yields `None`.

use serde::{Deserialize, Serialize};

/// A single block coordinate in the world grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct BlockPos {
    /// East-west axis.
    pub x: i32,
    /// Vertical axis.
    pub y: i32,
    /// North-south axis.
    pub z: i32,
}

impl BlockPos {
    /// Create a position from raw coordinates.
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Return this position shifted by the given deltas.
    ///
    /// Returns `None` if any axis would overflow.
    pub const fn offset(self, dx: i32, dy: i32, dz: i32) -> Option<Self> {
        let Some(x) = self.x.checked_add(dx) else {
            return None;
        };
        let Some(y) = self.y.checked_add(dy) else {
            return None;
        };
        let Some(z) = self.z.checked_add(dz) else {
            return None;
        };
        Some(Self { x, y, z })
    }
}

impl core::fmt::Display for BlockPos {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "[{}, {}, {}]", self.x, self.y, self.z)
    }
}

/// Width, height, and depth of a structure footprint, in blocks.
///
/// Every axis is at least one block; the constructor refuses zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    /// Extent along the x axis.
    pub width: u32,
    /// Extent along the y axis.
    pub height: u32,
    /// Extent along the z axis.
    pub depth: u32,
}

impl Dimensions {
    /// Create dimensions, rejecting any zero axis.
    pub const fn new(width: u32, height: u32, depth: u32) -> Option<Self> {
        if width == 0 || height == 0 || depth == 0 {
            return None;
        }
        Some(Self {
            width,
            height,
            depth,
        })
    }

    /// Number of blocks enclosed by the footprint, saturating at `u64::MAX`.
    pub fn block_count(self) -> u64 {
        u64::from(self.width)
            .saturating_mul(u64::from(self.depth))
            .saturating_mul(u64::from(self.height))
    }
}

impl core::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}x{}x{}", self.width, self.height, self.depth)
    }
}

/// An axis-aligned box of blocks with inclusive bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Volume {
    /// Corner with the smallest coordinate on every axis.
    pub min: BlockPos,
    /// Corner with the largest coordinate on every axis (inclusive).
    pub max: BlockPos,
}

impl Volume {
    /// Build the volume occupied by a footprint anchored at `origin`.
    ///
    /// The origin is the minimum corner; the box extends towards positive
    /// x (width), y (height) and z (depth). Returns `None` if the far
    /// corner falls outside the `i32` grid.
    pub fn from_origin(origin: BlockPos, dimensions: Dimensions) -> Option<Self> {
        let span = |extent: u32| i32::try_from(extent.checked_sub(1)?).ok();
        let max = origin.offset(
            span(dimensions.width)?,
            span(dimensions.height)?,
            span(dimensions.depth)?,
        )?;
        Some(Self { min: origin, max })
    }

    /// Whether two volumes share at least one block.
    ///
    /// Boxes that merely touch faces (`a.max.x + 1 == b.min.x`) do not
    /// intersect.
    pub const fn intersects(&self, other: &Self) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
            && self.min.z <= other.max.z
            && other.min.z <= self.max.z
    }

    /// Whether the block at `pos` lies inside this volume.
    pub const fn contains(&self, pos: BlockPos) -> bool {
        self.min.x <= pos.x
            && pos.x <= self.max.x
            && self.min.y <= pos.y
            && pos.y <= self.max.y
            && self.min.z <= pos.z
            && pos.z <= self.max.z
    }
}

impl core::fmt::Display for Volume {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}..={}", self.min, self.max)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn house() -> Dimensions {
        Dimensions::new(9, 6, 9).unwrap()
    }

    #[test]
    fn zero_dimension_rejected() {
        assert!(Dimensions::new(0, 6, 9).is_none());
        assert!(Dimensions::new(9, 0, 9).is_none());
        assert!(Dimensions::new(9, 6, 0).is_none());
    }

    #[test]
    fn volume_bounds_are_inclusive() {
        let v = Volume::from_origin(BlockPos::new(10, 64, -5), house()).unwrap();
        assert_eq!(v.min, BlockPos::new(10, 64, -5));
        assert_eq!(v.max, BlockPos::new(18, 69, 3));
        assert!(v.contains(BlockPos::new(18, 69, 3)));
        assert!(!v.contains(BlockPos::new(19, 69, 3)));
    }

    #[test]
    fn single_block_volume() {
        let one = Dimensions::new(1, 1, 1).unwrap();
        let v = Volume::from_origin(BlockPos::new(3, 4, 5), one).unwrap();
        assert_eq!(v.min, v.max);
    }

    #[test]
    fn overlapping_volumes_intersect() {
        let a = Volume::from_origin(BlockPos::new(0, 0, 0), house()).unwrap();
        let b = Volume::from_origin(BlockPos::new(8, 5, 8), house()).unwrap();
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
    }

    #[test]
    fn touching_faces_do_not_intersect() {
        let a = Volume::from_origin(BlockPos::new(0, 0, 0), house()).unwrap();
        let b = Volume::from_origin(BlockPos::new(9, 0, 0), house()).unwrap();
        assert!(!a.intersects(&b));
    }

    #[test]
    fn overlap_on_two_axes_only_is_disjoint() {
        let a = Volume::from_origin(BlockPos::new(0, 0, 0), house()).unwrap();
        let b = Volume::from_origin(BlockPos::new(4, 2, 20), house()).unwrap();
        assert!(!a.intersects(&b));
    }

    #[test]
    fn far_corner_overflow_is_none() {
        let v = Volume::from_origin(BlockPos::new(i32::MAX, 0, 0), house());
        assert!(v.is_none());
    }

    #[test]
    fn position_display_matches_prompt_format() {
        assert_eq!(BlockPos::new(1, -2, 3).to_string(), "[1, -2, 3]");
    }
}
