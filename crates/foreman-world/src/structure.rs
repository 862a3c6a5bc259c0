//! Structure blueprints.
//!
//! A blueprint fixes what the engine needs to know about a structure
//! before the world builds it: whether its shape comes from a stored
//! template or is generated, and the footprint to reserve when the plan
//! did not supply usable dimensions. Template footprints are the bounding
//! boxes of the stored templates; procedural defaults follow the sizes
//! advertised in the system prompt.

use foreman_types::{Dimensions, StructureCategory, StructureKind};

/// Static build information for one [`StructureKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructureBlueprint {
    /// The structure this blueprint describes.
    pub kind: StructureKind,
    /// Template or procedural.
    pub category: StructureCategory,
    /// Footprint used when the plan supplies none.
    pub default_dimensions: Dimensions,
}

/// Footprint literal for the blueprint table.
///
/// Every axis in the table is non-zero; the fallback only exists so the
/// table stays panic-free.
const fn footprint(width: u32, height: u32, depth: u32) -> Dimensions {
    match Dimensions::new(width, height, depth) {
        Some(d) => d,
        None => Dimensions {
            width: 1,
            height: 1,
            depth: 1,
        },
    }
}

/// Return the canonical blueprint for a given [`StructureKind`].
pub const fn blueprint(kind: StructureKind) -> StructureBlueprint {
    let default_dimensions = match kind {
        // ---- Templates ----
        StructureKind::House => footprint(9, 6, 9),
        StructureKind::OldHouse => footprint(10, 7, 10),
        StructureKind::PowerPlant => footprint(15, 10, 15),

        // ---- Procedural ----
        StructureKind::Castle => footprint(14, 10, 14),
        StructureKind::Tower => footprint(6, 16, 6),
        StructureKind::Barn => footprint(12, 8, 14),
        StructureKind::Modern => footprint(12, 7, 10),
    };
    StructureBlueprint {
        kind,
        category: kind.category(),
        default_dimensions,
    }
}

/// Pick the footprint for a build.
///
/// Requested dimensions win when present; otherwise the blueprint default
/// is used. [`Dimensions`] cannot hold a zero axis, so the result is
/// always a buildable footprint.
pub const fn resolve_dimensions(
    kind: StructureKind,
    requested: Option<Dimensions>,
) -> Dimensions {
    match requested {
        Some(d) => d,
        None => blueprint(kind).default_dimensions,
    }
}

/// The footprint a build actually occupies, and therefore reserves.
///
/// A template is placed at its stored size whatever the plan asked for;
/// procedural structures are generated at the task's dimensions.
pub const fn reserved_dimensions(kind: StructureKind, task_dimensions: Dimensions) -> Dimensions {
    match kind.category() {
        StructureCategory::Template => blueprint(kind).default_dimensions,
        StructureCategory::Procedural => task_dimensions,
    }
}
