//! Closed vocabularies the language model is allowed to plan with.
//!
//! Every enum here has a canonical lowercase wire name (`as_str`) that
//! matches the action schema taught in the system prompt, and a
//! `from_name` lookup used by the plan validator. Lookups trim
//! surrounding whitespace and ignore ASCII case; anything else is an
//! unknown value.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Structures
// ---------------------------------------------------------------------------

/// Structures an agent knows how to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StructureKind {
    /// Pre-built template: standard house.
    #[serde(rename = "house")]
    House,
    /// Pre-built template: weathered old house.
    #[serde(rename = "oldhouse")]
    OldHouse,
    /// Pre-built template: power plant.
    #[serde(rename = "powerplant")]
    PowerPlant,
    /// Procedural castle.
    #[serde(rename = "castle")]
    Castle,
    /// Procedural tower.
    #[serde(rename = "tower")]
    Tower,
    /// Procedural barn.
    #[serde(rename = "barn")]
    Barn,
    /// Procedural modern house.
    #[serde(rename = "modern")]
    Modern,
}

/// How a structure's shape is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StructureCategory {
    /// Loaded from a stored template; the template decides the exact shape.
    Template,
    /// Generated block by block from the requested dimensions.
    Procedural,
}

impl StructureKind {
    /// Every buildable structure, templates first.
    pub const ALL: [Self; 7] = [
        Self::House,
        Self::OldHouse,
        Self::PowerPlant,
        Self::Castle,
        Self::Tower,
        Self::Barn,
        Self::Modern,
    ];

    /// Canonical wire name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::House => "house",
            Self::OldHouse => "oldhouse",
            Self::PowerPlant => "powerplant",
            Self::Castle => "castle",
            Self::Tower => "tower",
            Self::Barn => "barn",
            Self::Modern => "modern",
        }
    }

    /// Whether the shape comes from a template or is generated.
    pub const fn category(self) -> StructureCategory {
        match self {
            Self::House | Self::OldHouse | Self::PowerPlant => StructureCategory::Template,
            Self::Castle | Self::Tower | Self::Barn | Self::Modern => {
                StructureCategory::Procedural
            }
        }
    }

    /// Look up a structure by wire name.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(name))
    }
}

impl core::fmt::Display for StructureKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Block palette
// ---------------------------------------------------------------------------

/// Building materials a Build task may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
    /// Oak wood planks.
    OakPlanks,
    /// Cobblestone.
    Cobblestone,
    /// Thin glass pane.
    GlassPane,
    /// Stone bricks.
    StoneBricks,
}

impl BlockType {
    /// The full building palette.
    pub const ALL: [Self; 4] = [
        Self::OakPlanks,
        Self::Cobblestone,
        Self::GlassPane,
        Self::StoneBricks,
    ];

    /// Canonical wire name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OakPlanks => "oak_planks",
            Self::Cobblestone => "cobblestone",
            Self::GlassPane => "glass_pane",
            Self::StoneBricks => "stone_bricks",
        }
    }

    /// Look up a block by wire name.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|block| block.as_str().eq_ignore_ascii_case(name))
    }
}

impl core::fmt::Display for BlockType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Ores
// ---------------------------------------------------------------------------

/// Ores a Mine task may target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ore {
    /// Iron ore.
    Iron,
    /// Diamond ore.
    Diamond,
    /// Coal ore.
    Coal,
    /// Gold ore.
    Gold,
    /// Copper ore.
    Copper,
    /// Redstone ore.
    Redstone,
    /// Emerald ore.
    Emerald,
}

impl Ore {
    /// The mining allow-list.
    pub const ALL: [Self; 7] = [
        Self::Iron,
        Self::Diamond,
        Self::Coal,
        Self::Gold,
        Self::Copper,
        Self::Redstone,
        Self::Emerald,
    ];

    /// Canonical wire name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Iron => "iron",
            Self::Diamond => "diamond",
            Self::Coal => "coal",
            Self::Gold => "gold",
            Self::Copper => "copper",
            Self::Redstone => "redstone",
            Self::Emerald => "emerald",
        }
    }

    /// Look up an ore by wire name.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|ore| ore.as_str().eq_ignore_ascii_case(name))
    }
}

impl core::fmt::Display for Ore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Attack targets
// ---------------------------------------------------------------------------

/// Target class for an Attack task.
///
/// Only one class exists. Unlike the other vocabularies the wire literal
/// is matched exactly, with no case folding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackTarget {
    /// Any hostile mob or monster.
    Hostile,
}

impl AttackTarget {
    /// Canonical wire literal.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hostile => "hostile",
        }
    }
}

impl core::fmt::Display for AttackTarget {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
