//! Task vocabulary and validated task plans.
//!
//! A [`Task`] is the unit of work an agent executes. It is a closed sum
//! type: the agent runtime matches on it exhaustively, so adding a task
//! kind is a compile-checked change in one place. Tasks are immutable
//! once the plan validator has produced them; run-state lives in the
//! agent runtime, never in the task.

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use crate::enums::{AttackTarget, BlockType, Ore, StructureKind};
use crate::geometry::{BlockPos, Dimensions};

/// Parameters of a validated Build task.
///
/// The build origin is deliberately absent: it is derived from the
/// agent's position when execution begins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildTask {
    /// Which structure to build.
    pub structure: StructureKind,
    /// Two or three palette blocks, in the order the plan listed them.
    pub blocks: Vec<BlockType>,
    /// Footprint: supplied by the plan, or the structure's default.
    pub dimensions: Dimensions,
}

/// One unit of agent work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "parameters", rename_all = "snake_case")]
pub enum Task {
    /// Fight nearby hostile mobs.
    Attack {
        /// Always [`AttackTarget::Hostile`].
        target: AttackTarget,
    },
    /// Construct a structure near the agent.
    Build(BuildTask),
    /// Extract a quantity of one ore.
    Mine {
        /// Ore to mine.
        ore: Ore,
        /// How many ore blocks to collect.
        quantity: NonZeroU32,
    },
    /// Follow a player around.
    Follow {
        /// Name of the player to follow; never empty.
        player: String,
    },
    /// Walk to a coordinate.
    Pathfind {
        /// Destination block.
        target: BlockPos,
    },
}

/// The tag of a [`Task`], without its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// See [`Task::Attack`].
    Attack,
    /// See [`Task::Build`].
    Build,
    /// See [`Task::Mine`].
    Mine,
    /// See [`Task::Follow`].
    Follow,
    /// See [`Task::Pathfind`].
    Pathfind,
}

impl TaskKind {
    /// Every task kind.
    pub const ALL: [Self; 5] = [
        Self::Attack,
        Self::Build,
        Self::Mine,
        Self::Follow,
        Self::Pathfind,
    ];

    /// Canonical action tag as it appears in plan JSON.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Attack => "attack",
            Self::Build => "build",
            Self::Mine => "mine",
            Self::Follow => "follow",
            Self::Pathfind => "pathfind",
        }
    }

    /// Look up a task kind by action tag, ignoring case and whitespace.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(name))
    }
}

impl core::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Task {
    /// The tag of this task.
    pub const fn kind(&self) -> TaskKind {
        match self {
            Self::Attack { .. } => TaskKind::Attack,
            Self::Build(_) => TaskKind::Build,
            Self::Mine { .. } => TaskKind::Mine,
            Self::Follow { .. } => TaskKind::Follow,
            Self::Pathfind { .. } => TaskKind::Pathfind,
        }
    }
}

impl core::fmt::Display for Task {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Attack { target } => write!(f, "attack {target}"),
            Self::Build(build) => write!(f, "build {} {}", build.structure, build.dimensions),
            Self::Mine { ore, quantity } => write!(f, "mine {quantity} {ore}"),
            Self::Follow { player } => write!(f, "follow {player}"),
            Self::Pathfind { target } => write!(f, "pathfind to {target}"),
        }
    }
}

/// A validated plan derived from one command.
///
/// `reasoning` and `summary` are advisory text from the language model;
/// only `tasks` drives execution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPlan {
    /// The model's stated reasoning.
    pub reasoning: String,
    /// One-line description of the plan.
    pub summary: String,
    /// Tasks in execution order.
    pub tasks: Vec<Task>,
}

impl TaskPlan {
    /// A plan with no tasks, used when a response could not be parsed.
    pub const fn empty() -> Self {
        Self {
            reasoning: String::new(),
            summary: String::new(),
            tasks: Vec::new(),
        }
    }

    /// Whether the plan has nothing to execute.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_variant() {
        let mine = Task::Mine {
            ore: Ore::Iron,
            quantity: NonZeroU32::new(8).unwrap(),
        };
        assert_eq!(mine.kind(), TaskKind::Mine);
        let follow = Task::Follow {
            player: String::from("Alex"),
        };
        assert_eq!(follow.kind(), TaskKind::Follow);
    }

    #[test]
    fn kind_lookup_is_case_insensitive() {
        assert_eq!(TaskKind::from_name("BUILD"), Some(TaskKind::Build));
        assert_eq!(TaskKind::from_name("dance"), None);
    }

    #[test]
    fn display_is_human_readable() {
        let build = Task::Build(BuildTask {
            structure: StructureKind::House,
            blocks: vec![BlockType::OakPlanks, BlockType::Cobblestone],
            dimensions: Dimensions::new(9, 6, 9).unwrap(),
        });
        assert_eq!(build.to_string(), "build house 9x6x9");
        let mine = Task::Mine {
            ore: Ore::Diamond,
            quantity: NonZeroU32::new(3).unwrap(),
        };
        assert_eq!(mine.to_string(), "mine 3 diamond");
    }

    #[test]
    fn serialized_tag_matches_action_schema() {
        let attack = Task::Attack {
            target: AttackTarget::Hostile,
        };
        let json = serde_json::to_value(&attack).unwrap();
        assert_eq!(json["action"], "attack");
        assert_eq!(json["parameters"]["target"], "hostile");
    }

    #[test]
    fn empty_plan_has_no_tasks() {
        assert!(TaskPlan::empty().is_empty());
        assert_eq!(TaskPlan::empty(), TaskPlan::default());
    }
}
