//! Player commands and the situational snapshot that accompanies them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geometry::BlockPos;
use crate::ids::CommandId;

/// A natural-language instruction from a player to one agent.
///
/// Commands are immutable once created and are consumed exactly once by
/// the prompt composer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    /// Unique command identifier for log correlation.
    pub id: CommandId,
    /// Name of the player who issued the command.
    pub issuer: String,
    /// The raw command text, in any language.
    pub text: String,
    /// When the command was received.
    pub issued_at: DateTime<Utc>,
}

impl Command {
    /// Create a command stamped with the current time.
    pub fn new(issuer: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: CommandId::new(),
            issuer: issuer.into(),
            text: text.into(),
            issued_at: Utc::now(),
        }
    }
}

/// Point-in-time view of an agent's surroundings.
///
/// Built fresh for every command by the world-knowledge collaborator and
/// never cached, since the world keeps changing between commands.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SituationSnapshot {
    /// The agent's current block position.
    pub position: BlockPos,
    /// Names of nearby players, nearest first.
    pub nearby_players: Vec<String>,
    /// Free-text summary of nearby entities.
    pub nearby_entities: String,
    /// Free-text summary of nearby blocks.
    pub nearby_blocks: String,
    /// Biome label at the agent's position.
    pub biome: String,
}
