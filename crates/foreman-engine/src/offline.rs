//! Keyword planner used when no LLM backend is configured.
//!
//! [`OfflinePlanner`] reads the rendered prompt the same way a model
//! would, picks the command and nearby players out of it, and answers
//! with plan JSON in the documented schema. The answer goes through the
//! normal parser, so everything downstream behaves as it does with a
//! real model. It understands English keywords only.

use std::future::Future;

use foreman_planner::{CompletionBackend, LlmBackend, PlannerError, RenderedPrompt};
use foreman_types::{Ore, StructureKind};
use serde_json::{Value, json};

/// Header line the command follows in the user prompt.
const COMMAND_HEADER: &str = "=== PLAYER COMMAND ===";

/// Prefix of the nearby-players line in the user prompt.
const PLAYERS_PREFIX: &str = "Nearby Players:";

/// Mine quantity when the command names none.
const DEFAULT_QUANTITY: u32 = 16;

const ATTACK_WORDS: &[&str] = &["attack", "kill", "fight", "defend", "slay"];
const MOVE_WORDS: &[&str] = &["go", "walk", "move", "goto", "travel"];
const FOLLOW_WORDS: &[&str] = &["follow"];
const MINE_WORDS: &[&str] = &["mine", "dig", "gather", "collect", "get"];
const BUILD_WORDS: &[&str] = &["build", "construct", "make", "erect"];

/// Rule-based stand-in for a language model.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflinePlanner;

impl OfflinePlanner {
    /// Create the planner.
    pub const fn new() -> Self {
        Self
    }

    /// Produce plan JSON for a rendered user prompt.
    pub fn respond(self, user_prompt: &str) -> String {
        let command = extract_command(user_prompt);
        let players = extract_players(user_prompt);

        let lowered = command.to_lowercase();
        let tasks: Vec<Value> = lowered
            .split([',', ';'])
            .flat_map(|part| part.split(" and "))
            .flat_map(|part| part.split(" then "))
            .filter_map(|clause| plan_clause(clause, &players))
            .collect();

        let reasoning = if tasks.is_empty() {
            "No known action in command"
        } else {
            "Matched command keywords"
        };
        json!({
            "reasoning": reasoning,
            "plan": command,
            "tasks": tasks,
        })
        .to_string()
    }
}

impl CompletionBackend for OfflinePlanner {
    fn name(&self) -> &str {
        "offline"
    }

    fn complete(
        &self,
        prompt: &RenderedPrompt,
    ) -> impl Future<Output = Result<String, PlannerError>> + Send {
        std::future::ready(Ok(self.respond(&prompt.user)))
    }
}

/// The planner the engine runs with.
#[derive(Debug)]
pub enum EngineBackend {
    /// An HTTP language model.
    Remote(LlmBackend),
    /// The keyword planner.
    Offline(OfflinePlanner),
}

impl CompletionBackend for EngineBackend {
    fn name(&self) -> &str {
        match self {
            Self::Remote(backend) => backend.name(),
            Self::Offline(planner) => planner.name(),
        }
    }

    async fn complete(&self, prompt: &RenderedPrompt) -> Result<String, PlannerError> {
        match self {
            Self::Remote(backend) => backend.complete(prompt).await,
            Self::Offline(planner) => planner.complete(prompt).await,
        }
    }
}

/// The command text: the first non-blank line after the command header,
/// without its quotes. Falls back to the whole prompt.
fn extract_command(user_prompt: &str) -> &str {
    user_prompt
        .split_once(COMMAND_HEADER)
        .and_then(|(_, rest)| rest.lines().map(str::trim).find(|l| !l.is_empty()))
        .map_or(user_prompt, |line| line.trim_matches('"'))
}

/// Player names from the situation block, nearest first.
fn extract_players(user_prompt: &str) -> Vec<&str> {
    user_prompt
        .lines()
        .find_map(|line| line.trim().strip_prefix(PLAYERS_PREFIX))
        .map(str::trim)
        .filter(|list| !list.is_empty() && *list != "none")
        .map(|list| list.split(',').map(str::trim).collect())
        .unwrap_or_default()
}

/// Turn one lowercase clause into at most one task object.
fn plan_clause(clause: &str, players: &[&str]) -> Option<Value> {
    let words: Vec<&str> = clause
        .split(|c: char| !(c.is_alphanumeric() || c == '-' || c == '_'))
        .filter(|w| !w.is_empty())
        .collect();
    let has = |vocabulary: &[&str]| words.iter().any(|w| vocabulary.contains(w));

    if has(ATTACK_WORDS) {
        return Some(json!({"action": "attack", "parameters": {"target": "hostile"}}));
    }

    if has(MOVE_WORDS) {
        let coords: Vec<i32> = words.iter().filter_map(|w| w.parse().ok()).collect();
        if let [x, y, z, ..] = coords.as_slice() {
            return Some(json!({"action": "pathfind", "parameters": {"x": x, "y": y, "z": z}}));
        }
    }

    if has(FOLLOW_WORDS) {
        return players
            .first()
            .map(|player| json!({"action": "follow", "parameters": {"player": player}}));
    }

    let ore = words.iter().find_map(|w| Ore::from_name(w));
    if has(MINE_WORDS) || ore.is_some() {
        let quantity = words
            .iter()
            .filter_map(|w| w.parse::<u32>().ok())
            .find(|n| *n > 0)
            .unwrap_or(DEFAULT_QUANTITY);
        let ore = ore.unwrap_or(Ore::Iron);
        return Some(json!({
            "action": "mine",
            "parameters": {"block": ore.as_str(), "quantity": quantity},
        }));
    }

    let structure = words.iter().find_map(|w| StructureKind::from_name(w));
    if has(BUILD_WORDS) || structure.is_some() {
        let structure = structure.unwrap_or(StructureKind::House);
        return Some(json!({
            "action": "build",
            "parameters": {
                "structure": structure.as_str(),
                "blocks": palette(structure),
            },
        }));
    }

    None
}

/// Default materials for a structure.
const fn palette(structure: StructureKind) -> &'static [&'static str] {
    match structure {
        StructureKind::House | StructureKind::OldHouse | StructureKind::Barn => {
            &["oak_planks", "cobblestone", "glass_pane"]
        }
        StructureKind::Castle | StructureKind::Tower => &["stone_bricks", "cobblestone"],
        StructureKind::PowerPlant | StructureKind::Modern => &["stone_bricks", "glass_pane"],
    }
}
