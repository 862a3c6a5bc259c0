//! Prompt composition via `minijinja`.
//!
//! A prompt is two messages. The system message fixes the response
//! schema and the task vocabulary; the user message carries the agent's
//! situation and the player's command in fixed sections:
//!
//! ```text
//! === YOUR SITUATION ===
//! Position: [x, y, z]
//! Nearby Players: ...
//! Nearby Entities: ...
//! Nearby Blocks: ...
//! Biome: ...
//!
//! === PLAYER COMMAND ===
//! "<command text>"
//!
//! === YOUR RESPONSE (with reasoning) ===
//! ```
//!
//! Both messages ship as built-in templates. Operators can override them
//! with `system.j2` and `user.j2` from a directory; overrides are
//! rendered once at load so a broken template fails at startup.

use std::path::Path;

use foreman_types::{Command, SituationSnapshot};
use minijinja::{Environment, Value, context};
use tracing::{debug, warn};

use crate::error::PlannerError;

/// The built-in system message.
pub const SYSTEM_PROMPT: &str = r#"You control a worker agent in a block-building world. Respond ONLY with one JSON object and nothing else.

FORMAT:
{"reasoning": "short thought", "plan": "one-line summary", "tasks": [{"action": "<action>", "parameters": {}}]}

ACTIONS:
- attack: {"target": "hostile"}
- build: {"structure": "house", "blocks": ["oak_planks", "cobblestone", "glass_pane"], "dimensions": [9, 6, 9]}
- mine: {"block": "iron", "quantity": 8}
- follow: {"player": "NAME"}
- pathfind: {"x": 0, "y": 64, "z": 0}

RULES:
1. The attack target is always "hostile", whatever creature the player names.
2. Structures: house, oldhouse, powerplant, castle, tower, barn, modern.
3. house, oldhouse and powerplant are stored templates with a fixed size.
4. castle, tower, barn and modern are generated (castle 14x10x14, tower 6x16x6, barn 12x8x14, modern 12x7x10).
5. Use 2 or 3 block types from: oak_planks, cobblestone, glass_pane, stone_bricks.
6. Ores: iron, diamond, coal, gold, copper, redstone, emerald. Quantity is a positive whole number.
7. Do not add pathfind tasks unless the player asks for movement.
8. Keep reasoning under 15 words.
9. Understand commands in any language, but always answer with this English schema.

EXAMPLES:
Input: "build a house"
{"reasoning": "Standard house next to the player", "plan": "Build a house", "tasks": [{"action": "build", "parameters": {"structure": "house", "blocks": ["oak_planks", "cobblestone", "glass_pane"], "dimensions": [9, 6, 9]}}]}

Input: "consigue hierro"
{"reasoning": "Player wants iron", "plan": "Mine iron", "tasks": [{"action": "mine", "parameters": {"block": "iron", "quantity": 16}}]}

Input: "ataca a los monstruos"
{"reasoning": "Clear out hostile mobs", "plan": "Attack hostiles", "tasks": [{"action": "attack", "parameters": {"target": "hostile"}}]}

Output ONLY the JSON object. No markdown, no code fences, no commentary."#;

/// The built-in user message template.
const USER_TEMPLATE: &str = r#"=== YOUR SITUATION ===
Position: {{ position }}
Nearby Players: {% if nearby_players %}{{ nearby_players | join(", ") }}{% else %}none{% endif %}
Nearby Entities: {{ nearby_entities }}
Nearby Blocks: {{ nearby_blocks }}
Biome: {{ biome }}

=== PLAYER COMMAND ===
"{{ command }}"

=== YOUR RESPONSE (with reasoning) ===
"#;

/// The complete rendered prompt ready to send to an LLM backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPrompt {
    /// System message: schema and rules.
    pub system: String,
    /// User message: situation and command.
    pub user: String,
}

/// Renders commands and situations into prompts.
///
/// Composition never fails: if a template errors at render time the
/// built-in layout is used instead and a warning is logged.
pub struct PromptComposer {
    env: Environment<'static>,
}

impl std::fmt::Debug for PromptComposer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptComposer").finish_non_exhaustive()
    }
}

impl PromptComposer {
    /// Create a composer using the built-in templates.
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::Template`] if a built-in template fails to
    /// compile.
    pub fn new() -> Result<Self, PlannerError> {
        Self::with_sources(SYSTEM_PROMPT.to_owned(), USER_TEMPLATE.to_owned())
    }

    /// Create a composer from `system.j2` and `user.j2` in `dir`.
    ///
    /// Both templates are rendered once against a sample situation before
    /// this returns.
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::Io`] if a file cannot be read and
    /// [`PlannerError::Template`] if a template fails to compile or render.
    pub fn from_dir(dir: &Path) -> Result<Self, PlannerError> {
        let system = std::fs::read_to_string(dir.join("system.j2"))?;
        let user = std::fs::read_to_string(dir.join("user.j2"))?;
        let composer = Self::with_sources(system, user)?;

        let sample = prompt_context(
            &Command::new("operator", "build a house"),
            &SituationSnapshot::default(),
        );
        composer.render("system", &sample)?;
        composer.render("user", &sample)?;

        debug!(dir = %dir.display(), "loaded prompt template overrides");
        Ok(composer)
    }

    /// Create a composer from an optional override directory.
    ///
    /// # Errors
    ///
    /// See [`from_dir`](Self::from_dir) and [`new`](Self::new).
    pub fn from_config(templates_dir: Option<&Path>) -> Result<Self, PlannerError> {
        templates_dir.map_or_else(Self::new, Self::from_dir)
    }

    fn with_sources(system: String, user: String) -> Result<Self, PlannerError> {
        let mut env = Environment::new();
        // The user message ends on a line break after its last header.
        env.set_keep_trailing_newline(true);
        env.add_template_owned("system", system)
            .map_err(|e| PlannerError::Template(format!("failed to add system template: {e}")))?;
        env.add_template_owned("user", user)
            .map_err(|e| PlannerError::Template(format!("failed to add user template: {e}")))?;
        Ok(Self { env })
    }

    fn render(&self, name: &str, ctx: &Value) -> Result<String, PlannerError> {
        self.env
            .get_template(name)
            .map_err(|e| PlannerError::Template(format!("missing {name} template: {e}")))?
            .render(ctx)
            .map_err(|e| PlannerError::Template(format!("{name} render failed: {e}")))
    }

    /// Render the prompt for one command.
    ///
    /// The output depends only on `command.text` and `snapshot`, so equal
    /// inputs always produce equal prompts.
    pub fn compose(&self, command: &Command, snapshot: &SituationSnapshot) -> RenderedPrompt {
        let ctx = prompt_context(command, snapshot);

        let system = self.render("system", &ctx).unwrap_or_else(|e| {
            warn!(command_id = %command.id, error = %e, "system template failed, using built-in");
            SYSTEM_PROMPT.to_owned()
        });
        let user = self.render("user", &ctx).unwrap_or_else(|e| {
            warn!(command_id = %command.id, error = %e, "user template failed, using built-in");
            builtin_user(command, snapshot)
        });

        RenderedPrompt { system, user }
    }
}

/// Template variables for one command.
fn prompt_context(command: &Command, snapshot: &SituationSnapshot) -> Value {
    context! {
        command => command.text,
        issuer => command.issuer,
        position => snapshot.position.to_string(),
        nearby_players => snapshot.nearby_players,
        nearby_entities => snapshot.nearby_entities,
        nearby_blocks => snapshot.nearby_blocks,
        biome => snapshot.biome,
    }
}

/// The built-in user layout without the template engine.
fn builtin_user(command: &Command, snapshot: &SituationSnapshot) -> String {
    let players = if snapshot.nearby_players.is_empty() {
        "none".to_owned()
    } else {
        snapshot.nearby_players.join(", ")
    };
    format!(
        "=== YOUR SITUATION ===\n\
         Position: {}\n\
         Nearby Players: {players}\n\
         Nearby Entities: {}\n\
         Nearby Blocks: {}\n\
         Biome: {}\n\
         \n\
         === PLAYER COMMAND ===\n\
         \"{}\"\n\
         \n\
         === YOUR RESPONSE (with reasoning) ===\n",
        snapshot.position,
        snapshot.nearby_entities,
        snapshot.nearby_blocks,
        snapshot.biome,
        command.text,
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::path::PathBuf;

    use foreman_types::{BlockPos, CommandId};

    use super::*;

    fn snapshot() -> SituationSnapshot {
        SituationSnapshot {
            position: BlockPos::new(12, 64, -30),
            nearby_players: vec!["Alice".to_owned(), "Bob".to_owned()],
            nearby_entities: "2 zombies, 1 cow".to_owned(),
            nearby_blocks: "grass, oak_log, stone".to_owned(),
            biome: "plains".to_owned(),
        }
    }

    fn scratch_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("foreman-prompts-{}", CommandId::new()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn sections_appear_in_fixed_order() {
        let composer = PromptComposer::new().unwrap();
        let prompt = composer.compose(&Command::new("Alice", "build a house"), &snapshot());

        let sections = [
            "=== YOUR SITUATION ===",
            "Position: [12, 64, -30]",
            "Nearby Players: Alice, Bob",
            "Nearby Entities: 2 zombies, 1 cow",
            "Nearby Blocks: grass, oak_log, stone",
            "Biome: plains",
            "=== PLAYER COMMAND ===",
            "\"build a house\"",
            "=== YOUR RESPONSE (with reasoning) ===",
        ];
        let offsets: Vec<usize> = sections
            .iter()
            .map(|section| prompt.user.find(section).unwrap())
            .collect();
        assert!(offsets.windows(2).all(|w| w[0] < w[1]), "{offsets:?}");
    }

    #[test]
    fn equal_inputs_give_equal_prompts() {
        let composer = PromptComposer::new().unwrap();
        let a = composer.compose(&Command::new("Alice", "mine iron"), &snapshot());
        let b = composer.compose(&Command::new("Someone else", "mine iron"), &snapshot());
        assert_eq!(a, b);
    }

    #[test]
    fn template_matches_builtin_layout() {
        let composer = PromptComposer::new().unwrap();
        let command = Command::new("Alice", "follow me");
        let prompt = composer.compose(&command, &snapshot());
        assert_eq!(prompt.user, builtin_user(&command, &snapshot()));

        let empty = SituationSnapshot::default();
        let prompt = composer.compose(&command, &empty);
        assert_eq!(prompt.user, builtin_user(&command, &empty));
        assert!(prompt.user.contains("Nearby Players: none"));
    }

    #[test]
    fn user_message_ends_with_a_line_break() {
        let composer = PromptComposer::new().unwrap();
        let command = Command::new("Alice", "mine 3 coal");
        let prompt = composer.compose(&command, &snapshot());
        assert!(
            prompt.user.ends_with("=== YOUR RESPONSE (with reasoning) ===\n"),
            "{:?}",
            prompt.user
        );
        assert!(builtin_user(&command, &snapshot()).ends_with("===\n"));
        assert!(!prompt.system.ends_with('\n'));
    }

    #[test]
    fn system_prompt_documents_vocabulary() {
        let composer = PromptComposer::new().unwrap();
        let prompt = composer.compose(&Command::new("Alice", "hi"), &snapshot());
        assert_eq!(prompt.system, SYSTEM_PROMPT);
        for word in ["attack", "build", "mine", "follow", "pathfind", "stone_bricks", "emerald"] {
            assert!(prompt.system.contains(word), "system prompt lacks {word}");
        }
    }

    #[test]
    fn command_text_is_not_interpreted() {
        let composer = PromptComposer::new().unwrap();
        let text = "{{ biome }} {% if x %}";
        let prompt = composer.compose(&Command::new("Alice", text), &snapshot());
        assert!(prompt.user.contains(text));
    }

    #[test]
    fn overrides_are_loaded_from_dir() {
        let dir = scratch_dir();
        std::fs::write(dir.join("system.j2"), "Answer in JSON.").unwrap();
        std::fs::write(dir.join("user.j2"), "{{ issuer }} says: {{ command }}").unwrap();

        let composer = PromptComposer::from_config(Some(dir.as_path())).unwrap();
        let prompt = composer.compose(&Command::new("Alice", "dig"), &snapshot());
        assert_eq!(prompt.system, "Answer in JSON.");
        assert_eq!(prompt.user, "Alice says: dig");

        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn broken_override_fails_at_load() {
        let dir = scratch_dir();
        std::fs::write(dir.join("system.j2"), "ok").unwrap();
        std::fs::write(dir.join("user.j2"), "{% if command %}unterminated").unwrap();

        let err = PromptComposer::from_dir(&dir).unwrap_err();
        assert!(matches!(err, PlannerError::Template(_)));

        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn missing_override_dir_is_io_error() {
        let dir = std::env::temp_dir().join(format!("foreman-absent-{}", CommandId::new()));
        assert!(matches!(PromptComposer::from_dir(&dir), Err(PlannerError::Io(_))));
    }
}
