//! Console input grammar.
//!
//! Each stdin line is either a command for the fleet or a slash command
//! for the engine itself:
//!
//! ```text
//! Steve: build a house        one agent, by name
//! all: attack the zombies     every agent, concurrently
//! /status                     agent states and reservations
//! /reset                      respawn the fleet in formation
//! /join  /leave               simulate the player joining or leaving
//! /help  /quit
//! ```

/// Who a command is addressed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Every live agent.
    All,
    /// One agent, matched by name case-insensitively.
    Agent(String),
}

/// One parsed console line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleInput {
    /// Blank line.
    Empty,
    /// Natural-language command for one or all agents.
    Say {
        /// Addressee.
        target: Target,
        /// Command text.
        text: String,
    },
    /// Print fleet status.
    Status,
    /// Respawn the fleet.
    Reset,
    /// Simulate the player joining.
    Join,
    /// Simulate the player leaving.
    Leave,
    /// Print usage.
    Help,
    /// Stop the engine.
    Quit,
}

/// A line the console could not understand.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    /// A `/command` that does not exist.
    #[error("unknown command /{0} (try /help)")]
    UnknownCommand(String),
    /// Text without an `Agent:` prefix.
    #[error("address an agent first, e.g. \"Steve: build a house\" or \"all: follow me\"")]
    MissingTarget,
    /// An `Agent:` prefix with nothing after it.
    #[error("nothing to tell {0}")]
    EmptyCommand(String),
}

/// Usage text printed by `/help`.
pub const HELP: &str = "\
commands:
  <Agent>: <text>   send a command to one agent
  all: <text>       send a command to every agent
  /status           show agent states and reservations
  /reset            respawn the fleet in formation
  /join, /leave     simulate the player joining or leaving
  /quit             stop the engine";

/// Parse one console line.
pub fn parse_line(line: &str) -> Result<ConsoleInput, InputError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(ConsoleInput::Empty);
    }

    if let Some(command) = line.strip_prefix('/') {
        return match command.trim().to_ascii_lowercase().as_str() {
            "status" => Ok(ConsoleInput::Status),
            "reset" => Ok(ConsoleInput::Reset),
            "join" => Ok(ConsoleInput::Join),
            "leave" => Ok(ConsoleInput::Leave),
            "help" | "?" => Ok(ConsoleInput::Help),
            "quit" | "exit" => Ok(ConsoleInput::Quit),
            other => Err(InputError::UnknownCommand(other.to_owned())),
        };
    }

    let (name, text) = line.split_once(':').ok_or(InputError::MissingTarget)?;
    let name = name.trim();
    if name.is_empty() {
        return Err(InputError::MissingTarget);
    }
    let text = text.trim();
    if text.is_empty() {
        return Err(InputError::EmptyCommand(name.to_owned()));
    }

    let target = if name.eq_ignore_ascii_case("all") {
        Target::All
    } else {
        Target::Agent(name.to_owned())
    };
    Ok(ConsoleInput::Say {
        target,
        text: text.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agent_commands_keep_their_text() {
        assert_eq!(
            parse_line("  Steve:  construye una casa "),
            Ok(ConsoleInput::Say {
                target: Target::Agent("Steve".to_owned()),
                text: "construye una casa".to_owned(),
            })
        );
    }

    #[test]
    fn only_the_first_colon_splits() {
        assert_eq!(
            parse_line("ALL: go to 1 2 3: now"),
            Ok(ConsoleInput::Say {
                target: Target::All,
                text: "go to 1 2 3: now".to_owned(),
            })
        );
    }

    #[test]
    fn slash_commands() {
        assert_eq!(parse_line("/Status"), Ok(ConsoleInput::Status));
        assert_eq!(parse_line("/exit"), Ok(ConsoleInput::Quit));
        assert_eq!(parse_line(""), Ok(ConsoleInput::Empty));
        assert_eq!(
            parse_line("/dance"),
            Err(InputError::UnknownCommand("dance".to_owned()))
        );
    }

    #[test]
    fn malformed_lines() {
        assert_eq!(parse_line("build a house"), Err(InputError::MissingTarget));
        assert_eq!(parse_line(": build"), Err(InputError::MissingTarget));
        assert_eq!(
            parse_line("Bob:   "),
            Err(InputError::EmptyCommand("Bob".to_owned()))
        );
    }
}
