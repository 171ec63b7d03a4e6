//! Special commands parser for interactive chat
//!
//! Lines starting with `/` control the chat session instead of being sent to
//! the model: attaching files, switching or renaming sessions, showing
//! history and exiting. Command names are case-insensitive; arguments keep
//! their original case.

use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },
}

/// Special commands that can be executed during interactive chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Show help
    Help,

    /// Extract a file and attach it to the next message
    Attach(String),

    /// List files attached to the next message
    ListAttachments,

    /// Drop all pending attachments
    ClearAttachments,

    /// Start a new session, optionally titled
    NewSession(Option<String>),

    /// List saved sessions
    ListSessions,

    /// Make another saved session current
    Switch(String),

    /// Rename the current session
    Rename(String),

    /// Print the current session's messages
    History,

    /// Leave interactive mode
    Exit,

    /// Not a special command; send the input to the model
    None,
}

/// Parse a user input line into a special command
///
/// # Errors
///
/// Returns `CommandError::UnknownCommand` for unrecognized `/` commands and
/// `CommandError::MissingArgument` when a required argument is absent.
///
/// # Examples
///
/// ```
/// use myiq::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// assert_eq!(
///     parse_special_command("/attach notes.txt").unwrap(),
///     SpecialCommand::Attach("notes.txt".to_string())
/// );
/// assert_eq!(parse_special_command("hello").unwrap(), SpecialCommand::None);
/// assert!(parse_special_command("/foo").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    if !trimmed.starts_with('/') && lower != "exit" && lower != "quit" {
        return Ok(SpecialCommand::None);
    }

    let (name, arg) = match trimmed.split_once(char::is_whitespace) {
        Some((name, rest)) => (name.to_lowercase(), rest.trim()),
        None => (lower.clone(), ""),
    };

    let required = |usage: &str| -> Result<String, CommandError> {
        if arg.is_empty() {
            Err(CommandError::MissingArgument {
                command: name.clone(),
                usage: usage.to_string(),
            })
        } else {
            Ok(arg.to_string())
        }
    };

    match name.as_str() {
        "/help" | "/?" => Ok(SpecialCommand::Help),
        "/attach" => Ok(SpecialCommand::Attach(required("/attach <path>")?)),
        "/attachments" => Ok(SpecialCommand::ListAttachments),
        "/detach" => Ok(SpecialCommand::ClearAttachments),
        "/new" => Ok(SpecialCommand::NewSession(
            (!arg.is_empty()).then(|| arg.to_string()),
        )),
        "/sessions" => Ok(SpecialCommand::ListSessions),
        "/switch" => Ok(SpecialCommand::Switch(required("/switch <session id>")?)),
        "/rename" => Ok(SpecialCommand::Rename(required("/rename <title>")?)),
        "/history" => Ok(SpecialCommand::History),
        "exit" | "quit" | "/exit" | "/quit" => Ok(SpecialCommand::Exit),
        _ => Err(CommandError::UnknownCommand(name.clone())),
    }
}

/// Display help text for special commands
pub fn print_help() {
    println!(
        r#"
Chat Commands
=============

ATTACHMENTS:
  /attach <path>   - Attach a file to your next message
  /attachments     - List files attached to your next message
  /detach          - Remove all pending attachments

SESSIONS:
  /new [title]     - Start a new chat session
  /sessions        - List saved sessions
  /switch <id>     - Continue a saved session
  /rename <title>  - Rename the current session
  /history         - Show the current session's messages

OTHER:
  /help            - Show this help message
  /exit            - Leave chat (waits for pending replies)

NOTES:
  - Regular text (not starting with /) is sent to the model
  - You can keep typing while a reply is on its way
  - Replies are saved to the session they were sent from
  - Supported attachments: txt, md, py, ipynb, csv, pdf, docx
"#
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_not_a_command() {
        assert_eq!(
            parse_special_command("what's the weather").unwrap(),
            SpecialCommand::None
        );
    }

    #[test]
    fn test_exit_aliases() {
        for input in ["exit", "QUIT", "/exit", "/quit"] {
            assert_eq!(parse_special_command(input).unwrap(), SpecialCommand::Exit);
        }
    }

    #[test]
    fn test_arguments_keep_case() {
        assert_eq!(
            parse_special_command("/RENAME Trip To Rome").unwrap(),
            SpecialCommand::Rename("Trip To Rome".to_string())
        );
        assert_eq!(
            parse_special_command("/attach  /tmp/My File.pdf ").unwrap(),
            SpecialCommand::Attach("/tmp/My File.pdf".to_string())
        );
    }

    #[test]
    fn test_new_with_and_without_title() {
        assert_eq!(
            parse_special_command("/new").unwrap(),
            SpecialCommand::NewSession(None)
        );
        assert_eq!(
            parse_special_command("/new Groceries").unwrap(),
            SpecialCommand::NewSession(Some("Groceries".to_string()))
        );
    }

    #[test]
    fn test_missing_argument() {
        let err = parse_special_command("/switch").unwrap_err();
        assert!(matches!(err, CommandError::MissingArgument { .. }));
        assert!(err.to_string().contains("/switch <session id>"));
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(
            parse_special_command("/mode write").unwrap_err(),
            CommandError::UnknownCommand("/mode".to_string())
        );
    }
}
