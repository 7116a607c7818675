//! Parsed command strings.
//!
//! Translated commands travel as plain strings (`/assign ann`). This module
//! gives them structure for callers that dispatch on the verb.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandParseError {
    #[error("empty command")]
    Empty,
    #[error("command must start with '/': {0:?}")]
    MissingSlash(String),
    #[error("command has no verb: {0:?}")]
    MissingVerb(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Verb {
    Assign,
    Tag,
    Close,
    Reopen,
    Do,
    Consider,
    Stage,
    User,
    Add,
    Clear,
    Visit,
    Search,
    /// A verb outside the known vocabulary, kept as written (lowercased)
    Other(String),
}

impl Verb {
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "assign" => Verb::Assign,
            "tag" => Verb::Tag,
            "close" => Verb::Close,
            "reopen" => Verb::Reopen,
            "do" => Verb::Do,
            "consider" | "reconsider" => Verb::Consider,
            "stage" => Verb::Stage,
            "user" => Verb::User,
            "add" => Verb::Add,
            "clear" => Verb::Clear,
            "visit" => Verb::Visit,
            "search" => Verb::Search,
            other => Verb::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Verb::Assign => "assign",
            Verb::Tag => "tag",
            Verb::Close => "close",
            Verb::Reopen => "reopen",
            Verb::Do => "do",
            Verb::Consider => "consider",
            Verb::Stage => "stage",
            Verb::User => "user",
            Verb::Add => "add",
            Verb::Clear => "clear",
            Verb::Visit => "visit",
            Verb::Search => "search",
            Verb::Other(name) => name,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Verb::Other(_))
    }
}

/// A `/verb [argument]` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub verb: Verb,
    /// Everything after the verb, trimmed; `None` when nothing follows
    pub argument: Option<String>,
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, CommandParseError> {
        line.parse()
    }

    /// Tag name for `/tag` commands, without the `#` prefix.
    pub fn tag_name(&self) -> Option<&str> {
        match (&self.verb, &self.argument) {
            (Verb::Tag, Some(arg)) => Some(arg.trim_start_matches('#')).filter(|t| !t.is_empty()),
            _ => None,
        }
    }
}

impl FromStr for Command {
    type Err = CommandParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        if line.is_empty() {
            return Err(CommandParseError::Empty);
        }
        let body = line
            .strip_prefix('/')
            .ok_or_else(|| CommandParseError::MissingSlash(line.to_string()))?;

        let (name, rest) = match body.find(char::is_whitespace) {
            Some(i) => (&body[..i], &body[i..]),
            None => (body, ""),
        };
        if name.is_empty() {
            return Err(CommandParseError::MissingVerb(line.to_string()));
        }

        let rest = rest.trim();
        Ok(Command {
            verb: Verb::from_name(name),
            argument: (!rest.is_empty()).then(|| rest.to_string()),
        })
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.verb.as_str())?;
        if let Some(arg) = &self.argument {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Parse every command string, stopping at the first malformed one.
pub fn parse_commands<S: AsRef<str>>(lines: &[S]) -> Result<Vec<Command>, CommandParseError> {
    lines.iter().map(|line| line.as_ref().parse()).collect()
}
