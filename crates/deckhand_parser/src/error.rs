//! Parse errors.
//!
//! A parse error is a message plus, when the parser knew which command was
//! meant, the command it belongs to. The usage registry reads that origin to
//! append a help footer.

use thiserror::Error;

use crate::command::CommandFamily;

/// The command an error was raised for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandOrigin {
    /// Family of the command.
    pub family: CommandFamily,
    /// Surface name of the command.
    pub name: String,
}

/// A malformed command.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ParseError {
    /// Message shown to the user.
    pub message: String,
    /// The command the error belongs to, if known.
    pub origin: Option<CommandOrigin>,
}

impl ParseError {
    /// Creates an error with no known origin.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            origin: None,
        }
    }

    /// Creates an error for a specific command.
    #[must_use]
    pub fn for_command(
        family: CommandFamily,
        name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            origin: Some(CommandOrigin {
                family,
                name: name.into(),
            }),
        }
    }
}

/// `「卡组」未知命令「X」`
#[must_use]
pub fn unknown_command(family: CommandFamily, name: &str) -> ParseError {
    ParseError::for_command(family, name, format!("「{family}」未知命令「{name}」"))
}

/// `「卡组」命令「X」参数有误：<detail>`
#[must_use]
pub fn bad_arguments(family: CommandFamily, name: &str, detail: &str) -> ParseError {
    ParseError::for_command(
        family,
        name,
        format!("「{family}」命令「{name}」参数有误：{detail}"),
    )
}

/// The command takes no arguments but got some.
#[must_use]
pub fn should_not_have_arguments(family: CommandFamily, name: &str) -> ParseError {
    bad_arguments(family, name, "不应存在参数")
}

/// The command needs arguments but got none.
#[must_use]
pub fn should_have_arguments(family: CommandFamily, name: &str) -> ParseError {
    bad_arguments(family, name, "参数不应为空")
}
