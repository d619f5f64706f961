//! The developer REPL.
//!
//! A message may span several lines; a blank line sends it. Lines starting
//! with `/` are session commands and are sent immediately:
//!
//! - `/as <user>` speaks as another user
//! - `/in <group>` speaks in another group
//! - `/quit` leaves

use std::io::{self, Write};

use deckhand_foundation::{GroupId, Result, UserId};
use deckhand_parser::ReplyDestination;
use deckhand_storage::Repo;

use crate::editor::{LineEditor, ReadResult, RustylineEditor, command_keywords};
use crate::text_input::{Reply, TextInput};

enum SessionCommand {
    Said(String),
    Quit,
}

/// The interactive REPL.
pub struct Repl<R: Repo, E: LineEditor = RustylineEditor> {
    /// The line editor for input.
    editor: E,

    /// Front door every message goes through.
    input: TextInput<R>,

    /// Group the session speaks in.
    group: GroupId,

    /// User the session speaks as.
    sender: UserId,

    /// Whether to show the welcome banner.
    show_banner: bool,

    /// Primary prompt.
    prompt: String,

    /// Continuation prompt (for multi-line input).
    continuation_prompt: String,
}

impl<R: Repo> Repl<R, RustylineEditor> {
    /// Creates a new REPL with the default rustyline editor.
    ///
    /// # Errors
    ///
    /// Returns an error if the editor fails to initialize.
    pub fn new(input: TextInput<R>) -> Result<Self> {
        let editor = RustylineEditor::new(command_keywords(&input.config().root_prefix))?;
        Ok(Self::with_editor(input, editor))
    }
}

impl<R: Repo, E: LineEditor> Repl<R, E> {
    /// Creates a new REPL with the given editor.
    pub fn with_editor(input: TextInput<R>, editor: E) -> Self {
        let group = input.config().group.clone();
        let sender = input.config().sender.clone();
        Self {
            editor,
            input,
            group,
            sender,
            show_banner: true,
            prompt: "卡组> ".to_string(),
            continuation_prompt: "...> ".to_string(),
        }
    }

    /// Disables the welcome banner.
    #[must_use]
    pub fn without_banner(mut self) -> Self {
        self.show_banner = false;
        self
    }

    /// Sets the primary prompt.
    #[must_use]
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// The front door.
    #[must_use]
    pub fn input(&self) -> &TextInput<R> {
        &self.input
    }

    /// Sends one message as the current sender in the current group.
    pub fn eval(&mut self, message: &str) -> Option<Reply> {
        self.input.handle(&self.group, &self.sender, message)
    }

    /// Runs the REPL loop on stdout.
    ///
    /// # Errors
    ///
    /// Returns an error if reading input or writing output fails.
    pub fn run(&mut self) -> Result<()> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        self.run_to(&mut out)
    }

    /// Runs the REPL loop, writing replies to `out`.
    ///
    /// # Errors
    ///
    /// Returns an error if reading input or writing output fails.
    pub fn run_to<W: Write>(&mut self, out: &mut W) -> Result<()> {
        if self.show_banner {
            writeln!(
                out,
                "Deckhand {}：以 “{}” 的身份在群 “{}” 中发言。空行发送消息，/quit 退出。",
                env!("CARGO_PKG_VERSION"),
                self.sender,
                self.group
            )?;
        }

        while let Some(message) = self.read_message()? {
            match self.session_command(&message) {
                Some(SessionCommand::Quit) => break,
                Some(SessionCommand::Said(text)) => writeln!(out, "{text}")?,
                None => {
                    self.editor.add_history(&message);
                    if let Some(reply) = self.eval(&message) {
                        writeln!(out, "{}", format_reply(&reply))?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Reads lines until a blank line; `None` at end of input.
    fn read_message(&mut self) -> Result<Option<String>> {
        let mut lines: Vec<String> = Vec::new();
        loop {
            let prompt = if lines.is_empty() {
                &self.prompt
            } else {
                &self.continuation_prompt
            };

            match self.editor.read_line(prompt)? {
                ReadResult::Line(line) => {
                    if line.trim().is_empty() {
                        if lines.is_empty() {
                            continue;
                        }
                        return Ok(Some(lines.join("\n")));
                    }
                    if lines.is_empty() && line.starts_with('/') {
                        return Ok(Some(line));
                    }
                    lines.push(line);
                }
                ReadResult::Interrupted => lines.clear(),
                ReadResult::Eof => {
                    return Ok((!lines.is_empty()).then(|| lines.join("\n")));
                }
            }
        }
    }

    fn session_command(&mut self, message: &str) -> Option<SessionCommand> {
        let rest = message.strip_prefix('/')?;
        let (name, arg) = rest
            .split_once(char::is_whitespace)
            .map_or((rest, ""), |(n, a)| (n, a.trim()));
        let said = match (name, arg) {
            ("quit", _) => return Some(SessionCommand::Quit),
            ("as", user) if !user.is_empty() => {
                self.sender = UserId::from(user);
                format!("现在以 “{}” 的身份发言。", self.sender)
            }
            ("in", group) if !group.is_empty() => {
                self.group = GroupId::from(group);
                format!("现在在群 “{}” 中发言。", self.group)
            }
            _ => "可用的会话命令：/as <用户>、/in <群>、/quit".to_string(),
        };
        Some(SessionCommand::Said(said))
    }
}

/// Renders a reply for the terminal, marking private ones.
#[must_use]
pub fn format_reply(reply: &Reply) -> String {
    match reply.destination {
        ReplyDestination::CurrentPlace => reply.text.clone(),
        ReplyDestination::SenderPrivate => format!("[私聊] {}", reply.text),
    }
}
