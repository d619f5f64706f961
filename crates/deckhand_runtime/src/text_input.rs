//! The text front door: a chat message in, an optional reply out.
//!
//! Messages starting with the root prefix are regular commands. Messages
//! starting with `:` or `：` address the scope's default deck, and are
//! ordinary chat when the scope has none.

use deckhand_engine::DeckRng;
use deckhand_foundation::{Error, GroupId, UserId};
use deckhand_parser::{Command, ParseResult, PluginCommand, ReplyDestination, parse_command, parse_deck_command};
use deckhand_storage::{Repo, Scope, Scopes};
use tracing::{debug, error};

use crate::config::RuntimeConfig;
use crate::executor::{CommandExecutor, overview_text};

/// A reply to send.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reply {
    /// The text.
    pub text: String,
    /// Where to send it.
    pub destination: ReplyDestination,
}

impl Reply {
    fn here(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            destination: ReplyDestination::CurrentPlace,
        }
    }

    fn error(err: &impl std::fmt::Display) -> Self {
        Self::here(format!("错误：\n{err}"))
    }
}

/// Parses, executes, and persists chat messages.
pub struct TextInput<R: Repo> {
    config: RuntimeConfig,
    scopes: Scopes,
    repo: R,
    rng: DeckRng,
}

impl<R: Repo> TextInput<R> {
    /// Creates a front door over `repo`.
    pub fn new(config: RuntimeConfig, repo: R) -> Self {
        let rng = config.seed.map_or_else(DeckRng::from_entropy, DeckRng::seeded);
        let scopes = config.scopes();
        Self {
            config,
            scopes,
            repo,
            rng,
        }
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// The repository.
    #[must_use]
    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Handles one message. `None` means the message gets no reply.
    pub fn handle(&mut self, group: &GroupId, sender: &UserId, text: &str) -> Option<Reply> {
        let scope = match self.scopes.scope_for_group(&self.repo, group) {
            Ok(scope) => scope,
            Err(err) => return Some(self.report(&err)),
        };

        let parsed = if let Some(rest) = text.strip_prefix(self.config.root_prefix.as_str()) {
            parse_command(rest, &self.config.parse_options())
        } else if let Some(rest) = text.strip_prefix(':').or_else(|| text.strip_prefix('：')) {
            let deck = scope.as_ref().and_then(Scope::default_deck)?;
            parse_deck_command(rest, deck, &self.config.parse_options()).into()
        } else {
            return None;
        };

        let command = match parsed {
            ParseResult::Ok(command) => command,
            ParseResult::Error(err) => return scope.is_some().then(|| Reply::error(&err)),
            ParseResult::Ignore => return None,
        };

        let Some(scope) = scope else {
            debug!(%group, "message from a group outside every scope");
            return matches!(command, Command::Plugin(PluginCommand::Overview))
                .then(|| Reply::here(overview_text(&self.config, None)));
        };

        let scope_id = scope.id().clone();
        let executor = CommandExecutor::new(&self.repo, &self.config, scope, sender.clone());
        match executor.execute(command, &mut self.rng) {
            Ok(outcome) => {
                if let Err(err) = outcome.persist.apply(&mut self.repo, &scope_id) {
                    return Some(self.report(&err));
                }
                Some(Reply {
                    text: outcome.reply,
                    destination: outcome.destination,
                })
            }
            Err(err) => Some(self.report(&err)),
        }
    }

    fn report(&self, err: &Error) -> Reply {
        if err.is_user_error() {
            debug!(error = %err, "command failed");
        } else {
            error!(error = %err, "command failed");
        }
        Reply::error(err)
    }
}
