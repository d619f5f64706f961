//! Command execution, text input, REPL, and CLI for Deckhand.
//!
//! This crate provides:
//! - [`CommandExecutor`] - Runs one parsed command against a scope
//! - [`TextInput`] - Turns chat messages into replies and stored changes
//! - [`Repl`] - Interactive read-eval-print loop
//! - [`RuntimeConfig`] - Scopes, admins, and the local session
//! - Logging setup for the binary

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod editor;
pub mod executor;
pub mod logging;
pub mod repl;
pub mod text_input;

pub use config::{HOMEPAGE, RuntimeConfig};
pub use editor::{LineEditor, ReadResult, RustylineEditor, ScriptedEditor, command_keywords};
pub use executor::{CommandExecutor, Outcome, Persist, overview_text};
pub use logging::{env_filter, init_logging};
pub use repl::{Repl, format_reply};
pub use text_input::{Reply, TextInput};
