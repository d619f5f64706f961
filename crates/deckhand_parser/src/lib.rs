//! Command grammar for Deckhand chat messages.
//!
//! This crate provides:
//! - [`parse_command`] - Turns a message into a [`Command`], an error, or nothing
//! - [`parse_new_cards`] - The bracketed card-list notation with escaping
//! - [`parse_card_specifiers`] - `3#name` / `全部#name` card references
//! - [`COMMAND_USAGES`] - The usage registry behind `帮助` and error hints

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod command;
pub mod error;
pub mod new_cards;
pub mod parser;
pub mod setters;
pub mod specifiers;
pub mod text;
pub mod usage;

pub use command::{
    BetweenDecksCommand, Command, CommandFamily, DeckCommand, DeckDiscardPileCommand,
    DeckExistenceCommand, DeckHandCommand, ImportMode, PluginCommand, ReplyDestination,
};
pub use error::{CommandOrigin, ParseError};
pub use new_cards::{Bracket, ESCAPABLE, parse_new_cards, render_new_card};
pub use parser::{ParseOptions, ParseResult, parse_command, parse_deck_command};
pub use setters::{parse_attribute_setters, parse_flag_setters};
pub use specifiers::parse_card_specifiers;
pub use usage::{COMMAND_USAGES, CommandUsage, help_text};
