//! Deck engine for Deckhand.
//!
//! This crate provides:
//! - [`Deck`] - The per-deck state machine: add, delete, draw, shuffle, recycle
//! - [`update_deck_flags`] - Reconciles flag setters into a valid flag set
//! - [`DeckRng`] - The seedable random source every operation draws from

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod card;
pub mod deck;
pub mod flags;
pub mod rng;

pub use card::Card;
pub use deck::{
    CardEntry, DECK_ATTRIBUTE_NAMES, Deck, DeckData, FlagChange, Requester, ScopePolicy,
};
pub use flags::{
    DeckFlag, PutBackMode, extract_put_back_mode, flags_text, has_discard_flag, update_deck_flags,
};
pub use rng::DeckRng;
