//! Deckhand - Shared card decks for chat groups
//!
//! This crate re-exports all layers of the Deckhand system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 3: deckhand_runtime    — Command execution, text input, REPL, CLI
//! Layer 2: deckhand_storage    — Scopes, repositories
//! Layer 1: deckhand_parser     — Command grammar, card-list notation
//!          deckhand_engine     — Decks, piles, put-back modes
//! Layer 0: deckhand_foundation — Identifiers, card specifications, Error
//! ```

pub use deckhand_engine as engine;
pub use deckhand_foundation as foundation;
pub use deckhand_parser as parser;
pub use deckhand_runtime as runtime;
pub use deckhand_storage as storage;
