//! Identifiers, card specifications, and error types for Deckhand.
//!
//! This crate provides:
//! - [`CardName`], [`DeckName`], [`UserId`], [`ScopeId`], [`GroupId`] - Opaque identifiers
//! - [`NewCard`], [`CardSpecifier`], [`Amount`] - What commands say about cards
//! - [`AttributeSetters`], [`FlagSetters`] - Incremental configuration updates
//! - [`Error`] - Rich error types with hints

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod cards;
pub mod error;
pub mod ids;

pub use cards::{
    Amount, AttributeSetters, CardSpecifier, FlagSetters, MAX_AMOUNT, NewCard, Placement,
};
pub use error::{Error, ErrorContext, ErrorKind};
pub use ids::{CardName, DeckName, GroupId, ScopeId, UserId};

/// Result type alias using the Deckhand error type.
pub type Result<T> = std::result::Result<T, Error>;
