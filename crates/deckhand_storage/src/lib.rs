//! Scopes and persistence for Deckhand.
//!
//! This crate provides:
//! - [`Scope`] - A group of chats sharing decks, admins, and limits
//! - [`Scopes`] - Maps chat groups to their scope
//! - [`Repo`] - The persistence interface, with [`MemoryRepo`] and [`FileRepo`]

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod file;
pub mod repo;
pub mod scope;

pub use file::FileRepo;
pub use repo::{MemoryRepo, Repo};
pub use scope::{SCOPE_ATTRIBUTE_NAMES, Scope, ScopeData, Scopes};
