//! The persistence interface.

use std::collections::HashMap;

use deckhand_engine::DeckData;
use deckhand_foundation::{DeckName, Result, ScopeId};

use crate::scope::ScopeData;

/// Loads and saves scopes and decks.
///
/// Callers load fresh state for every command and save only after the
/// command succeeded.
pub trait Repo {
    /// Loads a scope's data, `None` if it was never saved.
    ///
    /// # Errors
    ///
    /// Returns a storage or serialization error.
    fn load_scope_data(&self, scope: &ScopeId) -> Result<Option<ScopeData>>;

    /// Saves a scope's data.
    ///
    /// # Errors
    ///
    /// Returns a storage or serialization error.
    fn save_scope_data(&mut self, scope: &ScopeId, data: &ScopeData) -> Result<()>;

    /// Loads a deck's data, `None` if there is no such deck.
    ///
    /// # Errors
    ///
    /// Returns a storage or serialization error.
    fn load_deck_data(&self, scope: &ScopeId, deck: &DeckName) -> Result<Option<DeckData>>;

    /// Saves a deck's data.
    ///
    /// # Errors
    ///
    /// Returns a storage or serialization error.
    fn save_deck_data(&mut self, scope: &ScopeId, deck: &DeckName, data: &DeckData) -> Result<()>;

    /// Deletes a deck. Deleting a missing deck is not an error.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    fn delete_deck(&mut self, scope: &ScopeId, deck: &DeckName) -> Result<()>;
}

/// In-memory repository, for tests and throwaway sessions.
#[derive(Clone, Debug, Default)]
pub struct MemoryRepo {
    scopes: HashMap<ScopeId, ScopeData>,
    decks: HashMap<(ScopeId, DeckName), DeckData>,
}

impl MemoryRepo {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored decks across all scopes.
    #[must_use]
    pub fn deck_count(&self) -> usize {
        self.decks.len()
    }
}

impl Repo for MemoryRepo {
    fn load_scope_data(&self, scope: &ScopeId) -> Result<Option<ScopeData>> {
        Ok(self.scopes.get(scope).cloned())
    }

    fn save_scope_data(&mut self, scope: &ScopeId, data: &ScopeData) -> Result<()> {
        self.scopes.insert(scope.clone(), data.clone());
        Ok(())
    }

    fn load_deck_data(&self, scope: &ScopeId, deck: &DeckName) -> Result<Option<DeckData>> {
        Ok(self.decks.get(&(scope.clone(), deck.clone())).cloned())
    }

    fn save_deck_data(&mut self, scope: &ScopeId, deck: &DeckName, data: &DeckData) -> Result<()> {
        self.decks
            .insert((scope.clone(), deck.clone()), data.clone());
        Ok(())
    }

    fn delete_deck(&mut self, scope: &ScopeId, deck: &DeckName) -> Result<()> {
        self.decks.remove(&(scope.clone(), deck.clone()));
        Ok(())
    }
}
