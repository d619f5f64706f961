//! What commands say about cards and configuration.
//!
//! These types are produced by the command parser and consumed by the deck
//! engine, so both agree on amount and placement semantics.

use serde::{Deserialize, Serialize};

use crate::ids::CardName;

/// Largest amount accepted anywhere a count is written (2^53 - 1).
pub const MAX_AMOUNT: u64 = 9_007_199_254_740_991;

/// How many instances a card specifier refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Amount {
    /// No amount was written; means one instance.
    #[default]
    Default,
    /// An explicit count.
    Exactly(u64),
    /// Every instance currently tracked for the name, wherever it is.
    All,
}

impl Amount {
    /// Returns the concrete count, or `None` for [`Amount::All`].
    #[must_use]
    pub const fn count(self) -> Option<u64> {
        match self {
            Self::Default => Some(1),
            Self::Exactly(n) => Some(n),
            Self::All => None,
        }
    }
}

/// A card name with an optional amount, as in `3#愚者` or `全部#愚者`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardSpecifier {
    /// The card name.
    pub name: CardName,
    /// The requested amount.
    pub amount: Amount,
}

impl CardSpecifier {
    /// Creates a specifier.
    #[must_use]
    pub fn new(name: impl Into<CardName>, amount: Amount) -> Self {
        Self {
            name: name.into(),
            amount,
        }
    }
}

/// A card to be created, as in `3#愚者「描述」`.
///
/// Creation always has a concrete quantity, so there is no "all" here.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NewCard {
    /// The card name.
    pub name: CardName,
    /// Explicit amount; `None` means one.
    pub amount: Option<u64>,
    /// Description, trimmed; may be empty.
    pub description: String,
}

impl NewCard {
    /// Creates a new card specification.
    #[must_use]
    pub fn new(
        name: impl Into<CardName>,
        amount: Option<u64>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            amount,
            description: description.into(),
        }
    }

    /// Number of instances this specification creates.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.amount.unwrap_or(1)
    }
}

/// Where literal placement puts new cards in a draw pile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Placement {
    /// End of the draw pile that is drawn from first.
    Top,
    /// Index 0 of the draw pile.
    Bottom,
}

/// Ordered `name value` updates; `None` clears the attribute to its default.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeSetters(Vec<(String, Option<String>)>);

impl AttributeSetters {
    /// Creates an empty set of setters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a setter.
    ///
    /// # Errors
    ///
    /// Returns the name back if it was already set in this request.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: Option<String>,
    ) -> std::result::Result<(), String> {
        let name = name.into();
        if self.0.iter().any(|(existing, _)| *existing == name) {
            return Err(name);
        }
        self.0.push((name, value));
        Ok(())
    }

    /// Returns the value set for a name, if the name appears.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Option<&str>> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_deref())
    }

    /// Iterates setters in input order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_deref()))
    }

    /// Number of setters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no setters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Ordered `+name` / `-name` tokens.
pub type FlagSetters = Vec<String>;
