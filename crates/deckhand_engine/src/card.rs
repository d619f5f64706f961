//! Read-only view of one card kind.

use deckhand_foundation::{CardName, UserId};

/// A card kind as shown to users.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Card {
    /// Card name.
    pub name: CardName,
    /// Description text, possibly multi-line.
    pub description: String,
    /// The user who first added the card.
    pub provider: UserId,
}

impl Card {
    /// One-line listing text: `3#name：<first 9 characters>…`.
    #[must_use]
    pub fn short_text(&self, amount: Option<u64>) -> String {
        let description = if self.description.chars().count() >= 10 {
            let mut cut: String = self.description.chars().take(9).collect();
            cut.push('…');
            cut
        } else {
            self.description.clone()
        };
        let description = description.replace('\n', "<换行>");
        match amount {
            Some(n) => format!("{n}#{}：{description}", self.name),
            None => format!("{}：{description}", self.name),
        }
    }

    /// Provider line followed by the bracketed description.
    #[must_use]
    pub fn full_text(&self) -> String {
        let opening = if self.description.contains('\n') { "\n" } else { "" };
        format!(
            "添加者：{}\n{}「{opening}{}」",
            self.provider, self.name, self.description
        )
    }
}
