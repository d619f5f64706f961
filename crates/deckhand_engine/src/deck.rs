//! Deck state and operations.
//!
//! A deck is a multiset of card instances split between the draw pile and
//! the discard pile. Each card name has one [`CardEntry`] whose
//! `reference_count` equals the number of its instances across both piles;
//! the entry is removed exactly when that count reaches zero.
//!
//! Pile index 0 is the bottom, so drawing pops from the end.

use std::collections::{BTreeMap, BTreeSet};

use deckhand_foundation::{
    Amount, AttributeSetters, CardName, CardSpecifier, DeckName, Error, ErrorKind, NewCard,
    Placement, Result, ScopeId, UserId,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::card::Card;
use crate::flags::{
    DeckFlag, PutBackMode, extract_put_back_mode, flags_text, has_discard_flag, update_deck_flags,
};
use crate::rng::DeckRng;

/// Attribute names a deck accepts.
pub const DECK_ATTRIBUTE_NAMES: &[&str] = &["描述"];

// =============================================================================
// Stored Data
// =============================================================================

/// Per-name bookkeeping.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardEntry {
    /// Instances of this name across all piles.
    pub reference_count: u64,
    /// Description shared by every instance.
    pub description: String,
    /// The user who first added the card.
    #[serde(rename = "providerID")]
    pub provider: UserId,
}

/// Everything persisted about one deck.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckData {
    /// The creator, who may always manage the deck.
    pub main_owner: UserId,
    /// Deck attributes by name.
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    /// Stored flags, never including [`DeckFlag::ScopeDefault`].
    pub flags: Vec<DeckFlag>,
    /// Card kinds by name.
    pub cards: BTreeMap<CardName, CardEntry>,
    /// Index 0 is the bottom.
    pub draw_pile: Vec<CardName>,
    /// Index 0 is the oldest discard.
    #[serde(default)]
    pub discard_pile: Vec<CardName>,
}

impl DeckData {
    /// An empty deck owned by `main_owner`, drawing with replacement.
    #[must_use]
    pub fn new(main_owner: UserId) -> Self {
        Self {
            main_owner,
            attributes: BTreeMap::new(),
            flags: vec![DeckFlag::WithReplacement],
            cards: BTreeMap::new(),
            draw_pile: Vec::new(),
            discard_pile: Vec::new(),
        }
    }

    /// Checks the flag and reference-count invariants, for data that came
    /// from outside.
    ///
    /// Exactly one put-back mode must be enabled. Outside `不放回` there may
    /// be neither the discard flag nor cards in the discard pile.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidInput`] describing the first inconsistency.
    pub fn validate(&self) -> Result<()> {
        if self.flags.contains(&DeckFlag::ScopeDefault) {
            return Err(Error::invalid_input("卡组数据不一致：旗帜 “领域默认” 不应被保存"));
        }

        let modes: Vec<PutBackMode> = self.flags.iter().filter_map(|f| f.put_back_mode()).collect();
        let [mode] = modes.as_slice() else {
            return Err(Error::invalid_input(format!(
                "卡组数据不一致：应恰好启用一个放回相关的旗帜，实际启用了 {} 个",
                modes.len()
            )));
        };
        if *mode != PutBackMode::WithoutReplacement {
            if has_discard_flag(&self.flags) {
                return Err(Error::invalid_input(format!(
                    "卡组数据不一致：只有启用旗帜 “{}” 时可以启用旗帜 “{}”",
                    DeckFlag::WithoutReplacement,
                    DeckFlag::Discard
                )));
            }
            if !self.discard_pile.is_empty() {
                return Err(Error::invalid_input(format!(
                    "卡组数据不一致：旗帜 “{mode}” 下弃牌堆应为空"
                )));
            }
        }

        let mut counted: BTreeMap<&CardName, u64> = BTreeMap::new();
        for name in self.draw_pile.iter().chain(&self.discard_pile) {
            if !self.cards.contains_key(name) {
                return Err(Error::invalid_input(format!(
                    "卡组数据不一致：牌堆中的 “{name}” 没有对应的卡牌信息"
                )));
            }
            *counted.entry(name).or_default() += 1;
        }
        for (name, entry) in &self.cards {
            let found = counted.get(name).copied().unwrap_or(0);
            if entry.reference_count == 0 || entry.reference_count != found {
                return Err(Error::invalid_input(format!(
                    "卡组数据不一致：“{name}” 记录有 {} 张，牌堆中实际有 {found} 张",
                    entry.reference_count
                )));
            }
        }
        Ok(())
    }
}

/// Limits and identity the owning scope imposes on a deck operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScopePolicy {
    /// The owning scope, for messages.
    pub scope: ScopeId,
    /// Maximum instances a deck may hold.
    pub max_cards_per_deck: u64,
}

/// Result of [`Deck::update_flags`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FlagChange {
    /// Whether the deck should now be the scope's default deck.
    pub is_scope_default: bool,
}

/// Who is asking for an operation that needs permission.
#[derive(Clone, Copy, Debug)]
pub struct Requester<'a> {
    /// The sender.
    pub user: &'a UserId,
    /// Whether the sender administers the scope.
    pub is_admin: bool,
}

struct Incoming {
    name: CardName,
    count: u64,
    description: String,
    provider: UserId,
}

// =============================================================================
// Deck
// =============================================================================

/// A named deck loaded for one command.
#[derive(Clone, Debug)]
pub struct Deck {
    name: DeckName,
    data: DeckData,
}

impl Deck {
    /// Wraps loaded data.
    #[must_use]
    pub fn new(name: DeckName, data: DeckData) -> Self {
        Self { name, data }
    }

    /// The deck's name.
    #[must_use]
    pub fn name(&self) -> &DeckName {
        &self.name
    }

    /// The stored data.
    #[must_use]
    pub fn data(&self) -> &DeckData {
        &self.data
    }

    /// Consumes the deck, returning its data for persistence.
    #[must_use]
    pub fn into_data(self) -> DeckData {
        self.data
    }

    /// Renames the deck in memory.
    pub fn set_name(&mut self, name: DeckName) {
        self.name = name;
    }

    /// The deck's creator.
    #[must_use]
    pub fn main_owner(&self) -> &UserId {
        &self.data.main_owner
    }

    /// Number of distinct card names.
    #[must_use]
    pub fn total_card_kinds(&self) -> usize {
        self.data.cards.len()
    }

    /// Number of card instances across all piles.
    #[must_use]
    pub fn total_cards(&self) -> u64 {
        self.data.cards.values().map(|e| e.reference_count).sum()
    }

    /// The active put-back mode.
    #[must_use]
    pub fn put_back_mode(&self) -> PutBackMode {
        extract_put_back_mode(&self.data.flags)
    }

    /// Whether drawn cards go to the discard pile.
    #[must_use]
    pub fn has_discard_flag(&self) -> bool {
        has_discard_flag(&self.data.flags)
    }

    /// Stored flags plus the derived scope-default flag.
    #[must_use]
    pub fn full_flags(&self, is_scope_default: bool) -> Vec<DeckFlag> {
        let mut flags = self.data.flags.clone();
        if is_scope_default {
            flags.push(DeckFlag::ScopeDefault);
        }
        flags
    }

    /// The `描述` attribute.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.data.attributes.get("描述").map(String::as_str)
    }

    // -------------------------------------------------------------------------
    // Settings
    // -------------------------------------------------------------------------

    /// Applies flag setters.
    ///
    /// Leaving `不放回` returns every discarded card to the draw pile. The
    /// returned [`FlagChange`] tells the caller whether the deck should be the
    /// scope's default deck afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidFlags`] from [`update_deck_flags`].
    pub fn update_flags(
        &mut self,
        setters: &[String],
        is_scope_default: bool,
        rng: &mut DeckRng,
    ) -> Result<FlagChange> {
        let flags = update_deck_flags(&self.full_flags(is_scope_default), setters)?;
        let is_scope_default = flags.contains(&DeckFlag::ScopeDefault);
        self.data.flags = flags
            .into_iter()
            .filter(|f| *f != DeckFlag::ScopeDefault)
            .collect();

        if self.put_back_mode() != PutBackMode::WithoutReplacement {
            self.recycle_all_cards_in_discard_pile(rng);
        }

        debug!(deck = %self.name, flags = ?self.data.flags, is_scope_default, "updated deck flags");
        Ok(FlagChange { is_scope_default })
    }

    /// Applies attribute setters. `None` or an empty value clears the attribute.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::UnknownAttribute`] for a name other than `描述`;
    /// nothing is changed in that case.
    pub fn update_attributes(&mut self, setters: &AttributeSetters) -> Result<()> {
        if let Some((name, _)) = setters
            .iter()
            .find(|(name, _)| !DECK_ATTRIBUTE_NAMES.contains(name))
        {
            return Err(ErrorKind::UnknownAttribute {
                owner: "卡组",
                name: name.to_string(),
            }
            .into());
        }

        for (name, value) in setters.iter() {
            match value.map(str::trim).filter(|v| !v.is_empty()) {
                Some(value) => {
                    self.data
                        .attributes
                        .insert(name.to_string(), value.to_string());
                }
                None => {
                    self.data.attributes.remove(name);
                }
            }
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Adding
    // -------------------------------------------------------------------------

    /// Adds new cards.
    ///
    /// `at` of `None` inserts every instance at an independent random
    /// position; `Top` and `Bottom` place them as a block.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::CapacityExceeded`] when the deck would hold more
    /// than the scope allows, or [`ErrorKind::AmbiguousDescription`] when a
    /// described card reuses an existing name. The deck is unchanged on error.
    pub fn add_cards(
        &mut self,
        cards: &[NewCard],
        at: Option<Placement>,
        provider: &UserId,
        policy: &ScopePolicy,
        rng: &mut DeckRng,
    ) -> Result<()> {
        let incoming = cards
            .iter()
            .map(|card| Incoming {
                name: card.name.clone(),
                count: card.count(),
                description: card.description.clone(),
                provider: provider.clone(),
            })
            .collect();
        self.insert_cards(incoming, at, policy, rng, false)
    }

    /// Adds cards that come from another deck, keeping description and provider.
    ///
    /// A card whose name already exists here is accepted when its description
    /// matches the existing one.
    ///
    /// # Errors
    ///
    /// As [`Deck::add_cards`].
    pub fn receive_cards(
        &mut self,
        cards: &[(Card, u64)],
        policy: &ScopePolicy,
        rng: &mut DeckRng,
    ) -> Result<()> {
        let incoming = cards
            .iter()
            .map(|(card, count)| Incoming {
                name: card.name.clone(),
                count: *count,
                description: card.description.clone(),
                provider: card.provider.clone(),
            })
            .collect();
        self.insert_cards(incoming, None, policy, rng, true)
    }

    fn insert_cards(
        &mut self,
        incoming: Vec<Incoming>,
        at: Option<Placement>,
        policy: &ScopePolicy,
        rng: &mut DeckRng,
        same_description_merges: bool,
    ) -> Result<()> {
        let adding: u64 = incoming
            .iter()
            .fold(0u64, |acc, card| acc.saturating_add(card.count));
        let current = self.total_cards();
        let total = current.saturating_add(adding);
        if total > policy.max_cards_per_deck {
            return Err(ErrorKind::CapacityExceeded {
                deck: self.name.clone(),
                scope: policy.scope.clone(),
                adding,
                current,
                total,
                limit: policy.max_cards_per_deck,
            }
            .into());
        }

        let mut pending: BTreeMap<&CardName, &str> = BTreeMap::new();
        for card in &incoming {
            let existing = self
                .data
                .cards
                .get(&card.name)
                .map(|e| e.description.as_str())
                .or_else(|| pending.get(&card.name).copied());
            if let Some(existing) = existing {
                let merges = same_description_merges && existing == card.description;
                if !card.description.is_empty() && !merges {
                    return Err(ErrorKind::AmbiguousDescription(card.name.clone()).into());
                }
            } else {
                pending.insert(&card.name, &card.description);
            }
        }

        let mut flat: Vec<CardName> = Vec::new();
        for card in incoming {
            flat.extend(std::iter::repeat_n(card.name.clone(), count_as_len(card.count)));
            self.data
                .cards
                .entry(card.name)
                .and_modify(|e| e.reference_count += card.count)
                .or_insert(CardEntry {
                    reference_count: card.count,
                    description: card.description,
                    provider: card.provider,
                });
        }
        // A zero amount adds no instance, so it must not leave an entry behind.
        self.data.cards.retain(|_, e| e.reference_count > 0);

        debug!(deck = %self.name, added = adding, total, ?at, "added cards");
        self.place(flat, at, rng);
        Ok(())
    }

    fn place(&mut self, mut names: Vec<CardName>, at: Option<Placement>, rng: &mut DeckRng) {
        match at {
            Some(Placement::Top) => {
                names.reverse();
                self.data.draw_pile.extend(names);
            }
            Some(Placement::Bottom) => {
                names.reverse();
                names.append(&mut self.data.draw_pile);
                self.data.draw_pile = names;
            }
            None => {
                for name in names {
                    self.insert_at_random(name, rng);
                }
            }
        }
    }

    fn insert_at_random(&mut self, name: CardName, rng: &mut DeckRng) {
        let idx = rng.position(self.data.draw_pile.len());
        self.data.draw_pile.insert(idx, name);
    }

    // -------------------------------------------------------------------------
    // Looking
    // -------------------------------------------------------------------------

    /// The card with the given name.
    #[must_use]
    pub fn card(&self, name: &CardName) -> Option<Card> {
        self.data.cards.get(name).map(|entry| Card {
            name: name.clone(),
            description: entry.description.clone(),
            provider: entry.provider.clone(),
        })
    }

    fn card_in_pile(&self, name: &CardName) -> Card {
        self.card(name)
            .expect("every card in a pile has a card entry")
    }

    /// Every card kind with its instance count, sorted by name.
    #[must_use]
    pub fn sorted_cards_with_amount(&self) -> Vec<(Card, u64)> {
        self.data
            .cards
            .iter()
            .map(|(name, entry)| (self.card_in_pile(name), entry.reference_count))
            .collect()
    }

    /// Instances in the discard pile, oldest first.
    #[must_use]
    pub fn cards_in_discard_pile(&self) -> Vec<Card> {
        self.data
            .discard_pile
            .iter()
            .map(|name| self.card_in_pile(name))
            .collect()
    }

    /// The top `n` cards of the draw pile, topmost first, without drawing.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::EmptyDrawPile`] when there is nothing to see.
    pub fn peek(&self, n: u64) -> Result<Vec<Card>> {
        if self.data.draw_pile.is_empty() {
            return Err(ErrorKind::EmptyDrawPile.into());
        }
        Ok(self
            .data
            .draw_pile
            .iter()
            .rev()
            .take(count_as_len(n))
            .map(|name| self.card_in_pile(name))
            .collect())
    }

    // -------------------------------------------------------------------------
    // Removing
    // -------------------------------------------------------------------------

    /// Deletes cards from the draw pile.
    ///
    /// # Errors
    ///
    /// As [`Deck::take_cards`].
    pub fn delete_cards(
        &mut self,
        specs: &[CardSpecifier],
        requester: Requester<'_>,
        rng: &mut DeckRng,
    ) -> Result<()> {
        self.take_cards(specs, requester, rng).map(|_| ())
    }

    /// Removes cards from the draw pile and returns what was removed.
    ///
    /// Only the card's provider, the deck's main owner, or a scope admin may
    /// remove a card. `全部` requires every instance to be in the draw pile.
    /// Specific amounts remove instances picked uniformly among the draw-pile
    /// occurrences.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::CardNotFound`], [`ErrorKind::PermissionDenied`],
    /// [`ErrorKind::NotAllInDrawPile`], [`ErrorKind::NotEnoughCards`] or
    /// [`ErrorKind::NotEnoughInDrawPile`].
    pub fn take_cards(
        &mut self,
        specs: &[CardSpecifier],
        requester: Requester<'_>,
        rng: &mut DeckRng,
    ) -> Result<Vec<(Card, u64)>> {
        let mut taken = Vec::with_capacity(specs.len());

        for spec in specs {
            let Some(entry) = self.data.cards.get(&spec.name) else {
                return Err(ErrorKind::CardNotFound {
                    deck: self.name.clone(),
                    card: spec.name.clone(),
                }
                .into());
            };
            if entry.provider != *requester.user
                && self.data.main_owner != *requester.user
                && !requester.is_admin
            {
                return Err(Error::permission_denied(
                    "只有本张卡的添加者、本卡组的拥有者、本领域的管理员或插件的主要管理员可以删除本张卡",
                ));
            }

            let total = entry.reference_count;
            let in_draw_pile = self.count_in_draw_pile(&spec.name);
            let card = self.card_in_pile(&spec.name);

            let removed = match spec.amount.count() {
                None => {
                    if in_draw_pile != total {
                        return Err(ErrorKind::NotAllInDrawPile {
                            card: spec.name.clone(),
                            total,
                            in_draw_pile,
                        }
                        .into());
                    }
                    self.data.draw_pile.retain(|name| *name != spec.name);
                    total
                }
                Some(requested) => {
                    if requested > in_draw_pile {
                        return Err(if requested > total {
                            ErrorKind::NotEnoughCards {
                                card: spec.name.clone(),
                                requested,
                            }
                        } else {
                            ErrorKind::NotEnoughInDrawPile {
                                card: spec.name.clone(),
                                requested,
                                total,
                            }
                        }
                        .into());
                    }
                    self.remove_random_instances(&spec.name, requested, rng);
                    requested
                }
            };

            self.release(&spec.name, removed);
            debug!(deck = %self.name, card = %spec.name, removed, "removed cards");
            taken.push((card, removed));
        }

        Ok(taken)
    }

    /// Copies of the requested cards for adding to another deck; nothing is removed.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::CardNotFound`] or [`ErrorKind::NotEnoughCards`].
    pub fn cards_for_transfer(&self, specs: &[CardSpecifier]) -> Result<Vec<(Card, u64)>> {
        specs
            .iter()
            .map(|spec| -> Result<(Card, u64)> {
                let Some(entry) = self.data.cards.get(&spec.name) else {
                    return Err(ErrorKind::CardNotFound {
                        deck: self.name.clone(),
                        card: spec.name.clone(),
                    }
                    .into());
                };
                let amount = match spec.amount {
                    Amount::All => entry.reference_count,
                    other => {
                        let requested = other.count().unwrap_or(1);
                        if requested > entry.reference_count {
                            return Err(ErrorKind::NotEnoughCards {
                                card: spec.name.clone(),
                                requested,
                            }
                            .into());
                        }
                        requested
                    }
                };
                Ok((self.card_in_pile(&spec.name), amount))
            })
            .collect()
    }

    fn count_in_draw_pile(&self, name: &CardName) -> u64 {
        self.data.draw_pile.iter().filter(|n| *n == name).count() as u64
    }

    fn remove_random_instances(&mut self, name: &CardName, n: u64, rng: &mut DeckRng) {
        let mut positions: Vec<usize> = self
            .data
            .draw_pile
            .iter()
            .enumerate()
            .filter(|(_, n)| *n == name)
            .map(|(i, _)| i)
            .collect();
        let mut chosen: Vec<usize> = (0..count_as_len(n))
            .map(|_| positions.swap_remove(rng.index(positions.len())))
            .collect();
        chosen.sort_unstable_by(|a, b| b.cmp(a));
        for idx in chosen {
            self.data.draw_pile.remove(idx);
        }
    }

    /// Drops `n` instances from the reference count, removing the entry at zero.
    fn release(&mut self, name: &CardName, n: u64) {
        let entry = self
            .data
            .cards
            .get_mut(name)
            .expect("released card has a card entry");
        entry.reference_count -= n;
        if entry.reference_count == 0 {
            self.data.cards.remove(name);
        }
    }

    // -------------------------------------------------------------------------
    // Drawing
    // -------------------------------------------------------------------------

    /// Shuffles the draw pile.
    pub fn shuffle(&mut self, rng: &mut DeckRng) {
        rng.shuffle(&mut self.data.draw_pile);
        debug!(deck = %self.name, size = self.data.draw_pile.len(), "shuffled draw pile");
    }

    /// Draws `n` cards according to the put-back mode.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::EmptyDrawPile`] first; then
    /// [`ErrorKind::DrawPileTooSmall`] for `不放回` and `放回不独立`, or
    /// [`ErrorKind::NotEnoughDistinctCards`] for `放回不重复`.
    pub fn draw(&mut self, n: u64, rng: &mut DeckRng) -> Result<Vec<Card>> {
        if self.data.draw_pile.is_empty() {
            return Err(ErrorKind::EmptyDrawPile.into());
        }

        let mode = self.put_back_mode();
        let wanted = count_as_len(n);
        let mut drawn: Vec<CardName> = Vec::with_capacity(wanted.min(self.data.draw_pile.len()));

        match mode {
            PutBackMode::WithReplacement => {
                for _ in 0..wanted {
                    let name = self.pop_top();
                    drawn.push(name.clone());
                    self.insert_at_random(name, rng);
                }
            }
            PutBackMode::WithoutReplacement | PutBackMode::WithReplacementBatch => {
                let available = self.data.draw_pile.len();
                if available < wanted {
                    return Err(ErrorKind::DrawPileTooSmall {
                        available,
                        requested: n,
                        batch: mode == PutBackMode::WithReplacementBatch,
                    }
                    .into());
                }
                for _ in 0..wanted {
                    drawn.push(self.pop_top());
                }
                if mode == PutBackMode::WithReplacementBatch {
                    for name in drawn.clone() {
                        self.insert_at_random(name, rng);
                    }
                }
            }
            PutBackMode::WithReplacementNoImmediateRepeat => {
                let available = self.data.draw_pile.iter().collect::<BTreeSet<_>>().len();
                if available < wanted {
                    return Err(ErrorKind::NotEnoughDistinctCards {
                        available,
                        requested: n,
                    }
                    .into());
                }
                let mut missed = Vec::new();
                while drawn.len() < wanted {
                    let name = self.pop_top();
                    if drawn.contains(&name) {
                        missed.push(name);
                    } else {
                        drawn.push(name);
                    }
                }
                for name in drawn.iter().cloned().chain(missed) {
                    self.insert_at_random(name, rng);
                }
            }
        }

        let cards: Vec<Card> = drawn.iter().map(|name| self.card_in_pile(name)).collect();

        if mode == PutBackMode::WithoutReplacement {
            if self.has_discard_flag() {
                self.data.discard_pile.extend(drawn);
            } else {
                for name in &drawn {
                    self.release(name, 1);
                }
            }
        }

        debug!(
            deck = %self.name,
            mode = %mode,
            drawn = cards.len(),
            remaining = self.data.draw_pile.len(),
            "drew cards"
        );
        Ok(cards)
    }

    fn pop_top(&mut self) -> CardName {
        self.data
            .draw_pile
            .pop()
            .expect("draw pile was checked to hold enough cards")
    }

    // -------------------------------------------------------------------------
    // Discard Pile
    // -------------------------------------------------------------------------

    /// Moves every discarded card to a random position in the draw pile.
    pub fn recycle_all_cards_in_discard_pile(&mut self, rng: &mut DeckRng) {
        let discarded = std::mem::take(&mut self.data.discard_pile);
        let count = discarded.len();
        for name in discarded {
            self.insert_at_random(name, rng);
        }
        if count > 0 {
            debug!(deck = %self.name, recycled = count, "recycled discard pile");
        }
    }

    /// Recycles the discard pile, then shuffles the draw pile.
    pub fn recycle_all_and_shuffle(&mut self, rng: &mut DeckRng) {
        self.recycle_all_cards_in_discard_pile(rng);
        self.shuffle(rng);
    }

    /// Moves specific cards from the discard pile back to the draw pile.
    ///
    /// The most recently discarded instances are recycled first. `全部`
    /// recycles every discarded instance of the name.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::CardNotFound`] or
    /// [`ErrorKind::NotEnoughInDiscardPile`]; the deck is unchanged on error.
    pub fn recycle_cards_from_discard_pile(
        &mut self,
        specs: &[CardSpecifier],
        at: Option<Placement>,
        rng: &mut DeckRng,
    ) -> Result<()> {
        let mut discard_pile = self.data.discard_pile.clone();
        let mut recycled: Vec<CardName> = Vec::new();

        for spec in specs {
            if !self.data.cards.contains_key(&spec.name) {
                return Err(ErrorKind::CardNotFound {
                    deck: self.name.clone(),
                    card: spec.name.clone(),
                }
                .into());
            }
            let in_discard_pile = discard_pile.iter().filter(|n| **n == spec.name).count() as u64;
            let requested = spec.amount.count().unwrap_or(in_discard_pile);
            if requested > in_discard_pile {
                return Err(ErrorKind::NotEnoughInDiscardPile {
                    card: spec.name.clone(),
                    requested,
                    in_discard_pile,
                }
                .into());
            }
            let mut remaining = requested;
            let mut idx = discard_pile.len();
            while remaining > 0 {
                idx -= 1;
                if discard_pile[idx] == spec.name {
                    recycled.push(discard_pile.remove(idx));
                    remaining -= 1;
                }
            }
        }

        self.data.discard_pile = discard_pile;
        debug!(deck = %self.name, recycled = recycled.len(), ?at, "recycled cards from discard pile");
        self.place(recycled, at, rng);
        Ok(())
    }

    /// Deletes every card in the discard pile.
    pub fn delete_all_cards_in_discard_pile(&mut self) {
        let discarded = std::mem::take(&mut self.data.discard_pile);
        for name in &discarded {
            self.release(name, 1);
        }
        debug!(deck = %self.name, deleted = discarded.len(), "deleted discard pile");
    }

    // -------------------------------------------------------------------------
    // Text
    // -------------------------------------------------------------------------

    /// Overview with owner, counts, and the flag descriptions.
    #[must_use]
    pub fn summary_text(&self, is_scope_default: bool) -> String {
        [
            format!("= 卡组 “{}” =", self.name),
            format!("主拥有者：{}", self.data.main_owner),
            format!("卡牌种类数：{}", self.total_card_kinds()),
            format!("卡牌总数：{}", self.total_cards()),
            String::new(),
            "== 旗帜 ==".to_string(),
            String::new(),
            flags_text(&self.full_flags(is_scope_default), &self.name),
            String::new(),
            "== 属性 ==".to_string(),
            String::new(),
            self.attributes_text(),
        ]
        .join("\n")
    }

    /// One line per known attribute, marking unset and empty values.
    #[must_use]
    pub fn attributes_text(&self) -> String {
        DECK_ATTRIBUTE_NAMES
            .iter()
            .map(|name| {
                let value = self.data.attributes.get(*name).map(String::as_str);
                let default = if value.is_some() { "" } else { "（默认）" };
                let empty = if value.is_some_and(|v| !v.is_empty()) { "" } else { "（空值）" };
                format!("{default}{empty}{name} {}", value.unwrap_or_default())
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Every card kind with its count.
    #[must_use]
    pub fn list_text(&self) -> String {
        let mut lines = vec![format!(
            "卡组 “{}” 现有卡牌（共 {} 种、{} 张）",
            self.name,
            self.total_card_kinds(),
            self.total_cards()
        )];
        lines.extend(
            self.sorted_cards_with_amount()
                .iter()
                .map(|(card, amount)| card.short_text(Some(*amount))),
        );
        lines.join("\n")
    }

    /// Full text of the named cards, separated by rules.
    #[must_use]
    pub fn card_text(&self, names: &[CardName]) -> String {
        names
            .iter()
            .map(|name| match self.card(name) {
                Some(card) => card.full_text(),
                None => format!("不存在名为 “{name}” 的卡牌。"),
            })
            .collect::<Vec<_>>()
            .join("\n\n---\n")
    }

    /// Every instance in the discard pile.
    #[must_use]
    pub fn discard_pile_text(&self) -> String {
        let cards = self.cards_in_discard_pile();
        let kinds = cards.iter().map(|c| &c.name).collect::<BTreeSet<_>>().len();
        let mut lines = vec![format!(
            "卡组 “{}” 弃牌堆现有卡牌（共 {kinds} 种、{} 张）",
            self.name,
            cards.len()
        )];
        lines.extend(cards.iter().map(|card| card.short_text(None)));
        lines.join("\n")
    }
}

/// Amounts are bounded by deck capacity long before they exceed `usize`.
fn count_as_len(n: u64) -> usize {
    usize::try_from(n).unwrap_or(usize::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(limit: u64) -> ScopePolicy {
        ScopePolicy {
            scope: "测试".into(),
            max_cards_per_deck: limit,
        }
    }

    fn owner() -> UserId {
        "owner".into()
    }

    fn deck_with(cards: &[NewCard], rng: &mut DeckRng) -> Deck {
        let mut deck = Deck::new("塔罗".into(), DeckData::new(owner()));
        deck.add_cards(cards, Some(Placement::Top), &owner(), &policy(200), rng)
            .unwrap();
        deck
    }

    fn counts(pile: &[CardName]) -> BTreeMap<String, usize> {
        let mut map = BTreeMap::new();
        for name in pile {
            *map.entry(name.to_string()).or_default() += 1;
        }
        map
    }

    fn set_flags(deck: &mut Deck, setters: &[&str], rng: &mut DeckRng) {
        let setters: Vec<String> = setters.iter().map(|s| (*s).to_string()).collect();
        deck.update_flags(&setters, false, rng).unwrap();
    }

    #[test]
    fn test_add_top_keeps_entry_order_from_the_top() {
        let mut rng = DeckRng::seeded(1);
        let deck = deck_with(
            &[NewCard::new("a", None, ""), NewCard::new("b", Some(2), "")],
            &mut rng,
        );
        let pile: Vec<&str> = deck.data().draw_pile.iter().map(CardName::as_str).collect();
        assert_eq!(pile, vec!["b", "b", "a"]);
        assert_eq!(deck.total_cards(), 3);
        deck.data().validate().unwrap();
    }

    #[test]
    fn test_add_bottom() {
        let mut rng = DeckRng::seeded(1);
        let mut deck = deck_with(&[NewCard::new("x", None, "")], &mut rng);
        deck.add_cards(
            &[NewCard::new("a", None, ""), NewCard::new("b", None, "")],
            Some(Placement::Bottom),
            &owner(),
            &policy(200),
            &mut rng,
        )
        .unwrap();
        let pile: Vec<&str> = deck.data().draw_pile.iter().map(CardName::as_str).collect();
        assert_eq!(pile, vec!["b", "a", "x"]);
    }

    #[test]
    fn test_capacity_is_checked_before_mutation() {
        let mut rng = DeckRng::seeded(1);
        let mut deck = deck_with(&[NewCard::new("a", Some(3), "")], &mut rng);
        let err = deck
            .add_cards(&[NewCard::new("b", Some(2), "")], None, &owner(), &policy(4), &mut rng)
            .unwrap_err();
        assert!(matches!(
            err.kind,
            ErrorKind::CapacityExceeded {
                adding: 2,
                current: 3,
                total: 5,
                limit: 4,
                ..
            }
        ));
        assert_eq!(deck.total_cards(), 3);
    }

    #[test]
    fn test_quantity_only_add_bumps_existing() {
        let mut rng = DeckRng::seeded(1);
        let mut deck = deck_with(&[NewCard::new("a", None, "第一张")], &mut rng);
        deck.add_cards(&[NewCard::new("a", Some(2), "")], None, &"other".into(), &policy(200), &mut rng)
            .unwrap();
        let entry = &deck.data().cards[&CardName::from("a")];
        assert_eq!(entry.reference_count, 3);
        assert_eq!(entry.description, "第一张");
        assert_eq!(entry.provider, owner());
    }

    #[test]
    fn test_described_re_add_is_ambiguous() {
        let mut rng = DeckRng::seeded(1);
        let mut deck = deck_with(&[NewCard::new("a", None, "x")], &mut rng);
        let err = deck
            .add_cards(&[NewCard::new("a", None, "y")], None, &owner(), &policy(200), &mut rng)
            .unwrap_err();
        assert!(matches!(err.kind, ErrorKind::AmbiguousDescription(_)));

        let mut fresh = Deck::new("新".into(), DeckData::new(owner()));
        let err = fresh
            .add_cards(
                &[NewCard::new("b", None, "1"), NewCard::new("b", None, "2")],
                None,
                &owner(),
                &policy(200),
                &mut rng,
            )
            .unwrap_err();
        assert!(matches!(err.kind, ErrorKind::AmbiguousDescription(_)));
        assert_eq!(fresh.total_cards(), 0);
    }

    #[test]
    fn test_delete_permission() {
        let mut rng = DeckRng::seeded(1);
        let mut deck = deck_with(&[NewCard::new("a", None, "")], &mut rng);
        let stranger = UserId::from("stranger");
        let err = deck
            .delete_cards(
                &[CardSpecifier::new("a", Amount::Default)],
                Requester { user: &stranger, is_admin: false },
                &mut rng,
            )
            .unwrap_err();
        assert!(matches!(err.kind, ErrorKind::PermissionDenied(_)));

        deck.delete_cards(
            &[CardSpecifier::new("a", Amount::Default)],
            Requester { user: &stranger, is_admin: true },
            &mut rng,
        )
        .unwrap();
        assert_eq!(deck.total_cards(), 0);
        assert!(deck.data().cards.is_empty());
    }

    #[test]
    fn test_delete_amounts() {
        let mut rng = DeckRng::seeded(3);
        let mut deck = deck_with(
            &[NewCard::new("a", Some(4), ""), NewCard::new("b", Some(2), "")],
            &mut rng,
        );
        let me = owner();
        let requester = Requester { user: &me, is_admin: false };

        deck.delete_cards(&[CardSpecifier::new("a", Amount::Exactly(3))], requester, &mut rng)
            .unwrap();
        assert_eq!(deck.data().cards[&CardName::from("a")].reference_count, 1);
        assert_eq!(counts(&deck.data().draw_pile)["a"], 1);

        deck.delete_cards(&[CardSpecifier::new("b", Amount::All)], requester, &mut rng)
            .unwrap();
        assert!(!deck.data().cards.contains_key(&CardName::from("b")));
        deck.data().validate().unwrap();
    }

    #[test]
    fn test_delete_distinguishes_shortfalls() {
        let mut rng = DeckRng::seeded(3);
        let mut deck = deck_with(&[NewCard::new("a", Some(3), "")], &mut rng);
        set_flags(&mut deck, &["+不放回"], &mut rng);
        deck.draw(2, &mut rng).unwrap();
        let me = owner();
        let requester = Requester { user: &me, is_admin: false };

        let err = deck
            .delete_cards(&[CardSpecifier::new("a", Amount::Exactly(5))], requester, &mut rng)
            .unwrap_err();
        assert_eq!(err.to_string(), "“a” 不足 5 张");

        let err = deck
            .delete_cards(&[CardSpecifier::new("a", Amount::Exactly(2))], requester, &mut rng)
            .unwrap_err();
        assert_eq!(err.to_string(), "抽牌堆中的 “a” 不足 2 张（在整个卡组中共有 3 张）");

        let err = deck
            .delete_cards(&[CardSpecifier::new("a", Amount::All)], requester, &mut rng)
            .unwrap_err();
        assert!(matches!(
            err.kind,
            ErrorKind::NotAllInDrawPile { total: 3, in_draw_pile: 1, .. }
        ));

        let err = deck
            .delete_cards(&[CardSpecifier::new("z", Amount::Default)], requester, &mut rng)
            .unwrap_err();
        assert_eq!(err.to_string(), "卡组 “塔罗” 不存在名为 “z” 的卡牌");
    }

    #[test]
    fn test_draw_with_replacement_keeps_pile_size() {
        let mut rng = DeckRng::seeded(5);
        let mut deck = deck_with(&[NewCard::new("a", Some(2), ""), NewCard::new("b", None, "")], &mut rng);
        let cards = deck.draw(10, &mut rng).unwrap();
        assert_eq!(cards.len(), 10);
        assert_eq!(deck.data().draw_pile.len(), 3);
    }

    #[test]
    fn test_draw_empty_pile_errors() {
        let mut rng = DeckRng::seeded(5);
        let mut deck = Deck::new("空".into(), DeckData::new(owner()));
        let err = deck.draw(1, &mut rng).unwrap_err();
        assert_eq!(err.to_string(), "抽卡堆为空，无法抽卡");
    }

    #[test]
    fn test_draw_without_replacement_to_discard_pile() {
        let mut rng = DeckRng::seeded(5);
        let mut deck = deck_with(&[NewCard::new("a", Some(3), "")], &mut rng);
        set_flags(&mut deck, &["+不放回"], &mut rng);
        assert!(deck.has_discard_flag());

        deck.draw(2, &mut rng).unwrap();
        assert_eq!(deck.data().draw_pile.len(), 1);
        assert_eq!(deck.data().discard_pile.len(), 2);
        assert_eq!(deck.total_cards(), 3);

        let err = deck.draw(2, &mut rng).unwrap_err();
        assert_eq!(err.to_string(), "抽卡堆中只有 1 张卡无法满足不放回地抽 2 张卡");
    }

    #[test]
    fn test_draw_without_replacement_deletes_without_discard_flag() {
        let mut rng = DeckRng::seeded(5);
        let mut deck = deck_with(&[NewCard::new("a", Some(2), ""), NewCard::new("b", None, "")], &mut rng);
        set_flags(&mut deck, &["+不放回", "-弃牌堆"], &mut rng);
        deck.draw(3, &mut rng).unwrap();
        assert!(deck.data().draw_pile.is_empty());
        assert!(deck.data().discard_pile.is_empty());
        assert!(deck.data().cards.is_empty());
    }

    #[test]
    fn test_draw_no_immediate_repeat() {
        let mut rng = DeckRng::seeded(9);
        let mut deck = deck_with(&[NewCard::new("a", Some(5), ""), NewCard::new("b", None, "")], &mut rng);
        set_flags(&mut deck, &["+放回不重复"], &mut rng);

        let cards = deck.draw(2, &mut rng).unwrap();
        let names: BTreeSet<&str> = cards.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names.len(), 2);
        assert_eq!(deck.data().draw_pile.len(), 6);

        let err = deck.draw(3, &mut rng).unwrap_err();
        assert_eq!(err.to_string(), "抽卡池中只有 2 种卡无法满足抽 3 种不同的卡");
    }

    #[test]
    fn test_draw_batch() {
        let mut rng = DeckRng::seeded(9);
        let mut deck = deck_with(&[NewCard::new("a", Some(3), "")], &mut rng);
        set_flags(&mut deck, &["+放回不独立"], &mut rng);
        assert_eq!(deck.draw(3, &mut rng).unwrap().len(), 3);
        assert_eq!(deck.data().draw_pile.len(), 3);
        let err = deck.draw(4, &mut rng).unwrap_err();
        assert_eq!(err.to_string(), "抽卡堆中只有 3 张卡无法满足一次性抽 4 张卡");
    }

    #[test]
    fn test_leaving_without_replacement_recycles() {
        let mut rng = DeckRng::seeded(9);
        let mut deck = deck_with(&[NewCard::new("a", Some(3), "")], &mut rng);
        set_flags(&mut deck, &["+不放回"], &mut rng);
        deck.draw(2, &mut rng).unwrap();
        set_flags(&mut deck, &["+放回"], &mut rng);
        assert!(deck.data().discard_pile.is_empty());
        assert_eq!(deck.data().draw_pile.len(), 3);
    }

    #[test]
    fn test_update_flags_reports_scope_default() {
        let mut rng = DeckRng::seeded(9);
        let mut deck = deck_with(&[], &mut rng);
        let change = deck
            .update_flags(&["+领域默认".to_string()], false, &mut rng)
            .unwrap();
        assert!(change.is_scope_default);
        assert!(!deck.data().flags.contains(&DeckFlag::ScopeDefault));

        let change = deck.update_flags(&["+不放回".to_string()], true, &mut rng).unwrap();
        assert!(change.is_scope_default);
    }

    #[test]
    fn test_recycle_specific_cards() {
        let mut rng = DeckRng::seeded(2);
        let mut deck = deck_with(&[NewCard::new("a", Some(2), ""), NewCard::new("b", None, "")], &mut rng);
        set_flags(&mut deck, &["+不放回"], &mut rng);
        deck.draw(3, &mut rng).unwrap();

        let err = deck
            .recycle_cards_from_discard_pile(&[CardSpecifier::new("a", Amount::Exactly(3))], None, &mut rng)
            .unwrap_err();
        assert_eq!(err.to_string(), "弃牌堆中的 “a” 不足 3 张（弃牌堆中共有 2 张）");
        assert_eq!(deck.data().discard_pile.len(), 3);

        deck.recycle_cards_from_discard_pile(
            &[CardSpecifier::new("a", Amount::All)],
            Some(Placement::Top),
            &mut rng,
        )
        .unwrap();
        let pile: Vec<&str> = deck.data().draw_pile.iter().map(CardName::as_str).collect();
        assert_eq!(pile, vec!["a", "a"]);
        assert_eq!(deck.data().discard_pile, vec![CardName::from("b")]);
        deck.data().validate().unwrap();
    }

    #[test]
    fn test_delete_all_in_discard_pile() {
        let mut rng = DeckRng::seeded(2);
        let mut deck = deck_with(&[NewCard::new("a", Some(2), ""), NewCard::new("b", None, "")], &mut rng);
        set_flags(&mut deck, &["+不放回"], &mut rng);
        deck.draw(2, &mut rng).unwrap();
        deck.delete_all_cards_in_discard_pile();
        assert!(deck.data().discard_pile.is_empty());
        assert_eq!(deck.total_cards(), 1);
        deck.data().validate().unwrap();
    }

    #[test]
    fn test_peek_does_not_mutate() {
        let mut rng = DeckRng::seeded(2);
        let deck = deck_with(&[NewCard::new("a", None, ""), NewCard::new("b", None, "")], &mut rng);
        let before = deck.data().clone();
        let names: Vec<String> = deck.peek(5).unwrap().into_iter().map(|c| c.name.to_string()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(deck.data(), &before);
    }

    #[test]
    fn test_transfer_round() {
        let mut rng = DeckRng::seeded(2);
        let mut from = deck_with(&[NewCard::new("a", Some(2), "描述")], &mut rng);
        let mut to = Deck::new("另一副".into(), DeckData::new("someone".into()));

        let copies = from
            .cards_for_transfer(&[CardSpecifier::new("a", Amount::All)])
            .unwrap();
        to.receive_cards(&copies, &policy(200), &mut rng).unwrap();
        to.receive_cards(&copies, &policy(200), &mut rng).unwrap();
        assert_eq!(to.total_cards(), 4);
        assert_eq!(to.data().cards[&CardName::from("a")].provider, owner());

        let me = owner();
        let taken = from
            .take_cards(
                &[CardSpecifier::new("a", Amount::Exactly(1))],
                Requester { user: &me, is_admin: false },
                &mut rng,
            )
            .unwrap();
        assert_eq!(taken[0].1, 1);
        assert_eq!(from.total_cards(), 1);
    }

    #[test]
    fn test_attributes() {
        let mut rng = DeckRng::seeded(2);
        let mut deck = deck_with(&[], &mut rng);
        assert_eq!(deck.attributes_text(), "（默认）（空值）描述 ");

        let mut setters = AttributeSetters::new();
        setters.insert("描述", Some("大阿卡纳".to_string())).unwrap();
        deck.update_attributes(&setters).unwrap();
        assert_eq!(deck.description(), Some("大阿卡纳"));
        assert_eq!(deck.attributes_text(), "描述 大阿卡纳");

        let mut unknown = AttributeSetters::new();
        unknown.insert("颜色", None).unwrap();
        let err = deck.update_attributes(&unknown).unwrap_err();
        assert_eq!(err.to_string(), "未知卡组属性 “颜色”");

        let mut clear = AttributeSetters::new();
        clear.insert("描述", None).unwrap();
        deck.update_attributes(&clear).unwrap();
        assert_eq!(deck.description(), None);
    }

    #[test]
    fn test_texts() {
        let mut rng = DeckRng::seeded(2);
        let deck = deck_with(&[NewCard::new("愚者", Some(2), "流浪者")], &mut rng);
        assert_eq!(deck.list_text(), "卡组 “塔罗” 现有卡牌（共 1 种、2 张）\n2#愚者：流浪者");
        assert_eq!(
            deck.card_text(&["愚者".into(), "无".into()]),
            "添加者：owner\n愚者「流浪者」\n\n---\n不存在名为 “无” 的卡牌。"
        );
        let summary = deck.summary_text(false);
        assert!(summary.starts_with("= 卡组 “塔罗” =\n主拥有者：owner\n卡牌种类数：1\n卡牌总数：2\n\n== 旗帜 ==\n\n+放回"));
        assert!(deck.discard_pile_text().starts_with("卡组 “塔罗” 弃牌堆现有卡牌（共 0 种、0 张）"));
    }

    #[test]
    fn test_validate_catches_inconsistency() {
        let mut data = DeckData::new(owner());
        data.draw_pile.push("幽灵".into());
        assert!(data.validate().is_err());

        let mut data = DeckData::new(owner());
        data.cards.insert(
            "a".into(),
            CardEntry {
                reference_count: 2,
                description: String::new(),
                provider: owner(),
            },
        );
        data.draw_pile.push("a".into());
        assert!(data.validate().is_err());
    }

    #[test]
    fn test_validate_checks_put_back_flags() {
        let cases: [(&[DeckFlag], &str); 4] = [
            (&[], "实际启用了 0 个"),
            (&[DeckFlag::WithReplacement, DeckFlag::WithoutReplacement], "实际启用了 2 个"),
            (&[DeckFlag::WithReplacement, DeckFlag::Discard], "只有启用旗帜 “不放回” 时"),
            (&[DeckFlag::WithReplacementBatch, DeckFlag::Discard], "只有启用旗帜 “不放回” 时"),
        ];
        for (flags, expected) in cases {
            let mut data = DeckData::new(owner());
            data.flags = flags.to_vec();
            let err = data.validate().unwrap_err();
            assert!(err.to_string().contains(expected), "{flags:?}: {err}");
        }

        let mut data = DeckData::new(owner());
        data.cards.insert(
            "a".into(),
            CardEntry {
                reference_count: 1,
                description: String::new(),
                provider: owner(),
            },
        );
        data.discard_pile.push("a".into());
        let err = data.validate().unwrap_err();
        assert!(err.to_string().contains("旗帜 “放回” 下弃牌堆应为空"), "{err}");

        data.flags = vec![DeckFlag::WithoutReplacement];
        data.validate().unwrap();
        data.flags = vec![DeckFlag::WithoutReplacement, DeckFlag::Discard];
        data.validate().unwrap();
    }

    #[test]
    fn test_serde_field_names() {
        let mut rng = DeckRng::seeded(2);
        let deck = deck_with(&[NewCard::new("a", None, "")], &mut rng);
        let json = serde_json::to_value(deck.data()).unwrap();
        assert_eq!(json["mainOwner"], "owner");
        assert_eq!(json["cards"]["a"]["referenceCount"], 1);
        assert_eq!(json["cards"]["a"]["providerID"], "owner");
        assert_eq!(json["drawPile"][0], "a");
        assert_eq!(json["flags"][0], "放回");
    }
}
