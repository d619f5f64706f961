//! Scopes: the unit that owns decks.
//!
//! A scope spans one or more chat groups. It stores three attributes
//! (`管理员`, `默认卡组`, `卡组卡牌上限`) and the sorted list of its decks.
//! Main admins come from configuration and outrank the stored admin list.

use std::collections::BTreeMap;

use deckhand_engine::ScopePolicy;
use deckhand_foundation::{DeckName, Error, ErrorKind, GroupId, Result, ScopeId, UserId};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::repo::Repo;

/// Attribute names a scope accepts, in display order.
pub const SCOPE_ATTRIBUTE_NAMES: [&str; 3] = [ADMINS, DEFAULT_DECK, MAX_CARDS];

const ADMINS: &str = "管理员";
const DEFAULT_DECK: &str = "默认卡组";
const MAX_CARDS: &str = "卡组卡牌上限";

fn attribute_default(name: &str) -> &'static str {
    match name {
        ADMINS => "[]",
        MAX_CARDS => "200",
        _ => "",
    }
}

/// Everything persisted about one scope.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeData {
    /// Attribute values; `None` means "use the default".
    #[serde(default)]
    pub attributes: BTreeMap<String, Option<String>>,
    /// Deck names, kept sorted.
    #[serde(default)]
    pub decks: Vec<DeckName>,
}

/// A loaded scope.
#[derive(Clone, Debug)]
pub struct Scope {
    id: ScopeId,
    groups: Vec<GroupId>,
    data: ScopeData,
    main_admins: Vec<UserId>,
}

impl Scope {
    /// Wraps loaded data.
    #[must_use]
    pub fn new(id: ScopeId, groups: Vec<GroupId>, data: ScopeData, main_admins: Vec<UserId>) -> Self {
        Self {
            id,
            groups,
            data,
            main_admins,
        }
    }

    /// The scope's id.
    #[must_use]
    pub fn id(&self) -> &ScopeId {
        &self.id
    }

    /// Groups that share this scope.
    #[must_use]
    pub fn groups(&self) -> &[GroupId] {
        &self.groups
    }

    /// The stored data.
    #[must_use]
    pub fn data(&self) -> &ScopeData {
        &self.data
    }

    fn attribute_text(&self, name: &str) -> &str {
        self.data
            .attributes
            .get(name)
            .and_then(Option::as_deref)
            .unwrap_or_else(|| attribute_default(name))
    }

    // -------------------------------------------------------------------------
    // Admins
    // -------------------------------------------------------------------------

    /// Whether `user` is a main admin from configuration.
    #[must_use]
    pub fn is_main_admin(&self, user: &UserId) -> bool {
        self.main_admins.contains(user)
    }

    /// The admins listed in the `管理员` attribute.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidAttribute`] when the stored value is not a
    /// JSON array of ids.
    pub fn admins(&self) -> Result<Vec<UserId>> {
        parse_admins(self.attribute_text(ADMINS)).map_err(|e| {
            Error::new(ErrorKind::InvalidAttribute(format!(
                "解析领域属性中指定的管理员失败：{e}\n（请联系主管理员修正领域属性 “管理员” 的值，对主管理员的判定先于对属性值的解析。）"
            )))
        })
    }

    /// Whether `user` may administer the scope.
    ///
    /// Main admins are recognized before the stored list is parsed, so they
    /// can always repair a broken list.
    ///
    /// # Errors
    ///
    /// As [`Scope::admins`], for users who are not main admins.
    pub fn is_admin(&self, user: &UserId) -> Result<bool> {
        if self.is_main_admin(user) {
            return Ok(true);
        }
        Ok(self.admins()?.contains(user))
    }

    // -------------------------------------------------------------------------
    // Attributes
    // -------------------------------------------------------------------------

    /// Sets or clears an attribute on behalf of `sender`.
    ///
    /// Values are trimmed; an empty value clears the attribute back to its
    /// default.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::PermissionDenied`] for non-admins (and for
    /// non-main-admins changing `管理员`), [`ErrorKind::UnknownAttribute`], or
    /// [`ErrorKind::InvalidAttribute`] for values that cannot be used.
    pub fn set_attribute(&mut self, name: &str, value: Option<&str>, sender: &UserId) -> Result<()> {
        let value = value.map(str::trim).filter(|v| !v.is_empty());

        if !self.is_admin(sender)? {
            return Err(Error::permission_denied("只有管理员可以改变领域的属性"));
        }
        if !SCOPE_ATTRIBUTE_NAMES.contains(&name) {
            return Err(ErrorKind::UnknownAttribute {
                owner: "领域",
                name: name.to_string(),
            }
            .into());
        }
        if name == ADMINS && !self.is_main_admin(sender) {
            return Err(Error::permission_denied(
                "领域属性 “管理员” 的值只能由主管理员修改",
            ));
        }

        if let Some(value) = value {
            match name {
                ADMINS => {
                    parse_admins(value).map_err(|e| {
                        Error::new(ErrorKind::InvalidAttribute(format!(
                            "领域属性 “管理员” 的值需为由用户 ID 组成的 JSON 数组：{e}"
                        )))
                    })?;
                }
                MAX_CARDS => {
                    value.parse::<u64>().map_err(|_| {
                        Error::new(ErrorKind::InvalidAttribute(
                            "领域属性 “卡组卡牌上限” 的值需为非负整数".to_string(),
                        ))
                    })?;
                }
                _ => {}
            }
        }

        debug!(scope = %self.id, attribute = name, ?value, "set scope attribute");
        self.data
            .attributes
            .insert(name.to_string(), value.map(str::to_string));
        Ok(())
    }

    /// Makes `deck` the default deck, or clears the default.
    ///
    /// # Errors
    ///
    /// As [`Scope::set_attribute`].
    pub fn set_default_deck(&mut self, deck: Option<&DeckName>, sender: &UserId) -> Result<()> {
        self.set_attribute(DEFAULT_DECK, deck.map(DeckName::as_str), sender)
    }

    /// The deck that `：<command>` addresses.
    #[must_use]
    pub fn default_deck(&self) -> Option<DeckName> {
        let name = self.attribute_text(DEFAULT_DECK);
        (!name.is_empty()).then(|| DeckName::from(name))
    }

    /// Whether `deck` is the default deck.
    #[must_use]
    pub fn is_default_deck(&self, deck: &DeckName) -> bool {
        self.default_deck().as_ref() == Some(deck)
    }

    /// The per-deck card limit.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidAttribute`] for a stored value that is not
    /// a non-negative integer.
    pub fn max_cards_per_deck(&self) -> Result<u64> {
        self.attribute_text(MAX_CARDS).parse().map_err(|_| {
            Error::new(ErrorKind::InvalidAttribute(
                "领域属性 “卡组卡牌上限” 的值需为非负整数".to_string(),
            ))
        })
    }

    /// Identity and limits for deck operations.
    ///
    /// # Errors
    ///
    /// As [`Scope::max_cards_per_deck`].
    pub fn policy(&self) -> Result<ScopePolicy> {
        Ok(ScopePolicy {
            scope: self.id.clone(),
            max_cards_per_deck: self.max_cards_per_deck()?,
        })
    }

    /// One line per attribute; unset ones are marked `（默认）`.
    #[must_use]
    pub fn attributes_text(&self) -> String {
        SCOPE_ATTRIBUTE_NAMES
            .iter()
            .map(|name| {
                let is_set = self
                    .data
                    .attributes
                    .get(*name)
                    .is_some_and(|v| v.as_deref().is_some_and(|v| !v.is_empty()));
                let marker = if is_set { "" } else { "（默认）" };
                format!("{marker}{name} {}", self.attribute_text(name))
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    // -------------------------------------------------------------------------
    // Decks
    // -------------------------------------------------------------------------

    /// Deck names, sorted.
    #[must_use]
    pub fn decks(&self) -> &[DeckName] {
        &self.data.decks
    }

    /// Whether the scope has a deck with the name.
    #[must_use]
    pub fn has_deck(&self, deck: &DeckName) -> bool {
        self.data.decks.binary_search(deck).is_ok()
    }

    /// Registers a new deck name.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidDeckName`] for names containing whitespace
    /// and [`ErrorKind::DeckExists`] for duplicates.
    pub fn declare_deck(&mut self, deck: &DeckName) -> Result<()> {
        if deck.as_str().is_empty() || deck.as_str().contains(char::is_whitespace) {
            return Err(ErrorKind::InvalidDeckName("卡组名中不能含有空白".to_string()).into());
        }
        match self.data.decks.binary_search(deck) {
            Ok(_) => Err(ErrorKind::DeckExists(deck.clone()).into()),
            Err(idx) => {
                self.data.decks.insert(idx, deck.clone());
                Ok(())
            }
        }
    }

    /// Unregisters a deck name. A default deck setting naming it is cleared.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::DeckNotFound`] when the name is not registered.
    pub fn revoke_deck(&mut self, deck: &DeckName) -> Result<()> {
        match self.data.decks.binary_search(deck) {
            Ok(idx) => {
                self.data.decks.remove(idx);
                if self.is_default_deck(deck) {
                    self.data.attributes.insert(DEFAULT_DECK.to_string(), None);
                }
                Ok(())
            }
            Err(_) => Err(ErrorKind::DeckNotFound {
                scope: self.id.clone(),
                deck: deck.clone(),
            }
            .into()),
        }
    }

    /// Moves a registered name to `to`, keeping it the default deck if it was.
    ///
    /// # Errors
    ///
    /// As [`Scope::declare_deck`] and [`Scope::revoke_deck`]; nothing changes
    /// on error.
    pub fn rename_deck(&mut self, from: &DeckName, to: &DeckName) -> Result<()> {
        if !self.has_deck(from) {
            return Err(ErrorKind::DeckNotFound {
                scope: self.id.clone(),
                deck: from.clone(),
            }
            .into());
        }
        let was_default = self.is_default_deck(from);
        self.declare_deck(to)?;
        self.revoke_deck(from)?;
        if was_default {
            self.data
                .attributes
                .insert(DEFAULT_DECK.to_string(), Some(to.to_string()));
        }
        debug!(scope = %self.id, %from, %to, was_default, "renamed deck");
        Ok(())
    }
}

/// Accepts ids written as JSON strings or numbers.
fn parse_admins(text: &str) -> std::result::Result<Vec<UserId>, String> {
    let values: Vec<serde_json::Value> = serde_json::from_str(text).map_err(|e| e.to_string())?;
    values
        .into_iter()
        .map(|value| match value {
            serde_json::Value::String(s) => Ok(UserId::from(s)),
            serde_json::Value::Number(n) => Ok(UserId::from(n.to_string())),
            other => Err(format!("“{other}” 不是用户 ID")),
        })
        .collect()
}

// =============================================================================
// Scopes
// =============================================================================

/// Which groups belong to which scope.
#[derive(Clone, Debug, Default)]
pub struct Scopes {
    groups_by_scope: BTreeMap<ScopeId, Vec<GroupId>>,
    main_admins: Vec<UserId>,
}

impl Scopes {
    /// Creates the mapping.
    #[must_use]
    pub fn new(groups_by_scope: BTreeMap<ScopeId, Vec<GroupId>>, main_admins: Vec<UserId>) -> Self {
        Self {
            groups_by_scope,
            main_admins,
        }
    }

    /// Loads the scope that contains `group`, or `None` if no scope does.
    ///
    /// A scope with no stored data starts empty.
    ///
    /// # Errors
    ///
    /// Propagates repository errors.
    pub fn scope_for_group(&self, repo: &dyn Repo, group: &GroupId) -> Result<Option<Scope>> {
        let Some((id, groups)) = self
            .groups_by_scope
            .iter()
            .find(|(_, groups)| groups.contains(group))
        else {
            return Ok(None);
        };
        let data = repo.load_scope_data(id)?.unwrap_or_default();
        Ok(Some(Scope::new(
            id.clone(),
            groups.clone(),
            data,
            self.main_admins.clone(),
        )))
    }
}
