//! Command execution.
//!
//! A [`CommandExecutor`] runs one parsed command against one scope. It
//! loads the decks the command names from the repository, mutates private
//! copies, and describes what to store in the returned [`Outcome`]. Nothing
//! is written unless the caller applies the [`Persist`] of a successful
//! outcome.

mod between_decks;
mod deck;
mod deck_existence;
mod discard_pile;
mod plugin;

use deckhand_engine::{Deck, DeckData, DeckRng};
use deckhand_foundation::{CardName, DeckName, Error, ErrorKind, Result, ScopeId, UserId};
use deckhand_parser::usage::find_command_heads_by_name;
use deckhand_parser::{Command, ReplyDestination};
use deckhand_storage::{Repo, Scope, ScopeData};
use tracing::debug;

use crate::config::RuntimeConfig;

pub use plugin::overview_text;

/// What a successful command produced.
#[derive(Clone, Debug)]
pub struct Outcome {
    /// Text to send back.
    pub reply: String,
    /// Where to send it.
    pub destination: ReplyDestination,
    /// What to store.
    pub persist: Persist,
}

impl Outcome {
    fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            destination: ReplyDestination::CurrentPlace,
            persist: Persist::default(),
        }
    }

    fn to(mut self, destination: ReplyDestination) -> Self {
        self.destination = destination;
        self
    }

    fn saving_scope(mut self, scope: &Scope) -> Self {
        self.persist.scope = Some(scope.data().clone());
        self
    }

    fn saving_deck(mut self, deck: Deck) -> Self {
        self.persist.decks.push((deck.name().clone(), deck.into_data()));
        self
    }

    fn deleting_deck(mut self, deck: DeckName) -> Self {
        self.persist.deleted_decks.push(deck);
        self
    }
}

/// Records to write after a command succeeded.
#[derive(Clone, Debug, Default)]
pub struct Persist {
    /// New scope data, if the scope changed.
    pub scope: Option<ScopeData>,
    /// Decks to save.
    pub decks: Vec<(DeckName, DeckData)>,
    /// Decks to delete.
    pub deleted_decks: Vec<DeckName>,
}

impl Persist {
    /// Whether there is nothing to write.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scope.is_none() && self.decks.is_empty() && self.deleted_decks.is_empty()
    }

    /// Writes decks, then deletions, then the scope.
    ///
    /// # Errors
    ///
    /// Propagates repository errors; earlier writes are not rolled back.
    pub fn apply(self, repo: &mut dyn Repo, scope: &ScopeId) -> Result<()> {
        for (name, data) in &self.decks {
            repo.save_deck_data(scope, name, data)?;
        }
        for name in &self.deleted_decks {
            repo.delete_deck(scope, name)?;
        }
        if let Some(data) = &self.scope {
            repo.save_scope_data(scope, data)?;
        }
        debug!(
            %scope,
            saved = self.decks.len(),
            deleted = self.deleted_decks.len(),
            scope_saved = self.scope.is_some(),
            "persisted command results"
        );
        Ok(())
    }
}

/// State shared by the per-family executors.
struct Context<'a> {
    repo: &'a dyn Repo,
    config: &'a RuntimeConfig,
    scope: Scope,
    sender: UserId,
    rng: &'a mut DeckRng,
}

impl Context<'_> {
    fn load_deck(&self, name: &DeckName) -> Result<Deck> {
        match self.repo.load_deck_data(self.scope.id(), name)? {
            Some(data) => Ok(Deck::new(name.clone(), data)),
            None => Err(self.deck_not_found(name)),
        }
    }

    /// The error for a missing deck, with hints on creating it and on
    /// commands the name might have meant.
    fn deck_not_found(&self, name: &DeckName) -> Error {
        let root = &self.config.root_prefix;
        let mut err = Error::new(ErrorKind::DeckNotFound {
            scope: self.scope.id().clone(),
            deck: name.clone(),
        })
        .with_hint(format!("（发送 “{root}：{name} 创建” 创建该卡组。）"))
        .with_hint(format!("（发送 “{root}帮助 卡组存在::创建” 查询前述命令的用法。）"));

        let heads = find_command_heads_by_name(name.as_str(), root, &[]);
        if !heads.is_empty() {
            let quoted: String = heads.iter().map(|h| format!("“{h}”")).collect();
            err = err.with_hint(format!("（是否其实想使用：{quoted}？）"));
        }
        err
    }

    fn sender_is_admin(&self) -> Result<bool> {
        self.scope.is_admin(&self.sender)
    }

    /// Main owner or admin.
    fn ensure_owner_or_admin(&self, deck: &Deck, action: &str) -> Result<()> {
        if *deck.main_owner() == self.sender || self.sender_is_admin()? {
            return Ok(());
        }
        Err(Error::permission_denied(format!(
            "只有本卡组的主拥有者、本领域的管理员或插件的主要管理员可以{action}本卡组"
        )))
    }

    /// Draw and peek amounts may not exceed what a deck can hold.
    fn ensure_amount_within_capacity(&self, amount: u64) -> Result<()> {
        let max = self.scope.max_cards_per_deck()?;
        if amount > max {
            return Err(Error::invalid_input(format!(
                "一次最多只能处理 {max} 张卡（领域 “{}” 的卡组卡牌上限）",
                self.scope.id()
            )));
        }
        Ok(())
    }
}

/// Runs one command. Consuming the executor makes a second run impossible.
pub struct CommandExecutor<'a> {
    repo: &'a dyn Repo,
    config: &'a RuntimeConfig,
    scope: Scope,
    sender: UserId,
}

impl<'a> CommandExecutor<'a> {
    /// Prepares to run a command for `sender` within `scope`.
    #[must_use]
    pub fn new(repo: &'a dyn Repo, config: &'a RuntimeConfig, scope: Scope, sender: UserId) -> Self {
        Self {
            repo,
            config,
            scope,
            sender,
        }
    }

    /// Executes the command.
    ///
    /// # Errors
    ///
    /// Returns the user-facing error of whichever step failed; no state is
    /// persisted in that case.
    pub fn execute(self, command: Command, rng: &mut DeckRng) -> Result<Outcome> {
        debug!(
            scope = %self.scope.id(),
            sender = %self.sender,
            family = %command.family(),
            command = command.name(),
            "executing command"
        );

        let mut ctx = Context {
            repo: self.repo,
            config: self.config,
            scope: self.scope,
            sender: self.sender,
            rng,
        };

        match command {
            Command::Plugin(command) => plugin::execute(&mut ctx, command),
            Command::DeckExistence { deck, command } => {
                deck_existence::execute(&mut ctx, deck, command)
            }
            Command::Deck { deck, command } => deck::execute(&mut ctx, &deck, command),
            Command::DeckDiscardPile { deck, command } => {
                discard_pile::execute(&mut ctx, &deck, command)
            }
            Command::DeckHand { .. } => Err(Error::unsupported("手牌功能尚未实现")),
            Command::BetweenDecks {
                subject,
                object,
                command,
            } => between_decks::execute(&mut ctx, &subject, &object, command),
        }
    }
}

/// `“2#甲”、“1#乙” 总计 2 种、3 张卡牌`, listing at most five names.
fn summarize_cards(cards: impl IntoIterator<Item = (CardName, u64)>) -> String {
    let mut kinds: Vec<(CardName, u64)> = Vec::new();
    let mut total = 0;
    for (name, amount) in cards {
        total += amount;
        match kinds.iter_mut().find(|(seen, _)| *seen == name) {
            Some((_, n)) => *n += amount,
            None => kinds.push((name, amount)),
        }
    }

    let shown: Vec<String> = kinds
        .iter()
        .take(5)
        .map(|(name, n)| format!("“{n}#{name}”"))
        .collect();
    let more = if kinds.len() > 5 { "等" } else { "" };
    format!(
        "{} {more}总计 {} 种、{total} 张卡牌",
        shown.join("、"),
        kinds.len()
    )
}
