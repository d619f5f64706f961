//! Error types for deck operations.
//!
//! Uses `thiserror` the same way for every layer. The `Display` text of an
//! [`ErrorKind`] is the message shown to chat users, so it is Chinese.

use std::fmt;

use thiserror::Error;

use crate::ids::{CardName, DeckName, ScopeId};

/// The main error type for deck and scope operations.
#[derive(Debug, Error)]
#[error("{kind}{}", render_context(.context.as_ref()))]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional trailing hints for the user.
    pub context: Option<ErrorContext>,
}

fn render_context(context: Option<&ErrorContext>) -> String {
    match context {
        Some(ctx) if !ctx.hints.is_empty() => format!("\n\n{ctx}"),
        _ => String::new(),
    }
}

fn draw_manner(batch: &bool) -> &'static str {
    if *batch { "一次性" } else { "不放回地" }
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Appends one hint line, creating the context if needed.
    #[must_use]
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.context
            .get_or_insert_with(ErrorContext::new)
            .hints
            .push(hint.into());
        self
    }

    /// Creates a permission error with the given explanation.
    #[must_use]
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::PermissionDenied(message.into()))
    }

    /// Creates an invalid input error.
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidInput(message.into()))
    }

    /// Creates an error for a feature that is recognized but not available.
    #[must_use]
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unsupported(message.into()))
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal(message.into()))
    }

    /// Whether the user caused this error, as opposed to the environment.
    #[must_use]
    pub fn is_user_error(&self) -> bool {
        !matches!(
            self.kind,
            ErrorKind::Storage(_)
                | ErrorKind::Serialization(_)
                | ErrorKind::Io(_)
                | ErrorKind::Internal(_)
        )
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::new(ErrorKind::Io(err))
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// Adding cards would exceed the scope's per-deck limit.
    #[error(
        "若将指定的新卡（{adding} 张）添加至卡组，卡组 “{deck}” 中卡牌的数目将从 {current} 上升至 {total}，超过领域 “{scope}” 所允许的上限 {limit} 张"
    )]
    CapacityExceeded {
        /// Target deck.
        deck: DeckName,
        /// Scope owning the deck.
        scope: ScopeId,
        /// Number of instances being added.
        adding: u64,
        /// Number of instances already in the deck.
        current: u64,
        /// Number after the addition.
        total: u64,
        /// The configured limit.
        limit: u64,
    },

    /// A described card was added under a name that already exists.
    #[error(
        "名为 “{0}” 的卡牌已经存在于卡组中。若要增加其数量，请以空描述的形式添加该卡牌；若要修改其描述，请先从卡组中删除掉所有这个名字的卡牌"
    )]
    AmbiguousDescription(CardName),

    /// The requester may not perform the operation.
    #[error("{0}")]
    PermissionDenied(String),

    /// The deck has no card with the given name.
    #[error("卡组 “{deck}” 不存在名为 “{card}” 的卡牌")]
    CardNotFound {
        /// Deck searched.
        deck: DeckName,
        /// Card name requested.
        card: CardName,
    },

    /// Deleting every instance requires all of them to be in the draw pile.
    #[error(
        "若要删除全部的 “{card}”，请先将全部的该牌回收至抽牌堆（该牌共有 {total} 张，其中 {in_draw_pile} 位于抽牌堆。）"
    )]
    NotAllInDrawPile {
        /// Card name.
        card: CardName,
        /// Instances tracked anywhere.
        total: u64,
        /// Instances in the draw pile.
        in_draw_pile: u64,
    },

    /// Fewer instances exist anywhere than were requested.
    #[error("“{card}” 不足 {requested} 张")]
    NotEnoughCards {
        /// Card name.
        card: CardName,
        /// Requested amount.
        requested: u64,
    },

    /// Enough instances exist but not enough of them are in the draw pile.
    #[error("抽牌堆中的 “{card}” 不足 {requested} 张（在整个卡组中共有 {total} 张）")]
    NotEnoughInDrawPile {
        /// Card name.
        card: CardName,
        /// Requested amount.
        requested: u64,
        /// Instances tracked anywhere.
        total: u64,
    },

    /// Not enough instances are in the discard pile to recycle.
    #[error("弃牌堆中的 “{card}” 不足 {requested} 张（弃牌堆中共有 {in_discard_pile} 张）")]
    NotEnoughInDiscardPile {
        /// Card name.
        card: CardName,
        /// Requested amount.
        requested: u64,
        /// Instances in the discard pile.
        in_discard_pile: u64,
    },

    /// Nothing to draw.
    #[error("抽卡堆为空，无法抽卡")]
    EmptyDrawPile,

    /// The draw pile is smaller than a draw that does not replace per card.
    #[error("抽卡堆中只有 {available} 张卡无法满足{}抽 {requested} 张卡", draw_manner(.batch))]
    DrawPileTooSmall {
        /// Draw pile size.
        available: usize,
        /// Requested amount.
        requested: u64,
        /// Whether the draw returns the batch afterwards.
        batch: bool,
    },

    /// Fewer distinct names are in the draw pile than were requested.
    #[error("抽卡池中只有 {available} 种卡无法满足抽 {requested} 种不同的卡")]
    NotEnoughDistinctCards {
        /// Distinct names in the draw pile.
        available: usize,
        /// Requested amount.
        requested: u64,
    },

    /// Flag setters do not describe a valid flag set.
    #[error("{0}")]
    InvalidFlags(String),

    /// The attribute name is not known.
    #[error("未知{owner}属性 “{name}”")]
    UnknownAttribute {
        /// "领域" or "卡组".
        owner: &'static str,
        /// The attribute name.
        name: String,
    },

    /// A stored or supplied attribute value could not be used.
    #[error("{0}")]
    InvalidAttribute(String),

    /// A deck with the name already exists.
    #[error("名为 “{0}” 的卡组已经存在")]
    DeckExists(DeckName),

    /// The scope has no deck with the name.
    #[error("领域 “{scope}” 当中不存在卡组 “{deck}”")]
    DeckNotFound {
        /// Scope searched.
        scope: ScopeId,
        /// Deck name requested.
        deck: DeckName,
    },

    /// The deck name cannot be used.
    #[error("{0}")]
    InvalidDeckName(String),

    /// The command is understood but not available.
    #[error("{0}")]
    Unsupported(String),

    /// The input is well formed but unusable.
    #[error("{0}")]
    InvalidInput(String),

    /// The persistence backend failed.
    #[error("存储失败：{0}")]
    Storage(String),

    /// Encoding or decoding stored data failed.
    #[error("序列化失败：{0}")]
    Serialization(String),

    /// An I/O operation failed.
    #[error("读写失败：{0}")]
    Io(#[source] std::io::Error),

    /// Internal error (should not happen).
    #[error("内部错误：{0}")]
    Internal(String),
}

/// Trailing hint lines shown after an error message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorContext {
    /// Hints in display order.
    pub hints: Vec<String>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a hint line.
    #[must_use]
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hints.push(hint.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, hint) in self.hints.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            f.write_str(hint)?;
        }
        Ok(())
    }
}
