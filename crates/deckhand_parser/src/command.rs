//! Typed commands produced by the parser.
//!
//! A [`Command`] names exactly one family and carries only the fields that
//! family needs. Each payload enum knows its surface name, which is what
//! error messages and usage hints refer to.

use std::fmt;

use deckhand_foundation::{
    AttributeSetters, CardName, CardSpecifier, DeckName, FlagSetters, NewCard, Placement, UserId,
};

/// The six command families.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CommandFamily {
    /// Commands about the plugin as a whole (`卡组列表`).
    Plugin,
    /// Creating, destroying, and copying decks.
    DeckExistence,
    /// Commands on one deck's draw pile and settings.
    Deck,
    /// Commands on one deck's discard pile.
    DeckDiscardPile,
    /// Commands on a participant's hand.
    DeckHand,
    /// Commands moving cards from one deck to another.
    BetweenDecks,
}

impl CommandFamily {
    /// All families, in the order usage listings present them.
    pub const ALL: [Self; 6] = [
        Self::Plugin,
        Self::DeckExistence,
        Self::Deck,
        Self::DeckDiscardPile,
        Self::DeckHand,
        Self::BetweenDecks,
    ];

    /// The localized family name used in messages and help filters.
    #[must_use]
    pub const fn l10n(self) -> &'static str {
        match self {
            Self::Plugin => "插件",
            Self::DeckExistence => "卡组存在",
            Self::Deck => "卡组",
            Self::DeckDiscardPile => "卡组弃牌堆",
            Self::DeckHand => "卡组手牌",
            Self::BetweenDecks => "卡组之间",
        }
    }

    /// Looks a family up by its localized name.
    #[must_use]
    pub fn from_l10n(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.l10n() == name)
    }
}

impl fmt::Display for CommandFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.l10n())
    }
}

/// Where the result of a draw or peek is sent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum ReplyDestination {
    /// The group the command came from.
    #[default]
    CurrentPlace,
    /// A private message to the sender.
    SenderPrivate,
}

/// Whether an import creates a new deck or replaces an existing one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ImportMode {
    /// The deck must not exist yet.
    Create,
    /// The deck must already exist.
    Overwrite,
}

/// A fully parsed command.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Plugin-level command.
    Plugin(PluginCommand),
    /// Deck existence command.
    DeckExistence {
        /// Target deck.
        deck: DeckName,
        /// The command.
        command: DeckExistenceCommand,
    },
    /// Deck command.
    Deck {
        /// Target deck.
        deck: DeckName,
        /// The command.
        command: DeckCommand,
    },
    /// Discard pile command.
    DeckDiscardPile {
        /// Target deck.
        deck: DeckName,
        /// The command.
        command: DeckDiscardPileCommand,
    },
    /// Hand command.
    DeckHand {
        /// Target deck.
        deck: DeckName,
        /// Owner of the hand; `None` means the sender.
        owner: Option<UserId>,
        /// The command.
        command: DeckHandCommand,
    },
    /// Command between two decks.
    BetweenDecks {
        /// Deck the cards come from.
        subject: DeckName,
        /// Deck the cards go to.
        object: DeckName,
        /// The command.
        command: BetweenDecksCommand,
    },
}

impl Command {
    /// The command's family.
    #[must_use]
    pub const fn family(&self) -> CommandFamily {
        match self {
            Self::Plugin(_) => CommandFamily::Plugin,
            Self::DeckExistence { .. } => CommandFamily::DeckExistence,
            Self::Deck { .. } => CommandFamily::Deck,
            Self::DeckDiscardPile { .. } => CommandFamily::DeckDiscardPile,
            Self::DeckHand { .. } => CommandFamily::DeckHand,
            Self::BetweenDecks { .. } => CommandFamily::BetweenDecks,
        }
    }

    /// The command's surface name within its family.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Plugin(c) => c.name(),
            Self::DeckExistence { command, .. } => command.name(),
            Self::Deck { command, .. } => command.name(),
            Self::DeckDiscardPile { command, .. } => command.name(),
            Self::DeckHand { command, .. } => command.name(),
            Self::BetweenDecks { command, .. } => command.name(),
        }
    }

    /// The deck the command addresses first, if any.
    #[must_use]
    pub const fn deck(&self) -> Option<&DeckName> {
        match self {
            Self::Plugin(_) => None,
            Self::DeckExistence { deck, .. }
            | Self::Deck { deck, .. }
            | Self::DeckDiscardPile { deck, .. }
            | Self::DeckHand { deck, .. } => Some(deck),
            Self::BetweenDecks { subject, .. } => Some(subject),
        }
    }
}

/// Plugin-level commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PluginCommand {
    /// `概览`
    Overview,
    /// `帮助 <filter>*`
    Help {
        /// Entries to show; `None` shows everything.
        filters: Option<Vec<String>>,
    },
    /// `列表`
    List,
    /// `领域设置` followed by attribute lines.
    ScopeSettings {
        /// Attributes to update.
        attribute_setters: AttributeSetters,
    },
}

impl PluginCommand {
    /// Surface name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Overview => "概览",
            Self::Help { .. } => "帮助",
            Self::List => "列表",
            Self::ScopeSettings { .. } => "领域设置",
        }
    }
}

/// Commands that create, remove, or copy a deck.
#[derive(Clone, Debug, PartialEq)]
pub enum DeckExistenceCommand {
    /// `创建`
    Create {
        /// Flags from the first line.
        flag_setters: FlagSetters,
        /// Attributes from the following lines.
        attribute_setters: AttributeSetters,
        /// Cards after the `---` separator.
        cards: Vec<NewCard>,
        /// Whether `---顺序` asked to keep the entry order.
        keeps_order: bool,
    },
    /// `销毁`
    Destroy,
    /// `导出`
    Export,
    /// `导入创建` / `导入覆盖`
    Import {
        /// Create or overwrite.
        mode: ImportMode,
        /// The exported deck data.
        data: serde_json::Value,
    },
    /// `克隆为 <deck>`
    CloneTo {
        /// Name of the copy.
        destination: DeckName,
    },
    /// `重命名为 <deck>`
    RenameTo {
        /// New name.
        destination: DeckName,
    },
}

impl DeckExistenceCommand {
    /// Surface name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Create { .. } => "创建",
            Self::Destroy => "销毁",
            Self::Export => "导出",
            Self::Import { .. } => "导入",
            Self::CloneTo { .. } => "克隆为",
            Self::RenameTo { .. } => "重命名为",
        }
    }
}

/// Commands on a deck's draw pile and settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeckCommand {
    /// `概览`
    Overview,
    /// `列表`
    List,
    /// `查看 <card>+`
    View {
        /// Cards to show.
        cards: Vec<CardName>,
    },
    /// `设置`
    Settings {
        /// Flags from the first line.
        flag_setters: FlagSetters,
        /// Attributes from the following lines.
        attribute_setters: AttributeSetters,
    },
    /// `添加` / `添加于顶部` / `添加于底部`
    Add {
        /// Literal placement, or `None` for random positions.
        at: Option<Placement>,
        /// Cards to create.
        cards: Vec<NewCard>,
    },
    /// `删除`
    Delete {
        /// Cards to remove.
        cards: Vec<CardSpecifier>,
    },
    /// `洗牌`
    Shuffle,
    /// `回收全部并洗牌`
    RecycleAllAndShuffle,
    /// `抽卡` / `抽牌` (optionally `至私聊`)
    Draw {
        /// Where to send the result.
        to: ReplyDestination,
        /// Amount; `None` means one.
        amount: Option<u64>,
    },
    /// `窥视` (optionally `至私聊`)
    Peek {
        /// Where to send the result.
        to: ReplyDestination,
        /// Amount; `None` means one.
        amount: Option<u64>,
    },
}

impl DeckCommand {
    /// Surface name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Overview => "概览",
            Self::List => "列表",
            Self::View { .. } => "查看",
            Self::Settings { .. } => "设置",
            Self::Add { .. } => "添加",
            Self::Delete { .. } => "删除",
            Self::Shuffle => "洗牌",
            Self::RecycleAllAndShuffle => "回收全部并洗牌",
            Self::Draw { .. } => "抽卡",
            Self::Peek { .. } => "窥视",
        }
    }
}

/// Commands on a deck's discard pile.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeckDiscardPileCommand {
    /// `列表`
    List,
    /// `回收` / `回收于顶部` / `回收于底部`
    Recycle {
        /// Literal placement, or `None` for random positions.
        at: Option<Placement>,
        /// Cards to move back to the draw pile.
        cards: Vec<CardSpecifier>,
    },
    /// `回收全部并洗牌`
    RecycleAllAndShuffle,
    /// `删除全部`
    DeleteAll,
}

impl DeckDiscardPileCommand {
    /// Surface name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::List => "列表",
            Self::Recycle { .. } => "回收",
            Self::RecycleAllAndShuffle => "回收全部并洗牌",
            Self::DeleteAll => "删除全部",
        }
    }
}

/// Commands on a participant's hand.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeckHandCommand {
    /// `列表`
    List,
    /// `加入`
    Take {
        /// Cards to take from the draw pile.
        cards: Vec<CardSpecifier>,
    },
    /// `丢弃`
    Discard {
        /// Cards to discard.
        cards: Vec<CardSpecifier>,
    },
    /// `丢弃全部`
    DiscardAll,
    /// `回收` / `回收于顶部` / `回收于底部`
    Recycle {
        /// Literal placement, or `None` for random positions.
        at: Option<Placement>,
        /// Cards to move back to the draw pile.
        cards: Vec<CardSpecifier>,
    },
    /// `回收全部并洗牌`
    RecycleAllAndShuffle,
    /// `转让至 <user> <cards>`
    TransferTo {
        /// New owner.
        receiver: UserId,
        /// Cards to hand over.
        cards: Vec<CardSpecifier>,
    },
}

impl DeckHandCommand {
    /// Surface name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::List => "列表",
            Self::Take { .. } => "加入",
            Self::Discard { .. } => "丢弃",
            Self::DiscardAll => "丢弃全部",
            Self::Recycle { .. } => "回收",
            Self::RecycleAllAndShuffle => "回收全部并洗牌",
            Self::TransferTo { .. } => "转让至",
        }
    }
}

/// Commands moving cards between two decks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BetweenDecksCommand {
    /// `全部添加至 <deck>`
    AddAllTo,
    /// `挑选添加至 <deck> <cards>`
    PickAddTo {
        /// Cards to copy.
        cards: Vec<CardSpecifier>,
    },
    /// `挑选转移至 <deck> <cards>`
    PickTransferTo {
        /// Cards to move.
        cards: Vec<CardSpecifier>,
    },
}

impl BetweenDecksCommand {
    /// Surface name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::AddAllTo => "全部添加至",
            Self::PickAddTo { .. } => "挑选添加至",
            Self::PickTransferTo { .. } => "挑选转移至",
        }
    }
}
