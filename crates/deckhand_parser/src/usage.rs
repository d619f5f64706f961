//! Command usage registry.
//!
//! A static table of every command head: family, name, accepted suffixes and
//! argument format. Parse errors use it for the "see usage" footer and for
//! "did you mean" suggestions; the help command renders it as plain text.

use crate::command::CommandFamily;
use crate::error::ParseError;

/// How the command head starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrefixType {
    /// `卡组<命令>`
    Global,
    /// `卡组：<卡组名> <命令>`
    Deck,
    /// `卡组：<卡组名> 弃牌堆<命令>`
    DeckDiscardPile,
    /// `卡组：<卡组名> 手牌(：<@所属者> )?<命令>`
    DeckHand,
}

impl PrefixType {
    /// The prefix type commands of a family are written with.
    #[must_use]
    pub const fn of(family: CommandFamily) -> Self {
        match family {
            CommandFamily::Plugin => Self::Global,
            CommandFamily::DeckExistence | CommandFamily::Deck | CommandFamily::BetweenDecks => {
                Self::Deck
            }
            CommandFamily::DeckDiscardPile => Self::DeckDiscardPile,
            CommandFamily::DeckHand => Self::DeckHand,
        }
    }

    /// Renders the prefix for a root prefix such as `卡组`.
    #[must_use]
    pub fn render(self, root_prefix: &str) -> String {
        match self {
            Self::Global => root_prefix.to_string(),
            Self::Deck => format!("{root_prefix}：<卡组名> "),
            Self::DeckDiscardPile => format!("{root_prefix}：<卡组名> 弃牌堆"),
            Self::DeckHand => format!("{root_prefix}：<卡组名> 手牌(：<@所属者> )?"),
        }
    }
}

/// Usage of one command.
#[derive(Debug)]
pub struct CommandUsage {
    /// Family of the command.
    pub family: CommandFamily,
    /// Surface name.
    pub name: &'static str,
    /// Accepted suffixes; an empty string means the suffix is optional.
    pub suffixes: &'static [&'static str],
    /// Argument format, without the head.
    pub arguments_format: Option<&'static str>,
    /// What the command does.
    pub description: &'static str,
    /// Shared explanatory notes appended to the description.
    pub notes: &'static [&'static str],
    /// Example arguments.
    pub examples: &'static [&'static str],
}

impl CommandUsage {
    /// `卡组：<卡组名> 抽卡`
    #[must_use]
    pub fn head(&self, root_prefix: &str) -> String {
        PrefixType::of(self.family).render(root_prefix) + self.name
    }

    /// `卡组：<卡组名> 抽卡(至私聊)? <数量>?`
    #[must_use]
    pub fn format(&self, root_prefix: &str) -> String {
        let mut out = self.head(root_prefix);
        out.push_str(&suffix_format(self.suffixes));
        if let Some(args) = self.arguments_format {
            out.push(' ');
            out.push_str(&args.replace('\n', "<换行>"));
        }
        out
    }

    /// Format, indented description, and examples.
    #[must_use]
    pub fn text(&self, root_prefix: &str) -> String {
        let mut lines = vec![format!("“{}”", self.format(root_prefix))];
        for line in self
            .description
            .lines()
            .chain(self.notes.iter().flat_map(|n| n.lines()))
        {
            lines.push(format!("　　{line}"));
        }
        if !self.examples.is_empty() {
            lines.push("示例：".to_string());
            let head = self.head(root_prefix) + self.suffixes.first().copied().unwrap_or("");
            for example in self.examples {
                lines.push(format!("　　{head} {}", example.replace('\n', "<换行>")));
            }
        }
        lines.join("\n")
    }
}

fn suffix_format(suffixes: &[&str]) -> String {
    let choices: Vec<&str> = suffixes.iter().copied().filter(|s| !s.is_empty()).collect();
    if choices.is_empty() {
        return String::new();
    }
    let optional = choices.len() < suffixes.len();
    let joined = choices.join("|");
    if choices.len() > 1 || optional {
        format!("({joined}){}", if optional { "?" } else { "" })
    } else {
        joined
    }
}

const FLAG_SETTERS: &str = "((+|-)<旗帜名>)*";
const ATTRIBUTE_SETTERS: &str = "(\n<属性名> <属性值>?)*";
const SPECIFIERS: &str = "(((<数量>|全部)#)?<卡名>)+";
const SUFFIXES_AT: &[&str] = &["", "于顶部", "于底部"];
const SUFFIXES_TO_PRIVATE: &[&str] = &["", "至私聊"];

const NOTE_NEW_CARD: &str = "“<新卡牌>” 指 “(<数量>#)?<卡名><被包围的描述>”。卡名中不能含有空白字符。卡名中若要包含 “「」『』【】#\\” 这些符号，需要在对应符号前添加 “\\”，比如 “\\「”。\n“<被包围的描述>” 指 “「<描述>」”“『<描述>』” 或 “【<描述>】”。描述中出现其他种类的包围符号时同样需要转义。\n包围符号两侧只要每侧数目相同且为同一种，则每侧的符号数目可以不止一个。比如，“【【【<描述>】】】” 相当于 “【<描述>】”。";
const NOTE_AT: &str = "若指定位置，卡牌会按照列举的顺序插入该位置；若未指定位置，卡牌会按照随机顺序插入随机位置（包括顶部和底部）。";
const NOTE_AMOUNT: &str = "若卡名前不带数量，数量将视为 1。";
const NOTE_AMOUNT_STRICT: &str = "若卡名前不带数量，数量将视为 1。若卡名前数量为全部，需保证对应卡牌全部处于抽牌堆中，否则报错。";
const NOTE_TO_PRIVATE: &str = "若存在 “至私聊”，本次命令执行的具体结果将仅私聊发送给命令发起者。";

macro_rules! usage {
    ($family:ident, $name:literal, $suffixes:expr, $args:expr, $desc:literal, $notes:expr, $examples:expr $(,)?) => {
        CommandUsage {
            family: CommandFamily::$family,
            name: $name,
            suffixes: $suffixes,
            arguments_format: $args,
            description: $desc,
            notes: $notes,
            examples: $examples,
        }
    };
}

/// Every command, grouped by family in display order.
pub static COMMAND_USAGES: &[CommandUsage] = &[
    usage!(Plugin, "概览", &[], None, "显示本插件概览。", &[], &[]),
    usage!(Plugin, "帮助", &[], Some("<命令名>*"), "显示与本插件有关的帮助信息。", &[], &["", "卡组存在::创建"]),
    usage!(Plugin, "列表", &[], None, "列出目前存在的卡组。", &[], &[]),
    usage!(Plugin, "领域设置", &[], Some(ATTRIBUTE_SETTERS), "修改本插件针对当前领域的设置。", &[], &["\n默认卡组 塔罗牌"]),
    usage!(
        DeckExistence,
        "创建",
        &[],
        Some("((+|-)<旗帜名>)*(\n<属性名> <属性值>?)*(\n---(顺序)?\n<新卡牌>+)?"),
        "创建本卡组。若卡组已经存在，报错。",
        &[NOTE_NEW_CARD],
        &["", "+不放回", "+放回不独立\n---\n愚者正位「」愚者逆位「」", "+不放回\n---顺序\n1「」2「」3「」"],
    ),
    usage!(DeckExistence, "销毁", &[], None, "销毁本卡组。若卡组不存在，报错。", &[], &[]),
    usage!(DeckExistence, "导出", &[], None, "显示本卡组数据编码后的结果。", &[], &[]),
    usage!(
        DeckExistence,
        "导入",
        &["创建", "覆盖"],
        Some("<data>"),
        "将 data 作为本卡组的数据。\n用 “创建” 来用导入的数据创建尚未创建的卡组，用 “覆盖” 来用导入的数据覆盖已经创建的卡组。",
        &[],
        &[],
    ),
    usage!(DeckExistence, "克隆为", &[], Some("<新卡组名>"), "将本卡组克隆为新的卡组，本卡组和新卡组除名字外一切相同。若卡组已经存在，报错。", &[], &["第二副牌"]),
    usage!(DeckExistence, "重命名为", &[], Some("<新卡组名>"), "重命名本卡组。若新名字对应的卡组已经存在，报错。", &[], &["新名字"]),
    usage!(Deck, "概览", &[], None, "显示本卡组的概览信息。", &[], &[]),
    usage!(Deck, "列表", &[], None, "列出存在于卡组中的卡牌及对应的可公开信息。抽牌堆与弃牌堆中的卡牌都算在内。", &[], &[]),
    usage!(Deck, "查看", &[], Some("<卡名>+"), "查看本卡组中对应卡牌的信息。", &[], &["愚者正位 世界逆位"]),
    usage!(Deck, "设置", &[], Some("((+|-)<旗帜名>)*(\n<属性名> <属性值>?)*"), "修改本卡组的设置。", &[], &["+不放回-弃牌堆", "\n描述 大阿卡纳"]),
    usage!(
        Deck,
        "添加",
        SUFFIXES_AT,
        Some("<新卡牌>+"),
        "将输入的新卡牌凭空放入本卡组的抽牌堆。",
        &[NOTE_AT, NOTE_NEW_CARD, NOTE_AMOUNT],
        &["愚者正位「」愚者逆位「」", "4#一条「上面刻着一只麻雀。」4#白「上面并没有刻字。」"],
    ),
    usage!(Deck, "删除", &[], Some(SPECIFIERS), "从抽牌堆中删除指定卡牌。", &[NOTE_AMOUNT_STRICT], &["全部#要全都删的卡牌 只要删一张的卡牌 3#要删三张的卡牌"]),
    usage!(Deck, "洗牌", &[], None, "打乱抽牌堆中卡牌的顺序。", &[], &[]),
    usage!(Deck, "回收全部并洗牌", &[], None, "将位于本卡组抽牌堆之外的卡牌全部放回抽牌堆之中，并洗牌。", &[], &[]),
    usage!(Deck, "抽卡", SUFFIXES_TO_PRIVATE, Some("<数量>?"), "抽指定数量张卡牌。若没有指定数量，则抽一张。", &[NOTE_TO_PRIVATE], &["", "3"]),
    usage!(Deck, "窥视", SUFFIXES_TO_PRIVATE, Some("<数量>?"), "查看抽牌堆顶部指定数量张卡牌。若没有指定数量，则查看一张。", &[NOTE_TO_PRIVATE], &["", "3"]),
    usage!(DeckDiscardPile, "列表", &[], None, "列出存在于本卡组弃牌堆中的卡牌及对应的可公开信息。", &[], &[]),
    usage!(DeckDiscardPile, "回收", SUFFIXES_AT, Some(SPECIFIERS), "将本卡组弃牌堆中指定的卡牌放回抽牌堆之中。", &[NOTE_AT, NOTE_AMOUNT], &["召唤魔术"]),
    usage!(DeckDiscardPile, "回收全部并洗牌", &[], None, "将位于本卡组弃牌堆中的卡牌全部放回抽牌堆之中，并洗牌。", &[], &[]),
    usage!(DeckDiscardPile, "删除全部", &[], None, "删除本卡组弃牌堆中全部的卡牌。", &[], &[]),
    usage!(DeckHand, "列表", &[], None, "列出存在于目标手牌中的卡牌及对应的可公开信息。", &[], &[]),
    usage!(DeckHand, "加入", &[], Some(SPECIFIERS), "将抽牌堆中指定的卡牌加入目标手牌。", &[NOTE_AMOUNT], &["闪亮登场"]),
    usage!(DeckHand, "丢弃", &[], Some(SPECIFIERS), "丢弃目标手牌中的指定卡牌。", &[NOTE_AMOUNT], &["某某某"]),
    usage!(DeckHand, "丢弃全部", &[], None, "丢弃目标手牌中全部的卡牌。", &[], &[]),
    usage!(DeckHand, "回收", SUFFIXES_AT, Some(SPECIFIERS), "将目标手牌中指定的卡牌放回抽牌堆之中。", &[NOTE_AT, NOTE_AMOUNT], &["某某某"]),
    usage!(DeckHand, "回收全部并洗牌", &[], None, "将位于目标手牌中的卡牌全部放回抽牌堆之中，并洗牌。", &[], &[]),
    usage!(DeckHand, "转让至", &[], Some("<@所属者> (((<数量>|全部)#)?<卡名>)+"), "将目标手牌中指定的卡牌转让给指定的所属者。", &[NOTE_AMOUNT], &["9876543210 某某某"]),
    usage!(BetweenDecks, "全部添加至", &[], Some("<卡组名>"), "将本卡组的所有卡牌添加至另一套卡组。若另一套卡组不存在，报错。", &[], &["另一副牌"]),
    usage!(
        BetweenDecks,
        "挑选添加至",
        &[],
        Some("<卡组名> (((<数量>|全部)#)?<卡名>)+"),
        "将挑选出的卡牌添加至另一套卡组，本卡组不变。",
        &[NOTE_AMOUNT],
        &["另一副牌 全部#某某某"],
    ),
    usage!(
        BetweenDecks,
        "挑选转移至",
        &[],
        Some("<卡组名> (((<数量>|全部)#)?<卡名>)+"),
        "将挑选出的卡牌添加至另一套卡组，然后将它们从本卡组中删除。",
        &[NOTE_AMOUNT_STRICT],
        &["另一副牌 全部#某某某"],
    ),
];

/// Looks up the usage of one command.
#[must_use]
pub fn find_usage(family: CommandFamily, name: &str) -> Option<&'static CommandUsage> {
    COMMAND_USAGES
        .iter()
        .find(|u| u.family == family && u.name == name)
}

/// Appends the "see usage" footer for `family::name`.
///
/// The error's origin is left untouched.
#[must_use]
pub fn append_usage_hint(
    mut error: ParseError,
    family: CommandFamily,
    name: &str,
    root_prefix: &str,
) -> ParseError {
    error.message.push_str(&format!(
        "\n\n（发送 “{root_prefix}帮助 {family}::{name}” 查询该命令的用法。）"
    ));
    error
}

/// Heads of every command with the given name, for "did you mean" hints.
#[must_use]
pub fn find_command_heads_by_name(
    name: &str,
    root_prefix: &str,
    excluded: &[CommandFamily],
) -> Vec<String> {
    let mut heads: Vec<String> = Vec::new();
    for usage in COMMAND_USAGES {
        if usage.name != name || excluded.contains(&usage.family) {
            continue;
        }
        let head = usage.head(root_prefix);
        if !heads.contains(&head) {
            heads.push(head);
        }
    }
    heads
}

fn matches_filter(usage: &CommandUsage, filter: &str) -> bool {
    match filter.split_once("::") {
        Some((family, name)) => usage.family.l10n() == family && usage.name == name,
        None => usage.family.l10n() == filter || usage.name == filter,
    }
}

/// Renders the help text, optionally limited to some entries.
///
/// A filter is `<family>::<name>`, a family name, or a bare command name.
///
/// # Errors
///
/// Returns the filters that match no command.
pub fn help_text(root_prefix: &str, filters: Option<&[String]>) -> Result<String, Vec<String>> {
    if let Some(filters) = filters {
        let unknown: Vec<String> = filters
            .iter()
            .filter(|f| !COMMAND_USAGES.iter().any(|u| matches_filter(u, f)))
            .cloned()
            .collect();
        if !unknown.is_empty() {
            return Err(unknown);
        }
    }

    let mut sections = Vec::new();
    for family in CommandFamily::ALL {
        let entries: Vec<String> = COMMAND_USAGES
            .iter()
            .filter(|u| u.family == family)
            .filter(|u| filters.is_none_or(|fs| fs.iter().any(|f| matches_filter(u, f))))
            .map(|u| format!("==== 命令「{}」====\n{}", u.name, u.text(root_prefix)))
            .collect();
        if !entries.is_empty() {
            sections.push(format!(
                "=== 类型「{family}」===\n\n{}",
                entries.join("\n\n")
            ));
        }
    }

    Ok(format!("= 用法 =\n\n== 命令 ==\n\n{}", sections.join("\n\n")))
}
