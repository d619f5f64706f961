//! Command dispatch.
//!
//! [`parse_command`] decides between plugin-level commands and deck
//! commands, then hands the rest to one sub-parser per family. Each
//! sub-parser answers `Ok(Some(_))`, `Ok(None)` ("not mine") or an error,
//! so the families chain in a fixed order.

use deckhand_foundation::{CardName, DeckName, MAX_AMOUNT, Placement, UserId};

use crate::command::{
    BetweenDecksCommand, Command, CommandFamily, DeckCommand, DeckDiscardPileCommand,
    DeckExistenceCommand, DeckHandCommand, ImportMode, PluginCommand, ReplyDestination,
};
use crate::error::{
    ParseError, bad_arguments, should_have_arguments, should_not_have_arguments, unknown_command,
};
use crate::new_cards::parse_new_cards;
use crate::setters::{parse_attribute_setters, parse_flag_setters};
use crate::specifiers::parse_card_specifiers;
use crate::text::{normalize_rest, split_head};
use crate::usage::{append_usage_hint, find_command_heads_by_name};

/// Options that affect parsing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseOptions {
    /// The word that introduces every command, such as `卡组`.
    pub root_prefix: String,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            root_prefix: "卡组".to_string(),
        }
    }
}

/// The outcome of parsing one message.
#[derive(Clone, Debug, PartialEq)]
pub enum ParseResult {
    /// A complete command.
    Ok(Command),
    /// The text was meant as a command but is malformed.
    Error(ParseError),
    /// The text is ordinary chat and should get no reply.
    Ignore,
}

impl From<Result<Command, ParseError>> for ParseResult {
    fn from(result: Result<Command, ParseError>) -> Self {
        match result {
            Ok(cmd) => Self::Ok(cmd),
            Err(err) => Self::Error(err),
        }
    }
}

type SubParse<T> = Result<Option<T>, ParseError>;

/// Parses a message with the root prefix already removed.
///
/// For `卡组：塔罗 抽卡 3` the input is `：塔罗 抽卡 3`; for `卡组列表` it is
/// `列表`.
#[must_use]
pub fn parse_command(input: &str, options: &ParseOptions) -> ParseResult {
    let had_leading_space = input.starts_with(char::is_whitespace);
    let input = input.trim();

    if let Some(rest) = input
        .strip_prefix(':')
        .or_else(|| input.strip_prefix('：'))
    {
        let (deck, rest) = split_head(rest);
        return parse_deck_command(rest.unwrap_or(""), DeckName::from(deck), options).into();
    }

    let (cmd, rest) = split_head(input);
    match try_parse_plugin_command(cmd, rest) {
        Ok(Some(command)) => ParseResult::Ok(Command::Plugin(command)),
        Err(err) => ParseResult::Error(with_hint(err, options)),
        Ok(None) => {
            let heads = find_command_heads_by_name(
                cmd,
                &options.root_prefix,
                &[CommandFamily::Plugin],
            );
            if !heads.is_empty() {
                let quoted: String = heads.iter().map(|h| format!("“{h}”")).collect();
                return ParseResult::Error(ParseError::new(format!(
                    "（是否其实想使用：{quoted}？）"
                )));
            }
            // A space after the prefix marks an intended command; otherwise
            // this is likely ordinary chat that happens to start with it.
            if had_leading_space {
                ParseResult::Error(unknown_command(CommandFamily::Plugin, cmd))
            } else {
                ParseResult::Ignore
            }
        }
    }
}

/// Parses what follows the deck name of a deck command.
///
/// For `卡组：塔罗 抽卡 3` the input is `抽卡 3`. The scope-default shorthand
/// (`：抽卡`) calls this directly with the scope's default deck.
///
/// # Errors
///
/// Returns a [`ParseError`] with a usage footer when the command is known
/// but malformed, or an unknown-command error.
pub fn parse_deck_command(
    input: &str,
    deck: DeckName,
    options: &ParseOptions,
) -> Result<Command, ParseError> {
    let (cmd, rest) = split_head(input);

    if cmd.is_empty() || cmd == "概览" {
        if normalize_rest(rest).is_some() {
            let err = should_not_have_arguments(CommandFamily::Deck, "概览");
            return Err(with_hint(err, options));
        }
        return Ok(Command::Deck {
            deck,
            command: DeckCommand::Overview,
        });
    }

    if let Some(command) = try_parse_deck_existence_command(cmd, rest).map_err(|e| with_hint(e, options))? {
        return Ok(Command::DeckExistence { deck, command });
    }

    if let Some(command) = try_parse_deck_command(cmd, rest).map_err(|e| with_hint(e, options))? {
        return Ok(Command::Deck { deck, command });
    }

    if let Some(joined) = cmd.strip_prefix("弃牌堆") {
        let (sub_cmd, sub_rest) = if joined.is_empty() {
            split_head(rest.unwrap_or(""))
        } else {
            (joined, rest)
        };
        return match try_parse_deck_discard_pile_command(sub_cmd, sub_rest) {
            Ok(Some(command)) => Ok(Command::DeckDiscardPile { deck, command }),
            Ok(None) => Err(unknown_command(CommandFamily::DeckDiscardPile, sub_cmd)),
            Err(err) => Err(with_hint(err, options)),
        };
    }

    if let Some(joined) = cmd.strip_prefix("手牌") {
        let owner_prefix = joined.strip_prefix(':').or_else(|| joined.strip_prefix('：'));
        let (owner, sub_cmd, sub_rest) = match owner_prefix {
            Some(owner) => {
                let (sub_cmd, sub_rest) = split_head(rest.unwrap_or(""));
                (Some(UserId::from(owner)), sub_cmd, sub_rest)
            }
            None if joined.is_empty() => {
                let (sub_cmd, sub_rest) = split_head(rest.unwrap_or(""));
                (None, sub_cmd, sub_rest)
            }
            None => (None, joined, rest),
        };
        return match try_parse_deck_hand_command(sub_cmd, sub_rest) {
            Ok(Some(command)) => Ok(Command::DeckHand {
                deck,
                owner,
                command,
            }),
            Ok(None) => Err(unknown_command(CommandFamily::DeckHand, sub_cmd)),
            Err(err) => Err(with_hint(err, options)),
        };
    }

    if let Some((command, object)) =
        try_parse_between_decks_command(cmd, rest).map_err(|e| with_hint(e, options))?
    {
        return Ok(Command::BetweenDecks {
            subject: deck,
            object,
            command,
        });
    }

    // Between-deck commands read like deck commands, so report the broader family.
    Err(unknown_command(CommandFamily::Deck, cmd))
}

fn with_hint(err: ParseError, options: &ParseOptions) -> ParseError {
    match err.origin.clone() {
        Some(origin) => append_usage_hint(err, origin.family, &origin.name, &options.root_prefix),
        None => err,
    }
}

fn placement_of(cmd: &str) -> Option<Placement> {
    if cmd.ends_with("于顶部") {
        Some(Placement::Top)
    } else if cmd.ends_with("于底部") {
        Some(Placement::Bottom)
    } else {
        None
    }
}

fn no_arguments<T>(family: CommandFamily, cmd: &str, rest: Option<&str>, value: T) -> SubParse<T> {
    match rest {
        None => Ok(Some(value)),
        Some(_) => Err(should_not_have_arguments(family, cmd)),
    }
}

/// The flag setters on the first line of a settings-like command.
fn first_line_flags(
    family: CommandFamily,
    cmd: &str,
    first_line: &str,
) -> Result<deckhand_foundation::FlagSetters, ParseError> {
    let first_line = first_line.trim();
    if first_line.is_empty() {
        return Ok(Vec::new());
    }
    parse_flag_setters(first_line).map_err(|e| bad_arguments(family, cmd, &e))
}

fn try_parse_plugin_command(cmd: &str, rest: Option<&str>) -> SubParse<PluginCommand> {
    const FAMILY: CommandFamily = CommandFamily::Plugin;
    let rest = normalize_rest(rest);

    match cmd {
        "" | "概览" => no_arguments(FAMILY, "概览", rest, PluginCommand::Overview),
        "帮助" => Ok(Some(PluginCommand::Help {
            filters: rest.map(|r| r.split_whitespace().map(str::to_string).collect()),
        })),
        "列表" => no_arguments(FAMILY, cmd, rest, PluginCommand::List),
        "领域设置" => {
            let mut lines = rest.unwrap_or("").split('\n');
            if lines.next().is_some_and(|first| !first.trim().is_empty()) {
                return Err(bad_arguments(FAMILY, cmd, "第一行不能带有参数"));
            }
            let attribute_setters =
                parse_attribute_setters(lines).map_err(|e| bad_arguments(FAMILY, cmd, &e))?;
            Ok(Some(PluginCommand::ScopeSettings { attribute_setters }))
        }
        _ => Ok(None),
    }
}

fn try_parse_deck_existence_command(
    cmd: &str,
    rest: Option<&str>,
) -> SubParse<DeckExistenceCommand> {
    const FAMILY: CommandFamily = CommandFamily::DeckExistence;
    let rest = normalize_rest(rest);

    match cmd {
        "创建" => {
            let text = rest.unwrap_or("");
            let mut lines = text.split('\n');
            let flag_setters = first_line_flags(FAMILY, cmd, lines.next().unwrap_or(""))?;

            let rest_lines: Vec<&str> = lines.collect();
            let separator = rest_lines.iter().position(|l| l.starts_with("---"));
            let (attribute_lines, cards_text, separator_rest) = match separator {
                Some(idx) => (
                    &rest_lines[..idx],
                    rest_lines[idx + 1..].join("\n"),
                    rest_lines[idx].trim_start_matches('-').trim(),
                ),
                None => (&rest_lines[..], String::new(), ""),
            };

            let cards = if cards_text.is_empty() {
                Vec::new()
            } else {
                parse_new_cards(&cards_text).map_err(|e| bad_arguments(FAMILY, cmd, &e))?
            };
            let keeps_order = match separator_rest {
                "" => false,
                "顺序" => true,
                other => {
                    return Err(bad_arguments(
                        FAMILY,
                        cmd,
                        &format!("无法理解位于分隔符之后的 “{other}”"),
                    ));
                }
            };

            let attribute_setters = parse_attribute_setters(attribute_lines.iter().copied())
                .map_err(|e| bad_arguments(FAMILY, cmd, &e))?;
            Ok(Some(DeckExistenceCommand::Create {
                flag_setters,
                attribute_setters,
                cards,
                keeps_order,
            }))
        }
        "销毁" => no_arguments(FAMILY, cmd, rest, DeckExistenceCommand::Destroy),
        "导出" => no_arguments(FAMILY, cmd, rest, DeckExistenceCommand::Export),
        "导入创建" | "导入覆盖" => {
            let mode = if cmd == "导入创建" {
                ImportMode::Create
            } else {
                ImportMode::Overwrite
            };
            let Some(text) = rest else {
                return Err(bad_arguments(FAMILY, "导入", "缺少参数"));
            };
            let data = serde_json::from_str(text.trim())
                .map_err(|e| bad_arguments(FAMILY, "导入", &format!("解析数据失败：\n{e}")))?;
            Ok(Some(DeckExistenceCommand::Import { mode, data }))
        }
        "克隆为" | "重命名为" => {
            let destination = deck_name_argument(FAMILY, cmd, rest)?;
            Ok(Some(if cmd == "克隆为" {
                DeckExistenceCommand::CloneTo { destination }
            } else {
                DeckExistenceCommand::RenameTo { destination }
            }))
        }
        _ => Ok(None),
    }
}

fn deck_name_argument(
    family: CommandFamily,
    cmd: &str,
    rest: Option<&str>,
) -> Result<DeckName, ParseError> {
    let destination = rest.map(str::trim).unwrap_or_default();
    if destination.is_empty() {
        return Err(should_have_arguments(family, cmd));
    }
    if destination.contains(char::is_whitespace) {
        return Err(bad_arguments(family, cmd, "卡组名中不能包含空白"));
    }
    Ok(DeckName::from(destination))
}

fn parse_amount(family: CommandFamily, cmd: &str, rest: Option<&str>) -> Result<Option<u64>, ParseError> {
    let Some(text) = rest.map(str::trim) else {
        return Ok(None);
    };
    if text.is_empty() || !text.chars().all(|c| c.is_ascii_digit()) {
        return Err(bad_arguments(family, cmd, "数量需为非负整数"));
    }
    match text.parse::<u64>() {
        Ok(n) if n <= MAX_AMOUNT => Ok(Some(n)),
        _ => Err(bad_arguments(family, cmd, "数量过大")),
    }
}

fn try_parse_deck_command(cmd: &str, rest: Option<&str>) -> SubParse<DeckCommand> {
    const FAMILY: CommandFamily = CommandFamily::Deck;
    let rest = normalize_rest(rest);

    match cmd {
        "列表" => no_arguments(FAMILY, cmd, rest, DeckCommand::List),
        "查看" => {
            let names: Vec<CardName> = rest
                .unwrap_or("")
                .split_whitespace()
                .map(CardName::from)
                .collect();
            if names.is_empty() {
                return Err(bad_arguments(FAMILY, cmd, "未提供卡名"));
            }
            Ok(Some(DeckCommand::View { cards: names }))
        }
        "设置" => {
            let text = rest.unwrap_or("");
            let mut lines = text.split('\n');
            let flag_setters = first_line_flags(FAMILY, cmd, lines.next().unwrap_or(""))?;
            let attribute_setters =
                parse_attribute_setters(lines).map_err(|e| bad_arguments(FAMILY, cmd, &e))?;
            Ok(Some(DeckCommand::Settings {
                flag_setters,
                attribute_setters,
            }))
        }
        "添加" | "添加于顶部" | "添加于底部" => {
            let text = rest.map(str::trim).unwrap_or_default();
            if text.is_empty() {
                return Err(should_have_arguments(FAMILY, "添加"));
            }
            let cards = parse_new_cards(text).map_err(|e| bad_arguments(FAMILY, "添加", &e))?;
            Ok(Some(DeckCommand::Add {
                at: placement_of(cmd),
                cards,
            }))
        }
        "删除" => {
            let text = rest.map(str::trim).unwrap_or_default();
            if text.is_empty() {
                return Err(should_have_arguments(FAMILY, cmd));
            }
            let cards = parse_card_specifiers(text).map_err(|e| bad_arguments(FAMILY, cmd, &e))?;
            Ok(Some(DeckCommand::Delete { cards }))
        }
        "抽卡" | "抽牌" | "抽卡至私聊" | "抽牌至私聊" => {
            let to = destination_of(cmd);
            let amount = parse_amount(FAMILY, "抽卡", rest)?;
            Ok(Some(DeckCommand::Draw { to, amount }))
        }
        "窥视" | "窥视至私聊" => {
            let to = destination_of(cmd);
            let amount = parse_amount(FAMILY, "窥视", rest)?;
            Ok(Some(DeckCommand::Peek { to, amount }))
        }
        "洗牌" => no_arguments(FAMILY, cmd, rest, DeckCommand::Shuffle),
        "回收全部并洗牌" => no_arguments(FAMILY, cmd, rest, DeckCommand::RecycleAllAndShuffle),
        _ => Ok(None),
    }
}

fn destination_of(cmd: &str) -> ReplyDestination {
    if cmd.ends_with("至私聊") {
        ReplyDestination::SenderPrivate
    } else {
        ReplyDestination::CurrentPlace
    }
}

fn specifiers_argument(
    family: CommandFamily,
    cmd: &str,
    rest: Option<&str>,
) -> Result<Vec<deckhand_foundation::CardSpecifier>, ParseError> {
    let text = rest.map(str::trim).unwrap_or_default();
    if text.is_empty() {
        return Err(should_have_arguments(family, cmd));
    }
    parse_card_specifiers(text).map_err(|e| bad_arguments(family, cmd, &e))
}

fn try_parse_deck_discard_pile_command(
    cmd: &str,
    rest: Option<&str>,
) -> SubParse<DeckDiscardPileCommand> {
    const FAMILY: CommandFamily = CommandFamily::DeckDiscardPile;
    let rest = normalize_rest(rest);

    match cmd {
        "列表" => no_arguments(FAMILY, cmd, rest, DeckDiscardPileCommand::List),
        "回收" | "回收于顶部" | "回收于底部" => {
            let cards = specifiers_argument(FAMILY, "回收", rest)?;
            Ok(Some(DeckDiscardPileCommand::Recycle {
                at: placement_of(cmd),
                cards,
            }))
        }
        "回收全部并洗牌" => no_arguments(FAMILY, cmd, rest, DeckDiscardPileCommand::RecycleAllAndShuffle),
        "删除全部" => no_arguments(FAMILY, cmd, rest, DeckDiscardPileCommand::DeleteAll),
        _ => Ok(None),
    }
}

fn try_parse_deck_hand_command(cmd: &str, rest: Option<&str>) -> SubParse<DeckHandCommand> {
    const FAMILY: CommandFamily = CommandFamily::DeckHand;
    let rest = normalize_rest(rest);

    match cmd {
        "列表" => no_arguments(FAMILY, cmd, rest, DeckHandCommand::List),
        "加入" => Ok(Some(DeckHandCommand::Take {
            cards: specifiers_argument(FAMILY, cmd, rest)?,
        })),
        "丢弃" => Ok(Some(DeckHandCommand::Discard {
            cards: specifiers_argument(FAMILY, cmd, rest)?,
        })),
        "丢弃全部" => no_arguments(FAMILY, cmd, rest, DeckHandCommand::DiscardAll),
        "回收" | "回收于顶部" | "回收于底部" => {
            let cards = specifiers_argument(FAMILY, "回收", rest)?;
            Ok(Some(DeckHandCommand::Recycle {
                at: placement_of(cmd),
                cards,
            }))
        }
        "回收全部并洗牌" => no_arguments(FAMILY, cmd, rest, DeckHandCommand::RecycleAllAndShuffle),
        "转让至" => {
            let (receiver, cards_text) = split_head(rest.map(str::trim).unwrap_or_default());
            if receiver.is_empty() {
                return Err(should_have_arguments(FAMILY, cmd));
            }
            let cards = specifiers_argument(FAMILY, cmd, cards_text)?;
            Ok(Some(DeckHandCommand::TransferTo {
                receiver: UserId::from(receiver),
                cards,
            }))
        }
        _ => Ok(None),
    }
}

fn try_parse_between_decks_command(
    cmd: &str,
    rest: Option<&str>,
) -> SubParse<(BetweenDecksCommand, DeckName)> {
    const FAMILY: CommandFamily = CommandFamily::BetweenDecks;
    let rest = normalize_rest(rest);

    match cmd {
        "全部添加至" => {
            let object = deck_name_argument(FAMILY, cmd, rest)?;
            Ok(Some((BetweenDecksCommand::AddAllTo, object)))
        }
        "挑选添加至" | "挑选转移至" => {
            let (object, cards_text) = split_head(rest.map(str::trim).unwrap_or_default());
            if object.is_empty() {
                return Err(should_have_arguments(FAMILY, cmd));
            }
            let cards = specifiers_argument(FAMILY, cmd, cards_text)?;
            let command = if cmd == "挑选添加至" {
                BetweenDecksCommand::PickAddTo { cards }
            } else {
                BetweenDecksCommand::PickTransferTo { cards }
            };
            Ok(Some((command, DeckName::from(object))))
        }
        _ => Ok(None),
    }
}
