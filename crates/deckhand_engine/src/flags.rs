//! Deck flags and the put-back mode they select.
//!
//! Flags are stored as a list. Exactly one put-back mode is active; the
//! discard flag only means something under [`PutBackMode::WithoutReplacement`];
//! the scope-default flag is derived from the scope and never stored on the
//! deck itself.

use std::fmt;

use deckhand_foundation::{DeckName, Error, ErrorKind, Result};
use serde::{Deserialize, Serialize};

// =============================================================================
// Flag Names
// =============================================================================

/// A single deck flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeckFlag {
    /// `放回`
    #[serde(rename = "放回")]
    WithReplacement,
    /// `不放回`
    #[serde(rename = "不放回")]
    WithoutReplacement,
    /// `放回不重复`
    #[serde(rename = "放回不重复")]
    WithReplacementNoImmediateRepeat,
    /// `放回不独立`
    #[serde(rename = "放回不独立")]
    WithReplacementBatch,
    /// `弃牌堆`: drawn cards go to the discard pile instead of being deleted.
    #[serde(rename = "弃牌堆")]
    Discard,
    /// `领域默认`: the deck is the scope's default deck.
    #[serde(rename = "领域默认")]
    ScopeDefault,
}

impl DeckFlag {
    /// Surface name of the flag.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::WithReplacement => "放回",
            Self::WithoutReplacement => "不放回",
            Self::WithReplacementNoImmediateRepeat => "放回不重复",
            Self::WithReplacementBatch => "放回不独立",
            Self::Discard => "弃牌堆",
            Self::ScopeDefault => "领域默认",
        }
    }

    /// The put-back mode this flag selects, if it is a mode flag.
    #[must_use]
    pub const fn put_back_mode(self) -> Option<PutBackMode> {
        match self {
            Self::WithReplacement => Some(PutBackMode::WithReplacement),
            Self::WithoutReplacement => Some(PutBackMode::WithoutReplacement),
            Self::WithReplacementNoImmediateRepeat => {
                Some(PutBackMode::WithReplacementNoImmediateRepeat)
            }
            Self::WithReplacementBatch => Some(PutBackMode::WithReplacementBatch),
            Self::Discard | Self::ScopeDefault => None,
        }
    }
}

impl fmt::Display for DeckFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a drawn card returns to the draw pile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PutBackMode {
    /// Each drawn card goes back at a random position before the next draw.
    #[default]
    WithReplacement,
    /// Drawn cards leave the draw pile.
    WithoutReplacement,
    /// Repeats within one draw are skipped until enough distinct names are drawn.
    WithReplacementNoImmediateRepeat,
    /// The whole batch goes back only after all of it is drawn.
    WithReplacementBatch,
}

impl PutBackMode {
    /// All modes in display order.
    pub const ALL: [Self; 4] = [
        Self::WithReplacement,
        Self::WithoutReplacement,
        Self::WithReplacementNoImmediateRepeat,
        Self::WithReplacementBatch,
    ];

    /// The flag that selects this mode.
    #[must_use]
    pub const fn flag(self) -> DeckFlag {
        match self {
            Self::WithReplacement => DeckFlag::WithReplacement,
            Self::WithoutReplacement => DeckFlag::WithoutReplacement,
            Self::WithReplacementNoImmediateRepeat => DeckFlag::WithReplacementNoImmediateRepeat,
            Self::WithReplacementBatch => DeckFlag::WithReplacementBatch,
        }
    }

    /// Surface name of the mode.
    #[must_use]
    pub const fn name(self) -> &'static str {
        self.flag().name()
    }

    /// Looks up a mode by its surface name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.name() == name)
    }

    const fn description(self) -> &'static str {
        match self {
            Self::WithReplacement => "每抽一张卡，将抽到的卡放回卡组去。",
            Self::WithoutReplacement => "每抽一张卡，不将抽到的卡放回卡组。（具体效果见其他旗帜。）",
            Self::WithReplacementNoImmediateRepeat => {
                "抽多张卡时，忽略这期间已经抽到过的卡，直到抽够不同种类的指定数量的卡为止。"
            }
            Self::WithReplacementBatch => {
                "抽多张卡时，直到抽到指定数量的卡后再一次性将抽到的所有卡放回卡组。"
            }
        }
    }
}

impl fmt::Display for PutBackMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The last mode flag in `flags`, or [`PutBackMode::WithReplacement`].
#[must_use]
pub fn extract_put_back_mode(flags: &[DeckFlag]) -> PutBackMode {
    flags
        .iter()
        .rev()
        .find_map(|flag| flag.put_back_mode())
        .unwrap_or_default()
}

/// Whether `flags` enables the discard pile.
#[must_use]
pub fn has_discard_flag(flags: &[DeckFlag]) -> bool {
    flags.contains(&DeckFlag::Discard)
}

// =============================================================================
// Reconciliation
// =============================================================================

#[derive(Clone, Copy)]
enum PendingMode {
    Set(PutBackMode),
    Unset,
}

fn invalid(message: String) -> Error {
    Error::new(ErrorKind::InvalidFlags(message))
}

/// Applies `+name` / `-name` setters to an existing flag list.
///
/// The result lists the put-back mode first, then the discard flag, then
/// the scope-default flag. Switching to `不放回` turns the discard flag on
/// unless the same call sets it explicitly.
///
/// # Errors
///
/// Returns [`ErrorKind::InvalidFlags`] for unknown flag names, two different
/// modes enabled at once, no mode left enabled, or the discard flag enabled
/// outside `不放回`.
pub fn update_deck_flags(old_flags: &[DeckFlag], setters: &[String]) -> Result<Vec<DeckFlag>> {
    let old_mode = extract_put_back_mode(old_flags);
    let old_scope_default = old_flags.contains(&DeckFlag::ScopeDefault);

    let mut new_mode: Option<PendingMode> = None;
    let mut new_discard: Option<bool> = None;
    let mut new_scope_default: Option<bool> = None;

    for setter in setters {
        let (enable, name) = if let Some(name) = setter.strip_prefix('+') {
            (true, name)
        } else if let Some(name) = setter.strip_prefix('-') {
            (false, name)
        } else {
            return Err(invalid("旗帜设置器应以 “+” 或 “-” 开头".to_string()));
        };

        if let Some(mode) = PutBackMode::from_name(name) {
            if enable {
                match new_mode {
                    Some(PendingMode::Set(current)) if current != mode => {
                        return Err(invalid(format!("不能同时启用旗帜 “{current}” 与 {mode}")));
                    }
                    _ => new_mode = Some(PendingMode::Set(mode)),
                }
            } else {
                let effective = match new_mode {
                    None => Some(old_mode),
                    Some(PendingMode::Set(current)) => Some(current),
                    Some(PendingMode::Unset) => None,
                };
                if effective == Some(mode) {
                    new_mode = Some(PendingMode::Unset);
                }
            }
        } else if name == DeckFlag::Discard.name() {
            new_discard = Some(enable);
        } else if name == DeckFlag::ScopeDefault.name() {
            new_scope_default = Some(enable);
        } else {
            return Err(invalid(format!("未知旗帜 {name}")));
        }
    }

    let final_mode = match new_mode {
        Some(PendingMode::Unset) => {
            let modes: Vec<String> = PutBackMode::ALL.iter().map(|m| format!("“{m}”")).collect();
            return Err(invalid(format!(
                "必须要启用一个放回相关的旗帜（{}）有效",
                modes.join("、")
            )));
        }
        Some(PendingMode::Set(mode)) => mode,
        None => old_mode,
    };

    let mut flags = vec![final_mode.flag()];
    if final_mode == PutBackMode::WithoutReplacement {
        // Unless this call says otherwise, `不放回` always comes with the discard pile.
        if new_discard.unwrap_or(true) {
            flags.push(DeckFlag::Discard);
        }
    } else if new_discard == Some(true) {
        return Err(invalid(format!(
            "只有启用旗帜 “{}” 时可以启用 旗帜 “{}”",
            DeckFlag::WithoutReplacement,
            DeckFlag::Discard
        )));
    }
    if new_scope_default.unwrap_or(old_scope_default) {
        flags.push(DeckFlag::ScopeDefault);
    }

    Ok(flags)
}

// =============================================================================
// Text
// =============================================================================

/// Human description of every flag group, for deck overviews.
#[must_use]
pub fn flags_text(flags: &[DeckFlag], deck: &DeckName) -> String {
    let mode = extract_put_back_mode(flags);
    let discard = has_discard_flag(flags);

    let mut mode_indicators = format!("+{mode}");
    for other in PutBackMode::ALL.into_iter().filter(|m| *m != mode) {
        mode_indicators.push('-');
        mode_indicators.push_str(other.name());
    }
    let mode_text = format!("{mode_indicators}\n{}", mode.description());

    let discard_description = match (mode, discard) {
        (PutBackMode::WithoutReplacement, true) => "抽到的卡放入弃牌区。",
        (PutBackMode::WithoutReplacement, false) => "抽到的卡直接删除。",
        _ => "这套旗帜只在启用旗帜 “不放回” 时有效。",
    };
    let discard_text = format!(
        "{}{}\n{discard_description}",
        if discard { '+' } else { '-' },
        DeckFlag::Discard
    );

    let scope_default_text = if flags.contains(&DeckFlag::ScopeDefault) {
        format!(
            "+领域默认\n本套卡组是本领域的默认卡组，形如 “卡组：{deck} 抽卡” 的命令形式可以简化为 “：抽卡”。"
        )
    } else {
        "-领域默认\n本套卡组不是本领域的默认卡组，因此需要使用完整的命令形式。".to_string()
    };

    [mode_text, discard_text, scope_default_text].join("\n\n")
}
