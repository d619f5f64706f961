//! Attribute-setter and flag-setter parsing.

use deckhand_foundation::{AttributeSetters, FlagSetters};

use crate::text::split_head;

const MISSING_FLAG_NAME: &str = "“+” 或 “-” 之后应跟随旗帜名";
const MISSING_SIGIL: &str = "旗帜设置器应以 “+” 或 “-” 开头";

/// Parses `name value` lines into ordered attribute setters.
///
/// Lines are trimmed and blank lines skipped. A line with only a name clears
/// that attribute.
///
/// # Errors
///
/// Returns a message when a name appears twice.
pub fn parse_attribute_setters<'a>(
    lines: impl IntoIterator<Item = &'a str>,
) -> Result<AttributeSetters, String> {
    let mut setters = AttributeSetters::new();
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (name, value) = split_head(line);
        let value = value.map(str::trim).map(str::to_string);
        setters
            .insert(name, value)
            .map_err(|name| format!("属性「{name}」出现多次"))?;
    }
    Ok(setters)
}

/// Parses a run of `+name` / `-name` tokens.
///
/// Tokens may be adjacent (`+a-b`) or separated by whitespace.
///
/// # Errors
///
/// Returns a message when a sigil has no name or a name has no sigil.
pub fn parse_flag_setters(text: &str) -> Result<FlagSetters, String> {
    let mut setters = Vec::new();
    let mut pending = String::new();

    for ch in text.chars() {
        if ch.is_whitespace() {
            if pending.is_empty() {
                continue;
            }
            if is_lone_sigil(&pending) {
                return Err(MISSING_FLAG_NAME.to_string());
            }
            setters.push(std::mem::take(&mut pending));
        } else if ch == '+' || ch == '-' {
            if is_lone_sigil(&pending) {
                return Err(MISSING_FLAG_NAME.to_string());
            }
            if !pending.is_empty() {
                setters.push(std::mem::take(&mut pending));
            }
            pending.push(ch);
        } else if pending.is_empty() {
            return Err(MISSING_SIGIL.to_string());
        } else {
            pending.push(ch);
        }
    }

    if is_lone_sigil(&pending) {
        return Err(MISSING_FLAG_NAME.to_string());
    }
    if !pending.is_empty() {
        setters.push(pending);
    }
    Ok(setters)
}

fn is_lone_sigil(pending: &str) -> bool {
    pending.chars().count() == 1
}
