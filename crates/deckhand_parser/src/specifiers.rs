//! Card specifiers: `愚者`, `3#愚者`, `全部#愚者`.

use deckhand_foundation::{Amount, CardSpecifier, MAX_AMOUNT};

/// Parses whitespace-separated card specifiers.
///
/// Only `<digits>#` and `全部#` prefixes are amounts. Any other token,
/// including one with a `#` in the middle, is taken whole as the name.
///
/// # Errors
///
/// Returns a message for an amount without a name or an amount that is too
/// large.
pub fn parse_card_specifiers(text: &str) -> Result<Vec<CardSpecifier>, String> {
    text.split_whitespace()
        .enumerate()
        .map(|(i, token)| parse_one(i + 1, token))
        .collect()
}

fn parse_one(index: usize, token: &str) -> Result<CardSpecifier, String> {
    let Some((prefix, name)) = token.split_once('#') else {
        return Ok(CardSpecifier::new(token, Amount::Default));
    };

    let amount = if prefix == "全部" {
        Amount::All
    } else if !prefix.is_empty() && prefix.chars().all(|c| c.is_ascii_digit()) {
        match prefix.parse::<u64>() {
            Ok(n) if n <= MAX_AMOUNT => Amount::Exactly(n),
            _ => return Err(format!("第 {index} 张卡指定的数量过大")),
        }
    } else {
        return Ok(CardSpecifier::new(token, Amount::Default));
    };

    if name.is_empty() {
        return Err(format!("无法理解第 {index} 张卡 “{token}”"));
    }
    Ok(CardSpecifier::new(name, amount))
}
