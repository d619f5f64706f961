//! Creating, destroying, exporting, importing, cloning, and renaming decks.

use deckhand_engine::{Deck, DeckData};
use deckhand_foundation::{DeckName, Error, ErrorKind, Placement, Result};
use deckhand_parser::{DeckExistenceCommand, ImportMode};
use tracing::debug;

use super::{Context, Outcome};

pub(super) fn execute(
    ctx: &mut Context<'_>,
    name: DeckName,
    command: DeckExistenceCommand,
) -> Result<Outcome> {
    if name.as_str().starts_with('.') {
        return Err(Error::unsupported("个人卡组尚未实现"));
    }

    match command {
        DeckExistenceCommand::Create {
            flag_setters,
            attribute_setters,
            cards,
            keeps_order,
        } => {
            ctx.scope.declare_deck(&name)?;
            let mut deck = Deck::new(name.clone(), DeckData::new(ctx.sender.clone()));

            if !flag_setters.is_empty() {
                let change = deck.update_flags(&flag_setters, false, ctx.rng)?;
                if change.is_scope_default {
                    ctx.scope.set_default_deck(Some(&name), &ctx.sender)?;
                }
            }
            if !attribute_setters.is_empty() {
                deck.update_attributes(&attribute_setters)?;
            }
            let at = keeps_order.then_some(Placement::Top);
            deck.add_cards(&cards, at, &ctx.sender, &ctx.scope.policy()?, ctx.rng)?;

            let reply = format!(
                "成功创建卡组 “{name}”：\n\n{}",
                deck.summary_text(ctx.scope.is_default_deck(&name))
            );
            Ok(Outcome::new(reply).saving_scope(&ctx.scope).saving_deck(deck))
        }
        DeckExistenceCommand::Import {
            mode: ImportMode::Create,
            data,
        } => {
            let mut data = imported_data(ctx, data)?;
            ctx.scope.declare_deck(&name)?;
            data.main_owner = ctx.sender.clone();
            let deck = Deck::new(name.clone(), data);
            let reply = format!(
                "成功导入卡组 “{name}”：\n\n{}",
                deck.summary_text(ctx.scope.is_default_deck(&name))
            );
            Ok(Outcome::new(reply).saving_scope(&ctx.scope).saving_deck(deck))
        }
        command => {
            let deck = ctx.load_deck(&name)?;
            execute_on_existing(ctx, deck, command)
        }
    }
}

fn execute_on_existing(
    ctx: &mut Context<'_>,
    deck: Deck,
    command: DeckExistenceCommand,
) -> Result<Outcome> {
    let name = deck.name().clone();
    match command {
        DeckExistenceCommand::Destroy => {
            ctx.ensure_owner_or_admin(&deck, "销毁")?;
            ctx.scope.revoke_deck(&name)?;
            Ok(Outcome::new(format!("成功销毁卡组 “{name}”。"))
                .saving_scope(&ctx.scope)
                .deleting_deck(name))
        }
        DeckExistenceCommand::Export => {
            ctx.ensure_owner_or_admin(&deck, "导出")?;
            let json = serde_json::to_string_pretty(deck.data())
                .map_err(|e| Error::new(ErrorKind::Serialization(e.to_string())))?;
            Ok(Outcome::new(json))
        }
        DeckExistenceCommand::Import {
            mode: ImportMode::Overwrite,
            data,
        } => {
            ctx.ensure_owner_or_admin(&deck, "覆盖")?;
            let mut data = imported_data(ctx, data)?;
            data.main_owner = deck.main_owner().clone();
            let deck = Deck::new(name.clone(), data);
            let reply = format!(
                "成功以导入的数据覆盖卡组 “{name}”：\n\n{}",
                deck.summary_text(ctx.scope.is_default_deck(&name))
            );
            Ok(Outcome::new(reply).saving_deck(deck))
        }
        DeckExistenceCommand::CloneTo { destination } => {
            ctx.scope.declare_deck(&destination)?;
            let mut data = deck.into_data();
            data.main_owner = ctx.sender.clone();
            let copy = Deck::new(destination.clone(), data);
            debug!(from = %name, to = %destination, "cloned deck");
            Ok(Outcome::new(format!("成功将卡组 “{name}” 克隆为 “{destination}”。"))
                .saving_scope(&ctx.scope)
                .saving_deck(copy))
        }
        DeckExistenceCommand::RenameTo { destination } => {
            ctx.ensure_owner_or_admin(&deck, "重命名")?;
            ctx.scope.rename_deck(&name, &destination)?;
            let mut deck = deck;
            deck.set_name(destination.clone());
            Ok(Outcome::new(format!("成功将卡组 “{name}” 重命名为 “{destination}”。"))
                .saving_scope(&ctx.scope)
                .saving_deck(deck)
                .deleting_deck(name))
        }
        DeckExistenceCommand::Create { .. }
        | DeckExistenceCommand::Import {
            mode: ImportMode::Create,
            ..
        } => unreachable!("creating commands never address an existing deck"),
    }
}

/// Decodes exported data and checks it against the scope's limit.
fn imported_data(ctx: &Context<'_>, value: serde_json::Value) -> Result<DeckData> {
    let data: DeckData = serde_json::from_value(value)
        .map_err(|e| Error::invalid_input(format!("导入的卡组数据无效：{e}")))?;
    data.validate()?;

    let total: u64 = data.cards.values().map(|e| e.reference_count).sum();
    let limit = ctx.scope.max_cards_per_deck()?;
    if total > limit {
        return Err(Error::invalid_input(format!(
            "导入的卡组共有 {total} 张卡牌，超过领域 “{}” 所允许的上限 {limit} 张",
            ctx.scope.id()
        )));
    }
    Ok(data)
}
