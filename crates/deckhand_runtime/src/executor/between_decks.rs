//! Copying and moving cards from one deck to another.
//!
//! Received cards keep their description and provider and go to random
//! positions in the receiving deck's draw pile.

use deckhand_engine::Requester;
use deckhand_foundation::{DeckName, Error, Result};
use deckhand_parser::BetweenDecksCommand;

use super::{Context, Outcome, summarize_cards};

pub(super) fn execute(
    ctx: &mut Context<'_>,
    subject: &DeckName,
    object: &DeckName,
    command: BetweenDecksCommand,
) -> Result<Outcome> {
    if subject == object {
        return Err(Error::invalid_input("来源卡组与目标卡组不能相同"));
    }
    let mut source = ctx.load_deck(subject)?;
    let mut target = ctx.load_deck(object)?;
    let policy = ctx.scope.policy()?;

    match command {
        BetweenDecksCommand::AddAllTo => {
            let cards = source.sorted_cards_with_amount();
            target.receive_cards(&cards, &policy, ctx.rng)?;
            let reply = format!(
                "成功将卡组 “{subject}” 中的全部卡牌（共 {} 种、{} 张）添加至卡组 “{object}”。",
                source.total_card_kinds(),
                source.total_cards()
            );
            Ok(Outcome::new(reply).saving_deck(target))
        }
        BetweenDecksCommand::PickAddTo { cards } => {
            let picked = source.cards_for_transfer(&cards)?;
            target.receive_cards(&picked, &policy, ctx.rng)?;
            let summary = summarize_cards(picked.into_iter().map(|(card, n)| (card.name, n)));
            Ok(Outcome::new(format!(
                "成功将卡组 “{subject}” 中的 {summary} 添加至卡组 “{object}”。"
            ))
            .saving_deck(target))
        }
        BetweenDecksCommand::PickTransferTo { cards } => {
            let requester = Requester {
                user: &ctx.sender,
                is_admin: ctx.sender_is_admin()?,
            };
            let taken = source.take_cards(&cards, requester, ctx.rng)?;
            target.receive_cards(&taken, &policy, ctx.rng)?;
            let summary = summarize_cards(taken.into_iter().map(|(card, n)| (card.name, n)));
            Ok(Outcome::new(format!(
                "成功将 {summary} 从卡组 “{subject}” 转移至卡组 “{object}”。"
            ))
            .saving_deck(source)
            .saving_deck(target))
        }
    }
}
