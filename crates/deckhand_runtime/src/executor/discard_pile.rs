//! Commands on one deck's discard pile.

use deckhand_foundation::{DeckName, Result};
use deckhand_parser::DeckDiscardPileCommand;

use super::{Context, Outcome};

pub(super) fn execute(
    ctx: &mut Context<'_>,
    name: &DeckName,
    command: DeckDiscardPileCommand,
) -> Result<Outcome> {
    let mut deck = ctx.load_deck(name)?;

    match command {
        DeckDiscardPileCommand::List => Ok(Outcome::new(deck.discard_pile_text())),
        DeckDiscardPileCommand::Recycle { at, cards } => {
            let before = deck.data().discard_pile.len();
            deck.recycle_cards_from_discard_pile(&cards, at, ctx.rng)?;
            let recycled = before - deck.data().discard_pile.len();
            Ok(Outcome::new(format!("已将弃牌堆中的 {recycled} 张卡牌回收至抽牌堆中。"))
                .saving_deck(deck))
        }
        DeckDiscardPileCommand::RecycleAllAndShuffle => {
            deck.recycle_all_and_shuffle(ctx.rng);
            Ok(Outcome::new("已将弃牌堆中的全部卡牌回收至抽牌堆中。").saving_deck(deck))
        }
        DeckDiscardPileCommand::DeleteAll => {
            deck.delete_all_cards_in_discard_pile();
            Ok(Outcome::new("已删除弃牌堆中的全部卡牌。").saving_deck(deck))
        }
    }
}
