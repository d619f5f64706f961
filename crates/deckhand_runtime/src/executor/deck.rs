//! Commands on one deck's draw pile and settings.

use deckhand_engine::{Card, Requester};
use deckhand_foundation::{DeckName, Error, Result};
use deckhand_parser::DeckCommand;

use super::{Context, Outcome, summarize_cards};

pub(super) fn execute(ctx: &mut Context<'_>, name: &DeckName, command: DeckCommand) -> Result<Outcome> {
    let mut deck = ctx.load_deck(name)?;
    let is_default = ctx.scope.is_default_deck(name);

    match command {
        DeckCommand::Overview => Ok(Outcome::new(deck.summary_text(is_default))),
        DeckCommand::List => Ok(Outcome::new(deck.list_text())),
        DeckCommand::View { cards } => Ok(Outcome::new(deck.card_text(&cards))),
        DeckCommand::Settings {
            flag_setters,
            attribute_setters,
        } => {
            if flag_setters.is_empty() && attribute_setters.is_empty() {
                return Err(Error::invalid_input(format!(
                    "需要至少提供一项要更新的设置\n\n（如要查看卡组现有设置，发送 “{}：{name} 概览”。）",
                    ctx.config.root_prefix
                )));
            }

            let mut now_default = is_default;
            if !flag_setters.is_empty() {
                now_default = deck
                    .update_flags(&flag_setters, is_default, ctx.rng)?
                    .is_scope_default;
            }
            if !attribute_setters.is_empty() {
                deck.update_attributes(&attribute_setters)?;
            }

            let reply = format!(
                "成功更新卡组 “{name}” 设置：\n\n{}",
                deck.summary_text(now_default)
            );
            let outcome = if now_default == is_default {
                Outcome::new(reply)
            } else {
                let default = now_default.then_some(name);
                ctx.scope.set_default_deck(default, &ctx.sender)?;
                Outcome::new(reply).saving_scope(&ctx.scope)
            };
            Ok(outcome.saving_deck(deck))
        }
        DeckCommand::Add { at, cards } => {
            deck.add_cards(&cards, at, &ctx.sender, &ctx.scope.policy()?, ctx.rng)?;
            let summary = summarize_cards(cards.iter().map(|c| (c.name.clone(), c.count())));
            Ok(Outcome::new(format!("成功添加 {summary}。")).saving_deck(deck))
        }
        DeckCommand::Delete { cards } => {
            let requester = Requester {
                user: &ctx.sender,
                is_admin: ctx.sender_is_admin()?,
            };
            let removed = deck.take_cards(&cards, requester, ctx.rng)?;
            let summary = summarize_cards(removed.into_iter().map(|(card, n)| (card.name, n)));
            Ok(Outcome::new(format!("成功删除 {summary}。")).saving_deck(deck))
        }
        DeckCommand::Shuffle => {
            deck.shuffle(ctx.rng);
            Ok(Outcome::new("已完成洗牌。").saving_deck(deck))
        }
        DeckCommand::RecycleAllAndShuffle => {
            deck.recycle_all_and_shuffle(ctx.rng);
            Ok(Outcome::new("已将弃牌堆中的全部卡牌回收至抽牌堆中，并完成洗牌。").saving_deck(deck))
        }
        DeckCommand::Draw { to, amount } => {
            let n = amount.unwrap_or(1);
            ctx.ensure_amount_within_capacity(n)?;
            let drawn = deck.draw(n, ctx.rng)?;
            Ok(Outcome::new(format!("= 抽卡结果 =\n\n{}", full_texts(&drawn)))
                .to(to)
                .saving_deck(deck))
        }
        DeckCommand::Peek { to, amount } => {
            let n = amount.unwrap_or(1);
            ctx.ensure_owner_or_admin(&deck, "窥视")?;
            ctx.ensure_amount_within_capacity(n)?;
            let seen = deck.peek(n)?;
            Ok(Outcome::new(format!("= 窥视结果（自顶部起） =\n\n{}", full_texts(&seen))).to(to))
        }
    }
}

fn full_texts(cards: &[Card]) -> String {
    cards
        .iter()
        .map(Card::full_text)
        .collect::<Vec<_>>()
        .join("\n\n---\n")
}
