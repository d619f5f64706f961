//! `卡组概览`, `卡组帮助`, `卡组列表`, `卡组领域设置`.

use deckhand_foundation::{DeckName, Error, ErrorKind, Result};
use deckhand_parser::{PluginCommand, help_text};
use deckhand_storage::Scope;

use super::{Context, Outcome};
use crate::config::{HOMEPAGE, RuntimeConfig};

pub(super) fn execute(ctx: &mut Context<'_>, command: PluginCommand) -> Result<Outcome> {
    match command {
        PluginCommand::Overview => Ok(Outcome::new(overview_text(ctx.config, Some(&ctx.scope)))),
        PluginCommand::Help { filters } => help(ctx, filters.as_deref()),
        PluginCommand::List => list(ctx),
        PluginCommand::ScopeSettings { attribute_setters } => {
            // Non-admins must not learn which decks exist from the reply.
            if !ctx.scope.is_admin(&ctx.sender)? {
                return Err(Error::permission_denied("只有管理员可以改变领域的属性"));
            }
            for (name, value) in attribute_setters.iter() {
                if name == "默认卡组" {
                    if let Some(deck) = value.map(str::trim).filter(|v| !v.is_empty()) {
                        let deck = DeckName::from(deck);
                        if !ctx.scope.has_deck(&deck) {
                            return Err(ErrorKind::DeckNotFound {
                                scope: ctx.scope.id().clone(),
                                deck,
                            }
                            .into());
                        }
                    }
                }
                ctx.scope.set_attribute(name, value, &ctx.sender)?;
            }
            let reply = format!(
                "成功更新领域 “{}” 的设置。当前属性：\n{}",
                ctx.scope.id(),
                ctx.scope.attributes_text()
            );
            Ok(Outcome::new(reply).saving_scope(&ctx.scope))
        }
    }
}

fn help(ctx: &Context<'_>, filters: Option<&[String]>) -> Result<Outcome> {
    match help_text(&ctx.config.root_prefix, filters) {
        Ok(text) => Ok(Outcome::new(text)),
        Err(unknown) => Err(Error::invalid_input(format!(
            "未知帮助条目：\n{}",
            unknown.join("\n")
        ))),
    }
}

fn list(ctx: &Context<'_>) -> Result<Outcome> {
    let decks = ctx.scope.decks();
    let mut lines = vec![format!(
        "领域 “{}” 现有卡组（共 {} 套）：",
        ctx.scope.id(),
        decks.len()
    )];
    for name in decks {
        let description = ctx
            .repo
            .load_deck_data(ctx.scope.id(), name)?
            .and_then(|data| data.attributes.get("描述").cloned())
            .unwrap_or_default();
        lines.push(format!("{name}：{description}"));
    }
    Ok(Outcome::new(lines.join("\n")))
}

/// The plugin overview. Groups outside every scope only get this.
#[must_use]
pub fn overview_text(config: &RuntimeConfig, scope: Option<&Scope>) -> String {
    let main_admins: Vec<&str> = config.main_admins.iter().map(|a| a.as_str()).collect();
    let mut lines = vec![
        format!("= {}插件 =", config.plugin_name),
        format!("版本：{}", env!("CARGO_PKG_VERSION")),
        format!("主页：{HOMEPAGE}"),
        format!("主管理员：{}", main_admins.join("、")),
        String::new(),
        format!("通过 “{}帮助” 获取插件用法。", config.root_prefix),
        String::new(),
        "== 关于本群 ==".to_string(),
    ];
    match scope {
        Some(scope) => lines.push(format!(
            "所属领域：“{}”（含 {} 个群）",
            scope.id(),
            scope.groups().len()
        )),
        None => lines.push(format!(
            "本群不属于任何领域，将不响应除本命令（“{}”）外的其他命令。",
            config.root_prefix
        )),
    }
    lines.push("若要调整领域设置，请修改运行配置中的领域与群的对应关系。".to_string());
    if let Some(scope) = scope {
        lines.extend([
            String::new(),
            format!("== 关于领域 “{}” ==", scope.id()),
            "=== 属性 ===".to_string(),
            scope.attributes_text(),
        ]);
    }
    lines.join("\n")
}
