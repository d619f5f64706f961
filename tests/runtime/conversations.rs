//! Whole conversations through the text front door, kept in memory.

use deckhand_foundation::{GroupId, UserId};
use deckhand_parser::ReplyDestination;
use deckhand_runtime::{RuntimeConfig, TextInput};
use deckhand_storage::MemoryRepo;

// =============================================================================
// Helpers
// =============================================================================

const ME: &str = "本地用户";
const STRANGER: &str = "路人";

struct Chat {
    input: TextInput<MemoryRepo>,
    group: GroupId,
}

impl Chat {
    fn new() -> Self {
        let config = RuntimeConfig::local().with_seed(42);
        let group = config.group.clone();
        Self {
            input: TextInput::new(config, MemoryRepo::new()),
            group,
        }
    }

    fn say(&mut self, user: &str, text: &str) -> String {
        self.input
            .handle(&self.group, &UserId::from(user), text)
            .unwrap_or_else(|| panic!("no reply to {text:?}"))
            .text
    }

    fn ok(&mut self, user: &str, text: &str) -> String {
        let reply = self.say(user, text);
        assert!(!reply.starts_with("错误："), "{text:?} failed:\n{reply}");
        reply
    }

    fn err(&mut self, user: &str, text: &str) -> String {
        let reply = self.say(user, text);
        assert!(reply.starts_with("错误：\n"), "{text:?} should fail:\n{reply}");
        reply
    }
}

// =============================================================================
// Drawing
// =============================================================================

#[test]
fn drawing_without_replacement_through_the_discard_pile() {
    let mut chat = Chat::new();
    chat.ok(ME, "卡组：塔罗 创建 +不放回\n---\n2#愚者「」\n魔术师「」");

    let drawn = chat.ok(ME, "卡组：塔罗 抽卡 3");
    assert!(drawn.starts_with("= 抽卡结果 =\n\n"));
    assert_eq!(drawn.matches("添加者：").count(), 3);

    let err = chat.err(ME, "卡组：塔罗 抽卡");
    assert!(err.contains("抽卡堆为空"), "{err}");

    let discarded = chat.ok(ME, "卡组：塔罗 弃牌堆列表");
    assert!(discarded.contains("愚者") && discarded.contains("魔术师"), "{discarded}");

    assert_eq!(
        chat.ok(ME, "卡组：塔罗 弃牌堆 回收 愚者"),
        "已将弃牌堆中的 1 张卡牌回收至抽牌堆中。"
    );
    chat.ok(ME, "卡组：塔罗 弃牌堆 回收全部并洗牌");

    let listed = chat.ok(ME, "卡组：塔罗 列表");
    assert!(listed.starts_with("卡组 “塔罗” 现有卡牌（共 2 种、3 张）"), "{listed}");
    assert_eq!(chat.ok(ME, "卡组：塔罗 抽卡 3").matches("添加者：").count(), 3);
}

#[test]
fn deleting_cards_without_discard_pile_shrinks_the_deck() {
    let mut chat = Chat::new();
    chat.ok(ME, "卡组：塔罗 创建 +不放回 -弃牌堆\n---\n3#愚者「」");
    chat.ok(ME, "卡组：塔罗 抽卡 2");
    assert!(chat.ok(ME, "卡组：塔罗 列表").contains("共 1 种、1 张"));
    assert_eq!(chat.ok(ME, "卡组：塔罗 删除 愚者"), "成功删除 “1#愚者” 总计 1 种、1 张卡牌。");
    assert!(chat.ok(ME, "卡组：塔罗 列表").contains("共 0 种、0 张"));
}

#[test]
fn private_draws_go_to_the_sender() {
    let mut chat = Chat::new();
    chat.ok(ME, "卡组：塔罗 创建\n---\n愚者「」");
    let group = chat.group.clone();
    let reply = chat
        .input
        .handle(&group, &UserId::from(STRANGER), "卡组：塔罗 抽卡至私聊")
        .unwrap();
    assert_eq!(reply.destination, ReplyDestination::SenderPrivate);
}

// =============================================================================
// Permissions
// =============================================================================

#[test]
fn only_owners_and_admins_manage_a_deck() {
    let mut chat = Chat::new();
    chat.ok(ME, "卡组：塔罗 创建\n---\n愚者「」");

    let denied = chat.err(STRANGER, "卡组：塔罗 销毁");
    assert!(denied.contains("只有本卡组的主拥有者"), "{denied}");
    chat.err(STRANGER, "卡组：塔罗 窥视");
    chat.err(STRANGER, "卡组：塔罗 导出");
    chat.ok(STRANGER, "卡组：塔罗 抽卡");

    chat.ok(STRANGER, "卡组：塔罗 克隆为 路人塔罗");
    assert_eq!(chat.ok(STRANGER, "卡组：路人塔罗 销毁"), "成功销毁卡组 “路人塔罗”。");
}

#[test]
fn scope_admins_are_configured_by_main_admins() {
    let mut chat = Chat::new();
    chat.ok(ME, "卡组：塔罗 创建");
    chat.err(STRANGER, "卡组领域设置\n管理员 [\"路人\"]");
    chat.ok(ME, "卡组领域设置\n管理员 [\"路人\"]");
    chat.ok(STRANGER, "卡组：塔罗 销毁");
    assert!(chat.ok(ME, "卡组列表").contains("共 0 套"));
}

#[test]
fn scope_settings_do_not_reveal_deck_names_to_outsiders() {
    let mut chat = Chat::new();
    chat.ok(ME, "卡组：塔罗 创建");

    let existing = chat.err(STRANGER, "卡组领域设置\n默认卡组 塔罗");
    let missing = chat.err(STRANGER, "卡组领域设置\n默认卡组 不存在");
    assert!(existing.contains("只有管理员可以改变领域的属性"), "{existing}");
    assert_eq!(existing, missing);

    chat.err(ME, "卡组领域设置\n默认卡组 不存在");
    chat.ok(ME, "卡组领域设置\n默认卡组 塔罗");
}

#[test]
fn capacity_limits_adding_and_drawing() {
    let mut chat = Chat::new();
    chat.ok(ME, "卡组领域设置\n卡组卡牌上限 3");
    let err = chat.err(ME, "卡组：塔罗 创建\n---\n4#愚者「」");
    assert!(err.contains("塔罗"), "{err}");
    assert!(chat.err(ME, "卡组：塔罗 列表").contains("不存在卡组 “塔罗”"));

    chat.ok(ME, "卡组：塔罗 创建\n---\n3#愚者「」");
    chat.err(ME, "卡组：塔罗 添加 愚者「」");
    chat.err(ME, "卡组：塔罗 抽卡 4");
}

// =============================================================================
// Between Decks
// =============================================================================

#[test]
fn moving_and_copying_cards_between_decks() {
    let mut chat = Chat::new();
    chat.ok(ME, "卡组：甲 创建\n---\n2#愚者「流浪」\n魔术师「」");
    chat.ok(ME, "卡组：乙 创建");

    assert_eq!(
        chat.ok(ME, "卡组：甲 挑选转移至 乙 愚者"),
        "成功将 “1#愚者” 总计 1 种、1 张卡牌 从卡组 “甲” 转移至卡组 “乙”。"
    );
    assert!(chat.ok(ME, "卡组：乙 列表").contains("1#愚者：流浪"));

    chat.ok(ME, "卡组：甲 全部添加至 乙");
    assert!(chat.ok(ME, "卡组：乙 列表").contains("共 2 种、3 张"));
    assert!(chat.ok(ME, "卡组：甲 列表").contains("共 2 种、2 张"));

    chat.err(ME, "卡组：甲 全部添加至 甲");
}

// =============================================================================
// Deck Existence
// =============================================================================

#[test]
fn export_then_import_reproduces_the_deck() {
    let mut chat = Chat::new();
    chat.ok(ME, "卡组：塔罗 创建 +放回不独立\n描述 大阿卡纳\n---\n2#愚者「流浪」\n魔术师「一手指天」");
    let exported = chat.ok(ME, "卡组：塔罗 导出");

    let imported = chat.ok(ME, &format!("卡组：副本 导入创建 {exported}"));
    assert!(imported.starts_with("成功导入卡组 “副本”"), "{imported}");

    let original = chat.ok(ME, "卡组：塔罗 列表");
    let copy = chat.ok(ME, "卡组：副本 列表");
    assert_eq!(original.lines().skip(1).collect::<Vec<_>>(), copy.lines().skip(1).collect::<Vec<_>>());

    chat.err(ME, &format!("卡组：副本 导入创建 {exported}"));
    chat.err(ME, "卡组：坏 导入创建 {\"mainOwner\": \"x\"}");
}

#[test]
fn importing_inconsistent_flags_is_rejected() {
    let mut chat = Chat::new();
    let deck = |flags: &str, discard_pile: &str| {
        format!(
            "{{\"mainOwner\": \"{ME}\", \"flags\": [{flags}], \
             \"cards\": {{\"愚者\": {{\"referenceCount\": 1, \"description\": \"\", \"providerID\": \"{ME}\"}}}}, \
             \"drawPile\": [{}], \"discardPile\": [{discard_pile}]}}",
            if discard_pile.is_empty() { "\"愚者\"" } else { "" }
        )
    };

    for (flags, discard_pile, expected) in [
        ("\"放回\", \"弃牌堆\"", "", "只有启用旗帜 “不放回” 时"),
        ("", "", "实际启用了 0 个"),
        ("\"放回\", \"不放回\"", "", "实际启用了 2 个"),
        ("\"放回\"", "\"愚者\"", "弃牌堆应为空"),
    ] {
        let err = chat.err(ME, &format!("卡组：坏 导入创建 {}", deck(flags, discard_pile)));
        assert!(err.contains(expected), "{flags}: {err}");
    }
    assert!(chat.ok(ME, "卡组列表").contains("共 0 套"));

    chat.ok(ME, "卡组：塔罗 创建");
    chat.err(ME, &format!("卡组：塔罗 导入覆盖 {}", deck("\"放回\", \"弃牌堆\"", "")));

    let imported = chat.ok(ME, &format!("卡组：好 导入创建 {}", deck("\"不放回\", \"弃牌堆\"", "\"愚者\"")));
    assert!(imported.starts_with("成功导入卡组 “好”"), "{imported}");
}

#[test]
fn renaming_the_default_deck_keeps_the_shorthand_working() {
    let mut chat = Chat::new();
    chat.ok(ME, "卡组：塔罗 创建 +领域默认\n---\n愚者「」");
    assert!(chat.ok(ME, "：抽卡").starts_with("= 抽卡结果 ="));

    chat.ok(ME, "卡组：塔罗 重命名为 新塔罗");
    assert!(chat.ok(ME, "：抽卡").starts_with("= 抽卡结果 ="));
    chat.err(ME, "卡组：塔罗 列表");

    chat.ok(ME, "卡组：新塔罗 销毁");
    assert_eq!(
        chat.input.handle(&chat.group, &UserId::from(ME), "：抽卡"),
        None
    );
}

#[test]
fn hand_commands_are_not_supported_yet() {
    let mut chat = Chat::new();
    chat.ok(ME, "卡组：塔罗 创建");
    let err = chat.err(ME, "卡组：塔罗 手牌列表");
    assert!(err.contains("手牌功能尚未实现"), "{err}");
}
