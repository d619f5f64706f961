//! Conversations that outlive the process, stored with [`FileRepo`].

use deckhand_foundation::UserId;
use deckhand_runtime::{RuntimeConfig, TextInput};
use deckhand_storage::FileRepo;
use tempfile::TempDir;

fn session(dir: &TempDir, seed: u64) -> TextInput<FileRepo> {
    let config = RuntimeConfig::local()
        .with_seed(seed)
        .with_data_dir(dir.path());
    let repo = FileRepo::open(dir.path()).unwrap();
    TextInput::new(config, repo)
}

fn say(input: &mut TextInput<FileRepo>, text: &str) -> String {
    let group = input.config().group.clone();
    let sender = UserId::from("本地用户");
    input.handle(&group, &sender, text).unwrap().text
}

#[test]
fn decks_survive_a_restart() {
    let dir = TempDir::new().unwrap();

    let mut first = session(&dir, 1);
    say(&mut first, "卡组：塔罗 创建 +不放回\n---\n3#愚者「」\n魔术师「」");
    say(&mut first, "卡组：塔罗 抽卡 2");
    let listed = say(&mut first, "卡组：塔罗 列表");
    let discarded = say(&mut first, "卡组：塔罗 弃牌堆列表");
    drop(first);

    let mut second = session(&dir, 2);
    assert_eq!(say(&mut second, "卡组：塔罗 列表"), listed);
    assert_eq!(say(&mut second, "卡组：塔罗 弃牌堆列表"), discarded);
    assert!(say(&mut second, "卡组列表").contains("塔罗"));
}

#[test]
fn scope_settings_survive_a_restart() {
    let dir = TempDir::new().unwrap();

    let mut first = session(&dir, 1);
    say(&mut first, "卡组：塔罗 创建 +领域默认\n---\n愚者「」");
    drop(first);

    let mut second = session(&dir, 1);
    assert!(say(&mut second, "：抽卡").starts_with("= 抽卡结果 ="));
}

#[test]
fn destroyed_decks_leave_no_file_behind() {
    let dir = TempDir::new().unwrap();

    let mut input = session(&dir, 1);
    say(&mut input, "卡组：塔罗 创建");
    say(&mut input, "卡组：塔罗 销毁");
    drop(input);

    let mut input = session(&dir, 1);
    let reply = say(&mut input, "卡组：塔罗 列表");
    assert!(reply.starts_with("错误：\n"), "{reply}");
}
