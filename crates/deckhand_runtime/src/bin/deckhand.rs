//! Deckhand CLI entry point.

use deckhand_runtime::{Repl, RuntimeConfig, TextInput, init_logging, format_reply};
use deckhand_storage::{FileRepo, MemoryRepo, Repo};
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

/// CLI configuration parsed from arguments.
#[derive(Default)]
struct CliConfig {
    show_help: bool,
    show_version: bool,
    data_dir: Option<PathBuf>,
    seed: Option<u64>,
    sender: Option<String>,
    group: Option<String>,
    admins: Vec<String>,
    log_level: Option<String>,
    commands: Vec<String>,
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31m错误：{e}\x1b[0m");
            ExitCode::FAILURE
        }
    }
}

fn value(args: &[String], i: usize, flag: &str) -> Result<String, Box<dyn std::error::Error>> {
    args.get(i)
        .cloned()
        .ok_or_else(|| format!("{flag} requires a value").into())
}

fn parse_args(args: Vec<String>) -> Result<CliConfig, Box<dyn std::error::Error>> {
    let mut config = CliConfig::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => config.show_help = true,
            "-V" | "--version" => config.show_version = true,
            flag @ ("--data" | "--seed" | "--sender" | "--group" | "--admin" | "--log-level"
            | "-c") => {
                i += 1;
                let v = value(&args, i, flag)?;
                match flag {
                    "--data" => config.data_dir = Some(PathBuf::from(v)),
                    "--seed" => {
                        config.seed = Some(
                            v.parse()
                                .map_err(|_| format!("invalid --seed value: {v}"))?,
                        );
                    }
                    "--sender" => config.sender = Some(v),
                    "--group" => config.group = Some(v),
                    "--admin" => config.admins.push(v),
                    "--log-level" => config.log_level = Some(v),
                    _ => config.commands.push(v),
                }
            }
            arg => return Err(format!("unknown option: {arg}").into()),
        }
        i += 1;
    }

    Ok(config)
}

fn runtime_config(cli: &CliConfig) -> RuntimeConfig {
    let mut config = RuntimeConfig::local();
    if let Some(group) = &cli.group {
        config = config.with_group(group.as_str());
    }
    if let Some(sender) = &cli.sender {
        config = config.with_sender(sender.as_str());
    }
    for admin in &cli.admins {
        config = config.with_main_admin(admin.as_str());
    }
    if let Some(dir) = &cli.data_dir {
        config = config.with_data_dir(dir.clone());
    }
    if let Some(seed) = cli.seed {
        config = config.with_seed(seed);
    }
    config
}

fn run(args: Vec<String>) -> Result<(), Box<dyn std::error::Error>> {
    let cli = parse_args(args)?;

    if cli.show_help {
        print_help();
        return Ok(());
    }

    if cli.show_version {
        println!("deckhand {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    init_logging(cli.log_level.as_deref())?;

    let config = runtime_config(&cli);
    match &config.data_dir {
        Some(dir) => {
            let repo = FileRepo::open(dir)?;
            serve(&cli, config, repo)
        }
        None => serve(&cli, config, MemoryRepo::new()),
    }
}

fn serve<R: Repo>(
    cli: &CliConfig,
    config: RuntimeConfig,
    repo: R,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut input = TextInput::new(config, repo);

    // One-shot commands skip the REPL entirely
    if !cli.commands.is_empty() {
        let group = input.config().group.clone();
        let sender = input.config().sender.clone();
        for command in &cli.commands {
            if let Some(reply) = input.handle(&group, &sender, command) {
                println!("{}", format_reply(&reply));
            }
        }
        return Ok(());
    }

    let mut repl = Repl::new(input)?;
    repl.run()?;
    Ok(())
}

fn print_help() {
    println!(
        "\x1b[1mDeckhand\x1b[0m - 聊天卡组

\x1b[1mUSAGE:\x1b[0m
    deckhand [OPTIONS]

\x1b[1mOPTIONS:\x1b[0m
    -h, --help           Print help information
    -V, --version        Print version information
    --data DIR           Store scopes and decks under DIR (default: in memory)
    --seed N             Seed the random source
    --sender ID          Speak as user ID (default: 本地用户)
    --group ID           Speak in group ID (default: 本地)
    --admin ID           Add a main admin (repeatable)
    --log-level FILTER   Log filter, such as debug or deckhand_engine=trace
    -c MESSAGE           Send MESSAGE and exit (repeatable)

\x1b[1mEXAMPLES:\x1b[0m
    deckhand                                  Start interactive REPL
    deckhand --data ./decks                   Keep decks between runs
    deckhand -c '卡组：塔罗 创建' -c '卡组列表'   Send two messages

\x1b[1mREPL COMMANDS:\x1b[0m
    <blank line>         Send the message typed so far
    /as ID               Speak as another user
    /in ID               Speak in another group
    /quit                Exit REPL
    Ctrl+D               Exit REPL
    Ctrl+C               Cancel current input

For more information, visit {}",
        deckhand_runtime::HOMEPAGE
    );
}
