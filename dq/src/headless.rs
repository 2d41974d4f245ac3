//! Line-oriented chat loop.
//!
//! Each stdin line is one chat message, written `<sender>: <text>`. Lines
//! without a sender are sent as `console`. Lines starting with `#` are
//! commands for the loop itself.

use dq_core::{
    config::EngineConfig, confirm::ConfirmPolicy, persist, Engine, Message, SavedGame, StoreError,
};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Sender used for lines without a `<sender>:` prefix.
pub const CONSOLE_SENDER: &str = "console";

/// Settings for the chat loop.
#[derive(Debug, Clone, Default)]
pub struct HeadlessConfig {
    /// Snapshot to load at startup and rewrite after every reply.
    pub save_path: Option<PathBuf>,

    pub engine: EngineConfig,
}

/// Run the chat loop until stdin closes or `#quit` is read.
pub async fn run_headless(config: HeadlessConfig) -> Result<(), StoreError> {
    let store = match &config.save_path {
        Some(path) => persist::load_or_default(path).await?,
        None => Default::default(),
    };
    let mut engine = Engine::new(store, config.engine.clone());
    info!(save_path = ?config.save_path, marker = %engine.config().marker, "dq ready");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                eprintln!("Error reading input: {e}");
                break;
            }
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(command) = line.strip_prefix('#') {
            let parts: Vec<&str> = command.split_whitespace().collect();
            match parts.first().copied() {
                Some("quit") | Some("exit") => break,
                Some("save") => {
                    let path = parts.get(1).map(PathBuf::from).or_else(|| config.save_path.clone());
                    match path {
                        Some(path) => match save(&engine, &path).await {
                            Ok(()) => println!("[SAVED] Game saved to {}", path.display()),
                            Err(e) => println!("[ERROR] Save failed: {e}"),
                        },
                        None => println!("[ERROR] Usage: #save <path>"),
                    }
                }
                Some("help") => print_help(),
                _ => println!("[ERROR] Unknown command. Type #help for help."),
            }
            stdout.flush().ok();
            continue;
        }

        let message = split_sender(line);
        let Some(reply) = engine.handle(&message) else {
            continue;
        };

        println!("[{}] {reply}", message.sender);
        stdout.flush().ok();

        if let Some(path) = &config.save_path {
            if let Err(e) = save(&engine, path).await {
                warn!(error = %e, path = %path.display(), "autosave failed");
            }
        }
    }

    Ok(())
}

async fn save(engine: &Engine, path: &Path) -> Result<(), StoreError> {
    SavedGame::new(engine.store().clone()).save_json(path).await
}

/// Split `<sender>: <text>`. A prefix containing whitespace is part of the
/// text, not a sender.
pub fn split_sender(line: &str) -> Message {
    match line.split_once(':') {
        Some((sender, text)) if !sender.is_empty() && !sender.contains(char::is_whitespace) => {
            Message::new(sender, text.trim())
        }
        _ => Message::new(CONSOLE_SENDER, line),
    }
}

fn print_help() {
    println!("[HELP]");
    println!("  <sender>: <text>  - Send a chat message as <sender>");
    println!("  <text>            - Send a chat message as {CONSOLE_SENDER}");
    println!("  #save [path]      - Save the game");
    println!("  #quit             - Exit");
}

/// Build the loop configuration from environment variables, then let
/// command line flags override them.
pub fn parse_config_from_args(args: &[String]) -> HeadlessConfig {
    let mut config = HeadlessConfig::default();

    if let Ok(path) = std::env::var("DQ_SAVE_PATH") {
        config.save_path = Some(PathBuf::from(path));
    }
    if let Ok(policy) = std::env::var("DQ_CONFIRM_POLICY") {
        match ConfirmPolicy::parse(&policy) {
            Some(policy) => config.engine.confirm_policy = policy,
            None => warn!(%policy, "unknown DQ_CONFIRM_POLICY, keeping the default"),
        }
    }
    if let Ok(seed) = std::env::var("DQ_SEED") {
        match seed.parse() {
            Ok(seed) => config.engine.seed = Some(seed),
            Err(_) => warn!(%seed, "DQ_SEED is not a number, ignoring it"),
        }
    }

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--save" => {
                if let Some(path) = args.get(i + 1) {
                    config.save_path = Some(PathBuf::from(path));
                    i += 1;
                }
            }
            "--seed" => {
                if let Some(seed) = args.get(i + 1).and_then(|s| s.parse().ok()) {
                    config.engine.seed = Some(seed);
                    i += 1;
                }
            }
            "--marker" => {
                if let Some(marker) = args.get(i + 1) {
                    config.engine.marker = marker.clone();
                    i += 1;
                }
            }
            _ => {}
        }
        i += 1;
    }

    config
}
