//! dq: a dice-pool game played over chat.
//!
//! Reads chat lines from stdin and prints the engine's replies.
//!
//! ```bash
//! cargo run -p dq -- --save game.json
//! ```

mod headless;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Logs go to stderr so replies on stdout stay clean
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,dq=info,dq_core=info".into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return Ok(());
    }

    let config = headless::parse_config_from_args(&args);
    headless::run_headless(config).await.map_err(|e| e.into())
}

fn print_help() {
    println!("dq - dice-pool game over chat");
    println!();
    println!("USAGE:");
    println!("    dq [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    --save <PATH>     Load this snapshot at startup and save after every reply");
    println!("    --seed <N>        Seed the dice for reproducible rolls");
    println!("    --marker <WORD>   Word every command starts with (default: dq)");
    println!("    -h, --help        Print this help");
    println!();
    println!("ENVIRONMENT:");
    println!("    DQ_SAVE_PATH       Same as --save");
    println!("    DQ_SEED            Same as --seed");
    println!("    DQ_CONFIRM_POLICY  reject (default) or replace a pending confirmation");
    println!("    RUST_LOG           Log filter, written to stderr");
    println!();
    println!("INPUT:");
    println!("    One message per line, as `<sender>: <text>`.");
    println!("    Lines without a sender are sent as `console`. `#quit` exits.");
}
