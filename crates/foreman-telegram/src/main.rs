//! Pocket Foreman Telegram bot binary.
//!
//! Start the bot with:
//! ```bash
//! TELEGRAM_BOT_TOKEN=xxx NOTION_TOKEN=yyy NOTION_DATABASE_ID=zzz cargo run -p foreman-telegram
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use foreman_core::config;
use foreman_runtime::WatcherConfig;
use foreman_telegram::{BotConfig, ForemanBot};
use tracing_subscriber::EnvFilter;

/// Pocket Foreman - construction tasks and photo journal from Telegram
#[derive(Parser, Debug)]
#[command(name = "foreman-telegram")]
#[command(about = "Telegram bot that logs construction tasks and site photos")]
struct Args {
    /// Outline file describing the project structure
    #[arg(short, long, env = "STRUCTURE_FILE")]
    structure: Option<PathBuf>,

    /// Check the outline once at startup instead of watching it
    #[arg(long)]
    no_watch: bool,

    /// How often the outline file is polled, in milliseconds
    #[arg(long, default_value = "2000")]
    watch_interval_ms: u64,

    /// Quiet period after an outline edit before detection runs, in milliseconds
    #[arg(long, default_value = "1500")]
    debounce_ms: u64,

    /// Verbose logging (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from config directory first
    let env_path = config::env_file();
    if env_path.exists() {
        let _ = dotenvy::from_path(&env_path);
    }
    let _ = dotenvy::from_filename(".env.local").or_else(|_| dotenvy::dotenv());

    let args = Args::parse();

    let filter = match args.verbose {
        0 => "foreman_telegram=info,teloxide=warn",
        1 => "foreman_telegram=debug,foreman_runtime=debug,foreman_core=debug,teloxide=info",
        2 => "foreman_telegram=trace,foreman_runtime=trace,foreman_core=trace,foreman_remote=trace,teloxide=debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = config::ensure_all_dirs() {
        tracing::warn!(error = %e, "Failed to create all directories");
    }

    let mut bot_config = BotConfig::from_env()?;
    if let Some(path) = args.structure {
        bot_config = bot_config.with_structure_file(path);
    }
    let structure = bot_config.structure_file.clone();

    let watcher = WatcherConfig::new()
        .with_poll_interval(Duration::from_millis(args.watch_interval_ms))
        .with_debounce(Duration::from_millis(args.debounce_ms));

    let mut bot = ForemanBot::new(bot_config, watcher)?;

    match bot.get_me().await {
        Ok(username) => {
            tracing::info!(username = %username, "Bot initialized successfully");
            println!("\n[foreman] Pocket Foreman Telegram Bot");
            println!("   Bot: @{}", username);
            println!("   Structure: {}", structure.display());
            println!("   Watch: {}", if args.no_watch { "off" } else { "on" });
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to get bot info");
            return Err(e.into());
        }
    }

    println!("\n[phone] Open Telegram and send /start to begin");
    println!("   Press Ctrl+C to stop\n");

    bot.start_polling(!args.no_watch).await?;

    Ok(())
}
