mod gateway;
mod publisher;

use clap::{Parser, Subcommand};
use herald_core::config;
use herald_telegram::TelegramTransport;
use std::sync::Arc;

#[derive(Parser)]
#[command(
    name = "herald",
    version,
    about = "Herald — Telegram channel-posting assistant"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file.
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the posting assistant.
    Start,
    /// Check configuration without connecting.
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match cli.command {
        Commands::Start => {
            let cfg = config::load(&cli.config)?;

            if cfg.telegram.bot_token.is_empty() {
                anyhow::bail!(
                    "bot_token is empty. Set it in config.toml or the \
                     TELEGRAM_BOT_TOKEN env var."
                );
            }
            if cfg.telegram.operator_id == 0 {
                anyhow::bail!("operator_id is not set. Put your Telegram user id in config.toml.");
            }
            if cfg.telegram.channel_id == 0 {
                anyhow::bail!("channel_id is not set. Put the target channel id in config.toml.");
            }

            let transport = Arc::new(TelegramTransport::new(&cfg.telegram));

            println!("Herald — starting posting assistant...");
            let mut gw = gateway::Gateway::new(transport, &cfg.telegram);
            gw.run().await?;
        }
        Commands::Status => {
            let cfg = config::load(&cli.config)?;
            println!("Herald — Status Check\n");
            println!("Config: {}", cli.config);
            println!(
                "  bot_token: {}",
                if cfg.telegram.bot_token.is_empty() {
                    "missing"
                } else {
                    "configured"
                }
            );
            println!(
                "  operator_id: {}",
                if cfg.telegram.operator_id == 0 {
                    "missing".to_string()
                } else {
                    cfg.telegram.operator_id.to_string()
                }
            );
            println!(
                "  channel_id: {}",
                if cfg.telegram.channel_id == 0 {
                    "missing".to_string()
                } else {
                    cfg.telegram.channel_id.to_string()
                }
            );
        }
    }

    Ok(())
}
