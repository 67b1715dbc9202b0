use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pullkit_core::AppConfig;

mod commands;

#[derive(Parser)]
#[command(name = "pullkit")]
#[command(author, version, about = "Pull-to-refresh feed controller playground")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scripted gesture against an in-memory feed
    Demo {
        /// Number of seeded posts
        #[arg(short = 'n', long, default_value_t = 42)]
        posts: usize,
        /// Simulated network latency in milliseconds
        #[arg(short, long, default_value_t = 250)]
        latency_ms: u64,
    },
    /// Fetch a page from a remote feed endpoint
    Fetch {
        /// Base URL (defaults to [remote].base_url from the config)
        #[arg(short, long)]
        url: Option<String>,
        /// Fetch the page after this item id instead of the first page
        #[arg(short, long)]
        cursor: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();

    // Load configuration
    let config = AppConfig::load()?;
    tracing::debug!(path = %AppConfig::config_path().display(), "configuration loaded");

    match cli.command {
        Commands::Demo { posts, latency_ms } => {
            commands::demo::run(&config, posts, latency_ms).await
        }
        Commands::Fetch { url, cursor } => commands::fetch::run(&config, url, cursor).await,
    }
}
