//! Arbor CLI entry point - analyzes a project and exports its treemap

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "arbor")]
#[command(about = "Hierarchical code architecture analysis and treemap layout", long_about = None)]
struct Cli {
    /// Project root path (defaults to current directory)
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Comma-separated file endings treated as code
    #[arg(short, long, default_value = "rs,ts,tsx,js,jsx,py,go,java")]
    endings: String,

    /// Language id hint passed to the symbol provider
    #[arg(short, long, default_value = "rust")]
    language: String,

    /// Write the laid-out architecture as JSON to this path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Root rectangle width
    #[arg(long, default_value = "1280")]
    width: f64,

    /// Root rectangle height
    #[arg(long, default_value = "800")]
    height: f64,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!(
            "arbor={log_level}"
        )))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Arbor v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Analyzing: {}", cli.path.display());

    let endings: Vec<String> = cli
        .endings
        .split(',')
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty())
        .collect();

    commands::analyze(
        cli.path,
        endings,
        cli.language,
        cli.output,
        cli.width,
        cli.height,
    )
    .await
}
