//! Stella shell binary.
//!
//! # Usage
//!
//! ```bash
//! # Walk the built-in marketplace table as a customer
//! stella-shell --role customer
//!
//! # Custom route table, opened on a deep location
//! stella-shell --routes routes.toml --open '#product-grid/storeId=4'
//! ```

use clap::Parser;
use stella_shell::{Console, DEFAULT_ROUTES, Shell, ShellOptions};
use tokio::io::BufReader;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Stella navigation shell
#[derive(Parser, Debug)]
#[command(name = "stella-shell")]
#[command(about = "Drive the Stella navigation controller from a terminal")]
#[command(version)]
struct Args {
    /// Route table (TOML). Defaults to the built-in marketplace table.
    #[arg(short, long)]
    routes: Option<String>,

    /// Start signed in with this role
    #[arg(long)]
    role: Option<String>,

    /// Address bar content at startup, e.g. '#cart'
    #[arg(long)]
    open: Option<String>,

    /// Override the internal history limit
    #[arg(long)]
    history_limit: Option<usize>,

    /// Override the per-step screen timeout in milliseconds
    #[arg(long)]
    step_timeout_ms: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    // Stdout carries the transcript; logs go to stderr.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let text = match &args.routes {
        Some(path) => {
            tracing::info!("Loading routes from {path}");
            tokio::fs::read_to_string(path).await?
        },
        None => DEFAULT_ROUTES.to_string(),
    };

    let options = ShellOptions {
        history_limit: args.history_limit,
        step_timeout_ms: args.step_timeout_ms,
        role: args.role,
        open: args.open,
    };

    let mut shell = Shell::from_toml(&text, options, Console::stdout())?;
    shell.start().await?;
    shell.run(BufReader::new(tokio::io::stdin())).await?;

    Ok(())
}
