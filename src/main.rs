mod cli;
mod engine;
mod error;
mod input;
mod logging;
mod model;
mod orchestrator;
mod retrieval;
mod storage;
mod text_summary;
#[cfg(feature = "tui")]
mod tui;
mod view;

use anyhow::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();
    let is_non_tui = args.is_headless() || !cfg!(feature = "tui");

    let log_dir = args
        .log_dir
        .clone()
        .unwrap_or_else(storage::default_log_dir);
    // The TUI owns the terminal, so it only logs to the file.
    let guard = logging::init_tracing(&log_dir, is_non_tui);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), base_url = %args.base_url, "starting");

    match cli::run(args).await {
        Ok(()) => {
            // Explicitly exit with code 0 on success, especially for non-TUI modes
            if is_non_tui {
                drop(guard);
                std::process::exit(0);
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!("{e:#}");
            drop(guard);
            if is_non_tui {
                eprintln!("{e}");
                std::process::exit(1);
            }
            Err(e)
        }
    }
}
