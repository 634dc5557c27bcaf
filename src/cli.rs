use crate::engine::RiskApiClient;
use crate::input::{InputController, DEFAULT_CITY};
use crate::model::{Assessment, ClientConfig};
use crate::retrieval::{RequestState, RetrievalMachine};
use crate::view::{self, ERROR_BANNER};
use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::time::Duration;
use tokio::sync::mpsc;

/// Output line routing for stdout/stderr writer.
enum OutputLine {
    Stdout(String),
    Stderr(String),
}

/// Spawn a blocking writer for stdout/stderr to avoid blocking async tasks.
fn spawn_output_writer() -> (
    mpsc::UnboundedSender<OutputLine>,
    tokio::task::JoinHandle<()>,
) {
    let (tx, mut rx) = mpsc::unbounded_channel::<OutputLine>();
    let handle = tokio::task::spawn_blocking(move || {
        let stdout = std::io::stdout();
        let stderr = std::io::stderr();
        let mut out = std::io::LineWriter::new(stdout.lock());
        let mut err = std::io::LineWriter::new(stderr.lock());

        while let Some(line) = rx.blocking_recv() {
            match line {
                OutputLine::Stdout(msg) => {
                    let _ = writeln!(out, "{}", msg);
                }
                OutputLine::Stderr(msg) => {
                    let _ = writeln!(err, "{}", msg);
                }
            }
        }

        let _ = out.flush();
        let _ = err.flush();
    });
    (tx, handle)
}

#[derive(Debug, Parser, Clone)]
#[command(
    name = "climate-risk",
    version,
    about = "Climate migration risk dashboard for the terminal"
)]
pub struct Cli {
    /// Base URL of the risk prediction service
    #[arg(long, default_value = "http://127.0.0.1:8000")]
    pub base_url: String,

    /// City to query first
    #[arg(long, default_value = DEFAULT_CITY)]
    pub city: String,

    /// Give up on a request after this long
    #[arg(long, default_value = "10s")]
    pub timeout: humantime::Duration,

    /// Print the assessment as JSON and exit (no TUI)
    #[arg(long, conflicts_with = "text")]
    pub json: bool,

    /// Print the dashboard as text and exit (no TUI)
    #[arg(long)]
    pub text: bool,

    /// Write every received assessment to this file
    #[arg(long)]
    pub export_json: Option<std::path::PathBuf>,

    /// Use --submit-on-launch false to start on the welcome screen
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub submit_on_launch: bool,

    /// Directory for log files (defaults to the local data directory)
    #[arg(long)]
    pub log_dir: Option<std::path::PathBuf>,
}

impl Cli {
    pub fn is_headless(&self) -> bool {
        self.json || self.text
    }
}

pub async fn run(args: Cli) -> Result<()> {
    if !args.is_headless() {
        #[cfg(feature = "tui")]
        {
            return crate::tui::run(args).await;
        }
        #[cfg(not(feature = "tui"))]
        {
            // Fallback when built without TUI support.
            return run_headless(args, false).await;
        }
    }

    let json = args.json;
    run_headless(args, json).await
}

/// Build the service configuration from CLI arguments.
pub fn build_config(args: &Cli) -> ClientConfig {
    ClientConfig {
        base_url: args.base_url.clone(),
        timeout: Duration::from(args.timeout),
        user_agent: format!("climate-risk-cli/{}", env!("CARGO_PKG_VERSION")),
    }
}

/// Submit the configured city once and print the outcome.
async fn run_headless(args: Cli, json: bool) -> Result<()> {
    let cfg = build_config(&args);
    let client = RiskApiClient::new(&cfg)?;

    let mut machine = RetrievalMachine::new();
    let mut input = InputController::new(args.city.clone());
    let submission = input
        .submit(&mut machine)
        .context("submit rejected from idle state")?;
    let outcome = client.fetch_assessment(&submission.city).await;
    machine.complete(submission.generation, outcome);

    let RequestState::Success(assessment) = machine.state() else {
        return Err(anyhow::anyhow!(ERROR_BANNER));
    };

    handle_exports(&args, &cfg, &submission.city, assessment)?;

    let (out_tx, out_handle) = spawn_output_writer();
    if json {
        let out = serde_json::to_string_pretty(assessment)?;
        let _ = out_tx.send(OutputLine::Stdout(out));
    } else {
        let summary = crate::text_summary::build_text_summary(&view::project(machine.state()));
        for line in summary.lines {
            let _ = out_tx.send(OutputLine::Stdout(line));
        }
    }
    if let Some(p) = args.export_json.as_deref() {
        let _ = out_tx.send(OutputLine::Stderr(format!("Exported: {}", p.display())));
    }
    drop(out_tx);
    let _ = out_handle.await;
    Ok(())
}

/// Write the export file for headless modes (errors will propagate).
fn handle_exports(args: &Cli, cfg: &ClientConfig, query: &str, a: &Assessment) -> Result<()> {
    if let Some(p) = args.export_json.as_deref() {
        crate::storage::export_json(p, query, cfg, a)?;
    }
    Ok(())
}
