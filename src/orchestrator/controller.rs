//! Request lifecycle controller.
//!
//! Issues one request per submission and emits completions for presentation layers. Which
//! completion wins is decided by the retrieval machine on the UI side, not here.

use crate::engine::RiskApiClient;
use crate::error::FetchError;
use crate::input::Submission;
use crate::model::AppEvent;
use anyhow::Result;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Commands emitted by UI layers.
#[derive(Debug, Clone)]
pub(crate) enum UiCommand {
    Fetch(Submission),
    Quit,
}

/// Run a single request and always produce a completion for its generation, even if the
/// request future panics, so the UI never stays in `Loading` forever.
async fn fetch(client: &RiskApiClient, submission: Submission) -> AppEvent {
    let outcome = AssertUnwindSafe(client.fetch_assessment(&submission.city))
        .catch_unwind()
        .await
        .unwrap_or_else(|_| {
            warn!(generation = %submission.generation, "request future panicked");
            Err(FetchError::Aborted)
        });
    AppEvent::Completed {
        generation: submission.generation,
        outcome,
    }
}

/// Spawn requests for UI commands until told to quit.
///
/// Superseded requests are left to finish; their completions are still delivered.
pub(crate) async fn run_controller(
    client: RiskApiClient,
    event_tx: UnboundedSender<AppEvent>,
    mut cmd_rx: UnboundedReceiver<UiCommand>,
) -> Result<()> {
    let mut in_flight: JoinSet<()> = JoinSet::new();

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UiCommand::Fetch(submission)) => {
                        info!(
                            generation = %submission.generation,
                            city = %submission.city,
                            outstanding = in_flight.len(),
                            "fetching assessment"
                        );
                        let client = client.clone();
                        let tx = event_tx.clone();
                        in_flight.spawn(async move {
                            let ev = fetch(&client, submission).await;
                            let _ = tx.send(ev);
                        });
                    }
                    Some(UiCommand::Quit) | None => break,
                }
            }
            // An empty set yields `None` at once, which disables this branch for the round.
            Some(joined) = in_flight.join_next() => {
                if let Err(e) = joined {
                    warn!("request task failed: {e}");
                    let _ = event_tx.send(AppEvent::Info(format!("Request task failed: {e}")));
                }
            }
        }
    }

    if !in_flight.is_empty() {
        debug!(outstanding = in_flight.len(), "aborting in-flight requests");
    }
    in_flight.shutdown().await;
    Ok(())
}
