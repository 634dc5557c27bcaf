//! Post-success processing.
//!
//! Handles exports after an assessment has been applied to the retrieval state.

use crate::model::{Assessment, ClientConfig};
use crate::storage;
use std::path::Path;
use tracing::warn;

/// Export an applied assessment and return status messages for presentation layers.
pub(crate) fn process_assessment(
    export_json: Option<&Path>,
    cfg: &ClientConfig,
    query: &str,
    assessment: &Assessment,
) -> Vec<String> {
    let mut messages = Vec::new();
    if let Some(export_path) = export_json {
        match storage::export_json(export_path, query, cfg, assessment) {
            Ok(()) => messages.push(format!("Exported JSON: {}", export_path.display())),
            Err(e) => {
                warn!(path = %export_path.display(), error = %format!("{e:#}"), "export failed");
                messages.push(format!("Export JSON failed: {e:#}"));
            }
        }
    }
    messages
}
