//! JSON files written for received assessments.

use crate::model::{Assessment, ClientConfig};
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::OffsetDateTime;

const APP_DIR: &str = "climate-risk";

#[derive(Serialize)]
struct SavedAssessment<'a> {
    fetched_at: String,
    query: &'a str,
    service: &'a ClientConfig,
    assessment: &'a Assessment,
}

/// Base directory for saved files: `<data_local_dir>/climate-risk`.
pub fn base_dir() -> Result<PathBuf> {
    let dir = dirs::data_local_dir().context("no local data directory on this platform")?;
    Ok(dir.join(APP_DIR))
}

pub fn default_log_dir() -> PathBuf {
    base_dir()
        .map(|d| d.join("logs"))
        .unwrap_or_else(|_| std::env::temp_dir().join(APP_DIR).join("logs"))
}

fn render(query: &str, cfg: &ClientConfig, assessment: &Assessment) -> Result<String> {
    let saved = SavedAssessment {
        fetched_at: OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_else(|_| "now".into()),
        query,
        service: cfg,
        assessment,
    };
    serde_json::to_string_pretty(&saved).context("serialize assessment")
}

/// Write an assessment to exactly `path`, creating parent directories.
pub fn export_json(
    path: &Path,
    query: &str,
    cfg: &ClientConfig,
    assessment: &Assessment,
) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let json = render(query, cfg, assessment)?;
    std::fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

/// Save under `dir` with a name derived from the city and the current time.
pub fn save_assessment(
    dir: &Path,
    query: &str,
    cfg: &ClientConfig,
    assessment: &Assessment,
) -> Result<PathBuf> {
    let stamp = OffsetDateTime::now_utc()
        .format(format_description!(
            "[year][month][day]-[hour][minute][second]"
        ))
        .unwrap_or_else(|_| "now".into());
    let city = assessment.city.as_deref().unwrap_or(query);
    let path = dir.join(format!("{}-{stamp}.json", slug(city)));
    export_json(&path, query, cfg, assessment)?;
    Ok(path)
}

fn slug(city: &str) -> String {
    let mut out = String::new();
    for c in city.trim().chars() {
        if c.is_alphanumeric() {
            out.extend(c.to_lowercase());
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    let out = out.trim_matches('-');
    if out.is_empty() {
        "assessment".to_string()
    } else {
        out.to_string()
    }
}
