//! Text summary builder for CLI output.
//!
//! Lays out a projected render mode as plain lines for text mode.

use crate::view::{self, Dashboard, RenderMode};

/// Pre-formatted lines for text output.
pub(crate) struct TextSummary {
    pub lines: Vec<String>,
}

pub(crate) fn build_text_summary(mode: &RenderMode) -> TextSummary {
    let lines = match mode {
        RenderMode::Welcome => vec![
            view::WELCOME_TITLE.to_string(),
            view::WELCOME_BODY.to_string(),
        ],
        RenderMode::Loading => vec!["Loading…".to_string()],
        RenderMode::ErrorBanner => vec![view::ERROR_BANNER.to_string()],
        RenderMode::Dashboard(d) => dashboard_lines(d),
    };
    TextSummary { lines }
}

pub(crate) fn dashboard_lines(d: &Dashboard) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some(city) = d.city.as_deref() {
        lines.push(format!("City: {city}"));
    }
    for card in &d.cards {
        lines.push(format!("{}: {} ({})", card.label, card.value, card.caption));
    }
    lines.push(format!(
        "Total Migration Risk: {} {}",
        d.risk.text,
        d.risk.class.label()
    ));

    lines.push(String::new());
    lines.push(format!("{}:", view::FORECAST_TITLE));
    if d.forecast.points.is_empty() {
        lines.push("  (no data)".to_string());
    }
    for (year, risk) in &d.forecast.points {
        lines.push(format!("  {year}  {risk:>5.1}"));
    }

    lines.push(String::new());
    lines.push(format!("{}:", view::RADAR_TITLE));
    if d.radar.axes.is_empty() {
        lines.push("  (no data)".to_string());
    }
    let width = d
        .radar
        .axes
        .iter()
        .map(|a| a.label.chars().count())
        .max()
        .unwrap_or(0);
    for axis in &d.radar.axes {
        lines.push(format!("  {:<width$}  {:>5.1}", axis.label, axis.value));
    }

    lines
}
