use crate::error::FetchError;
use crate::retrieval::Generation;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub base_url: String,
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    pub user_agent: String,
}

/// Aggregate risk result for one city, as received from the prediction service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    #[serde(default)]
    pub city: Option<String>,
    pub risk_score: f64,
    pub metrics: Metrics,
    pub forecast: Vec<ForecastPoint>,
    pub radar: Vec<RadarPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// Feels-like temperature in °C.
    pub heat_index: f64,
    /// Relative humidity in percent.
    pub humidity: f64,
    /// Wind speed in km/h.
    pub wind: f64,
    pub condition: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub year: i32,
    pub risk: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadarPoint {
    pub subject: String,
    #[serde(rename = "A", alias = "value")]
    pub value: f64,
}

/// Body of `GET /predict-risk/{city}` once the error marker has been ruled out.
#[derive(Debug, Deserialize)]
struct RiskResponse {
    #[serde(default)]
    city: Option<String>,
    risk_score: f64,
    metrics: Metrics,
    charts: Charts,
}

#[derive(Debug, Deserialize)]
struct Charts {
    forecast: Vec<ForecastPoint>,
    radar: Vec<RadarPoint>,
}

impl From<RiskResponse> for Assessment {
    fn from(r: RiskResponse) -> Self {
        Self {
            city: r.city,
            risk_score: r.risk_score,
            metrics: r.metrics,
            forecast: r.charts.forecast,
            radar: r.charts.radar,
        }
    }
}

/// Truthiness as the service's clients have always read the `error` field.
fn is_truthy(v: &serde_json::Value) -> bool {
    use serde_json::Value;
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Parse a response body into an `Assessment`.
///
/// A truthy top-level `error` wins over everything else. Otherwise the body has to decode
/// completely; a partially valid payload is rejected as a whole.
pub fn parse_assessment(body: &[u8]) -> Result<Assessment, FetchError> {
    let value: serde_json::Value = serde_json::from_slice(body)?;
    if let Some(marker) = value.get("error").filter(|v| is_truthy(v)) {
        let reason = match marker {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        return Err(FetchError::NotFound(reason));
    }
    let response: RiskResponse = serde_json::from_value(value)?;
    Ok(response.into())
}

/// Events delivered from the orchestrator to presentation layers.
#[derive(Debug)]
pub enum AppEvent {
    Completed {
        generation: Generation,
        outcome: Result<Assessment, FetchError>,
    },
    Info(String),
}
