//! Projection from retrieval state to what the user sees.
//!
//! Everything here is a pure function of `RequestState`; presentation layers (TUI, text mode)
//! only lay out the values produced here.

use crate::model::{Assessment, ForecastPoint, RadarPoint};
use crate::retrieval::RequestState;
use std::f64::consts::{FRAC_PI_2, TAU};

/// Scores strictly above this are critical.
pub const CRITICAL_THRESHOLD: f64 = 70.0;
/// Radius domain of the radar chart, independent of the data.
pub const RADAR_MAX: f64 = 100.0;
/// Vertical domain of the forecast chart.
pub const FORECAST_Y_BOUNDS: [f64; 2] = [0.0, 100.0];

pub const WELCOME_TITLE: &str = "Predict Climate Migration with AI";
pub const WELCOME_BODY: &str =
    "Analyze real-time environmental data to forecast population displacement.";
pub const ERROR_BANNER: &str = "City not found or API Error";
pub const FORECAST_TITLE: &str = "5-Year Displacement Projection";
pub const RADAR_TITLE: &str = "Risk Factor Analysis";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskClass {
    Critical,
    Moderate,
}

impl RiskClass {
    pub fn from_score(score: f64) -> Self {
        if score > CRITICAL_THRESHOLD {
            RiskClass::Critical
        } else {
            RiskClass::Moderate
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskClass::Critical => "CRITICAL",
            RiskClass::Moderate => "MODERATE",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricCard {
    pub label: &'static str,
    pub value: String,
    pub caption: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RiskCard {
    pub score: f64,
    pub text: String,
    pub class: RiskClass,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastView {
    /// (year, risk) in server order.
    pub points: Vec<(f64, f64)>,
    pub x_bounds: [f64; 2],
    pub x_labels: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RadarAxis {
    pub label: String,
    pub value: f64,
    /// Data point on the polar plot.
    pub vertex: (f64, f64),
    /// End of the axis spoke at full radius.
    pub tip: (f64, f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RadarView {
    pub axes: Vec<RadarAxis>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub city: Option<String>,
    pub cards: [MetricCard; 3],
    pub risk: RiskCard,
    pub forecast: ForecastView,
    pub radar: RadarView,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderMode {
    Welcome,
    /// Busy indicator in the input box, nothing else.
    Loading,
    ErrorBanner,
    Dashboard(Box<Dashboard>),
}

pub fn project(state: &RequestState) -> RenderMode {
    match state {
        RequestState::Idle => RenderMode::Welcome,
        RequestState::Loading => RenderMode::Loading,
        RequestState::Failed => RenderMode::ErrorBanner,
        RequestState::Success(a) => RenderMode::Dashboard(Box::new(dashboard(a))),
    }
}

/// `Display` of f64 already drops a trailing `.0`, matching how the service's numbers read.
fn num(v: f64) -> String {
    format!("{v}")
}

pub fn dashboard(a: &Assessment) -> Dashboard {
    let m = &a.metrics;
    Dashboard {
        city: a.city.clone(),
        cards: [
            MetricCard {
                label: "Heat Index",
                value: format!("{}°C", num(m.heat_index)),
                caption: "Feels like".into(),
            },
            MetricCard {
                label: "Humidity",
                value: format!("{}%", num(m.humidity)),
                caption: "Water Stress".into(),
            },
            MetricCard {
                label: "Wind Speed",
                value: format!("{} km/h", num(m.wind)),
                caption: m.condition.clone(),
            },
        ],
        risk: RiskCard {
            score: a.risk_score,
            text: format!("{}/100", num(a.risk_score)),
            class: RiskClass::from_score(a.risk_score),
        },
        forecast: forecast_view(&a.forecast),
        radar: radar_view(&a.radar),
    }
}

pub fn forecast_view(series: &[ForecastPoint]) -> ForecastView {
    let points: Vec<(f64, f64)> = series
        .iter()
        .map(|p| (f64::from(p.year), p.risk))
        .collect();

    // Years are widened so padding and spans cannot overflow on extreme values.
    let years = series.iter().map(|p| i64::from(p.year));
    let (Some(min), Some(max)) = (years.clone().min(), years.max()) else {
        return ForecastView {
            points,
            x_bounds: [0.0, 1.0],
            x_labels: Vec::new(),
        };
    };

    if min == max {
        return ForecastView {
            points,
            x_bounds: [(min - 1) as f64, (max + 1) as f64],
            x_labels: vec![(min - 1).to_string(), min.to_string(), (max + 1).to_string()],
        };
    }

    // Labels are spread evenly across the axis, so the bounds sit exactly on the first and
    // last year and only evenly spaced years are emitted.
    let span = max - min;
    let x_labels = if span <= 6 {
        (min..=max).map(|y| y.to_string()).collect()
    } else if span % 2 == 0 {
        vec![min.to_string(), (min + span / 2).to_string(), max.to_string()]
    } else {
        vec![min.to_string(), max.to_string()]
    };

    ForecastView {
        points,
        x_bounds: [min as f64, max as f64],
        x_labels,
    }
}

/// Place each axis on a circle: first axis straight up, the rest clockwise.
pub fn radar_view(series: &[RadarPoint]) -> RadarView {
    let n = series.len();
    let axes = series
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let angle = FRAC_PI_2 - TAU * i as f64 / n as f64;
            let (sin, cos) = angle.sin_cos();
            let r = p.value.clamp(0.0, RADAR_MAX);
            RadarAxis {
                label: p.subject.clone(),
                value: p.value,
                vertex: (r * cos, r * sin),
                tip: (RADAR_MAX * cos, RADAR_MAX * sin),
            }
        })
        .collect();
    RadarView { axes }
}
