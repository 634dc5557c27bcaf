use crate::error::FetchError;
use crate::model::{parse_assessment, Assessment, ClientConfig};
use anyhow::{Context, Result};
use reqwest::Url;
use tracing::debug;

/// Client for the prediction service's `/predict-risk/{city}` endpoint.
#[derive(Debug, Clone)]
pub(crate) struct RiskApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl RiskApiClient {
    pub fn new(cfg: &ClientConfig) -> Result<Self> {
        let base_url = Url::parse(&cfg.base_url)
            .with_context(|| format!("parse service url {}", cfg.base_url))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("service url {} cannot carry a path", cfg.base_url);
        }
        let http = reqwest::Client::builder()
            .user_agent(cfg.user_agent.clone())
            .timeout(cfg.timeout)
            .build()
            .context("build http client")?;
        Ok(Self { http, base_url })
    }

    /// The city becomes exactly one percent-encoded path segment.
    pub fn predict_url(&self, city: &str) -> Result<Url, FetchError> {
        if city == "." || city == ".." {
            return Err(FetchError::DotSegment(city.to_string()));
        }
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::Url(self.base_url.to_string()))?
            .pop_if_empty()
            .push("predict-risk")
            .push(city);
        Ok(url)
    }

    pub async fn fetch_assessment(&self, city: &str) -> Result<Assessment, FetchError> {
        let url = self.predict_url(city)?;
        debug!(%url, "requesting assessment");
        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }
        let body = resp.bytes().await?;
        parse_assessment(&body)
    }
}
