//! HTTP side of an assessment request.

mod risk_api;
#[cfg(test)]
pub(crate) mod testing;

pub(crate) use risk_api::RiskApiClient;
