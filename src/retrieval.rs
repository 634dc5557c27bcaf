//! Lifecycle of the current assessment request.
//!
//! The machine owns the single `RequestState` and the generation counter used to tell the
//! latest submission apart from superseded ones still in flight.

use crate::error::FetchError;
use crate::model::Assessment;
use tracing::{debug, info, warn};

/// Tag issued for every submission; higher is newer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl std::fmt::Display for Generation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestState {
    #[default]
    Idle,
    Loading,
    Success(Assessment),
    Failed,
}

/// Whether a completion was reflected in state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    Stale,
}

#[derive(Debug, Default)]
pub struct RetrievalMachine {
    state: RequestState,
    issued: u64,
}

impl RetrievalMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &RequestState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, RequestState::Loading)
    }

    /// Most recently issued generation, if any.
    pub fn latest(&self) -> Option<Generation> {
        (self.issued > 0).then_some(Generation(self.issued))
    }

    /// Enter `Loading` from any state, dropping whatever result was held.
    pub fn begin(&mut self) -> Generation {
        self.issued += 1;
        if self.is_loading() {
            debug!(generation = self.issued, "superseding in-flight request");
        }
        self.state = RequestState::Loading;
        Generation(self.issued)
    }

    /// Apply a finished request if it belongs to the latest submission.
    pub fn complete(
        &mut self,
        generation: Generation,
        outcome: Result<Assessment, FetchError>,
    ) -> Completion {
        if generation.0 != self.issued || !self.is_loading() {
            debug!(%generation, latest = self.issued, "discarding stale response");
            return Completion::Stale;
        }
        self.state = match outcome {
            Ok(assessment) => {
                info!(%generation, risk_score = assessment.risk_score, "assessment received");
                RequestState::Success(assessment)
            }
            Err(e) => {
                warn!(%generation, kind = ?e.kind(), error = %e, "assessment request failed");
                RequestState::Failed
            }
        };
        Completion::Applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::sample;

    #[test]
    fn starts_idle() {
        let m = RetrievalMachine::new();
        assert_eq!(m.state(), &RequestState::Idle);
        assert_eq!(m.latest(), None);
    }

    #[test]
    fn begin_always_lands_in_loading() {
        let mut m = RetrievalMachine::new();
        let g1 = m.begin();
        assert!(m.is_loading());
        m.complete(g1, Ok(sample(40.0)));
        assert!(matches!(m.state(), RequestState::Success(_)));

        let g2 = m.begin();
        assert_eq!(m.state(), &RequestState::Loading);
        m.complete(g2, Err(FetchError::NotFound("City not found".into())));
        assert_eq!(m.state(), &RequestState::Failed);

        m.begin();
        assert_eq!(m.state(), &RequestState::Loading);
    }

    #[test]
    fn failure_clears_prior_success() {
        let mut m = RetrievalMachine::new();
        let g = m.begin();
        m.complete(g, Ok(sample(90.0)));
        let g = m.begin();
        assert_eq!(
            m.complete(g, Err(FetchError::Status(reqwest::StatusCode::NOT_FOUND))),
            Completion::Applied
        );
        assert_eq!(m.state(), &RequestState::Failed);
    }

    #[test]
    fn stale_response_is_discarded() {
        let mut m = RetrievalMachine::new();
        let old = m.begin();
        let new = m.begin();
        assert!(new > old);

        assert_eq!(m.complete(old, Ok(sample(10.0))), Completion::Stale);
        assert_eq!(m.state(), &RequestState::Loading);

        assert_eq!(m.complete(new, Ok(sample(75.0))), Completion::Applied);
        assert_eq!(m.state(), &RequestState::Success(sample(75.0)));

        // a late failure from the older request must not clobber the newer success
        assert_eq!(m.complete(old, Err(FetchError::Aborted)), Completion::Stale);
        assert_eq!(m.state(), &RequestState::Success(sample(75.0)));
    }

    #[test]
    fn repeated_completion_is_ignored() {
        let mut m = RetrievalMachine::new();
        let g = m.begin();
        assert_eq!(m.complete(g, Ok(sample(20.0))), Completion::Applied);
        assert_eq!(m.complete(g, Err(FetchError::Aborted)), Completion::Stale);
        assert_eq!(m.state(), &RequestState::Success(sample(20.0)));
    }

    #[test]
    fn new_success_replaces_rather_than_merges() {
        let mut m = RetrievalMachine::new();
        let g = m.begin();
        let mut first = sample(50.0);
        first.forecast.push(crate::model::ForecastPoint { year: 2025, risk: 50.0 });
        m.complete(g, Ok(first));

        let g = m.begin();
        m.complete(g, Ok(sample(60.0)));
        match m.state() {
            RequestState::Success(a) => {
                assert_eq!(a.risk_score, 60.0);
                assert!(a.forecast.is_empty());
            }
            other => panic!("unexpected state {other:?}"),
        }
    }
}
