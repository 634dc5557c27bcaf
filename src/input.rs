//! Query text and the single submit path shared by every trigger (Enter, launch).

use crate::retrieval::{Generation, RetrievalMachine};
use tracing::debug;

pub const DEFAULT_CITY: &str = "Mumbai";

/// A request the orchestrator should issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub generation: Generation,
    pub city: String,
}

#[derive(Debug, Clone)]
pub struct InputController {
    query: String,
    in_flight: Option<String>,
}

impl Default for InputController {
    fn default() -> Self {
        Self::new(DEFAULT_CITY)
    }
}

impl InputController {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            in_flight: None,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, text: impl Into<String>) {
        self.query = text.into();
    }

    pub fn push_char(&mut self, c: char) {
        self.query.push(c);
    }

    pub fn backspace(&mut self) {
        self.query.pop();
    }

    pub fn clear(&mut self) {
        self.query.clear();
    }

    /// Move the machine into `Loading` for the current query.
    ///
    /// Resubmitting the exact query that is still loading is a no-op; any other submit,
    /// including an empty query, starts a new generation.
    pub fn submit(&mut self, machine: &mut RetrievalMachine) -> Option<Submission> {
        if machine.is_loading() && self.in_flight.as_deref() == Some(self.query.as_str()) {
            debug!(city = %self.query, "ignoring duplicate submit while loading");
            return None;
        }
        let generation = machine.begin();
        self.in_flight = Some(self.query.clone());
        debug!(%generation, city = %self.query, "submitted");
        Some(Submission {
            generation,
            city: self.query.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::model::fixtures::sample;
    use crate::retrieval::RequestState;

    #[test]
    fn defaults_to_mumbai() {
        assert_eq!(InputController::default().query(), "Mumbai");
    }

    #[test]
    fn editing_keeps_any_text() {
        let mut input = InputController::default();
        input.clear();
        assert_eq!(input.query(), "");
        input.backspace();
        assert_eq!(input.query(), "");
        for c in "São Paulo".chars() {
            input.push_char(c);
        }
        assert_eq!(input.query(), "São Paulo");
        input.backspace();
        assert_eq!(input.query(), "São Paul");
        input.set_query("  spaced  ");
        assert_eq!(input.query(), "  spaced  ");
    }

    #[test]
    fn submit_enters_loading_from_every_settled_state() {
        let mut m = RetrievalMachine::new();
        let mut input = InputController::new("Delhi");

        let s = input.submit(&mut m).expect("idle submit");
        assert_eq!(s.city, "Delhi");
        assert!(m.is_loading());

        m.complete(s.generation, Ok(sample(30.0)));
        assert!(input.submit(&mut m).is_some());
        assert!(m.is_loading());

        let g = m.latest().unwrap();
        m.complete(g, Err(FetchError::NotFound("City not found".into())));
        assert_eq!(m.state(), &RequestState::Failed);
        assert!(input.submit(&mut m).is_some());
        assert!(m.is_loading());
    }

    #[test]
    fn empty_query_still_submits_verbatim() {
        let mut m = RetrievalMachine::new();
        let mut input = InputController::new("");
        let s = input.submit(&mut m).expect("empty submit");
        assert_eq!(s.city, "");
        assert!(m.is_loading());
    }

    #[test]
    fn duplicate_submit_while_loading_is_ignored() {
        let mut m = RetrievalMachine::new();
        let mut input = InputController::new("Lagos");
        let first = input.submit(&mut m).unwrap();
        assert_eq!(input.submit(&mut m), None);
        assert_eq!(m.latest(), Some(first.generation));
    }

    #[test]
    fn changed_query_supersedes_in_flight_request() {
        let mut m = RetrievalMachine::new();
        let mut input = InputController::new("Lagos");
        let first = input.submit(&mut m).unwrap();
        input.set_query("Accra");
        let second = input.submit(&mut m).unwrap();
        assert!(second.generation > first.generation);
        assert_eq!(second.city, "Accra");
        assert!(m.is_loading());
    }

    #[test]
    fn same_query_after_completion_submits_again() {
        let mut m = RetrievalMachine::new();
        let mut input = InputController::new("Lima");
        let first = input.submit(&mut m).unwrap();
        m.complete(first.generation, Ok(sample(10.0)));
        let again = input.submit(&mut m).expect("resubmit after completion");
        assert_eq!(again.city, "Lima");
    }
}
