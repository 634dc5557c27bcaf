use crate::input::InputController;
use crate::model::{AppEvent, ClientConfig};
use crate::orchestrator::{self, UiCommand};
use crate::retrieval::{Completion, RequestState, RetrievalMachine};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::path::PathBuf;

const SPINNER: [&str; 8] = ["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"];

/// Everything the UI thread owns. Mutated only from key handling and orchestrator events.
pub(crate) struct UiState {
    pub input: InputController,
    pub machine: RetrievalMachine,
    pub info: String,
    pub show_help: bool,
    pub spinner_tick: usize,
    pub config: ClientConfig,
    pub export_json: Option<PathBuf>,
    /// Query that produced the request currently shown or in flight.
    pub last_query: Option<String>,
}

impl UiState {
    pub fn new(input: InputController, config: ClientConfig) -> Self {
        Self {
            input,
            machine: RetrievalMachine::new(),
            info: String::new(),
            show_help: false,
            spinner_tick: 0,
            config,
            export_json: None,
            last_query: None,
        }
    }

    pub fn spinner(&self) -> &'static str {
        SPINNER[self.spinner_tick % SPINNER.len()]
    }

    /// The one submit path used by both Enter and submit-on-launch.
    pub fn submit(&mut self) -> Option<UiCommand> {
        let submission = self.input.submit(&mut self.machine)?;
        self.info = format!("Searching \"{}\"…", submission.city);
        self.last_query = Some(submission.city.clone());
        Some(UiCommand::Fetch(submission))
    }

    /// Translate a key press into state changes and, possibly, a command for the orchestrator.
    pub fn handle_key(&mut self, k: KeyEvent) -> Option<UiCommand> {
        match (k.modifiers, k.code) {
            (KeyModifiers::CONTROL, KeyCode::Char('c')) => Some(UiCommand::Quit),
            (_, KeyCode::Esc) => {
                if self.show_help {
                    self.show_help = false;
                    None
                } else {
                    Some(UiCommand::Quit)
                }
            }
            (_, KeyCode::F(1)) => {
                self.show_help = !self.show_help;
                None
            }
            (_, KeyCode::Enter) => self.submit(),
            (_, KeyCode::Backspace) => {
                self.input.backspace();
                None
            }
            (KeyModifiers::CONTROL, KeyCode::Char('u')) => {
                self.input.clear();
                None
            }
            (KeyModifiers::CONTROL, KeyCode::Char('s')) => {
                self.save_current();
                None
            }
            (m, KeyCode::Char(c))
                if !m.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                self.input.push_char(c);
                None
            }
            _ => None,
        }
    }

    pub fn apply_event(&mut self, ev: AppEvent) {
        match ev {
            AppEvent::Completed { generation, outcome } => {
                if self.machine.complete(generation, outcome) == Completion::Stale {
                    return;
                }
                self.info.clear();
                if let RequestState::Success(a) = self.machine.state() {
                    let query = self.last_query.as_deref().unwrap_or_default();
                    let messages = orchestrator::process_assessment(
                        self.export_json.as_deref(),
                        &self.config,
                        query,
                        a,
                    );
                    self.info = messages.join(" | ");
                }
            }
            AppEvent::Info(msg) => self.info = msg,
        }
    }

    fn save_current(&mut self) {
        let RequestState::Success(a) = self.machine.state() else {
            self.info = "Nothing to save yet".into();
            return;
        };
        let query = self.last_query.as_deref().unwrap_or_default();
        let saved = crate::storage::base_dir()
            .and_then(|dir| crate::storage::save_assessment(&dir, query, &self.config, a));
        self.info = match saved {
            Ok(path) => format!("Saved: {}", path.display()),
            Err(e) => format!("Save failed: {e:#}"),
        };
    }
}
