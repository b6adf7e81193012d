//! Lifecycle of one user session: `Idle -> Analyzing -> Result | Error`,
//! with `reset` back to `Idle` from anywhere.
//!
//! Starting an analysis hands out an [`AnalysisTicket`]. The caller runs the
//! provider however it likes and reports back through [`Session::settle`];
//! a settle whose ticket is not the one currently in flight is dropped, so a
//! response that lands after a reset can never overwrite the newer state.

use thiserror::Error;
use tracing::{info, warn};

use crate::analysis::{AnalysisInput, AnalysisResult};
use crate::analyzer::{AnalysisError, AnalysisProvider};
use crate::image_input::{strip_data_url_prefix, ImagePayload};

#[derive(Debug, Clone, PartialEq)]
pub enum AppState {
    Idle,
    Analyzing { request_id: u64 },
    Result(AnalysisResult),
    Error(String),
}

impl AppState {
    pub fn name(&self) -> &'static str {
        match self {
            AppState::Idle => "idle",
            AppState::Analyzing { .. } => "analyzing",
            AppState::Result(_) => "result",
            AppState::Error(_) => "error",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Ingredient text is empty")]
    EmptyInput,
    #[error("An analysis is already in progress")]
    AnalysisInFlight,
    #[error("Reset before starting a new analysis (current state: {0})")]
    NotIdle(&'static str),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisTicket {
    pub id: u64,
    pub input: AnalysisInput,
}

#[derive(Debug)]
pub struct Session {
    state: AppState,
    raw_text: String,
    preview_url: Option<String>,
    last_request_id: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            state: AppState::Idle,
            raw_text: String::new(),
            preview_url: None,
            last_request_id: 0,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        match &self.state {
            AppState::Result(result) => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            AppState::Error(message) => Some(message),
            _ => None,
        }
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn preview_url(&self) -> Option<&str> {
        self.preview_url.as_deref()
    }

    pub fn is_analyzing(&self) -> bool {
        matches!(self.state, AppState::Analyzing { .. })
    }

    pub fn set_raw_text(&mut self, text: impl Into<String>) {
        self.raw_text = text.into();
    }

    /// Whether "Analyze Text" is enabled.
    pub fn can_submit_text(&self) -> bool {
        matches!(self.state, AppState::Idle) && !self.raw_text.trim().is_empty()
    }

    pub fn submit_text(&mut self) -> Result<AnalysisTicket, SessionError> {
        self.ensure_idle()?;
        if self.raw_text.trim().is_empty() {
            return Err(refuse(self.state.name(), SessionError::EmptyInput));
        }
        let input = AnalysisInput::text(self.raw_text.clone());
        Ok(self.begin(input))
    }

    pub fn select_image(&mut self, image: ImagePayload) -> Result<AnalysisTicket, SessionError> {
        self.ensure_idle()?;
        let content = strip_data_url_prefix(&image.base64).to_string();
        self.preview_url = Some(image.preview_url);
        Ok(self.begin(AnalysisInput::image(content)))
    }

    /// Applies the outcome of ticket `request_id`. Returns `false` when the
    /// outcome was discarded because that request is no longer current.
    pub fn settle(
        &mut self,
        request_id: u64,
        outcome: Result<AnalysisResult, AnalysisError>,
    ) -> bool {
        match self.state {
            AppState::Analyzing { request_id: current } if current == request_id => {}
            _ => {
                warn!(
                    request_id,
                    state = self.state.name(),
                    "Discarding stale analysis outcome"
                );
                return false;
            }
        }

        self.state = match outcome {
            Ok(result) => {
                info!(
                    request_id,
                    ingredients = result.ingredients.len(),
                    interactions = result.ingredient_interactions.len(),
                    "Analysis complete"
                );
                AppState::Result(result)
            }
            Err(err) => {
                warn!(request_id, error = %err, "Analysis failed");
                AppState::Error(err.user_message())
            }
        };
        true
    }

    pub fn reset(&mut self) {
        if self.is_analyzing() {
            info!("Reset while analyzing; the pending outcome will be ignored");
        }
        self.state = AppState::Idle;
        self.raw_text.clear();
        self.preview_url = None;
    }

    /// Runs `ticket` against `provider` and settles it.
    pub async fn analyze_with(
        &mut self,
        provider: &dyn AnalysisProvider,
        ticket: AnalysisTicket,
    ) -> &AppState {
        let outcome = provider.analyze(&ticket.input).await;
        self.settle(ticket.id, outcome);
        &self.state
    }

    fn ensure_idle(&self) -> Result<(), SessionError> {
        let err = match self.state {
            AppState::Idle => return Ok(()),
            AppState::Analyzing { .. } => SessionError::AnalysisInFlight,
            ref other => SessionError::NotIdle(other.name()),
        };
        Err(refuse(self.state.name(), err))
    }

    fn begin(&mut self, input: AnalysisInput) -> AnalysisTicket {
        self.last_request_id += 1;
        let id = self.last_request_id;
        info!(request_id = id, kind = ?input.kind, "Starting analysis");
        self.state = AppState::Analyzing { request_id: id };
        AnalysisTicket { id, input }
    }
}

fn refuse(state: &'static str, err: SessionError) -> SessionError {
    warn!(state, reason = %err, "Submission refused");
    err
}
