//! Presentation: a pure mapping from controller state to what the user sees.
//!
//! The [`crate::controller::SubmissionController`] calls [`reflect`] at the
//! end of each transition and hands the resulting [`View`] to a
//! [`Presenter`]. Data only flows one way: presenters receive views and have
//! no handle back into the controller.
//!
//! # Example
//!
//! ```rust
//! use pdf_translate::{Presenter, View};
//! use std::sync::Mutex;
//!
//! #[derive(Default)]
//! struct LastMessage(Mutex<Option<String>>);
//!
//! impl Presenter for LastMessage {
//!     fn render(&self, view: &View) {
//!         if let Some(msg) = &view.message {
//!             *self.0.lock().unwrap() = Some(msg.text.clone());
//!         }
//!     }
//! }
//! ```

use crate::controller::{Session, UiState};
use crate::direction::TranslationDirection;
use serde::Serialize;
use std::sync::Arc;

/// Trigger label while ready.
pub const READY_LABEL: &str = "Translate PDF";

/// Trigger label while a submission is in flight.
pub const BUSY_LABEL: &str = "Processing...";

/// Informational message shown as soon as a submission starts.
pub const BUSY_MESSAGE: &str = "Translating PDF... This may take several minutes for large files.";

/// Visual treatment of a status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Error => "error",
        }
    }
}

/// A single-line message and how to style it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusMessage {
    pub text: String,
    pub severity: Severity,
}

impl StatusMessage {
    pub fn new(text: impl Into<String>, severity: Severity) -> Self {
        Self {
            text: text.into(),
            severity,
        }
    }
}

/// The submit button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TriggerControl {
    pub enabled: bool,
    pub label: String,
}

impl TriggerControl {
    pub fn ready() -> Self {
        Self {
            enabled: true,
            label: READY_LABEL.to_string(),
        }
    }

    pub fn busy() -> Self {
        Self {
            enabled: false,
            label: BUSY_LABEL.to_string(),
        }
    }
}

impl Default for TriggerControl {
    fn default() -> Self {
        Self::ready()
    }
}

/// Everything a presenter needs to draw the current state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct View {
    pub state: UiState,
    pub message: Option<StatusMessage>,
    pub trigger: TriggerControl,
    /// Name of the selected file, if any.
    pub file_name: Option<String>,
    pub direction: Option<TranslationDirection>,
    pub drop_zone_highlighted: bool,
}

/// Map controller state to a [`View`]. Pure: no side effects, no I/O.
pub fn reflect(session: &Session) -> View {
    View {
        state: session.state(),
        message: session.message().cloned(),
        trigger: session.trigger().clone(),
        file_name: session.input().display_name().map(str::to_owned),
        direction: session.direction().active(),
        drop_zone_highlighted: session.input().is_highlighted(),
    }
}

/// Receives a [`View`] at the end of every transition.
///
/// Implementations must be `Send + Sync` because the controller can be
/// shared across tasks. The default implementation ignores every view.
pub trait Presenter: Send + Sync {
    fn render(&self, view: &View) {
        let _ = view;
    }
}

/// A presenter that draws nothing.
pub struct NoopPresenter;

impl Presenter for NoopPresenter {}

/// Convenience alias for a shared presenter.
pub type SharedPresenter = Arc<dyn Presenter>;
