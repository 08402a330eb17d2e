//! The tagged result of one submission attempt.

use crate::error::TranslateError;
use crate::presentation::Severity;
use serde::Serialize;
use std::path::PathBuf;

/// Message shown when the submit action finds no selected file.
pub const NO_FILE_MESSAGE: &str = "Please select a PDF file";

/// Message shown when no direction option is active.
pub const NO_DIRECTION_MESSAGE: &str = "Please select a translation direction";

/// Message shown after a successful download.
pub const SUCCESS_MESSAGE: &str = "✓ Translation complete! File downloaded successfully.";

/// Prefix of every failure message raised during an attempt.
pub const ERROR_PREFIX: &str = "✗ Error: ";

/// How one submission attempt ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RequestOutcome {
    /// The service answered 2xx and the document was delivered.
    Success {
        #[serde(skip)]
        bytes: Vec<u8>,
        suggested_filename: String,
        saved_to: PathBuf,
    },
    /// The service answered with a non-2xx status.
    ServerRejected { status: u16, detail: String },
    /// The request never completed.
    NetworkFailure { reason: String },
    /// A precondition of the submit action failed; no request was issued.
    ValidationFailure { reason: String },
    /// Anything else that went wrong during the attempt.
    UnexpectedFailure { reason: String },
}

impl RequestOutcome {
    /// Fold an attempt error into its outcome.
    pub fn from_error(err: TranslateError) -> Self {
        match err {
            TranslateError::ServerRejected { status, detail } => {
                RequestOutcome::ServerRejected { status, detail }
            }
            TranslateError::Network { reason } => RequestOutcome::NetworkFailure { reason },
            TranslateError::Validation(reason) => RequestOutcome::ValidationFailure { reason },
            other => RequestOutcome::UnexpectedFailure {
                reason: other.to_string(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RequestOutcome::Success { .. })
    }

    /// The single-line message presented to the user.
    ///
    /// Validation messages are shown as-is; every other failure carries the
    /// `✗ Error: ` prefix.
    pub fn message(&self) -> String {
        match self {
            RequestOutcome::Success { .. } => SUCCESS_MESSAGE.to_string(),
            RequestOutcome::ValidationFailure { reason } => reason.clone(),
            RequestOutcome::ServerRejected { detail, .. } => format!("{ERROR_PREFIX}{detail}"),
            RequestOutcome::NetworkFailure { reason }
            | RequestOutcome::UnexpectedFailure { reason } => format!("{ERROR_PREFIX}{reason}"),
        }
    }

    pub fn severity(&self) -> Severity {
        if self.is_success() {
            Severity::Success
        } else {
            Severity::Error
        }
    }
}
