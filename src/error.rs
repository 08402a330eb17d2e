//! Error types for the pdf-translate library.
//!
//! [`TranslateError`] covers every way a single submission attempt, a file
//! selection, or a configuration can fail. The
//! [`crate::controller::SubmissionController`] never lets an attempt error
//! escape: it folds each one into a [`crate::outcome::RequestOutcome`] and a
//! user-visible message. The only error `submit` itself returns is
//! [`TranslateError::SubmissionInFlight`].

use std::error::Error as StdError;
use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the pdf-translate library.
#[derive(Debug, Error)]
pub enum TranslateError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// A precondition of the submit action was not met.
    #[error("{0}")]
    Validation(String),

    /// Input file was not found at the given path.
    #[error("File not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// Reading the selected file failed for another reason.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Request errors ────────────────────────────────────────────────────
    /// The translation service answered with a non-2xx status.
    ///
    /// `detail` is the server-provided explanation, or a generic fallback
    /// when the body carried none.
    #[error("{detail}")]
    ServerRejected { status: u16, detail: String },

    /// The request could not be completed at all (DNS, connect, reset…).
    #[error("{reason}")]
    Network { reason: String },

    /// A submission is already in flight; the new one was not started.
    #[error("A translation is already in progress")]
    SubmissionInFlight,

    // ── Output errors ─────────────────────────────────────────────────────
    /// Could not write the downloaded document.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Anything else raised during an attempt.
    #[error("{0}")]
    Unexpected(String),
}

impl TranslateError {
    /// Build a [`TranslateError::Network`] from a transport error, keeping
    /// the whole source chain so the root cause (e.g. "Connection refused")
    /// reaches the user.
    pub fn network(err: &(dyn StdError + 'static)) -> Self {
        TranslateError::Network {
            reason: error_chain(err),
        }
    }
}

/// Render an error and all of its sources as `outer: inner: root`.
pub(crate) fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut out = err.to_string();
    let mut current = err.source();
    while let Some(source) = current {
        let text = source.to_string();
        if !out.contains(&text) {
            out.push_str(": ");
            out.push_str(&text);
        }
        current = source.source();
    }
    out
}
