//! # pdf-translate
//!
//! Submit a PDF to a remote translation service and save the translated
//! document it sends back.
//!
//! The translation itself happens on the server. This crate is the client
//! side: picking or dropping a file, validating it, posting it, and turning
//! every possible result into one deterministic UI state and message.
//!
//! ## Workflow
//!
//! ```text
//! pick / drop ──▶ InputCollector ──▶ SubmissionController ──▶ TranslationService
//!                 (one PDF slot)      Idle → Busy → …          POST /translate
//!                                          │
//!                      Presenter ◀── View ◀┴──▶ DownloadSink (translated.docx)
//! ```
//!
//! 1. [`input`]      — the single selected-file slot, browse and drop paths
//! 2. [`controller`] — `Idle → Busy → Succeeded | Failed`, one attempt at a time
//! 3. [`service`]    — multipart `POST <base_url>/translate`
//! 4. [`download`]   — saves the response body as `translated.docx`
//! 5. [`presentation`] — pure state → [`View`] mapping and the [`Presenter`] trait
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf_translate::{translate, ClientConfig, TranslationDirection};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::builder()
//!         .base_url("http://localhost:8000")
//!         .output_dir("out")
//!         .build()?;
//!     let outcome = translate("paper.pdf", TranslationDirection::EnKm, &config).await?;
//!     println!("{}", outcome.message());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf-translate` binary (clap + anyhow + indicatif + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod controller;
pub mod direction;
pub mod download;
pub mod error;
pub mod input;
pub mod outcome;
pub mod presentation;
pub mod service;
pub mod translate;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ClientConfig, ClientConfigBuilder};
pub use controller::{Session, SubmissionController, UiState};
pub use direction::{DirectionSelector, TranslationDirection};
pub use download::{DownloadSink, FileDownloadSink};
pub use error::TranslateError;
pub use input::{InputCollector, SelectedFile, PDF_MIME};
pub use outcome::RequestOutcome;
pub use presentation::{
    reflect, NoopPresenter, Presenter, Severity, SharedPresenter, StatusMessage, TriggerControl,
    View,
};
pub use service::{HttpTranslationService, TranslationService};
pub use translate::{translate, translate_sync};
