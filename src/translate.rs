//! One-shot entry points.
//!
//! For callers that just want "this PDF in, translated document out" without
//! driving a [`SubmissionController`] themselves. Both functions build a
//! controller from the config, select the file as if it came from the file
//! picker, and submit once.

use crate::config::ClientConfig;
use crate::controller::SubmissionController;
use crate::direction::TranslationDirection;
use crate::error::TranslateError;
use crate::input::SelectedFile;
use crate::outcome::RequestOutcome;
use crate::presentation::NoopPresenter;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Translate the PDF at `path` and save the result under
/// `config.output_dir`.
///
/// # Errors
/// Returns `Err` when the file cannot be read or the config is unusable.
/// Everything that happens after the file is selected (including a non-PDF
/// file being ignored) is reported through the returned [`RequestOutcome`].
pub async fn translate(
    path: impl AsRef<Path>,
    direction: TranslationDirection,
    config: &ClientConfig,
) -> Result<RequestOutcome, TranslateError> {
    let path = path.as_ref();
    info!("Translating {} ({})", path.display(), direction);

    let file = SelectedFile::from_path(path).await?;
    let controller = SubmissionController::from_config(config, Arc::new(NoopPresenter))?;
    controller.set_direction(Some(direction));
    controller.select_via_browse(vec![file]);
    controller.submit().await
}

/// Synchronous wrapper around [`translate`].
///
/// Creates a temporary tokio runtime internally.
pub fn translate_sync(
    path: impl AsRef<Path>,
    direction: TranslationDirection,
    config: &ClientConfig,
) -> Result<RequestOutcome, TranslateError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| TranslateError::Unexpected(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(translate(path, direction, config))
}
