//! Input collection: the single selected-file slot and the two ways to fill it.
//!
//! A file reaches the slot either through the file picker
//! ([`InputCollector::select_via_browse`]) or through drag-and-drop
//! ([`InputCollector::select_via_drop`]). Both paths apply the same policy:
//! the candidate's declared MIME type must be `application/pdf`, otherwise the
//! selection is ignored without a user-facing message. Rejections are logged
//! at `debug` so they are still visible when diagnosing.

use crate::error::TranslateError;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// MIME type accepted by the collector.
pub const PDF_MIME: &str = "application/pdf";

/// Declared type for anything that does not look like a PDF.
pub const OCTET_STREAM_MIME: &str = "application/octet-stream";

const PDF_MAGIC: &[u8; 4] = b"%PDF";

/// The candidate file awaiting submission.
///
/// Content is shared, so cloning a `SelectedFile` for a submission attempt
/// does not copy the bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    name: String,
    mime: String,
    content: Arc<[u8]>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, content: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            content: content.into(),
        }
    }

    /// Load a file from disk, declaring its MIME type the way a browser
    /// would: `application/pdf` for a `.pdf` extension or `%PDF` content,
    /// `application/octet-stream` otherwise.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, TranslateError> {
        let path = path.as_ref();
        let content = tokio::fs::read(path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => TranslateError::FileNotFound {
                path: path.to_path_buf(),
            },
            std::io::ErrorKind::PermissionDenied => TranslateError::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => TranslateError::ReadFailed {
                path: path.to_path_buf(),
                source: e,
            },
        })?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let mime = declared_mime(path, &content);
        debug!("Loaded {} ({} bytes, {})", path.display(), content.len(), mime);

        Ok(Self::new(name, mime, content))
    }

    /// Display name shown to the user.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared MIME type.
    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn is_pdf(&self) -> bool {
        self.mime.eq_ignore_ascii_case(PDF_MIME)
    }
}

fn declared_mime(path: &Path, content: &[u8]) -> &'static str {
    let pdf_extension = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false);
    if pdf_extension || content.starts_with(PDF_MAGIC) {
        PDF_MIME
    } else {
        OCTET_STREAM_MIME
    }
}

/// Owns the selected-file slot, the displayed file name and the drop-zone
/// highlight.
#[derive(Debug, Clone, Default)]
pub struct InputCollector {
    selected: Option<SelectedFile>,
    highlighted: bool,
}

impl InputCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply the result of the file picker.
    ///
    /// Exactly one chosen PDF replaces the current selection. Cancelling the
    /// picker (nothing chosen), choosing several files, or choosing a non-PDF
    /// leaves the slot unchanged. Returns whether the selection changed.
    pub fn select_via_browse(&mut self, mut chosen: Vec<SelectedFile>) -> bool {
        if chosen.len() != 1 {
            debug!("Browse ignored: {} files chosen", chosen.len());
            return false;
        }
        let file = chosen.remove(0);
        self.accept(file, "browse")
    }

    /// Apply a drop. Only the first dropped item is considered.
    pub fn select_via_drop(&mut self, dropped: Vec<SelectedFile>) -> bool {
        self.highlighted = false;
        match dropped.into_iter().next() {
            Some(first) => self.accept(first, "drop"),
            None => {
                debug!("Drop ignored: no items");
                false
            }
        }
    }

    fn accept(&mut self, file: SelectedFile, via: &str) -> bool {
        if !file.is_pdf() {
            debug!(
                "Selection via {via} ignored: '{}' has type {}",
                file.name(),
                file.mime()
            );
            return false;
        }
        debug!("Selected '{}' via {via}", file.name());
        self.selected = Some(file);
        true
    }

    /// Drag entered the drop zone.
    pub fn drag_over(&mut self) {
        self.highlighted = true;
    }

    /// Drag left the drop zone without dropping.
    pub fn drag_leave(&mut self) {
        self.highlighted = false;
    }

    pub fn selected(&self) -> Option<&SelectedFile> {
        self.selected.as_ref()
    }

    /// Name of the selected file, if any.
    pub fn display_name(&self) -> Option<&str> {
        self.selected.as_ref().map(SelectedFile::name)
    }

    pub fn is_highlighted(&self) -> bool {
        self.highlighted
    }
}
