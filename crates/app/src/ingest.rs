//! File ingestion: turn user-selected files into `TaggedImage` records.
//!
//! Each file is read from disk and base64-encoded; the mime type is guessed
//! from the extension. A failure on one file never aborts the rest of the
//! batch — failures are collected and reported as one aggregate message.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use shared::model::TaggedImage;
use std::path::{Path, PathBuf};

/// Extensions accepted by the file picker and the drop zone.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp"];

/// Guess the mime type from the file extension. `None` means the file is not
/// a supported image; no deeper format validation is performed.
pub fn mime_type_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "bmp" => Some("image/bmp"),
        _ => None,
    }
}

/// Outcome of ingesting one batch of files.
#[derive(Debug, Default)]
pub struct IngestBatch {
    pub images: Vec<TaggedImage>,
    /// (file name, reason) per file that could not be processed.
    pub failures: Vec<(String, String)>,
}

impl IngestBatch {
    /// One aggregate, user-visible message covering every failed file in the
    /// batch, or `None` when everything succeeded.
    pub fn error_summary(&self) -> Option<String> {
        if self.failures.is_empty() {
            return None;
        }
        let names: Vec<&str> = self.failures.iter().map(|(name, _)| name.as_str()).collect();
        Some(format!(
            "Could not process {} of {} selected file(s): {}",
            self.failures.len(),
            self.failures.len() + self.images.len(),
            names.join(", ")
        ))
    }
}

/// Read and encode every file in `paths`. Unreadable or non-image files are
/// skipped and recorded; successfully encoded files become `TaggedImage`
/// records in input order.
pub fn ingest_files(paths: &[PathBuf]) -> IngestBatch {
    let mut batch = IngestBatch::default();

    for path in paths {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        let Some(mime_type) = mime_type_for(path) else {
            tracing::warn!(path = %path.display(), "skipping non-image file");
            batch
                .failures
                .push((file_name, "not a supported image type".to_string()));
            continue;
        };

        match std::fs::read(path) {
            Ok(bytes) => {
                let encoded = STANDARD.encode(&bytes);
                batch
                    .images
                    .push(TaggedImage::new(file_name, mime_type, bytes, encoded));
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping unreadable file");
                batch.failures.push((file_name, e.to_string()));
            }
        }
    }

    batch
}
