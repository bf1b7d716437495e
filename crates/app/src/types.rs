//! Core types for the Body Language Analyst app.
//!
//! `AppState` owns everything the UI shows: the gallery, the tagging editor,
//! the free-text context, the busy flag, and the result/error slots. All
//! mutations happen on the UI thread; the only suspended operation is the
//! analysis call, which reports back over an mpsc channel polled each frame.

use crate::ingest;
use crate::tagger::TagEditor;
use crate::utils::describe_failure;
use crate::widgets::DragDropHandler;
use eframe::egui;
use providers::gemini::GeminiClient;
use shared::gallery::Gallery;
use shared::prompt::build_analysis_prompt;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver};

/// Result from the background analysis call: success-with-text or
/// failure-with-reason, never both.
#[derive(Debug)]
pub enum AnalysisOutcome {
    Completed(String),
    Failed(String),
}

/// Main application state.
pub struct AppState {
    pub gallery: Gallery,
    /// Free-text context the user types for the model.
    pub context_text: String,
    /// Markdown result of the last analysis; empty means no result yet.
    pub analysis: String,
    /// Wall-clock time the last analysis finished, for display.
    pub analyzed_at: Option<String>,
    /// Current user-facing error, if any.
    pub last_error: Option<String>,
    /// Gates the analyze action while a request is in flight.
    pub is_analyzing: bool,
    pub tag_editor: TagEditor,
    pub drag_drop: DragDropHandler,
    /// Channel for the in-flight analysis, if any.
    pub analysis_rx: Option<Receiver<AnalysisOutcome>>,
    /// Decoded textures keyed by image id, created lazily per frame.
    pub textures: HashMap<String, egui::TextureHandle>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            gallery: Gallery::new(),
            context_text: String::new(),
            analysis: String::new(),
            analyzed_at: None,
            last_error: None,
            is_analyzing: false,
            tag_editor: TagEditor::default(),
            drag_drop: DragDropHandler::new("photo-drop"),
            analysis_rx: None,
            textures: HashMap::new(),
        }
    }
}

impl AppState {
    /// Ingest a batch of selected or dropped files. Failures become one
    /// aggregate message; successes accumulate into the gallery.
    pub fn ingest_paths(&mut self, paths: &[PathBuf]) {
        if paths.is_empty() {
            return;
        }
        let batch = ingest::ingest_files(paths);
        tracing::info!(
            added = batch.images.len(),
            failed = batch.failures.len(),
            "ingested upload batch"
        );
        self.last_error = batch.error_summary();
        self.gallery.extend(batch.images);
    }

    /// Decode any gallery image that does not have a texture yet. Images
    /// whose bytes turn out not to decode are dropped from the gallery with
    /// a user-visible message.
    pub fn ensure_textures(&mut self, ctx: &egui::Context) {
        let mut undecodable: Vec<String> = Vec::new();

        for image in self.gallery.images() {
            if self.textures.contains_key(&image.id) {
                continue;
            }
            match image::load_from_memory(&image.bytes) {
                Ok(decoded) => {
                    let rgba = decoded.to_rgba8();
                    let size = [rgba.width() as usize, rgba.height() as usize];
                    let color_image = egui::ColorImage::from_rgba_unmultiplied(size, &rgba);
                    let texture =
                        ctx.load_texture(&image.id, color_image, egui::TextureOptions::LINEAR);
                    self.textures.insert(image.id.clone(), texture);
                }
                Err(e) => {
                    tracing::warn!(file = %image.file_name, error = %e, "could not decode image");
                    undecodable.push(image.id.clone());
                }
            }
        }

        if !undecodable.is_empty() {
            for id in &undecodable {
                self.gallery.remove_image(id);
                self.tag_editor.forget_image(id);
            }
            self.last_error = Some(format!(
                "Could not process {} of the uploaded images.",
                undecodable.len()
            ));
        }
    }

    /// Remove one image, its tags, its texture, and any pending tag on it.
    pub fn remove_image(&mut self, image_id: &str) {
        if self.gallery.remove_image(image_id) {
            self.textures.remove(image_id);
            self.tag_editor.forget_image(image_id);
        }
    }

    /// Kick off the analysis in a background thread.
    ///
    /// Validation and the credential check both happen here, before any
    /// network activity. The prompt is a snapshot of the current state;
    /// later edits do not affect the in-flight request.
    pub fn start_analysis(&mut self) {
        if self.is_analyzing {
            return;
        }
        if self.gallery.is_empty() {
            self.last_error = Some("Please upload at least one image to analyze.".to_string());
            return;
        }

        let client = match GeminiClient::from_env() {
            Ok(client) => client,
            Err(e) => {
                self.last_error = Some(describe_failure(&e.to_string()));
                return;
            }
        };

        let prompt = build_analysis_prompt(&self.context_text, self.gallery.images());
        self.last_error = None;
        self.analysis.clear();
        self.is_analyzing = true;

        let (tx, rx) = channel::<AnalysisOutcome>();
        self.analysis_rx = Some(rx);
        std::thread::spawn(move || {
            crate::state::run_analysis(client, prompt, tx);
        });
    }

    /// Check for a completed analysis (called each frame). The outcome is
    /// applied to current state whenever it arrives, last write wins.
    pub fn poll_analysis(&mut self) {
        let Some(rx) = &self.analysis_rx else {
            return;
        };
        let Ok(outcome) = rx.try_recv() else {
            return;
        };

        self.is_analyzing = false;
        self.analysis_rx = None;
        match outcome {
            AnalysisOutcome::Completed(text) => {
                self.analysis = text;
                self.analyzed_at = Some(chrono::Local::now().format("%H:%M").to_string());
            }
            AnalysisOutcome::Failed(error) => {
                self.last_error = Some(describe_failure(&error));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn test_analyze_with_no_images_is_blocked_locally() {
        let mut state = AppState::default();
        state.start_analysis();

        assert!(!state.is_analyzing);
        // No request was started.
        assert!(state.analysis_rx.is_none());
        assert_eq!(
            state.last_error.as_deref(),
            Some("Please upload at least one image to analyze.")
        );
    }

    #[test]
    fn test_busy_flag_gates_retrigger() {
        let mut state = AppState::default();
        state.is_analyzing = true;
        state.start_analysis();
        // Still no channel: the second trigger was ignored.
        assert!(state.analysis_rx.is_none());
    }

    #[test]
    fn test_poll_applies_completed_result() {
        let mut state = AppState::default();
        let (tx, rx) = channel();
        state.analysis_rx = Some(rx);
        state.is_analyzing = true;

        tx.send(AnalysisOutcome::Completed("## Done".to_string()))
            .unwrap();
        state.poll_analysis();

        assert!(!state.is_analyzing);
        assert!(state.analysis_rx.is_none());
        assert_eq!(state.analysis, "## Done");
        assert!(state.analyzed_at.is_some());
        assert!(state.last_error.is_none());
    }

    #[test]
    fn test_poll_applies_failure_as_message() {
        let mut state = AppState::default();
        let (tx, rx) = channel();
        state.analysis_rx = Some(rx);
        state.is_analyzing = true;

        tx.send(AnalysisOutcome::Failed("gemini error: 429".to_string()))
            .unwrap();
        state.poll_analysis();

        assert!(!state.is_analyzing);
        assert!(state.analysis.is_empty());
        assert!(state.last_error.unwrap().contains("429"));
    }

    #[test]
    fn test_poll_without_result_keeps_waiting() {
        let mut state = AppState::default();
        let (_tx, rx) = channel::<AnalysisOutcome>();
        state.analysis_rx = Some(rx);
        state.is_analyzing = true;

        state.poll_analysis();
        assert!(state.is_analyzing);
        assert!(state.analysis_rx.is_some());
    }

    #[test]
    fn test_ingest_paths_accumulates_and_reports() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.png");
        let b = dir.path().join("b.jpg");
        for path in [&a, &b] {
            let mut f = std::fs::File::create(path).unwrap();
            f.write_all(&[0u8; 4]).unwrap();
        }

        let mut state = AppState::default();
        state.ingest_paths(&[a]);
        assert_eq!(state.gallery.len(), 1);
        assert!(state.last_error.is_none());

        // Second batch accumulates; the missing file is reported, the good
        // one is still added.
        state.ingest_paths(&[b, dir.path().join("missing.png")]);
        assert_eq!(state.gallery.len(), 2);
        assert!(state.last_error.unwrap().contains("missing.png"));
    }

    #[test]
    fn test_remove_image_clears_dependent_state() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.png");
        std::fs::write(&a, [0u8; 4]).unwrap();

        let mut state = AppState::default();
        state.ingest_paths(&[a]);
        let id = state.gallery.images()[0].id.clone();
        state.tag_editor.begin(&id, 5, 5);

        state.remove_image(&id);
        assert!(state.gallery.is_empty());
        assert!(state.tag_editor.pending().is_none());
    }
}
