//! Click-to-tag interaction.
//!
//! `TagEditor` is the small state machine behind the tagging flow: idle until
//! the user clicks an image, then holding one pending tag (coordinates plus a
//! name being typed) until it is committed or cancelled. At most one tag is
//! pending across the whole gallery; clicking anywhere restarts the capture at
//! the new position.
//!
//! `image_tagger_ui` draws one gallery entry: the photo, its numbered tag
//! markers, the pending-name popup, and the remove button.

use eframe::egui;
use shared::model::{Tag, TaggedImage};

/// Candidate tag captured by a click, name not yet committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTag {
    pub image_id: String,
    pub x: i32,
    pub y: i32,
    pub name: String,
}

/// Idle/Pending state machine for tag entry.
#[derive(Debug, Default)]
pub struct TagEditor {
    pending: Option<PendingTag>,
    focus_requested: bool,
}

impl TagEditor {
    /// Capture a new candidate position. Any prior pending tag is discarded,
    /// so clicking elsewhere restarts the capture instead of stacking popups.
    pub fn begin(&mut self, image_id: &str, x: i32, y: i32) {
        self.pending = Some(PendingTag {
            image_id: image_id.to_string(),
            x,
            y,
            name: String::new(),
        });
        self.focus_requested = true;
    }

    pub fn pending(&self) -> Option<&PendingTag> {
        self.pending.as_ref()
    }

    pub fn is_pending_for(&self, image_id: &str) -> bool {
        self.pending
            .as_ref()
            .map(|p| p.image_id == image_id)
            .unwrap_or(false)
    }

    /// Mutable access to the candidate name, for binding to a text field.
    pub fn name_mut(&mut self) -> Option<&mut String> {
        self.pending.as_mut().map(|p| &mut p.name)
    }

    /// True exactly once after `begin`, so the name field grabs focus.
    pub fn take_focus_request(&mut self) -> bool {
        std::mem::take(&mut self.focus_requested)
    }

    pub fn cancel(&mut self) {
        self.pending = None;
        self.focus_requested = false;
    }

    /// Finish the pending tag. Returns the image id and the tag to store, or
    /// `None` when the name trims to nothing. Either way the editor returns
    /// to idle and the popup is dismissed.
    pub fn commit(&mut self) -> Option<(String, Tag)> {
        self.focus_requested = false;
        let pending = self.pending.take()?;
        let name = pending.name.trim();
        if name.is_empty() {
            return None;
        }
        Some((pending.image_id, Tag::new(pending.x, pending.y, name)))
    }

    /// Drop the pending tag if it targets a removed image.
    pub fn forget_image(&mut self, image_id: &str) {
        if self.is_pending_for(image_id) {
            self.cancel();
        }
    }
}

/// What the user did to one gallery entry this frame.
#[derive(Debug, Default)]
pub struct TaggerResponse {
    pub remove_clicked: bool,
    /// Tag committed this frame, with the id of the image it belongs to.
    pub committed: Option<(String, Tag)>,
}

const MARKER_RADIUS: f32 = 8.0;
const MAX_DISPLAY_WIDTH: f32 = 480.0;

/// Draw one image with its markers and tagging popup.
pub fn image_tagger_ui(
    ui: &mut egui::Ui,
    image: &TaggedImage,
    texture: &egui::TextureHandle,
    editor: &mut TagEditor,
) -> TaggerResponse {
    let mut response = TaggerResponse::default();
    let accent = egui::Color32::from_rgb(80, 170, 240);

    // Caption row: file name, tag count, remove button.
    ui.horizontal(|ui| {
        ui.label(
            egui::RichText::new(&image.file_name)
                .size(12.0)
                .color(ui.visuals().weak_text_color()),
        );
        if !image.tags.is_empty() {
            ui.label(
                egui::RichText::new(format!("({} tagged)", image.tags.len()))
                    .size(11.0)
                    .color(accent),
            );
        }
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui
                .small_button("✕")
                .on_hover_text("Remove this image and its tags")
                .clicked()
            {
                response.remove_clicked = true;
            }
        });
    });

    let tex_size = texture.size_vec2();
    let scale = (ui.available_width().min(MAX_DISPLAY_WIDTH) / tex_size.x).min(1.0);
    let display_size = tex_size * scale;

    let (rect, img_response) = ui.allocate_exact_size(display_size, egui::Sense::click());
    ui.painter().image(
        texture.id(),
        rect,
        egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
        egui::Color32::WHITE,
    );

    if img_response.hovered() {
        ui.ctx().set_cursor_icon(egui::CursorIcon::Crosshair);
    }
    let img_response = img_response.on_hover_text("Click to tag a person");

    // A click captures coordinates relative to the displayed image, rounded
    // to whole pixels. Any previously pending tag is replaced.
    if img_response.clicked() {
        if let Some(pos) = img_response.interact_pointer_pos() {
            let x = (pos.x - rect.min.x).round() as i32;
            let y = (pos.y - rect.min.y).round() as i32;
            editor.begin(&image.id, x, y);
        }
    }

    // Committed markers, numbered by insertion order.
    for (index, tag) in image.tags.iter().enumerate() {
        let center = rect.min + egui::vec2(tag.x as f32, tag.y as f32);
        ui.painter().circle_filled(center, MARKER_RADIUS, accent);
        ui.painter().circle_stroke(
            center,
            MARKER_RADIUS,
            egui::Stroke::new(1.5, egui::Color32::WHITE),
        );
        ui.painter().text(
            center,
            egui::Align2::CENTER_CENTER,
            (index + 1).to_string(),
            egui::FontId::proportional(10.0),
            egui::Color32::WHITE,
        );
        // Name below the marker, shadowed for readability on any photo.
        let label_pos = center + egui::vec2(0.0, MARKER_RADIUS + 4.0);
        ui.painter().text(
            label_pos + egui::vec2(1.0, 1.0),
            egui::Align2::CENTER_TOP,
            &tag.name,
            egui::FontId::proportional(12.0),
            egui::Color32::BLACK,
        );
        ui.painter().text(
            label_pos,
            egui::Align2::CENTER_TOP,
            &tag.name,
            egui::FontId::proportional(12.0),
            egui::Color32::WHITE,
        );
    }

    // Pending marker plus the name popup.
    if editor.is_pending_for(&image.id) {
        let (px, py) = editor
            .pending()
            .map(|p| (p.x as f32, p.y as f32))
            .unwrap_or_default();
        let center = rect.min + egui::vec2(px, py);
        ui.painter()
            .circle_stroke(center, MARKER_RADIUS, egui::Stroke::new(2.0, accent));

        let mut submit = false;
        let mut cancel = false;
        egui::Area::new(egui::Id::new(("pending-tag", &image.id)))
            .order(egui::Order::Foreground)
            .fixed_pos(center + egui::vec2(0.0, MARKER_RADIUS + 6.0))
            .show(ui.ctx(), |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.horizontal(|ui| {
                        let name = editor
                            .name_mut()
                            .expect("pending tag checked above");
                        let edit = ui.add(
                            egui::TextEdit::singleline(name)
                                .hint_text("Person's name")
                                .desired_width(140.0),
                        );
                        if editor.take_focus_request() {
                            edit.request_focus();
                        }
                        if edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                            submit = true;
                        }
                        if ui.button("Tag").clicked() {
                            submit = true;
                        }
                        if ui.input(|i| i.key_pressed(egui::Key::Escape)) {
                            cancel = true;
                        }
                    });
                });
            });

        if cancel {
            editor.cancel();
        } else if submit {
            response.committed = editor.commit();
        }
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_trims_name() {
        let mut editor = TagEditor::default();
        editor.begin("img-1", 10, 20);
        *editor.name_mut().unwrap() = "  Alice  ".to_string();

        let (image_id, tag) = editor.commit().unwrap();
        assert_eq!(image_id, "img-1");
        assert_eq!(tag, Tag::new(10, 20, "Alice"));
        assert!(editor.pending().is_none());
    }

    #[test]
    fn test_whitespace_name_commits_nothing_and_dismisses() {
        let mut editor = TagEditor::default();
        editor.begin("img-1", 3, 4);
        *editor.name_mut().unwrap() = "   ".to_string();

        assert!(editor.commit().is_none());
        // The popup is gone either way.
        assert!(editor.pending().is_none());
    }

    #[test]
    fn test_commit_while_idle_is_none() {
        let mut editor = TagEditor::default();
        assert!(editor.commit().is_none());
    }

    #[test]
    fn test_new_click_replaces_pending_tag() {
        let mut editor = TagEditor::default();
        editor.begin("img-1", 1, 1);
        *editor.name_mut().unwrap() = "half-typed".to_string();

        editor.begin("img-2", 9, 9);
        let pending = editor.pending().unwrap();
        assert_eq!(pending.image_id, "img-2");
        assert_eq!((pending.x, pending.y), (9, 9));
        assert!(pending.name.is_empty());
    }

    #[test]
    fn test_focus_requested_once_per_capture() {
        let mut editor = TagEditor::default();
        editor.begin("img-1", 0, 0);
        assert!(editor.take_focus_request());
        assert!(!editor.take_focus_request());
    }

    #[test]
    fn test_forget_image_clears_matching_pending() {
        let mut editor = TagEditor::default();
        editor.begin("img-1", 0, 0);
        editor.forget_image("img-2");
        assert!(editor.is_pending_for("img-1"));
        editor.forget_image("img-1");
        assert!(editor.pending().is_none());
    }
}
