//! Drag and drop handler for adding photos to the gallery.
//!
//! Uses egui's dropped_files functionality to handle file drops.

use eframe::egui;
use egui::{Context, Id, Rect, Response, Sense, Ui, Vec2};
use std::path::PathBuf;

/// Collects files dropped onto the window, one frame at a time.
pub struct DragDropHandler {
    dropped_files: Vec<PathBuf>,
    hovering: bool,
    id: Id,
}

impl DragDropHandler {
    pub fn new(id: impl std::hash::Hash) -> Self {
        Self {
            dropped_files: Vec::new(),
            hovering: false,
            id: Id::new(id),
        }
    }

    /// Capture this frame's dropped files; call once per frame.
    pub fn update(&mut self, ctx: &Context) {
        ctx.input(|i| {
            self.hovering = !i.raw.hovered_files.is_empty();
            for file in &i.raw.dropped_files {
                if let Some(path) = &file.path {
                    self.dropped_files.push(path.clone());
                }
            }
        });
    }

    /// Take and clear dropped files.
    pub fn take_dropped_files(&mut self) -> Vec<PathBuf> {
        std::mem::take(&mut self.dropped_files)
    }

    pub fn has_dropped_files(&self) -> bool {
        !self.dropped_files.is_empty()
    }

    /// Check if files are currently being dragged over the window.
    pub fn is_hovering(&self) -> bool {
        self.hovering
    }

    /// Show the upload drop zone.
    pub fn show_drop_zone(&mut self, ui: &mut Ui, label: &str) -> Response {
        let size = Vec2::new(ui.available_width(), 64.0);
        let (rect, response) = ui.allocate_exact_size(size, Sense::click());

        let visuals = if self.hovering {
            ui.visuals().widgets.hovered
        } else {
            ui.visuals().widgets.inactive
        };
        ui.painter().rect(rect, 6.0, visuals.bg_fill, visuals.bg_stroke);
        if self.hovering {
            let stroke = egui::Stroke::new(2.0, ui.visuals().selection.bg_fill);
            ui.painter().rect_stroke(rect, 6.0, stroke);
        }

        ui.painter().text(
            rect.center(),
            egui::Align2::CENTER_CENTER,
            if self.hovering {
                "📥 Drop photos here"
            } else {
                label
            },
            egui::FontId::proportional(14.0),
            if self.hovering {
                ui.visuals().strong_text_color()
            } else {
                ui.visuals().text_color()
            },
        );

        response
    }

    /// Full-window overlay while photos are being dragged over the app.
    pub fn show_drag_overlay(&self, ctx: &Context) {
        if !self.hovering {
            return;
        }

        egui::Area::new(self.id.with("overlay"))
            .order(egui::Order::Foreground)
            .anchor(egui::Align2::CENTER_CENTER, Vec2::ZERO)
            .show(ctx, |ui| {
                let screen_rect = ctx.screen_rect();
                ui.painter().rect_filled(
                    screen_rect,
                    0.0,
                    egui::Color32::from_black_alpha(100),
                );

                let indicator_rect =
                    Rect::from_center_size(screen_rect.center(), Vec2::new(300.0, 150.0));
                ui.painter().rect(
                    indicator_rect,
                    8.0,
                    ui.visuals().extreme_bg_color,
                    egui::Stroke::new(3.0, ui.visuals().selection.bg_fill),
                );
                ui.painter().text(
                    indicator_rect.center(),
                    egui::Align2::CENTER_CENTER,
                    "📥 Drop photos to add them",
                    egui::FontId::proportional(18.0),
                    ui.visuals().strong_text_color(),
                );
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handler_starts_empty() {
        let handler = DragDropHandler::new("test");
        assert!(!handler.is_hovering());
        assert!(!handler.has_dropped_files());
    }
}
