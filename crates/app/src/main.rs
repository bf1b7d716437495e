//! Body Language Analyst: upload photos, tag the people in them, and ask
//! Gemini for an expert read of the scene.

use eframe::egui;
use parking_lot::Mutex;
use shared::model::Tag;
use std::sync::Arc;

mod ingest;
mod markdown;
mod state;
mod tagger;
mod types;
mod utils;
mod widgets;

pub use types::*;

use tagger::image_tagger_ui;

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([800.0, 600.0]),
        vsync: true,
        ..Default::default()
    };
    eframe::run_native(
        "Body Language Analyst",
        options,
        Box::new(|_cc| {
            Box::new(AnalystApp {
                state: Arc::new(Mutex::new(AppState::default())),
            })
        }),
    )
}

struct AnalystApp {
    state: Arc<Mutex<AppState>>,
}

impl eframe::App for AnalystApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut s = self.state.lock();

        // Poll for the analysis result (non-blocking).
        s.poll_analysis();
        if s.is_analyzing {
            ctx.request_repaint();
        }

        // Dropped files become gallery entries.
        s.drag_drop.update(ctx);
        if s.drag_drop.has_dropped_files() {
            let dropped = s.drag_drop.take_dropped_files();
            s.ingest_paths(&dropped);
        }
        s.ensure_textures(ctx);

        let mut style = (*ctx.style()).clone();
        style.visuals = egui::Visuals::dark();
        style.visuals.panel_fill = egui::Color32::from_rgb(30, 30, 35);
        style.visuals.window_rounding = egui::Rounding::same(12.0);
        style.spacing.item_spacing = egui::vec2(8.0, 8.0);
        ctx.set_style(style);

        render_controls_panel(&mut s, ctx);
        render_gallery_panel(&mut s, ctx);

        s.drag_drop.show_drag_overlay(ctx);
    }
}

/// Left panel: upload, context, and the analyze trigger.
fn render_controls_panel(s: &mut AppState, ctx: &egui::Context) {
    let accent = egui::Color32::from_rgb(80, 170, 240);

    egui::SidePanel::left("controls")
        .resizable(true)
        .default_width(340.0)
        .show(ctx, |ui| {
            ui.add_space(12.0);
            ui.heading(
                egui::RichText::new("Body Language Analyst")
                    .size(22.0)
                    .color(accent),
            );
            ui.label(
                egui::RichText::new("Uncover the unspoken stories in your photos.")
                    .color(ui.visuals().weak_text_color()),
            );
            ui.separator();

            ui.label(egui::RichText::new("1. Upload photos").strong());
            let drop_zone = s
                .drag_drop
                .show_drop_zone(ui, "📎 Drop photos or click to browse");
            if drop_zone.clicked() {
                if let Some(paths) = rfd::FileDialog::new()
                    .add_filter("Images", ingest::IMAGE_EXTENSIONS)
                    .pick_files()
                {
                    s.ingest_paths(&paths);
                }
            }
            if !s.gallery.is_empty() {
                ui.label(
                    egui::RichText::new(format!("{} photo(s) uploaded", s.gallery.len()))
                        .size(12.0)
                        .color(ui.visuals().weak_text_color()),
                );
            }

            ui.add_space(8.0);
            ui.label(egui::RichText::new("2. Add context (optional)").strong());
            ui.add(
                egui::TextEdit::multiline(&mut s.context_text)
                    .desired_rows(4)
                    .desired_width(f32::INFINITY)
                    .hint_text("e.g. 'A team meeting discussing a new project.'"),
            );

            ui.add_space(12.0);
            let can_analyze = !s.is_analyzing && !s.gallery.is_empty();
            let analyze = ui.add_enabled(
                can_analyze,
                egui::Button::new(
                    egui::RichText::new("✨ Analyze Body Language")
                        .size(15.0)
                        .color(egui::Color32::WHITE),
                )
                .fill(accent)
                .min_size(egui::vec2(ui.available_width(), 36.0)),
            );
            if analyze.clicked() {
                s.start_analysis();
            }

            if s.is_analyzing {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Analyzing…");
                });
            }

            if let Some(error) = &s.last_error {
                ui.add_space(4.0);
                ui.colored_label(egui::Color32::from_rgb(240, 110, 110), error);
            }
        });
}

/// Central panel: the tagged images plus the analysis result.
fn render_gallery_panel(s: &mut AppState, ctx: &egui::Context) {
    egui::CentralPanel::default().show(ctx, |ui| {
        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.heading("Uploaded Images");
                if s.gallery.is_empty() {
                    ui.label(
                        egui::RichText::new(
                            "Your photos will appear here. Click on them to tag people!",
                        )
                        .color(ui.visuals().weak_text_color()),
                    );
                } else {
                    // One pass over the gallery, collecting actions; they are
                    // applied after the borrow of the image list ends.
                    let mut removals: Vec<String> = Vec::new();
                    let mut committed: Option<(String, Tag)> = None;
                    {
                        let AppState {
                            gallery,
                            tag_editor,
                            textures,
                            ..
                        } = &mut *s;
                        for image in gallery.images() {
                            let Some(texture) = textures.get(&image.id) else {
                                continue;
                            };
                            let response = image_tagger_ui(ui, image, texture, tag_editor);
                            if response.remove_clicked {
                                removals.push(image.id.clone());
                            }
                            if response.committed.is_some() {
                                committed = response.committed;
                            }
                            ui.add_space(12.0);
                        }
                    }
                    if let Some((image_id, tag)) = committed {
                        s.gallery.add_tag(&image_id, tag);
                    }
                    for image_id in removals {
                        s.remove_image(&image_id);
                    }
                }

                ui.separator();
                ui.horizontal(|ui| {
                    ui.heading("Analysis Results");
                    if let Some(at) = &s.analyzed_at {
                        ui.label(
                            egui::RichText::new(format!("analyzed at {}", at))
                                .size(11.0)
                                .color(ui.visuals().weak_text_color()),
                        );
                    }
                });

                if s.is_analyzing {
                    ui.label("Gemini is analyzing the images…");
                } else if s.analysis.is_empty() {
                    ui.label(
                        egui::RichText::new("Your expert analysis will be displayed here.")
                            .color(ui.visuals().weak_text_color()),
                    );
                } else {
                    markdown::render_markdown(ui, &s.analysis, ui.visuals().text_color());
                }
                ui.add_space(16.0);
            });
    });
}
