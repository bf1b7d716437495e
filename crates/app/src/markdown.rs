//! Markdown renderer for the analysis panel.
//!
//! Handles the subset Gemini produces for this prompt: `#`–`####` headings,
//! `-`/`*` bullets, GFM tables, `**bold**`, `` `inline code` ``, and
//! `[text](url)` links. Parsing is split from painting so the block and
//! inline grammars can be unit tested.

use eframe::egui;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Block<'a> {
    Blank,
    Heading(u8, &'a str),
    Bullet(&'a str),
    Paragraph(&'a str),
    Table {
        header: Vec<&'a str>,
        rows: Vec<Vec<&'a str>>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Span<'a> {
    Plain(&'a str),
    Bold(&'a str),
    Code(&'a str),
    Link { text: &'a str, url: &'a str },
}

fn parse_blocks(text: &str) -> Vec<Block<'_>> {
    let lines: Vec<&str> = text.lines().collect();
    let mut blocks = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let trimmed = lines[i].trim();

        if trimmed.is_empty() {
            blocks.push(Block::Blank);
            i += 1;
            continue;
        }

        // Table: a pipe row immediately followed by a separator row.
        if is_table_row(trimmed) && i + 1 < lines.len() && is_table_separator(lines[i + 1].trim())
        {
            let header = split_table_row(trimmed);
            let mut rows = Vec::new();
            i += 2;
            while i < lines.len() && is_table_row(lines[i].trim()) {
                rows.push(split_table_row(lines[i].trim()));
                i += 1;
            }
            blocks.push(Block::Table { header, rows });
            continue;
        }

        let block = if let Some(rest) = trimmed.strip_prefix("#### ") {
            Block::Heading(4, rest)
        } else if let Some(rest) = trimmed.strip_prefix("### ") {
            Block::Heading(3, rest)
        } else if let Some(rest) = trimmed.strip_prefix("## ") {
            Block::Heading(2, rest)
        } else if let Some(rest) = trimmed.strip_prefix("# ") {
            Block::Heading(1, rest)
        } else if let Some(rest) = trimmed.strip_prefix("- ") {
            Block::Bullet(rest)
        } else if let Some(rest) = trimmed.strip_prefix("* ") {
            Block::Bullet(rest)
        } else {
            Block::Paragraph(trimmed)
        };
        blocks.push(block);
        i += 1;
    }

    blocks
}

fn is_table_row(line: &str) -> bool {
    line.starts_with('|') && line.len() > 1
}

/// Separator rows look like `| --- | :---: |`.
fn is_table_separator(line: &str) -> bool {
    if !is_table_row(line) {
        return false;
    }
    let cells = split_table_row(line);
    !cells.is_empty()
        && cells.iter().all(|cell| {
            !cell.is_empty()
                && cell
                    .chars()
                    .all(|c| c == '-' || c == ':')
        })
}

fn split_table_row(line: &str) -> Vec<&str> {
    line.trim_matches('|')
        .split('|')
        .map(str::trim)
        .collect()
}

fn parse_inline(text: &str) -> Vec<Span<'_>> {
    let mut spans = Vec::new();
    let mut rest = text;

    while !rest.is_empty() {
        let bold = rest.find("**").and_then(|start| {
            rest[start + 2..]
                .find("**")
                .map(|len| (start, start + 2, start + 2 + len, start + 4 + len))
        });
        let code = rest.find('`').and_then(|start| {
            rest[start + 1..]
                .find('`')
                .map(|len| (start, start + 1, start + 1 + len, start + 2 + len))
        });
        let link = find_link(rest);

        // Earliest well-formed marker wins.
        let mut next: Option<(usize, Span<'_>, usize)> = None;
        if let Some((start, from, to, end)) = bold {
            next = Some((start, Span::Bold(&rest[from..to]), end));
        }
        if let Some((start, from, to, end)) = code {
            if next.as_ref().map_or(true, |(s, _, _)| start < *s) {
                next = Some((start, Span::Code(&rest[from..to]), end));
            }
        }
        if let Some((start, span, end)) = link {
            if next.as_ref().map_or(true, |(s, _, _)| start < *s) {
                next = Some((start, span, end));
            }
        }

        match next {
            Some((start, span, end)) => {
                if start > 0 {
                    spans.push(Span::Plain(&rest[..start]));
                }
                spans.push(span);
                rest = &rest[end..];
            }
            None => {
                spans.push(Span::Plain(rest));
                break;
            }
        }
    }

    spans
}

fn find_link(text: &str) -> Option<(usize, Span<'_>, usize)> {
    let start = text.find('[')?;
    let close = start + text[start..].find("](")?;
    let paren = close + 2 + text[close + 2..].find(')')?;
    Some((
        start,
        Span::Link {
            text: &text[start + 1..close],
            url: &text[close + 2..paren],
        },
        paren + 1,
    ))
}

/// Render markdown text into an egui UI region.
pub fn render_markdown(ui: &mut egui::Ui, text: &str, base_color: egui::Color32) {
    let link_color = egui::Color32::from_rgb(100, 170, 240);
    let code_bg = if base_color.r() > 128 {
        egui::Color32::from_rgb(60, 60, 70)
    } else {
        egui::Color32::from_rgb(230, 232, 236)
    };

    for (index, block) in parse_blocks(text).into_iter().enumerate() {
        match block {
            Block::Blank => ui.add_space(6.0),
            Block::Heading(level, rest) => {
                let size = match level {
                    1 => 18.0,
                    2 => 16.0,
                    3 => 15.0,
                    _ => 14.0,
                };
                ui.add_space(8.0 - level as f32);
                ui.label(
                    egui::RichText::new(rest)
                        .strong()
                        .size(size)
                        .color(base_color),
                );
                ui.add_space(2.0);
            }
            Block::Bullet(rest) => {
                ui.horizontal_wrapped(|ui| {
                    ui.label(egui::RichText::new("  •  ").size(14.0).color(base_color));
                    render_spans(ui, rest, base_color, link_color, code_bg);
                });
            }
            Block::Paragraph(rest) => {
                ui.horizontal_wrapped(|ui| {
                    render_spans(ui, rest, base_color, link_color, code_bg);
                });
            }
            Block::Table { header, rows } => {
                render_table(ui, index, &header, &rows, base_color, link_color, code_bg);
            }
        }
    }
}

fn render_spans(
    ui: &mut egui::Ui,
    text: &str,
    base_color: egui::Color32,
    link_color: egui::Color32,
    code_bg: egui::Color32,
) {
    let base_size = 14.0;
    for span in parse_inline(text) {
        match span {
            Span::Plain(s) => {
                ui.label(egui::RichText::new(s).size(base_size).color(base_color));
            }
            Span::Bold(s) => {
                ui.label(
                    egui::RichText::new(s)
                        .size(base_size)
                        .strong()
                        .color(base_color),
                );
            }
            Span::Code(s) => {
                egui::Frame::none()
                    .fill(code_bg)
                    .rounding(egui::Rounding::same(3.0))
                    .inner_margin(egui::Margin::symmetric(4.0, 1.0))
                    .show(ui, |ui| {
                        ui.label(
                            egui::RichText::new(s)
                                .size(base_size)
                                .monospace()
                                .color(base_color),
                        );
                    });
            }
            Span::Link { text, url } => {
                ui.add(egui::Hyperlink::from_label_and_url(
                    egui::RichText::new(text)
                        .size(base_size)
                        .color(link_color)
                        .underline(),
                    url,
                ))
                .on_hover_text(url);
            }
        }
    }
}

fn render_table(
    ui: &mut egui::Ui,
    block_index: usize,
    header: &[&str],
    rows: &[Vec<&str>],
    base_color: egui::Color32,
    link_color: egui::Color32,
    code_bg: egui::Color32,
) {
    ui.add_space(4.0);
    egui::Grid::new(("md-table", block_index))
        .striped(true)
        .spacing(egui::vec2(16.0, 4.0))
        .show(ui, |ui| {
            for cell in header {
                ui.label(
                    egui::RichText::new(*cell)
                        .strong()
                        .size(14.0)
                        .color(base_color),
                );
            }
            ui.end_row();
            for row in rows {
                for cell in row {
                    render_spans(ui, cell, base_color, link_color, code_bg);
                }
                ui.end_row();
            }
        });
    ui.add_space(4.0);
}
