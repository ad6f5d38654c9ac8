// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Vitae contributors
//
// PDF renderer — turns an assembled block structure into PDF bytes using
// `printpdf` 0.8.
//
// printpdf 0.8 uses a data-oriented API: documents are built by constructing
// `PdfPage` structs containing `Vec<Op>` operation lists, then serialised via
// `PdfDocument::save()`. Layout here is a simple top-to-bottom cursor with
// word-wrap and automatic page breaks.

use std::path::Path;

use printpdf::{
    BuiltinFont, Color, Line, LinePoint, Mm, Op, PdfDocument, PdfPage, PdfSaveOptions,
    PdfWarnMsg, Point, Pt, RawImage, RawImageData, RawImageFormat, Rgb, TextItem,
    XObjectTransform,
};
use tracing::{debug, info, instrument};
use vitae_core::PaperSize;
use vitae_core::error::VitaeError;

use crate::doc::blocks::{Block, HeaderBlock, NO_PHOTO_PLACEHOLDER, RenderedDocument, TABLE_HEADER};

// -- Layout constants (pt unless noted) ----------------------------------------

const MARGIN_MM: f32 = 20.0;
const BODY_PT: f32 = 11.0;
const BODY_LEADING: f32 = 14.0;
const NAME_PT: f32 = 24.0;
const NAME_LEADING: f32 = 30.0;
const HEADING_PT: f32 = 14.0;
const HEADING_LEADING: f32 = 18.0;
/// Gap between a heading baseline and its bottom-border rule.
const RULE_GAP: f32 = 4.0;
const RULE_THICKNESS: f32 = 0.75;
const TABLE_ROW_H: f32 = 18.0;
const CELL_PAD: f32 = 3.0;
const SPACER_H: f32 = 10.0;
const BULLET_INDENT: f32 = 12.0;
/// DPI the embedded portrait is registered at before display scaling.
const PHOTO_DPI: f32 = 150.0;

/// Renders an assembled resume to PDF.
///
/// Produces standards-compliant output via `printpdf` 0.8. The renderer is
/// a pure consumer of the block structure — it holds no state between runs,
/// so identical inputs produce identical pages.
pub struct PdfRenderer {
    /// Paper size for page creation.
    paper_size: PaperSize,
    /// Title metadata embedded in the PDF /Info dictionary.
    title: Option<String>,
    /// Display width of the embedded portrait, in millimetres.
    photo_display_mm: f32,
}

impl PdfRenderer {
    /// Create a new renderer targeting the given paper size.
    pub fn new(paper_size: PaperSize) -> Self {
        Self {
            paper_size,
            title: None,
            photo_display_mm: 30.5,
        }
    }

    /// Create a new renderer defaulting to A4.
    pub fn a4() -> Self {
        Self::new(PaperSize::A4)
    }

    /// Set a title for the PDF metadata.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    /// Set the display width of the embedded portrait.
    pub fn set_photo_display_mm(&mut self, mm: f32) {
        self.photo_display_mm = mm;
    }

    /// Render the block structure to PDF bytes.
    #[instrument(skip_all, fields(blocks = resume.len()))]
    pub fn render(&self, resume: &RenderedDocument) -> Result<Vec<u8>, VitaeError> {
        let title = self.title.as_deref().unwrap_or("Vitae Resume");
        info!(paper = ?self.paper_size, title, "Rendering resume PDF");

        let mut doc = PdfDocument::new(title);
        let pages = self.layout_pages(resume, &mut doc);
        debug!(pages = pages.len(), "Layout complete");
        doc.with_pages(pages);

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        Ok(doc.save(&PdfSaveOptions::default(), &mut warnings))
    }

    /// Render and write directly to a file.
    pub fn write_to_file(
        &self,
        resume: &RenderedDocument,
        path: impl AsRef<Path>,
    ) -> Result<(), VitaeError> {
        let bytes = self.render(resume)?;
        std::fs::write(path.as_ref(), &bytes)?;
        info!("Wrote resume PDF to {}", path.as_ref().display());
        Ok(())
    }

    // -- Block layout -----------------------------------------------------------

    fn layout_pages(&self, resume: &RenderedDocument, doc: &mut PdfDocument) -> Vec<PdfPage> {
        let (paper_w_mm, paper_h_mm) = self.paper_size.dimensions_mm();
        let mut layout = PageLayout::new(
            Mm(paper_w_mm as f32),
            Mm(paper_h_mm as f32),
            Mm(MARGIN_MM).into_pt().0,
        );

        for block in resume.blocks() {
            match block {
                Block::Header(header) => self.emit_header(&mut layout, doc, header),
                Block::Heading(title) => emit_heading(&mut layout, title),
                Block::Paragraph { text, bulleted } => {
                    emit_paragraph(&mut layout, text, *bulleted)
                }
                Block::Table { rows } => emit_table(&mut layout, rows),
                Block::Spacer => layout.advance(SPACER_H),
            }
        }

        layout.finish()
    }

    /// Two-column header: name and contact lines on the left, the portrait
    /// (or placeholder token) on the right.
    fn emit_header(&self, layout: &mut PageLayout, doc: &mut PdfDocument, header: &HeaderBlock) {
        let top = layout.cursor_y;
        let left = layout.left();

        // Left column.
        let mut left_h = NAME_LEADING;
        push_text(
            &mut layout.ops,
            &header.name,
            BuiltinFont::HelveticaBold,
            NAME_PT,
            left,
            top - NAME_LEADING,
        );
        for contact in &header.contacts {
            push_text(
                &mut layout.ops,
                contact,
                BuiltinFont::Helvetica,
                BODY_PT,
                left,
                top - left_h - BODY_LEADING,
            );
            left_h += BODY_LEADING;
        }

        // Right column.
        let right_h = match &header.photo {
            Some(photo) => {
                let photo_w_pt = Mm(self.photo_display_mm).into_pt().0;
                let photo_h_pt = photo_w_pt * photo.height() as f32 / photo.width() as f32;

                let rgb = photo.as_dynamic().to_rgb8();
                let raw = RawImage {
                    pixels: RawImageData::U8(rgb.into_raw()),
                    width: photo.width() as usize,
                    height: photo.height() as usize,
                    data_format: RawImageFormat::RGB8,
                    tag: Vec::new(),
                };
                let id = doc.add_image(&raw);

                // Native size at PHOTO_DPI, scaled to the display width.
                let native_w_pt = photo.width() as f32 / PHOTO_DPI * 72.0;
                let scale = photo_w_pt / native_w_pt;

                layout.ops.push(Op::UseXobject {
                    id,
                    transform: XObjectTransform {
                        translate_x: Some(Pt(layout.right() - photo_w_pt)),
                        translate_y: Some(Pt(top - photo_h_pt)),
                        scale_x: Some(scale),
                        scale_y: Some(scale),
                        dpi: Some(PHOTO_DPI),
                        rotate: None,
                    },
                });
                photo_h_pt
            }
            None => {
                let text_w = text_width_estimate(NO_PHOTO_PLACEHOLDER, BODY_PT);
                let right = layout.right();
                push_text(
                    &mut layout.ops,
                    NO_PHOTO_PLACEHOLDER,
                    BuiltinFont::Helvetica,
                    BODY_PT,
                    right - text_w,
                    top - BODY_LEADING,
                );
                BODY_LEADING
            }
        };

        layout.advance(left_h.max(right_h));
    }
}

/// Uppercase section title with a single bottom-border rule.
fn emit_heading(layout: &mut PageLayout, title: &str) {
    // Keep the heading attached to at least one following body line.
    layout.ensure_room(HEADING_LEADING + RULE_GAP + BODY_LEADING);

    let baseline = layout.cursor_y - HEADING_LEADING;
    let left = layout.left();
    let right = layout.right();
    push_text(
        &mut layout.ops,
        title,
        BuiltinFont::HelveticaBold,
        HEADING_PT,
        left,
        baseline,
    );
    let rule_y = baseline - RULE_GAP;
    push_line(&mut layout.ops, (left, rule_y), (right, rule_y));

    layout.advance(HEADING_LEADING + RULE_GAP + 4.0);
}

/// Word-wrapped free text. A bulleted paragraph renders as a single unit:
/// one bullet glyph before the first line, continuation lines indented.
fn emit_paragraph(layout: &mut PageLayout, text: &str, bulleted: bool) {
    let indent = if bulleted { BULLET_INDENT } else { 0.0 };
    let width = layout.usable_width() - indent;
    let lines = wrap_text(text, max_chars_for(width, BODY_PT));

    for (idx, line) in lines.iter().enumerate() {
        layout.ensure_room(BODY_LEADING);
        let baseline = layout.cursor_y - BODY_LEADING;
        let left = layout.left();
        if bulleted && idx == 0 {
            push_text(
                &mut layout.ops,
                "\u{2022}",
                BuiltinFont::Helvetica,
                BODY_PT,
                left,
                baseline,
            );
        }
        push_text(
            &mut layout.ops,
            line,
            BuiltinFont::Helvetica,
            BODY_PT,
            left + indent,
            baseline,
        );
        layout.advance(BODY_LEADING);
    }

    layout.advance(4.0);
}

/// Fixed four-column grid: bold header row, then the data rows verbatim.
/// Each row draws its own cell borders, so a page break mid-table keeps the
/// grid intact on both pages.
fn emit_table(layout: &mut PageLayout, rows: &[vitae_core::TableRow]) {
    let left = layout.left();
    let right = layout.right();
    let width = right - left;
    // Column boundaries as fractions of the usable width.
    let fractions = [0.0f32, 0.32, 0.66, 0.80, 1.0];
    let xs: Vec<f32> = fractions.iter().map(|f| left + f * width).collect();

    let header_cells: Vec<String> = TABLE_HEADER.iter().map(|h| h.to_string()).collect();
    let all_rows = std::iter::once(&header_cells[..]).chain(rows.iter().map(|r| &r[..]));

    let mut need_top_border = true;
    for (row_idx, cells) in all_rows.enumerate() {
        if layout.ensure_room(TABLE_ROW_H) {
            need_top_border = true;
        }
        let top_y = layout.cursor_y;
        let bottom_y = top_y - TABLE_ROW_H;

        if need_top_border {
            push_line(&mut layout.ops, (left, top_y), (right, top_y));
            need_top_border = false;
        }
        push_line(&mut layout.ops, (left, bottom_y), (right, bottom_y));
        for &x in &xs {
            push_line(&mut layout.ops, (x, top_y), (x, bottom_y));
        }

        let font = if row_idx == 0 {
            BuiltinFont::HelveticaBold
        } else {
            BuiltinFont::Helvetica
        };
        let baseline = bottom_y + (TABLE_ROW_H - BODY_PT) / 2.0;
        for (col, cell) in cells.iter().enumerate() {
            let col_w = xs[col + 1] - xs[col];
            let text = truncate_to_width(cell, col_w - 2.0 * CELL_PAD, BODY_PT);
            push_text(
                &mut layout.ops,
                &text,
                font,
                BODY_PT,
                xs[col] + CELL_PAD,
                baseline,
            );
        }

        layout.advance(TABLE_ROW_H);
    }
}

// -- Page accumulator -----------------------------------------------------------

/// Cursor-based page accumulator. Pages fill top to bottom; a block that
/// does not fit starts a new page.
struct PageLayout {
    page_w: Mm,
    page_h: Mm,
    margin_pt: f32,
    /// Top of the remaining free area, in pt from the page bottom.
    cursor_y: f32,
    pages: Vec<PdfPage>,
    ops: Vec<Op>,
}

impl PageLayout {
    fn new(page_w: Mm, page_h: Mm, margin_pt: f32) -> Self {
        let cursor_y = page_h.into_pt().0 - margin_pt;
        Self {
            page_w,
            page_h,
            margin_pt,
            cursor_y,
            pages: Vec::new(),
            ops: stroke_setup_ops(),
        }
    }

    fn left(&self) -> f32 {
        self.margin_pt
    }

    fn right(&self) -> f32 {
        self.page_w.into_pt().0 - self.margin_pt
    }

    fn usable_width(&self) -> f32 {
        self.right() - self.left()
    }

    fn advance(&mut self, dy: f32) {
        self.cursor_y -= dy;
    }

    /// Break to a new page when fewer than `height_pt` points remain.
    /// Returns `true` when a break happened.
    fn ensure_room(&mut self, height_pt: f32) -> bool {
        if self.cursor_y - height_pt < self.margin_pt {
            self.break_page();
            return true;
        }
        false
    }

    fn break_page(&mut self) {
        let ops = std::mem::replace(&mut self.ops, stroke_setup_ops());
        self.pages.push(PdfPage::new(self.page_w, self.page_h, ops));
        self.cursor_y = self.page_h.into_pt().0 - self.margin_pt;
    }

    fn finish(mut self) -> Vec<PdfPage> {
        let ops = std::mem::take(&mut self.ops);
        self.pages.push(PdfPage::new(self.page_w, self.page_h, ops));
        self.pages
    }
}

/// Ops that open every page: black strokes at rule thickness.
fn stroke_setup_ops() -> Vec<Op> {
    vec![
        Op::SetOutlineColor {
            col: Color::Rgb(Rgb {
                r: 0.0,
                g: 0.0,
                b: 0.0,
                icc_profile: None,
            }),
        },
        Op::SetOutlineThickness {
            pt: Pt(RULE_THICKNESS),
        },
    ]
}

// -- Op helpers -------------------------------------------------------------------

fn push_text(ops: &mut Vec<Op>, text: &str, font: BuiltinFont, size_pt: f32, x_pt: f32, y_pt: f32) {
    ops.push(Op::StartTextSection);
    ops.push(Op::SetTextCursor {
        pos: Point {
            x: Pt(x_pt),
            y: Pt(y_pt),
        },
    });
    ops.push(Op::SetFontSizeBuiltinFont {
        size: Pt(size_pt),
        font,
    });
    ops.push(Op::WriteTextBuiltinFont {
        items: vec![TextItem::Text(text.to_string())],
        font,
    });
    ops.push(Op::EndTextSection);
}

fn push_line(ops: &mut Vec<Op>, from: (f32, f32), to: (f32, f32)) {
    ops.push(Op::DrawLine {
        line: Line {
            points: vec![
                LinePoint {
                    p: Point {
                        x: Pt(from.0),
                        y: Pt(from.1),
                    },
                    bezier: false,
                },
                LinePoint {
                    p: Point {
                        x: Pt(to.0),
                        y: Pt(to.1),
                    },
                    bezier: false,
                },
            ],
            is_closed: false,
        },
    });
}

// -- Text measuring helpers --------------------------------------------------------

/// Approximate width of `text` in points. Average Helvetica glyph width is
/// roughly 0.50 × the font size.
fn text_width_estimate(text: &str, font_size_pt: f32) -> f32 {
    text.chars().count() as f32 * 0.50 * font_size_pt
}

/// How many average-width characters fit into `width_pt`.
fn max_chars_for(width_pt: f32, font_size_pt: f32) -> usize {
    ((width_pt / (0.50 * font_size_pt)) as usize).max(1)
}

/// Shorten `text` so its estimated width stays within `width_pt`.
fn truncate_to_width(text: &str, width_pt: f32, font_size_pt: f32) -> String {
    let max = max_chars_for(width_pt, font_size_pt);
    if text.chars().count() <= max {
        text.to_string()
    } else {
        text.chars().take(max).collect()
    }
}

/// Wrap a multi-line string so that no line exceeds `max_width` characters.
///
/// Splits on existing newlines first, then word-wraps within each paragraph.
/// Words longer than `max_width` are force-broken.
fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    let mut result = Vec::new();

    for paragraph in text.split('\n') {
        let words: Vec<&str> = paragraph.split_whitespace().collect();
        if words.is_empty() {
            result.push(String::new());
            continue;
        }

        let mut current = String::with_capacity(max_width);
        for word in words {
            if word.len() > max_width {
                if !current.is_empty() {
                    result.push(std::mem::take(&mut current));
                }
                let mut remaining = word;
                while remaining.len() > max_width {
                    let (chunk, rest) = remaining.split_at(max_width);
                    result.push(chunk.to_string());
                    remaining = rest;
                }
                current.push_str(remaining);
            } else if current.is_empty() {
                current.push_str(word);
            } else if current.len() + 1 + word.len() <= max_width {
                current.push(' ');
                current.push_str(word);
            } else {
                result.push(std::mem::take(&mut current));
                current.push_str(word);
            }
        }
        if !current.is_empty() {
            result.push(current);
        }
    }

    result
}

// -- Tests --------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc::assembler::assemble;
    use crate::photo::detector::NullDetector;
    use crate::photo::normalizer::PhotoNormalizer;
    use vitae_core::{FieldValue, ProfileRecord};

    fn jane_doe() -> ProfileRecord {
        let mut record = ProfileRecord::new();
        record.insert("Full Name", FieldValue::scalar("Jane Doe"));
        record.insert("Email", FieldValue::scalar("jane@x.com"));
        record.insert(
            "Education",
            FieldValue::Table(vec![[
                "B.Tech".into(),
                "State U".into(),
                "2020".into(),
                "8.5".into(),
            ]]),
        );
        record.insert("Skills", FieldValue::scalar("Python\nGo"));
        record
    }

    #[test]
    fn renders_pdf_bytes() {
        let resume = assemble(&jane_doe(), None);
        let renderer = PdfRenderer::a4();
        let bytes = renderer.render(&resume).expect("render");
        assert!(bytes.starts_with(b"%PDF"), "output must be a PDF");
    }

    #[test]
    fn renders_with_embedded_photo() {
        let img = image::DynamicImage::ImageRgb8(image::RgbImage::new(60, 80));
        let photo = PhotoNormalizer::from_dynamic(img).normalize(&mut NullDetector);
        let resume = assemble(&jane_doe(), Some(photo));

        let mut renderer = PdfRenderer::a4();
        renderer.set_title("Jane Doe");
        let bytes = renderer.render(&resume).expect("render");
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn long_content_paginates() {
        let mut record = ProfileRecord::new();
        record.insert("Full Name", FieldValue::scalar("Jane Doe"));
        // Enough distinct lines to overflow an A4 page.
        let long_text = (0..120)
            .map(|i| format!("Shipped project number {i} with measurable impact"))
            .collect::<Vec<_>>()
            .join("\n");
        record.insert("Experience", FieldValue::scalar(long_text));

        let resume = assemble(&record, None);
        let renderer = PdfRenderer::a4();
        let mut doc = PdfDocument::new("test");
        let pages = renderer.layout_pages(&resume, &mut doc);
        assert!(pages.len() > 1, "expected a page break, got {}", pages.len());
    }

    #[test]
    fn empty_document_still_renders_one_page() {
        let resume = RenderedDocument::new();
        let renderer = PdfRenderer::a4();
        let mut doc = PdfDocument::new("test");
        let pages = renderer.layout_pages(&resume, &mut doc);
        assert_eq!(pages.len(), 1);
    }

    #[test]
    fn write_to_file_persists() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("Jane_Doe_Resume.pdf");

        let resume = assemble(&jane_doe(), None);
        PdfRenderer::a4()
            .write_to_file(&resume, &path)
            .expect("write");
        assert!(path.exists());
        assert!(std::fs::metadata(&path).expect("metadata").len() > 0);
    }

    #[test]
    fn wrap_preserves_blank_lines() {
        let lines = wrap_text("alpha\n\nbeta", 40);
        assert_eq!(lines, vec!["alpha", "", "beta"]);
    }

    #[test]
    fn wrap_breaks_long_lines_on_word_boundaries() {
        let lines = wrap_text("one two three four five", 9);
        assert_eq!(lines, vec!["one two", "three", "four five"]);
    }

    #[test]
    fn wrap_force_breaks_oversized_words() {
        let lines = wrap_text("abcdefghij", 4);
        assert_eq!(lines, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn truncate_respects_width() {
        let cell = "An Extremely Long Institution Name That Cannot Fit";
        let out = truncate_to_width(cell, 30.0, BODY_PT);
        assert!(out.chars().count() <= max_chars_for(30.0, BODY_PT));
        // Short cells pass through untouched.
        assert_eq!(truncate_to_width("2020", 30.0, BODY_PT), "2020");
    }
}
