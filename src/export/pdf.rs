//! PDF export with height-budget pagination.
//!
//! Every page repeats the title block and the table header. The applied
//! filter banner is printed on the first page only, so that page holds
//! fewer rows.

use std::ops::Range;

use printpdf::{BuiltinFont, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point};
use tracing::warn;

use super::ExportDocument;
use crate::error::Result;

const TITLE_PT: f32 = 14.0;
const SUBTITLE_PT: f32 = 10.0;
const BODY_PT: f32 = 8.0;
/// Average Helvetica glyph width as a fraction of the font size.
const GLYPH_WIDTH: f32 = 0.5;
const PT_TO_MM: f32 = 0.3528;

/// Page geometry in millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageLayout {
    pub width_mm: f32,
    pub height_mm: f32,
    pub margin_mm: f32,
    /// Title block at the top of every page.
    pub header_mm: f32,
    /// Page number line at the bottom of every page.
    pub footer_mm: f32,
    pub table_header_mm: f32,
    pub row_mm: f32,
    /// Height of one filter banner line on the first page.
    pub banner_line_mm: f32,
}

impl PageLayout {
    pub fn landscape_a4() -> Self {
        Self {
            width_mm: 297.0,
            height_mm: 210.0,
            margin_mm: 10.0,
            header_mm: 20.0,
            footer_mm: 10.0,
            table_header_mm: 7.0,
            row_mm: 6.0,
            banner_line_mm: 5.0,
        }
    }

    fn body_mm(&self) -> f32 {
        self.height_mm - 2.0 * self.margin_mm - self.header_mm - self.footer_mm - self.table_header_mm
    }

    /// Data rows that fit on one page. Never less than one.
    pub fn rows_per_page(&self, first_page: bool, banner_lines: usize) -> usize {
        let mut body = self.body_mm();
        if first_page {
            body -= banner_lines as f32 * self.banner_line_mm;
        }
        ((body / self.row_mm).floor().max(1.0)) as usize
    }

    /// Split `total` rows into per-page ranges.
    ///
    /// The notes go below the last page's rows; when they do not fit there
    /// an extra page with an empty range carries them.
    pub fn paginate(&self, total: usize, banner_lines: usize, note_lines: usize) -> Vec<Range<usize>> {
        let mut pages = Vec::new();
        let mut start = 0;
        while start < total {
            let capacity = self.rows_per_page(pages.is_empty(), banner_lines);
            let end = (start + capacity).min(total);
            pages.push(start..end);
            start = end;
        }
        let first_is_last = pages.len() == 1;
        let notes_fit = pages
            .last()
            .is_none_or(|last| self.notes_fit(last.len(), first_is_last, banner_lines, note_lines));
        if !notes_fit {
            pages.push(total..total);
        }
        pages
    }

    /// Baselines of the note lines printed under `rows` data rows.
    pub fn note_baselines(&self, rows: usize, first_page: bool, banner_lines: usize, note_lines: usize) -> Vec<f32> {
        let mut y = self.height_mm - self.margin_mm - self.header_mm - self.table_header_mm;
        if first_page {
            y -= banner_lines as f32 * self.banner_line_mm;
        }
        y -= rows as f32 * self.row_mm;
        (1..=note_lines).map(|i| y - i as f32 * self.banner_line_mm).collect()
    }

    fn notes_fit(&self, rows: usize, first_page: bool, banner_lines: usize, note_lines: usize) -> bool {
        self.note_baselines(rows, first_page, banner_lines, note_lines)
            .last()
            .is_none_or(|y| *y >= self.notes_floor())
    }

    fn notes_floor(&self) -> f32 {
        self.margin_mm + self.footer_mm
    }

    fn content_width(&self) -> f32 {
        self.width_mm - 2.0 * self.margin_mm
    }
}

impl Default for PageLayout {
    fn default() -> Self {
        Self::landscape_a4()
    }
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

/// Render the document as PDF bytes.
pub fn render_pdf(doc: &ExportDocument, layout: &PageLayout) -> Result<Vec<u8>> {
    doc.ensure_rows()?;

    let meta = &doc.meta;
    let banner = banner_lines(doc, layout.content_width());
    let pages = layout.paginate(doc.rows.len(), banner.len(), doc.notes.len());
    let widths = column_widths(doc, layout.content_width());
    let page_count = pages.len();

    let (pdf, first_page, first_layer) = PdfDocument::new(
        meta.kind.title(),
        Mm(layout.width_mm),
        Mm(layout.height_mm),
        "Layer 1",
    );
    let fonts = Fonts {
        regular: pdf.add_builtin_font(BuiltinFont::Helvetica)?,
        bold: pdf.add_builtin_font(BuiltinFont::HelveticaBold)?,
    };

    for (page_no, range) in pages.into_iter().enumerate() {
        let layer = if page_no == 0 {
            pdf.get_page(first_page).get_layer(first_layer)
        } else {
            let (page, layer) = pdf.add_page(Mm(layout.width_mm), Mm(layout.height_mm), "Layer 1");
            pdf.get_page(page).get_layer(layer)
        };

        // y runs from the top edge downwards; PDF origin is bottom-left.
        let mut y = layout.height_mm - layout.margin_mm;
        y = draw_title(&layer, &fonts, doc, layout, y);

        if page_no == 0 {
            for line in &banner {
                y -= layout.banner_line_mm;
                let text = fit(line, layout.content_width(), BODY_PT);
                layer.use_text(text, BODY_PT, Mm(layout.margin_mm), Mm(y), &fonts.regular);
            }
        }

        y = draw_table_header(&layer, &fonts, doc, &widths, layout, y);
        let rows_on_page = range.len();
        for cells in &doc.rows[range] {
            y -= layout.row_mm;
            draw_row(&layer, &fonts.regular, cells, &widths, layout, y);
        }

        let last = page_no + 1 == page_count;
        if last {
            let baselines = layout.note_baselines(rows_on_page, page_no == 0, banner.len(), doc.notes.len());
            draw_notes(&layer, &fonts.regular, doc, layout, &baselines);
        }

        let footer = format!(
            "Page {} of {}    Generated {}",
            page_no + 1,
            page_count,
            meta.generated_at.format("%Y-%m-%d %H:%M")
        );
        layer.use_text(footer, BODY_PT, Mm(layout.margin_mm), Mm(layout.margin_mm), &fonts.regular);
    }

    Ok(pdf.save_to_bytes()?)
}

/// Filter labels wrapped to `width_mm`, breaking between labels.
fn banner_lines(doc: &ExportDocument, width_mm: f32) -> Vec<String> {
    let labels = &doc.meta.filter_labels;
    if labels.is_empty() {
        return Vec::new();
    }

    let max_chars = chars_fitting(width_mm, BODY_PT);
    let mut lines = Vec::new();
    let mut line = String::from("Filters: ");
    let mut line_empty = true;
    for (i, label) in labels.iter().enumerate() {
        let mut piece = pdf_text(label);
        if i + 1 < labels.len() {
            piece.push(',');
        }
        if !line_empty && line.chars().count() + 1 + piece.chars().count() > max_chars {
            lines.push(std::mem::replace(&mut line, String::from("    ")));
            line_empty = true;
        }
        if !line_empty {
            line.push(' ');
        }
        line.push_str(&piece);
        line_empty = false;
    }
    lines.push(line);
    lines
}

/// Scale relative column widths to fill the printable width.
fn column_widths(doc: &ExportDocument, available: f32) -> Vec<f32> {
    let total: f32 = doc.columns.iter().map(|c| c.width.max(1.0)).sum();
    if total <= 0.0 {
        return Vec::new();
    }
    doc.columns
        .iter()
        .map(|c| c.width.max(1.0) / total * available)
        .collect()
}

fn draw_title(layer: &PdfLayerReference, fonts: &Fonts, doc: &ExportDocument, layout: &PageLayout, top: f32) -> f32 {
    let x = Mm(layout.margin_mm);
    let company_y = top - TITLE_PT * PT_TO_MM;
    layer.use_text(pdf_text(&doc.meta.company_name), TITLE_PT, x, Mm(company_y), &fonts.bold);

    let subtitle = format!("{} - {}", doc.meta.kind.title(), doc.meta.period);
    layer.use_text(
        pdf_text(&subtitle),
        SUBTITLE_PT,
        x,
        Mm(company_y - SUBTITLE_PT * PT_TO_MM - 2.0),
        &fonts.regular,
    );
    top - layout.header_mm
}

fn draw_table_header(
    layer: &PdfLayerReference,
    fonts: &Fonts,
    doc: &ExportDocument,
    widths: &[f32],
    layout: &PageLayout,
    top: f32,
) -> f32 {
    let baseline = top - layout.table_header_mm + 2.0;
    let mut x = layout.margin_mm;
    for (column, width) in doc.columns.iter().zip(widths) {
        let text = fit(&column.header, *width, BODY_PT);
        layer.use_text(text, BODY_PT, Mm(x + 0.5), Mm(baseline), &fonts.bold);
        x += width;
    }

    let rule_y = top - layout.table_header_mm;
    layer.add_line(rule(layout.margin_mm, layout.width_mm - layout.margin_mm, rule_y));
    rule_y
}

fn draw_row(
    layer: &PdfLayerReference,
    font: &IndirectFontRef,
    cells: &[String],
    widths: &[f32],
    layout: &PageLayout,
    bottom: f32,
) {
    let mut x = layout.margin_mm;
    for (cell, width) in cells.iter().zip(widths) {
        layer.use_text(fit(cell, *width, BODY_PT), BODY_PT, Mm(x + 0.5), Mm(bottom + 1.5), font);
        x += width;
    }
}

fn draw_notes(
    layer: &PdfLayerReference,
    font: &IndirectFontRef,
    doc: &ExportDocument,
    layout: &PageLayout,
    baselines: &[f32],
) {
    for (note, y) in doc.notes.iter().zip(baselines) {
        if *y < layout.notes_floor() {
            warn!("Note runs into the page footer: {note}");
        }
        layer.use_text(pdf_text(note), BODY_PT, Mm(layout.margin_mm), Mm(*y), font);
    }
}

fn rule(x1: f32, x2: f32, y: f32) -> Line {
    Line {
        points: vec![(Point::new(Mm(x1), Mm(y)), false), (Point::new(Mm(x2), Mm(y)), false)],
        is_closed: false,
    }
}

/// Builtin fonts only cover WinAnsi; spell out the half mark.
fn pdf_text(text: &str) -> String {
    text.replace('½', "1/2")
}

/// Approximate character count that fits `width_mm` at `size_pt`.
fn chars_fitting(width_mm: f32, size_pt: f32) -> usize {
    let glyph_mm = size_pt * GLYPH_WIDTH * PT_TO_MM;
    ((width_mm - 1.0) / glyph_mm).floor().max(1.0) as usize
}

/// Truncate `text` with "..." so it fits `width_mm` at `size_pt`.
fn fit(text: &str, width_mm: f32, size_pt: f32) -> String {
    let text = pdf_text(text);
    let max_chars = chars_fitting(width_mm, size_pt);
    if text.chars().count() <= max_chars {
        return text;
    }
    if max_chars <= 3 {
        return text.chars().take(max_chars).collect();
    }
    let mut out: String = text.chars().take(max_chars - 3).collect();
    out.push_str("...");
    out
}
