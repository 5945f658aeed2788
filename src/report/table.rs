//! Table layout engine.
//!
//! Draws a header row and striped body rows starting at a given offset,
//! breaking onto new pages by itself when the body overflows. A row taller
//! than a whole page is split between pages line by line. The composer only
//! reads back the final offset.

use serde::{Deserialize, Serialize};

use super::canvas::{DocumentCanvas, FontStyle, Rgb8};
use super::error::ReportError;
use super::types::Row;

/// Points to millimetres.
const PT_TO_MM: f32 = 0.3528;

/// Average Helvetica glyph advance as a fraction of the font size.
const AVG_GLYPH_EM: f32 = 0.5;

/// Visual parameters of a rendered table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableStyle {
    pub font_size: f32,
    pub cell_padding: f32,
    pub line_spacing: f32,
    pub header_fill: Rgb8,
    pub header_text: Rgb8,
    pub stripe_fill: Rgb8,
    pub body_text: Rgb8,
}

impl Default for TableStyle {
    fn default() -> Self {
        Self {
            font_size: 10.0,
            cell_padding: 1.5,
            line_spacing: 1.15,
            header_fill: Rgb8(41, 128, 185),
            header_text: Rgb8::WHITE,
            stripe_fill: Rgb8(245, 245, 245),
            body_text: Rgb8(80, 80, 80),
        }
    }
}

impl TableStyle {
    fn font_mm(&self) -> f32 {
        self.font_size * PT_TO_MM
    }

    fn line_height(&self) -> f32 {
        self.font_mm() * self.line_spacing
    }

    fn char_width(&self) -> f32 {
        self.font_mm() * AVG_GLYPH_EM
    }

    /// Height of a row band holding `lines` text lines.
    fn band_height(&self, lines: usize) -> f32 {
        lines.max(1) as f32 * self.line_height() + 2.0 * self.cell_padding
    }

    /// How many text lines fit in a band of at most `space`.
    fn lines_within(&self, space: f32) -> usize {
        let room = space - 2.0 * self.cell_padding;
        if room <= 0.0 {
            return 0;
        }
        (room / self.line_height()).floor() as usize
    }
}

/// Page area a table occupies, in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableFrame {
    pub left: f32,
    pub right: f32,
    /// Where a continued table resumes on a fresh page.
    pub top: f32,
    /// Lowest offset any row may reach.
    pub bottom: f32,
}

impl TableFrame {
    pub fn width(&self) -> f32 {
        self.right - self.left
    }
}

/// One table to draw: header labels plus body rows.
#[derive(Debug, Clone, Copy)]
pub struct Table<'a> {
    /// Owning section title, used in error messages.
    pub section: &'a str,
    pub header: &'a [String],
    pub rows: &'a [Row],
}

/// Renders a table onto a canvas and reports the offset where it ended.
pub trait TableLayout: Send + Sync {
    fn draw(
        &self,
        canvas: &mut dyn DocumentCanvas,
        start_y: f32,
        table: &Table<'_>,
        frame: &TableFrame,
        style: &TableStyle,
    ) -> Result<f32, ReportError>;
}

/// Banded table with a filled header, repeated on every page it spans.
#[derive(Debug, Default, Clone, Copy)]
pub struct StripedTable;

impl TableLayout for StripedTable {
    fn draw(
        &self,
        canvas: &mut dyn DocumentCanvas,
        start_y: f32,
        table: &Table<'_>,
        frame: &TableFrame,
        style: &TableStyle,
    ) -> Result<f32, ReportError> {
        let cells = stringify_rows(table)?;

        let widths = column_widths(table.header, &cells, frame.width(), style);

        let header = wrap_row(table.header.iter().map(String::as_str), &widths, style);
        let header_height = row_height(&header, style);
        let body: Vec<Vec<Vec<String>>> = cells
            .iter()
            .map(|row| wrap_row(row.iter().map(String::as_str), &widths, style))
            .collect();

        // Tallest row a fresh page can hold below the repeated header.
        let page_room = frame.bottom - frame.top - header_height;
        let mut pen = TablePen {
            canvas,
            frame,
            style,
            header: &header,
            header_height,
            widths: &widths,
            y: start_y,
        };

        // Keep the header together with the first body row (or the first
        // line of it, when the row has to be split anyway).
        let first_row = body
            .first()
            .map(|r| row_height(r, style))
            .map(|h| if h <= page_room { h } else { style.band_height(1) })
            .unwrap_or(0.0);
        if pen.y + header_height + first_row > frame.bottom && pen.y > frame.top {
            pen.canvas.add_page();
            pen.y = frame.top;
        }
        pen.draw_header();

        for (index, lines) in body.iter().enumerate() {
            let height = row_height(lines, style);
            if pen.y + height > frame.bottom
                && (height <= page_room || style.lines_within(frame.bottom - pen.y) == 0)
            {
                pen.continue_on_new_page();
                tracing::debug!(section = table.section, row = index, "Table continues on new page");
            }

            let total = line_count(lines);
            let mut offset = 0;
            loop {
                let remaining = total - offset;
                let take = if pen.y + style.band_height(remaining) <= frame.bottom {
                    remaining
                } else {
                    style.lines_within(frame.bottom - pen.y).clamp(1, remaining)
                };
                pen.draw_body_band(index, lines, offset, take);
                offset += take;
                if offset >= total {
                    break;
                }
                pen.continue_on_new_page();
                tracing::debug!(section = table.section, row = index, line = offset, "Row split across pages");
            }
        }

        Ok(pen.y)
    }
}

/// Drawing state while a table is laid out.
struct TablePen<'c, 'a> {
    canvas: &'c mut dyn DocumentCanvas,
    frame: &'a TableFrame,
    style: &'a TableStyle,
    header: &'a [Vec<String>],
    header_height: f32,
    widths: &'a [f32],
    y: f32,
}

impl TablePen<'_, '_> {
    fn draw_header(&mut self) {
        let style = self.style;
        self.canvas.fill_rect(
            self.frame.left,
            self.y,
            self.frame.width(),
            self.header_height,
            style.header_fill,
        );
        self.canvas.set_font(FontStyle::Bold, style.font_size);
        self.canvas.set_text_color(style.header_text);
        draw_cells(self.canvas, self.frame.left, self.y, self.header, self.widths, style);
        self.y += self.header_height;
    }

    fn continue_on_new_page(&mut self) {
        self.canvas.add_page();
        self.y = self.frame.top;
        self.draw_header();
    }

    /// Draws lines `offset..offset + take` of body row `index` as one band.
    fn draw_body_band(&mut self, index: usize, lines: &[Vec<String>], offset: usize, take: usize) {
        let style = self.style;
        let band: Vec<Vec<String>> = lines
            .iter()
            .map(|cell| cell.iter().skip(offset).take(take).cloned().collect())
            .collect();
        let height = style.band_height(take);

        if index % 2 == 0 {
            self.canvas
                .fill_rect(self.frame.left, self.y, self.frame.width(), height, style.stripe_fill);
        }
        self.canvas.set_font(FontStyle::Normal, style.font_size);
        self.canvas.set_text_color(style.body_text);
        draw_cells(self.canvas, self.frame.left, self.y, &band, self.widths, style);
        self.y += height;
    }
}

fn stringify_rows(table: &Table<'_>) -> Result<Vec<Vec<String>>, ReportError> {
    let expected = table.header.len();
    table
        .rows
        .iter()
        .enumerate()
        .map(|(row_index, row)| {
            if row.len() != expected {
                return Err(ReportError::RowArity {
                    section: table.section.to_string(),
                    row: row_index,
                    expected,
                    found: row.len(),
                });
            }
            row.iter()
                .enumerate()
                .map(|(column, cell)| match cell {
                    super::types::Cell::Number(n) if !n.is_finite() => {
                        Err(ReportError::UnsupportedCell {
                            section: table.section.to_string(),
                            row: row_index,
                            column,
                            reason: format!("non-finite number {n}"),
                        })
                    }
                    other => Ok(other.render().into_owned()),
                })
                .collect()
        })
        .collect()
}

/// Auto-sizes columns proportionally to their widest content, filling the
/// content width exactly.
fn column_widths(
    header: &[String],
    rows: &[Vec<String>],
    content_width: f32,
    style: &TableStyle,
) -> Vec<f32> {
    if header.is_empty() {
        return Vec::new();
    }
    let natural: Vec<f32> = (0..header.len())
        .map(|col| {
            let longest = std::iter::once(header[col].as_str())
                .chain(rows.iter().map(|r| r[col].as_str()))
                .map(|s| s.chars().count())
                .max()
                .unwrap_or(0)
                .max(1);
            longest as f32 * style.char_width() + 2.0 * style.cell_padding
        })
        .collect();
    let total: f32 = natural.iter().sum();
    natural.iter().map(|w| content_width * w / total).collect()
}

fn wrap_row<'a>(
    cells: impl Iterator<Item = &'a str>,
    widths: &[f32],
    style: &TableStyle,
) -> Vec<Vec<String>> {
    cells
        .zip(widths)
        .map(|(text, width)| {
            let usable = (width - 2.0 * style.cell_padding).max(style.char_width());
            let max_chars = ((usable / style.char_width()).floor() as usize).max(1);
            wrap_text(text, max_chars)
        })
        .collect()
}

fn line_count(lines: &[Vec<String>]) -> usize {
    lines.iter().map(Vec::len).max().unwrap_or(1).max(1)
}

fn row_height(lines: &[Vec<String>], style: &TableStyle) -> f32 {
    style.band_height(line_count(lines))
}

fn draw_cells(
    canvas: &mut dyn DocumentCanvas,
    left: f32,
    top: f32,
    lines: &[Vec<String>],
    widths: &[f32],
    style: &TableStyle,
) {
    let baseline = top + style.cell_padding + style.font_mm() * 0.8;
    let mut x = left;
    for (cell, width) in lines.iter().zip(widths) {
        for (i, line) in cell.iter().enumerate() {
            if !line.is_empty() {
                canvas.text(line, x + style.cell_padding, baseline + i as f32 * style.line_height());
            }
        }
        x += width;
    }
}

/// Word-wrap helper. Words longer than a line are split.
pub(crate) fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > max_chars {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let rest = word.split_off(max_chars);
            lines.push(word.into_iter().collect());
            word = rest;
        }
        let word: String = word.into_iter().collect();
        if current.chars().count() + word.chars().count() + 1 > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}
