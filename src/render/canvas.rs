//! Minimal page canvas over `lopdf`: text, filled and stroked rectangles,
//! wrapped paragraphs, and paginated tables.
//!
//! Coordinates given to the canvas are measured from the top edge of the
//! page; conversion to PDF user space happens when operations are emitted.
//! The canvas owns a single vertical cursor, so one canvas draws one
//! document at a time.

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, StringFormat, dictionary};

use crate::core::{BillingError, FontFamily, Rgb};

use super::layout::{Align, Cell, Table};

/// A4 portrait, in points.
pub const PAGE_WIDTH: f32 = 595.28;
pub const PAGE_HEIGHT: f32 = 841.89;
pub const MARGIN: f32 = 40.0;
pub const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;

const LEADING: f32 = 1.15;
const REGULAR_FONT: &str = "F1";
const BOLD_FONT: &str = "F2";

/// Encode text for the WinAnsi-encoded base-14 fonts. Characters outside
/// the encoding become `?`.
pub(crate) fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{20}'..='\u{7e}' | '\u{a0}'..='\u{ff}' => c as u8,
            '\u{20ac}' => 0x80,
            '\u{2026}' => 0x85,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201c}' => 0x93,
            '\u{201d}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            _ => b'?',
        })
        .collect()
}

/// Approximate advance width in thousandths of an em.
fn glyph_width(c: char, font: FontFamily) -> f32 {
    match font {
        FontFamily::Courier => 600.0,
        FontFamily::Helvetica => match c {
            ' ' | 'i' | 'j' | 'l' | '.' | ',' | ':' | ';' | '\'' | '!' | '|' | 'I' | 'f' | 't'
            | '/' | '(' | ')' => 278.0,
            '-' | 'r' => 333.0,
            'm' | 'M' | 'W' => 833.0,
            'w' | 'C' | 'D' | 'G' | 'H' | 'N' | 'O' | 'Q' | 'R' | 'U' => 722.0,
            'A'..='Z' => 667.0,
            '0'..='9' => 556.0,
            _ => 540.0,
        },
        FontFamily::Times => match c {
            ' ' | 'i' | 'j' | 'l' | '.' | ',' | ':' | ';' | '\'' | '!' | '|' | 't' | 'f' => 278.0,
            'm' | 'M' | 'W' => 889.0,
            'A'..='Z' => 700.0,
            '0'..='9' => 500.0,
            _ => 444.0,
        },
    }
}

/// Estimated width of `text` in points.
pub fn text_width(text: &str, size: f32, font: FontFamily, bold: bool) -> f32 {
    let em: f32 = text.chars().map(|c| glyph_width(c, font)).sum();
    let weight = if bold && font != FontFamily::Courier { 1.06 } else { 1.0 };
    em * weight * size / 1000.0
}

/// Greedy word wrap. Explicit newlines are kept; words wider than the line
/// are split between characters.
pub fn wrap(text: &str, max_width: f32, size: f32, font: FontFamily, bold: bool) -> Vec<String> {
    let fits = |s: &str| text_width(s, size, font, bold) <= max_width;
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if line.is_empty() {
                word.to_string()
            } else {
                format!("{line} {word}")
            };
            if line.is_empty() || fits(&candidate) {
                line = candidate;
            } else {
                lines.push(std::mem::take(&mut line));
                line = word.to_string();
            }
            while !fits(&line) && line.chars().count() > 1 {
                let mut split = 0;
                for (index, _) in line.char_indices().skip(1) {
                    if fits(&line[..index]) {
                        split = index;
                    } else {
                        break;
                    }
                }
                if split == 0 {
                    split = line.char_indices().nth(1).map_or(line.len(), |(i, _)| i);
                }
                let rest = line.split_off(split);
                lines.push(std::mem::replace(&mut line, rest));
            }
        }
        lines.push(line);
    }
    lines
}

/// Drawing surface for one document.
#[derive(Debug)]
pub struct Canvas {
    font: FontFamily,
    finished: Vec<Vec<Operation>>,
    current: Vec<Operation>,
    cursor: f32,
}

impl Canvas {
    pub fn new(font: FontFamily) -> Self {
        Self {
            font,
            finished: Vec::new(),
            current: Vec::new(),
            cursor: MARGIN,
        }
    }

    /// Distance of the cursor from the top edge.
    pub fn cursor(&self) -> f32 {
        self.cursor
    }

    pub fn set_cursor(&mut self, y: f32) {
        self.cursor = y;
    }

    pub fn advance(&mut self, dy: f32) {
        self.cursor += dy;
    }

    pub fn page_count(&self) -> usize {
        self.finished.len() + 1
    }

    pub fn new_page(&mut self) {
        self.finished.push(std::mem::take(&mut self.current));
        self.cursor = MARGIN;
    }

    /// Start a new page unless `height` still fits below the cursor.
    fn reserve(&mut self, height: f32) {
        if self.cursor + height > PAGE_HEIGHT - MARGIN && self.cursor > MARGIN {
            self.new_page();
        }
    }

    /// Draw one line of text with its baseline at `baseline` from the top.
    pub fn text(&mut self, text: &str, x: f32, baseline: f32, size: f32, bold: bool, color: Rgb) {
        let [r, g, b] = color.unit();
        let font = if bold { BOLD_FONT } else { REGULAR_FONT };
        self.current.extend([
            Operation::new("BT", vec![]),
            Operation::new("rg", vec![r.into(), g.into(), b.into()]),
            Operation::new("Tf", vec![font.into(), size.into()]),
            Operation::new("Td", vec![x.into(), (PAGE_HEIGHT - baseline).into()]),
            Operation::new(
                "Tj",
                vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
            ),
            Operation::new("ET", vec![]),
        ]);
    }

    fn rect_ops(x: f32, top: f32, width: f32, height: f32) -> Operation {
        Operation::new(
            "re",
            vec![
                x.into(),
                (PAGE_HEIGHT - top - height).into(),
                width.into(),
                height.into(),
            ],
        )
    }

    pub fn fill_rect(&mut self, x: f32, top: f32, width: f32, height: f32, color: Rgb) {
        let [r, g, b] = color.unit();
        self.current.extend([
            Operation::new("q", vec![]),
            Operation::new("rg", vec![r.into(), g.into(), b.into()]),
            Self::rect_ops(x, top, width, height),
            Operation::new("f", vec![]),
            Operation::new("Q", vec![]),
        ]);
    }

    pub fn stroke_rect(&mut self, x: f32, top: f32, width: f32, height: f32, color: Rgb) {
        let [r, g, b] = color.unit();
        self.current.extend([
            Operation::new("q", vec![]),
            Operation::new("RG", vec![r.into(), g.into(), b.into()]),
            Operation::new("w", vec![0.4f32.into()]),
            Self::rect_ops(x, top, width, height),
            Operation::new("S", vec![]),
            Operation::new("Q", vec![]),
        ]);
    }

    /// Wrapped text block starting at the cursor; moves the cursor below it.
    pub fn paragraph(&mut self, text: &str, size: f32, bold: bool, align: Align, color: Rgb) {
        let line_height = size * LEADING;
        for line in wrap(text, CONTENT_WIDTH, size, self.font, bold) {
            self.reserve(line_height);
            let width = text_width(&line, size, self.font, bold);
            let x = aligned_x(align, MARGIN, CONTENT_WIDTH, 0.0, width);
            let baseline = self.cursor + size;
            self.text(&line, x, baseline, size, bold, color);
            self.cursor += line_height;
        }
    }

    /// Draw `table` at the cursor, breaking pages between rows and repeating
    /// the head row. Returns the cursor position after the last row.
    pub fn table(&mut self, table: &Table) -> f32 {
        let head: Option<Vec<Cell>> = table.show_head.then(|| {
            table
                .columns
                .iter()
                .map(|c| Cell::new(c.title.as_str()).bold())
                .collect()
        });

        if let Some(head) = &head {
            self.row(table, head, true);
        }
        for row in &table.rows {
            let height = self.row_height(table, row, false);
            if self.cursor + height > PAGE_HEIGHT - MARGIN && self.cursor > MARGIN {
                self.new_page();
                if let Some(head) = &head {
                    self.row(table, head, true);
                }
            }
            self.row(table, row, false);
        }
        self.cursor
    }

    fn wrapped_cells(&self, table: &Table, cells: &[Cell], head: bool) -> Vec<Vec<String>> {
        let style = &table.style;
        table
            .columns
            .iter()
            .zip(cells)
            .map(|(column, cell)| {
                let inner = (column.width - 2.0 * style.padding).max(1.0);
                wrap(&cell.text, inner, style.font_size, self.font, head || cell.bold)
            })
            .collect()
    }

    fn row_height(&self, table: &Table, cells: &[Cell], head: bool) -> f32 {
        let lines = self
            .wrapped_cells(table, cells, head)
            .iter()
            .map(Vec::len)
            .max()
            .unwrap_or(1)
            .max(1);
        lines as f32 * table.style.font_size * LEADING + 2.0 * table.style.padding
    }

    fn row(&mut self, table: &Table, cells: &[Cell], head: bool) {
        let style = &table.style;
        let height = self.row_height(table, cells, head);
        self.reserve(height);
        let wrapped = self.wrapped_cells(table, cells, head);
        let line_height = style.font_size * LEADING;
        let top = self.cursor;
        let mut x = MARGIN;

        for (index, column) in table.columns.iter().enumerate() {
            let cell = cells.get(index);
            let fill = if head {
                Some(style.head_fill)
            } else {
                cell.and_then(|c| c.fill)
            };
            if let Some(fill) = fill {
                self.fill_rect(x, top, column.width, height, fill);
            }
            if let Some(grid) = style.grid {
                self.stroke_rect(x, top, column.width, height, grid);
            }
            if let (Some(cell), Some(lines)) = (cell, wrapped.get(index)) {
                let bold = head || cell.bold;
                let color = if head {
                    style.head_color
                } else {
                    cell.color.unwrap_or(style.text_color)
                };
                let align = cell.align.unwrap_or(column.align);
                for (n, line) in lines.iter().enumerate() {
                    let width = text_width(line, style.font_size, self.font, bold);
                    let tx = aligned_x(align, x, column.width, style.padding, width);
                    let baseline = top + style.padding + style.font_size * 0.85 + n as f32 * line_height;
                    self.text(line, tx, baseline, style.font_size, bold, color);
                }
            }
            x += column.width;
        }
        self.cursor = top + height;
    }

    /// Assemble the pages into a PDF file.
    pub fn finish(mut self, title: &str) -> Result<Vec<u8>, BillingError> {
        self.finished.push(std::mem::take(&mut self.current));

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let regular_id = doc.add_object(font_dictionary(self.font.base_font(false)));
        let bold_id = doc.add_object(font_dictionary(self.font.base_font(true)));
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                REGULAR_FONT => regular_id,
                BOLD_FONT => bold_id,
            },
        });

        let mut kids: Vec<Object> = Vec::with_capacity(self.finished.len());
        for operations in self.finished {
            let bytes = Content { operations }
                .encode()
                .map_err(|e| BillingError::Render(format!("failed to encode page content: {e}")))?;
            let content_id = doc.add_object(Stream::new(dictionary! {}, bytes).with_compression(false));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        let media_box: Vec<Object> = vec![
            Object::Integer(0),
            Object::Integer(0),
            PAGE_WIDTH.into(),
            PAGE_HEIGHT.into(),
        ];
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => resources_id,
                "MediaBox" => media_box,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        let info_id = doc.add_object(dictionary! {
            "Title" => Object::string_literal(title),
            "Producer" => Object::string_literal("billbook"),
        });
        doc.trailer.set("Root", catalog_id);
        doc.trailer.set("Info", info_id);

        let mut output = Vec::new();
        doc.save_to(&mut output)
            .map_err(|e| BillingError::Render(format!("failed to save PDF: {e}")))?;
        Ok(output)
    }
}

fn font_dictionary(base_font: &str) -> lopdf::Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => Object::Name(base_font.as_bytes().to_vec()),
        "Encoding" => "WinAnsiEncoding",
    }
}

fn aligned_x(align: Align, x: f32, width: f32, padding: f32, text_width: f32) -> f32 {
    match align {
        Align::Left => x + padding,
        Align::Center => x + (width - text_width) / 2.0,
        Align::Right => x + width - padding - text_width,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::layout::{TableColumn, TableStyle};

    #[test]
    fn win_ansi_mapping() {
        assert_eq!(encode_win_ansi("Rs 5"), b"Rs 5");
        assert_eq!(encode_win_ansi("a \u{2022} b"), vec![b'a', b' ', 0x95, b' ', b'b']);
        assert_eq!(encode_win_ansi("\u{20b9}"), b"?");
    }

    #[test]
    fn wrap_respects_width_and_newlines() {
        let lines = wrap("one two three four", 40.0, 10.0, FontFamily::Courier, false);
        // Courier: 6pt per char at 10pt, so at most 6 chars per line
        assert_eq!(lines, ["one", "two", "three", "four"]);

        let lines = wrap("a\n\nb", 100.0, 10.0, FontFamily::Helvetica, false);
        assert_eq!(lines, ["a", "", "b"]);
    }

    #[test]
    fn wrap_splits_long_words() {
        let lines = wrap("abcdefghij", 30.0, 10.0, FontFamily::Courier, false);
        assert_eq!(lines, ["abcde", "fghij"]);
    }

    #[test]
    fn head_rows_are_measured_bold() {
        let table = Table {
            columns: vec![TableColumn {
                title: String::new(),
                width: 60.0,
                align: Align::Left,
            }],
            show_head: false,
            rows: Vec::new(),
            style: TableStyle {
                font_size: 10.0,
                padding: 2.0,
                text_color: Rgb::BLACK,
                grid: None,
                head_fill: Rgb::BLACK,
                head_color: Rgb::BLACK,
            },
        };
        let title = "Description of the Title Column";
        let plain = [Cell::new(title)];
        let bold = [Cell::new(title).bold()];

        let canvas = Canvas::new(FontFamily::Helvetica);
        assert_eq!(
            canvas.row_height(&table, &plain, true),
            canvas.row_height(&table, &bold, false)
        );

        let mut drawn = Canvas::new(FontFamily::Helvetica);
        drawn.row(&table, &plain, true);
        let lines = wrap(title, 56.0, 10.0, FontFamily::Helvetica, true).len();
        let expected = lines as f32 * 10.0 * LEADING + 4.0;
        assert!((drawn.cursor() - MARGIN - expected).abs() < 0.01);
    }

    #[test]
    fn paragraphs_paginate() {
        let mut canvas = Canvas::new(FontFamily::Helvetica);
        let long = vec!["line"; 120].join("\n");
        canvas.paragraph(&long, 10.0, false, Align::Left, Rgb::BLACK);
        assert!(canvas.page_count() >= 2);
        assert!(canvas.cursor() < PAGE_HEIGHT - MARGIN);
    }
}
