//! Receipt layout in millimetres, top-left origin.
//!
//! The table follows a measure-then-commit discipline: both cells of a row are
//! wrapped and measured first, the row height is the taller of the two, and
//! only then are both bordered cells emitted at that shared height. Drawing
//! order never feeds back into measurement, so the grid cannot drift.

use jobsheet_core::JobRecord;

use crate::metrics::{text_width, wrap_lines, FontStyle, MM_PER_PT};
use crate::shop::ShopProfile;

/// Something drawn on the page.
#[derive(Debug, Clone, PartialEq)]
pub enum Mark {
    /// Stroked rectangle; `(x, y)` is the top-left corner.
    Rect { x: f32, y: f32, w: f32, h: f32, line_width: f32 },
    /// Stroked straight line.
    Line { x1: f32, y1: f32, x2: f32, y2: f32, line_width: f32 },
    /// Single-line text run; `baseline` is the y of the text baseline.
    Text { x: f32, baseline: f32, style: FontStyle, size_pt: f32, text: String },
}

/// One page worth of marks.
#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    pub width: f32,
    pub height: f32,
    pub marks: Vec<Mark>,
}

/// Fixed page geometry. These are layout constants, not computed values.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptGeometry {
    pub page_width: f32,
    pub page_height: f32,
    pub box_left: f32,
    pub box_right: f32,
    pub box_height: f32,
    pub box_line_width: f32,
    /// Top of the company copy, then the customer copy.
    pub copy_tops: [f32; 2],
    pub separator_y: f32,
    pub separator_line_width: f32,
    pub label_width: f32,
    pub value_width: f32,
    pub line_height: f32,
    /// Horizontal inset of text inside a cell, each side.
    pub cell_padding: f32,
}

impl ReceiptGeometry {
    /// A4 portrait, two stacked copies.
    pub fn a4() -> Self {
        Self {
            page_width: 210.0,
            page_height: 297.0,
            box_left: 10.0,
            box_right: 200.0,
            box_height: 135.0,
            box_line_width: 0.3,
            copy_tops: [10.0, 150.0],
            separator_y: 147.0,
            separator_line_width: 0.2,
            label_width: 60.0,
            value_width: 130.0,
            line_height: 8.0,
            cell_padding: 1.0,
        }
    }

    fn box_width(&self) -> f32 {
        self.box_right - self.box_left
    }
}

impl Default for ReceiptGeometry {
    fn default() -> Self {
        Self::a4()
    }
}

/// Labels of the two copies, in page order.
pub const COPY_LABELS: [&str; 2] = ["Company Copy", "Customer Copy"];

pub const FOOTER_NOTE: &str = "Note: Keep this receipt safe. Present it when collecting your device.";

const TABLE_SIZE_PT: f32 = 10.0;
const TABLE_HEADER_SIZE_PT: f32 = 11.0;

/// Space below the table: gap, footer note, bottom margin.
const FOOTER_BLOCK: f32 = 8.0;

const ELLIPSIS: &str = "...";

/// Where a committed table row landed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowGeometry {
    pub top: f32,
    pub height: f32,
    pub label_lines: usize,
    pub value_lines: usize,
    /// The value had more lines than fit in the copy box and was cut short.
    pub truncated: bool,
}

/// Geometry of one copy, for callers that need more than the marks.
#[derive(Debug, Clone, PartialEq)]
pub struct CopyGeometry {
    pub label: &'static str,
    pub top: f32,
    pub rows: Vec<RowGeometry>,
    /// Cursor position after the footer note.
    pub bottom: f32,
}

/// Full receipt: page marks plus per-copy geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptLayout {
    pub page: PageLayout,
    pub copies: Vec<CopyGeometry>,
}

/// Table rows shown on every copy, in order. Blank values print as `-`.
pub fn table_rows(record: &JobRecord) -> [(&'static str, &str); 5] {
    [
        ("Customer Name", record.customer_name.as_str()),
        ("Phone", record.phone.as_str()),
        ("Printer Model", record.model.as_str()),
        ("Serial Number", record.serial.as_str()),
        ("Reported Symptom", record.symptom.as_str()),
    ]
    .map(|(label, value)| (label, display_value(value)))
}

fn display_value(value: &str) -> &str {
    if value.trim().is_empty() { "-" } else { value }
}

/// Lay out both copies of the receipt for `record`.
pub fn layout_receipt(record: &JobRecord, shop: &ShopProfile, geometry: &ReceiptGeometry) -> ReceiptLayout {
    let mut canvas = Canvas::new(geometry);
    let mut copies = Vec::with_capacity(COPY_LABELS.len());

    copies.push(canvas.copy(COPY_LABELS[0], geometry.copy_tops[0], record, shop));
    canvas.marks.push(Mark::Line {
        x1: geometry.box_left,
        y1: geometry.separator_y,
        x2: geometry.box_right,
        y2: geometry.separator_y,
        line_width: geometry.separator_line_width,
    });
    copies.push(canvas.copy(COPY_LABELS[1], geometry.copy_tops[1], record, shop));

    ReceiptLayout {
        page: PageLayout {
            width: geometry.page_width,
            height: geometry.page_height,
            marks: canvas.marks,
        },
        copies,
    }
}

/// A wrapped cell whose height is known but which has not been drawn.
#[derive(Debug, Clone, PartialEq)]
struct MeasuredCell {
    width: f32,
    lines: Vec<String>,
}

impl MeasuredCell {
    fn measure(text: &str, width: f32, padding: f32) -> Self {
        Self {
            width,
            lines: wrap_lines(text, width - 2.0 * padding, FontStyle::Regular, TABLE_SIZE_PT),
        }
    }

    fn natural_height(&self, line_height: f32) -> f32 {
        self.lines.len() as f32 * line_height
    }

    /// Drop the last line and mark the new last line with an ellipsis.
    fn cut_last_line(&mut self, padding: f32) {
        self.lines.pop();
        let max_width = self.width - 2.0 * padding;
        if let Some(last) = self.lines.last_mut() {
            let mut kept = last.trim_end().to_string();
            while !kept.is_empty()
                && text_width(&format!("{kept}{ELLIPSIS}"), FontStyle::Regular, TABLE_SIZE_PT) > max_width
            {
                kept.pop();
            }
            kept.push_str(ELLIPSIS);
            *last = kept;
        }
    }
}

/// Both cells of a row, measured, with their shared height.
#[derive(Debug, Clone, PartialEq)]
struct MeasuredRow {
    label: MeasuredCell,
    value: MeasuredCell,
    height: f32,
    truncated: bool,
}

impl MeasuredRow {
    fn measure(label: &str, value: &str, geometry: &ReceiptGeometry) -> Self {
        let label = MeasuredCell::measure(label, geometry.label_width, geometry.cell_padding);
        let value = MeasuredCell::measure(value, geometry.value_width, geometry.cell_padding);
        let height = Self::shared_height(&label, &value, geometry.line_height);
        Self {
            label,
            value,
            height,
            truncated: false,
        }
    }

    fn shared_height(label: &MeasuredCell, value: &MeasuredCell, line_height: f32) -> f32 {
        label
            .natural_height(line_height)
            .max(value.natural_height(line_height))
            .max(line_height)
    }

    /// Whether dropping a value line would lower the row.
    fn can_shrink(&self) -> bool {
        self.value.lines.len() > self.label.lines.len().max(1)
    }

    fn shrink(&mut self, geometry: &ReceiptGeometry) {
        self.value.cut_last_line(geometry.cell_padding);
        self.height = Self::shared_height(&self.label, &self.value, geometry.line_height);
        self.truncated = true;
    }
}

/// Shorten the tallest values until the rows fit in `budget` millimetres.
///
/// Measurement stays authoritative: heights are recomputed from the kept
/// lines, so committed cells still share one height per row.
fn fit_rows(rows: &mut [MeasuredRow], budget: f32, geometry: &ReceiptGeometry) {
    loop {
        let total: f32 = rows.iter().map(|r| r.height).sum();
        if total <= budget + 1e-4 {
            return;
        }
        let Some(row) = rows
            .iter_mut()
            .filter(|r| r.can_shrink())
            .max_by_key(|r| r.value.lines.len())
        else {
            return;
        };
        row.shrink(geometry);
    }
}

struct Canvas<'g> {
    geometry: &'g ReceiptGeometry,
    marks: Vec<Mark>,
    y: f32,
}

impl<'g> Canvas<'g> {
    fn new(geometry: &'g ReceiptGeometry) -> Self {
        Self {
            geometry,
            marks: Vec::new(),
            y: 0.0,
        }
    }

    fn copy(&mut self, label: &'static str, top: f32, record: &JobRecord, shop: &ShopProfile) -> CopyGeometry {
        let g = self.geometry;
        let left = g.box_left;
        self.y = top;

        self.marks.push(Mark::Rect {
            x: left,
            y: top,
            w: g.box_width(),
            h: g.box_height,
            line_width: g.box_line_width,
        });

        // Header block.
        self.y = top + 3.0;
        self.text_cell(left + 2.0, 8.0, FontStyle::Bold, 14.0, &format!("{}  -  {label}", shop.name));
        for line in wrap_lines(&shop.address, g.box_width() - 2.0 * g.cell_padding, FontStyle::Regular, 10.0) {
            self.text_cell(left, 5.0, FontStyle::Regular, 10.0, &line);
        }
        self.text_cell(left, 5.0, FontStyle::Regular, 10.0, &format!("Phone: {}", shop.phone));
        self.y += 2.0;

        // Metadata line: code on the left half, timestamp after it.
        let meta_top = self.y;
        self.text_at(left, meta_top, 6.0, FontStyle::Regular, 10.0, &format!("Jobsheet Code: {}", record.code));
        self.text_at(
            left + 95.0,
            meta_top,
            6.0,
            FontStyle::Regular,
            10.0,
            &format!("Timestamp: {}", shop.timezone.format_local(record.created_at)),
        );
        self.y = meta_top + 6.0 + 1.0;

        self.table_header(left);
        let mut measured: Vec<MeasuredRow> = table_rows(record)
            .into_iter()
            .map(|(k, v)| MeasuredRow::measure(k, v, g))
            .collect();
        fit_rows(&mut measured, top + g.box_height - FOOTER_BLOCK - self.y, g);
        let rows = measured
            .into_iter()
            .map(|row| self.commit_row(left, row))
            .collect();

        self.y += 2.0;
        self.text_cell(left, 5.0, FontStyle::Italic, 9.0, FOOTER_NOTE);
        self.y += 1.0;

        CopyGeometry {
            label,
            top,
            rows,
            bottom: self.y,
        }
    }

    fn table_header(&mut self, left: f32) {
        let g = self.geometry;
        let top = self.y;
        for (x, w, title) in [(left, g.label_width, "Field"), (left + g.label_width, g.value_width, "Value")] {
            self.cell_box(x, top, w, g.line_height);
            let tw = text_width(title, FontStyle::Bold, TABLE_HEADER_SIZE_PT);
            self.marks.push(Mark::Text {
                x: x + (w - tw) / 2.0,
                baseline: baseline(top, g.line_height, TABLE_HEADER_SIZE_PT),
                style: FontStyle::Bold,
                size_pt: TABLE_HEADER_SIZE_PT,
                text: title.to_string(),
            });
        }
        self.y = top + g.line_height;
    }

    /// Emit a measured row: both boxes at the shared height, then the text.
    fn commit_row(&mut self, left: f32, row: MeasuredRow) -> RowGeometry {
        let top = self.y;
        let value_x = left + row.label.width;

        self.cell_box(left, top, row.label.width, row.height);
        self.cell_box(value_x, top, row.value.width, row.height);
        self.cell_lines(left, top, &row.label.lines);
        self.cell_lines(value_x, top, &row.value.lines);

        self.y = top + row.height;
        RowGeometry {
            top,
            height: row.height,
            label_lines: row.label.lines.len(),
            value_lines: row.value.lines.len(),
            truncated: row.truncated,
        }
    }

    fn cell_lines(&mut self, x: f32, top: f32, lines: &[String]) {
        let g = self.geometry;
        for (i, line) in lines.iter().enumerate() {
            if line.is_empty() {
                continue;
            }
            self.marks.push(Mark::Text {
                x: x + g.cell_padding,
                baseline: baseline(top + i as f32 * g.line_height, g.line_height, TABLE_SIZE_PT),
                style: FontStyle::Regular,
                size_pt: TABLE_SIZE_PT,
                text: line.clone(),
            });
        }
    }

    fn cell_box(&mut self, x: f32, y: f32, w: f32, h: f32) {
        self.marks.push(Mark::Rect {
            x,
            y,
            w,
            h,
            line_width: self.geometry.box_line_width,
        });
    }

    /// Text at the cursor, then move the cursor down by `height`.
    fn text_cell(&mut self, x: f32, height: f32, style: FontStyle, size_pt: f32, text: &str) {
        let top = self.y;
        self.text_at(x, top, height, style, size_pt, text);
        self.y = top + height;
    }

    fn text_at(&mut self, x: f32, top: f32, height: f32, style: FontStyle, size_pt: f32, text: &str) {
        self.marks.push(Mark::Text {
            x: x + self.geometry.cell_padding,
            baseline: baseline(top, height, size_pt),
            style,
            size_pt,
            text: text.to_string(),
        });
    }
}

/// Baseline that vertically centres a run of `size_pt` text in a line box.
fn baseline(top: f32, height: f32, size_pt: f32) -> f32 {
    top + height / 2.0 + 0.3 * size_pt * MM_PER_PT
}
