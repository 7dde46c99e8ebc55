//! Materialized grid cells and clipped drawing into a ratatui buffer.
//!
//! Grid geometry is signed: cells partially scrolled off the left or top edge
//! have negative screen positions. Everything here clips against a `Rect`
//! before touching the buffer.

use crate::demo::wrap_lines;
use crate::grid::Px;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use unicode_width::UnicodeWidthChar;
use unicode_width::UnicodeWidthStr;

use super::styles::GridStyles;

/// Divider glyph on the right edge of column 0.
const DIVIDER: &str = "│";

/// A cell's text, wrapped once when the cell is materialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellView {
    row: usize,
    col: usize,
    lines: Vec<String>,
}

impl CellView {
    /// Wrap `text` to `inner_width` columns.
    pub fn new(row: usize, col: usize, text: &str, inner_width: usize) -> Self {
        Self {
            row,
            col,
            lines: wrap_lines(text, inner_width),
        }
    }

    /// Row index.
    pub fn row(&self) -> usize {
        self.row
    }

    /// Column index.
    pub fn col(&self) -> usize {
        self.col
    }

    /// Wrapped lines.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

/// Screen rectangle of a cell, in signed coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRect {
    /// Left edge.
    pub x: Px,
    /// Top edge.
    pub y: Px,
    /// Width.
    pub width: Px,
    /// Height.
    pub height: Px,
}

/// Draw `cell` into `buf` at `rect`, clipped to `clip`.
///
/// The whole rectangle is painted first so a sticky cell fully covers
/// whatever was drawn beneath it. Text lines are centered horizontally
/// inside `padding_x` columns on each side.
pub fn draw_cell(
    buf: &mut Buffer,
    clip: Rect,
    rect: CellRect,
    padding_x: Px,
    cell: &CellView,
    styles: &GridStyles,
) {
    let style = styles.for_cell(cell.row, cell.col);
    fill(buf, clip, rect, style);

    let inner = (rect.width - 2 * padding_x).max(0);
    for (i, line) in cell.lines.iter().enumerate().take(rect.height.max(0) as usize) {
        let line_width = Px::try_from(line.width()).unwrap_or(Px::MAX);
        let x = rect.x + padding_x + (inner - line_width).max(0) / 2;
        put_clipped(buf, clip, x, rect.y + i as Px, line, style);
    }

    if cell.col == 0 && cell.row > 0 && rect.width > 0 {
        for dy in 0..rect.height.max(0) {
            put_clipped(
                buf,
                clip,
                rect.x + rect.width - 1,
                rect.y + dy,
                DIVIDER,
                styles.divider,
            );
        }
    }
}

/// Paint `rect ∩ clip` with blanks in `style`.
pub fn fill(buf: &mut Buffer, clip: Rect, rect: CellRect, style: Style) {
    let clip = clip.intersection(buf.area);
    let left = rect.x.max(Px::from(clip.left()));
    let right = (rect.x + rect.width).min(Px::from(clip.right()));
    let top = rect.y.max(Px::from(clip.top()));
    let bottom = (rect.y + rect.height).min(Px::from(clip.bottom()));

    for y in top..bottom {
        for x in left..right {
            if let Some(cell) = screen_cell(buf, x, y) {
                cell.set_symbol(" ").set_style(style);
            }
        }
    }
}

/// Write `text` starting at `(x, y)`, dropping characters outside `clip`.
///
/// A wide character is only drawn when it fits entirely; the cell it covers
/// is reset the way ratatui does for wide graphemes.
pub fn put_clipped(buf: &mut Buffer, clip: Rect, x: Px, y: Px, text: &str, style: Style) {
    let clip = clip.intersection(buf.area);
    if y < Px::from(clip.top()) || y >= Px::from(clip.bottom()) {
        return;
    }

    let left = Px::from(clip.left());
    let right = Px::from(clip.right());
    let mut cursor = x;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0) as Px;
        if w == 0 {
            continue;
        }
        if cursor >= right {
            break;
        }
        if cursor >= left && cursor + w <= right {
            let mut symbol = [0u8; 4];
            if let Some(cell) = screen_cell(buf, cursor, y) {
                cell.set_symbol(ch.encode_utf8(&mut symbol)).set_style(style);
            }
            for covered in 1..w {
                if let Some(cell) = screen_cell(buf, cursor + covered, y) {
                    cell.reset();
                }
            }
        }
        cursor += w;
    }
}

fn screen_cell(buf: &mut Buffer, x: Px, y: Px) -> Option<&mut ratatui::buffer::Cell> {
    let x = u16::try_from(x).ok()?;
    let y = u16::try_from(y).ok()?;
    buf.cell_mut((x, y))
}
