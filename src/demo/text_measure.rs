//! Terminal text measurement.
//!
//! One terminal cell is one pixel. Display width comes from `unicode-width`,
//! so wide CJK characters take two cells.

use crate::error::MeasureError;
use crate::grid::measure::ContentMeasure;
use crate::grid::Px;
use unicode_width::UnicodeWidthChar;
use unicode_width::UnicodeWidthStr;

/// Horizontal padding on each side of a cell.
pub const DEFAULT_PADDING_X: Px = 1;

/// Measures multi-line text cells for the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextMeasure {
    /// Blank cells left and right of the text.
    pub padding_x: Px,
    /// Blank lines above and below the text.
    pub padding_y: Px,
}

impl Default for TextMeasure {
    fn default() -> Self {
        Self {
            padding_x: DEFAULT_PADDING_X,
            padding_y: 0,
        }
    }
}

impl TextMeasure {
    /// Width available to text inside a cell of `width`.
    pub fn inner_width(&self, width: Px) -> usize {
        (width - 2 * self.padding_x).max(1) as usize
    }
}

impl ContentMeasure<String> for TextMeasure {
    fn measure_width(&mut self, row: usize, col: usize, item: &String) -> Result<Px, MeasureError> {
        let widest = item.split('\n').map(UnicodeWidthStr::width).max().unwrap_or(0);
        let widest = Px::try_from(widest)
            .map_err(|_| MeasureError::new(row, col, "text wider than the pixel range"))?;
        Ok(widest + 2 * self.padding_x)
    }

    fn measure_height(
        &mut self,
        row: usize,
        col: usize,
        item: &String,
        width: Px,
    ) -> Result<Px, MeasureError> {
        let lines = wrap_lines(item, self.inner_width(width)).len();
        let lines = Px::try_from(lines)
            .map_err(|_| MeasureError::new(row, col, "text taller than the pixel range"))?;
        Ok(lines + 2 * self.padding_y)
    }
}

/// Break `text` into display lines no wider than `width` cells.
///
/// Hard line breaks are kept. A character wider than `width` gets a line of
/// its own rather than being dropped.
pub fn wrap_lines(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();

    for source in text.split('\n') {
        let mut line = String::new();
        let mut used = 0;
        for ch in source.chars() {
            let w = ch.width().unwrap_or(0);
            if used + w > width && !line.is_empty() {
                lines.push(std::mem::take(&mut line));
                used = 0;
            }
            line.push(ch);
            used += w;
        }
        lines.push(line);
    }

    lines
}
