//! Demo datasets and the terminal text measurer.
//!
//! Three generated tables of very different shapes: wide and short, square,
//! and long and narrow. Row 0 is a header row.

pub mod text_measure;

pub use text_measure::{wrap_lines, TextMeasure};

use crate::grid::dimensions::DatasetKey;

/// One named table of string cells, row-major, header row included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableData {
    name: String,
    rows: Vec<Vec<String>>,
}

impl TableData {
    /// Generate a table with `rows` data rows below a header and `cols` columns.
    ///
    /// Header cells read `見出し\n{name} {col}`. Data cells cycle through five
    /// shapes by column: row number, a comma-grouped number with two extra
    /// lines, the table name, the column number, and a dash.
    pub fn generate(name: &str, rows: usize, cols: usize) -> Self {
        let header = (0..cols).map(|col| format!("見出し\n{name} {col}")).collect();
        let body = (1..=rows).map(|row| {
            (0..cols)
                .map(|col| match col % 5 {
                    0 => row.to_string(),
                    1 => column_value(col),
                    2 => name.to_owned(),
                    3 => col.to_string(),
                    _ => "-".to_owned(),
                })
                .collect()
        });

        Self {
            name: name.to_owned(),
            rows: std::iter::once(header).chain(body).collect(),
        }
    }

    /// Table name, also used as its dataset key and scroll registry key.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Dataset key for size computation.
    pub fn dataset_key(&self) -> DatasetKey {
        DatasetKey::new(&self.name)
    }

    /// Row-major cells.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of rows, header included.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns.
    pub fn col_count(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    /// Cell text, if in bounds.
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col).map(String::as_str)
    }

    /// Keep only the first `rows` rows, for quick previews.
    pub fn truncated(&self, rows: usize) -> Self {
        Self {
            name: self.name.clone(),
            rows: self.rows.iter().take(rows).cloned().collect(),
        }
    }
}

/// The three demo tables: A (5×80), B (100×100) and C (2000×8).
pub fn demo_tables() -> Vec<TableData> {
    vec![
        TableData::generate("A", 5, 80),
        TableData::generate("B", 100, 100),
        TableData::generate("C", 2000, 8),
    ]
}

fn column_value(col: usize) -> String {
    let value = 123_456_789_u64 / 10_u64.pow((col % 10) as u32);
    format!("{}\n改行\nabc!/gy()", group_thousands(value))
}

/// Format `value` with a comma every three digits.
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
