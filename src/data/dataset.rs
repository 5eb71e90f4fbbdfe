use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use super::column::ColumnSet;
use super::value::Value;
use super::vector::Vector;
use crate::error::{FrameError, Result};
use crate::transform::index::{self, IndexedDataset};

// ---------------------------------------------------------------------------
// Dataset – schema + ordered rows
// ---------------------------------------------------------------------------

/// The immutable table value every transform consumes and produces.
///
/// Rows live behind an `Arc`, and a dataset only looks at the window
/// `[start, end)` of them, so slicing is a constant-time view and derived
/// datasets share rows with their source.
#[derive(Debug, Clone)]
pub struct Dataset {
    columns: Arc<ColumnSet>,
    rows: Arc<[Vector]>,
    start: usize,
    end: usize,
}

impl Dataset {
    /// Validates every row against `columns`: length, tag vs. datatype
    /// (`Missing` fits anywhere), and for nominal cells that their code names
    /// the same category in the column's set. Violations are
    /// [`FrameError::Schema`].
    pub fn new(columns: ColumnSet, rows: Vec<Vector>) -> Result<Self> {
        for (r, row) in rows.iter().enumerate() {
            check_row(&columns, r, row)?;
        }
        let end = rows.len();
        Ok(Self {
            columns: Arc::new(columns),
            rows: rows.into(),
            start: 0,
            end,
        })
    }

    /// A dataset with a schema and no rows.
    pub fn empty(columns: ColumnSet) -> Self {
        Self {
            columns: Arc::new(columns),
            rows: Arc::from(Vec::new()),
            start: 0,
            end: 0,
        }
    }

    /// Rows `[start, end)` of this dataset; bounds must already be in range.
    pub(crate) fn view(&self, start: usize, end: usize) -> Self {
        debug_assert!(start <= end && end <= self.len());
        Self {
            columns: Arc::clone(&self.columns),
            rows: Arc::clone(&self.rows),
            start: self.start + start,
            end: self.start + end,
        }
    }

    pub fn columns(&self) -> &ColumnSet {
        &self.columns
    }

    pub fn rows(&self) -> &[Vector] {
        &self.rows[self.start..self.end]
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn row(&self, index: usize) -> Option<&Vector> {
        self.rows().get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Vector> {
        self.rows().iter()
    }

    /// The cell at `row` in the column called `column`.
    pub fn value(&self, row: usize, column: &str) -> Result<&Value> {
        let pos = self.columns.position(column)?;
        self.row(row).map(|r| &r[pos]).ok_or_else(|| {
            FrameError::Argument(format!("row {row} out of range for {} rows", self.len()))
        })
    }

    /// Every cell of one column, top to bottom.
    pub fn column_values(&self, column: &str) -> Result<impl Iterator<Item = &Value> + '_> {
        let pos = self.columns.position(column)?;
        Ok(self.rows().iter().map(move |r| &r[pos]))
    }

    /// Distinct cells of one column, in first-seen order.
    pub fn distinct_values(&self, column: &str) -> Result<Vec<Value>> {
        let mut seen = HashSet::new();
        Ok(self
            .column_values(column)?
            .filter(|v| seen.insert(*v))
            .cloned()
            .collect())
    }

    /// Index this dataset on the named columns.
    pub fn index<S: AsRef<str>>(&self, key_columns: &[S]) -> Result<IndexedDataset> {
        index::index(self, key_columns)
    }
}

fn check_row(columns: &ColumnSet, r: usize, row: &Vector) -> Result<()> {
    if row.len() != columns.len() {
        return Err(FrameError::Schema(format!(
            "row {r} has {} values but the schema has {} columns",
            row.len(),
            columns.len()
        )));
    }
    for (col, value) in columns.iter().zip(row.iter()) {
        if !col.datatype().accepts(value) {
            return Err(FrameError::Schema(format!(
                "row {r}: value {value} does not fit column {col}"
            )));
        }
        if let (Value::Nominal(n), Some(domain)) = (value, col.nominals()) {
            // the cell's code must name the same category in the column's set
            if !domain.by_code(n.code()).is_ok_and(|d| d.name == n.name()) {
                return Err(FrameError::Schema(format!(
                    "row {r}: nominal {:?} (code {}) is not in the domain of column {}",
                    n.name(),
                    n.code(),
                    col.name()
                )));
            }
        }
    }
    Ok(())
}

impl PartialEq for Dataset {
    fn eq(&self, other: &Self) -> bool {
        self.columns == other.columns && self.rows() == other.rows()
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Vector;
    type IntoIter = std::slice::Iter<'a, Vector>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Plain-text table, cells rendered through each column's format hook.
impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header: Vec<String> = self.columns.names().map(str::to_string).collect();
        let cells: Vec<Vec<String>> = self
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .zip(row.iter())
                    .map(|(c, v)| c.format_value(v))
                    .collect()
            })
            .collect();

        let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
        for row in &cells {
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = (*w).max(cell.chars().count());
            }
        }

        let write_line = |f: &mut fmt::Formatter<'_>, line: &[String]| -> fmt::Result {
            for (i, (cell, &w)) in line.iter().zip(&widths).enumerate() {
                if i > 0 {
                    write!(f, "  ")?;
                }
                write!(f, "{cell:<w$}")?;
            }
            writeln!(f)
        };

        write_line(f, &header)?;
        for row in &cells {
            write_line(f, row)?;
        }
        write!(f, "({} rows)", self.len())
    }
}
