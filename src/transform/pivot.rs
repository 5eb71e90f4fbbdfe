use std::collections::{HashMap, HashSet};

use crate::data::column::{Column, ColumnSet};
use crate::data::dataset::Dataset;
use crate::data::value::Value;
use crate::data::vector::Vector;
use crate::error::{FrameError, Result};

// ---------------------------------------------------------------------------
// pivot – long form to wide form
// ---------------------------------------------------------------------------

/// Spread the distinct values of `column_key` into columns.
///
/// One output row per distinct `row_key` value (first-seen order), whose
/// first cell is that value. Then one column per distinct, non-missing
/// `column_key` value (first-seen order), named by its text and typed like
/// `value`. Cells with no input row are `Missing`.
///
/// Two input rows with the same `(row_key, column_key)` pair fail with
/// [`FrameError::DuplicateKey`]. Rows whose `column_key` is `Missing` still
/// produce their output row but contribute no cell.
pub fn pivot(dataset: &Dataset, row_key: &str, column_key: &str, value: &str) -> Result<Dataset> {
    if row_key == column_key || row_key == value || column_key == value {
        return Err(FrameError::Argument(format!(
            "pivot needs three distinct columns, got row={row_key} column={column_key} value={value}"
        )));
    }
    let cols = dataset.columns();
    let (rk, ck, vc) = (
        cols.position(row_key)?,
        cols.position(column_key)?,
        cols.position(value)?,
    );

    let mut row_slots: HashMap<&Value, usize> = HashMap::new();
    let mut col_slots: HashMap<&Value, usize> = HashMap::new();
    let mut col_keys: Vec<&Value> = Vec::new();
    let mut grid: Vec<Vec<Value>> = Vec::new();
    for row in dataset {
        if !row_slots.contains_key(&row[rk]) {
            row_slots.insert(&row[rk], grid.len());
            grid.push(vec![row[rk].clone()]);
        }
        let c = &row[ck];
        if !c.is_missing() && !col_slots.contains_key(c) {
            col_slots.insert(c, col_keys.len());
            col_keys.push(c);
        }
    }

    let width = col_keys.len() + 1;
    for cells in &mut grid {
        cells.resize(width, Value::Missing);
    }
    let mut filled = vec![false; grid.len() * width];
    let mut skipped = 0usize;
    for row in dataset {
        let Some(&c) = col_slots.get(&row[ck]) else {
            skipped += 1;
            continue;
        };
        let r = row_slots[&row[rk]];
        let at = r * width + c + 1;
        if filled[at] {
            return Err(FrameError::DuplicateKey(format!(
                "more than one row for {row_key}={}, {column_key}={}",
                row[rk], row[ck]
            )));
        }
        filled[at] = true;
        grid[r][c + 1] = row[vc].clone();
    }
    if skipped > 0 {
        log::debug!("pivot skipped {skipped} rows with a missing {column_key}");
    }

    let value_col = cols.by_name(value)?;
    let mut columns = Vec::with_capacity(width);
    columns.push(cols.by_name(row_key)?.copy(0));
    for (i, key) in col_keys.iter().enumerate() {
        let name = key.to_string();
        if name == row_key {
            return Err(FrameError::DuplicateColumn(format!(
                "{name} (a value of {column_key} collides with the row-key column)"
            )));
        }
        columns.push(value_col.renamed(i + 1, name));
    }

    log::debug!(
        "pivoted {} rows into {} x {} on {row_key}/{column_key}",
        dataset.len(),
        grid.len(),
        width
    );
    Dataset::new(
        ColumnSet::new(columns)?,
        grid.into_iter().map(Vector::new).collect(),
    )
}

// ---------------------------------------------------------------------------
// merge – outer merge of pivoted datasets on their row key
// ---------------------------------------------------------------------------

/// Merge datasets that share a row-key column: the first column of the first
/// dataset.
///
/// The output has that key column, then every other column of every input
/// (by name, in input order; a name present in several inputs appears once
/// and must keep one datatype). One row per distinct key, first-seen order
/// across inputs. A cell takes the first non-missing value the inputs offer.
/// A key repeated within one input fails with [`FrameError::DuplicateKey`].
/// Nominal columns take the union, by name, of every input's domain.
pub fn merge(datasets: &[Dataset]) -> Result<Dataset> {
    let first = datasets.first().ok_or_else(|| {
        FrameError::Argument("merge needs at least one dataset".to_string())
    })?;
    let key_col = first.columns().get(0).ok_or_else(|| {
        FrameError::Argument("merge needs a key column, the first dataset has none".to_string())
    })?;
    let key_name = key_col.name();

    // (key position, [(source position, output position)]) per input
    let mut layouts: Vec<(usize, Vec<(usize, usize)>)> = Vec::with_capacity(datasets.len());
    let mut columns: Vec<Column> = vec![key_col.copy(0)];
    let mut slots: HashMap<&str, usize> = HashMap::new();
    for ds in datasets {
        let key_pos = ds.columns().position(key_name)?;
        let this_key = ds.columns().by_name(key_name)?;
        if this_key.datatype() != key_col.datatype() {
            return Err(FrameError::Schema(format!(
                "merge key {this_key} does not match {key_col}"
            )));
        }
        columns[0] = columns[0].widened(0, this_key);
        let mut mapping = Vec::new();
        for col in ds.columns().iter().filter(|c| c.name() != key_name) {
            let out = match slots.get(col.name()) {
                Some(&out) => {
                    if columns[out].datatype() != col.datatype() {
                        return Err(FrameError::Schema(format!(
                            "column {} is {} in one input and {} in another",
                            col.name(),
                            columns[out].datatype(),
                            col.datatype()
                        )));
                    }
                    columns[out] = columns[out].widened(out, col);
                    out
                }
                None => {
                    let out = columns.len();
                    slots.insert(col.name(), out);
                    columns.push(col.copy(out));
                    out
                }
            };
            mapping.push((col.index(), out));
        }
        layouts.push((key_pos, mapping));
    }

    let width = columns.len();
    let mut row_slots: HashMap<&Value, usize> = HashMap::new();
    let mut grid: Vec<Vec<Value>> = Vec::new();
    for (ds, (key_pos, mapping)) in datasets.iter().zip(&layouts) {
        let mut seen: HashSet<&Value> = HashSet::with_capacity(ds.len());
        for row in ds {
            let key = &row[*key_pos];
            if !seen.insert(key) {
                return Err(FrameError::DuplicateKey(format!(
                    "{key_name}={key} appears more than once in one input"
                )));
            }
            let r = match row_slots.get(key) {
                Some(&r) => r,
                None => {
                    let mut cells = vec![Value::Missing; width];
                    cells[0] = key.rebind(columns[0].nominals())?;
                    grid.push(cells);
                    row_slots.insert(key, grid.len() - 1);
                    grid.len() - 1
                }
            };
            for &(src, out) in mapping {
                if grid[r][out].is_missing() {
                    grid[r][out] = row[src].rebind(columns[out].nominals())?;
                }
            }
        }
    }

    log::debug!(
        "merged {} datasets on {key_name}: {} rows x {} columns",
        datasets.len(),
        grid.len(),
        width
    );
    Dataset::new(
        ColumnSet::new(columns)?,
        grid.into_iter().map(Vector::new).collect(),
    )
}
