use serde::{Deserialize, Serialize};

use super::index::{IndexedDataset, VectorKey};
use crate::data::column::{Column, ColumnSet};
use crate::data::dataset::Dataset;
use crate::data::value::Value;
use crate::data::vector::Vector;
use crate::error::{FrameError, Result};

// ---------------------------------------------------------------------------
// Join description
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinKind {
    /// Only left rows with at least one match.
    Inner,
    /// Every left row; unmatched ones get `Missing` on the right side.
    Outer,
}

/// Which left columns pair with which right columns, positionally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    kind: JoinKind,
    left: Vec<String>,
    right: Vec<String>,
}

impl Join {
    /// Both column lists must be non-empty and of equal length.
    pub fn new<L, R>(kind: JoinKind, left: &[L], right: &[R]) -> Result<Self>
    where
        L: AsRef<str>,
        R: AsRef<str>,
    {
        if left.is_empty() || left.len() != right.len() {
            return Err(FrameError::Argument(format!(
                "join needs the same, non-zero number of columns on both sides (left={}, right={})",
                left.len(),
                right.len()
            )));
        }
        Ok(Self {
            kind,
            left: left.iter().map(|s| s.as_ref().to_string()).collect(),
            right: right.iter().map(|s| s.as_ref().to_string()).collect(),
        })
    }

    /// `Join::on(JoinKind::Inner, &[("id", "id")])`
    pub fn on(kind: JoinKind, pairs: &[(&str, &str)]) -> Result<Self> {
        let (left, right): (Vec<&str>, Vec<&str>) = pairs.iter().copied().unzip();
        Self::new(kind, &left, &right)
    }

    pub fn kind(&self) -> JoinKind {
        self.kind
    }

    pub fn left(&self) -> &[String] {
        &self.left
    }

    pub fn right(&self) -> &[String] {
        &self.right
    }
}

// ---------------------------------------------------------------------------
// Provenance of output columns
// ---------------------------------------------------------------------------

/// Where an output cell is read from.
#[derive(Debug, Clone, Copy)]
enum Source {
    Left(usize),
    Right(usize),
    /// A right join column; falls back to its paired left column when the
    /// left row had no match.
    Key { left: usize, right: usize },
}

/// One output row. Cells are expressed in their output column's nominal
/// domain, which for a join column may be wider than either side's.
fn assemble(
    table: &[Source],
    schema: &ColumnSet,
    lrow: &Vector,
    rrow: Option<&Vector>,
) -> Result<Vector> {
    table
        .iter()
        .zip(schema.iter())
        .map(|(src, col)| {
            let cell = match (*src, rrow) {
                (Source::Left(i), _) => &lrow[i],
                (Source::Right(i), Some(r)) => &r[i],
                (Source::Right(_), None) => return Ok(Value::Missing),
                (Source::Key { right, .. }, Some(r)) => &r[right],
                (Source::Key { left, .. }, None) => &lrow[left],
            };
            cell.rebind(col.nominals())
        })
        .collect()
}

// ---------------------------------------------------------------------------
// join
// ---------------------------------------------------------------------------

/// Index `right` on the join's right columns, then join.
pub fn join(left: &Dataset, right: &Dataset, how: &Join) -> Result<Dataset> {
    let indexed = right.index(how.right())?;
    join_indexed(left, &indexed, how)
}

/// Join against a prebuilt index, which must be over exactly the join's
/// right columns.
///
/// Output columns: left non-join columns, then the right join columns in
/// join order, then the right non-join columns. Output rows follow left row
/// order, then bucket order.
///
/// Nominal keys match by name. A nominal join column's domain is the right
/// column's, widened with any category only the left column knows.
pub fn join_indexed(left: &Dataset, right: &IndexedDataset, how: &Join) -> Result<Dataset> {
    let left_cols = left.columns();
    let right_cols = right.columns();

    let left_set = left_cols.includes(how.left())?;
    let right_set = right_cols.includes(how.right())?;
    if left_set.len() != how.left().len() || right_set.len() != how.right().len() {
        return Err(FrameError::Argument(format!(
            "join columns repeat a name: left={:?} right={:?}",
            how.left(),
            how.right()
        )));
    }
    if right_set.names().ne(right.indexed_columns().names()) {
        return Err(FrameError::Argument(format!(
            "index over {:?} cannot serve a join on {:?}",
            right.indexed_columns().names().collect::<Vec<_>>(),
            how.right()
        )));
    }

    let mut left_pos = Vec::with_capacity(how.left().len());
    for (l, r) in how.left().iter().zip(how.right()) {
        let (lc, rc) = (left_cols.by_name(l)?, right_cols.by_name(r)?);
        if lc.datatype() != rc.datatype() {
            return Err(FrameError::Argument(format!(
                "cannot join {lc} with {rc}: datatypes differ"
            )));
        }
        left_pos.push(lc.index());
    }

    // left values laid out in the index's key order
    let key_positions = right
        .indexed_columns()
        .names()
        .map(|name| {
            let j = how.right().iter().position(|r| r == name).ok_or_else(|| {
                FrameError::Argument(format!("indexed column {name} is not a join column"))
            })?;
            Ok(left_pos[j])
        })
        .collect::<Result<Vec<usize>>>()?;

    let mut columns: Vec<Column> = Vec::with_capacity(left_cols.len() + right_cols.len());
    let mut table: Vec<Source> = Vec::with_capacity(columns.capacity());
    for col in left_cols.iter().filter(|c| !how.left().iter().any(|n| n == c.name())) {
        table.push(Source::Left(col.index()));
        columns.push(col.copy(columns.len()));
    }
    for (j, name) in how.right().iter().enumerate() {
        let col = right_cols.by_name(name)?;
        let paired = left_cols.by_name(&how.left()[j])?;
        table.push(Source::Key {
            left: left_pos[j],
            right: col.index(),
        });
        columns.push(col.widened(columns.len(), paired));
    }
    for col in right_cols.iter().filter(|c| !how.right().iter().any(|n| n == c.name())) {
        table.push(Source::Right(col.index()));
        columns.push(col.copy(columns.len()));
    }
    let schema = ColumnSet::new(columns)?;

    let mut rows = Vec::new();
    let mut unmatched = 0usize;
    for lrow in left {
        let key = VectorKey::new(
            right.indexed_columns(),
            key_positions.iter().map(|&p| lrow[p].clone()).collect(),
        )?;
        let bucket = right.row_set(&key)?;
        match how.kind() {
            JoinKind::Inner => {
                for rrow in bucket {
                    rows.push(assemble(&table, &schema, lrow, Some(rrow))?);
                }
            }
            JoinKind::Outer => {
                if bucket.is_empty() {
                    unmatched += 1;
                    rows.push(assemble(&table, &schema, lrow, None)?);
                } else {
                    for rrow in bucket {
                        rows.push(assemble(&table, &schema, lrow, Some(rrow))?);
                    }
                }
            }
        }
    }

    log::debug!(
        "{:?} join of {} x {} rows on {:?}={:?}: {} rows out ({} unmatched)",
        how.kind(),
        left.len(),
        right.len(),
        how.left(),
        how.right(),
        rows.len(),
        unmatched
    );

    Dataset::new(schema, rows)
}
