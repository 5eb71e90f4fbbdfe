use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;

use crate::data::column::ColumnSet;
use crate::data::dataset::Dataset;
use crate::data::value::Value;
use crate::data::vector::Vector;
use crate::error::{FrameError, Result};

// ---------------------------------------------------------------------------
// VectorKey – composite key over the indexed columns
// ---------------------------------------------------------------------------

/// The values of one row at the indexed columns, in the indexed columns' order.
///
/// Two keys are equal when they name the same columns in the same order and
/// their values are pairwise equal.
#[derive(Debug, Clone)]
pub struct VectorKey {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl VectorKey {
    pub fn new(columns: &ColumnSet, values: Vec<Value>) -> Result<Self> {
        if columns.len() != values.len() {
            return Err(FrameError::LengthMismatch {
                left: columns.len(),
                right: values.len(),
            });
        }
        Ok(Self {
            columns: columns.names().map(str::to_string).collect(),
            values,
        })
    }

    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

impl PartialEq for VectorKey {
    fn eq(&self, other: &Self) -> bool {
        self.columns == other.columns && self.values == other.values
    }
}

impl Eq for VectorKey {}

impl Hash for VectorKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.values.hash(state);
    }
}

// ---------------------------------------------------------------------------
// RowSet – the rows sharing one key
// ---------------------------------------------------------------------------

/// An ordered bucket of rows; empty on a lookup miss.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowSet {
    rows: Vec<Vector>,
}

impl RowSet {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Vector] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Vector> {
        self.rows.iter()
    }
}

impl<'a> IntoIterator for &'a RowSet {
    type Item = &'a Vector;
    type IntoIter = std::slice::Iter<'a, Vector>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

// ---------------------------------------------------------------------------
// IndexedDataset
// ---------------------------------------------------------------------------

/// A dataset plus a key -> rows mapping over a subset of its columns.
///
/// Built eagerly in one pass; every row lands in exactly one bucket.
/// Buckets are kept in the order their key was first seen. Dereferences to
/// the underlying [`Dataset`].
#[derive(Debug, Clone)]
pub struct IndexedDataset {
    dataset: Dataset,
    indexed: ColumnSet,
    // where each indexed column sits in the source rows
    positions: Vec<usize>,
    slots: HashMap<VectorKey, usize>,
    buckets: Vec<(VectorKey, RowSet)>,
    empty: RowSet,
}

/// Index `dataset` on `key_columns`.
///
/// Keys follow the dataset's column order, not the order of `key_columns`.
pub fn index<S: AsRef<str>>(dataset: &Dataset, key_columns: &[S]) -> Result<IndexedDataset> {
    if key_columns.is_empty() {
        return Err(FrameError::Argument(
            "an index needs at least one key column".to_string(),
        ));
    }
    let indexed = dataset.columns().includes(key_columns)?;
    let positions = indexed
        .names()
        .map(|n| dataset.columns().position(n))
        .collect::<Result<Vec<_>>>()?;
    let names: Arc<[String]> = indexed.names().map(str::to_string).collect();

    let mut slots: HashMap<VectorKey, usize> = HashMap::new();
    let mut buckets: Vec<(VectorKey, RowSet)> = Vec::new();
    for row in dataset {
        let key = VectorKey {
            columns: Arc::clone(&names),
            values: positions.iter().map(|&p| row[p].clone()).collect(),
        };
        match slots.get(&key) {
            Some(&slot) => buckets[slot].1.rows.push(row.clone()),
            None => {
                slots.insert(key.clone(), buckets.len());
                buckets.push((key, RowSet { rows: vec![row.clone()] }));
            }
        }
    }

    log::debug!(
        "indexed {} rows on {:?} into {} buckets",
        dataset.len(),
        names,
        buckets.len()
    );

    Ok(IndexedDataset {
        dataset: dataset.clone(),
        indexed,
        positions,
        slots,
        buckets,
        empty: RowSet::default(),
    })
}

impl IndexedDataset {
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// The columns the key is built from.
    pub fn indexed_columns(&self) -> &ColumnSet {
        &self.indexed
    }

    /// Positions of the indexed columns in the source rows.
    pub fn key_positions(&self) -> &[usize] {
        &self.positions
    }

    /// Distinct keys, in first-seen order.
    pub fn keys(&self) -> impl Iterator<Item = &VectorKey> {
        self.buckets.iter().map(|(k, _)| k)
    }

    /// Every bucket with its key, in first-seen order.
    pub fn buckets(&self) -> impl Iterator<Item = (&VectorKey, &RowSet)> {
        self.buckets.iter().map(|(k, rs)| (k, rs))
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// The rows matching `key`; empty when nothing matches.
    ///
    /// A key built over other columns than the indexed ones is an argument
    /// error, not a miss.
    pub fn row_set(&self, key: &VectorKey) -> Result<&RowSet> {
        let same_columns = key.columns.len() == self.indexed.len()
            && key.columns.iter().map(String::as_str).eq(self.indexed.names());
        if !same_columns {
            return Err(FrameError::Argument(format!(
                "key over {:?} does not match index over {:?}",
                key.columns,
                self.indexed.names().collect::<Vec<_>>()
            )));
        }
        Ok(self
            .slots
            .get(key)
            .map_or(&self.empty, |&slot| &self.buckets[slot].1))
    }

    /// Lookup by `(column names, values)` pairs. Names may come in any order
    /// but must be exactly the indexed columns.
    pub fn row_set_for<S: AsRef<str>>(&self, names: &[S], values: &[Value]) -> Result<&RowSet> {
        if names.len() != values.len() {
            return Err(FrameError::Argument(format!(
                "{} key names but {} key values",
                names.len(),
                values.len()
            )));
        }
        if names.len() != self.indexed.len() {
            return Err(self.column_mismatch(names));
        }
        let mut ordered = Vec::with_capacity(values.len());
        for col in &self.indexed {
            let at = names
                .iter()
                .position(|n| n.as_ref() == col.name())
                .ok_or_else(|| self.column_mismatch(names))?;
            ordered.push(values[at].clone());
        }
        let key = VectorKey::new(&self.indexed, ordered)?;
        self.row_set(&key)
    }

    /// The key a row of the source dataset falls under.
    pub fn key_of(&self, row: &Vector) -> Result<VectorKey> {
        let values = row.select(&self.positions)?;
        VectorKey::new(&self.indexed, values.values().to_vec())
    }

    fn column_mismatch<S: AsRef<str>>(&self, names: &[S]) -> FrameError {
        FrameError::Argument(format!(
            "lookup columns {:?} do not match indexed columns {:?}",
            names.iter().map(AsRef::as_ref).collect::<Vec<&str>>(),
            self.indexed.names().collect::<Vec<_>>()
        ))
    }
}

impl Deref for IndexedDataset {
    type Target = Dataset;

    fn deref(&self) -> &Dataset {
        &self.dataset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::value::Datatype;
    use crate::vector;

    fn sales() -> Dataset {
        Dataset::new(
            ColumnSet::of(&[
                ("country", Datatype::String),
                ("gdp", Datatype::Numeric),
                ("year", Datatype::Numeric),
            ])
            .expect("valid schema"),
            vec![
                vector!["us", 100, 2000],
                vector!["us", 101, 2001],
                vector!["uk", 200, 2000],
                vector!["us", 102, 2000],
            ],
        )
        .expect("valid dataset")
    }

    #[test]
    fn every_row_lands_in_one_bucket() {
        let ds = sales();
        for key in [vec!["country"], vec!["year"], vec!["country", "year"], vec!["gdp"]] {
            let idx = ds.index(&key).expect("known columns");
            let total: usize = idx.buckets().map(|(_, rs)| rs.len()).sum();
            assert_eq!(total, ds.len(), "key {key:?}");
        }
    }

    #[test]
    fn buckets_keep_row_order_and_share_rows() {
        let ds = sales();
        let idx = ds.index(&["country"]).expect("known column");
        assert_eq!(idx.bucket_count(), 2);
        let us = idx.row_set_for(&["country"], &["us".into()]).expect("valid lookup");
        let gdp: Vec<&Value> = us.iter().map(|r| &r[1]).collect();
        assert_eq!(gdp, vec![&Value::from(100), &Value::from(101), &Value::from(102)]);
        assert!(us.rows()[0].shares_storage(&ds.rows()[0]));
        assert_eq!(idx.len(), ds.len());
    }

    #[test]
    fn composite_keys_follow_schema_order() {
        let ds = sales();
        let idx = ds.index(&["year", "country"]).expect("known columns");
        let names: Vec<&str> = idx.indexed_columns().names().collect();
        assert_eq!(names, vec!["country", "year"]);
        assert_eq!(idx.key_positions(), &[0, 2]);

        let hit = idx
            .row_set_for(&["year", "country"], &[2000.into(), "us".into()])
            .expect("valid lookup");
        assert_eq!(hit.len(), 2);

        let key = VectorKey::new(idx.indexed_columns(), vec!["uk".into(), 2000.into()])
            .expect("matching length");
        assert_eq!(idx.row_set(&key).expect("valid lookup").len(), 1);
        assert_eq!(idx.key_of(&ds.rows()[2]).expect("row of source"), key);
    }

    #[test]
    fn misses_are_empty_but_wrong_columns_are_errors() {
        let ds = sales();
        let idx = ds.index(&["country"]).expect("known column");
        let miss = idx.row_set_for(&["country"], &["fr".into()]).expect("valid lookup");
        assert!(miss.is_empty());

        let err = idx.row_set_for(&["year"], &[2000.into()]).unwrap_err();
        assert!(matches!(err, FrameError::Argument(_)));

        let other = ColumnSet::of(&[("year", Datatype::Numeric)]).expect("valid schema");
        let key = VectorKey::new(&other, vec![2000.into()]).expect("matching length");
        assert!(matches!(idx.row_set(&key), Err(FrameError::Argument(_))));
    }

    #[test]
    fn index_arguments_are_checked() {
        let ds = sales();
        let none: [&str; 0] = [];
        assert!(matches!(ds.index(&none), Err(FrameError::Argument(_))));
        assert!(matches!(ds.index(&["pop"]), Err(FrameError::UnknownColumn(_))));
    }

    #[test]
    fn keys_are_first_seen_order() {
        let idx = sales().index(&["year"]).expect("known column");
        let keys: Vec<&Value> = idx.keys().map(|k| &k.values()[0]).collect();
        assert_eq!(keys, vec![&Value::from(2000), &Value::from(2001)]);
    }
}
