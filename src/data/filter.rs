use std::collections::BTreeSet;

use super::dataset::Dataset;
use super::value::Value;
use crate::error::Result;

// ---------------------------------------------------------------------------
// Value-set filter: keep rows whose cell is among the selected values
// ---------------------------------------------------------------------------

/// Positions of the rows whose value in `column` is in `selected`.
///
/// An empty selection keeps nothing.
pub fn filtered_indices(
    dataset: &Dataset,
    column: &str,
    selected: &BTreeSet<Value>,
) -> Result<Vec<usize>> {
    Ok(dataset
        .column_values(column)?
        .enumerate()
        .filter(|(_, v)| selected.contains(*v))
        .map(|(i, _)| i)
        .collect())
}

/// The rows whose value in `column` is in `selected`, in their original order.
pub fn select(dataset: &Dataset, column: &str, selected: &BTreeSet<Value>) -> Result<Dataset> {
    let keep = filtered_indices(dataset, column, selected)?;
    let rows = keep.into_iter().map(|i| dataset.rows()[i].clone()).collect();
    Dataset::new(dataset.columns().clone(), rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::column::ColumnSet;
    use crate::data::value::Datatype;
    use crate::error::FrameError;
    use crate::vector;

    fn dataset() -> Dataset {
        Dataset::new(
            ColumnSet::of(&[("country", Datatype::String), ("gdp", Datatype::Numeric)])
                .expect("valid schema"),
            vec![vector!["us", 1], vector!["uk", 2], vector!["fr", 3], vector!["us", 4]],
        )
        .expect("valid dataset")
    }

    #[test]
    fn keeps_selected_rows_in_order() {
        let ds = dataset();
        let selected: BTreeSet<Value> = ["us", "fr"].into_iter().map(Value::from).collect();
        assert_eq!(filtered_indices(&ds, "country", &selected).expect("known"), vec![0, 2, 3]);
        let kept = select(&ds, "country", &selected).expect("known");
        assert_eq!(kept.rows(), &[vector!["us", 1], vector!["fr", 3], vector!["us", 4]]);
        assert!(kept.rows()[0].shares_storage(&ds.rows()[0]));
    }

    #[test]
    fn empty_selection_keeps_nothing() {
        let ds = dataset();
        let kept = select(&ds, "country", &BTreeSet::new()).expect("known");
        assert!(kept.is_empty());
        assert_eq!(kept.columns(), ds.columns());
    }

    #[test]
    fn unknown_column_is_reported() {
        let err = select(&dataset(), "pop", &BTreeSet::new()).unwrap_err();
        assert!(matches!(err, FrameError::UnknownColumn(_)));
    }
}
