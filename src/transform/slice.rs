//! Row slicing and partitioning.
//!
//! All operations are free functions returning views that share rows with
//! their input.

use crate::config::Conf;
use crate::data::dataset::Dataset;
use crate::error::{FrameError, Result};

const QUARTILE_COUNT: usize = 4;
const QUINTILE_COUNT: usize = 5;

/// Rows `[start, end)`, with both bounds clamped to `[0, len]`.
///
/// `end < start` is an argument error; out-of-range bounds are not.
pub fn slice(dataset: &Dataset, start: isize, end: isize) -> Result<Dataset> {
    if end < start {
        return Err(FrameError::Argument(format!(
            "end index ({end}) must be greater than or equal to start index ({start})"
        )));
    }
    let len = dataset.len();
    let clamp = |i: isize| usize::try_from(i).map_or(0, |i| i.min(len));
    Ok(dataset.view(clamp(start), clamp(end)))
}

/// Number of rows covered by `percent` of the dataset.
fn portion(dataset: &Dataset, percent: f64) -> Result<usize> {
    if !(0.0..=1.0).contains(&percent) {
        return Err(FrameError::Argument(format!(
            "percentage must be between 0 and 1 inclusively, got {percent}"
        )));
    }
    Ok((percent * dataset.len() as f64).floor() as usize)
}

/// The first `floor(percent * len)` rows.
pub fn top(dataset: &Dataset, percent: f64) -> Result<Dataset> {
    let n = portion(dataset, percent)?;
    Ok(dataset.view(0, n))
}

/// The last `floor(percent * len)` rows.
pub fn bottom(dataset: &Dataset, percent: f64) -> Result<Dataset> {
    let n = portion(dataset, percent)?;
    let len = dataset.len();
    Ok(dataset.view(len - n, len))
}

/// The first `conf.head_length` rows (fewer if the dataset is shorter).
pub fn head(dataset: &Dataset, conf: &Conf) -> Dataset {
    let len = dataset.len();
    dataset.view(0, conf.head_length.min(len))
}

/// The last `conf.tail_length` rows (fewer if the dataset is shorter).
pub fn tail(dataset: &Dataset, conf: &Conf) -> Dataset {
    let len = dataset.len();
    dataset.view(len.saturating_sub(conf.tail_length), len)
}

/// Bounds of 1-based partition `number` out of `count`; the last one
/// absorbs the remainder.
fn bounds(len: usize, number: usize, count: usize) -> (usize, usize) {
    let portion_len = len / count;
    let start = (number - 1) * portion_len;
    let end = if number == count { len } else { start + portion_len };
    (start, end)
}

/// Partition `number` (1-based) of `count` equal-width partitions.
pub fn partition(dataset: &Dataset, number: usize, count: usize) -> Result<Dataset> {
    if number == 0 || number > count {
        return Err(FrameError::Argument(format!(
            "partition number must be between 1 and {count}, got {number}"
        )));
    }
    let (start, end) = bounds(dataset.len(), number, count);
    Ok(dataset.view(start, end))
}

/// Quartile `number` (1-4).
pub fn quartile(dataset: &Dataset, number: usize) -> Result<Dataset> {
    partition(dataset, number, QUARTILE_COUNT)
}

/// Quintile `number` (1-5).
pub fn quintile(dataset: &Dataset, number: usize) -> Result<Dataset> {
    partition(dataset, number, QUINTILE_COUNT)
}

/// All `count` partitions, covering the whole dataset in order.
///
/// A dataset with fewer rows than `count` comes back whole, as a single
/// partition.
pub fn partitions(dataset: &Dataset, count: usize) -> Result<Vec<Dataset>> {
    if count == 0 {
        return Err(FrameError::Argument(
            "partition count must be greater than 0, got 0".to_string(),
        ));
    }
    let len = dataset.len();
    if len < count {
        return Ok(vec![dataset.clone()]);
    }
    Ok((1..=count)
        .map(|n| {
            let (start, end) = bounds(len, n, count);
            log::trace!("partition {n}/{count}: rows {start}..{end}");
            dataset.view(start, end)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::column::ColumnSet;
    use crate::data::value::{Datatype, Value};
    use crate::vector;

    fn numbers(n: i32) -> Dataset {
        Dataset::new(
            ColumnSet::of(&[("n", Datatype::Numeric)]).expect("valid schema"),
            (0..n).map(|i| vector![i]).collect(),
        )
        .expect("valid dataset")
    }

    fn vals(xs: &[i32]) -> Vec<Value> {
        xs.iter().map(|&x| Value::from(x)).collect()
    }

    fn firsts(ds: &Dataset) -> Vec<Value> {
        ds.iter().map(|r| r[0].clone()).collect()
    }

    #[test]
    fn full_slice_is_identity() {
        let ds = numbers(7);
        assert_eq!(slice(&ds, 0, 7).expect("valid bounds"), ds);
    }

    #[test]
    fn slice_clamps_out_of_range_bounds() {
        let ds = numbers(5);
        assert_eq!(slice(&ds, -3, 2).expect("clamped").len(), 2);
        assert_eq!(slice(&ds, 3, 100).expect("clamped").len(), 2);
        assert_eq!(slice(&ds, 9, 12).expect("clamped").len(), 0);
    }

    #[test]
    fn slice_rejects_reversed_bounds() {
        let err = slice(&numbers(5), 3, 2).unwrap_err();
        assert!(matches!(err, FrameError::Argument(_)));
    }

    #[test]
    fn slice_length_and_order() {
        let ds = numbers(10);
        for start in 0..=10isize {
            for end in start..=10 {
                let s = slice(&ds, start, end).expect("valid bounds");
                assert_eq!(s.len() as isize, end - start);
                let expected: Vec<Value> = (start..end).map(|i| Value::from(i as i64)).collect();
                assert_eq!(firsts(&s), expected);
            }
        }
    }

    #[test]
    fn top_and_bottom_take_floor_of_percent() {
        let ds = numbers(10);
        assert_eq!(firsts(&top(&ds, 0.25).expect("valid")), vals(&[0, 1]));
        assert_eq!(firsts(&bottom(&ds, 0.25).expect("valid")), vals(&[8, 9]));
        assert_eq!(top(&ds, 1.0).expect("valid"), ds);
        assert!(bottom(&ds, 0.0).expect("valid").is_empty());
        assert!(matches!(top(&ds, 1.5), Err(FrameError::Argument(_))));
        assert!(matches!(bottom(&ds, -0.1), Err(FrameError::Argument(_))));
        assert!(matches!(top(&ds, f64::NAN), Err(FrameError::Argument(_))));
    }

    #[test]
    fn head_and_tail_use_configured_lengths() {
        let ds = numbers(5);
        let conf = Conf {
            head_length: 2,
            tail_length: 3,
        };
        assert_eq!(firsts(&head(&ds, &conf)), vals(&[0, 1]));
        assert_eq!(firsts(&tail(&ds, &conf)), vals(&[2, 3, 4]));
        let short = numbers(1);
        assert_eq!(tail(&short, &conf), short);
        assert_eq!(head(&short, &conf), short);
    }

    #[test]
    fn partition_of_seven_rows() {
        let ds = numbers(7);
        assert_eq!(partition(&ds, 2, 4).expect("valid"), slice(&ds, 1, 2).expect("valid"));
        assert_eq!(partition(&ds, 4, 4).expect("valid"), slice(&ds, 3, 7).expect("valid"));
        assert!(matches!(partition(&ds, 0, 4), Err(FrameError::Argument(_))));
        assert!(matches!(partition(&ds, 5, 4), Err(FrameError::Argument(_))));
    }

    #[test]
    fn quartiles_and_quintiles() {
        let ds = numbers(10);
        let sizes: Vec<usize> = (1..=4).map(|n| quartile(&ds, n).expect("valid").len()).collect();
        assert_eq!(sizes, vec![2, 2, 2, 4]);
        let sizes: Vec<usize> = (1..=5).map(|n| quintile(&ds, n).expect("valid").len()).collect();
        assert_eq!(sizes, vec![2, 2, 2, 2, 2]);
        assert!(quartile(&ds, 5).is_err());
        assert!(quintile(&ds, 6).is_err());
    }

    #[test]
    fn partitions_cover_the_dataset() {
        for len in [0, 1, 3, 7, 10, 13] {
            let ds = numbers(len);
            for count in 1..6usize {
                let parts = partitions(&ds, count).expect("count > 0");
                if (len as usize) < count {
                    assert_eq!(parts, vec![ds.clone()]);
                } else {
                    assert_eq!(parts.len(), count);
                    let total: usize = parts.iter().map(Dataset::len).sum();
                    assert_eq!(total, ds.len());
                    let rejoined: Vec<Value> = parts.iter().flat_map(firsts).collect();
                    assert_eq!(rejoined, firsts(&ds));
                }
            }
        }
        assert!(matches!(partitions(&numbers(3), 0), Err(FrameError::Argument(_))));
    }
}
