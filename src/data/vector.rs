use std::cmp::Ordering;
use std::fmt;
use std::ops::Index;
use std::sync::Arc;

use super::value::{Datatype, Value};
use crate::error::{FrameError, Result};

// ---------------------------------------------------------------------------
// Vector – one row
// ---------------------------------------------------------------------------

/// An immutable row of values, aligned by position to a `ColumnSet`.
///
/// Cloning is a reference-count bump; transforms hand the same row to
/// several datasets without copying its values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Vector {
    values: Arc<[Value]>,
}

impl Vector {
    pub fn new(values: Vec<Value>) -> Self {
        Self {
            values: values.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.values.iter()
    }

    /// Whether `self` and `other` are the very same row allocation.
    pub fn shares_storage(&self, other: &Vector) -> bool {
        Arc::ptr_eq(&self.values, &other.values)
    }

    /// The values at `positions`, in that order.
    pub fn select(&self, positions: &[usize]) -> Result<Vector> {
        positions
            .iter()
            .map(|&p| {
                self.values.get(p).cloned().ok_or(FrameError::Argument(format!(
                    "position {p} out of range for a vector of length {}",
                    self.len()
                )))
            })
            .collect::<Result<Vec<_>>>()
            .map(Vector::new)
    }

    /// Elementwise sum. `Missing` on either side yields `Missing`.
    pub fn sum(&self, other: &Vector) -> Result<Vector> {
        self.check_len(other)?;
        self.values
            .iter()
            .zip(other.values.iter())
            .map(|(a, b)| match (a, b) {
                (Value::Missing, _) | (_, Value::Missing) => Ok(Value::Missing),
                _ => Ok(Value::Numeric(numeric(a)? + numeric(b)?)),
            })
            .collect::<Result<Vec<_>>>()
            .map(Vector::new)
    }

    /// Dot product. A `Missing` cell makes the result NaN.
    pub fn product(&self, other: &Vector) -> Result<f64> {
        self.check_len(other)?;
        let mut total = 0.0;
        for (a, b) in self.values.iter().zip(other.values.iter()) {
            if a.is_missing() || b.is_missing() {
                total += f64::NAN;
                continue;
            }
            total += numeric(a)? * numeric(b)?;
        }
        Ok(total)
    }

    /// A new vector holding the same values, sorted by `compare`.
    pub fn sorted_by<F>(&self, mut compare: F) -> Vector
    where
        F: FnMut(&Value, &Value) -> Ordering,
    {
        let mut values = self.values.to_vec();
        values.sort_by(|a, b| compare(a, b));
        Vector::new(values)
    }

    fn check_len(&self, other: &Vector) -> Result<()> {
        if self.len() != other.len() {
            return Err(FrameError::LengthMismatch {
                left: self.len(),
                right: other.len(),
            });
        }
        Ok(())
    }
}

fn numeric(v: &Value) -> Result<f64> {
    v.as_f64().ok_or_else(|| FrameError::TypeMismatch {
        expected: Datatype::Numeric,
        found: v.to_string(),
    })
}

impl Index<usize> for Vector {
    type Output = Value;

    fn index(&self, index: usize) -> &Value {
        &self.values[index]
    }
}

impl From<Vec<Value>> for Vector {
    fn from(values: Vec<Value>) -> Self {
        Vector::new(values)
    }
}

impl FromIterator<Value> for Vector {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Vector::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Vector {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, v) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{v}")?;
        }
        write!(f, "]")
    }
}

/// Build a [`Vector`] from anything convertible into [`Value`]:
/// `vector![ "us", 100, 2000 ]`.
#[macro_export]
macro_rules! vector {
    ($($v:expr),* $(,)?) => {
        $crate::data::vector::Vector::new(vec![$($crate::data::value::Value::from($v)),*])
    };
}
