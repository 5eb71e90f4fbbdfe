//! Structural transforms over [`Dataset`](crate::data::dataset::Dataset)s.
//!
//! None of them mutates its input: each returns a new dataset with its own
//! schema that may share rows with the source.

pub mod index;
pub mod join;
pub mod pivot;
pub mod slice;
