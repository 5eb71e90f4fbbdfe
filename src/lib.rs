//! In-memory tabular data: typed columns and rows, with indexing, joins,
//! pivots and slicing over immutable datasets.
//!
//! ```
//! use rusty_frames::{ColumnSet, Dataset, Datatype, Value, pivot, vector};
//!
//! let long = Dataset::new(
//!     ColumnSet::of(&[
//!         ("country", Datatype::String),
//!         ("gdp", Datatype::Numeric),
//!         ("year", Datatype::Numeric),
//!     ])?,
//!     vec![vector!["us", 100, 2000], vector!["uk", 200, 2000]],
//! )?;
//! let wide = pivot(&long, "year", "country", "gdp")?;
//! assert_eq!(wide.value(0, "uk")?, &Value::from(200));
//! # Ok::<(), rusty_frames::FrameError>(())
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod transform;

pub use config::Conf;
pub use data::column::{Column, ColumnSet, Format, Parser};
pub use data::dataset::Dataset;
pub use data::value::{Datatype, Nominal, NominalSet, NominalValue, Value};
pub use data::vector::Vector;
pub use error::{FrameError, Result};
pub use transform::index::{IndexedDataset, RowSet, VectorKey, index};
pub use transform::join::{Join, JoinKind, join, join_indexed};
pub use transform::pivot::{merge, pivot};
pub use transform::slice::{
    bottom, head, partition, partitions, quartile, quintile, slice, tail, top,
};
