/// Data layer: the table model, plus readers/writers and row filtering.
///
/// Architecture:
/// ```text
///   Value / Datatype / NominalSet     a single typed cell
///        │
///        ▼
///   Column / ColumnSet                the schema
///        │
///        ▼
///   Vector                            one row, positional over a ColumnSet
///        │
///        ▼
///   Dataset                           schema + ordered rows (immutable)
///        ▲                 │
///        │                 ▼
///   ┌──────────┐      ┌──────────┐
///   │  loader   │      │  filter   │  keep rows whose cell is selected
///   └──────────┘      └──────────┘
///   .csv / .json
/// ```

pub mod column;
pub mod dataset;
pub mod filter;
pub mod loader;
pub mod value;
pub mod vector;
