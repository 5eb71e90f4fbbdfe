use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use super::value::{Datatype, NominalSet, Value};
use crate::error::{FrameError, Result};

// ---------------------------------------------------------------------------
// Presentation hooks
// ---------------------------------------------------------------------------

/// Renders a cell as text. Only affects presentation, never data.
pub trait Format: fmt::Debug + Send + Sync {
    fn format(&self, value: &Value) -> String;
}

/// Turns raw text into a cell for one column.
pub trait Parser: fmt::Debug + Send + Sync {
    fn parse(&self, raw: &str) -> Result<Value>;
}

#[derive(Debug, Default)]
struct Hooks {
    format: Option<Arc<dyn Format>>,
    parser: Option<Arc<dyn Parser>>,
}

// ---------------------------------------------------------------------------
// Column
// ---------------------------------------------------------------------------

/// Metadata of one column: position, name, datatype and optional nominal domain.
///
/// Copies made with [`Column::copy`] share the presentation hooks of the
/// column they came from.
#[derive(Debug, Clone)]
pub struct Column {
    index: usize,
    name: String,
    datatype: Datatype,
    nominals: Option<Arc<NominalSet>>,
    hooks: Arc<RwLock<Hooks>>,
}

impl Column {
    pub fn new(index: usize, name: impl Into<String>, datatype: Datatype) -> Self {
        Self {
            index,
            name: name.into(),
            datatype,
            nominals: None,
            hooks: Arc::default(),
        }
    }

    /// A `Nominal` column whose cells come from `nominals`.
    pub fn nominal(index: usize, name: impl Into<String>, nominals: Arc<NominalSet>) -> Self {
        Self {
            nominals: Some(nominals),
            ..Self::new(index, name, Datatype::Nominal)
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn datatype(&self) -> Datatype {
        self.datatype
    }

    pub fn nominals(&self) -> Option<&Arc<NominalSet>> {
        self.nominals.as_ref()
    }

    /// The same column bound to a new position.
    pub fn copy(&self, new_index: usize) -> Self {
        Self {
            index: new_index,
            ..self.clone()
        }
    }

    /// The same column under another name, bound to `new_index`.
    pub fn renamed(&self, new_index: usize, name: impl Into<String>) -> Self {
        Self {
            index: new_index,
            name: name.into(),
            ..self.clone()
        }
    }

    /// A copy bound to `new_index` whose nominal domain also covers the
    /// categories of `other`. Either side lacking a domain leaves the copy
    /// unconstrained.
    pub fn widened(&self, new_index: usize, other: &Column) -> Self {
        let nominals = match (&self.nominals, &other.nominals) {
            (Some(a), Some(b))
                if Arc::ptr_eq(a, b) || b.iter().all(|n| a.by_name(&n.name).is_ok()) =>
            {
                Some(Arc::clone(a))
            }
            (Some(a), Some(b)) => Some(Arc::new(a.union(b))),
            _ => None,
        };
        Self {
            index: new_index,
            nominals,
            ..self.clone()
        }
    }

    pub fn format(&self) -> Option<Arc<dyn Format>> {
        self.hooks.read().unwrap_or_else(PoisonError::into_inner).format.clone()
    }

    pub fn set_format(&self, format: Arc<dyn Format>) {
        self.hooks.write().unwrap_or_else(PoisonError::into_inner).format = Some(format);
    }

    pub fn parser(&self) -> Option<Arc<dyn Parser>> {
        self.hooks.read().unwrap_or_else(PoisonError::into_inner).parser.clone()
    }

    pub fn set_parser(&self, parser: Arc<dyn Parser>) {
        self.hooks.write().unwrap_or_else(PoisonError::into_inner).parser = Some(parser);
    }

    /// Render a cell through the format hook, or `Display` without one.
    pub fn format_value(&self, value: &Value) -> String {
        match self.format() {
            Some(f) => f.format(value),
            None => value.to_string(),
        }
    }

    /// Parse raw text through the parser hook, or by datatype without one.
    /// Blank input is `Missing`.
    pub fn parse_value(&self, raw: &str) -> Result<Value> {
        if let Some(p) = self.parser() {
            return p.parse(raw);
        }
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(Value::Missing);
        }
        match self.datatype {
            Datatype::Numeric => raw.parse::<f64>().map(Value::Numeric).map_err(|_| {
                FrameError::TypeMismatch {
                    expected: Datatype::Numeric,
                    found: format!("{raw:?} in column {}", self.name),
                }
            }),
            Datatype::String => Ok(Value::Text(raw.to_string())),
            Datatype::Nominal => match &self.nominals {
                Some(set) => set.value(raw),
                None => Err(FrameError::Schema(format!(
                    "nominal column {} has no nominal set",
                    self.name
                ))),
            },
        }
    }
}

/// Structural equality; presentation hooks are ignored.
impl PartialEq for Column {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
            && self.name == other.name
            && self.datatype == other.datatype
            && self.nominals == other.nominals
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.datatype)
    }
}

// ---------------------------------------------------------------------------
// ColumnSet – an ordered, name-unique schema
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct ColumnSet {
    columns: Vec<Column>,
    by_name: HashMap<String, usize>,
}

impl ColumnSet {
    /// Binds every column to its position in `columns`.
    ///
    /// Fails with [`FrameError::DuplicateColumn`] if two columns share a name.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let mut by_name = HashMap::with_capacity(columns.len());
        let mut bound = Vec::with_capacity(columns.len());
        for (i, col) in columns.into_iter().enumerate() {
            if by_name.insert(col.name.clone(), i).is_some() {
                return Err(FrameError::DuplicateColumn(col.name));
            }
            bound.push(if col.index == i { col } else { col.copy(i) });
        }
        Ok(Self {
            columns: bound,
            by_name,
        })
    }

    /// Shorthand: `ColumnSet::of(&[("country", Datatype::String), ("gdp", Datatype::Numeric)])`.
    pub fn of(spec: &[(&str, Datatype)]) -> Result<Self> {
        Self::new(
            spec.iter()
                .enumerate()
                .map(|(i, (name, dt))| Column::new(i, *name, *dt))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    pub fn by_name(&self, name: &str) -> Result<&Column> {
        self.position(name).map(|i| &self.columns[i])
    }

    pub fn position(&self, name: &str) -> Result<usize> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| FrameError::UnknownColumn(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Column> {
        self.columns.iter()
    }

    /// Only the named columns, in this set's order (not the order of `names`).
    pub fn includes<S: AsRef<str>>(&self, names: &[S]) -> Result<ColumnSet> {
        let wanted = self.check_names(names)?;
        Self::new(
            self.columns
                .iter()
                .filter(|c| wanted.contains(c.name.as_str()))
                .cloned()
                .collect(),
        )
    }

    /// Every column except the named ones, in this set's order.
    pub fn excludes<S: AsRef<str>>(&self, names: &[S]) -> Result<ColumnSet> {
        let unwanted = self.check_names(names)?;
        Self::new(
            self.columns
                .iter()
                .filter(|c| !unwanted.contains(c.name.as_str()))
                .cloned()
                .collect(),
        )
    }

    fn check_names<'a, S: AsRef<str>>(&self, names: &'a [S]) -> Result<HashSet<&'a str>> {
        names
            .iter()
            .map(|n| {
                let n = n.as_ref();
                if self.contains(n) {
                    Ok(n)
                } else {
                    Err(FrameError::UnknownColumn(n.to_string()))
                }
            })
            .collect()
    }
}

impl PartialEq for ColumnSet {
    fn eq(&self, other: &Self) -> bool {
        self.columns == other.columns
    }
}

impl<'a> IntoIterator for &'a ColumnSet {
    type Item = &'a Column;
    type IntoIter = std::slice::Iter<'a, Column>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Percent;

    impl Format for Percent {
        fn format(&self, value: &Value) -> String {
            match value.as_f64() {
                Some(v) => format!("{:.0}%", v * 100.0),
                None => value.to_string(),
            }
        }
    }

    fn schema() -> ColumnSet {
        ColumnSet::of(&[
            ("country", Datatype::String),
            ("gdp", Datatype::Numeric),
            ("year", Datatype::Numeric),
        ])
        .expect("valid schema")
    }

    #[test]
    fn widened_copies_cover_both_domains() {
        use crate::data::value::Nominal;

        let set = |names: &[&str]| {
            Arc::new(
                NominalSet::new(
                    names.iter().zip(0..).map(|(n, c)| Nominal::new(*n, c)).collect(),
                )
                .expect("valid set"),
            )
        };
        let ab = Column::nominal(0, "k", set(&["a", "b"]));
        let a = Column::nominal(3, "k", set(&["a"]));

        let same = ab.widened(1, &a);
        assert_eq!(same.index(), 1);
        assert!(Arc::ptr_eq(same.nominals().expect("domain"), ab.nominals().expect("domain")));

        let grown = a.widened(0, &ab);
        let domain = grown.nominals().expect("domain");
        assert_eq!(domain.len(), 2);
        assert_eq!(domain.by_name("b").expect("b").code, 1);

        let open = a.widened(0, &Column::new(0, "k", Datatype::Nominal));
        assert!(open.nominals().is_none());
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let err = ColumnSet::of(&[("a", Datatype::String), ("a", Datatype::Numeric)]).unwrap_err();
        assert!(matches!(err, FrameError::DuplicateColumn(name) if name == "a"));
    }

    #[test]
    fn new_rebinds_indices_to_positions() {
        let cols = ColumnSet::new(vec![
            Column::new(7, "x", Datatype::Numeric),
            Column::new(3, "y", Datatype::Numeric),
        ])
        .expect("valid");
        let indices: Vec<usize> = cols.iter().map(Column::index).collect();
        assert_eq!(indices, vec![0, 1]);
    }

    #[test]
    fn includes_keeps_schema_order() {
        let cols = schema();
        let sub = cols.includes(&["year", "country"]).expect("known names");
        let names: Vec<&str> = sub.names().collect();
        assert_eq!(names, vec!["country", "year"]);
        assert_eq!(sub.by_name("year").expect("year").index(), 1);
    }

    #[test]
    fn excludes_and_unknown_names() {
        let cols = schema();
        let rest = cols.excludes(&["gdp"]).expect("known name");
        assert_eq!(rest.names().collect::<Vec<_>>(), vec!["country", "year"]);
        assert!(matches!(cols.includes(&["nope"]), Err(FrameError::UnknownColumn(_))));
        assert!(matches!(cols.position("nope"), Err(FrameError::UnknownColumn(_))));
    }

    #[test]
    fn copies_share_presentation_hooks() {
        let cols = schema();
        let gdp = cols.by_name("gdp").expect("gdp");
        let moved = gdp.copy(5);
        assert_eq!(moved.index(), 5);
        moved.set_format(Arc::new(Percent));
        assert_eq!(gdp.format_value(&Value::from(0.5)), "50%");
        assert_eq!(moved, gdp.copy(5));
    }

    #[test]
    fn default_parsing_follows_datatype() {
        let cols = schema();
        let gdp = cols.by_name("gdp").expect("gdp");
        assert_eq!(gdp.parse_value(" 12.5 ").expect("number"), Value::from(12.5));
        assert_eq!(gdp.parse_value("").expect("blank"), Value::Missing);
        assert!(matches!(gdp.parse_value("abc"), Err(FrameError::TypeMismatch { .. })));
    }
}
