use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{FrameError, Result};

// ---------------------------------------------------------------------------
// Datatype – the declared type of a column
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Datatype {
    Numeric,
    String,
    Nominal,
}

impl Datatype {
    /// Whether a value may be stored in a column of this type.
    /// `Missing` fits every column.
    pub fn accepts(self, value: &Value) -> bool {
        match value.datatype() {
            None => true,
            Some(dt) => dt == self,
        }
    }
}

impl fmt::Display for Datatype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Datatype::Numeric => write!(f, "NUMERIC"),
            Datatype::String => write!(f, "STRING"),
            Datatype::Nominal => write!(f, "NOMINAL"),
        }
    }
}

// ---------------------------------------------------------------------------
// Nominal / NominalSet – categorical name <-> code mapping
// ---------------------------------------------------------------------------

/// One category: a name and its integer code.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Nominal {
    pub name: String,
    pub code: u32,
}

impl Nominal {
    pub fn new(name: impl Into<String>, code: u32) -> Self {
        Self {
            name: name.into(),
            code,
        }
    }
}

/// An immutable, bidirectional name/code mapping.
///
/// Names are unique and codes are unique. Lookups that miss fail with
/// [`FrameError::NominalNotFound`].
#[derive(Debug, Clone)]
pub struct NominalSet {
    nominals: Vec<Nominal>,
    by_name: HashMap<String, usize>,
    by_code: HashMap<u32, usize>,
}

impl NominalSet {
    /// Build from explicit `(name, code)` pairs.
    pub fn new(nominals: Vec<Nominal>) -> Result<Self> {
        let mut by_name = HashMap::with_capacity(nominals.len());
        let mut by_code = HashMap::with_capacity(nominals.len());
        for (i, n) in nominals.iter().enumerate() {
            if by_name.insert(n.name.clone(), i).is_some() {
                return Err(FrameError::Argument(format!(
                    "nominal name {:?} appears more than once",
                    n.name
                )));
            }
            if by_code.insert(n.code, i).is_some() {
                return Err(FrameError::Argument(format!(
                    "nominal code {} appears more than once",
                    n.code
                )));
            }
        }
        Ok(Self {
            nominals,
            by_name,
            by_code,
        })
    }

    /// Build from raw values: each distinct textual form becomes a category,
    /// coded `0, 1, 2, ...` in first-seen order.
    pub fn from_values<'a>(values: impl IntoIterator<Item = &'a Value>) -> Self {
        let mut nominals = Vec::new();
        let mut by_name = HashMap::new();
        let mut by_code = HashMap::new();
        for v in values {
            let name = v.to_string();
            if by_name.contains_key(&name) {
                continue;
            }
            let i = nominals.len();
            by_name.insert(name.clone(), i);
            by_code.insert(i as u32, i);
            nominals.push(Nominal::new(name, i as u32));
        }
        Self {
            nominals,
            by_name,
            by_code,
        }
    }

    pub fn by_name(&self, name: &str) -> Result<&Nominal> {
        self.by_name
            .get(name)
            .map(|&i| &self.nominals[i])
            .ok_or_else(|| {
                let mut known: Vec<&str> = self.nominals.iter().map(|n| n.name.as_str()).collect();
                known.sort_unstable();
                FrameError::NominalNotFound(format!("no nominal named {name:?}; known: {known:?}"))
            })
    }

    pub fn by_code(&self, code: u32) -> Result<&Nominal> {
        self.by_code
            .get(&code)
            .map(|&i| &self.nominals[i])
            .ok_or_else(|| FrameError::NominalNotFound(format!("no nominal with code {code}")))
    }

    /// The categories of `self`, then those of `other` whose name `self`
    /// lacks. Existing codes are kept; added categories get fresh codes
    /// above the current maximum.
    pub fn union(&self, other: &NominalSet) -> NominalSet {
        let mut nominals = self.nominals.clone();
        let mut next = nominals.iter().map(|n| n.code.saturating_add(1)).max().unwrap_or(0);
        for n in other.iter().filter(|n| !self.by_name.contains_key(&n.name)) {
            nominals.push(Nominal::new(n.name.clone(), next));
            next += 1;
        }
        let by_name = nominals.iter().enumerate().map(|(i, n)| (n.name.clone(), i)).collect();
        let by_code = nominals.iter().enumerate().map(|(i, n)| (n.code, i)).collect();
        NominalSet {
            nominals,
            by_name,
            by_code,
        }
    }

    pub fn contains_code(&self, code: u32) -> bool {
        self.by_code.contains_key(&code)
    }

    /// Categories in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Nominal> {
        self.nominals.iter()
    }

    pub fn len(&self) -> usize {
        self.nominals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nominals.is_empty()
    }

    /// Build a nominal [`Value`] for the category called `name`.
    pub fn value(self: &Arc<Self>, name: &str) -> Result<Value> {
        let slot = *self.by_name.get(name).ok_or_else(|| {
            FrameError::NominalNotFound(format!("no nominal named {name:?}"))
        })?;
        Ok(Value::Nominal(NominalValue {
            slot,
            set: Arc::clone(self),
        }))
    }

    /// Build a nominal [`Value`] for the category coded `code`.
    pub fn value_of_code(self: &Arc<Self>, code: u32) -> Result<Value> {
        let slot = *self
            .by_code
            .get(&code)
            .ok_or_else(|| FrameError::NominalNotFound(format!("no nominal with code {code}")))?;
        Ok(Value::Nominal(NominalValue {
            slot,
            set: Arc::clone(self),
        }))
    }
}

/// Two sets are equal when they map the same names to the same codes,
/// whatever order they were declared in.
impl PartialEq for NominalSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self.nominals.iter().all(|n| {
                other
                    .by_name
                    .get(&n.name)
                    .is_some_and(|&i| other.nominals[i].code == n.code)
            })
    }
}

impl Eq for NominalSet {}

/// A categorical cell: a reference into a [`NominalSet`].
///
/// Only constructible through [`NominalSet::value`] / [`NominalSet::value_of_code`],
/// so the referenced category always exists.
#[derive(Debug, Clone)]
pub struct NominalValue {
    slot: usize,
    set: Arc<NominalSet>,
}

impl NominalValue {
    pub fn name(&self) -> &str {
        &self.set.nominals[self.slot].name
    }

    pub fn code(&self) -> u32 {
        self.set.nominals[self.slot].code
    }

    pub fn set(&self) -> &Arc<NominalSet> {
        &self.set
    }
}

// ---------------------------------------------------------------------------
// Value – a single cell
// ---------------------------------------------------------------------------

/// A tagged scalar cell.
#[derive(Debug, Clone)]
pub enum Value {
    Numeric(f64),
    Text(String),
    Nominal(NominalValue),
    Missing,
}

impl Value {
    /// The tag's datatype; `None` for `Missing`.
    pub fn datatype(&self) -> Option<Datatype> {
        match self {
            Value::Numeric(_) => Some(Datatype::Numeric),
            Value::Text(_) => Some(Datatype::String),
            Value::Nominal(_) => Some(Datatype::Nominal),
            Value::Missing => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Numeric(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            Value::Nominal(n) => Some(n.name()),
            _ => None,
        }
    }

    /// The same cell expressed in `domain`: a nominal from another set is
    /// looked up there by name. Anything else, or a `None` domain, is a
    /// plain clone.
    pub fn rebind(&self, domain: Option<&Arc<NominalSet>>) -> Result<Value> {
        match (self, domain) {
            (Value::Nominal(n), Some(d)) if !Arc::ptr_eq(&n.set, d) => d.value(n.name()),
            _ => Ok(self.clone()),
        }
    }

    /// Checked comparison: values of different tags cannot be ordered,
    /// except `Missing`, which sorts before everything.
    ///
    /// Agrees with [`Ord`] on same-tag values. Nominals order by name, never
    /// by code, so two domains listing the same categories in a different
    /// order sort their cells the same way.
    pub fn try_cmp(&self, other: &Value) -> Result<Ordering> {
        match (self, other) {
            (Value::Missing, Value::Missing) => Ok(Ordering::Equal),
            (Value::Missing, _) => Ok(Ordering::Less),
            (_, Value::Missing) => Ok(Ordering::Greater),
            (Value::Numeric(a), Value::Numeric(b)) => Ok(canonical(*a).total_cmp(&canonical(*b))),
            (Value::Text(a), Value::Text(b)) => Ok(a.cmp(b)),
            (Value::Nominal(a), Value::Nominal(b)) => Ok(a.name().cmp(b.name())),
            (a, b) => Err(FrameError::TypeMismatch {
                // both sides are non-missing here
                expected: a.datatype().unwrap_or(Datatype::String),
                found: b.type_name().to_string(),
            }),
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            Value::Numeric(_) => "NUMERIC",
            Value::Text(_) => "STRING",
            Value::Nominal(_) => "NOMINAL",
            Value::Missing => "MISSING",
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Missing => 0,
            Value::Numeric(_) => 1,
            Value::Text(_) => 2,
            Value::Nominal(_) => 3,
        }
    }
}

/// Folds `-0.0` into `0.0` and every NaN into one NaN, so equality, hashing
/// and ordering agree.
fn canonical(v: f64) -> f64 {
    if v == 0.0 {
        0.0
    } else if v.is_nan() {
        f64::NAN
    } else {
        v
    }
}

// -- Manual Eq/Ord/Hash so Values can key hash maps and ordered sets --

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Missing, Value::Missing) => true,
            (Value::Numeric(a), Value::Numeric(b)) => canonical(*a).to_bits() == canonical(*b).to_bits(),
            (Value::Text(a), Value::Text(b)) => a == b,
            // across domains, categories match by name, never by code
            (Value::Nominal(a), Value::Nominal(b)) => a.name() == b.name(),
            _ => false,
        }
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        let (ra, rb) = (self.rank(), other.rank());
        if ra != rb {
            return ra.cmp(&rb);
        }
        match (self, other) {
            (Value::Numeric(a), Value::Numeric(b)) => canonical(*a).total_cmp(&canonical(*b)),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (Value::Nominal(a), Value::Nominal(b)) => a.name().cmp(b.name()),
            _ => Ordering::Equal,
        }
    }
}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            Value::Numeric(v) => canonical(*v).to_bits().hash(state),
            Value::Text(s) => s.hash(state),
            Value::Nominal(n) => n.name().hash(state),
            Value::Missing => {}
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Numeric(v) => write!(f, "{v}"),
            Value::Text(s) => write!(f, "{s}"),
            Value::Nominal(n) => write!(f, "{}", n.name()),
            Value::Missing => write!(f, "<missing>"),
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Numeric(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Numeric(f64::from(v))
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Numeric(f64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Numeric(v as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Missing, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn colors() -> Arc<NominalSet> {
        Arc::new(
            NominalSet::new(vec![Nominal::new("red", 0), Nominal::new("green", 1)])
                .expect("valid set"),
        )
    }

    #[test]
    fn nominal_set_rejects_duplicates() {
        let err = NominalSet::new(vec![Nominal::new("a", 0), Nominal::new("a", 1)]).unwrap_err();
        assert!(matches!(err, FrameError::Argument(_)));
        let err = NominalSet::new(vec![Nominal::new("a", 0), Nominal::new("b", 0)]).unwrap_err();
        assert!(matches!(err, FrameError::Argument(_)));
    }

    #[test]
    fn nominal_lookup_misses_are_not_found() {
        let set = colors();
        assert_eq!(set.by_name("green").expect("present").code, 1);
        assert_eq!(set.by_code(0).expect("present").name, "red");
        assert!(matches!(set.by_name("blue"), Err(FrameError::NominalNotFound(_))));
        assert!(matches!(set.by_code(7), Err(FrameError::NominalNotFound(_))));
        assert!(matches!(set.value("blue"), Err(FrameError::NominalNotFound(_))));
    }

    #[test]
    fn from_values_codes_by_first_seen_order() {
        let raw: Vec<Value> = vec!["b".into(), "a".into(), "b".into(), "c".into()];
        let set = NominalSet::from_values(&raw);
        assert_eq!(set.len(), 3);
        assert_eq!(set.by_name("b").expect("b").code, 0);
        assert_eq!(set.by_name("a").expect("a").code, 1);
        assert_eq!(set.by_name("c").expect("c").code, 2);
    }

    #[test]
    fn nominals_from_reordered_domains_compare_by_name() {
        let a = colors();
        let b = Arc::new(
            NominalSet::new(vec![Nominal::new("green", 0), Nominal::new("red", 1)])
                .expect("valid set"),
        );
        let red_a = a.value("red").expect("red");
        let red_b = b.value("red").expect("red");
        // code 0 is "red" in one domain and "green" in the other
        assert_ne!(red_a.clone(), b.value_of_code(0).expect("code 0"));
        assert_eq!(red_a, red_b);
        let keys: HashSet<Value> = [red_a, red_b].into_iter().collect();
        assert_eq!(keys.len(), 1);
    }

    #[test]
    fn union_keeps_codes_and_appends_new_names() {
        let a = colors();
        let b = NominalSet::new(vec![Nominal::new("blue", 0), Nominal::new("red", 1)])
            .expect("valid set");
        let u = a.union(&b);
        assert_eq!(u.len(), 3);
        assert_eq!(u.by_name("red").expect("red").code, 0);
        assert_eq!(u.by_name("green").expect("green").code, 1);
        assert_eq!(u.by_name("blue").expect("blue").code, 2);
        assert_eq!(a.union(&a), *a);
    }

    #[test]
    fn rebind_moves_a_nominal_into_another_domain_by_name() {
        let a = colors();
        let b = Arc::new(
            NominalSet::new(vec![Nominal::new("green", 0), Nominal::new("red", 1)])
                .expect("valid set"),
        );
        let red = a.value("red").expect("red").rebind(Some(&b)).expect("red in b");
        match &red {
            Value::Nominal(n) => {
                assert!(Arc::ptr_eq(n.set(), &b));
                assert_eq!(n.code(), 1);
            }
            other => panic!("expected a nominal, got {other:?}"),
        }
        let only_red = Arc::new(NominalSet::new(vec![Nominal::new("red", 0)]).expect("valid set"));
        assert!(matches!(
            a.value("green").expect("green").rebind(Some(&only_red)),
            Err(FrameError::NominalNotFound(_))
        ));
        assert_eq!(Value::from(3).rebind(Some(&b)).expect("numeric"), Value::from(3));
    }

    #[test]
    fn nominal_order_is_by_name_for_both_comparisons() {
        let set = colors();
        let (red, green) = (set.value("red").expect("red"), set.value("green").expect("green"));
        // red has the lower code but sorts after green
        assert_eq!(red.cmp(&green), Ordering::Greater);
        assert_eq!(red.try_cmp(&green).expect("same tag"), Ordering::Greater);
    }

    #[test]
    fn numeric_equality_is_total() {
        assert_eq!(Value::from(0.0), Value::from(-0.0));
        assert_eq!(Value::from(f64::NAN), Value::from(f64::NAN));
        assert_ne!(Value::from(1), Value::from("1"));
    }

    #[test]
    fn cross_tag_comparison_is_a_type_error() {
        let err = Value::from(1).try_cmp(&Value::from("x")).unwrap_err();
        assert!(matches!(err, FrameError::TypeMismatch { expected: Datatype::Numeric, .. }));
        assert_eq!(
            Value::Missing.try_cmp(&Value::from(3)).expect("missing sorts first"),
            Ordering::Less
        );
        assert_eq!(
            Value::from(2).try_cmp(&Value::from(10)).expect("same tag"),
            Ordering::Less
        );
    }

    #[test]
    fn numbers_display_without_trailing_fraction() {
        assert_eq!(Value::from(2000).to_string(), "2000");
        assert_eq!(Value::from(1.5).to_string(), "1.5");
    }
}
