//! Parameter sweep grid
//!
//! A grid is an ordered list of named dimensions, each with an ordered list
//! of candidate values. Enumeration yields the full cartesian product in
//! nested order: the first dimension varies slowest.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Dimension name for the index granularity (n-gram length)
pub const NGRAM_SIZE: &str = "ngram_size";

/// Dimension name for the similarity threshold
pub const THRESHOLD: &str = "threshold";

/// A single parameter value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Integer(i64),
    Float(f64),
}

impl ParamValue {
    /// Integer view; floats are not truncated
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            ParamValue::Integer(v) => Some(v),
            ParamValue::Float(_) => None,
        }
    }

    /// Float view; integers are widened
    pub fn as_f64(&self) -> f64 {
        match *self {
            ParamValue::Integer(v) => v as f64,
            ParamValue::Float(v) => v,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Integer(v) => write!(f, "{}", v),
            ParamValue::Float(v) => write!(f, "{}", v),
        }
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Integer(v)
    }
}

impl From<usize> for ParamValue {
    fn from(v: usize) -> Self {
        ParamValue::Integer(v as i64)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

/// One concrete combination of sweep values, in dimension order
///
/// Serialized as a JSON object whose keys keep dimension order, so the same
/// point always produces the same bytes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridPoint {
    values: Vec<(String, ParamValue)>,
}

impl GridPoint {
    /// Create a point from `(name, value)` pairs
    pub fn new(values: Vec<(String, ParamValue)>) -> Self {
        Self { values }
    }

    /// Look up a value by dimension name
    pub fn get(&self, name: &str) -> Option<ParamValue> {
        self.values
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }

    /// Iterate over `(name, value)` pairs in dimension order
    pub fn iter(&self) -> impl Iterator<Item = (&str, ParamValue)> {
        self.values.iter().map(|(n, v)| (n.as_str(), *v))
    }

    /// Number of dimensions in this point
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True for the point of a zero-dimensional grid
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Keep only the named dimensions, preserving order
    pub fn project(&self, names: &[&str]) -> GridPoint {
        GridPoint::new(
            self.values
                .iter()
                .filter(|(n, _)| names.contains(&n.as_str()))
                .cloned()
                .collect(),
        )
    }
}

impl fmt::Display for GridPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", name, value)?;
        }
        Ok(())
    }
}

impl Serialize for GridPoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in &self.values {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

struct GridPointVisitor;

impl<'de> Visitor<'de> for GridPointVisitor {
    type Value = GridPoint;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of parameter name to numeric value")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<GridPoint, A::Error> {
        let mut values = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((name, value)) = access.next_entry::<String, ParamValue>()? {
            values.push((name, value));
        }
        Ok(GridPoint::new(values))
    }
}

impl<'de> Deserialize<'de> for GridPoint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<GridPoint, D::Error> {
        deserializer.deserialize_map(GridPointVisitor)
    }
}

/// A named sweep dimension with its candidate values
#[derive(Debug, Clone, PartialEq)]
pub struct Dimension {
    pub name: String,
    pub values: Vec<ParamValue>,
}

/// Cartesian product of sweep dimensions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterGrid {
    dimensions: Vec<Dimension>,
}

impl ParameterGrid {
    /// Create an empty grid (one point with no parameters)
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a dimension; later dimensions vary faster
    pub fn with_dimension<V, I>(mut self, name: &str, values: I) -> Self
    where
        V: Into<ParamValue>,
        I: IntoIterator<Item = V>,
    {
        self.dimensions.push(Dimension {
            name: name.to_string(),
            values: values.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Dimensions in nesting order
    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    /// Number of points the grid enumerates
    pub fn len(&self) -> usize {
        self.dimensions.iter().map(|d| d.values.len()).product()
    }

    /// True when some dimension has no candidates
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Enumerate every point in nested order
    pub fn points(&self) -> Vec<GridPoint> {
        let mut points: Vec<Vec<(String, ParamValue)>> = vec![Vec::new()];

        for dim in &self.dimensions {
            let mut next = Vec::with_capacity(points.len() * dim.values.len());
            for prefix in &points {
                for value in &dim.values {
                    let mut point = prefix.clone();
                    point.push((dim.name.clone(), *value));
                    next.push(point);
                }
            }
            points = next;
        }

        points.into_iter().map(GridPoint::new).collect()
    }
}
