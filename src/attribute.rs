//! Column descriptions and the per-value distance rules.
//!
//! An [`Attribute`] is either continuous, described by the observed `[min, max]`
//! range, or categorical, described by its finite domain of distinct strings.
//! Both kinds map the distance between two values into `[0, 1]` so that a row
//! distance is simply the sum over attributes.

use crate::dataset::Dataset;
use std::collections::BTreeSet;
use std::fmt;

/// A single cell value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Text(String),
}

impl Value {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(v) => Some(*v),
            Value::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Number(_) => None,
            Value::Text(s) => Some(s),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(v) => write!(f, "{}", v),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(v)
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

/// The two supported attribute kinds
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeKind {
    /// Numeric column with its observed range
    Continuous { min: f64, max: f64 },

    /// Symbolic column with its distinct values, kept in lexicographic order
    Categorical { domain: BTreeSet<String> },
}

/// Description of one column of a [`Dataset`]
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    name: String,
    index: usize,
    kind: AttributeKind,
}

impl Attribute {
    /// Create a continuous attribute spanning `[min, max]`
    pub fn continuous(name: impl Into<String>, index: usize, min: f64, max: f64) -> Self {
        Self {
            name: name.into(),
            index,
            kind: AttributeKind::Continuous { min, max },
        }
    }

    /// Create a categorical attribute over the given domain values
    pub fn categorical<I, S>(name: impl Into<String>, index: usize, domain: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            index,
            kind: AttributeKind::Categorical {
                domain: domain.into_iter().map(Into::into).collect(),
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column position of this attribute
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn kind(&self) -> &AttributeKind {
        &self.kind
    }

    pub fn is_continuous(&self) -> bool {
        matches!(self.kind, AttributeKind::Continuous { .. })
    }

    /// Map a raw value of a continuous attribute into `[0, 1]`.
    ///
    /// A constant column (`max == min`) scales every value to 0, so it never
    /// contributes to a distance. Returns `None` for categorical attributes.
    pub fn scale(&self, v: f64) -> Option<f64> {
        match self.kind {
            AttributeKind::Continuous { min, max } => {
                let range = max - min;
                if range > 0.0 {
                    Some((v - min) / range)
                } else {
                    Some(0.0)
                }
            }
            AttributeKind::Categorical { .. } => None,
        }
    }

    /// Iterate over the categorical domain in lexicographic order.
    /// Returns `None` for continuous attributes.
    pub fn domain(&self) -> Option<impl Iterator<Item = &str>> {
        match &self.kind {
            AttributeKind::Categorical { domain } => Some(domain.iter().map(String::as_str)),
            AttributeKind::Continuous { .. } => None,
        }
    }

    /// Whether `value` has the right variant and lies in the attribute's range or domain
    pub fn accepts(&self, value: &Value) -> bool {
        match (&self.kind, value) {
            (AttributeKind::Continuous { min, max }, Value::Number(v)) => *v >= *min && *v <= *max,
            (AttributeKind::Categorical { domain }, Value::Text(s)) => domain.contains(s),
            _ => false,
        }
    }

    /// Distance between two values of this attribute, in `[0, 1]`.
    ///
    /// Continuous values are compared after scaling; categorical values are 0
    /// when equal and 1 otherwise. A value of the wrong variant counts as
    /// maximally distant.
    pub fn distance(&self, a: &Value, b: &Value) -> f64 {
        match (&self.kind, a, b) {
            (AttributeKind::Continuous { .. }, Value::Number(x), Value::Number(y)) => {
                match (self.scale(*x), self.scale(*y)) {
                    (Some(sx), Some(sy)) => (sx - sy).abs(),
                    _ => 1.0,
                }
            }
            (AttributeKind::Categorical { .. }, Value::Text(x), Value::Text(y)) => {
                if x == y {
                    0.0
                } else {
                    1.0
                }
            }
            _ => 1.0,
        }
    }

    /// Number of rows among `ids` whose value for this attribute equals `value`
    pub fn frequency(&self, dataset: &Dataset, ids: &BTreeSet<usize>, value: &str) -> usize {
        ids.iter()
            .filter(|&&row| dataset.value_at(row, self.index).as_text() == Some(value))
            .count()
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
