use crate::attribute::{Attribute, Value};
use crate::dataset::Dataset;
use crate::distance::mixed_distance;
use crate::error::{KMeansError, Result};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// A value bound to the attribute that gives it meaning
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Item<'a> {
    attribute: &'a Attribute,
    value: &'a Value,
}

impl<'a> Item<'a> {
    pub fn new(attribute: &'a Attribute, value: &'a Value) -> Self {
        Self { attribute, value }
    }

    pub fn attribute(&self) -> &'a Attribute {
        self.attribute
    }

    pub fn value(&self) -> &'a Value {
        self.value
    }

    /// Distance between this item's value and `other` under the item's attribute
    pub fn distance(&self, other: &Value) -> f64 {
        self.attribute.distance(self.value, other)
    }
}

impl fmt::Display for Item<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.value.fmt(f)
    }
}

/// An ordered vector of values, one per attribute: a data row or a centroid
#[derive(Debug, Clone, PartialEq)]
pub struct Tuple {
    schema: Arc<[Attribute]>,
    values: Vec<Value>,
}

impl Tuple {
    /// Bind `values` to `schema`. The lengths must agree.
    pub fn new(schema: Arc<[Attribute]>, values: Vec<Value>) -> Result<Self> {
        if values.len() != schema.len() {
            return Err(KMeansError::InvalidDimensions(format!(
                "Expected {} values, got {}",
                schema.len(),
                values.len()
            )));
        }
        Ok(Self { schema, values })
    }

    /// Bind without the length check; callers guarantee `values.len() == schema.len()`
    pub(crate) fn from_parts(schema: Arc<[Attribute]>, values: Vec<Value>) -> Self {
        Self { schema, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn schema(&self) -> &Arc<[Attribute]> {
        &self.schema
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn value(&self, index: usize) -> &Value {
        &self.values[index]
    }

    pub fn item(&self, index: usize) -> Item<'_> {
        Item::new(&self.schema[index], &self.values[index])
    }

    pub fn items(&self) -> impl Iterator<Item = Item<'_>> {
        self.schema
            .iter()
            .zip(self.values.iter())
            .map(|(attribute, value)| Item::new(attribute, value))
    }

    pub(crate) fn set_value(&mut self, index: usize, value: Value) {
        self.values[index] = value;
    }

    /// Sum of per-attribute distances to `other`, in `[0, len()]`
    pub fn distance(&self, other: &Tuple) -> f64 {
        mixed_distance(&self.schema, &self.values, &other.values)
    }

    /// Mean distance from this tuple to the given rows of `dataset`.
    /// Ids past the end of `dataset` are ignored; returns `None` when no id is left.
    pub fn avg_distance(&self, dataset: &Dataset, ids: &BTreeSet<usize>) -> Option<f64> {
        let rows = ids.range(..dataset.row_count());
        let count = rows.clone().count();
        if count == 0 {
            return None;
        }
        let total: f64 = rows
            .map(|&row| mixed_distance(&self.schema, &self.values, dataset.row(row)))
            .sum();
        Some(total / count as f64)
    }
}

impl fmt::Display for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, item) in self.items().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", item)?;
        }
        Ok(())
    }
}
