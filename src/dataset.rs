//! The immutable, fully materialized table the clustering runs over.

use crate::attribute::{Attribute, AttributeKind, Value};
use crate::error::{KMeansError, Result};
use crate::tuple::Tuple;
use rand::Rng;
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

/// Rows plus the attribute schema shared by every row and centroid
#[derive(Debug, Clone)]
pub struct Dataset {
    attributes: Arc<[Attribute]>,
    rows: Vec<Vec<Value>>,
}

impl Dataset {
    /// Build a dataset, checking every row against the schema.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `rows` is empty (`EmptySet`)
    /// - the schema is empty or a row has the wrong width (`InvalidDimensions`)
    /// - an attribute's index differs from its column position, or a value has
    ///   the wrong variant or falls outside its attribute's range or domain (`InvalidData`)
    pub fn new(attributes: Vec<Attribute>, rows: Vec<Vec<Value>>) -> Result<Self> {
        if rows.is_empty() {
            return Err(KMeansError::EmptySet(
                "dataset must contain at least one row".to_string(),
            ));
        }
        if attributes.is_empty() {
            return Err(KMeansError::InvalidDimensions(
                "dataset must have at least one attribute".to_string(),
            ));
        }

        for (position, attribute) in attributes.iter().enumerate() {
            if attribute.index() != position {
                return Err(KMeansError::InvalidData(format!(
                    "attribute '{}' has index {} but sits at column {}",
                    attribute.name(),
                    attribute.index(),
                    position
                )));
            }
        }

        for (r, row) in rows.iter().enumerate() {
            if row.len() != attributes.len() {
                return Err(KMeansError::InvalidDimensions(format!(
                    "row {} has {} values, expected {}",
                    r,
                    row.len(),
                    attributes.len()
                )));
            }
            for (attribute, value) in attributes.iter().zip(row.iter()) {
                if !attribute.accepts(value) {
                    return Err(KMeansError::InvalidData(format!(
                        "value '{}' at row {} does not fit attribute '{}'",
                        value,
                        r,
                        attribute.name()
                    )));
                }
            }
        }

        Ok(Self {
            attributes: Arc::from(attributes),
            rows,
        })
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn attribute_count(&self) -> usize {
        self.attributes.len()
    }

    pub fn attributes(&self) -> &Arc<[Attribute]> {
        &self.attributes
    }

    pub fn attribute(&self, index: usize) -> &Attribute {
        &self.attributes[index]
    }

    pub fn value_at(&self, row: usize, col: usize) -> &Value {
        &self.rows[row][col]
    }

    pub fn row(&self, row: usize) -> &[Value] {
        &self.rows[row]
    }

    /// Materialize a fresh tuple holding a copy of the row's values
    pub fn tuple_at(&self, row: usize) -> Tuple {
        Tuple::from_parts(Arc::clone(&self.attributes), self.rows[row].clone())
    }

    /// Number of pairwise-distinct rows, counting no further than `limit`
    fn distinct_rows_up_to(&self, limit: usize) -> usize {
        let mut representatives: Vec<&[Value]> = Vec::with_capacity(limit);
        for row in &self.rows {
            if representatives.len() >= limit {
                break;
            }
            if !representatives.iter().any(|r| *r == row.as_slice()) {
                representatives.push(row);
            }
        }
        representatives.len()
    }

    /// Draw `k` row indices whose rows are pairwise distinct.
    ///
    /// Indices are drawn uniformly; a draw whose row equals an already chosen
    /// row is discarded and redrawn. The returned order is the draw order.
    ///
    /// # Errors
    ///
    /// `OutOfRangeSampleSize` if `k == 0`, `k > row_count()`, or fewer than `k`
    /// distinct rows exist.
    pub fn sample<R: Rng + ?Sized>(&self, k: usize, rng: &mut R) -> Result<Vec<usize>> {
        let n = self.row_count();
        if k == 0 || k > n {
            return Err(KMeansError::OutOfRangeSampleSize { k, max: n });
        }
        let distinct = self.distinct_rows_up_to(k);
        if distinct < k {
            return Err(KMeansError::OutOfRangeSampleSize { k, max: distinct });
        }

        let mut chosen: Vec<usize> = Vec::with_capacity(k);
        while chosen.len() < k {
            let candidate = rng.gen_range(0..n);
            let duplicate = chosen
                .iter()
                .any(|&c| self.rows[c] == self.rows[candidate]);
            if !duplicate {
                chosen.push(candidate);
            }
        }

        Ok(chosen)
    }

    /// Summary value of `attribute` over the rows in `ids`.
    ///
    /// Categorical attributes yield the most frequent domain value; among equally
    /// frequent values the lexicographically smallest wins. Continuous attributes
    /// yield the arithmetic mean. Returns `None` when `ids` is empty.
    pub fn compute_prototype(&self, ids: &BTreeSet<usize>, attribute: &Attribute) -> Option<Value> {
        if ids.is_empty() {
            return None;
        }

        match attribute.kind() {
            AttributeKind::Categorical { domain } => {
                let mut best: Option<&str> = None;
                let mut max = 0;
                for value in domain {
                    let count = attribute.frequency(self, ids, value);
                    if count > max {
                        max = count;
                        best = Some(value.as_str());
                    }
                }
                best.map(Value::from)
            }
            AttributeKind::Continuous { .. } => {
                let col = attribute.index();
                let sum: f64 = ids
                    .iter()
                    .filter_map(|&row| self.rows[row][col].as_number())
                    .sum();
                Some(Value::Number(sum / ids.len() as f64))
            }
        }
    }
}

/// Builds a [`Dataset`] from a header and raw string records, the shape every
/// tabular source produces.
///
/// Duplicate records are dropped (first occurrence kept), both as raw strings
/// on push and again on the typed rows in [`build`](Self::build), so `"30"`
/// and `"30.0"` in a continuous column name the same row. A column becomes
/// continuous when every cell parses as a finite number, with the observed
/// minimum and maximum as its range; otherwise it becomes categorical over the
/// observed distinct strings. Empty cells count as missing.
#[derive(Debug, Default)]
pub struct DatasetBuilder {
    header: Vec<String>,
    records: Vec<Vec<String>>,
    seen: HashSet<Vec<String>>,
}

impl DatasetBuilder {
    pub fn new<I, S>(header: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            header: header.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Append one record. Returns `false` if it duplicates an earlier record.
    pub fn push_record<I, S>(&mut self, record: I) -> Result<bool>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let record: Vec<String> = record
            .into_iter()
            .map(|s| s.into().trim().to_string())
            .collect();
        if record.len() != self.header.len() {
            return Err(KMeansError::InvalidDimensions(format!(
                "record {} has {} fields, expected {}",
                self.records.len(),
                record.len(),
                self.header.len()
            )));
        }
        if !self.seen.insert(record.clone()) {
            return Ok(false);
        }
        self.records.push(record);
        Ok(true)
    }

    /// Number of textually distinct records collected so far
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn build(self) -> Result<Dataset> {
        if self.header.is_empty() {
            return Err(KMeansError::InvalidDimensions(
                "header has no columns".to_string(),
            ));
        }
        if self.records.is_empty() {
            return Err(KMeansError::EmptySet("source returned no rows".to_string()));
        }

        let mut attributes = Vec::with_capacity(self.header.len());
        for (col, name) in self.header.iter().enumerate() {
            let cells: Vec<&str> = self
                .records
                .iter()
                .map(|r| r[col].as_str())
                .filter(|c| !c.is_empty())
                .collect();
            if cells.is_empty() {
                return Err(KMeansError::NoValue(format!(
                    "no value for column '{}'",
                    name
                )));
            }

            let numbers: Option<Vec<f64>> = cells
                .iter()
                .map(|c| c.parse::<f64>().ok().filter(|v| v.is_finite()))
                .collect();

            let attribute = match numbers {
                Some(numbers) => {
                    let min = numbers.iter().copied().fold(f64::INFINITY, f64::min);
                    let max = numbers.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                    Attribute::continuous(name.clone(), col, min, max)
                }
                None => Attribute::categorical(name.clone(), col, cells.iter().copied()),
            };
            attributes.push(attribute);
        }

        let mut rows = Vec::with_capacity(self.records.len());
        let mut seen = HashSet::with_capacity(self.records.len());
        for (r, record) in self.records.into_iter().enumerate() {
            let mut row = Vec::with_capacity(record.len());
            for (attribute, cell) in attributes.iter().zip(record) {
                if cell.is_empty() {
                    return Err(KMeansError::InvalidData(format!(
                        "missing value for column '{}' in record {}",
                        attribute.name(),
                        r
                    )));
                }
                let value = if attribute.is_continuous() {
                    Value::Number(cell.parse().map_err(|_| {
                        KMeansError::InvalidData(format!("'{}' is not a number", cell))
                    })?)
                } else {
                    Value::Text(cell)
                };
                row.push(value);
            }
            if seen.insert(row_key(&row)) {
                rows.push(row);
            }
        }

        Dataset::new(attributes, rows)
    }
}

/// Hashable identity of a typed cell
#[derive(Debug, PartialEq, Eq, Hash)]
enum CellKey {
    Number(u64),
    Text(String),
}

fn row_key(row: &[Value]) -> Vec<CellKey> {
    row.iter()
        .map(|value| match value {
            // Adding 0.0 folds -0.0 into 0.0
            Value::Number(v) => CellKey::Number((v + 0.0).to_bits()),
            Value::Text(s) => CellKey::Text(s.clone()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn weather() -> Dataset {
        Dataset::new(
            vec![
                Attribute::categorical("outlook", 0, ["sunny", "overcast", "rain"]),
                Attribute::continuous("temperature", 1, 0.0, 30.0),
            ],
            vec![
                vec!["sunny".into(), 30.0.into()],
                vec!["sunny".into(), 20.0.into()],
                vec!["overcast".into(), 10.0.into()],
                vec!["rain".into(), 0.0.into()],
                vec!["rain".into(), 5.0.into()],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_accessors() {
        let data = weather();
        assert_eq!(data.row_count(), 5);
        assert_eq!(data.attribute_count(), 2);
        assert_eq!(data.value_at(2, 0), &Value::from("overcast"));
        assert_eq!(data.tuple_at(3).values(), data.row(3));
    }

    #[test]
    fn test_empty_dataset_rejected() {
        let result = Dataset::new(vec![Attribute::continuous("x", 0, 0.0, 1.0)], vec![]);
        assert!(matches!(result, Err(KMeansError::EmptySet(_))));
    }

    #[test]
    fn test_row_width_checked() {
        let result = Dataset::new(
            vec![Attribute::continuous("x", 0, 0.0, 1.0)],
            vec![vec![0.5.into(), 0.5.into()]],
        );
        assert!(matches!(result, Err(KMeansError::InvalidDimensions(_))));
    }

    #[test]
    fn test_value_outside_range_rejected() {
        let result = Dataset::new(
            vec![Attribute::continuous("x", 0, 0.0, 1.0)],
            vec![vec![2.0.into()]],
        );
        assert!(matches!(result, Err(KMeansError::InvalidData(_))));
    }

    #[test]
    fn test_sample_returns_distinct_rows() {
        let data = Dataset::new(
            vec![Attribute::categorical("c", 0, ["A", "B", "C"])],
            vec![
                vec!["A".into()],
                vec!["A".into()],
                vec!["A".into()],
                vec!["B".into()],
                vec!["C".into()],
            ],
        )
        .unwrap();

        for seed in 0..20 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let sample = data.sample(3, &mut rng).unwrap();
            assert_eq!(sample.len(), 3);
            for i in 0..3 {
                for j in (i + 1)..3 {
                    assert_ne!(data.row(sample[i]), data.row(sample[j]));
                }
            }
        }
    }

    #[test]
    fn test_sample_out_of_range() {
        let data = weather();
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        assert!(matches!(
            data.sample(0, &mut rng),
            Err(KMeansError::OutOfRangeSampleSize { k: 0, max: 5 })
        ));
        assert!(matches!(
            data.sample(6, &mut rng),
            Err(KMeansError::OutOfRangeSampleSize { k: 6, .. })
        ));
    }

    #[test]
    fn test_sample_not_enough_distinct_rows() {
        let data = Dataset::new(
            vec![Attribute::categorical("c", 0, ["A"])],
            vec![vec!["A".into()], vec!["A".into()]],
        )
        .unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        assert!(matches!(
            data.sample(2, &mut rng),
            Err(KMeansError::OutOfRangeSampleSize { .. })
        ));
    }

    #[test]
    fn test_prototype_mean_and_mode() {
        let data = weather();
        let ids: BTreeSet<usize> = [0, 1, 2].into_iter().collect();

        assert_eq!(
            data.compute_prototype(&ids, data.attribute(0)),
            Some(Value::from("sunny"))
        );
        assert_eq!(
            data.compute_prototype(&ids, data.attribute(1)),
            Some(Value::Number(20.0))
        );
    }

    #[test]
    fn test_prototype_tie_picks_smallest_value() {
        let data = weather();
        // sunny, overcast, rain once each
        let ids: BTreeSet<usize> = [1, 2, 3].into_iter().collect();

        assert_eq!(
            data.compute_prototype(&ids, data.attribute(0)),
            Some(Value::from("overcast"))
        );
    }

    #[test]
    fn test_prototype_empty_ids() {
        let data = weather();
        assert_eq!(data.compute_prototype(&BTreeSet::new(), data.attribute(1)), None);
    }

    #[test]
    fn test_builder_infers_schema() {
        let mut builder = DatasetBuilder::new(["outlook", "temperature"]);
        assert!(builder.push_record(["sunny", "30"]).unwrap());
        assert!(builder.push_record(["rain", "12.5"]).unwrap());
        assert!(!builder.push_record(["sunny", "30"]).unwrap());
        assert_eq!(builder.len(), 2);

        let data = builder.build().unwrap();
        assert_eq!(data.row_count(), 2);
        assert!(!data.attribute(0).is_continuous());
        assert_eq!(
            data.attribute(1).kind(),
            &AttributeKind::Continuous {
                min: 12.5,
                max: 30.0
            }
        );
    }

    #[test]
    fn test_builder_dedups_typed_rows() {
        let mut builder = DatasetBuilder::new(["outlook", "temperature"]);
        assert!(builder.push_record(["sunny", "30"]).unwrap());
        assert!(builder.push_record(["sunny", "30.0"]).unwrap());
        assert!(builder.push_record(["rain", "12"]).unwrap());
        assert_eq!(builder.len(), 3);

        let data = builder.build().unwrap();
        assert_eq!(data.row_count(), 2);
        assert_eq!(data.row(0), &[Value::from("sunny"), Value::Number(30.0)][..]);
        assert_eq!(data.row(1), &[Value::from("rain"), Value::Number(12.0)][..]);
    }

    #[test]
    fn test_builder_keeps_textually_distinct_categories() {
        let mut builder = DatasetBuilder::new(["code"]);
        builder.push_record(["30"]).unwrap();
        builder.push_record(["30.0"]).unwrap();
        builder.push_record(["x"]).unwrap();

        let data = builder.build().unwrap();
        assert!(!data.attribute(0).is_continuous());
        assert_eq!(data.row_count(), 3);
    }

    #[test]
    fn test_builder_errors() {
        let empty = DatasetBuilder::new(["a"]).build();
        assert!(matches!(empty, Err(KMeansError::EmptySet(_))));

        let mut missing = DatasetBuilder::new(["a", "b"]);
        missing.push_record(["x", ""]).unwrap();
        assert!(matches!(missing.build(), Err(KMeansError::NoValue(_))));

        let mut wide = DatasetBuilder::new(["a"]);
        assert!(matches!(
            wide.push_record(["x", "y"]),
            Err(KMeansError::InvalidDimensions(_))
        ));
    }
}
