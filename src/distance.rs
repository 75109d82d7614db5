use crate::attribute::{Attribute, Value};
use crate::dataset::Dataset;
use crate::tuple::Tuple;
use rayon::prelude::*;

/// Mixed L1 distance between two value rows over a shared schema.
///
/// Each attribute contributes a value in `[0, 1]` (scaled absolute difference
/// for continuous attributes, mismatch indicator for categorical ones), so the
/// result lies in `[0, schema.len()]`.
#[inline]
pub fn mixed_distance(schema: &[Attribute], a: &[Value], b: &[Value]) -> f64 {
    schema
        .iter()
        .zip(a.iter().zip(b.iter()))
        .map(|(attribute, (x, y))| attribute.distance(x, y))
        .sum()
}

/// Index of the centroid nearest to `row`.
///
/// Scans left to right and only moves on strict improvement, so the lowest
/// index wins an exact tie. `centroids` must not be empty.
#[inline]
pub fn nearest_centroid<'a, I>(schema: &[Attribute], row: &[Value], centroids: I) -> usize
where
    I: IntoIterator<Item = &'a Tuple>,
{
    let mut best_idx = 0;
    let mut best_dist = f64::INFINITY;

    for (idx, centroid) in centroids.into_iter().enumerate() {
        let dist = mixed_distance(schema, row, centroid.values());
        if dist < best_dist {
            best_dist = dist;
            best_idx = idx;
        }
    }

    best_idx
}

/// Nearest centroid for every row of `dataset`, in row order.
///
/// Centroids are read-only for the whole scan, so rows are processed in
/// parallel.
pub fn find_nearest_centroids(dataset: &Dataset, centroids: &[&Tuple]) -> Vec<usize> {
    let schema = dataset.attributes();

    (0..dataset.row_count())
        .into_par_iter()
        .map(|row| nearest_centroid(schema, dataset.row(row), centroids.iter().copied()))
        .collect()
}

/// Serial variant of [`find_nearest_centroids`] for small inputs
#[allow(dead_code)]
pub fn find_nearest_centroids_serial(dataset: &Dataset, centroids: &[&Tuple]) -> Vec<usize> {
    let schema = dataset.attributes();

    (0..dataset.row_count())
        .map(|row| nearest_centroid(schema, dataset.row(row), centroids.iter().copied()))
        .collect()
}
