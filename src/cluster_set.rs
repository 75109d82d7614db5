use crate::attribute::Attribute;
use crate::cluster::Cluster;
use crate::dataset::Dataset;
use crate::distance::nearest_centroid;
use crate::error::{KMeansError, Result};
use crate::tuple::Tuple;
use rand::Rng;
use std::sync::Arc;

/// Collects exactly `k` clusters before producing a [`ClusterSet`]
#[derive(Debug)]
pub struct ClusterSetBuilder {
    capacity: usize,
    clusters: Vec<Cluster>,
}

impl ClusterSetBuilder {
    /// # Errors
    ///
    /// `OutOfRangeSampleSize` if `k == 0`.
    pub fn with_capacity(k: usize) -> Result<Self> {
        if k == 0 {
            return Err(KMeansError::OutOfRangeSampleSize { k, max: 0 });
        }
        Ok(Self {
            capacity: k,
            clusters: Vec::with_capacity(k),
        })
    }

    /// Append a cluster; fails once `k` clusters were already added
    pub fn push(&mut self, cluster: Cluster) -> Result<()> {
        if self.clusters.len() >= self.capacity {
            return Err(KMeansError::InvalidK(format!(
                "cluster set is full ({} clusters)",
                self.capacity
            )));
        }
        if let Some(first) = self.clusters.first() {
            if first.centroid().schema() != cluster.centroid().schema() {
                return Err(KMeansError::InvalidDimensions(
                    "all centroids must share one attribute schema".to_string(),
                ));
            }
        }
        self.clusters.push(cluster);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.clusters.len() == self.capacity
    }

    pub fn build(self) -> Result<ClusterSet> {
        if !self.is_full() {
            return Err(KMeansError::InvalidK(format!(
                "expected {} clusters, got {}",
                self.capacity,
                self.clusters.len()
            )));
        }
        Ok(ClusterSet {
            clusters: self.clusters,
        })
    }
}

/// A fixed-size, ordered collection of `k` clusters sharing one schema
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterSet {
    clusters: Vec<Cluster>,
}

impl ClusterSet {
    /// Sample `k` distinct rows of `dataset` and make each the centroid of a new,
    /// empty cluster, in sample order.
    ///
    /// # Errors
    ///
    /// `OutOfRangeSampleSize` propagated from [`Dataset::sample`].
    pub fn initialize<R: Rng + ?Sized>(dataset: &Dataset, k: usize, rng: &mut R) -> Result<Self> {
        let indices = dataset.sample(k, rng)?;
        Self::from_rows(dataset, &indices)
    }

    /// Build a set whose centroids are copies of the given rows
    pub fn from_rows(dataset: &Dataset, rows: &[usize]) -> Result<Self> {
        let mut builder = ClusterSetBuilder::with_capacity(rows.len())?;
        for &row in rows {
            if row >= dataset.row_count() {
                return Err(KMeansError::OutOfRangeSampleSize {
                    k: row,
                    max: dataset.row_count(),
                });
            }
            builder.push(Cluster::new(dataset.tuple_at(row)))?;
        }
        builder.build()
    }

    /// Number of clusters
    pub fn k(&self) -> usize {
        self.clusters.len()
    }

    pub fn get(&self, index: usize) -> &Cluster {
        &self.clusters[index]
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> &mut Cluster {
        &mut self.clusters[index]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cluster> {
        self.clusters.iter()
    }

    /// The attribute schema shared by all centroids
    pub fn schema(&self) -> &Arc<[Attribute]> {
        self.clusters[0].centroid().schema()
    }

    pub fn centroids(&self) -> Vec<&Tuple> {
        self.clusters.iter().map(Cluster::centroid).collect()
    }

    /// Index of the cluster whose centroid is nearest to `tuple`; ties go to the
    /// lowest index
    pub fn nearest_cluster(&self, tuple: &Tuple) -> usize {
        nearest_centroid(
            tuple.schema(),
            tuple.values(),
            self.clusters.iter().map(Cluster::centroid),
        )
    }

    /// Index of the cluster that currently holds row `id`, if any
    pub fn current_cluster(&self, id: usize) -> Option<usize> {
        self.clusters.iter().position(|c| c.contains(id))
    }

    /// Recompute every centroid from its current members
    pub fn update_centroids(&mut self, dataset: &Dataset) {
        for cluster in &mut self.clusters {
            cluster.compute_centroid(dataset);
        }
    }
}

impl<'a> IntoIterator for &'a ClusterSet {
    type Item = &'a Cluster;
    type IntoIter = std::slice::Iter<'a, Cluster>;

    fn into_iter(self) -> Self::IntoIter {
        self.clusters.iter()
    }
}
