use crate::algorithm::kmeans_lloyd;
use crate::cluster_set::ClusterSet;
use crate::config::KMeansConfig;
use crate::dataset::Dataset;
use crate::distance::find_nearest_centroids;
use crate::error::{KMeansError, Result};

/// K-means over mixed continuous/categorical data.
///
/// Wraps the clustering engine behind a scikit-learn flavoured `fit()` /
/// `predict()` interface and keeps the fitted [`ClusterSet`] so it can be
/// rendered or persisted.
///
/// # Example
///
/// ```
/// use mixed_kmeans_rs::{Attribute, Dataset, KMeansConfig, MixedKMeans};
///
/// let data = Dataset::new(
///     vec![
///         Attribute::categorical("outlook", 0, ["sunny", "rain"]),
///         Attribute::continuous("temperature", 1, 0.0, 30.0),
///     ],
///     vec![
///         vec!["sunny".into(), 30.0.into()],
///         vec!["sunny".into(), 28.0.into()],
///         vec!["rain".into(), 2.0.into()],
///         vec!["rain".into(), 0.0.into()],
///     ],
/// )
/// .unwrap();
///
/// let mut kmeans = MixedKMeans::with_config(KMeansConfig::new(2).with_seed(7));
/// let passes = kmeans.fit(&data).unwrap();
/// assert!(passes >= 2);
///
/// let labels = kmeans.predict(&data).unwrap();
/// assert_eq!(labels[0], labels[1]);
/// assert_eq!(labels[2], labels[3]);
/// assert_ne!(labels[0], labels[2]);
/// ```
#[derive(Debug, Clone)]
pub struct MixedKMeans {
    config: KMeansConfig,
    cluster_set: Option<ClusterSet>,
    n_iterations: usize,
    converged: bool,
}

impl MixedKMeans {
    /// Create a new instance with the default configuration and `k` clusters.
    ///
    /// `k` is checked against the dataset when [`fit`](Self::fit) runs.
    pub fn new(k: usize) -> Self {
        Self::with_config(KMeansConfig::new(k))
    }

    pub fn with_config(config: KMeansConfig) -> Self {
        Self {
            config,
            cluster_set: None,
            n_iterations: 0,
            converged: false,
        }
    }

    /// Wrap a previously computed (e.g. reloaded) cluster set
    pub fn from_cluster_set(cluster_set: ClusterSet) -> Self {
        Self {
            config: KMeansConfig::new(cluster_set.k()),
            cluster_set: Some(cluster_set),
            n_iterations: 0,
            converged: false,
        }
    }

    /// Cluster `dataset` and keep the result.
    ///
    /// Returns the number of passes executed.
    ///
    /// # Errors
    ///
    /// `OutOfRangeSampleSize` if `k` is zero or exceeds the distinct rows available,
    /// `InvalidConfig` if `max_iters` is zero.
    /// A failed fit leaves any previously fitted model in place.
    pub fn fit(&mut self, dataset: &Dataset) -> Result<usize> {
        let result = kmeans_lloyd(dataset, &self.config)?;

        self.cluster_set = Some(result.cluster_set);
        self.n_iterations = result.n_iterations;
        self.converged = result.converged;
        Ok(result.n_iterations)
    }

    /// Nearest cluster index for every row of `dataset`.
    ///
    /// # Errors
    ///
    /// - `NotFitted` if no model is available
    /// - `InvalidDimensions` if the dataset's schema differs from the model's
    pub fn predict(&self, dataset: &Dataset) -> Result<Vec<usize>> {
        let cluster_set = self.cluster_set.as_ref().ok_or(KMeansError::NotFitted)?;

        if cluster_set.schema() != dataset.attributes() {
            return Err(KMeansError::InvalidDimensions(format!(
                "model schema has {} attributes, dataset schema differs ({} attributes)",
                cluster_set.schema().len(),
                dataset.attribute_count()
            )));
        }

        Ok(find_nearest_centroids(dataset, &cluster_set.centroids()))
    }

    pub fn cluster_set(&self) -> Option<&ClusterSet> {
        self.cluster_set.as_ref()
    }

    pub fn into_cluster_set(self) -> Option<ClusterSet> {
        self.cluster_set
    }

    pub fn k(&self) -> usize {
        self.config.k
    }

    /// Passes executed by the last fit, 0 for a reloaded model
    pub fn n_iterations(&self) -> usize {
        self.n_iterations
    }

    /// Whether the last fit reached a fixed point before the pass cap
    pub fn converged(&self) -> bool {
        self.converged
    }

    pub fn config(&self) -> &KMeansConfig {
        &self.config
    }
}

/// Cluster `dataset` into `k` groups with the default configuration.
///
/// Returns the number of passes executed and the converged cluster set.
pub fn run_clustering(dataset: &Dataset, k: usize) -> Result<(usize, ClusterSet)> {
    let result = kmeans_lloyd(dataset, &KMeansConfig::new(k))?;
    Ok((result.n_iterations, result.cluster_set))
}
