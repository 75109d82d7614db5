use crate::cluster_set::ClusterSet;
use crate::config::KMeansConfig;
use crate::dataset::Dataset;
use crate::distance::find_nearest_centroids;
use crate::error::{KMeansError, Result};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Lifecycle of a [`ClusteringEngine`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Centroids are seeded, no pass has run yet
    Initialized,
    /// At least one pass ran and the last one reassigned rows
    Iterating,
    /// The last pass reassigned no row
    Converged,
    /// The pass cap was reached before convergence
    Exhausted,
}

/// Outcome of a single assignment/update pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassReport {
    /// 1-based pass number
    pub pass: usize,
    /// Rows that joined a cluster they were not a member of
    pub reassigned: usize,
}

/// Result of the k-means algorithm
#[derive(Debug, Clone)]
pub struct KMeansResult {
    pub cluster_set: ClusterSet,
    /// Passes executed, including the final pass that confirmed convergence
    pub n_iterations: usize,
    pub converged: bool,
}

/// Drives Lloyd's assign/update loop for one dataset and one cluster set
pub struct ClusteringEngine<'a> {
    dataset: &'a Dataset,
    clusters: ClusterSet,
    state: EngineState,
    passes: usize,
    verbose: bool,
}

impl<'a> ClusteringEngine<'a> {
    /// Wrap an initialized cluster set.
    ///
    /// # Errors
    ///
    /// `InvalidDimensions` if the centroids' schema differs from the dataset's.
    pub fn new(dataset: &'a Dataset, clusters: ClusterSet) -> Result<Self> {
        if clusters.schema() != dataset.attributes() {
            return Err(KMeansError::InvalidDimensions(format!(
                "cluster set has {} attributes, dataset schema differs ({} attributes)",
                clusters.schema().len(),
                dataset.attribute_count()
            )));
        }
        Ok(Self {
            dataset,
            clusters,
            state: EngineState::Initialized,
            passes: 0,
            verbose: false,
        })
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Passes executed so far
    pub fn passes(&self) -> usize {
        self.passes
    }

    pub fn cluster_set(&self) -> &ClusterSet {
        &self.clusters
    }

    pub fn into_cluster_set(self) -> ClusterSet {
        self.clusters
    }

    /// Run one pass: assign every row to its nearest centroid, then recompute
    /// all centroids.
    ///
    /// Nearest clusters are chosen against the centroids as they stand when the
    /// pass starts. Membership changes are applied in ascending row order; a row
    /// that moves is removed from its previous cluster.
    pub fn step(&mut self) -> PassReport {
        let nearest = find_nearest_centroids(self.dataset, &self.clusters.centroids());

        let mut reassigned = 0;
        for (row, &target) in nearest.iter().enumerate() {
            let previous = self.clusters.current_cluster(row);
            let changed = self.clusters.get_mut(target).add_data(row);
            if changed {
                reassigned += 1;
                if let Some(previous) = previous.filter(|&p| p != target) {
                    self.clusters.get_mut(previous).remove_tuple(row);
                }
            }
        }

        self.clusters.update_centroids(self.dataset);
        self.passes += 1;
        self.state = if reassigned == 0 {
            EngineState::Converged
        } else {
            EngineState::Iterating
        };

        PassReport {
            pass: self.passes,
            reassigned,
        }
    }

    /// Repeat passes until one reassigns no row or `max_iters` passes ran.
    ///
    /// At least one pass always runs. Returns the number of passes executed.
    pub fn run(&mut self, max_iters: usize) -> usize {
        let max_iters = max_iters.max(1);
        while self.state != EngineState::Converged {
            if self.passes >= max_iters {
                self.state = EngineState::Exhausted;
                warn!(
                    "Stopped after {} passes without convergence; centroids are approximate",
                    self.passes
                );
                break;
            }

            let pass_start = Instant::now();
            let report = self.step();
            let elapsed = pass_start.elapsed().as_secs_f64();

            if self.verbose {
                info!(
                    "Pass {}/{}: reassigned = {}, time = {:.4}s",
                    report.pass, max_iters, report.reassigned, elapsed
                );
            } else {
                debug!(
                    "Pass {}/{}: reassigned = {}, time = {:.4}s",
                    report.pass, max_iters, report.reassigned, elapsed
                );
            }
        }

        if self.state == EngineState::Converged {
            info!("Converged after {} passes", self.passes);
        }

        self.passes
    }
}

/// Run Lloyd's k-means over a mixed-attribute dataset
///
/// Seeds `config.k` centroids from distinct sampled rows, then iterates until a
/// pass reassigns no row or `config.max_iters` passes ran.
///
/// # Errors
///
/// - `OutOfRangeSampleSize` if `k` is zero or exceeds the distinct rows
/// - `InvalidConfig` if `max_iters` is zero
pub fn kmeans_lloyd(dataset: &Dataset, config: &KMeansConfig) -> Result<KMeansResult> {
    let k = config.k;

    if k == 0 {
        return Err(KMeansError::OutOfRangeSampleSize {
            k,
            max: dataset.row_count(),
        });
    }

    if config.max_iters == 0 {
        return Err(KMeansError::InvalidConfig(
            "max_iters must allow at least one pass".to_string(),
        ));
    }

    let mut rng = match config.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };

    info!(
        "Training k-means: {} rows, {} attributes, {} clusters",
        dataset.row_count(),
        dataset.attribute_count(),
        k
    );

    let clusters = ClusterSet::initialize(dataset, k, &mut rng)?;
    let mut engine = ClusteringEngine::new(dataset, clusters)?.with_verbose(config.verbose);
    let n_iterations = engine.run(config.max_iters);
    let converged = engine.state() == EngineState::Converged;

    Ok(KMeansResult {
        cluster_set: engine.into_cluster_set(),
        n_iterations,
        converged,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::{Attribute, Value};

    fn letters() -> Dataset {
        Dataset::new(
            vec![Attribute::categorical("letter", 0, ["A", "B"])],
            vec![
                vec!["A".into()],
                vec!["A".into()],
                vec!["B".into()],
                vec!["B".into()],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_single_pass_settles_letters() {
        let data = letters();
        let clusters = ClusterSet::from_rows(&data, &[0, 2]).unwrap();
        let mut engine = ClusteringEngine::new(&data, clusters).unwrap();
        assert_eq!(engine.state(), EngineState::Initialized);

        let first = engine.step();
        assert_eq!(first.reassigned, 4);
        assert_eq!(engine.state(), EngineState::Iterating);

        let set = engine.cluster_set();
        assert_eq!(set.get(0).members().iter().copied().collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(set.get(1).members().iter().copied().collect::<Vec<_>>(), vec![2, 3]);
        assert_eq!(set.get(0).centroid().value(0), &Value::from("A"));
        assert_eq!(set.get(1).centroid().value(0), &Value::from("B"));

        let second = engine.step();
        assert_eq!(second.reassigned, 0);
        assert_eq!(engine.state(), EngineState::Converged);
    }

    #[test]
    fn test_run_counts_confirming_pass() {
        let data = letters();
        let clusters = ClusterSet::from_rows(&data, &[0, 2]).unwrap();
        let mut engine = ClusteringEngine::new(&data, clusters).unwrap();

        assert_eq!(engine.run(100), 2);
        assert_eq!(engine.state(), EngineState::Converged);
    }

    #[test]
    fn test_run_respects_cap() {
        let data = letters();
        let clusters = ClusterSet::from_rows(&data, &[0, 2]).unwrap();
        let mut engine = ClusteringEngine::new(&data, clusters).unwrap();

        assert_eq!(engine.run(1), 1);
        assert_eq!(engine.state(), EngineState::Exhausted);
    }

    #[test]
    fn test_run_zero_cap_still_assigns() {
        let data = letters();
        let clusters = ClusterSet::from_rows(&data, &[0, 2]).unwrap();
        let mut engine = ClusteringEngine::new(&data, clusters).unwrap();

        assert_eq!(engine.run(0), 1);
        let assigned: usize = engine.cluster_set().iter().map(|c| c.len()).sum();
        assert_eq!(assigned, data.row_count());
    }

    #[test]
    fn test_kmeans_lloyd_rejects_zero_max_iters() {
        let config = KMeansConfig::new(2).with_seed(1).with_max_iters(0);

        assert!(matches!(
            kmeans_lloyd(&letters(), &config),
            Err(KMeansError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_moving_row_leaves_previous_cluster() {
        let data = Dataset::new(
            vec![Attribute::continuous("x", 0, 0.0, 30.0)],
            vec![
                vec![0.0.into()],
                vec![4.0.into()],
                vec![5.0.into()],
                vec![30.0.into()],
            ],
        )
        .unwrap();
        // Seeds at 0 and 5: pass 1 groups {0} and {4, 5, 30}; the second
        // centroid then moves to 13 and pass 2 pulls 4 and 5 back.
        let clusters = ClusterSet::from_rows(&data, &[0, 2]).unwrap();
        let mut engine = ClusteringEngine::new(&data, clusters).unwrap();

        engine.step();
        assert_eq!(engine.cluster_set().current_cluster(1), Some(1));
        assert_eq!(engine.cluster_set().get(1).centroid().value(0), &Value::Number(13.0));

        let second = engine.step();
        assert_eq!(second.reassigned, 2);
        assert_eq!(engine.cluster_set().current_cluster(1), Some(0));
        assert!(!engine.cluster_set().get(1).contains(1));
        assert!(!engine.cluster_set().get(1).contains(2));

        let total: usize = engine.cluster_set().iter().map(|c| c.len()).sum();
        assert_eq!(total, data.row_count());

        assert_eq!(engine.step().reassigned, 0);
    }

    #[test]
    fn test_schema_mismatch_rejected() {
        let data = letters();
        let other = Dataset::new(
            vec![Attribute::continuous("x", 0, 0.0, 1.0)],
            vec![vec![0.5.into()]],
        )
        .unwrap();
        let clusters = ClusterSet::from_rows(&other, &[0]).unwrap();

        assert!(matches!(
            ClusteringEngine::new(&data, clusters),
            Err(KMeansError::InvalidDimensions(_))
        ));
    }

    #[test]
    fn test_kmeans_lloyd_seeded() {
        let data = letters();
        let config = KMeansConfig::new(2).with_seed(42);

        let result = kmeans_lloyd(&data, &config).unwrap();

        assert!(result.converged);
        assert_eq!(result.cluster_set.k(), 2);
        assert!(result.n_iterations >= 2);
    }

    #[test]
    fn test_kmeans_lloyd_k_zero() {
        let data = letters();
        let result = kmeans_lloyd(&data, &KMeansConfig::new(0));
        assert!(matches!(
            result,
            Err(KMeansError::OutOfRangeSampleSize { k: 0, .. })
        ));
    }
}
