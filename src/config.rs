use serde::{Deserialize, Serialize};

/// Configuration for the mixed k-means algorithm
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KMeansConfig {
    /// Number of clusters
    pub k: usize,

    /// Maximum number of passes. Lloyd's loop stops earlier as soon as a pass
    /// reassigns no row; hitting this cap leaves the model approximately converged.
    /// Must be at least 1.
    pub max_iters: usize,

    /// Random seed for centroid sampling. `None` draws the seed from OS entropy.
    pub seed: Option<u64>,

    /// Log every pass at `info` level instead of `debug`
    pub verbose: bool,
}

impl Default for KMeansConfig {
    fn default() -> Self {
        Self {
            k: 3,
            max_iters: 300,
            seed: None,
            verbose: false,
        }
    }
}

impl KMeansConfig {
    /// Create a new configuration with the specified number of clusters
    pub fn new(k: usize) -> Self {
        Self {
            k,
            ..Default::default()
        }
    }

    /// Set the maximum number of passes
    pub fn with_max_iters(mut self, max_iters: usize) -> Self {
        self.max_iters = max_iters;
        self
    }

    /// Set the random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set verbose mode
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_methods() {
        let config = KMeansConfig::new(4)
            .with_max_iters(10)
            .with_seed(7)
            .with_verbose(true);

        assert_eq!(config.k, 4);
        assert_eq!(config.max_iters, 10);
        assert_eq!(config.seed, Some(7));
        assert!(config.verbose);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: KMeansConfig = serde_json::from_str(r#"{"k": 5, "seed": 11}"#).unwrap();

        assert_eq!(config.k, 5);
        assert_eq!(config.seed, Some(11));
        assert_eq!(config.max_iters, KMeansConfig::default().max_iters);
        assert!(!config.verbose);
    }
}
