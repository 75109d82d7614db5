//! # mixed-kmeans-rs
//!
//! Lloyd's k-means for tabular data whose columns are a mix of continuous and
//! categorical attributes.
//!
//! ## Features
//!
//! - **Mixed distance**: continuous values are scaled to `[0, 1]` by the
//!   column's observed range, categorical values contribute 0 or 1; a row
//!   distance is the plain sum over columns
//! - **Exact Lloyd passes**: every pass assigns rows against the centroids fixed
//!   at its start, then recomputes centroids as per-column mean or mode
//! - **Distinct seeding**: initial centroids are sampled rows that differ in at
//!   least one column
//! - **Parallel assignment**: the nearest-centroid scan runs on rayon
//! - **Persistence**: fitted cluster sets encode to a compact binary buffer and
//!   can be stored in memory or on disk under an opaque key
//!
//! ## Example
//!
//! ```rust
//! use mixed_kmeans_rs::{render_clusters, DatasetBuilder, KMeansConfig, MixedKMeans};
//!
//! let mut builder = DatasetBuilder::new(["outlook", "temperature", "play"]);
//! for record in [
//!     ["sunny", "30", "no"],
//!     ["sunny", "27", "no"],
//!     ["overcast", "18", "yes"],
//!     ["rain", "12", "yes"],
//!     ["rain", "10", "yes"],
//! ] {
//!     builder.push_record(record).unwrap();
//! }
//! let data = builder.build().unwrap();
//!
//! let mut kmeans = MixedKMeans::with_config(KMeansConfig::new(2).with_seed(42));
//! let passes = kmeans.fit(&data).unwrap();
//!
//! let clusters = kmeans.cluster_set().unwrap();
//! assert_eq!(clusters.k(), 2);
//! println!("converged in {} passes\n{}", passes, render_clusters(clusters, &data));
//! ```
//!
//! ## Persistence
//!
//! ```rust
//! use mixed_kmeans_rs::{run_clustering, Attribute, Dataset, MemoryModelStore, ModelStore};
//!
//! let data = Dataset::new(
//!     vec![Attribute::categorical("letter", 0, ["A", "B"])],
//!     vec![vec!["A".into()], vec!["A".into()], vec!["B".into()], vec!["B".into()]],
//! )
//! .unwrap();
//!
//! let (_, clusters) = run_clustering(&data, 2).unwrap();
//!
//! let mut store = MemoryModelStore::new();
//! store.save(&clusters, "lettersletters2").unwrap();
//! assert_eq!(store.load("lettersletters2").unwrap(), clusters);
//! ```

mod algorithm;
mod attribute;
mod cluster;
mod cluster_set;
mod codec;
mod config;
mod dataset;
mod distance;
mod error;
mod kmeans;
mod report;
mod session;
mod source;
mod store;
mod tuple;

pub use algorithm::{kmeans_lloyd, ClusteringEngine, EngineState, KMeansResult, PassReport};
pub use attribute::{Attribute, AttributeKind, Value};
pub use cluster::Cluster;
pub use cluster_set::{ClusterSet, ClusterSetBuilder};
pub use codec::{decode_cluster_set, encode_cluster_set};
pub use config::KMeansConfig;
pub use dataset::{Dataset, DatasetBuilder};
pub use distance::mixed_distance;
pub use error::{KMeansError, Result};
pub use kmeans::{run_clustering, MixedKMeans};
pub use report::{render_clusters, render_summary, ClusterReport};
pub use session::{Request, Response, Session};
pub use source::{load_csv, CsvSource, DatasetSource, TableRef};
pub use store::{FileModelStore, MemoryModelStore, ModelStore};
pub use tuple::{Item, Tuple};
