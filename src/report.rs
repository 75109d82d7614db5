//! Plain-text reports: the payload handed back to whoever asked for a
//! clustering, a model summary, or a table dump.

use crate::cluster_set::ClusterSet;
use crate::dataset::Dataset;
use crate::distance::mixed_distance;
use std::fmt;

/// Compact summary: one `index: Centroid=(...)` line per cluster
impl fmt::Display for ClusterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, cluster) in self.iter().enumerate() {
            writeln!(f, "{}: {}", i, cluster)?;
        }
        Ok(())
    }
}

/// Header line of attribute names, then one 1-based numbered line per row
impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.attributes().iter().map(|a| a.name()).collect();
        writeln!(f, "{}", names.join(", "))?;

        for row in 0..self.row_count() {
            let values: Vec<String> = self.row(row).iter().map(ToString::to_string).collect();
            writeln!(f, "{}: {}", row + 1, values.join(", "))?;
        }
        Ok(())
    }
}

/// Compact report without access to the original data
pub fn render_summary(cluster_set: &ClusterSet) -> String {
    cluster_set.to_string()
}

/// Detailed view of a cluster set against the data it was fitted on
pub struct ClusterReport<'a> {
    cluster_set: &'a ClusterSet,
    dataset: &'a Dataset,
}

impl<'a> ClusterReport<'a> {
    pub fn new(cluster_set: &'a ClusterSet, dataset: &'a Dataset) -> Self {
        Self {
            cluster_set,
            dataset,
        }
    }
}

impl fmt::Display for ClusterReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, cluster) in self.cluster_set.iter().enumerate() {
            let centroid = cluster.centroid();
            writeln!(f, "{}: {}", i, cluster)?;
            writeln!(f, "Examples:")?;

            // A reloaded model may reference rows this dataset does not have
            for &row in cluster.members().range(..self.dataset.row_count()) {
                let values: Vec<String> =
                    self.dataset.row(row).iter().map(ToString::to_string).collect();
                let dist = mixed_distance(centroid.schema(), centroid.values(), self.dataset.row(row));
                writeln!(f, "[{}] dist={}", values.join(" "), dist)?;
            }

            match cluster.avg_distance(self.dataset) {
                Some(avg) => writeln!(f, "AvgDistance={}", avg)?,
                None => writeln!(f, "AvgDistance=n/a")?,
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Detailed report: per cluster the centroid, each member row with its distance
/// to the centroid, and the average distance.
pub fn render_clusters(cluster_set: &ClusterSet, dataset: &Dataset) -> String {
    ClusterReport::new(cluster_set, dataset).to_string()
}
