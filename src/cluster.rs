use crate::dataset::Dataset;
use crate::tuple::Tuple;
use std::collections::BTreeSet;
use std::fmt;
use tracing::warn;

/// A centroid plus the row indices currently assigned to it
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    centroid: Tuple,
    members: BTreeSet<usize>,
}

impl Cluster {
    /// Create a cluster with the given centroid and no members
    pub fn new(centroid: Tuple) -> Self {
        Self {
            centroid,
            members: BTreeSet::new(),
        }
    }

    pub(crate) fn with_members(centroid: Tuple, members: BTreeSet<usize>) -> Self {
        Self { centroid, members }
    }

    pub fn centroid(&self) -> &Tuple {
        &self.centroid
    }

    /// Member row indices in ascending order
    pub fn members(&self) -> &BTreeSet<usize> {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Add row `id`. Returns `true` iff it was not already a member.
    pub fn add_data(&mut self, id: usize) -> bool {
        self.members.insert(id)
    }

    pub fn remove_tuple(&mut self, id: usize) {
        self.members.remove(&id);
    }

    pub fn contains(&self, id: usize) -> bool {
        self.members.contains(&id)
    }

    /// Recompute every centroid value as the prototype of the current members.
    ///
    /// An empty cluster keeps its previous centroid.
    pub fn compute_centroid(&mut self, dataset: &Dataset) {
        if self.members.is_empty() {
            warn!("Cluster has no members, keeping previous centroid");
            return;
        }

        for (index, attribute) in dataset.attributes().iter().enumerate() {
            if let Some(prototype) = dataset.compute_prototype(&self.members, attribute) {
                self.centroid.set_value(index, prototype);
            }
        }
    }

    /// Mean distance from the centroid to the members, `None` when empty
    pub fn avg_distance(&self, dataset: &Dataset) -> Option<f64> {
        self.centroid.avg_distance(dataset, &self.members)
    }
}

impl fmt::Display for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Centroid=({})", self.centroid)
    }
}
