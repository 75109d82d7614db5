//! Durable storage of fitted cluster sets, addressed by opaque string keys.

use crate::cluster_set::ClusterSet;
use crate::codec::{decode_cluster_set, encode_cluster_set};
use crate::error::{KMeansError, Result};
use std::collections::HashMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Saves and reloads cluster sets by key
pub trait ModelStore {
    /// Store `cluster_set` under `key`, replacing any previous model
    fn save(&mut self, cluster_set: &ClusterSet, key: &str) -> Result<()>;

    /// Load the model stored under `key`.
    ///
    /// # Errors
    ///
    /// `Persistence` if the key is absent or the stored buffer is malformed.
    fn load(&self, key: &str) -> Result<ClusterSet>;
}

/// Keeps encoded models in memory
#[derive(Debug, Default)]
pub struct MemoryModelStore {
    models: HashMap<String, Vec<u8>>,
}

impl MemoryModelStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Raw encoded buffer stored under `key`
    pub fn bytes(&self, key: &str) -> Option<&[u8]> {
        self.models.get(key).map(Vec::as_slice)
    }
}

impl ModelStore for MemoryModelStore {
    fn save(&mut self, cluster_set: &ClusterSet, key: &str) -> Result<()> {
        self.models
            .insert(key.to_string(), encode_cluster_set(cluster_set));
        Ok(())
    }

    fn load(&self, key: &str) -> Result<ClusterSet> {
        let bytes = self
            .models
            .get(key)
            .ok_or_else(|| KMeansError::Persistence(format!("no model stored under '{}'", key)))?;
        decode_cluster_set(bytes)
    }
}

/// Stores each model as `<root>/<key>.dat`.
///
/// Writes go to a temporary file in `root` that is renamed over the target,
/// so a reader never sees a partially written model.
#[derive(Debug, Clone)]
pub struct FileModelStore {
    root: PathBuf,
}

impl FileModelStore {
    /// Use `root` as the model directory, creating it if needed
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File that holds the model for `key`
    pub fn path_for(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(format!("{}.dat", key)))
    }
}

impl ModelStore for FileModelStore {
    fn save(&mut self, cluster_set: &ClusterSet, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        let bytes = encode_cluster_set(cluster_set);

        let mut tmp = NamedTempFile::new_in(&self.root)?;
        tmp.write_all(&bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| KMeansError::Io(e.error))?;

        info!("Saved model '{}' ({} bytes) to {:?}", key, bytes.len(), path);
        Ok(())
    }

    fn load(&self, key: &str) -> Result<ClusterSet> {
        let path = self.path_for(key)?;
        let bytes = fs::read(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => {
                KMeansError::Persistence(format!("no model stored under '{}'", key))
            }
            _ => KMeansError::Persistence(format!("cannot read {:?}: {}", path, e)),
        })?;

        debug!("Read model '{}' ({} bytes) from {:?}", key, bytes.len(), path);
        decode_cluster_set(&bytes)
    }
}

fn validate_key(key: &str) -> Result<()> {
    let path_like = key.contains("..") || key.contains(|c: char| c == '/' || c == '\\');
    if key.is_empty() || key == "." || path_like {
        return Err(KMeansError::Persistence(format!(
            "invalid model key '{}'",
            key
        )));
    }
    Ok(())
}
