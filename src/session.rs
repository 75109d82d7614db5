//! Synchronous request/response handling for one client session.
//!
//! A [`Session`] owns at most one dataset and one fitted model for its whole
//! lifetime; nothing is shared between sessions, so a server runs one session
//! per connection without any locking. Failures are returned as
//! [`Response::Error`] and leave the session state untouched.

use crate::config::KMeansConfig;
use crate::dataset::Dataset;
use crate::error::{KMeansError, Result};
use crate::kmeans::MixedKMeans;
use crate::report::{render_clusters, render_summary};
use crate::source::{DatasetSource, TableRef};
use crate::store::ModelStore;
use tracing::{info, warn};

/// A client request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Load a table as the session dataset
    StoreTable { database: String, table: String },
    /// Cluster the session dataset into `k` groups
    Learn { k: usize },
    /// Persist the last learned model under its table/`k` key
    SaveModel,
    /// Reload a model previously saved for a table and `k`
    LoadModel {
        database: String,
        table: String,
        k: usize,
    },
}

/// Reply to a [`Request`]
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// Rendered dataset
    Table(String),
    /// Pass count, whether a fixed point was reached before the pass cap, and
    /// the detailed cluster report
    Learned {
        iterations: usize,
        converged: bool,
        report: String,
    },
    /// Key the model was saved under
    Saved { key: String },
    /// Compact summary of a reloaded model
    Model(String),
    Error(String),
}

impl Response {
    pub fn is_ok(&self) -> bool {
        !matches!(self, Response::Error(_))
    }
}

/// A model together with the table and `k` it was learned for
#[derive(Debug, Clone)]
struct LearnedModel {
    table: TableRef,
    kmeans: MixedKMeans,
}

/// One client's view of the clustering service
pub struct Session<S, M> {
    source: S,
    store: M,
    config: KMeansConfig,
    table: Option<(TableRef, Dataset)>,
    model: Option<LearnedModel>,
}

impl<S: DatasetSource, M: ModelStore> Session<S, M> {
    pub fn new(source: S, store: M) -> Self {
        Self {
            source,
            store,
            config: KMeansConfig::default(),
            table: None,
            model: None,
        }
    }

    /// Template configuration; `k` is taken from each `Learn` request
    pub fn with_config(mut self, config: KMeansConfig) -> Self {
        self.config = config;
        self
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.table.as_ref().map(|(_, dataset)| dataset)
    }

    pub fn model(&self) -> Option<&MixedKMeans> {
        self.model.as_ref().map(|m| &m.kmeans)
    }

    pub fn store(&self) -> &M {
        &self.store
    }

    /// Serve one request
    pub fn handle(&mut self, request: Request) -> Response {
        match self.try_handle(request) {
            Ok(response) => response,
            Err(e) => {
                warn!("Request failed: {}", e);
                Response::Error(e.to_string())
            }
        }
    }

    fn try_handle(&mut self, request: Request) -> Result<Response> {
        match request {
            Request::StoreTable { database, table } => {
                let table = TableRef::new(database, table);
                let dataset = self.source.load(&table)?;
                info!("Session loaded table {}", table);
                let rendered = dataset.to_string();
                self.table = Some((table, dataset));
                Ok(Response::Table(rendered))
            }
            Request::Learn { k } => {
                let (table, dataset) = self
                    .table
                    .as_ref()
                    .ok_or_else(|| KMeansError::Session("no table loaded".to_string()))?;

                let mut config = self.config.clone();
                config.k = k;
                let mut kmeans = MixedKMeans::with_config(config);
                let iterations = kmeans.fit(dataset)?;
                let cluster_set = kmeans.cluster_set().ok_or(KMeansError::NotFitted)?;
                let report = render_clusters(cluster_set, dataset);
                let converged = kmeans.converged();

                self.model = Some(LearnedModel {
                    table: table.clone(),
                    kmeans,
                });
                Ok(Response::Learned {
                    iterations,
                    converged,
                    report,
                })
            }
            Request::SaveModel => {
                let model = self
                    .model
                    .as_ref()
                    .ok_or_else(|| KMeansError::Session("no model learned".to_string()))?;
                let cluster_set = model.kmeans.cluster_set().ok_or(KMeansError::NotFitted)?;
                let key = model.table.model_key(model.kmeans.k());
                self.store.save(cluster_set, &key)?;
                Ok(Response::Saved { key })
            }
            Request::LoadModel { database, table, k } => {
                let table = TableRef::new(database, table);
                let key = table.model_key(k);
                let cluster_set = self.store.load(&key)?;
                let summary = render_summary(&cluster_set);
                info!("Session loaded model '{}'", key);
                self.model = Some(LearnedModel {
                    table,
                    kmeans: MixedKMeans::from_cluster_set(cluster_set),
                });
                Ok(Response::Model(summary))
            }
        }
    }
}
