//! Dataset ingestion boundary.
//!
//! A [`DatasetSource`] turns a `(database, table)` reference into a fully
//! materialized [`Dataset`]. [`CsvSource`] treats a directory as the "server",
//! each subdirectory as a database and each `<table>.csv` file as a table.

use crate::dataset::{Dataset, DatasetBuilder};
use crate::error::{KMeansError, Result};
use csv::ReaderBuilder;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Names one table in one database
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableRef {
    pub database: String,
    pub table: String,
}

impl TableRef {
    pub fn new(database: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            table: table.into(),
        }
    }

    /// Persistence key for a model of this table with `k` clusters:
    /// database name, table name and `k` concatenated
    pub fn model_key(&self, k: usize) -> String {
        format!("{}{}{}", self.database, self.table, k)
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.database, self.table)
    }
}

/// Produces datasets on request
pub trait DatasetSource {
    /// # Errors
    ///
    /// `Io` or `Csv` when the table cannot be read, `EmptySet` when it has no rows,
    /// `NoValue` when a column has no values to derive its range from.
    fn load(&self, table: &TableRef) -> Result<Dataset>;
}

/// Reads `<root>/<database>/<table>.csv`, header row required
#[derive(Debug, Clone)]
pub struct CsvSource {
    root: PathBuf,
}

impl CsvSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, table: &TableRef) -> Result<PathBuf> {
        for part in [&table.database, &table.table] {
            let path_like = part.contains("..") || part.contains(|c: char| c == '/' || c == '\\');
            if part.is_empty() || path_like {
                return Err(KMeansError::InvalidData(format!(
                    "invalid table reference '{}'",
                    table
                )));
            }
        }
        Ok(self
            .root
            .join(&table.database)
            .join(format!("{}.csv", table.table)))
    }
}

impl DatasetSource for CsvSource {
    fn load(&self, table: &TableRef) -> Result<Dataset> {
        let path = self.path_for(table)?;
        debug!("Reading table {} from {:?}", table, path);
        load_csv(&path)
    }
}

/// Read a CSV file with a header row into a [`Dataset`]
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Dataset> {
    let path = path.as_ref();
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let header: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    let mut builder = DatasetBuilder::new(header);
    let mut duplicates = 0;
    for record in rdr.records() {
        let record = record?;
        if !builder.push_record(record.iter())? {
            duplicates += 1;
        }
    }

    if duplicates > 0 {
        debug!("Dropped {} duplicate records from {:?}", duplicates, path);
    }

    let dataset = builder.build()?;
    info!(
        "Loaded {:?}: {} rows, {} attributes",
        path,
        dataset.row_count(),
        dataset.attribute_count()
    );
    Ok(dataset)
}
