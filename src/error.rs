use thiserror::Error;

/// Error types for the mixed k-means library
#[derive(Error, Debug)]
pub enum KMeansError {
    /// Requested sample size is zero or exceeds the number of distinct rows
    #[error("Sample size {k} out of range: choose k between 1 and {max}")]
    OutOfRangeSampleSize { k: usize, max: usize },

    /// The number of clusters k is invalid for the requested operation
    #[error("Invalid k value: {0}")]
    InvalidK(String),

    /// A configuration value is outside its valid range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A dataset was built from zero rows
    #[error("Empty set: {0}")]
    EmptySet(String),

    /// An aggregate needed to describe a continuous column is missing
    #[error("No value: {0}")]
    NoValue(String),

    /// Row or centroid width does not match the attribute schema
    #[error("Dimension mismatch: {0}")]
    InvalidDimensions(String),

    /// A value does not fit the attribute it is bound to
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Model has not been fitted yet
    #[error("Model has not been fitted. Call fit() first.")]
    NotFitted,

    /// A persisted model buffer is absent or malformed
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// A session request arrived in a state that cannot serve it
    #[error("Session error: {0}")]
    Session(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, KMeansError>;
