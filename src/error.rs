//! Error types for gridclust operations.

use thiserror::Error;

/// Errors produced by marker construction and engine configuration.
#[derive(Debug, Error)]
pub enum GridclustError {
    /// A marker coordinate was NaN or infinite.
    #[error("non-finite coordinate: lat={lat}, lng={lng}")]
    NonFiniteCoordinate { lat: f64, lng: f64 },

    /// Marker weights must be finite and strictly positive.
    #[error("marker weight must be finite and positive, got {0}")]
    InvalidWeight(f64),

    /// Categories index a fixed-size histogram and must lie in `0..8`.
    #[error("category {0} out of range (expected 0..8)")]
    CategoryOutOfRange(u8),

    /// Invalid engine configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Convenience result type for gridclust operations.
pub type Result<T> = std::result::Result<T, GridclustError>;
