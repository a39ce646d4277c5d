//! Marker entity: a registrable geographic point.

use bytes::Bytes;

use crate::cluster::CATEGORY_COUNT;
use crate::error::{GridclustError, Result};
use crate::hash::HashCounter;
use crate::types::Position;

/// A single geographic point eligible for clustering.
///
/// Markers are created by the caller and handed to an engine for ownership.
/// The identity hash assigned at construction is the stable handle used for
/// later removal or mutation through the engine.
///
/// With some datasets it is faster to keep markers registered and toggle the
/// `filtered` flag than to remove and re-register them; filtered markers are
/// ignored by clustering and by area queries.
///
/// # Example
///
/// ```rust
/// use gridclust::{HashCounter, Marker};
///
/// let mut counter = HashCounter::new();
/// let marker = Marker::new(48.85, 2.35, &mut counter)
///     .unwrap()
///     .with_weight(2.0)
///     .unwrap()
///     .with_category(3)
///     .unwrap();
/// assert_eq!(marker.hash_code(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Marker {
    /// Map position of the marker.
    pub position: Position,
    /// Weight influencing the cluster average position.
    weight: f64,
    /// Category in `0..8`, indexing the cluster histogram.
    category: u8,
    /// Filtered markers are excluded from clustering and queries.
    pub filtered: bool,
    /// Attached user data.
    pub payload: Bytes,
    hash_code: u64,
    pub(crate) remove_flag: bool,
}

impl Marker {
    /// Create a marker at the given coordinates.
    ///
    /// Weight defaults to 1, category to 0, payload to empty. Rejects NaN
    /// or infinite coordinates.
    pub fn new(lat: f64, lng: f64, counter: &mut HashCounter) -> Result<Self> {
        if !lat.is_finite() || !lng.is_finite() {
            return Err(GridclustError::NonFiniteCoordinate { lat, lng });
        }

        Ok(Self {
            position: Position::new(lat, lng),
            weight: 1.0,
            category: 0,
            filtered: false,
            payload: Bytes::new(),
            hash_code: counter.next(),
            remove_flag: false,
        })
    }

    /// Set the weight. Must be finite and strictly positive.
    pub fn with_weight(mut self, weight: f64) -> Result<Self> {
        if !weight.is_finite() || weight <= 0.0 {
            return Err(GridclustError::InvalidWeight(weight));
        }
        self.weight = weight;
        Ok(self)
    }

    /// Set the category. Must lie in `0..8`.
    pub fn with_category(mut self, category: u8) -> Result<Self> {
        if category as usize >= CATEGORY_COUNT {
            return Err(GridclustError::CategoryOutOfRange(category));
        }
        self.category = category;
        Ok(self)
    }

    /// Set the filtered flag.
    pub fn with_filtered(mut self, filtered: bool) -> Self {
        self.filtered = filtered;
        self
    }

    /// Attach a user payload.
    pub fn with_payload(mut self, payload: impl Into<Bytes>) -> Self {
        self.payload = payload.into();
        self
    }

    /// The stable identity hash assigned at construction.
    pub fn hash_code(&self) -> u64 {
        self.hash_code
    }

    /// The marker weight.
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// The marker category.
    pub fn category(&self) -> u8 {
        self.category
    }

    /// Move the marker to new coordinates. Rejects non-finite input.
    ///
    /// When the marker is owned by an engine, use the engine's
    /// `move_marker` instead so its index bookkeeping stays correct.
    pub fn move_to(&mut self, lat: f64, lng: f64) -> Result<()> {
        if !lat.is_finite() || !lng.is_finite() {
            return Err(GridclustError::NonFiniteCoordinate { lat, lng });
        }
        self.position = Position::new(lat, lng);
        Ok(())
    }
}
