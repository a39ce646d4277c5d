//! Clustering engines.
//!
//! Two backends implement the same [`ClusterEngine`] contract:
//!
//! - [`SweepEngine`] keeps markers in a lazily-sorted array and clusters with
//!   a longitude sweep. Cheap under heavy per-frame marker churn because the
//!   sort is amortized.
//! - [`TreeEngine`] keeps markers in an R-tree and queries only the viewport.
//!   Better for large static datasets dominated by small-area views; tree
//!   maintenance makes it worse under churn.
//!
//! Select a backend at construction time through [`EngineBuilder`].

mod sweep;
mod tree;

pub use sweep::SweepEngine;
pub use tree::TreeEngine;

use crate::cluster::Cluster;
use crate::error::{GridclustError, Result};
use crate::marker::Marker;
use crate::projection::Projector;
use crate::spatial::compute_bounds;
use crate::types::{Bounds, Config};

/// The clustering contract shared by both backends.
///
/// Engines are single-threaded by construction: `process_view` must run to
/// completion before any other mutation or another `process_view` call is
/// issued. Use the `sync` feature's wrapper when crossing threads.
pub trait ClusterEngine {
    /// Take ownership of a marker. O(1) amortized.
    fn register_marker(&mut self, marker: Marker);

    /// Register a batch of markers.
    fn register_markers(&mut self, markers: Vec<Marker>);

    /// Remove the markers with the given identity hashes.
    fn remove_markers(&mut self, hashes: &[u64]);

    /// Drop every registered marker. O(1) reset.
    fn clear_markers(&mut self);

    /// Recompute the cluster list for a viewport.
    ///
    /// The projector must reflect the current zoom; it may differ between
    /// calls. Returns the clusters covering the padded view, sorted by
    /// longitude.
    fn process_view(&mut self, view: &Bounds, projector: &dyn Projector) -> &[Cluster];

    /// Unfiltered markers whose position lies inside `area`.
    fn find_markers_in_area(&self, area: &Bounds) -> Vec<&Marker>;

    /// Bounding rectangle of the unfiltered markers inside `area`.
    fn find_markers_bounds_in_area(&self, area: &Bounds) -> Option<Bounds> {
        compute_bounds(self.find_markers_in_area(area), true)
    }

    /// Bounding rectangle of every registered marker.
    fn compute_global_bounds(&self, include_filtered: bool) -> Option<Bounds>;

    /// All registered markers, filtered ones included.
    fn markers(&self) -> Vec<&Marker>;

    /// Number of registered markers, filtered ones included.
    fn population(&self) -> usize;

    /// Forget retained clusters; the next `process_view` starts from scratch.
    fn reset_clusters(&mut self);

    /// Move a marker to new coordinates.
    ///
    /// Returns `Ok(false)` when no marker carries the given hash. Rejects
    /// non-finite coordinates.
    fn move_marker(&mut self, hash: u64, lat: f64, lng: f64) -> Result<bool>;

    /// Toggle a marker's filtered flag. Returns false when unknown.
    fn set_marker_filtered(&mut self, hash: u64, filtered: bool) -> bool;
}

/// Backend selection for [`EngineBuilder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    /// Sorted-array sweep-line clustering.
    #[default]
    Sweep,
    /// R-tree indexed clustering.
    Tree,
}

/// Builder for a clustering engine.
///
/// # Example
///
/// ```rust
/// use gridclust::{Backend, EngineBuilder};
///
/// let engine = EngineBuilder::new()
///     .backend(Backend::Tree)
///     .size(128.0)
///     .view_padding(0.25)
///     .build()
///     .unwrap();
/// assert_eq!(engine.population(), 0);
/// ```
#[derive(Debug, Default)]
pub struct EngineBuilder {
    backend: Backend,
    config: Config,
}

impl EngineBuilder {
    /// Create a builder with the default sweep backend and configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the clustering backend.
    pub fn backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Set the grid cell edge length in projected pixels.
    pub fn size(mut self, size: f64) -> Self {
        self.config.size = size;
        self
    }

    /// Set the view padding ratio.
    pub fn view_padding(mut self, view_padding: f64) -> Self {
        self.config.view_padding = view_padding;
        self
    }

    /// Keep per-cluster member lists.
    pub fn member_list(mut self, enabled: bool) -> Self {
        self.config.enable_member_list = enabled;
        self
    }

    /// Validate the configuration and build the selected engine.
    pub fn build(self) -> Result<Box<dyn ClusterEngine>> {
        self.config
            .validate()
            .map_err(GridclustError::InvalidConfig)?;

        Ok(match self.backend {
            Backend::Sweep => Box::new(SweepEngine::with_config(self.config)),
            Backend::Tree => Box::new(TreeEngine::with_config(self.config)),
        })
    }
}
