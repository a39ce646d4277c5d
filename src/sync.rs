//! Thread-safe wrapper for concurrent engine access.
//!
//! The base engines assume a stable marker snapshot throughout a view pass,
//! so finer-grained locking is not safe: every mutation and every
//! `process_view` call must go through one exclusive section. `SyncEngine`
//! wraps an engine in `Arc<RwLock<_>>` to provide exactly that.
//!
//! Enable the `sync` feature to use this module:
//!
//! ```toml
//! [dependencies]
//! gridclust = { version = "0.1", features = ["sync"] }
//! ```

use std::sync::Arc;

use parking_lot::RwLock;

use crate::cluster::Cluster;
use crate::engine::ClusterEngine;
use crate::error::Result;
use crate::marker::Marker;
use crate::projection::Projector;
use crate::types::Bounds;

/// Thread-safe wrapper around a clustering engine.
///
/// Clones share the same underlying engine. Read-only queries take a shared
/// lock; registrations, removals and `process_view` take the exclusive lock
/// for their full duration.
///
/// # Example
///
/// ```rust
/// use gridclust::{HashCounter, Marker, SweepEngine, SyncEngine};
/// use std::thread;
///
/// let engine = SyncEngine::new(SweepEngine::new());
/// let writer = engine.clone();
///
/// let mut counter = HashCounter::new();
/// let marker = Marker::new(10.0, 20.0, &mut counter).unwrap();
/// let handle = thread::spawn(move || writer.register_marker(marker));
/// handle.join().unwrap();
///
/// assert_eq!(engine.population(), 1);
/// ```
#[derive(Clone)]
pub struct SyncEngine {
    inner: Arc<RwLock<Box<dyn ClusterEngine + Send + Sync>>>,
}

impl SyncEngine {
    /// Wrap an engine.
    pub fn new(engine: impl ClusterEngine + Send + Sync + 'static) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Box::new(engine))),
        }
    }

    /// See [`ClusterEngine::register_marker`].
    pub fn register_marker(&self, marker: Marker) {
        self.inner.write().register_marker(marker);
    }

    /// See [`ClusterEngine::register_markers`].
    pub fn register_markers(&self, markers: Vec<Marker>) {
        self.inner.write().register_markers(markers);
    }

    /// See [`ClusterEngine::remove_markers`].
    pub fn remove_markers(&self, hashes: &[u64]) {
        self.inner.write().remove_markers(hashes);
    }

    /// See [`ClusterEngine::clear_markers`].
    pub fn clear_markers(&self) {
        self.inner.write().clear_markers();
    }

    /// Run a full view pass under the exclusive lock and return the clusters
    /// by value.
    pub fn process_view(&self, view: &Bounds, projector: &dyn Projector) -> Vec<Cluster> {
        self.inner.write().process_view(view, projector).to_vec()
    }

    /// See [`ClusterEngine::find_markers_in_area`]. Markers are cloned out
    /// of the lock.
    pub fn find_markers_in_area(&self, area: &Bounds) -> Vec<Marker> {
        self.inner
            .read()
            .find_markers_in_area(area)
            .into_iter()
            .cloned()
            .collect()
    }

    /// See [`ClusterEngine::find_markers_bounds_in_area`].
    pub fn find_markers_bounds_in_area(&self, area: &Bounds) -> Option<Bounds> {
        self.inner.read().find_markers_bounds_in_area(area)
    }

    /// See [`ClusterEngine::compute_global_bounds`].
    pub fn compute_global_bounds(&self, include_filtered: bool) -> Option<Bounds> {
        self.inner.read().compute_global_bounds(include_filtered)
    }

    /// See [`ClusterEngine::population`].
    pub fn population(&self) -> usize {
        self.inner.read().population()
    }

    /// See [`ClusterEngine::reset_clusters`].
    pub fn reset_clusters(&self) {
        self.inner.write().reset_clusters();
    }

    /// See [`ClusterEngine::move_marker`].
    pub fn move_marker(&self, hash: u64, lat: f64, lng: f64) -> Result<bool> {
        self.inner.write().move_marker(hash, lat, lng)
    }

    /// See [`ClusterEngine::set_marker_filtered`].
    pub fn set_marker_filtered(&self, hash: u64, filtered: bool) -> bool {
        self.inner.write().set_marker_filtered(hash, filtered)
    }
}
