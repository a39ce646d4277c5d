//! Sorted-array sweep-line clustering backend.

use log::{debug, warn};
use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use crate::cluster::Cluster;
use crate::engine::ClusterEngine;
use crate::error::Result;
use crate::marker::Marker;
use crate::projection::Projector;
use crate::spatial::{
    compute_bounds, insertion_sort_by_lng, lower_bound_by_lng, should_use_insertion_sort,
};
use crate::types::{Bounds, Config};

/// Clustering engine backed by a longitude-sorted marker array.
///
/// The marker list is kept sorted lazily: registrations only bump a change
/// counter, and the list is re-sorted at the start of the next view pass.
/// Because typically only a handful of markers move between consecutive
/// views, that sort is almost always an insertion sort over almost-sorted
/// input, which keeps per-frame cost low even under churn.
///
/// # Example
///
/// ```rust
/// use gridclust::{Bounds, ClusterEngine, HashCounter, Marker, SphericalMercator, SweepEngine};
///
/// let mut counter = HashCounter::new();
/// let mut engine = SweepEngine::new();
/// engine.register_marker(Marker::new(48.85, 2.35, &mut counter).unwrap());
/// engine.register_marker(Marker::new(48.86, 2.36, &mut counter).unwrap());
///
/// let projector = SphericalMercator::new(5);
/// let clusters = engine.process_view(&Bounds::new(48.0, 49.0, 2.0, 3.0), &projector);
/// assert_eq!(clusters.iter().map(|c| c.population).sum::<usize>(), 2);
/// ```
pub struct SweepEngine {
    config: Config,
    markers: Vec<Marker>,
    /// Registrations and moves since the last sort.
    nb_changes: usize,
    /// Clusters retained from the previous view pass, reset and reused.
    clusters: Vec<Cluster>,
}

impl SweepEngine {
    /// Create an engine with the default configuration.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create an engine with a custom configuration.
    pub fn with_config(config: Config) -> Self {
        Self {
            config,
            markers: Vec::new(),
            nb_changes: 0,
            clusters: Vec::new(),
        }
    }

    /// Sort the marker list by longitude if anything changed since the last
    /// sort.
    ///
    /// The algorithm choice is a performance contract: insertion sort for
    /// almost-sorted input (the steady state), a general comparison sort
    /// once the accumulated changes make the insertion sort's worst case a
    /// risk. See [`should_use_insertion_sort`].
    fn sort_markers(&mut self) {
        if self.nb_changes == 0 {
            return;
        }

        let total = self.markers.len();
        if should_use_insertion_sort(total, self.nb_changes) {
            debug!("insertion sort: {total} markers, {} changes", self.nb_changes);
            insertion_sort_by_lng(&mut self.markers, |marker| marker.position.lng);
        } else {
            debug!("comparison sort: {total} markers, {} changes", self.nb_changes);
            self.markers
                .sort_by(|a, b| a.position.lng.total_cmp(&b.position.lng));
        }

        self.nb_changes = 0;
    }
}

impl Default for SweepEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ClusterEngine for SweepEngine {
    fn register_marker(&mut self, mut marker: Marker) {
        marker.remove_flag = false;
        self.markers.push(marker);
        self.nb_changes += 1;
    }

    fn register_markers(&mut self, markers: Vec<Marker>) {
        for marker in markers {
            self.register_marker(marker);
        }
    }

    fn remove_markers(&mut self, hashes: &[u64]) {
        let ids: FxHashSet<u64> = hashes.iter().copied().collect();

        // Mark pass, then one filtering rebuild. Per-element removal would
        // be O(n * k) for a batch of k.
        for marker in &mut self.markers {
            if ids.contains(&marker.hash_code()) {
                marker.remove_flag = true;
            }
        }
        self.markers.retain(|marker| !marker.remove_flag);
        // Removal preserves the sorted order, so the change counter stays.
    }

    fn clear_markers(&mut self) {
        self.markers.clear();
    }

    fn process_view(&mut self, view: &Bounds, projector: &dyn Projector) -> &[Cluster] {
        if !view.is_finite() {
            warn!("rejecting view with non-finite bounds: {view:?}");
            self.clusters.clear();
            return &self.clusters;
        }

        let extended = view.extended(self.config.view_padding);

        self.sort_markers();

        // The projection changes with the zoom level, so retained clusters
        // must be re-snapped to the current grid before reuse.
        for cluster in &mut self.clusters {
            cluster.reset();
            cluster.compute_bounds(projector, self.config.size);
        }

        let first = lower_bound_by_lng(&self.markers, extended.min_lng);

        // Clusters still reachable from the current sweep position,
        // as indexes into the cluster list.
        let mut working: SmallVec<[usize; 32]> = (0..self.clusters.len()).collect();

        for index in first..self.markers.len() {
            let marker = &self.markers[index];
            let position = marker.position;

            // Sweep-line early exit: everything beyond is further east.
            if position.lng > extended.max_lng {
                break;
            }

            if marker.filtered
                || position.lat <= extended.min_lat
                || position.lat >= extended.max_lat
            {
                continue;
            }

            let mut assigned = false;
            let mut slot = 0;
            while slot < working.len() {
                let cluster = &mut self.clusters[working[slot]];

                // A cluster entirely west of the marker can never match a
                // later marker either; evict it from the working list.
                if cluster.bounds.max_lng < position.lng {
                    working.remove(slot);
                    continue;
                }

                // Greedy assignment: the first cluster whose bounds contain
                // the marker wins. The anchor comparison is a fast path for
                // markers stacked at identical coordinates.
                if cluster.bounds.contains(&position) || cluster.position == position {
                    cluster.add_marker(marker);
                    assigned = true;
                    break;
                }

                slot += 1;
            }

            if !assigned {
                let mut cluster = Cluster::from_marker(marker, self.config.enable_member_list);
                cluster.compute_bounds(projector, self.config.size);
                working.push(self.clusters.len());
                self.clusters.push(cluster);
            }
        }

        // A retained cluster that received no markers this pass is dropped.
        self.clusters.retain(|cluster| cluster.population > 0);

        // Insertion sort for a stable, mostly-sorted output order.
        insertion_sort_by_lng(&mut self.clusters, |cluster| cluster.position.lng);

        &self.clusters
    }

    fn find_markers_in_area(&self, area: &Bounds) -> Vec<&Marker> {
        self.markers
            .iter()
            .filter(|marker| !marker.filtered && area.contains(&marker.position))
            .collect()
    }

    fn compute_global_bounds(&self, include_filtered: bool) -> Option<Bounds> {
        compute_bounds(&self.markers, include_filtered)
    }

    fn markers(&self) -> Vec<&Marker> {
        self.markers.iter().collect()
    }

    fn population(&self) -> usize {
        self.markers.len()
    }

    fn reset_clusters(&mut self) {
        self.clusters.clear();
    }

    fn move_marker(&mut self, hash: u64, lat: f64, lng: f64) -> Result<bool> {
        let Some(marker) = self
            .markers
            .iter_mut()
            .find(|marker| marker.hash_code() == hash)
        else {
            return Ok(false);
        };

        marker.move_to(lat, lng)?;
        self.nb_changes += 1;
        Ok(true)
    }

    fn set_marker_filtered(&mut self, hash: u64, filtered: bool) -> bool {
        match self
            .markers
            .iter_mut()
            .find(|marker| marker.hash_code() == hash)
        {
            Some(marker) => {
                marker.filtered = filtered;
                true
            }
            None => false,
        }
    }
}
