//! R-tree indexed clustering backend.

use log::warn;
use rstar::{AABB, RTree, RTreeObject};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::cluster::Cluster;
use crate::engine::ClusterEngine;
use crate::error::Result;
use crate::marker::Marker;
use crate::projection::Projector;
use crate::spatial::{compute_bounds, insertion_sort_by_lng};
use crate::types::{Bounds, Config};

/// A marker entry in the R-tree: a degenerate (zero-area) rectangle at the
/// marker position, carrying the identity hash for the lookup back into the
/// marker table.
#[derive(Debug, Clone, PartialEq)]
struct IndexedMarker {
    lng: f64,
    lat: f64,
    hash_code: u64,
}

impl IndexedMarker {
    fn from_marker(marker: &Marker) -> Self {
        Self {
            lng: marker.position.lng,
            lat: marker.position.lat,
            hash_code: marker.hash_code(),
        }
    }
}

impl RTreeObject for IndexedMarker {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.lng, self.lat])
    }
}

/// Clustering engine backed by a bulk-loadable R-tree.
///
/// `process_view` queries the tree for markers intersecting the padded view
/// instead of sweeping the whole collection, then runs the same greedy
/// first-match clustering pass as [`super::SweepEngine`]. Better for large
/// static datasets with small viewport queries; worse under heavy per-frame
/// marker churn, since tree maintenance is not amortized the way the sweep
/// engine's lazy sort is.
pub struct TreeEngine {
    config: Config,
    markers: FxHashMap<u64, Marker>,
    tree: RTree<IndexedMarker>,
    clusters: Vec<Cluster>,
}

impl TreeEngine {
    /// Create an engine with the default configuration.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create an engine with a custom configuration.
    pub fn with_config(config: Config) -> Self {
        Self {
            config,
            markers: FxHashMap::default(),
            tree: RTree::new(),
            clusters: Vec::new(),
        }
    }

    /// Markers intersecting `area`, in ascending longitude order.
    ///
    /// The tree returns hits in traversal order; sorting them keeps the
    /// greedy assignment deterministic and lets the working-list eviction
    /// reuse the sweep invariant.
    fn query_sorted(&self, area: &Bounds) -> Vec<&IndexedMarker> {
        let envelope = AABB::from_corners(
            [area.min_lng, area.min_lat],
            [area.max_lng, area.max_lat],
        );

        let mut hits: Vec<&IndexedMarker> = self.tree.locate_in_envelope(&envelope).collect();
        hits.sort_by(|a, b| a.lng.total_cmp(&b.lng));
        hits
    }
}

impl Default for TreeEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ClusterEngine for TreeEngine {
    fn register_marker(&mut self, mut marker: Marker) {
        marker.remove_flag = false;
        self.tree.insert(IndexedMarker::from_marker(&marker));
        self.markers.insert(marker.hash_code(), marker);
    }

    fn register_markers(&mut self, markers: Vec<Marker>) {
        // Bulk load: rebuild the tree over old and new entries in one
        // O(n log n) pass instead of n incremental inserts.
        let mut entries: Vec<IndexedMarker> = Vec::with_capacity(self.markers.len() + markers.len());
        entries.extend(self.tree.iter().cloned());

        for mut marker in markers {
            marker.remove_flag = false;
            entries.push(IndexedMarker::from_marker(&marker));
            self.markers.insert(marker.hash_code(), marker);
        }

        self.tree = RTree::bulk_load(entries);
    }

    fn remove_markers(&mut self, hashes: &[u64]) {
        for hash in hashes {
            if let Some(marker) = self.markers.remove(hash) {
                self.tree.remove(&IndexedMarker::from_marker(&marker));
            }
        }
    }

    fn clear_markers(&mut self) {
        self.markers.clear();
        self.tree = RTree::new();
    }

    fn process_view(&mut self, view: &Bounds, projector: &dyn Projector) -> &[Cluster] {
        if !view.is_finite() {
            warn!("rejecting view with non-finite bounds: {view:?}");
            self.clusters.clear();
            return &self.clusters;
        }

        let extended = view.extended(self.config.view_padding);

        for cluster in &mut self.clusters {
            cluster.reset();
            cluster.compute_bounds(projector, self.config.size);
        }

        // Query inline so only the tree stays borrowed while the cluster
        // list is rebuilt below.
        let envelope = AABB::from_corners(
            [extended.min_lng, extended.min_lat],
            [extended.max_lng, extended.max_lat],
        );
        let mut hits: Vec<&IndexedMarker> = self.tree.locate_in_envelope(&envelope).collect();
        hits.sort_by(|a, b| a.lng.total_cmp(&b.lng));

        let mut clusters = std::mem::take(&mut self.clusters);
        let mut working: SmallVec<[usize; 32]> = (0..clusters.len()).collect();

        for hit in hits {
            let Some(marker) = self.markers.get(&hit.hash_code) else {
                continue;
            };
            let position = marker.position;
            // Same strict latitude band as the sweep pass; the envelope
            // query alone is inclusive on the boundary.
            if marker.filtered
                || position.lat <= extended.min_lat
                || position.lat >= extended.max_lat
            {
                continue;
            }

            let mut assigned = false;
            let mut slot = 0;
            while slot < working.len() {
                let cluster = &mut clusters[working[slot]];

                // Hits arrive in longitude order, so the sweep eviction
                // rule applies here too.
                if cluster.bounds.max_lng < position.lng {
                    working.remove(slot);
                    continue;
                }

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
                working.push(clusters.len());
                clusters.push(cluster);
            }
        }

        clusters.retain(|cluster| cluster.population > 0);
        insertion_sort_by_lng(&mut clusters, |cluster| cluster.position.lng);

        self.clusters = clusters;
        &self.clusters
    }

    fn find_markers_in_area(&self, area: &Bounds) -> Vec<&Marker> {
        self.query_sorted(area)
            .into_iter()
            .filter_map(|hit| self.markers.get(&hit.hash_code))
            .filter(|marker| !marker.filtered)
            .collect()
    }

    fn compute_global_bounds(&self, include_filtered: bool) -> Option<Bounds> {
        compute_bounds(self.markers.values(), include_filtered)
    }

    fn markers(&self) -> Vec<&Marker> {
        self.markers.values().collect()
    }

    fn population(&self) -> usize {
        self.markers.len()
    }

    fn reset_clusters(&mut self) {
        self.clusters.clear();
    }

    fn move_marker(&mut self, hash: u64, lat: f64, lng: f64) -> Result<bool> {
        let Some(marker) = self.markers.get_mut(&hash) else {
            return Ok(false);
        };

        let old_entry = IndexedMarker::from_marker(marker);
        marker.move_to(lat, lng)?;
        let new_entry = IndexedMarker::from_marker(marker);

        self.tree.remove(&old_entry);
        self.tree.insert(new_entry);
        Ok(true)
    }

    fn set_marker_filtered(&mut self, hash: u64, filtered: bool) -> bool {
        match self.markers.get_mut(&hash) {
            Some(marker) => {
                marker.filtered = filtered;
                true
            }
            None => false,
        }
    }
}
