//! Cluster aggregate: weighted statistics over a set of markers.

use crate::hash::MAX_HASH_CODE;
use crate::marker::Marker;
use crate::projection::Projector;
use crate::types::{Bounds, PixelPoint, Position};

/// Number of marker categories tracked by the per-cluster histogram.
pub const CATEGORY_COUNT: usize = 8;

/// An aggregate of markers sharing a view-dependent grid cell.
///
/// Clusters are ephemeral: each `process_view` call conceptually rebuilds
/// them from scratch, though the engines reset and reuse retained objects.
/// No cluster identity is guaranteed across calls; the combined `hash_code`
/// exists so a consumer can detect whether a cluster's composition changed
/// without comparing member lists.
#[derive(Debug, Clone)]
pub struct Cluster {
    /// Grid-snapped cluster area.
    pub bounds: Bounds,
    /// Anchor position: the position of the seeding marker.
    pub position: Position,
    /// Average position of the members, weighted by marker weight.
    pub average_position: Position,
    /// Number of markers clustered.
    pub population: usize,
    /// Sum of the member weights.
    pub total_weight: f64,
    /// Per-category member counts.
    pub stats: [u32; CATEGORY_COUNT],
    /// Combined identity hash of the members; 1 while empty.
    pub hash_code: u64,
    /// Identity of the marker added last. Meaningful only while
    /// `population > 0`; handy when the cluster holds a single marker.
    pub last_marker: Option<u64>,
    members: Option<Vec<u64>>,
}

impl Cluster {
    /// Seed a cluster from a single marker.
    ///
    /// `keep_members` controls whether the cluster records member marker
    /// identities (see `Config::enable_member_list`).
    pub fn from_marker(marker: &Marker, keep_members: bool) -> Self {
        let mut stats = [0u32; CATEGORY_COUNT];
        stats[marker.category() as usize] = 1;

        Self {
            bounds: Bounds::new(
                marker.position.lat,
                marker.position.lat,
                marker.position.lng,
                marker.position.lng,
            ),
            position: marker.position,
            average_position: marker.position,
            population: 1,
            total_weight: marker.weight(),
            stats,
            hash_code: 31 + marker.hash_code(),
            last_marker: Some(marker.hash_code()),
            members: keep_members.then(|| vec![marker.hash_code()]),
        }
    }

    /// Fold a marker into the aggregate.
    pub fn add_marker(&mut self, marker: &Marker) {
        if let Some(members) = self.members.as_mut() {
            members.push(marker.hash_code());
        }

        // Incremental combination: h' = 31*h + id, reduced modulo the
        // maximum value when it meets or exceeds it.
        let mut h = (self.hash_code << 5) - self.hash_code + marker.hash_code();
        if h >= MAX_HASH_CODE {
            h %= MAX_HASH_CODE;
        }
        self.hash_code = h;

        self.last_marker = Some(marker.hash_code());

        // Weighted arithmetic mean, independently per axis.
        let weight = marker.weight();
        let current_total = self.total_weight;
        let new_total = weight + current_total;

        self.average_position.lat =
            (self.average_position.lat * current_total + marker.position.lat * weight) / new_total;
        self.average_position.lng =
            (self.average_position.lng * current_total + marker.position.lng * weight) / new_total;

        self.population += 1;
        self.total_weight = new_total;
        self.stats[marker.category() as usize] += 1;
    }

    /// Merge another cluster into this one.
    ///
    /// Used when two clusters geometrically collapse into a single visual
    /// element. The hash combination here saturates at the maximum value
    /// instead of wrapping; the two reduction strategies are intentionally
    /// kept distinct because consumers may depend on the exact values.
    pub fn apply_cluster(&mut self, other: &Cluster) {
        let h = self.hash_code * 41 + other.hash_code * 43;
        self.hash_code = h.min(MAX_HASH_CODE);

        let weight = other.total_weight;
        let current_total = self.total_weight;
        let new_total = weight + current_total;

        self.average_position.lat = (self.average_position.lat * current_total
            + other.average_position.lat * weight)
            / new_total;
        self.average_position.lng = (self.average_position.lng * current_total
            + other.average_position.lng * weight)
            / new_total;

        self.population += other.population;
        self.total_weight = new_total;

        self.bounds.merge(&other.bounds);

        for (stat, other_stat) in self.stats.iter_mut().zip(other.stats.iter()) {
            *stat += other_stat;
        }

        if let (Some(members), Some(other_members)) = (self.members.as_mut(), other.members.as_ref())
        {
            members.extend_from_slice(other_members);
        }
    }

    /// Empty the aggregate ahead of a new view pass.
    ///
    /// The anchor position is kept; bounds must be re-snapped with
    /// [`Cluster::compute_bounds`] before the cluster is reused.
    pub fn reset(&mut self) {
        self.hash_code = 1;
        self.last_marker = None;
        self.population = 0;
        self.total_weight = 0.0;
        self.stats = [0; CATEGORY_COUNT];

        if let Some(members) = self.members.as_mut() {
            members.clear();
        }
    }

    /// Snap the bounds to the projection grid cell containing the anchor.
    ///
    /// The anchor is projected to pixel space, floor-divided by `size` to
    /// find its cell, and the cell's corners are unprojected back to lat/lng.
    /// Markers falling in the same pixel cell at a fixed zoom therefore
    /// always produce congruent bounds, which keeps clusters visually stable
    /// while panning. Idempotent for a fixed projector and anchor.
    pub fn compute_bounds(&mut self, projector: &dyn Projector, size: f64) {
        let projected = projector.project(self.position);

        let cell_x = (projected.x / size).floor();
        let cell_y = (projected.y / size).floor();
        let start_x = cell_x * size;
        let start_y = cell_y * size;

        // Screen y grows downward, so the top-left corner unprojects to the
        // higher latitude. Bounds::new normalizes the ordering.
        let a = projector.unproject(PixelPoint::new(start_x, start_y));
        let b = projector.unproject(PixelPoint::new(start_x + size, start_y + size));

        self.bounds = Bounds::new(b.lat, a.lat, a.lng, b.lng);
    }

    /// Identities of the member markers, when the member list is enabled.
    pub fn members(&self) -> Option<&[u64]> {
        self.members.as_deref()
    }
}
