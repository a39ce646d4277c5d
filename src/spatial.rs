//! Shared spatial utilities: bounds reductions, longitude ordering, and the
//! sort-strategy heuristic used by the sweep engine.

use crate::marker::Marker;
use crate::types::Bounds;

/// Compute the bounding rectangle of a set of markers.
///
/// Single O(n) min/max reduction. Markers with `filtered` set are skipped
/// unless `include_filtered` is true. Returns `None` for an empty or
/// fully-filtered input; never an error.
///
/// # Example
///
/// ```rust
/// use gridclust::{Bounds, HashCounter, Marker, spatial::compute_bounds};
///
/// let mut counter = HashCounter::new();
/// let markers = vec![
///     Marker::new(10.0, 20.0, &mut counter).unwrap(),
///     Marker::new(30.0, 40.0, &mut counter).unwrap(),
/// ];
/// let bounds = compute_bounds(&markers, true).unwrap();
/// assert_eq!(bounds, Bounds::new(10.0, 30.0, 20.0, 40.0));
/// assert!(compute_bounds(&[], true).is_none());
/// ```
pub fn compute_bounds<'a, I>(markers: I, include_filtered: bool) -> Option<Bounds>
where
    I: IntoIterator<Item = &'a Marker>,
{
    let mut min_lat = f64::MAX;
    let mut max_lat = f64::MIN;
    let mut min_lng = f64::MAX;
    let mut max_lng = f64::MIN;
    let mut seen = false;

    for marker in markers {
        if !include_filtered && marker.filtered {
            continue;
        }
        seen = true;

        let pos = &marker.position;
        if pos.lat < min_lat {
            min_lat = pos.lat;
        }
        if pos.lat > max_lat {
            max_lat = pos.lat;
        }
        if pos.lng < min_lng {
            min_lng = pos.lng;
        }
        if pos.lng > max_lng {
            max_lng = pos.lng;
        }
    }

    seen.then(|| Bounds {
        min_lat,
        max_lat,
        min_lng,
        max_lng,
    })
}

/// Insertion sort by ascending longitude.
///
/// Preferred over a general-purpose sort when the input is already almost
/// sorted, which is the steady state for both the marker list (few changes
/// between views) and the cluster output list. Stable.
pub fn insertion_sort_by_lng<T>(items: &mut [T], lng: impl Fn(&T) -> f64) {
    for i in 1..items.len() {
        let mut j = i;
        while j > 0 && lng(&items[j - 1]) > lng(&items[j]) {
            items.swap(j - 1, j);
            j -= 1;
        }
    }
}

/// Decide whether the marker list should be insertion-sorted.
///
/// The insertion sort wins on almost-sorted input but its worst case is
/// extreme, so it is only used when few changes accumulated since the last
/// sort: never above 300 changes, and below that only when changes stay
/// under 20% of the collection.
pub fn should_use_insertion_sort(total: usize, changes: usize) -> bool {
    if changes > 300 {
        false
    } else {
        (changes as f64 / total as f64) < 0.2
    }
}

/// First index whose marker longitude is `>= lng`.
///
/// `std::lower_bound` semantics over a list sorted by ascending longitude;
/// callers must sort first.
pub fn lower_bound_by_lng(markers: &[Marker], lng: f64) -> usize {
    markers.partition_point(|marker| marker.position.lng < lng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::HashCounter;

    fn markers_at(positions: &[(f64, f64)]) -> Vec<Marker> {
        let mut counter = HashCounter::new();
        positions
            .iter()
            .map(|&(lat, lng)| Marker::new(lat, lng, &mut counter).unwrap())
            .collect()
    }

    #[test]
    fn test_compute_bounds_reduction() {
        let markers = markers_at(&[(10.0, 20.0), (30.0, 40.0)]);
        let bounds = compute_bounds(&markers, true).unwrap();
        assert_eq!(bounds, Bounds::new(10.0, 30.0, 20.0, 40.0));
    }

    #[test]
    fn test_compute_bounds_empty_is_none() {
        assert!(compute_bounds(&[], true).is_none());
    }

    #[test]
    fn test_compute_bounds_fully_filtered_is_none() {
        let mut markers = markers_at(&[(1.0, 2.0), (3.0, 4.0)]);
        for marker in &mut markers {
            marker.filtered = true;
        }
        assert!(compute_bounds(&markers, false).is_none());
        // Filtered markers still count when explicitly included.
        assert!(compute_bounds(&markers, true).is_some());
    }

    #[test]
    fn test_insertion_sort_orders_by_lng() {
        let mut markers = markers_at(&[(0.0, 5.0), (0.0, 1.0), (0.0, 3.0), (0.0, 2.0)]);
        insertion_sort_by_lng(&mut markers, |m| m.position.lng);
        let lngs: Vec<f64> = markers.iter().map(|m| m.position.lng).collect();
        assert_eq!(lngs, vec![1.0, 2.0, 3.0, 5.0]);
    }

    #[test]
    fn test_insertion_sort_is_stable() {
        let mut items = vec![(1.0, 'a'), (0.0, 'b'), (1.0, 'c'), (0.0, 'd')];
        insertion_sort_by_lng(&mut items, |item| item.0);
        assert_eq!(items, vec![(0.0, 'b'), (0.0, 'd'), (1.0, 'a'), (1.0, 'c')]);
    }

    #[test]
    fn test_sort_heuristic_boundaries() {
        assert!(!should_use_insertion_sort(1000, 300));
        assert!(should_use_insertion_sort(1000, 100));
        assert!(!should_use_insertion_sort(1000, 301));
        // 300 changes over a huge collection still falls under the ratio cut.
        assert!(should_use_insertion_sort(10_000, 300));
        // Above the hard cap the ratio never matters.
        assert!(!should_use_insertion_sort(1_000_000, 301));
    }

    #[test]
    fn test_lower_bound_by_lng() {
        let markers = markers_at(&[(0.0, 1.0), (0.0, 3.0), (0.0, 3.0), (0.0, 7.0)]);
        assert_eq!(lower_bound_by_lng(&markers, 0.0), 0);
        assert_eq!(lower_bound_by_lng(&markers, 3.0), 1);
        assert_eq!(lower_bound_by_lng(&markers, 4.0), 3);
        assert_eq!(lower_bound_by_lng(&markers, 8.0), 4);
    }
}
