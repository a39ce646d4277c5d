use gridclust::{
    Backend, Bounds, ClusterEngine, Config, EngineBuilder, FnProjector, HashCounter, Marker,
    PixelPoint, Position, SphericalMercator, SweepEngine, TreeEngine,
};

fn markers_at(positions: &[(f64, f64)], counter: &mut HashCounter) -> Vec<Marker> {
    positions
        .iter()
        .map(|&(lat, lng)| Marker::new(lat, lng, counter).expect("valid marker"))
        .collect()
}

/// Every registered, unfiltered marker ends up in exactly one cluster.
#[test]
fn test_population_conservation() {
    let mut counter = HashCounter::new();
    let mut engine = SweepEngine::new();

    let mut positions = Vec::new();
    for i in 0..500 {
        let lat = -60.0 + (i as f64 * 0.23) % 120.0;
        let lng = -170.0 + (i as f64 * 0.71) % 340.0;
        positions.push((lat, lng));
    }
    engine.register_markers(markers_at(&positions, &mut counter));

    let projector = SphericalMercator::new(3);
    let clusters = engine.process_view(&Bounds::FULL_MAP, &projector);

    let total: usize = clusters.iter().map(|c| c.population).sum();
    assert_eq!(total, engine.population());
    assert_eq!(total, 500);
}

/// Both backends agree on totals and global bounds for the same input.
#[test]
fn test_backends_agree() {
    let positions: Vec<(f64, f64)> = (0..200)
        .map(|i| (((i * 7) % 120) as f64 - 60.0, ((i * 13) % 340) as f64 - 170.0))
        .collect();

    let mut counter = HashCounter::new();
    let mut sweep = SweepEngine::new();
    sweep.register_markers(markers_at(&positions, &mut counter));

    let mut counter = HashCounter::new();
    let mut tree = TreeEngine::new();
    tree.register_markers(markers_at(&positions, &mut counter));

    assert_eq!(sweep.population(), tree.population());
    assert_eq!(
        sweep.compute_global_bounds(true),
        tree.compute_global_bounds(true)
    );

    let projector = SphericalMercator::new(4);
    let sweep_total: usize = sweep
        .process_view(&Bounds::FULL_MAP, &projector)
        .iter()
        .map(|c| c.population)
        .sum();
    let tree_total: usize = tree
        .process_view(&Bounds::FULL_MAP, &projector)
        .iter()
        .map(|c| c.population)
        .sum();

    assert_eq!(sweep_total, tree_total);
    assert_eq!(sweep_total, 200);
}

/// Cluster bounds are congruent across repeated calls at a fixed zoom, even
/// when the viewport pans.
#[test]
fn test_grid_snapped_bounds_stable_while_panning() {
    let mut counter = HashCounter::new();
    let mut engine = SweepEngine::new();
    engine.register_markers(markers_at(&[(45.0, 7.0)], &mut counter));

    let projector = SphericalMercator::new(10);

    let first = engine
        .process_view(&Bounds::new(44.0, 46.0, 6.0, 8.0), &projector)
        .to_vec();
    assert_eq!(first.len(), 1);

    let panned = engine
        .process_view(&Bounds::new(44.1, 46.1, 6.1, 8.1), &projector)
        .to_vec();
    assert_eq!(panned.len(), 1);

    assert_eq!(first[0].bounds, panned[0].bounds);
    assert!(first[0].bounds.contains(&Position::new(45.0, 7.0)));
}

/// Changing zoom between calls re-snaps retained clusters to the new grid.
#[test]
fn test_zoom_change_resnaps_bounds() {
    let mut counter = HashCounter::new();
    let mut engine = SweepEngine::new();
    engine.register_markers(markers_at(&[(45.0, 7.0)], &mut counter));

    let view = Bounds::new(44.0, 46.0, 6.0, 8.0);
    let coarse = engine
        .process_view(&view, &SphericalMercator::new(5))
        .to_vec();
    let fine = engine
        .process_view(&view, &SphericalMercator::new(12))
        .to_vec();

    assert_eq!(coarse.len(), 1);
    assert_eq!(fine.len(), 1);
    // A cell at zoom 12 is far smaller than one at zoom 5.
    let coarse_extent = coarse[0].bounds.max_lng - coarse[0].bounds.min_lng;
    let fine_extent = fine[0].bounds.max_lng - fine[0].bounds.min_lng;
    assert!(fine_extent < coarse_extent);
}

/// Registering A and B then removing A leaves only B.
#[test]
fn test_removal_correctness() {
    let mut counter = HashCounter::new();
    let a = Marker::new(1.0, 1.0, &mut counter).unwrap();
    let b = Marker::new(2.0, 2.0, &mut counter).unwrap();
    let a_hash = a.hash_code();
    let b_hash = b.hash_code();

    let mut engine = SweepEngine::new();
    engine.register_marker(a);
    engine.register_marker(b);

    engine.remove_markers(&[a_hash]);

    let remaining = engine.markers();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].hash_code(), b_hash);
}

/// Member lists record the identity of every clustered marker when enabled.
#[test]
fn test_member_list_via_builder() {
    let mut counter = HashCounter::new();
    let mut engine = EngineBuilder::new()
        .backend(Backend::Sweep)
        .member_list(true)
        .build()
        .unwrap();

    engine.register_markers(markers_at(&[(10.0, 20.0), (10.0, 20.0)], &mut counter));

    let projector = SphericalMercator::new(10);
    let clusters = engine.process_view(&Bounds::new(0.0, 20.0, 10.0, 30.0), &projector);

    assert_eq!(clusters.len(), 1);
    let mut members = clusters[0].members().expect("member list enabled").to_vec();
    members.sort_unstable();
    assert_eq!(members, vec![1, 2]);
}

/// Weighted markers pull the cluster average toward themselves.
#[test]
fn test_weighted_average_position() {
    let mut counter = HashCounter::new();
    let light = Marker::new(0.0, 0.0, &mut counter)
        .unwrap()
        .with_weight(1.0)
        .unwrap();
    let heavy = Marker::new(0.0, 0.001, &mut counter)
        .unwrap()
        .with_weight(9.0)
        .unwrap();

    let mut engine = SweepEngine::new();
    engine.register_marker(light);
    engine.register_marker(heavy);

    let projector = SphericalMercator::new(2);
    let clusters = engine.process_view(&Bounds::FULL_MAP, &projector);
    assert_eq!(clusters.len(), 1);
    assert!((clusters[0].average_position.lng - 0.0009).abs() < 1e-12);
}

/// The engine works with arbitrary caller-supplied projection closures.
#[test]
fn test_custom_projector_closures() {
    // Equirectangular: one pixel per degree, y flipped.
    let projector = FnProjector::new(
        |pos: Position| PixelPoint::new(pos.lng + 180.0, 90.0 - pos.lat),
        |point: PixelPoint| Position::new(90.0 - point.y, point.x - 180.0),
    );

    let mut counter = HashCounter::new();
    let mut engine = EngineBuilder::new().size(10.0).build().unwrap();
    engine.register_markers(markers_at(&[(0.5, 0.5), (0.6, 0.6), (55.0, 55.0)], &mut counter));

    let clusters = engine.process_view(&Bounds::FULL_MAP, &projector);
    let total: usize = clusters.iter().map(|c| c.population).sum();
    assert_eq!(total, 3);

    // The two nearby markers share a 10-degree cell; the third does not.
    assert_eq!(clusters.len(), 2);
}

/// Repeated passes with no registry mutation yield identical results.
#[test]
fn test_idempotence_under_no_change() {
    let mut counter = HashCounter::new();
    let positions: Vec<(f64, f64)> = (0..50)
        .map(|i| (((i * 3) % 100) as f64 - 50.0, ((i * 11) % 300) as f64 - 150.0))
        .collect();

    let mut engine = TreeEngine::with_config(Config::default());
    engine.register_markers(markers_at(&positions, &mut counter));

    let projector = SphericalMercator::new(4);
    let view = Bounds::new(-60.0, 60.0, -160.0, 160.0);

    let summarize = |clusters: &[gridclust::Cluster]| {
        clusters
            .iter()
            .map(|c| (c.population, c.bounds, c.average_position))
            .collect::<Vec<_>>()
    };

    let first = summarize(engine.process_view(&view, &projector));
    let second = summarize(engine.process_view(&view, &projector));
    assert_eq!(first, second);
}

/// Area queries and their bounds reduction compose.
#[test]
fn test_find_markers_bounds_in_area() {
    let mut counter = HashCounter::new();
    let mut engine = SweepEngine::new();
    engine.register_markers(markers_at(
        &[(10.0, 20.0), (30.0, 40.0), (80.0, 170.0)],
        &mut counter,
    ));

    let area = Bounds::new(0.0, 50.0, 0.0, 50.0);
    let bounds = engine.find_markers_bounds_in_area(&area).unwrap();
    assert_eq!(bounds, Bounds::new(10.0, 30.0, 20.0, 40.0));
}
