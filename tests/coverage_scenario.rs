use sprinkler_engine::{
    AngleRange, Angles, Boundaries, BoundarySide, CoverageSweep, HoseModel, HosePerformance, Lawn, MeshUnit,
    ObstacleMesh, Point3D, SprinklerConfig, SprinklerHead, SprinklerSystem, SweepOptions,
};
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("config");
    path.push(name);
    path
}

fn garden() -> SprinklerConfig {
    SprinklerConfig {
        lawn: Lawn::new(10.0, 8.0).unwrap(),
        sprinkler_head: SprinklerHead { x: 5.0, y: 4.0, z: 0.5 },
        angles: Angles {
            horizontal: AngleRange::new(-90.0, 90.0, 5.0).unwrap(),
            vertical: AngleRange::new(10.0, 60.0, 5.0).unwrap(),
        },
        hose: HoseModel::Performance(HosePerformance { max_distance: 7.4, optimal_angle: 45.0 }),
        boundaries: Boundaries::default(),
        motors: None,
    }
}

#[test]
fn test_garden_scenario_lands_on_lawn() {
    let system = SprinklerSystem::new(garden()).unwrap();
    let points = system.spray_points().unwrap();

    assert!(!points.is_empty(), "a centred head must reach some of the lawn");
    for p in points {
        assert!(p.distance <= 7.4 + 1e-9, "throw {} exceeds v0²/g", p.distance);
        assert!((0.0..=10.0).contains(&p.end_point.x));
        assert!((0.0..=8.0).contains(&p.end_point.y));
        assert!((p.end_point.z - 0.5).abs() < 1e-12, "landing stays at nozzle height");
    }
}

#[test]
fn test_landing_matches_sampled_trajectory() {
    let system = SprinklerSystem::new(garden()).unwrap();
    let points = system.spray_points().unwrap();
    let first = points[0];

    let flight = system.calculate_trajectory(first.h_angle, first.v_angle).unwrap();
    let last = flight.last().unwrap();
    assert!((last.x - first.end_point.x).abs() < 1e-9);
    assert!((last.y - first.end_point.y).abs() < 1e-9);
    assert!((last.z - 0.5).abs() < 1e-9);
}

#[test]
fn test_sweep_is_idempotent_and_parallel_safe() {
    let config = garden();
    let sweep = CoverageSweep::new(&config);
    let first = sweep.run().unwrap();
    let second = sweep.run().unwrap();
    let parallel = sweep.run_parallel().unwrap();
    assert_eq!(first, second);
    assert_eq!(first, parallel);
}

#[test]
fn test_fence_only_removes_points() {
    let open = CoverageSweep::new(&garden()).run().unwrap();

    let mut fenced_config = garden();
    fenced_config.boundaries.right = Some(BoundarySide { height: 0.6, distance: 4.0 });
    let fenced = CoverageSweep::new(&fenced_config)
        .with_options(SweepOptions::flight_path())
        .run()
        .unwrap();

    assert!(fenced.len() < open.len());
    assert!(fenced.iter().all(|p| open.contains(p)));
}

#[test]
fn test_default_sweep_keeps_arcs_over_fence() {
    let open = CoverageSweep::new(&garden()).run().unwrap();

    // every landing is at 0.5 m, under the 0.6 m ceiling
    let mut fenced_config = garden();
    fenced_config.boundaries.right = Some(BoundarySide { height: 0.6, distance: 4.0 });
    let fenced = CoverageSweep::new(&fenced_config).run().unwrap();
    assert_eq!(fenced, open);

    let mut system = SprinklerSystem::new(fenced_config).unwrap();
    assert_eq!(system.spray_points().unwrap(), open.as_slice());
    system = system.with_options(SweepOptions::flight_path());
    assert!(system.spray_points().unwrap().len() < open.len());
}

#[test]
fn test_unreachable_lawn_yields_empty_result() {
    let mut config = garden();
    config.lawn = Lawn::new(2.0, 2.0).unwrap();
    config.sprinkler_head = SprinklerHead { x: 1.0, y: 1.0, z: 0.5 };

    let system = SprinklerSystem::new(config).unwrap();
    assert!(system.spray_points().unwrap().is_empty());
    assert_eq!(system.coverage_summary().unwrap().max_distance, None);
}

#[test]
fn test_mesh_canopy_blocks_every_arc() {
    let mut system = SprinklerSystem::new(garden()).unwrap();
    system.set_mesh(ObstacleMesh::from_file(fixture("canopy_mesh.json")).unwrap());
    // landing points at 0.5 m stay under the 0.6 m canopy
    assert!(!system.spray_points().unwrap().is_empty());

    let flight_checked = CoverageSweep::new(system.config())
        .with_mesh(system.mesh())
        .with_options(SweepOptions::flight_path())
        .run()
        .unwrap();
    assert!(flight_checked.is_empty());
}

#[test]
fn test_mesh_in_meters_matches_millimeters() {
    let mm = ObstacleMesh::new(
        vec![[[0.0, 0.0, 1000.0], [10_000.0, 0.0, 1000.0], [0.0, 8_000.0, 1000.0]]],
        MeshUnit::Millimeters,
    )
    .unwrap();
    let m = ObstacleMesh::new(vec![[[0.0, 0.0, 1.0], [10.0, 0.0, 1.0], [0.0, 8.0, 1.0]]], MeshUnit::Meters).unwrap();

    for z in [0.2, 0.9, 1.1, 3.0] {
        let p = Point3D::new(3.0, 3.0, z);
        assert_eq!(mm.is_point_blocked(&p), m.is_point_blocked(&p));
    }
}

#[test]
fn test_default_fixture_loads() {
    let config = SprinklerConfig::from_file(fixture("default_config.json")).unwrap();
    assert_eq!(config.lawn, Lawn { width: 10.0, length: 8.0 });
    assert!(config.motors.is_some());

    let system = SprinklerSystem::new(config).unwrap();
    assert!(!system.spray_points().unwrap().is_empty());
}

#[test]
fn test_calibrated_fixture_matches_performance_model() {
    let calibrated = SprinklerConfig::from_file(fixture("calibrated_hose.json")).unwrap();
    let v_cal = calibrated.hose.initial_velocity().unwrap();
    let v_perf = garden().hose.initial_velocity().unwrap();
    // both reduce to sqrt(7.4·g) for a 45° optimum
    assert!((v_cal - v_perf).abs() < 1e-9);
}
