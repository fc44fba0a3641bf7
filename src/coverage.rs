//! Coverage sweep over the configured angle grid.
//!
//! For every `(h_angle, v_angle)` pair, horizontal outer loop and
//! vertical inner loop, the jet is computed from the hydraulic model and
//! kept when it lands on the lawn and clears every boundary. The result
//! is rebuilt from scratch on each run; an empty result is a valid
//! outcome, not an error.

use crate::boundary::BoundaryChecker;
use crate::config::SprinklerConfig;
use crate::constants::{DEFAULT_SEGMENTS, MAX_SPRAY_HEIGHT_M};
use crate::error::Result;
use crate::geometry::Point3D;
use crate::mesh::ObstacleMesh;
use crate::trajectory::Parabolic;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, warn};

/// One accepted aim with where the jet lands
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SprayPoint {
    pub h_angle: f64, // degrees
    pub v_angle: f64, // degrees
    /// Signed throw along the aim direction, meters: `v0·cos(v)·t_max`.
    ///
    /// Negative for pitches above 90°, where the jet lands behind the
    /// head (`end_point` then lies opposite `h_angle`). Zero for flat and
    /// downward aims, which land at the nozzle.
    pub distance: f64,
    pub end_point: Point3D, // landing point at nozzle height
}

/// Sweep settings. The default tests landing points only; see
/// [`SweepOptions::flight_path`] for the stricter whole-jet check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepOptions {
    /// Segments per sampled jet when checking the flight path
    pub segments: usize,
    /// Also require every flight sample after launch to clear the edge
    /// ceilings, the height cap and the mesh
    pub check_trajectory: bool,
    /// Height cap in meters
    pub max_height: f64,
}

impl Default for SweepOptions {
    fn default() -> Self {
        Self::landing_only()
    }
}

impl SweepOptions {
    /// A shot is kept iff its landing point passes the point rule
    pub fn landing_only() -> Self {
        Self {
            segments: DEFAULT_SEGMENTS,
            check_trajectory: false,
            max_height: MAX_SPRAY_HEIGHT_M,
        }
    }

    /// Landing point plus every sampled flight point must clear
    pub fn flight_path() -> Self {
        Self {
            check_trajectory: true,
            ..Self::landing_only()
        }
    }
}

pub struct CoverageSweep<'a> {
    config: &'a SprinklerConfig,
    mesh: Option<&'a ObstacleMesh>,
    options: SweepOptions,
}

impl<'a> CoverageSweep<'a> {
    pub fn new(config: &'a SprinklerConfig) -> Self {
        Self {
            config,
            mesh: None,
            options: SweepOptions::default(),
        }
    }

    pub fn with_mesh(mut self, mesh: Option<&'a ObstacleMesh>) -> Self {
        self.mesh = mesh;
        self
    }

    pub fn with_options(mut self, options: SweepOptions) -> Self {
        self.options = options;
        self
    }

    fn checker(&self) -> BoundaryChecker<'a> {
        BoundaryChecker::new(self.config.lawn, self.config.boundaries)
            .with_mesh(self.mesh)
            .with_max_height(self.options.max_height)
    }

    /// Angle pairs in sweep order: horizontal ascending, then vertical ascending
    pub fn angle_grid(&self) -> Vec<(f64, f64)> {
        let vertical = self.config.angles.vertical.angles();
        self.config
            .angles
            .horizontal
            .angles()
            .into_iter()
            .flat_map(|h| vertical.iter().map(move |&v| (h, v)))
            .collect()
    }

    /// Evaluate a single aim; `None` if the shot is rejected
    fn evaluate(&self, checker: &BoundaryChecker, velocity: f64, h_angle: f64, v_angle: f64) -> Option<SprayPoint> {
        let start = self.config.sprinkler_head.position();
        let jet = Parabolic::new(start, velocity, h_angle, v_angle);

        let distance = jet.range();
        let end_point = jet.landing_point();
        if !distance.is_finite() || !end_point.is_finite() {
            warn!(h_angle, v_angle, "skipping non-finite landing point");
            return None;
        }

        let accepted = if self.options.check_trajectory {
            let flight = jet.calculate_trajectory(self.options.segments);
            checker.accepts_shot(&end_point, Some(&flight))
        } else {
            checker.accepts_shot(&end_point, None)
        };

        accepted.then_some(SprayPoint {
            h_angle,
            v_angle,
            distance,
            end_point,
        })
    }

    /// Sequential sweep
    pub fn run(&self) -> Result<Vec<SprayPoint>> {
        let velocity = self.config.hose.initial_velocity()?;
        let checker = self.checker();
        let grid = self.angle_grid();

        let points: Vec<SprayPoint> = grid
            .iter()
            .filter_map(|&(h, v)| self.evaluate(&checker, velocity, h, v))
            .collect();

        debug!(evaluated = grid.len(), accepted = points.len(), velocity, "coverage sweep finished");
        Ok(points)
    }

    /// Parallel sweep with the same ordering as [`CoverageSweep::run`].
    ///
    /// Each angle pair is evaluated independently; the indexed collect
    /// keeps results in grid order.
    pub fn run_parallel(&self) -> Result<Vec<SprayPoint>> {
        let velocity = self.config.hose.initial_velocity()?;
        let checker = self.checker();
        let grid = self.angle_grid();

        let evaluated: Vec<Option<SprayPoint>> = grid
            .par_iter()
            .map(|&(h, v)| self.evaluate(&checker, velocity, h, v))
            .collect();
        let points: Vec<SprayPoint> = evaluated.into_iter().flatten().collect();

        debug!(evaluated = grid.len(), accepted = points.len(), velocity, "parallel coverage sweep finished");
        Ok(points)
    }

    /// Run and summarize
    pub fn summarize(&self) -> Result<(Vec<SprayPoint>, CoverageSummary)> {
        let points = self.run()?;
        let summary = CoverageSummary::from_points(&points, self.angle_grid().len());
        Ok((points, summary))
    }
}

/// Aggregate view of a sweep result
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CoverageSummary {
    pub evaluated: usize,
    pub accepted: usize,
    pub min_distance: Option<f64>,
    pub max_distance: Option<f64>,
    pub min_h_angle: Option<f64>,
    pub max_h_angle: Option<f64>,
}

impl CoverageSummary {
    pub fn from_points(points: &[SprayPoint], evaluated: usize) -> Self {
        let (min_distance, max_distance) = min_max(points.iter().map(|p| p.distance));
        let (min_h_angle, max_h_angle) = min_max(points.iter().map(|p| p.h_angle));

        Self {
            evaluated,
            accepted: points.len(),
            min_distance,
            max_distance,
            min_h_angle,
            max_h_angle,
        }
    }

    /// Degrees of yaw between the outermost accepted aims
    pub fn horizontal_span(&self) -> f64 {
        match (self.min_h_angle, self.max_h_angle) {
            (Some(lo), Some(hi)) => hi - lo,
            _ => 0.0,
        }
    }

    /// Share of the grid that was accepted, 0..=1
    pub fn acceptance_ratio(&self) -> f64 {
        if self.evaluated == 0 {
            0.0
        } else {
            self.accepted as f64 / self.evaluated as f64
        }
    }
}

fn min_max(values: impl Iterator<Item = f64>) -> (Option<f64>, Option<f64>) {
    values.fold((None, None), |(lo, hi): (Option<f64>, Option<f64>), x| {
        (Some(lo.map_or(x, |lo| lo.min(x))), Some(hi.map_or(x, |hi| hi.max(x))))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        AngleRange, Angles, Boundaries, BoundarySide, HoseModel, HosePerformance, Lawn, SprinklerHead,
    };

    fn config() -> SprinklerConfig {
        SprinklerConfig {
            lawn: Lawn { width: 10.0, length: 8.0 },
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
    fn test_grid_order() {
        let cfg = config();
        let grid = CoverageSweep::new(&cfg).angle_grid();
        assert_eq!(grid.len(), 37 * 11);
        assert_eq!(grid[0], (-90.0, 10.0));
        assert_eq!(grid[1], (-90.0, 15.0));
        assert_eq!(grid[11], (-85.0, 10.0));
        assert_eq!(*grid.last().unwrap(), (90.0, 60.0));
    }

    #[test]
    fn test_sweep_is_non_empty_and_on_lawn() {
        let cfg = config();
        let points = CoverageSweep::new(&cfg).run().unwrap();
        assert!(!points.is_empty());
        for p in &points {
            assert!(p.distance <= 7.4 + 1e-9);
            assert!((0.0..=10.0).contains(&p.end_point.x));
            assert!((0.0..=8.0).contains(&p.end_point.y));
        }
    }

    #[test]
    fn test_sweep_output_is_ordered() {
        let cfg = config();
        let points = CoverageSweep::new(&cfg).run().unwrap();
        for pair in points.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            assert!(a.h_angle < b.h_angle || (a.h_angle == b.h_angle && a.v_angle < b.v_angle));
        }
    }

    #[test]
    fn test_sweep_is_idempotent() {
        let cfg = config();
        let sweep = CoverageSweep::new(&cfg);
        assert_eq!(sweep.run().unwrap(), sweep.run().unwrap());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let mut cfg = config();
        cfg.boundaries.left = Some(BoundarySide { height: 1.0, distance: 2.0 });
        let sweep = CoverageSweep::new(&cfg);
        assert_eq!(sweep.run().unwrap(), sweep.run_parallel().unwrap());
    }

    #[test]
    fn test_tiny_lawn_gives_empty_result() {
        let mut cfg = config();
        // shortest throw (10°) is ~2.5 m, farther than any corner
        cfg.lawn = Lawn { width: 2.0, length: 2.0 };
        cfg.sprinkler_head = SprinklerHead { x: 1.0, y: 1.0, z: 0.5 };
        let points = CoverageSweep::new(&cfg).run().unwrap();
        assert!(points.is_empty());

        let summary = CoverageSummary::from_points(&points, 10);
        assert_eq!(summary.accepted, 0);
        assert_eq!(summary.max_distance, None);
        assert_eq!(summary.acceptance_ratio(), 0.0);
    }

    #[test]
    fn test_low_ceiling_removes_high_arcs() {
        let mut cfg = config();
        let open = CoverageSweep::new(&cfg).run().unwrap();

        // a low ceiling around the whole lawn edge
        let side = Some(BoundarySide { height: 1.0, distance: 3.0 });
        cfg.boundaries = Boundaries { left: side, right: side, back: side, front: side };
        let fenced = CoverageSweep::new(&cfg)
            .with_options(SweepOptions::flight_path())
            .run()
            .unwrap();
        assert!(fenced.len() < open.len());

        // the default check ignores the arc and only sees the landing height (0.5 m)
        let landing_only = CoverageSweep::new(&cfg).run().unwrap();
        assert_eq!(landing_only.len(), open.len());
    }

    #[test]
    fn test_default_options_check_landing_only() {
        let options = SweepOptions::default();
        assert_eq!(options, SweepOptions::landing_only());
        assert!(!options.check_trajectory);
        assert!(SweepOptions::flight_path().check_trajectory);
        assert_eq!(SweepOptions::flight_path().segments, DEFAULT_SEGMENTS);
    }

    #[test]
    fn test_steep_pitch_lands_behind_head() {
        let mut cfg = config();
        cfg.angles = Angles {
            horizontal: AngleRange::new(0.0, 0.0, 1.0).unwrap(),
            vertical: AngleRange::new(110.0, 110.0, 1.0).unwrap(),
        };
        let points = CoverageSweep::new(&cfg).run().unwrap();
        assert_eq!(points.len(), 1);

        let p = points[0];
        // 7.4 · sin(220°)
        assert!((p.distance - 7.4 * 220f64.to_radians().sin()).abs() < 1e-9);
        assert!(p.distance < 0.0);
        assert!(p.end_point.x < 5.0);
        let head = cfg.sprinkler_head.position();
        assert!((head.horizontal_distance_to(p.end_point) - p.distance.abs()).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_hose_is_reported() {
        let mut cfg = config();
        cfg.hose = HoseModel::Performance(HosePerformance { max_distance: 7.4, optimal_angle: 90.0 });
        assert!(CoverageSweep::new(&cfg).run().is_err());
    }

    #[test]
    fn test_summary() {
        let cfg = config();
        let (points, summary) = CoverageSweep::new(&cfg).summarize().unwrap();
        assert_eq!(summary.accepted, points.len());
        assert_eq!(summary.evaluated, 37 * 11);
        assert!(summary.max_distance.unwrap() <= 7.4 + 1e-9);
        assert!(summary.min_distance.unwrap() > 0.0);
        assert!(summary.acceptance_ratio() > 0.0 && summary.acceptance_ratio() <= 1.0);
    }
}
