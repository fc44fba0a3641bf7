//! Sprinkler system facade.
//!
//! Owns the configuration and the optional obstacle mesh, and caches the
//! last coverage sweep. Replacing either input drops the cached result;
//! the sweep reruns on the next read.

use crate::boundary::BoundaryChecker;
use crate::config::SprinklerConfig;
use crate::coverage::{CoverageSummary, CoverageSweep, SprayPoint, SweepOptions};
use crate::error::Result;
use crate::geometry::Point3D;
use crate::mesh::ObstacleMesh;
use crate::trajectory::{JetSpline, Parabolic};
use once_cell::unsync::OnceCell;
use tracing::debug;

#[derive(Debug)]
pub struct SprinklerSystem {
    config: SprinklerConfig,
    mesh: Option<ObstacleMesh>,
    options: SweepOptions,
    coverage: OnceCell<Vec<SprayPoint>>,
}

impl SprinklerSystem {
    /// Validate the configuration and build a system without obstacles
    pub fn new(config: SprinklerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            mesh: None,
            options: SweepOptions::default(),
            coverage: OnceCell::new(),
        })
    }

    pub fn with_mesh(mut self, mesh: ObstacleMesh) -> Self {
        self.set_mesh(mesh);
        self
    }

    pub fn with_options(mut self, options: SweepOptions) -> Self {
        self.options = options;
        self.invalidate();
        self
    }

    pub fn config(&self) -> &SprinklerConfig {
        &self.config
    }

    pub fn mesh(&self) -> Option<&ObstacleMesh> {
        self.mesh.as_ref()
    }

    pub fn options(&self) -> &SweepOptions {
        &self.options
    }

    /// Swap in a new configuration; the old one stays if validation fails
    pub fn replace_config(&mut self, config: SprinklerConfig) -> Result<()> {
        config.validate()?;
        self.config = config;
        self.invalidate();
        Ok(())
    }

    pub fn set_mesh(&mut self, mesh: ObstacleMesh) {
        self.mesh = Some(mesh);
        self.invalidate();
    }

    pub fn clear_mesh(&mut self) {
        self.mesh = None;
        self.invalidate();
    }

    /// Drop the cached sweep
    pub fn invalidate(&mut self) {
        if self.coverage.take().is_some() {
            debug!("coverage cache invalidated");
        }
    }

    /// Whether a sweep result is currently cached
    pub fn is_cached(&self) -> bool {
        self.coverage.get().is_some()
    }

    fn sweep(&self) -> CoverageSweep<'_> {
        CoverageSweep::new(&self.config)
            .with_mesh(self.mesh.as_ref())
            .with_options(self.options)
    }

    /// Accepted aims, computed on first use after any change
    pub fn spray_points(&self) -> Result<&[SprayPoint]> {
        let points = self.coverage.get_or_try_init(|| self.sweep().run())?;
        Ok(points)
    }

    /// Recompute the sweep now, discarding any cached result
    pub fn refresh(&mut self) -> Result<&[SprayPoint]> {
        self.coverage = OnceCell::new();
        self.spray_points()
    }

    pub fn coverage_summary(&self) -> Result<CoverageSummary> {
        let evaluated = self.sweep().angle_grid().len();
        Ok(CoverageSummary::from_points(self.spray_points()?, evaluated))
    }

    /// Nozzle position in lawn coordinates
    pub fn spray_origin(&self) -> Point3D {
        self.config.sprinkler_head.position()
    }

    /// Launch speed implied by the configured hose model
    pub fn initial_velocity(&self) -> Result<f64> {
        self.config.hose.initial_velocity()
    }

    pub fn parabolic(&self, h_angle: f64, v_angle: f64) -> Result<Parabolic> {
        let jet = Parabolic::new(self.spray_origin(), self.initial_velocity()?, h_angle, v_angle);
        jet.validate()?;
        Ok(jet)
    }

    /// Sampled jet for one aim using the configured segment count
    pub fn calculate_trajectory(&self, h_angle: f64, v_angle: f64) -> Result<Vec<Point3D>> {
        Ok(self.parabolic(h_angle, v_angle)?.calculate_trajectory(self.options.segments))
    }

    pub fn jet_spline(&self, h_angle: f64, v_angle: f64) -> Result<JetSpline> {
        Ok(self.parabolic(h_angle, v_angle)?.bezier())
    }

    pub fn checker(&self) -> BoundaryChecker<'_> {
        BoundaryChecker::new(self.config.lawn, self.config.boundaries)
            .with_mesh(self.mesh.as_ref())
            .with_max_height(self.options.max_height)
    }

    pub fn is_point_within_boundaries(&self, point: &Point3D) -> bool {
        self.checker().is_within_boundaries(point)
    }
}
