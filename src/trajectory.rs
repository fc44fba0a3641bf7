//! Trajectory engine.
//!
//! Two representations of the same jet:
//!
//! * [`Parabolic`]: the ideal (drag free) ballistic curve sampled at
//!   evenly spaced times between launch and landing.
//! * [`JetSpline`]: a cubic Bezier anchored at the true apex height and
//!   landing distance. It is a shape approximation for rendering and
//!   coverage estimates, not an exact resample of the parabola.
//!
//! Height convention: ground is `z = 0`. The sampled parabola starts at
//! the nozzle and lands back at the nozzle height (`start.z`); the
//! Bezier end point lies on the ground.

use crate::constants::{GRAVITY_MPS2, LITERS_PER_M3, SECONDS_PER_MINUTE};
use crate::error::{Result, SprinklerError};
use crate::geometry::{ground_direction, Point3D};
use crate::hydraulics::{circle_area_mm2, velocity_from_pressure};
use serde::Serialize;

/// Pair of flat tuples describing one rendered line segment
pub type LineSegment = ((f64, f64, f64), (f64, f64, f64));

/// Ideal projectile launched from `start_position`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Parabolic {
    pub start_position: Point3D,
    pub initial_velocity: f64,   // m/s
    pub horizontal_angle: f64,   // degrees, yaw around z
    pub vertical_angle: f64,     // degrees above horizontal
    pub gravity: f64,            // m/s²
}

impl Parabolic {
    pub fn new(
        start_position: Point3D,
        initial_velocity: f64,
        horizontal_angle: f64,
        vertical_angle: f64,
    ) -> Self {
        Self {
            start_position,
            initial_velocity,
            horizontal_angle,
            vertical_angle,
            gravity: GRAVITY_MPS2,
        }
    }

    pub fn with_gravity(mut self, gravity: f64) -> Self {
        self.gravity = gravity;
        self
    }

    /// Reject inputs that would poison every derived value with NaN
    pub fn validate(&self) -> Result<()> {
        let inputs = [
            ("initial_velocity", self.initial_velocity),
            ("horizontal_angle", self.horizontal_angle),
            ("vertical_angle", self.vertical_angle),
        ];
        for (name, value) in inputs {
            if !value.is_finite() {
                return Err(SprinklerError::Trajectory(format!("{name} must be finite, got {value}")));
            }
        }
        if self.initial_velocity < 0.0 {
            return Err(SprinklerError::Trajectory(format!(
                "initial_velocity cannot be negative ({})",
                self.initial_velocity
            )));
        }
        if !(self.gravity > 0.0) || !self.gravity.is_finite() {
            return Err(SprinklerError::Trajectory(format!("gravity must be positive, got {}", self.gravity)));
        }
        if !self.start_position.is_finite() {
            return Err(SprinklerError::Trajectory("start position must be finite".to_string()));
        }
        Ok(())
    }

    fn components(&self) -> (f64, f64, f64, f64) {
        let v_rad = self.vertical_angle.to_radians();
        let h_rad = self.horizontal_angle.to_radians();
        (v_rad.sin(), v_rad.cos(), h_rad.sin(), h_rad.cos())
    }

    /// Total time until the jet returns to launch height.
    ///
    /// Zero for flat or downward aims and for a zero velocity jet; those
    /// have no flight phase.
    pub fn flight_time(&self) -> f64 {
        let (sin_v, _, _, _) = self.components();
        let t_max = 2.0 * self.initial_velocity * sin_v / self.gravity;
        if t_max.is_finite() && t_max > 0.0 {
            t_max
        } else {
            0.0
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.flight_time() <= 0.0
    }

    /// Horizontal distance covered until landing
    pub fn range(&self) -> f64 {
        let (_, cos_v, _, _) = self.components();
        self.initial_velocity * cos_v * self.flight_time()
    }

    /// Highest point above ground reached by the jet
    pub fn apex_height(&self) -> f64 {
        if self.is_degenerate() {
            return self.start_position.z;
        }
        let (sin_v, _, _, _) = self.components();
        let vz = self.initial_velocity * sin_v;
        self.start_position.z + vz * vz / (2.0 * self.gravity)
    }

    /// Position at time `t` seconds after launch
    pub fn point_at(&self, t: f64) -> Point3D {
        let (sin_v, cos_v, sin_h, cos_h) = self.components();
        let v0 = self.initial_velocity;
        let offset = Point3D::new(
            v0 * t * cos_v * cos_h,
            v0 * t * cos_v * sin_h,
            v0 * t * sin_v - 0.5 * self.gravity * t * t,
        );
        self.start_position + offset
    }

    /// Landing point at launch height
    pub fn landing_point(&self) -> Point3D {
        let direction = ground_direction(self.horizontal_angle);
        self.start_position + direction * self.range()
    }

    /// Trajectory as `num_segments + 1` points from launch to landing.
    ///
    /// A degenerate flight yields the single launch point.
    pub fn calculate_trajectory(&self, num_segments: usize) -> Vec<Point3D> {
        let t_max = self.flight_time();
        if t_max <= 0.0 || num_segments == 0 {
            return vec![self.start_position];
        }

        let t_step = t_max / num_segments as f64;
        let mut points: Vec<Point3D> = (0..num_segments).map(|i| self.point_at(i as f64 * t_step)).collect();
        // exact landing sample instead of the accumulated last step
        points.push(self.landing_point());
        points
    }

    /// Trajectory as consecutive line segments for rendering
    pub fn line_segments(&self, num_segments: usize) -> Vec<LineSegment> {
        to_line_segments(&self.calculate_trajectory(num_segments))
    }

    /// Closed-form Bezier approximation of this jet
    pub fn bezier(&self) -> JetSpline {
        JetSpline::from_parabolic(self)
    }
}

impl Default for Parabolic {
    fn default() -> Self {
        Self::new(Point3D::origin(), 0.0, 0.0, 0.0)
    }
}

/// Cubic Bezier jet: start, two control points, end
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct JetSpline {
    pub start: Point3D,
    pub control1: Point3D,
    pub control2: Point3D,
    pub end: Point3D,
}

impl JetSpline {
    /// Anchor the curve at the true apex height and landing distance.
    ///
    /// `control1` sits a third of the way out at apex height, `control2`
    /// two thirds out halfway between apex and ground, `end` on the
    /// ground.
    pub fn from_parabolic(jet: &Parabolic) -> Self {
        let start = jet.start_position;
        let direction = ground_direction(jet.horizontal_angle);
        let max_distance = jet.range();
        let max_height = jet.apex_height();

        let end = (start + direction * max_distance).with_z(0.0);
        let control1 = (start + direction * (max_distance / 3.0)).with_z(max_height);
        let control2 = (start + direction * (2.0 * max_distance / 3.0)).with_z((max_height + end.z) / 2.0);

        Self { start, control1, control2, end }
    }

    /// Point on the curve, `t` clamped to `[0, 1]`
    pub fn evaluate(&self, t: f64) -> Point3D {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let u = 1.0 - t;
        self.start * (u * u * u)
            + self.control1 * (3.0 * u * u * t)
            + self.control2 * (3.0 * u * t * t)
            + self.end * (t * t * t)
    }

    /// `num_segments + 1` evenly spaced points along the curve
    pub fn sample(&self, num_segments: usize) -> Vec<Point3D> {
        let n = num_segments.max(1);
        (0..=n).map(|i| self.evaluate(i as f64 / n as f64)).collect()
    }

    pub fn control_points(&self) -> [Point3D; 4] {
        [self.start, self.control1, self.control2, self.end]
    }

    /// Ground distance between start and end
    pub fn horizontal_reach(&self) -> f64 {
        self.start.horizontal_distance_to(self.end)
    }
}

/// Aim and nozzle settings of a pressure driven jet
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JetParams {
    pub start_position: Point3D,
    pub horizontal_angle: f64, // degrees
    pub vertical_angle: f64,   // degrees
    pub pressure: f64,         // bar
    pub nozzle_diameter: f64,  // mm
    pub gravity: f64,          // m/s²
}

impl Default for JetParams {
    fn default() -> Self {
        Self {
            start_position: Point3D::origin(),
            horizontal_angle: 0.0,
            vertical_angle: 45.0,
            pressure: 0.5,
            nozzle_diameter: 6.0,
            gravity: GRAVITY_MPS2,
        }
    }
}

/// Water jet whose speed comes from the water pressure at the nozzle
#[derive(Debug, Clone, Copy)]
pub struct WaterJet {
    pub params: JetParams,
}

impl WaterJet {
    pub fn new(params: JetParams) -> Self {
        Self { params }
    }

    pub fn initial_velocity(&self) -> Result<f64> {
        velocity_from_pressure(self.params.pressure)
    }

    pub fn parabolic(&self) -> Result<Parabolic> {
        let jet = Parabolic::new(
            self.params.start_position,
            self.initial_velocity()?,
            self.params.horizontal_angle,
            self.params.vertical_angle,
        )
        .with_gravity(self.params.gravity);
        jet.validate()?;
        Ok(jet)
    }

    pub fn calculate_jet(&self) -> Result<JetSpline> {
        Ok(self.parabolic()?.bezier())
    }

    pub fn calculate_trajectory(&self, num_segments: usize) -> Result<Vec<Point3D>> {
        Ok(self.parabolic()?.calculate_trajectory(num_segments))
    }

    /// Volumetric flow (L/min) leaving the nozzle
    pub fn flow_rate_lpm(&self) -> Result<f64> {
        let area_m2 = circle_area_mm2(self.params.nozzle_diameter) * 1e-6;
        Ok(area_m2 * self.initial_velocity()? * LITERS_PER_M3 * SECONDS_PER_MINUTE)
    }
}

/// Consecutive point pairs as flat tuples
pub fn to_line_segments(points: &[Point3D]) -> Vec<LineSegment> {
    points
        .windows(2)
        .map(|w| (w[0].to_tuple(), w[1].to_tuple()))
        .collect()
}
