//! Typed sprinkler configuration.
//!
//! The configuration is read once from JSON, validated, and then handed
//! to the hydraulic model, the trajectory engine and the coverage sweep
//! as an immutable value. Derived quantities (velocity, nozzle area,
//! pressure) are never stored here; see [`crate::hydraulics`].

use crate::constants::{MAX_ANGLE_SAMPLES, MAX_GRID_SAMPLES};
use crate::error::{Result, SprinklerError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Lawn dimensions (meters)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lawn {
    pub width: f64,  // x extent, meters
    pub length: f64, // y extent, meters
}

impl Lawn {
    pub fn new(width: f64, length: f64) -> Result<Self> {
        let lawn = Self { width, length };
        lawn.validate()?;
        Ok(lawn)
    }

    pub fn area(&self) -> f64 {
        self.width * self.length
    }

    /// Volume of water in liters for a given rainfall in millimeters.
    /// 1 mm of rain on 1 m² is 1 liter.
    pub fn rain_mm_to_liters(&self, rainfall_mm: f64) -> f64 {
        self.area() * rainfall_mm
    }

    pub fn validate(&self) -> Result<()> {
        require_positive("lawn.width", self.width)?;
        require_positive("lawn.length", self.length)
    }
}

/// Mount point of the nozzle relative to the lawn origin (meters)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SprinklerHead {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl SprinklerHead {
    pub fn position(&self) -> crate::Point3D {
        crate::Point3D::new(self.x, self.y, self.z)
    }

    fn validate(&self) -> Result<()> {
        require_finite("sprinkler_head.x", self.x)?;
        require_finite("sprinkler_head.y", self.y)?;
        require_finite("sprinkler_head.z", self.z)?;
        if self.z < 0.0 {
            return Err(SprinklerError::config(format!(
                "sprinkler_head.z must not be below ground, got {}",
                self.z
            )));
        }
        Ok(())
    }
}

/// A sampled sweep of one angle axis, degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AngleRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial: Option<f64>,
}

impl AngleRange {
    pub fn new(min: f64, max: f64, step: f64) -> Result<Self> {
        let range = Self { min, max, step, initial: None };
        range.validate("angle range")?;
        Ok(range)
    }

    /// Starting angle for the actuator; defaults to `min`
    pub fn initial(&self) -> f64 {
        self.initial.unwrap_or(self.min)
    }

    // Kept in f64 so huge counts can be rejected before any integer cast
    fn sample_count(&self) -> f64 {
        ((self.max - self.min) / self.step + NUMERICAL_SLACK).floor() + 1.0
    }

    /// Number of sampled angles in the range; 0 for a range that fails validation
    pub fn len(&self) -> usize {
        if !(self.step > 0.0) || !(self.max >= self.min) {
            return 0;
        }
        let count = self.sample_count();
        if count.is_finite() && count <= MAX_ANGLE_SAMPLES as f64 {
            count as usize
        } else {
            0
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ascending, inclusive angles `min, min+step, ... <= max`.
    ///
    /// Computed as `min + i*step` so long ranges don't accumulate
    /// rounding drift; the last element is clamped to `max`.
    pub fn angles(&self) -> Vec<f64> {
        (0..self.len())
            .map(|i| (self.min + i as f64 * self.step).min(self.max))
            .collect()
    }

    pub fn validate(&self, field: &str) -> Result<()> {
        require_finite(&format!("{field}.min"), self.min)?;
        require_finite(&format!("{field}.max"), self.max)?;
        require_positive(&format!("{field}.step"), self.step)?;
        if self.max < self.min {
            return Err(SprinklerError::config(format!(
                "{field}: max ({}) is below min ({})",
                self.max, self.min
            )));
        }
        let count = self.sample_count();
        if !(count <= MAX_ANGLE_SAMPLES as f64) {
            return Err(SprinklerError::config(format!(
                "{field}.step ({}) yields {count:e} angles, more than {MAX_ANGLE_SAMPLES}",
                self.step
            )));
        }
        if let Some(initial) = self.initial {
            if !(self.min..=self.max).contains(&initial) {
                return Err(SprinklerError::config(format!(
                    "{field}.initial ({initial}) lies outside [{}, {}]",
                    self.min, self.max
                )));
            }
        }
        Ok(())
    }
}

// Absorbs representation error in (max - min) / step, e.g. 0.3 / 0.1
const NUMERICAL_SLACK: f64 = 1e-9;

/// Horizontal (yaw) and vertical (pitch) angle sweeps
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Angles {
    pub horizontal: AngleRange,
    pub vertical: AngleRange,
}

/// Simplified hose description: the range reached at a known angle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HosePerformance {
    pub max_distance: f64,  // meters, reached at optimal_angle
    pub optimal_angle: f64, // degrees
}

/// Calibrated hose: measured throw and flow of a real garden hose
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hose {
    #[serde(default = "Hose::default_diameter")]
    pub diameter: f64, // hose inner diameter, mm
    #[serde(default = "Hose::default_flow_rate")]
    pub flow_rate: f64, // L/min
    #[serde(default = "Hose::default_max_distance")]
    pub max_distance: f64, // meters, horizontal throw
    #[serde(default = "Hose::default_max_height")]
    pub max_height: f64, // meters, vertical throw
}

impl Hose {
    fn default_diameter() -> f64 {
        25.4 / 2.0 // half inch hose
    }

    fn default_flow_rate() -> f64 {
        11.5
    }

    fn default_max_distance() -> f64 {
        7.4
    }

    fn default_max_height() -> f64 {
        3.35
    }

    /// Replace the measured inputs. Derived values are computed from
    /// these on every [`Hose::specs`] call, so nothing can go stale.
    pub fn calibrate(&mut self, max_distance: f64, max_height: f64, flow_rate: f64) {
        self.max_distance = max_distance;
        self.max_height = max_height;
        self.flow_rate = flow_rate;
    }
}

impl Default for Hose {
    fn default() -> Self {
        Self {
            diameter: Self::default_diameter(),
            flow_rate: Self::default_flow_rate(),
            max_distance: Self::default_max_distance(),
            max_height: Self::default_max_height(),
        }
    }
}

/// Nozzle driven by a known water pressure
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NozzlePressure {
    pub pressure: f64,        // bar
    pub nozzle_diameter: f64, // mm
}

/// Which hydraulic model supplies the initial jet velocity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum HoseModel {
    Performance(HosePerformance),
    Calibration(Hose),
    Pressure(NozzlePressure),
}

impl HoseModel {
    pub fn name(&self) -> &'static str {
        match self {
            HoseModel::Performance(_) => "performance",
            HoseModel::Calibration(_) => "calibration",
            HoseModel::Pressure(_) => "pressure",
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            HoseModel::Performance(p) => {
                require_positive("hose.max_distance", p.max_distance)?;
                require_finite("hose.optimal_angle", p.optimal_angle)?;
                if p.optimal_angle <= 0.0 || p.optimal_angle >= 90.0 {
                    return Err(SprinklerError::config(format!(
                        "hose.optimal_angle must lie strictly between 0° and 90°, got {}°",
                        p.optimal_angle
                    )));
                }
                Ok(())
            }
            HoseModel::Calibration(h) => {
                require_positive("hose.diameter", h.diameter)?;
                require_positive("hose.flow_rate", h.flow_rate)?;
                require_positive("hose.max_distance", h.max_distance)?;
                require_positive("hose.max_height", h.max_height)
            }
            HoseModel::Pressure(n) => {
                require_positive("hose.pressure", n.pressure)?;
                require_positive("hose.nozzle_diameter", n.nozzle_diameter)
            }
        }
    }
}

/// Height ceiling near one lawn edge
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundarySide {
    pub height: f64,   // meters above ground
    pub distance: f64, // meters from the lawn edge
}

/// Optional per-side ceilings (fences, walls, hedges)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Boundaries {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<BoundarySide>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<BoundarySide>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back: Option<BoundarySide>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub front: Option<BoundarySide>,
}

impl Boundaries {
    pub fn is_empty(&self) -> bool {
        self.left.is_none() && self.right.is_none() && self.back.is_none() && self.front.is_none()
    }

    fn validate(&self) -> Result<()> {
        let sides = [
            ("left", self.left),
            ("right", self.right),
            ("back", self.back),
            ("front", self.front),
        ];
        for (name, side) in sides {
            if let Some(side) = side {
                require_non_negative(&format!("boundaries.{name}.height"), side.height)?;
                require_non_negative(&format!("boundaries.{name}.distance"), side.distance)?;
            }
        }
        Ok(())
    }
}

/// Stepper motor wiring and travel limits; only the limits matter to the core
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Motor {
    pub ena_pin: u32,
    pub dir_pin: u32,
    pub pul_pin: u32,
    pub steps_per_revolution: u32,
    pub min_angle: f64,
    pub max_angle: f64,
}

impl Motor {
    pub fn allows(&self, angle: f64) -> bool {
        (self.min_angle..=self.max_angle).contains(&angle)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Motors {
    pub horizontal: Motor,
    pub vertical: Motor,
}

/// Complete configuration for the sprinkler system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SprinklerConfig {
    pub lawn: Lawn,
    #[serde(alias = "sprinkler_position")]
    pub sprinkler_head: SprinklerHead,
    pub angles: Angles,
    pub hose: HoseModel,
    #[serde(default, skip_serializing_if = "Boundaries::is_empty")]
    pub boundaries: Boundaries,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub motors: Option<Motors>,
}

impl SprinklerConfig {
    /// Parse and validate a JSON configuration document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SprinklerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| SprinklerError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&json)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        self.lawn.validate()?;
        self.sprinkler_head.validate()?;
        self.angles.horizontal.validate("angles.horizontal")?;
        self.angles.vertical.validate("angles.vertical")?;
        let grid = self.angles.horizontal.len().checked_mul(self.angles.vertical.len());
        if !grid.is_some_and(|n| n <= MAX_GRID_SAMPLES) {
            return Err(SprinklerError::config(format!(
                "angles: {} x {} pairs exceed the sweep limit of {MAX_GRID_SAMPLES}",
                self.angles.horizontal.len(),
                self.angles.vertical.len()
            )));
        }
        self.hose.validate()?;
        self.boundaries.validate()?;
        if let Some(motors) = &self.motors {
            for (name, motor) in [("horizontal", motors.horizontal), ("vertical", motors.vertical)] {
                if motor.max_angle < motor.min_angle {
                    return Err(SprinklerError::config(format!(
                        "motors.{name}: max_angle ({}) is below min_angle ({})",
                        motor.max_angle, motor.min_angle
                    )));
                }
            }
        }
        Ok(())
    }
}

fn require_finite(field: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SprinklerError::config(format!("{field} must be a finite number, got {value}")))
    }
}

fn require_positive(field: &str, value: f64) -> Result<()> {
    require_finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(SprinklerError::config(format!("{field} must be positive, got {value}")))
    }
}

fn require_non_negative(field: &str, value: f64) -> Result<()> {
    require_finite(field, value)?;
    if value >= 0.0 {
        Ok(())
    } else {
        Err(SprinklerError::config(format!("{field} must not be negative, got {value}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "lawn": {"width": 10.0, "length": 8.0},
        "sprinkler_position": {"x": 5.0, "y": 4.0, "z": 0.5},
        "angles": {
            "horizontal": {"min": -90, "max": 90, "step": 5, "initial": 0},
            "vertical": {"min": 10, "max": 60, "step": 5}
        },
        "hose": {"model": "performance", "max_distance": 7.4, "optimal_angle": 45},
        "boundaries": {"left": {"height": 2.0, "distance": 1.0}}
    }"#;

    #[test]
    fn test_parse_sample_config() {
        let config = SprinklerConfig::from_json_str(SAMPLE).unwrap();
        assert_eq!(config.lawn.width, 10.0);
        assert_eq!(config.sprinkler_head.z, 0.5);
        assert_eq!(config.angles.horizontal.initial(), 0.0);
        assert_eq!(config.angles.vertical.initial(), 10.0);
        assert_eq!(config.hose.name(), "performance");
        assert!(config.boundaries.left.is_some());
        assert!(config.boundaries.right.is_none());
        assert!(config.motors.is_none());
    }

    #[test]
    fn test_json_round_trip_keeps_config() {
        let config = SprinklerConfig::from_json_str(SAMPLE).unwrap();
        let json = config.to_json_pretty().unwrap();
        assert_eq!(SprinklerConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_calibration_defaults() {
        let json = SAMPLE.replace(
            r#"{"model": "performance", "max_distance": 7.4, "optimal_angle": 45}"#,
            r#"{"model": "calibration"}"#,
        );
        let config = SprinklerConfig::from_json_str(&json).unwrap();
        assert_eq!(config.hose, HoseModel::Calibration(Hose::default()));
    }

    #[test]
    fn test_rejects_degenerate_optimal_angle() {
        for angle in ["0", "90"] {
            let json = SAMPLE.replace(r#""optimal_angle": 45"#, &format!(r#""optimal_angle": {angle}"#));
            let err = SprinklerConfig::from_json_str(&json).unwrap_err();
            assert!(matches!(err, SprinklerError::Config(_)));
            assert!(err.to_string().contains("optimal_angle"));
        }
    }

    #[test]
    fn test_rejects_non_positive_lawn() {
        let json = SAMPLE.replace(r#""width": 10.0"#, r#""width": 0.0"#);
        let err = SprinklerConfig::from_json_str(&json).unwrap_err();
        assert!(err.to_string().contains("lawn.width"));

        assert!(Lawn::new(3.0, -1.0).is_err());
    }

    #[test]
    fn test_rejects_missing_field() {
        let json = SAMPLE.replace(r#""lawn": {"width": 10.0, "length": 8.0},"#, "");
        let err = SprinklerConfig::from_json_str(&json).unwrap_err();
        assert_eq!(err.kind(), "parse");
    }

    #[test]
    fn test_lawn_area_and_rain() {
        let lawn = Lawn::new(10.0, 8.0).unwrap();
        assert_eq!(lawn.area(), 80.0);
        assert_eq!(lawn.rain_mm_to_liters(5.0), 400.0);
    }

    #[test]
    fn test_angle_range_sequence() {
        let range = AngleRange::new(-90.0, 90.0, 5.0).unwrap();
        let angles = range.angles();
        assert_eq!(angles.len(), 37);
        assert_eq!(angles[0], -90.0);
        assert_eq!(*angles.last().unwrap(), 90.0);
        assert!(angles.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_angle_range_properties() {
        let cases = [(10.0, 60.0, 5.0), (0.0, 1.0, 0.3), (0.0, 0.3, 0.1), (-5.0, 7.0, 2.5), (3.0, 3.0, 1.0)];
        for (min, max, step) in cases {
            let angles = AngleRange::new(min, max, step).unwrap().angles();
            assert!(!angles.is_empty());
            assert_eq!(angles[0], min);
            assert!(angles.windows(2).all(|w| w[0] < w[1]), "not ascending: {angles:?}");
            assert!(angles.iter().all(|&a| a <= max));
            let last = *angles.last().unwrap();
            assert!(max - step < last && last <= max, "last={last} for ({min},{max},{step})");
        }
    }

    #[test]
    fn test_angle_range_rejects_bad_step() {
        assert!(AngleRange::new(0.0, 10.0, 0.0).is_err());
        assert!(AngleRange::new(0.0, 10.0, -1.0).is_err());
        assert!(AngleRange::new(10.0, 0.0, 1.0).is_err());
    }

    #[test]
    fn test_angle_range_rejects_tiny_step() {
        let err = AngleRange::new(0.0, 180.0, 1e-300).unwrap_err();
        assert!(matches!(err, SprinklerError::Config(_)));
        assert!(err.to_string().contains("step"));
        assert!(AngleRange::new(0.0, 180.0, f64::MIN_POSITIVE).is_err());
        assert!(AngleRange::new(0.0, 180.0, 1e-6).is_err());
    }

    #[test]
    fn test_unvalidated_huge_range_has_no_samples() {
        let range = AngleRange { min: 0.0, max: 180.0, step: 1e-300, initial: None };
        assert_eq!(range.len(), 0);
        assert!(range.is_empty());
        assert!(range.angles().is_empty());
    }

    #[test]
    fn test_fine_but_bounded_step_is_accepted() {
        let range = AngleRange::new(0.0, 180.0, 0.01).unwrap();
        assert_eq!(range.len(), 18_001);
    }

    #[test]
    fn test_rejects_oversized_angle_grid() {
        let json = SAMPLE
            .replace(r#""min": -90, "max": 90, "step": 5"#, r#""min": -90, "max": 90, "step": 0.01"#)
            .replace(r#""min": 10, "max": 60, "step": 5"#, r#""min": 10, "max": 60, "step": 0.01"#);
        let err = SprinklerConfig::from_json_str(&json).unwrap_err();
        assert!(err.to_string().contains("sweep limit"));
    }

    #[test]
    fn test_initial_outside_range_rejected() {
        let json = SAMPLE.replace(r#""initial": 0"#, r#""initial": 120"#);
        assert!(SprinklerConfig::from_json_str(&json).is_err());
    }

    #[test]
    fn test_hose_calibrate_replaces_inputs() {
        let mut hose = Hose::default();
        hose.calibrate(9.0, 4.0, 12.0);
        assert_eq!(hose.max_distance, 9.0);
        assert_eq!(hose.max_height, 4.0);
        assert_eq!(hose.flow_rate, 12.0);
        assert_eq!(hose.diameter, 12.7);
    }

    #[test]
    fn test_motor_limits() {
        let motor = Motor {
            ena_pin: 1,
            dir_pin: 2,
            pul_pin: 3,
            steps_per_revolution: 200,
            min_angle: -90.0,
            max_angle: 90.0,
        };
        assert!(motor.allows(0.0));
        assert!(motor.allows(90.0));
        assert!(!motor.allows(95.0));
    }
}
