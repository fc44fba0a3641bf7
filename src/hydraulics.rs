//! Hydraulic model: from hose/nozzle configuration to initial jet speed.
//!
//! Three interchangeable models are supported, selected by
//! [`HoseModel`]:
//!
//! * performance: solve `R = v0²·sin(2θ)/g` for `v0` given the range `R`
//!   reached at a known angle `θ`
//! * calibration: `v0 = sqrt(R·g)` from a measured throw, plus derived
//!   nozzle area, nozzle diameter and a pressure estimate
//! * pressure: Bernoulli efflux `v0 = sqrt(2·p/ρ)`
//!
//! All derived values are pure functions of their inputs.

use crate::config::{Hose, HoseModel, HosePerformance, NozzlePressure};
use crate::constants::{
    BAR_TO_PA, GRAVITY_MPS2, LITERS_PER_M3, MIN_RANGE_SINE, OPTIMAL_RANGE_ANGLE_DEG,
    SECONDS_PER_MINUTE, WATER_DENSITY_KG_M3,
};
use crate::error::{Result, SprinklerError};
use serde::Serialize;
use std::f64::consts::PI;
use std::fmt;

/// Initial velocity (m/s) from a known range at a known angle.
///
/// Fails for angles whose `sin(2θ)` vanishes (0°, 90°), which would
/// otherwise divide by zero.
pub fn velocity_from_performance(max_distance: f64, optimal_angle_deg: f64) -> Result<f64> {
    if !(max_distance > 0.0) || !max_distance.is_finite() {
        return Err(SprinklerError::config(format!(
            "max_distance must be positive, got {max_distance}"
        )));
    }
    let sin_2theta = (2.0 * optimal_angle_deg.to_radians()).sin();
    if !(sin_2theta > MIN_RANGE_SINE) {
        return Err(SprinklerError::config(format!(
            "optimal_angle {optimal_angle_deg}° cannot produce a forward range"
        )));
    }
    Ok((max_distance * GRAVITY_MPS2 / sin_2theta).sqrt())
}

/// Initial velocity (m/s) of a calibrated hose, from its measured throw
pub fn velocity_from_calibration(max_distance: f64) -> Result<f64> {
    if !(max_distance > 0.0) || !max_distance.is_finite() {
        return Err(SprinklerError::config(format!(
            "max_distance must be positive, got {max_distance}"
        )));
    }
    Ok((max_distance * GRAVITY_MPS2).sqrt())
}

/// Efflux velocity (m/s) of water at the given pressure (bar)
pub fn velocity_from_pressure(pressure_bar: f64) -> Result<f64> {
    if !(pressure_bar > 0.0) || !pressure_bar.is_finite() {
        return Err(SprinklerError::config(format!(
            "pressure must be positive, got {pressure_bar} bar"
        )));
    }
    let pressure_pa = pressure_bar * BAR_TO_PA;
    Ok((2.0 * pressure_pa / WATER_DENSITY_KG_M3).sqrt())
}

/// Ideal projectile range on flat ground for a velocity and angle
pub fn spray_distance(velocity: f64, angle_deg: f64) -> f64 {
    let rad = angle_deg.to_radians();
    let time_of_flight = 2.0 * velocity * rad.sin() / GRAVITY_MPS2;
    velocity * rad.cos() * time_of_flight
}

/// Area (mm²) of a circle with the given diameter (mm)
pub fn circle_area_mm2(diameter_mm: f64) -> f64 {
    PI * (diameter_mm / 2.0).powi(2)
}

impl HoseModel {
    /// Initial jet velocity in m/s for the configured model
    pub fn initial_velocity(&self) -> Result<f64> {
        match self {
            HoseModel::Performance(p) => p.initial_velocity(),
            HoseModel::Calibration(h) => velocity_from_calibration(h.max_distance),
            HoseModel::Pressure(n) => n.initial_velocity(),
        }
    }
}

impl HosePerformance {
    pub fn initial_velocity(&self) -> Result<f64> {
        velocity_from_performance(self.max_distance, self.optimal_angle)
    }
}

impl NozzlePressure {
    pub fn initial_velocity(&self) -> Result<f64> {
        velocity_from_pressure(self.pressure)
    }

    /// Volumetric flow (L/min) through the nozzle at its efflux velocity
    pub fn flow_rate_lpm(&self) -> Result<f64> {
        let velocity = self.initial_velocity()?;
        let area_m2 = circle_area_mm2(self.nozzle_diameter) * 1e-6;
        Ok(area_m2 * velocity * LITERS_PER_M3 * SECONDS_PER_MINUTE)
    }
}

/// Derived specifications of a calibrated hose
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HoseSpecs {
    pub hose_diameter_mm: f64,
    pub flow_rate_lpm: f64,
    pub velocity_mps: f64,
    pub nozzle_area_mm2: f64,
    pub nozzle_diameter_mm: f64,
    pub pressure_bar: f64,
    pub max_spray_distance_m: f64, // at 45°
    pub max_height_m: f64,
    pub max_distance_m: f64,
}

impl Hose {
    /// Derive velocity, nozzle geometry and pressure from the measured inputs
    pub fn specs(&self) -> Result<HoseSpecs> {
        let velocity = velocity_from_calibration(self.max_distance)?;
        if !(self.flow_rate > 0.0) {
            return Err(SprinklerError::config(format!(
                "flow_rate must be positive, got {}",
                self.flow_rate
            )));
        }

        // (L/min -> m³/s) / (m/s) = m², reported in mm²
        let flow_m3_per_s = self.flow_rate / SECONDS_PER_MINUTE / LITERS_PER_M3;
        let nozzle_area_mm2 = flow_m3_per_s / velocity * 1e6;
        let nozzle_diameter_mm = 2.0 * (nozzle_area_mm2 / PI).sqrt();

        // rough bar estimate from the vertical throw
        let pressure_bar = self.max_height * GRAVITY_MPS2 / 100.0;

        Ok(HoseSpecs {
            hose_diameter_mm: self.diameter,
            flow_rate_lpm: self.flow_rate,
            velocity_mps: velocity,
            nozzle_area_mm2,
            nozzle_diameter_mm,
            pressure_bar,
            max_spray_distance_m: spray_distance(velocity, OPTIMAL_RANGE_ANGLE_DEG),
            max_height_m: self.max_height,
            max_distance_m: self.max_distance,
        })
    }
}

impl HoseSpecs {
    /// Rows of (specification, formatted value)
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Hose Diameter", format!("{:.2} mm", self.hose_diameter_mm)),
            ("Flow Rate", format!("{:.2} L/min", self.flow_rate_lpm)),
            ("Nozzle Diameter", format!("{:.2} mm", self.nozzle_diameter_mm)),
            ("Nozzle Area", format!("{:.2} mm²", self.nozzle_area_mm2)),
            ("Initial Velocity", format!("{:.2} m/s", self.velocity_mps)),
            ("Pressure", format!("{:.2} bar", self.pressure_bar)),
            ("Maximum Spray Distance (45°)", format!("{:.2} m", self.max_spray_distance_m)),
            ("Maximum Vertical Height", format!("{:.2} m", self.max_height_m)),
            ("Maximum Horizontal Distance", format!("{:.2} m", self.max_distance_m)),
        ]
    }

    /// Markdown pipe table of the specifications
    pub fn to_table(&self) -> String {
        let rows = self.rows();
        let name_width = rows
            .iter()
            .map(|(name, _)| name.chars().count())
            .max()
            .unwrap_or(0)
            .max("Specification".len());
        let value_width = rows
            .iter()
            .map(|(_, value)| value.chars().count())
            .max()
            .unwrap_or(0)
            .max("Value".len());

        let mut out = String::new();
        out.push_str(&format!(
            "| {:<nw$} | {:<vw$} |\n",
            "Specification",
            "Value",
            nw = name_width,
            vw = value_width
        ));
        out.push_str(&format!(
            "|:{}-|:{}-|\n",
            "-".repeat(name_width),
            "-".repeat(value_width)
        ));
        for (name, value) in rows {
            out.push_str(&format!(
                "| {}{} | {}{} |\n",
                name,
                " ".repeat(name_width - name.chars().count()),
                value,
                " ".repeat(value_width - value.chars().count())
            ));
        }
        out
    }
}

impl fmt::Display for HoseSpecs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_table())
    }
}
