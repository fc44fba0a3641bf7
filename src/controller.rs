//! Drives an actuator over a coverage result.
//!
//! The controller only sequences aim-and-spray calls. Stepper timing,
//! pulse generation and valve control belong to the [`Actuator`]
//! implementation.

use crate::config::Motors;
use crate::coverage::SprayPoint;
use crate::error::{Result, SprinklerError};
use serde::Serialize;
use tracing::{debug, warn};

/// Default time spent spraying at each aim, seconds
pub const DEFAULT_SPRAY_DURATION_S: f64 = 0.1;

/// Hardware seam: something that can aim the nozzle and open the valve
pub trait Actuator {
    fn move_to(&mut self, h_angle: f64, v_angle: f64) -> Result<()>;
    fn spray(&mut self, duration_s: f64) -> Result<()>;
}

/// One executed step of a run
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Movement {
    pub h_angle: f64,
    pub v_angle: f64,
    pub spray_duration: f64,
}

/// Actuator that only records what it was asked to do
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SimulatedActuator {
    pub position: Option<(f64, f64)>,
    pub moves: Vec<(f64, f64)>,
    pub total_spray_s: f64,
}

impl SimulatedActuator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Actuator for SimulatedActuator {
    fn move_to(&mut self, h_angle: f64, v_angle: f64) -> Result<()> {
        self.position = Some((h_angle, v_angle));
        self.moves.push((h_angle, v_angle));
        Ok(())
    }

    fn spray(&mut self, duration_s: f64) -> Result<()> {
        self.total_spray_s += duration_s;
        Ok(())
    }
}

pub struct SprinklerController<A: Actuator> {
    actuator: A,
    motors: Option<Motors>,
}

impl<A: Actuator> SprinklerController<A> {
    pub fn new(actuator: A) -> Self {
        Self { actuator, motors: None }
    }

    /// Enforce motor travel limits on every target
    pub fn with_motors(mut self, motors: Option<Motors>) -> Self {
        self.motors = motors;
        self
    }

    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    pub fn into_actuator(self) -> A {
        self.actuator
    }

    fn reachable(&self, h_angle: f64, v_angle: f64) -> bool {
        self.motors.map_or(true, |m| m.horizontal.allows(h_angle) && m.vertical.allows(v_angle))
    }

    /// Aim at each accepted point in sweep order and spray there.
    ///
    /// Targets outside the motor limits are skipped. The first actuator
    /// error aborts the run.
    pub fn run(&mut self, spray_points: &[SprayPoint], spray_duration: f64) -> Result<Vec<Movement>> {
        if !(spray_duration.is_finite() && spray_duration >= 0.0) {
            return Err(SprinklerError::config(format!(
                "spray duration must be a non-negative number of seconds, got {spray_duration}"
            )));
        }

        let mut movements = Vec::with_capacity(spray_points.len());
        for point in spray_points {
            if !self.reachable(point.h_angle, point.v_angle) {
                warn!(
                    h_angle = point.h_angle,
                    v_angle = point.v_angle,
                    "target outside motor limits, skipped"
                );
                continue;
            }
            self.actuator.move_to(point.h_angle, point.v_angle)?;
            self.actuator.spray(spray_duration)?;
            movements.push(Movement {
                h_angle: point.h_angle,
                v_angle: point.v_angle,
                spray_duration,
            });
        }

        debug!(requested = spray_points.len(), executed = movements.len(), "controller run finished");
        Ok(movements)
    }
}
