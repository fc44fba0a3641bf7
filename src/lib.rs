//! # Sprinkler Engine
//!
//! Trajectory and lawn coverage engine for a two-axis garden sprinkler:
//! hydraulic launch speed, ballistic jets, boundary and obstacle tests,
//! and the angle sweep that decides where the nozzle may aim.

// Re-export the main types and functions
pub use boundary::{BoundaryChecker, Side};
pub use config::{
    AngleRange, Angles, Boundaries, BoundarySide, Hose, HoseModel, HosePerformance, Lawn, Motor, Motors,
    NozzlePressure, SprinklerConfig, SprinklerHead,
};
pub use controller::{Actuator, Movement, SimulatedActuator, SprinklerController, DEFAULT_SPRAY_DURATION_S};
pub use coverage::{CoverageSummary, CoverageSweep, SprayPoint, SweepOptions};
pub use error::{Result, SprinklerError};
pub use geometry::Point3D;
pub use hydraulics::HoseSpecs;
pub use mesh::{BoundingBox, MeshDocument, MeshUnit, ObstacleMesh};
pub use system::SprinklerSystem;
pub use trajectory::{JetParams, JetSpline, LineSegment, Parabolic, WaterJet};

// Module declarations
pub mod boundary;
pub mod config;
pub mod constants;
pub mod controller;
pub mod coverage;
mod error;
pub mod geometry;
pub mod hydraulics;
pub mod mesh;
mod system;
pub mod trajectory;
