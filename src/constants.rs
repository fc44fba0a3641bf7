//! Physical constants and unit factors used by the sprinkler engine

/// Gravitational acceleration in m/s²
pub const GRAVITY_MPS2: f64 = 9.8;

/// Density of water in kg/m³
pub const WATER_DENSITY_KG_M3: f64 = 1000.0;

/// Conversion factor: bar to pascal
pub const BAR_TO_PA: f64 = 1.0e5;

/// Millimeters per meter.
///
/// Obstacle meshes are usually exported in millimeters while the lawn,
/// head position and trajectories are in meters. This is the single
/// factor applied where the two coordinate systems meet.
pub const MM_PER_M: f64 = 1000.0;

/// Liters per cubic meter
pub const LITERS_PER_M3: f64 = 1000.0;

/// Seconds per minute (flow rates are configured in L/min)
pub const SECONDS_PER_MINUTE: f64 = 60.0;

/// Upper sanity cap for spray height in meters.
///
/// A garden jet never climbs this high; points above it are treated as
/// outside the allowed volume.
pub const MAX_SPRAY_HEIGHT_M: f64 = 15.0;

/// Default number of segments a sampled trajectory is divided into
pub const DEFAULT_SEGMENTS: usize = 20;

/// Most angles a single axis may sample
pub const MAX_ANGLE_SAMPLES: usize = 100_000;

/// Most (horizontal, vertical) pairs a coverage sweep may evaluate
pub const MAX_GRID_SAMPLES: usize = 4_000_000;

/// Angle the calibration range is reported at (degrees)
pub const OPTIMAL_RANGE_ANGLE_DEG: f64 = 45.0;

// Numerical stability constants
/// Minimum edge cross-product length for a mesh triangle to count as non-degenerate
pub const MIN_TRIANGLE_NORMAL: f64 = 1e-12;

/// Minimum |sin(2θ)| accepted when solving the range equation for velocity
pub const MIN_RANGE_SINE: f64 = 1e-9;
