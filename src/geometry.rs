use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

/// A point (or displacement) in lawn coordinates, meters.
///
/// x runs along the lawn width, y along its length and z is height
/// above ground. Values are plain copies; every operation returns a new
/// point.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3D {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub const fn origin() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    pub fn to_tuple(self) -> (f64, f64, f64) {
        (self.x, self.y, self.z)
    }

    pub fn to_vector(self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }

    pub fn scale(self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor, self.z * factor)
    }

    /// Copy of this point with a different height
    pub fn with_z(self, z: f64) -> Self {
        Self::new(self.x, self.y, z)
    }

    /// Euclidean distance to another point
    pub fn distance_to(self, other: Point3D) -> f64 {
        (other - self).to_vector().norm()
    }

    /// Distance to another point measured in the ground plane only
    pub fn horizontal_distance_to(self, other: Point3D) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl Add for Point3D {
    type Output = Point3D;

    fn add(self, rhs: Point3D) -> Point3D {
        Point3D::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Point3D {
    type Output = Point3D;

    fn sub(self, rhs: Point3D) -> Point3D {
        Point3D::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Point3D {
    type Output = Point3D;

    fn mul(self, factor: f64) -> Point3D {
        self.scale(factor)
    }
}

impl From<Vector3<f64>> for Point3D {
    fn from(v: Vector3<f64>) -> Self {
        Point3D::new(v.x, v.y, v.z)
    }
}

impl From<Point3D> for Vector3<f64> {
    fn from(p: Point3D) -> Self {
        p.to_vector()
    }
}

impl From<[f64; 3]> for Point3D {
    fn from(a: [f64; 3]) -> Self {
        Point3D::new(a[0], a[1], a[2])
    }
}

/// Unit vector in the ground plane for a horizontal angle in degrees
pub fn ground_direction(horizontal_angle_deg: f64) -> Point3D {
    let h_rad = horizontal_angle_deg.to_radians();
    Point3D::new(h_rad.cos(), h_rad.sin(), 0.0)
}
