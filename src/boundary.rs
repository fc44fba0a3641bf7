use crate::config::{Boundaries, BoundarySide, Lawn};
use crate::constants::MAX_SPRAY_HEIGHT_M;
use crate::geometry::Point3D;
use crate::mesh::ObstacleMesh;

/// Lawn edge a height ceiling belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,  // x = 0
    Right, // x = width
    Back,  // y = length
    Front, // y = 0
}

/// Decides whether points and whole jets stay on the lawn, under the
/// edge ceilings, below the height cap and clear of the obstacle mesh.
#[derive(Debug, Clone, Copy)]
pub struct BoundaryChecker<'a> {
    lawn: Lawn,
    boundaries: Boundaries,
    mesh: Option<&'a ObstacleMesh>,
    max_height: f64,
}

impl<'a> BoundaryChecker<'a> {
    pub fn new(lawn: Lawn, boundaries: Boundaries) -> Self {
        Self {
            lawn,
            boundaries,
            mesh: None,
            max_height: MAX_SPRAY_HEIGHT_M,
        }
    }

    pub fn with_mesh(mut self, mesh: Option<&'a ObstacleMesh>) -> Self {
        self.mesh = mesh;
        self
    }

    pub fn with_max_height(mut self, max_height: f64) -> Self {
        self.max_height = max_height;
        self
    }

    pub fn lawn(&self) -> &Lawn {
        &self.lawn
    }

    /// `0 <= x <= width` and `0 <= y <= length`; height is ignored
    pub fn is_within_lawn(&self, point: &Point3D) -> bool {
        (0.0..=self.lawn.width).contains(&point.x) && (0.0..=self.lawn.length).contains(&point.y)
    }

    /// Ground level up to the sanity cap
    pub fn is_within_height_cap(&self, point: &Point3D) -> bool {
        (0.0..=self.max_height).contains(&point.z)
    }

    /// Side whose ceiling the point violates, if any
    pub fn violated_side(&self, point: &Point3D) -> Option<Side> {
        let zones = [
            (Side::Left, self.boundaries.left),
            (Side::Right, self.boundaries.right),
            (Side::Back, self.boundaries.back),
            (Side::Front, self.boundaries.front),
        ];
        zones.into_iter().find_map(|(side, boundary)| {
            let boundary = boundary?;
            (self.in_zone(side, &boundary, point) && point.z > boundary.height).then_some(side)
        })
    }

    fn in_zone(&self, side: Side, boundary: &BoundarySide, point: &Point3D) -> bool {
        match side {
            Side::Left => point.x <= boundary.distance,
            Side::Right => point.x >= self.lawn.width - boundary.distance,
            Side::Back => point.y >= self.lawn.length - boundary.distance,
            Side::Front => point.y <= boundary.distance,
        }
    }

    /// Every declared edge ceiling is respected at this point
    pub fn respects_boundaries(&self, point: &Point3D) -> bool {
        self.violated_side(point).is_none()
    }

    pub fn is_blocked_by_mesh(&self, point: &Point3D) -> bool {
        self.mesh.is_some_and(|mesh| mesh.is_point_blocked(point))
    }

    /// Full point rule: on the lawn, within the height cap, under every
    /// edge ceiling and not blocked by the mesh.
    pub fn is_within_boundaries(&self, point: &Point3D) -> bool {
        point.is_finite()
            && self.is_within_lawn(point)
            && self.is_within_height_cap(point)
            && self.respects_boundaries(point)
            && !self.is_blocked_by_mesh(point)
    }

    /// Flight points after launch respect ceilings, the cap and the mesh.
    ///
    /// The launch point is the nozzle itself and is skipped. Points in
    /// flight may pass over the lawn edge only if the head is mounted
    /// outside the lawn, so the rectangle is not enforced here.
    pub fn is_trajectory_clear(&self, points: &[Point3D]) -> bool {
        points.iter().skip(1).all(|p| {
            p.is_finite()
                && p.z <= self.max_height
                && self.respects_boundaries(p)
                && !self.is_blocked_by_mesh(p)
        })
    }

    /// A shot is safe when its landing point passes the full rule and,
    /// if flight points are given, the whole jet is clear.
    pub fn accepts_shot(&self, landing: &Point3D, flight: Option<&[Point3D]>) -> bool {
        self.is_within_boundaries(landing) && flight.map_or(true, |points| self.is_trajectory_clear(points))
    }
}
