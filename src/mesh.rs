//! Triangulated obstacle mesh (terrain, plants, garden furniture).
//!
//! Meshes are kept in their own unit (usually millimeters, as exported
//! from CAD); lawn coordinates are meters. The conversion happens in
//! exactly one place, [`ObstacleMesh::is_point_blocked`], via
//! [`MeshUnit::per_meter`].
//!
//! The blocking test is a one-sided planar test per face: a point is
//! blocked when it lies on the positive side of any face normal. It does
//! not check whether the point projects inside the triangle, so it tests
//! against each face's supporting plane and depends on consistent
//! winding. It is kept deliberately simple; callers wanting true
//! containment need a ray cast.

use crate::constants::{MIN_TRIANGLE_NORMAL, MM_PER_M};
use crate::error::{Result, SprinklerError};
use crate::geometry::Point3D;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

/// Length unit of mesh vertex coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeshUnit {
    #[default]
    Millimeters,
    Meters,
}

impl MeshUnit {
    /// Mesh units per meter
    pub fn per_meter(self) -> f64 {
        match self {
            MeshUnit::Millimeters => MM_PER_M,
            MeshUnit::Meters => 1.0,
        }
    }

    pub fn meters_to_mesh(self, point: Point3D) -> Vector3<f64> {
        point.to_vector() * self.per_meter()
    }

    pub fn mesh_to_meters(self, v: Vector3<f64>) -> Point3D {
        Point3D::from(v / self.per_meter())
    }
}

/// One mesh face with its precomputed unit normal
#[derive(Debug, Clone, PartialEq)]
pub struct Triangle {
    pub vertices: [Vector3<f64>; 3],
    /// `None` for zero-area faces; they never block
    pub normal: Option<Vector3<f64>>,
}

impl Triangle {
    pub fn new(v0: Vector3<f64>, v1: Vector3<f64>, v2: Vector3<f64>) -> Self {
        let cross = (v1 - v0).cross(&(v2 - v0));
        let normal = cross.try_normalize(MIN_TRIANGLE_NORMAL);
        Self {
            vertices: [v0, v1, v2],
            normal,
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.normal.is_none()
    }

    /// True when `p` (mesh units) lies strictly on the normal side of the face plane
    pub fn is_above(&self, p: &Vector3<f64>) -> bool {
        match &self.normal {
            Some(n) => n.dot(&(p - self.vertices[0])) > 0.0,
            None => false,
        }
    }
}

/// Axis aligned bounds of a mesh, in mesh units
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub min: [f64; 3],
    pub max: [f64; 3],
    pub dimensions: [f64; 3],
}

impl BoundingBox {
    fn from_triangles(triangles: &[Triangle]) -> Option<Self> {
        let mut vertices = triangles.iter().flat_map(|t| t.vertices.iter());
        let first = vertices.next()?;
        let (min, max) = vertices.fold((*first, *first), |(min, max), v| (min.inf(v), max.sup(v)));
        let dims = max - min;
        Some(Self {
            min: [min.x, min.y, min.z],
            max: [max.x, max.y, max.z],
            dimensions: [dims.x, dims.y, dims.z],
        })
    }
}

/// Mesh as read from JSON: vertex triples plus their unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshDocument {
    #[serde(default)]
    pub unit: MeshUnit,
    pub triangles: Vec<[[f64; 3]; 3]>,
}

#[derive(Debug, Clone)]
pub struct ObstacleMesh {
    triangles: Vec<Triangle>,
    unit: MeshUnit,
    bounds: BoundingBox,
    degenerate_count: usize,
}

impl ObstacleMesh {
    /// Build a mesh from vertex triples. Fails on an empty mesh or
    /// non-finite coordinates; zero-area faces are kept but never block.
    pub fn new(triangles: Vec<[[f64; 3]; 3]>, unit: MeshUnit) -> Result<Self> {
        if triangles.is_empty() {
            return Err(SprinklerError::mesh("mesh contains no triangles"));
        }

        let mut faces = Vec::with_capacity(triangles.len());
        for (i, tri) in triangles.iter().enumerate() {
            if tri.iter().flatten().any(|c| !c.is_finite()) {
                return Err(SprinklerError::mesh(format!("triangle {i} has a non-finite vertex")));
            }
            let [a, b, c] = (*tri).map(|v| Vector3::new(v[0], v[1], v[2]));
            faces.push(Triangle::new(a, b, c));
        }

        let degenerate_count = faces.iter().filter(|t| t.is_degenerate()).count();
        if degenerate_count > 0 {
            warn!(
                degenerate = degenerate_count,
                total = faces.len(),
                "skipping zero-area mesh triangles in obstacle test"
            );
        }

        let bounds = BoundingBox::from_triangles(&faces)
            .ok_or_else(|| SprinklerError::mesh("mesh contains no vertices"))?;
        debug!(triangles = faces.len(), ?unit, ?bounds, "obstacle mesh loaded");

        Ok(Self {
            triangles: faces,
            unit,
            bounds,
            degenerate_count,
        })
    }

    pub fn from_document(doc: MeshDocument) -> Result<Self> {
        Self::new(doc.triangles, doc.unit)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Self::from_document(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| SprinklerError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&json)
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn unit(&self) -> MeshUnit {
        self.unit
    }

    /// Bounds in mesh units
    pub fn bounds(&self) -> &BoundingBox {
        &self.bounds
    }

    /// Bounds converted to meters: (min, max)
    pub fn bounds_in_meters(&self) -> (Point3D, Point3D) {
        let min = Vector3::from(self.bounds.min);
        let max = Vector3::from(self.bounds.max);
        (self.unit.mesh_to_meters(min), self.unit.mesh_to_meters(max))
    }

    pub fn degenerate_count(&self) -> usize {
        self.degenerate_count
    }

    /// Whether a point given in meters is blocked by any face
    pub fn is_point_blocked(&self, point_m: &Point3D) -> bool {
        let p = self.unit.meters_to_mesh(*point_m);
        self.triangles.iter().any(|t| t.is_above(&p))
    }
}
