//! Cell type metadata for mesh elements.
//!
//! The reference elements use the following vertex ordering:
//! - Segment: `[v0, v1]` with `r` in `[0, 1]`.
//! - Triangle: `[v0, v1, v2]` with `(r, s)` in the unit right triangle.
//! - Quadrilateral: `[v0, v1, v2, v3]` with `(r, s)` in `[0, 1]^2`.
//! - Tetrahedron: `[v0, v1, v2, v3]` with `(r, s, t)` in the unit tetrahedron.
//! - Hexahedron: `[v0, .., v7]` with `(r, s, t)` in `[0, 1]^3`, `0..=3` the bottom face.
//! - Prism: `[v0, .., v5]` with `(r, s)` in the unit triangle and `t` in `[0, 1]`.
//! - Pyramid: `[v0, .., v4]` with `(r, s)` in `[0, 1]^2` and apex at `t = 1`.

use serde::{Deserialize, Serialize};

/// Cell types supported by the point-location and interpolation engine.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum CellType {
    /// 1D segment/edge.
    Segment,
    /// 2D simplex (triangle).
    Triangle,
    /// 2D tensor-product cell (quad).
    Quadrilateral,
    /// 3D simplex (tet).
    Tetrahedron,
    /// 3D tensor-product cell (hex).
    Hexahedron,
    /// 3D wedge/prism.
    Prism,
    /// 3D pyramid.
    Pyramid,
}

impl CellType {
    /// Returns the topological dimension of the cell.
    pub fn dimension(self) -> usize {
        match self {
            CellType::Segment => 1,
            CellType::Triangle | CellType::Quadrilateral => 2,
            CellType::Tetrahedron | CellType::Hexahedron | CellType::Prism | CellType::Pyramid => 3,
        }
    }

    /// Number of nodes (and of linear shape functions) of the cell.
    pub fn node_count(self) -> usize {
        match self {
            CellType::Segment => 2,
            CellType::Triangle => 3,
            CellType::Quadrilateral => 4,
            CellType::Tetrahedron => 4,
            CellType::Hexahedron => 8,
            CellType::Prism => 6,
            CellType::Pyramid => 5,
        }
    }

    /// Local node indices of each facet (codimension-1 boundary entity).
    pub fn facets(self) -> &'static [&'static [usize]] {
        match self {
            CellType::Segment => &SEGMENT_FACETS,
            CellType::Triangle => &TRIANGLE_FACETS,
            CellType::Quadrilateral => &QUAD_FACETS,
            CellType::Tetrahedron => &TET_FACETS,
            CellType::Hexahedron => &HEX_FACETS,
            CellType::Prism => &PRISM_FACETS,
            CellType::Pyramid => &PYRAMID_FACETS,
        }
    }

    /// Centroid of the reference element, used as Newton starting point.
    pub fn reference_centroid(self) -> &'static [f64] {
        match self {
            CellType::Segment => &[0.5],
            CellType::Triangle => &[1.0 / 3.0, 1.0 / 3.0],
            CellType::Quadrilateral => &[0.5, 0.5],
            CellType::Tetrahedron => &[0.25, 0.25, 0.25],
            CellType::Hexahedron => &[0.5, 0.5, 0.5],
            CellType::Prism => &[1.0 / 3.0, 1.0 / 3.0, 0.5],
            CellType::Pyramid => &[0.5, 0.5, 0.25],
        }
    }

    /// Whether `reference_point` lies inside the reference element, allowing
    /// an excursion of `tolerance` past every bounding facet.
    pub fn contains_reference(self, reference_point: &[f64], tolerance: f64) -> bool {
        if reference_point.len() != self.dimension() {
            return false;
        }
        let unit = |x: f64| x >= -tolerance && x <= 1.0 + tolerance;
        let simplex = |xs: &[f64]| {
            xs.iter().all(|&x| x >= -tolerance) && xs.iter().sum::<f64>() <= 1.0 + tolerance
        };
        match self {
            CellType::Segment | CellType::Quadrilateral | CellType::Hexahedron => {
                reference_point.iter().all(|&x| unit(x))
            }
            CellType::Triangle | CellType::Tetrahedron => simplex(reference_point),
            CellType::Prism => simplex(&reference_point[..2]) && unit(reference_point[2]),
            CellType::Pyramid => reference_point.iter().all(|&x| unit(x)),
        }
    }
}

const SEGMENT_FACETS: [&[usize]; 2] = [&[0], &[1]];
const TRIANGLE_FACETS: [&[usize]; 3] = [&[0, 1], &[1, 2], &[2, 0]];
const QUAD_FACETS: [&[usize]; 4] = [&[0, 1], &[1, 2], &[2, 3], &[3, 0]];
const TET_FACETS: [&[usize]; 4] = [&[0, 1, 2], &[0, 1, 3], &[1, 2, 3], &[0, 2, 3]];
const HEX_FACETS: [&[usize]; 6] = [
    &[0, 1, 2, 3],
    &[4, 5, 6, 7],
    &[0, 1, 5, 4],
    &[1, 2, 6, 5],
    &[2, 3, 7, 6],
    &[3, 0, 4, 7],
];
const PRISM_FACETS: [&[usize]; 5] = [
    &[0, 1, 2],
    &[3, 4, 5],
    &[0, 1, 4, 3],
    &[1, 2, 5, 4],
    &[2, 0, 3, 5],
];
const PYRAMID_FACETS: [&[usize]; 5] = [
    &[0, 1, 2, 3],
    &[0, 1, 4],
    &[1, 2, 4],
    &[2, 3, 4],
    &[3, 0, 4],
];
