//! Reference-element mappings: shape functions, Jacobians and their inversion.
//!
//! Vertex coordinates are padded to three components (see
//! [`pad`](crate::data::coordinates::pad)); the Jacobian is therefore always
//! stored row-major with shape `(3, cell_dim)` and inverted through its normal
//! equations, which works for 1D, 2D and 3D meshes alike.
//!
//! Bilinear and trilinear cells (quads, hexes, prisms, pyramids) have a
//! non-affine mapping, so [`physical_to_reference`] runs a Newton iteration
//! that is capped at [`InversionOpts::max_iterations`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::topology::cell_type::CellType;

/// Relative threshold below which a Jacobian Gram determinant counts as singular.
const SINGULAR_EPS: f64 = 1e-12;

/// Failure of a reference-element mapping.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum MappingError {
    /// The reference point has the wrong number of components.
    #[error("{cell_type:?} reference point must have {expected} components, got {found}")]
    ReferenceDimension {
        cell_type: CellType,
        expected: usize,
        found: usize,
    },
    /// The vertex list does not match the cell's node count.
    #[error("vertex count mismatch: expected {expected}, got {found}")]
    VertexCount { expected: usize, found: usize },
    /// The Jacobian is (numerically) singular: coincident nodes or zero measure.
    #[error("degenerate jacobian at Newton iteration {iteration}")]
    SingularJacobian { iteration: usize },
    /// Newton did not reach the residual tolerance.
    #[error("Newton iteration did not converge within {iterations} iterations")]
    NotConverged { iterations: usize },
}

impl MappingError {
    /// Number of Newton iterations spent before failing.
    pub fn iterations(&self) -> usize {
        match self {
            MappingError::SingularJacobian { iteration } => *iteration,
            MappingError::NotConverged { iterations } => *iterations,
            _ => 0,
        }
    }
}

/// Controls for the physical → reference inversion.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InversionOpts {
    /// Hard cap on Newton iterations.
    pub max_iterations: usize,
    /// Residual tolerance relative to the element size.
    pub tolerance: f64,
}

impl Default for InversionOpts {
    fn default() -> Self {
        Self {
            max_iterations: 20,
            tolerance: 1e-12,
        }
    }
}

/// Evaluate shape function values and reference gradients at `reference_point`.
pub fn shape_functions(
    cell_type: CellType,
    reference_point: &[f64],
) -> Result<(Vec<f64>, Vec<Vec<f64>>), MappingError> {
    let expected = cell_type.dimension();
    if reference_point.len() != expected {
        return Err(MappingError::ReferenceDimension {
            cell_type,
            expected,
            found: reference_point.len(),
        });
    }
    let out = match cell_type {
        CellType::Segment => {
            let r = reference_point[0];
            (vec![1.0 - r, r], vec![vec![-1.0], vec![1.0]])
        }
        CellType::Triangle => {
            let (r, s) = (reference_point[0], reference_point[1]);
            (
                vec![1.0 - r - s, r, s],
                vec![vec![-1.0, -1.0], vec![1.0, 0.0], vec![0.0, 1.0]],
            )
        }
        CellType::Quadrilateral => {
            let (r, s) = (reference_point[0], reference_point[1]);
            (
                vec![(1.0 - r) * (1.0 - s), r * (1.0 - s), r * s, (1.0 - r) * s],
                vec![
                    vec![-(1.0 - s), -(1.0 - r)],
                    vec![1.0 - s, -r],
                    vec![s, r],
                    vec![-s, 1.0 - r],
                ],
            )
        }
        CellType::Tetrahedron => {
            let (r, s, t) = (reference_point[0], reference_point[1], reference_point[2]);
            (
                vec![1.0 - r - s - t, r, s, t],
                vec![
                    vec![-1.0, -1.0, -1.0],
                    vec![1.0, 0.0, 0.0],
                    vec![0.0, 1.0, 0.0],
                    vec![0.0, 0.0, 1.0],
                ],
            )
        }
        CellType::Hexahedron => {
            let (r, s, t) = (reference_point[0], reference_point[1], reference_point[2]);
            let (rm, sm, tm) = (1.0 - r, 1.0 - s, 1.0 - t);
            (
                vec![
                    rm * sm * tm,
                    r * sm * tm,
                    r * s * tm,
                    rm * s * tm,
                    rm * sm * t,
                    r * sm * t,
                    r * s * t,
                    rm * s * t,
                ],
                vec![
                    vec![-sm * tm, -rm * tm, -rm * sm],
                    vec![sm * tm, -r * tm, -r * sm],
                    vec![s * tm, r * tm, -r * s],
                    vec![-s * tm, rm * tm, -rm * s],
                    vec![-sm * t, -rm * t, rm * sm],
                    vec![sm * t, -r * t, r * sm],
                    vec![s * t, r * t, r * s],
                    vec![-s * t, rm * t, rm * s],
                ],
            )
        }
        CellType::Prism => {
            let (r, s, t) = (reference_point[0], reference_point[1], reference_point[2]);
            let (rm, tm) = (1.0 - r - s, 1.0 - t);
            (
                vec![rm * tm, r * tm, s * tm, rm * t, r * t, s * t],
                vec![
                    vec![-tm, -tm, -rm],
                    vec![tm, 0.0, -r],
                    vec![0.0, tm, -s],
                    vec![-t, -t, rm],
                    vec![t, 0.0, r],
                    vec![0.0, t, s],
                ],
            )
        }
        CellType::Pyramid => {
            let (r, s, t) = (reference_point[0], reference_point[1], reference_point[2]);
            let (rm, sm, tm) = (1.0 - r, 1.0 - s, 1.0 - t);
            (
                vec![tm * rm * sm, tm * r * sm, tm * r * s, tm * rm * s, t],
                vec![
                    vec![-tm * sm, -tm * rm, -rm * sm],
                    vec![tm * sm, -tm * r, -r * sm],
                    vec![tm * s, tm * r, -r * s],
                    vec![-tm * s, tm * rm, -rm * s],
                    vec![0.0, 0.0, 1.0],
                ],
            )
        }
    };
    Ok(out)
}

/// Map a point in reference coordinates to physical coordinates.
pub fn reference_to_physical(
    cell_type: CellType,
    vertices: &[[f64; 3]],
    reference_point: &[f64],
) -> Result<[f64; 3], MappingError> {
    let (weights, _) = shape_functions(cell_type, reference_point)?;
    check_vertices(vertices, weights.len())?;
    let mut out = [0.0; 3];
    for (weight, vertex) in weights.iter().zip(vertices) {
        for axis in 0..3 {
            out[axis] += weight * vertex[axis];
        }
    }
    Ok(out)
}

/// Compute the Jacobian matrix at a reference point, row-major `(3, cell_dim)`.
pub fn jacobian(
    cell_type: CellType,
    vertices: &[[f64; 3]],
    reference_point: &[f64],
) -> Result<Vec<f64>, MappingError> {
    let (_, grads) = shape_functions(cell_type, reference_point)?;
    check_vertices(vertices, grads.len())?;
    let dim = cell_type.dimension();
    let mut out = vec![0.0; 3 * dim];
    for (vertex, grad) in vertices.iter().zip(&grads) {
        for ref_dim in 0..dim {
            for axis in 0..3 {
                out[axis * dim + ref_dim] += vertex[axis] * grad[ref_dim];
            }
        }
    }
    Ok(out)
}

/// Map a physical point back to reference coordinates using Newton iteration.
///
/// Convergence is declared when the physical residual drops below
/// `opts.tolerance` times the element's bounding extent, plus a few ulps of
/// the point's magnitude for meshes far from the origin. A singular Jacobian
/// at an unconverged iterate, or exhausting `opts.max_iterations`, is an
/// error: callers never receive a half-converged reference point.
pub fn physical_to_reference(
    cell_type: CellType,
    vertices: &[[f64; 3]],
    physical_point: &[f64; 3],
    opts: &InversionOpts,
) -> Result<Vec<f64>, MappingError> {
    check_vertices(vertices, cell_type.node_count())?;
    let scale = element_scale(vertices);
    let magnitude = physical_point.iter().fold(0.0_f64, |m, x| m.max(x.abs()));
    let tolerance = opts.tolerance * scale + 8.0 * f64::EPSILON * magnitude;
    let mut ref_point = cell_type.reference_centroid().to_vec();

    for iteration in 0..=opts.max_iterations {
        let mapped = reference_to_physical(cell_type, vertices, &ref_point)?;
        let residual = [
            mapped[0] - physical_point[0],
            mapped[1] - physical_point[1],
            mapped[2] - physical_point[2],
        ];
        // A converged iterate is accepted even where the Jacobian vanishes,
        // e.g. at the apex of a pyramid.
        if norm(residual) <= tolerance {
            return Ok(ref_point);
        }
        if iteration == opts.max_iterations {
            break;
        }
        let jac = jacobian(cell_type, vertices, &ref_point)?;
        let normal = NormalEquations::new(&jac, cell_type.dimension());
        if normal.is_singular(scale) {
            return Err(MappingError::SingularJacobian { iteration });
        }
        let correction = normal
            .solve(&jac, &residual)
            .ok_or(MappingError::SingularJacobian { iteration })?;
        for (r, c) in ref_point.iter_mut().zip(&correction) {
            *r -= c;
        }
    }
    Err(MappingError::NotConverged {
        iterations: opts.max_iterations,
    })
}

/// Gram matrix `JᵀJ` of a `(3, dim)` Jacobian, used for least-squares pull-back.
struct NormalEquations {
    dim: usize,
    gram: [f64; 9],
    det: f64,
}

impl NormalEquations {
    fn new(jac: &[f64], dim: usize) -> Self {
        let mut gram = [0.0; 9];
        for i in 0..dim {
            for j in 0..dim {
                gram[i * 3 + j] = (0..3).map(|a| jac[a * dim + i] * jac[a * dim + j]).sum();
            }
        }
        let det = match dim {
            1 => gram[0],
            2 => gram[0] * gram[4] - gram[1] * gram[3],
            _ => {
                gram[0] * (gram[4] * gram[8] - gram[5] * gram[7])
                    - gram[1] * (gram[3] * gram[8] - gram[5] * gram[6])
                    + gram[2] * (gram[3] * gram[7] - gram[4] * gram[6])
            }
        };
        Self { dim, gram, det }
    }

    /// Singular relative to `scale^(2 dim)`, the Gram determinant of a cell
    /// of size `scale`.
    fn is_singular(&self, scale: f64) -> bool {
        let reference = scale.powi(2 * self.dim as i32);
        !(self.det > SINGULAR_EPS * reference)
    }

    /// Solve `JᵀJ x = Jᵀ v`.
    fn solve(&self, jac: &[f64], v: &[f64; 3]) -> Option<Vec<f64>> {
        let dim = self.dim;
        let rhs: Vec<f64> = (0..dim)
            .map(|i| (0..3).map(|a| jac[a * dim + i] * v[a]).sum())
            .collect();
        let g = &self.gram;
        let inv_det = 1.0 / self.det;
        if !inv_det.is_finite() {
            return None;
        }
        Some(match dim {
            1 => vec![rhs[0] / g[0]],
            2 => vec![
                (g[4] * rhs[0] - g[1] * rhs[1]) * inv_det,
                (-g[3] * rhs[0] + g[0] * rhs[1]) * inv_det,
            ],
            _ => {
                let inv = [
                    (g[4] * g[8] - g[5] * g[7]) * inv_det,
                    (g[2] * g[7] - g[1] * g[8]) * inv_det,
                    (g[1] * g[5] - g[2] * g[4]) * inv_det,
                    (g[5] * g[6] - g[3] * g[8]) * inv_det,
                    (g[0] * g[8] - g[2] * g[6]) * inv_det,
                    (g[2] * g[3] - g[0] * g[5]) * inv_det,
                    (g[3] * g[7] - g[4] * g[6]) * inv_det,
                    (g[1] * g[6] - g[0] * g[7]) * inv_det,
                    (g[0] * g[4] - g[1] * g[3]) * inv_det,
                ];
                vec![
                    inv[0] * rhs[0] + inv[1] * rhs[1] + inv[2] * rhs[2],
                    inv[3] * rhs[0] + inv[4] * rhs[1] + inv[5] * rhs[2],
                    inv[6] * rhs[0] + inv[7] * rhs[1] + inv[8] * rhs[2],
                ]
            }
        })
    }
}

fn check_vertices(vertices: &[[f64; 3]], expected: usize) -> Result<(), MappingError> {
    if vertices.len() != expected {
        return Err(MappingError::VertexCount {
            expected,
            found: vertices.len(),
        });
    }
    Ok(())
}

/// Largest bounding-box extent of the vertices.
fn element_scale(vertices: &[[f64; 3]]) -> f64 {
    (0..3)
        .map(|axis| {
            let (lo, hi) = vertices
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                    (lo.min(v[axis]), hi.max(v[axis]))
                });
            hi - lo
        })
        .fold(0.0, f64::max)
}

fn norm(a: [f64; 3]) -> f64 {
    (a[0] * a[0] + a[1] * a[1] + a[2] * a[2]).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-10
    }

    #[test]
    fn segment_maps_both_ways() {
        let vertices = [[5.0, 0.0, 0.0], [10.0, 0.0, 0.0]];
        let mapped = reference_to_physical(CellType::Segment, &vertices, &[0.5]).unwrap();
        assert!(approx(mapped[0], 7.5));
        let r = physical_to_reference(
            CellType::Segment,
            &vertices,
            &[9.0, 0.0, 0.0],
            &InversionOpts::default(),
        )
        .unwrap();
        assert!(approx(r[0], 0.8));
    }

    #[test]
    fn triangle_jacobian() {
        let vertices = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        let jac = jacobian(CellType::Triangle, &vertices, &[0.0, 0.0]).unwrap();
        assert!(approx(jac[0], 1.0));
        assert!(approx(jac[3], 1.0));
    }

    #[test]
    fn distorted_quad_inverts_with_newton() {
        let vertices = [
            [0.0, 0.0, 0.0],
            [2.0, 0.0, 0.0],
            [2.5, 1.5, 0.0],
            [0.0, 1.0, 0.0],
        ];
        let target = reference_to_physical(CellType::Quadrilateral, &vertices, &[0.3, 0.7]).unwrap();
        let r = physical_to_reference(
            CellType::Quadrilateral,
            &vertices,
            &target,
            &InversionOpts::default(),
        )
        .unwrap();
        assert!(approx(r[0], 0.3));
        assert!(approx(r[1], 0.7));
    }

    #[test]
    fn tetra_inverse() {
        let vertices = [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
        ];
        let r = physical_to_reference(
            CellType::Tetrahedron,
            &vertices,
            &[0.25, 0.25, 0.25],
            &InversionOpts::default(),
        )
        .unwrap();
        for c in r {
            assert!(approx(c, 0.25));
        }
    }

    #[test]
    fn hex_inverse_of_trilinear_map() {
        let vertices = [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.2, 1.1, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
            [1.0, 0.0, 1.3],
            [1.0, 1.0, 1.0],
            [0.1, 1.0, 1.0],
        ];
        let target =
            reference_to_physical(CellType::Hexahedron, &vertices, &[0.2, 0.6, 0.9]).unwrap();
        let r = physical_to_reference(
            CellType::Hexahedron,
            &vertices,
            &target,
            &InversionOpts::default(),
        )
        .unwrap();
        assert!(approx(r[0], 0.2));
        assert!(approx(r[1], 0.6));
        assert!(approx(r[2], 0.9));
    }

    #[test]
    fn coincident_nodes_are_singular() {
        let vertices = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 0.0, 0.0]];
        let err = physical_to_reference(
            CellType::Triangle,
            &vertices,
            &[0.5, 0.0, 0.0],
            &InversionOpts::default(),
        )
        .unwrap_err();
        assert_eq!(err, MappingError::SingularJacobian { iteration: 0 });
    }

    #[test]
    fn pyramid_apex_region_converges() {
        let vertices = [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.5, 0.5, 1.0],
        ];
        for z in [0.9999, 1.0] {
            let r = physical_to_reference(
                CellType::Pyramid,
                &vertices,
                &[0.5, 0.5, z],
                &InversionOpts::default(),
            )
            .unwrap();
            assert!(approx(r[2], z));
        }
    }

    #[test]
    fn iteration_cap_is_enforced() {
        let vertices = [
            [0.0, 0.0, 0.0],
            [2.0, 0.0, 0.0],
            [2.5, 1.5, 0.0],
            [0.0, 1.0, 0.0],
        ];
        let opts = InversionOpts {
            max_iterations: 0,
            tolerance: 1e-12,
        };
        let err =
            physical_to_reference(CellType::Quadrilateral, &vertices, &[0.1, 0.9, 0.0], &opts)
                .unwrap_err();
        assert_eq!(err, MappingError::NotConverged { iterations: 0 });
    }

    #[test]
    fn shape_functions_partition_unity() {
        for (cell_type, point) in [
            (CellType::Quadrilateral, vec![0.3, 0.8]),
            (CellType::Hexahedron, vec![0.1, 0.5, 0.7]),
            (CellType::Prism, vec![0.2, 0.3, 0.4]),
            (CellType::Pyramid, vec![0.4, 0.4, 0.2]),
        ] {
            let (w, _) = shape_functions(cell_type, &point).unwrap();
            assert!(approx(w.iter().sum::<f64>(), 1.0));
        }
        assert!(shape_functions(CellType::Triangle, &[0.1]).is_err());
    }
}
