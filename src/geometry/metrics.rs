//! Cell measures (length/area/volume) and corner Jacobians used to flag
//! degenerate elements.

use crate::geometry::mapping::{MappingError, jacobian};
use crate::topology::cell_type::CellType;

/// Compute the unsigned cell length/area/volume for the given vertices.
pub fn cell_measure(cell_type: CellType, vertices: &[[f64; 3]]) -> Result<f64, MappingError> {
    let expected = cell_type.node_count();
    if vertices.len() != expected {
        return Err(MappingError::VertexCount {
            expected,
            found: vertices.len(),
        });
    }
    let v = vertices;
    let measure = match cell_type {
        CellType::Segment => norm(sub(v[1], v[0])),
        CellType::Triangle => triangle_area(v[0], v[1], v[2]),
        CellType::Quadrilateral => triangle_area(v[0], v[1], v[2]) + triangle_area(v[0], v[2], v[3]),
        CellType::Tetrahedron => signed_volume(v[0], v[1], v[2], v[3]).abs(),
        CellType::Hexahedron => (signed_volume(v[0], v[1], v[3], v[4])
            + signed_volume(v[1], v[2], v[3], v[6])
            + signed_volume(v[1], v[3], v[4], v[6])
            + signed_volume(v[1], v[4], v[5], v[6])
            + signed_volume(v[3], v[4], v[6], v[7]))
        .abs(),
        CellType::Prism => (signed_volume(v[0], v[1], v[2], v[3])
            + signed_volume(v[1], v[4], v[2], v[3])
            + signed_volume(v[2], v[4], v[5], v[3]))
        .abs(),
        CellType::Pyramid => {
            (signed_volume(v[0], v[1], v[2], v[4]) + signed_volume(v[0], v[2], v[3], v[4])).abs()
        }
    };
    Ok(measure)
}

/// Whether a cell cannot be inverted reliably: its measure is negligible
/// compared to its size (`measure <= eps * extent^dim`) or its corner
/// Jacobians change sign (see [`has_inverted_corner`]).
pub fn is_degenerate(cell_type: CellType, vertices: &[[f64; 3]], eps: f64) -> bool {
    small_measure(cell_type, vertices, eps) || has_inverted_corner(cell_type, vertices)
}

/// Whether the Jacobian determinant of a quadrilateral or hexahedron takes
/// both signs over its reference corners, i.e. the cell is non-convex or
/// tangled. The reference map then folds over itself and Newton inversion
/// stalls inside the cell.
///
/// Quadrilaterals are checked in the `xy` plane. Other cell types are
/// affine, or (pyramids) have a vanishing Jacobian at a corner by
/// construction, and always return `false`.
pub fn has_inverted_corner(cell_type: CellType, vertices: &[[f64; 3]]) -> bool {
    let corners: &[&[f64]] = match cell_type {
        CellType::Quadrilateral => &[&[0.0, 0.0], &[1.0, 0.0], &[1.0, 1.0], &[0.0, 1.0]],
        CellType::Hexahedron => &[
            &[0.0, 0.0, 0.0],
            &[1.0, 0.0, 0.0],
            &[1.0, 1.0, 0.0],
            &[0.0, 1.0, 0.0],
            &[0.0, 0.0, 1.0],
            &[1.0, 0.0, 1.0],
            &[1.0, 1.0, 1.0],
            &[0.0, 1.0, 1.0],
        ],
        _ => return false,
    };
    let (mut lo, mut hi) = (f64::INFINITY, f64::NEG_INFINITY);
    for corner in corners {
        let Ok(j) = jacobian(cell_type, vertices, corner) else {
            return false;
        };
        let det = if cell_type == CellType::Quadrilateral {
            j[0] * j[3] - j[1] * j[2]
        } else {
            j[0] * (j[4] * j[8] - j[5] * j[7]) - j[1] * (j[3] * j[8] - j[5] * j[6])
                + j[2] * (j[3] * j[7] - j[4] * j[6])
        };
        lo = lo.min(det);
        hi = hi.max(det);
    }
    lo < 0.0 && hi > 0.0
}

fn small_measure(cell_type: CellType, vertices: &[[f64; 3]], eps: f64) -> bool {
    let extent = (0..3)
        .map(|axis| {
            let lo = vertices.iter().map(|p| p[axis]).fold(f64::INFINITY, f64::min);
            let hi = vertices.iter().map(|p| p[axis]).fold(f64::NEG_INFINITY, f64::max);
            hi - lo
        })
        .fold(0.0, f64::max);
    match cell_measure(cell_type, vertices) {
        Ok(measure) => measure <= eps * extent.powi(cell_type.dimension() as i32),
        Err(_) => true,
    }
}

fn triangle_area(a: [f64; 3], b: [f64; 3], c: [f64; 3]) -> f64 {
    0.5 * norm(cross(sub(b, a), sub(c, a)))
}

fn signed_volume(a: [f64; 3], b: [f64; 3], c: [f64; 3], d: [f64; 3]) -> f64 {
    dot(sub(b, a), cross(sub(c, a), sub(d, a))) / 6.0
}

fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn norm(a: [f64; 3]) -> f64 {
    dot(a, a).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-10
    }

    #[test]
    fn measures() {
        let tri = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        assert!(approx(cell_measure(CellType::Triangle, &tri).unwrap(), 0.5));
        let hex = [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
            [1.0, 0.0, 1.0],
            [1.0, 1.0, 1.0],
            [0.0, 1.0, 1.0],
        ];
        assert!(approx(cell_measure(CellType::Hexahedron, &hex).unwrap(), 1.0));
        let pyramid = [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.5, 0.5, 1.0],
        ];
        assert!(approx(cell_measure(CellType::Pyramid, &pyramid).unwrap(), 1.0 / 3.0));
    }

    #[test]
    fn coincident_nodes_are_degenerate() {
        let flat = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 0.0, 0.0]];
        assert!(is_degenerate(CellType::Triangle, &flat, 1e-12));
        let good = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        assert!(!is_degenerate(CellType::Triangle, &good, 1e-12));
        assert!(is_degenerate(CellType::Segment, &[[2.0, 0.0, 0.0]; 2], 1e-12));
    }

    #[test]
    fn reflex_quad_has_inverted_corner() {
        let reflex = [[0.0, 0.0, 0.0], [4.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 3.0, 0.0]];
        assert!(cell_measure(CellType::Quadrilateral, &reflex).unwrap() > 1.0);
        assert!(has_inverted_corner(CellType::Quadrilateral, &reflex));
        assert!(is_degenerate(CellType::Quadrilateral, &reflex, 1e-12));

        let convex = [[0.0, 0.0, 0.0], [2.0, 0.0, 0.0], [2.5, 1.5, 0.0], [0.0, 1.0, 0.0]];
        assert!(!has_inverted_corner(CellType::Quadrilateral, &convex));
        // Clockwise ordering flips every corner alike.
        let clockwise = [convex[0], convex[3], convex[2], convex[1]];
        assert!(!has_inverted_corner(CellType::Quadrilateral, &clockwise));
    }

    #[test]
    fn tangled_hex_has_inverted_corner() {
        let mut hex = [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
            [1.0, 0.0, 1.0],
            [1.0, 1.0, 1.0],
            [0.0, 1.0, 1.0],
        ];
        assert!(!has_inverted_corner(CellType::Hexahedron, &hex));
        hex.swap(6, 7);
        assert!(has_inverted_corner(CellType::Hexahedron, &hex));
    }
}
