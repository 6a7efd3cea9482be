#![allow(dead_code)]
use std::sync::Arc;

use mesh_interp::data::coordinates::Coordinates;
use mesh_interp::data::dictionary::{Dictionary, DofLayout};
use mesh_interp::interpolation::{InterpolationPipeline, InterpolatorOptions};
use mesh_interp::topology::cell_type::CellType;
use mesh_interp::topology::mesh::{ElementGroup, Mesh};

pub fn mesh<const D: usize>(rows: &[[f64; D]], cell_type: CellType, connectivity: Vec<usize>) -> Arc<Mesh> {
    let coords = Coordinates::from_rows(rows).unwrap();
    Arc::new(Mesh::try_new(coords, vec![ElementGroup::new("cells", cell_type, connectivity)]).unwrap())
}

pub fn source(mesh: Arc<Mesh>, layout: DofLayout) -> Arc<Dictionary> {
    Arc::new(Dictionary::new("u", mesh, layout))
}

/// `n` segments of equal length on `[a, b]`.
pub fn chain(n: usize, a: f64, b: f64) -> Arc<Mesh> {
    let h = (b - a) / n as f64;
    let rows: Vec<[f64; 1]> = (0..=n).map(|i| [a + h * i as f64]).collect();
    let connectivity = (0..n).flat_map(|i| [i, i + 1]).collect();
    mesh(&rows, CellType::Segment, connectivity)
}

fn grid_nodes(n: usize) -> Vec<[f64; 2]> {
    let h = 1.0 / n as f64;
    (0..=n)
        .flat_map(|j| (0..=n).map(move |i| [h * i as f64, h * j as f64]))
        .collect()
}

/// Corner nodes `(a, b, c, d)` of square `(i, j)`, counter-clockwise.
fn square(n: usize, i: usize, j: usize) -> [usize; 4] {
    let a = j * (n + 1) + i;
    [a, a + 1, a + n + 2, a + n + 1]
}

/// `n × n` unit-square grid, each square split into `(a, b, c)` and `(a, c, d)`.
/// Square `(i, j)` owns triangles `2 (j n + i)` and `2 (j n + i) + 1`.
pub fn tri_grid(n: usize) -> Arc<Mesh> {
    let mut connectivity = Vec::new();
    for j in 0..n {
        for i in 0..n {
            let [a, b, c, d] = square(n, i, j);
            connectivity.extend([a, b, c, a, c, d]);
        }
    }
    mesh(&grid_nodes(n), CellType::Triangle, connectivity)
}

/// `n × n` quads on the unit square.
pub fn quad_grid(n: usize) -> Arc<Mesh> {
    let mut connectivity = Vec::new();
    for j in 0..n {
        for i in 0..n {
            connectivity.extend(square(n, i, j));
        }
    }
    mesh(&grid_nodes(n), CellType::Quadrilateral, connectivity)
}

/// Unit cube split into six tetrahedra around the main diagonal.
pub fn cube_tets() -> Arc<Mesh> {
    let rows: Vec<[f64; 3]> = (0..8)
        .map(|k| [(k & 1) as f64, ((k >> 1) & 1) as f64, ((k >> 2) & 1) as f64])
        .collect();
    let mut connectivity = Vec::new();
    for (a, b) in [(0, 1), (0, 2), (1, 0), (1, 2), (2, 0), (2, 1)] {
        connectivity.extend([0, 1 << a, (1 << a) | (1 << b), 7]);
    }
    mesh(&rows, CellType::Tetrahedron, connectivity)
}

pub fn configured(source: Arc<Dictionary>, finder: &str, stencil: &str, function: &str) -> InterpolationPipeline {
    let options = InterpolatorOptions::with_selectors(finder, stencil, function).unwrap();
    InterpolationPipeline::with_source(source, options).unwrap()
}

pub fn linear(x: &[f64]) -> f64 {
    let z = x.get(2).copied().unwrap_or(0.0);
    1.0 + 2.0 * x[0] - 3.0 * x.get(1).copied().unwrap_or(0.0) + 0.5 * z
}

/// Sample `f` at every DOF of `dictionary`.
pub fn sample(dictionary: &Dictionary, f: impl Fn(&[f64]) -> f64) -> Vec<f64> {
    (0..dictionary.size())
        .map(|dof| f(dictionary.dof_coordinates(dof).unwrap()))
        .collect()
}
