mod util;

use mesh_interp::data::dictionary::DofLayout;
use mesh_interp::interpolation::{
    InterpolationError, InterpolationPipeline, InterpolatorOptions, StencilKind,
};
use mesh_interp::topology::adjacency::Adjacency;
use mesh_interp::topology::cell_type::CellType;
use mesh_interp::topology::element::ElementRef;
use util::*;

fn assert_reproduces_linear(pipeline: &InterpolationPipeline, q: &[f64]) {
    let source = pipeline.source().unwrap();
    let values = sample(&source, linear);
    let weights = pipeline.locate_and_interpolate(q).unwrap();
    assert!(!weights.is_empty());
    assert!((weights.sum() - 1.0).abs() < 1e-10, "sum {}", weights.sum());
    let got = weights.apply(&values).unwrap();
    assert!((got - linear(q)).abs() < 1e-10, "got {got}, want {}", linear(q));
}

#[test]
fn every_scheme_reproduces_linear_fields_on_triangles() {
    let source = source(tri_grid(5), DofLayout::Continuous);
    for (stencil, function) in [
        ("one-cell", "shape-function"),
        ("rings", "shape-function"),
        ("one-cell", "least-squares"),
        ("rings", "least-squares"),
    ] {
        let pipeline = configured(source.clone(), "octree", stencil, function);
        for q in [[0.13, 0.77], [0.5, 0.5], [0.99, 0.01]] {
            assert_reproduces_linear(&pipeline, &q);
        }
    }
}

#[test]
fn discontinuous_layout_uses_element_local_dofs() {
    let source = source(quad_grid(3), DofLayout::Discontinuous);
    assert_eq!(source.size(), 9 * 4);
    let pipeline = configured(source.clone(), "octree", "one-cell", "shape-function");
    assert_reproduces_linear(&pipeline, &[0.4, 0.9]);

    let found = pipeline.locate(&[0.4, 0.9]).unwrap().unwrap();
    // Square (1, 2) is element 7; its private block starts at 7 * 4.
    assert_eq!(found.element.element(), ElementRef::new(0, 7));
    assert_eq!(found.weights.points().collect::<Vec<_>>(), vec![28, 29, 30, 31]);
}

#[test]
fn cell_centered_schemes() {
    let source = source(tri_grid(4), DofLayout::CellCentered);
    let constant = configured(source.clone(), "octree", "one-cell", "shape-function");
    let weights = constant.locate_and_interpolate(&[0.1, 0.05]).unwrap();
    assert_eq!(weights.into_entries(), vec![(0, 1.0)]);

    let idw = configured(source.clone(), "octree", "rings", "inverse-distance");
    let weights = idw.locate_and_interpolate(&[0.6, 0.35]).unwrap();
    assert!(weights.len() > 1);
    assert!((weights.sum() - 1.0).abs() < 1e-12);
    assert!(weights.weights().all(|w| w > 0.0));

    let lsq = configured(source.clone(), "octree", "rings", "least-squares");
    assert_reproduces_linear(&lsq, &[0.6, 0.35]);

    let starved = configured(source, "octree", "one-cell", "least-squares");
    assert!(matches!(
        starved.locate_and_interpolate(&[0.6, 0.35]),
        Err(InterpolationError::IllConditioned { points: 1, .. })
    ));
}

#[test]
fn face_rings_are_smaller_than_node_rings() {
    let source = source(tri_grid(4), DofLayout::Continuous);
    let mut options = InterpolatorOptions::default();
    options.stencil_computer = StencilKind::Rings;
    let node = InterpolationPipeline::with_source(source.clone(), options).unwrap();
    options.stencil.adjacency = Adjacency::Face;
    let face = InterpolationPipeline::with_source(source, options).unwrap();

    // Lower triangle of square (1, 1), away from the boundary.
    let q = [0.4, 0.3];
    let by_face = face.locate(&q).unwrap().unwrap();
    assert_eq!(by_face.element.element(), ElementRef::new(0, 10));
    assert_eq!(by_face.stencil.len(), 4);
    let by_node = node.locate(&q).unwrap().unwrap();
    assert_eq!(by_node.stencil.len(), 13);
    assert_eq!(by_node.stencil[0], by_face.stencil[0]);
}

#[test]
fn tetrahedra_and_hexahedra() {
    let tets = source(cube_tets(), DofLayout::Continuous);
    for function in ["shape-function", "least-squares"] {
        let pipeline = configured(tets.clone(), "octree", "one-cell", function);
        assert_reproduces_linear(&pipeline, &[0.2, 0.3, 0.4]);
        assert_reproduces_linear(&pipeline, &[0.9, 0.1, 0.5]);
    }

    let rows: Vec<[f64; 3]> = (0..8)
        .map(|k| {
            let (x, y, z) = ((k & 1) as f64, ((k >> 1) & 1) as f64, ((k >> 2) & 1) as f64);
            [x + 0.1 * y * z, y, z]
        })
        .collect();
    // Reference ordering: bottom face counter-clockwise, then top face.
    let hex = mesh(&rows, CellType::Hexahedron, vec![0, 1, 3, 2, 4, 5, 7, 6]);
    let pipeline = configured(source(hex, DofLayout::Continuous), "brute-force", "one-cell", "shape-function");
    assert_reproduces_linear(&pipeline, &[0.5, 0.5, 0.5]);
    assert_reproduces_linear(&pipeline, &[0.2, 0.95, 0.9]);
}

#[test]
fn prism_and_pyramid() {
    let prism = mesh(
        &[
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 2.0],
            [1.0, 0.0, 2.0],
            [0.0, 1.0, 2.0],
        ],
        CellType::Prism,
        vec![0, 1, 2, 3, 4, 5],
    );
    let pipeline = configured(source(prism, DofLayout::Continuous), "octree", "one-cell", "shape-function");
    assert_reproduces_linear(&pipeline, &[0.2, 0.3, 1.5]);
    assert!(pipeline.locate_and_interpolate(&[0.8, 0.8, 1.0]).unwrap().is_empty());

    let pyramid = mesh(
        &[
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.5, 0.5, 1.0],
        ],
        CellType::Pyramid,
        vec![0, 1, 2, 3, 4],
    );
    let pipeline = configured(source(pyramid, DofLayout::Continuous), "octree", "one-cell", "shape-function");
    let weights = pipeline.locate_and_interpolate(&[0.5, 0.5, 0.25]).unwrap();
    assert!((weights.sum() - 1.0).abs() < 1e-10);
    assert!(weights.weights().all(|w| w >= -1e-12));

    // The Jacobian vanishes at the apex; points next to it are still inside.
    assert_reproduces_linear(&pipeline, &[0.5, 0.5, 0.9999]);
    assert_reproduces_linear(&pipeline, &[0.5, 0.5, 1.0]);
    assert_reproduces_linear(&pipeline, &[0.48, 0.52, 0.9]);
}
