mod util;

use proptest::prelude::*;

use mesh_interp::algs::element_finder::{ElementFinder, SpatialIndex};
use mesh_interp::data::dictionary::DofLayout;
use mesh_interp::geometry::mapping::InversionOpts;
use mesh_interp::interpolation::{FinderKind, FinderOptions, InterpolationPipeline, InterpolatorOptions};
use util::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn interior_points_have_partition_of_unity(x in 0.0..1.0f64, y in 0.0..1.0f64) {
        for mesh in [tri_grid(6), quad_grid(5)] {
            let pipeline =
                InterpolationPipeline::with_source(source(mesh, DofLayout::Continuous), InterpolatorOptions::default())
                    .unwrap();
            let weights = pipeline.locate_and_interpolate(&[x, y]).unwrap();
            prop_assert!(!weights.is_empty());
            prop_assert!((weights.sum() - 1.0).abs() < 1e-9, "sum {}", weights.sum());
        }
    }

    #[test]
    fn octree_agrees_with_brute_force(
        x in -0.2..1.2f64,
        y in -0.2..1.2f64,
        per_leaf in 1usize..6,
    ) {
        let dict = source(tri_grid(7), DofLayout::Continuous);
        let options = FinderOptions { max_elements_per_leaf: per_leaf, ..FinderOptions::default() };
        let inversion = InversionOpts::default();
        let tree = ElementFinder::build(FinderKind::Octree, &dict, &options, &inversion).unwrap();
        let scan = ElementFinder::build(FinderKind::BruteForce, &dict, &options, &inversion).unwrap();
        let q = [x, y];
        let inside = (0.0..=1.0).contains(&x) && (0.0..=1.0).contains(&y);
        let found = tree.find_element(&dict, &q).unwrap();
        prop_assert_eq!(found, scan.find_element(&dict, &q).unwrap());
        prop_assert_eq!(found.is_some(), inside);
    }

    #[test]
    fn queries_are_idempotent(x in 0.0..1.0f64, y in 0.0..1.0f64) {
        let pipeline = configured(source(tri_grid(4), DofLayout::Continuous), "octree", "rings", "inverse-distance");
        let first = pipeline.locate_and_interpolate(&[x, y]).unwrap();
        let second = pipeline.locate_and_interpolate(&[x, y]).unwrap();
        prop_assert_eq!(first, second);
    }
}
