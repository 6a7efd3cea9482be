#![cfg_attr(docsrs, feature(doc_cfg))]
//! # mesh-interp
//!
//! mesh-interp is a point-location and interpolation engine for unstructured
//! meshes. Given an arbitrary coordinate it finds the containing element,
//! grows a stencil of nearby elements over the mesh connectivity and computes
//! sparse `(DOF, weight)` pairs that reconstruct a field value at that
//! coordinate as a weighted sum of known DOF values.
//!
//! ## Features
//! - Element finders: adaptive octree over element bounding boxes, brute-force scan
//! - Stencil computers: one cell, k rings of node- or face-neighbours
//! - Interpolation functions: shape functions, inverse distance, linear least squares
//! - 1D, 2D and 3D meshes of segments, triangles, quads, tets, hexes, prisms and pyramids
//! - Atomic reconfiguration under concurrent read-only queries
//! - Optional `rayon` feature for parallel batch queries
//!
//! ## Determinism
//!
//! Element candidates are always tested in ascending [`ElementRef`] order, so a
//! point on a boundary shared by several elements resolves to the lowest
//! handle, whatever finder is configured. Repeated queries return
//! bit-identical weights.
//!
//! ## Usage
//!
//! ```
//! use std::sync::Arc;
//! use mesh_interp::prelude::*;
//!
//! let coords = Coordinates::from_rows(&[[5.0], [10.0]])?;
//! let mesh = Mesh::try_new(coords, vec![ElementGroup::new("cells", CellType::Segment, vec![0, 1])])?;
//! let source = Arc::new(Dictionary::continuous("u", Arc::new(mesh)));
//!
//! let pipeline = InterpolationPipeline::with_source(source, InterpolatorOptions::default())?;
//! let weights = pipeline.locate_and_interpolate(&[7.5])?;
//! assert_eq!(weights.apply(&[3.0, 8.0]), Some(5.5));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod algs;
pub mod data;
pub mod geometry;
pub mod interpolation;
pub mod mesh_error;
pub mod topology;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::algs::element_finder::{ElementFinder, SpatialIndex};
    pub use crate::algs::stencil::{StencilBuilder, StencilComputer};
    pub use crate::algs::weights::{InterpolationFunction, WeightEngine};
    pub use crate::data::coordinates::Coordinates;
    pub use crate::data::dictionary::{Dictionary, DictionaryId, DofLayout, SpaceElement};
    pub use crate::interpolation::{
        ConfigurationError, FinderKind, FunctionKind, Interpolation, InterpolationError,
        InterpolationPipeline, InterpolatorOptions, StencilKind, WeightSet,
    };
    pub use crate::mesh_error::MeshError;
    pub use crate::topology::adjacency::Adjacency;
    pub use crate::topology::cell_type::CellType;
    pub use crate::topology::element::ElementRef;
    pub use crate::topology::mesh::{ElementGroup, Mesh};
}

pub use topology::element::ElementRef;
