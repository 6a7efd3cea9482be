//! MeshError: construction-time errors of the mesh and dictionary layer.
//!
//! Everything that can go wrong while assembling a [`Mesh`](crate::topology::mesh::Mesh)
//! or numbering a [`Dictionary`](crate::data::dictionary::Dictionary) is reported
//! through this type. Query-time failures live in
//! [`InterpolationError`](crate::interpolation::error::InterpolationError).

use thiserror::Error;

use crate::topology::cell_type::CellType;
use crate::topology::element::ElementRef;

/// Unified error type for mesh and dictionary construction.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MeshError {
    /// Generic geometric inconsistency.
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),
    /// Spatial dimension outside `1..=3`.
    #[error("Unsupported spatial dimension {0} (expected 1, 2 or 3)")]
    UnsupportedDimension(usize),
    /// The flat coordinate array is not a multiple of the spatial dimension.
    #[error("Coordinate array of length {len} is not a multiple of dimension {dimension}")]
    CoordinateDimensionMismatch { len: usize, dimension: usize },
    /// A coordinate is NaN or infinite.
    #[error("Node {node} has a non-finite coordinate")]
    NonFiniteCoordinate { node: usize },
    /// A group's connectivity table is not a multiple of the cell's node count.
    #[error("Group `{group}`: connectivity of length {len} does not match {cell_type:?} ({nodes_per_cell} nodes per cell)")]
    ConnectivityLengthMismatch {
        group: String,
        cell_type: CellType,
        nodes_per_cell: usize,
        len: usize,
    },
    /// Connectivity refers to a node that does not exist.
    #[error("Element {element} references node {node}, but the mesh has {node_count} nodes")]
    NodeOutOfRange {
        element: ElementRef,
        node: usize,
        node_count: usize,
    },
    /// A cell type whose dimension exceeds the spatial dimension.
    #[error("Cell type {cell_type:?} cannot live in a {dimension}D mesh")]
    UnsupportedCellType { cell_type: CellType, dimension: usize },
    /// A group selected for a dictionary whose cells are not of the mesh dimension.
    #[error("Group `{group}` holds {cell_type:?} cells, but a dictionary needs {dimension}D cells")]
    GroupDimensionMismatch {
        group: String,
        cell_type: CellType,
        dimension: usize,
    },
    /// An element group without elements.
    #[error("Element group `{0}` is empty")]
    EmptyGroup(String),
    /// Element reference outside the mesh.
    #[error("Unknown element {0}")]
    UnknownElement(ElementRef),
    /// Element group name not present in the mesh.
    #[error("Unknown element group `{0}`")]
    UnknownGroup(String),
    /// Too many groups or elements for the 32-bit element handle.
    #[error("Element handle overflow: {0}")]
    HandleOverflow(&'static str),
}
