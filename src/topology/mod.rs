//! Mesh topology: element handles, cell types, element groups and adjacency.
//!
//! The [`Mesh`](mesh::Mesh) is the read-only collaborator the interpolation
//! engine queries for element geometry and neighbourhoods. Its node → element
//! connectivity is built lazily on first use and cached for the mesh's
//! lifetime.

pub mod adjacency;
pub mod cell_type;
pub mod element;
pub mod mesh;

pub use adjacency::Adjacency;
pub use cell_type::CellType;
pub use element::ElementRef;
pub use mesh::{ElementGroup, Mesh};
