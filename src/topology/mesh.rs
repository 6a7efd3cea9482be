//! In-memory unstructured mesh: node coordinates plus typed element groups.
//!
//! A [`Mesh`] is the read-only geometric and topological collaborator of the
//! interpolation engine. It exposes element enumeration with node coordinates
//! and cell types, and element-to-element adjacency through shared nodes or
//! facets. The node → element connectivity is built lazily on first use and
//! cached for the lifetime of the mesh.

use once_cell::sync::OnceCell;

use crate::data::coordinates::Coordinates;
use crate::mesh_error::MeshError;
use crate::topology::adjacency::{Adjacency, NodeElements};
use crate::topology::cell_type::CellType;
use crate::topology::element::ElementRef;

/// A named set of elements of one cell type.
#[derive(Clone, Debug)]
pub struct ElementGroup {
    name: String,
    cell_type: CellType,
    connectivity: Vec<usize>,
}

impl ElementGroup {
    /// Create a group from a flat connectivity table (`node_count` entries per element).
    pub fn new(name: impl Into<String>, cell_type: CellType, connectivity: Vec<usize>) -> Self {
        Self {
            name: name.into(),
            cell_type,
            connectivity,
        }
    }

    /// Group name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cell type shared by all elements of the group.
    pub fn cell_type(&self) -> CellType {
        self.cell_type
    }

    /// Number of elements in the group.
    pub fn len(&self) -> usize {
        self.connectivity.len() / self.cell_type.node_count()
    }

    /// Whether the group has no elements.
    pub fn is_empty(&self) -> bool {
        self.connectivity.is_empty()
    }

    /// Node indices of element `index`.
    pub fn nodes(&self, index: usize) -> Option<&[usize]> {
        let n = self.cell_type.node_count();
        let start = index.checked_mul(n)?;
        self.connectivity.get(start..start + n)
    }
}

/// Unstructured mesh made of element groups over shared nodes.
#[derive(Debug)]
pub struct Mesh {
    coordinates: Coordinates,
    groups: Vec<ElementGroup>,
    node_elements: OnceCell<NodeElements>,
}

impl Mesh {
    /// Assemble a mesh, validating every group against the coordinates.
    pub fn try_new(coordinates: Coordinates, groups: Vec<ElementGroup>) -> Result<Self, MeshError> {
        if u32::try_from(groups.len()).is_err() {
            return Err(MeshError::HandleOverflow("too many element groups"));
        }
        let dimension = coordinates.dimension();
        let node_count = coordinates.len();
        for (g, group) in groups.iter().enumerate() {
            if group.is_empty() {
                return Err(MeshError::EmptyGroup(group.name.clone()));
            }
            if group.cell_type.dimension() > dimension {
                return Err(MeshError::UnsupportedCellType {
                    cell_type: group.cell_type,
                    dimension,
                });
            }
            let nodes_per_cell = group.cell_type.node_count();
            if group.connectivity.len() % nodes_per_cell != 0 {
                return Err(MeshError::ConnectivityLengthMismatch {
                    group: group.name.clone(),
                    cell_type: group.cell_type,
                    nodes_per_cell,
                    len: group.connectivity.len(),
                });
            }
            if u32::try_from(group.len()).is_err() {
                return Err(MeshError::HandleOverflow("too many elements in one group"));
            }
            if let Some(pos) = group.connectivity.iter().position(|&n| n >= node_count) {
                return Err(MeshError::NodeOutOfRange {
                    element: ElementRef::new(g as u32, (pos / nodes_per_cell) as u32),
                    node: group.connectivity[pos],
                    node_count,
                });
            }
        }
        Ok(Self {
            coordinates,
            groups,
            node_elements: OnceCell::new(),
        })
    }

    /// Spatial dimension of the node coordinates.
    #[inline]
    pub fn dimension(&self) -> usize {
        self.coordinates.dimension()
    }

    /// Node coordinates.
    #[inline]
    pub fn coordinates(&self) -> &Coordinates {
        &self.coordinates
    }

    /// Number of nodes.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.coordinates.len()
    }

    /// All element groups, indexed by group handle.
    #[inline]
    pub fn groups(&self) -> &[ElementGroup] {
        &self.groups
    }

    /// Total number of elements over all groups.
    pub fn element_count(&self) -> usize {
        self.groups.iter().map(ElementGroup::len).sum()
    }

    /// All elements in ascending handle order.
    pub fn elements(&self) -> impl Iterator<Item = ElementRef> + '_ {
        self.groups.iter().enumerate().flat_map(|(g, group)| {
            (0..group.len()).map(move |i| ElementRef::new(g as u32, i as u32))
        })
    }

    /// Whether `element` names an element of this mesh.
    pub fn contains(&self, element: ElementRef) -> bool {
        self.groups
            .get(element.group())
            .is_some_and(|group| element.index() < group.len())
    }

    /// Cell type of `element`.
    pub fn cell_type(&self, element: ElementRef) -> Result<CellType, MeshError> {
        self.groups
            .get(element.group())
            .filter(|group| element.index() < group.len())
            .map(ElementGroup::cell_type)
            .ok_or(MeshError::UnknownElement(element))
    }

    /// Node indices of `element`.
    pub fn element_nodes(&self, element: ElementRef) -> Result<&[usize], MeshError> {
        self.groups
            .get(element.group())
            .and_then(|group| group.nodes(element.index()))
            .ok_or(MeshError::UnknownElement(element))
    }

    /// Node coordinates of `element`, padded to three components.
    pub fn element_vertices(&self, element: ElementRef) -> Result<Vec<[f64; 3]>, MeshError> {
        self.element_nodes(element)?
            .iter()
            .map(|&node| {
                self.coordinates
                    .padded(node)
                    .ok_or_else(|| MeshError::InvalidGeometry(format!("missing node {node}")))
            })
            .collect()
    }

    /// Node → incident elements map, built on first use.
    pub fn node_elements(&self) -> &NodeElements {
        self.node_elements.get_or_init(|| {
            NodeElements::build(
                self.node_count(),
                self.groups.iter().enumerate().flat_map(|(g, group)| {
                    group
                        .connectivity
                        .chunks_exact(group.cell_type.node_count())
                        .enumerate()
                        .map(move |(i, nodes)| (ElementRef::new(g as u32, i as u32), nodes))
                }),
            )
        })
    }

    /// Elements adjacent to `element` (excluding itself), ascending.
    ///
    /// Only elements of the same topological dimension are reported, so
    /// boundary-face groups never appear as neighbors of volume cells.
    pub fn element_neighbors(
        &self,
        element: ElementRef,
        adjacency: Adjacency,
    ) -> Result<Vec<ElementRef>, MeshError> {
        let cell_type = self.cell_type(element)?;
        let nodes = self.element_nodes(element)?;
        let incident = self.node_elements();
        let same_dimension = |other: &ElementRef| {
            *other != element
                && self
                    .cell_type(*other)
                    .is_ok_and(|t| t.dimension() == cell_type.dimension())
        };

        let mut out = Vec::new();
        match adjacency {
            Adjacency::Node => {
                for &node in nodes {
                    out.extend(incident.incident(node).iter().copied().filter(|e| same_dimension(e)));
                }
            }
            Adjacency::Face => {
                for facet in cell_type.facets() {
                    let facet_nodes: Vec<usize> = facet.iter().map(|&i| nodes[i]).collect();
                    for &candidate in incident.incident(facet_nodes[0]) {
                        if !same_dimension(&candidate) {
                            continue;
                        }
                        let other = self.element_nodes(candidate)?;
                        if facet_nodes.iter().all(|n| other.contains(n)) {
                            out.push(candidate);
                        }
                    }
                }
            }
        }
        out.sort_unstable();
        out.dedup();
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_triangles() -> Mesh {
        let coords =
            Coordinates::from_rows(&[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [2.0, 2.0]])
                .unwrap();
        Mesh::try_new(
            coords,
            vec![
                ElementGroup::new("cells", CellType::Triangle, vec![0, 1, 2, 0, 2, 3, 2, 4, 3]),
                ElementGroup::new("boundary", CellType::Segment, vec![0, 1]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn enumerates_elements_in_handle_order() {
        let mesh = two_triangles();
        let all: Vec<_> = mesh.elements().collect();
        assert_eq!(all.len(), 4);
        assert_eq!(mesh.element_count(), 4);
        assert!(all.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(mesh.element_nodes(all[1]).unwrap(), &[0, 2, 3]);
        assert!(mesh.contains(ElementRef::new(1, 0)));
        assert!(!mesh.contains(ElementRef::new(1, 1)));
    }

    #[test]
    fn node_and_face_neighbors_differ() {
        let mesh = two_triangles();
        let e0 = ElementRef::new(0, 0);
        let e1 = ElementRef::new(0, 1);
        let e2 = ElementRef::new(0, 2);
        assert_eq!(mesh.element_neighbors(e0, Adjacency::Node).unwrap(), vec![e1, e2]);
        assert_eq!(mesh.element_neighbors(e0, Adjacency::Face).unwrap(), vec![e1]);
        assert_eq!(mesh.element_neighbors(e1, Adjacency::Face).unwrap(), vec![e0, e2]);
    }

    #[test]
    fn validation_catches_bad_groups() {
        let coords = Coordinates::from_rows(&[[0.0], [1.0]]).unwrap();
        let err = Mesh::try_new(
            coords.clone(),
            vec![ElementGroup::new("bad", CellType::Segment, vec![0, 5])],
        )
        .unwrap_err();
        assert!(matches!(err, MeshError::NodeOutOfRange { node: 5, .. }));

        let err = Mesh::try_new(
            coords.clone(),
            vec![ElementGroup::new("tri", CellType::Triangle, vec![0, 1, 0])],
        )
        .unwrap_err();
        assert!(matches!(err, MeshError::UnsupportedCellType { .. }));

        let err = Mesh::try_new(
            coords,
            vec![ElementGroup::new("odd", CellType::Segment, vec![0, 1, 1])],
        )
        .unwrap_err();
        assert!(matches!(err, MeshError::ConnectivityLengthMismatch { .. }));
    }
}
