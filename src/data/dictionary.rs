//! Dictionary: degree-of-freedom numbering of a field over a mesh.
//!
//! A [`Dictionary`] owns the mapping from mesh elements to global
//! degree-of-freedom (DOF) indices, plus the physical location of every DOF.
//! The same geometric element can carry different DOF layouts in different
//! dictionaries (continuous nodal, discontinuous nodal, cell-centered), so an
//! element is only meaningful to the interpolation engine once it is resolved
//! against one dictionary as a [`SpaceElement`].
//!
//! Element DOFs are packed atlas-style: every indexed element gets a slice
//! `(offset, len)` of one flat connectivity array, in ascending element order.
//!
//! Every dictionary receives a process-unique [`DictionaryId`]; space elements
//! remember the id they were resolved against, which lets the engine reject
//! handles that outlived a reconfiguration.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::mesh_error::MeshError;
use crate::topology::element::ElementRef;
use crate::topology::mesh::Mesh;

static NEXT_DICTIONARY_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a [`Dictionary`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DictionaryId(u64);

impl DictionaryId {
    fn next() -> Self {
        DictionaryId(NEXT_DICTIONARY_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value.
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for DictionaryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dict#{}", self.0)
    }
}

/// How degrees of freedom are laid out over the mesh.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DofLayout {
    /// One DOF per mesh node, shared by all incident elements.
    Continuous,
    /// One DOF per element node; neighbouring elements never share DOFs.
    Discontinuous,
    /// One DOF per element, located at the element centroid.
    CellCentered,
}

/// An element resolved against a specific dictionary's numbering.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SpaceElement {
    element: ElementRef,
    dictionary: DictionaryId,
}

impl SpaceElement {
    /// Underlying geometric element.
    #[inline]
    pub fn element(&self) -> ElementRef {
        self.element
    }

    /// Dictionary the element was resolved against.
    #[inline]
    pub fn dictionary(&self) -> DictionaryId {
        self.dictionary
    }
}

/// DOF numbering and DOF coordinates of one field over a mesh.
#[derive(Debug)]
pub struct Dictionary {
    id: DictionaryId,
    name: String,
    layout: DofLayout,
    mesh: Arc<Mesh>,
    /// Per mesh group: `Some(first slot)` into `element_spans` if indexed.
    group_slots: Vec<Option<usize>>,
    /// `(offset, len)` into `connectivity` per indexed element.
    element_spans: Vec<(usize, usize)>,
    connectivity: Vec<usize>,
    dof_coordinates: Vec<f64>,
    size: usize,
}

impl Dictionary {
    /// Number every element group whose cell dimension equals the mesh dimension.
    pub fn new(name: impl Into<String>, mesh: Arc<Mesh>, layout: DofLayout) -> Self {
        let dimension = mesh.dimension();
        let groups: Vec<usize> = mesh
            .groups()
            .iter()
            .enumerate()
            .filter(|(_, group)| group.cell_type().dimension() == dimension)
            .map(|(g, _)| g)
            .collect();
        Self::build(name.into(), mesh, layout, &groups)
    }

    /// Number only the named element groups.
    ///
    /// Every named group must hold cells of the mesh dimension.
    pub fn with_groups(
        name: impl Into<String>,
        mesh: Arc<Mesh>,
        layout: DofLayout,
        group_names: &[&str],
    ) -> Result<Self, MeshError> {
        let mut groups = Vec::with_capacity(group_names.len());
        for wanted in group_names {
            let g = mesh
                .groups()
                .iter()
                .position(|group| group.name() == *wanted)
                .ok_or_else(|| MeshError::UnknownGroup((*wanted).to_string()))?;
            let cell_type = mesh.groups()[g].cell_type();
            if cell_type.dimension() != mesh.dimension() {
                return Err(MeshError::GroupDimensionMismatch {
                    group: (*wanted).to_string(),
                    cell_type,
                    dimension: mesh.dimension(),
                });
            }
            groups.push(g);
        }
        groups.sort_unstable();
        groups.dedup();
        Ok(Self::build(name.into(), mesh, layout, &groups))
    }

    /// Continuous nodal dictionary over all cells of the mesh.
    pub fn continuous(name: impl Into<String>, mesh: Arc<Mesh>) -> Self {
        Self::new(name, mesh, DofLayout::Continuous)
    }

    /// Discontinuous nodal dictionary over all cells of the mesh.
    pub fn discontinuous(name: impl Into<String>, mesh: Arc<Mesh>) -> Self {
        Self::new(name, mesh, DofLayout::Discontinuous)
    }

    /// Cell-centered dictionary over all cells of the mesh.
    pub fn cell_centered(name: impl Into<String>, mesh: Arc<Mesh>) -> Self {
        Self::new(name, mesh, DofLayout::CellCentered)
    }

    fn build(name: String, mesh: Arc<Mesh>, layout: DofLayout, groups: &[usize]) -> Self {
        let dimension = mesh.dimension();
        let mut group_slots = vec![None; mesh.groups().len()];
        let mut element_spans = Vec::new();
        let mut connectivity = Vec::new();
        let mut dof_coordinates = Vec::new();

        if layout == DofLayout::Continuous {
            for node in 0..mesh.node_count() {
                dof_coordinates.extend_from_slice(mesh.coordinates().get(node).unwrap_or(&[]));
            }
        }

        for &g in groups {
            let group = &mesh.groups()[g];
            group_slots[g] = Some(element_spans.len());
            for index in 0..group.len() {
                let nodes = group.nodes(index).unwrap_or(&[]);
                let offset = connectivity.len();
                match layout {
                    DofLayout::Continuous => connectivity.extend_from_slice(nodes),
                    DofLayout::Discontinuous => {
                        for &node in nodes {
                            connectivity.push(dof_coordinates.len() / dimension);
                            dof_coordinates
                                .extend_from_slice(mesh.coordinates().get(node).unwrap_or(&[]));
                        }
                    }
                    DofLayout::CellCentered => {
                        connectivity.push(dof_coordinates.len() / dimension);
                        let mut centroid = vec![0.0; dimension];
                        for &node in nodes {
                            if let Some(x) = mesh.coordinates().get(node) {
                                for (c, v) in centroid.iter_mut().zip(x) {
                                    *c += v;
                                }
                            }
                        }
                        let inv = 1.0 / nodes.len().max(1) as f64;
                        dof_coordinates.extend(centroid.into_iter().map(|c| c * inv));
                    }
                }
                element_spans.push((offset, connectivity.len() - offset));
            }
        }

        let size = dof_coordinates.len() / dimension;
        Self {
            id: DictionaryId::next(),
            name,
            layout,
            mesh,
            group_slots,
            element_spans,
            connectivity,
            dof_coordinates,
            size,
        }
    }

    /// Unique identity of this dictionary.
    #[inline]
    pub fn id(&self) -> DictionaryId {
        self.id
    }

    /// Dictionary name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// DOF layout.
    #[inline]
    pub fn layout(&self) -> DofLayout {
        self.layout
    }

    /// Mesh the dictionary is defined on.
    #[inline]
    pub fn mesh(&self) -> &Arc<Mesh> {
        &self.mesh
    }

    /// Spatial dimension of the mesh.
    #[inline]
    pub fn dimension(&self) -> usize {
        self.mesh.dimension()
    }

    /// Total number of DOFs.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Whether `dof` is a valid global DOF index of this dictionary.
    #[inline]
    pub fn contains_dof(&self, dof: usize) -> bool {
        dof < self.size
    }

    /// Number of indexed elements.
    #[inline]
    pub fn element_count(&self) -> usize {
        self.element_spans.len()
    }

    /// Whether no element is indexed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.element_spans.is_empty()
    }

    /// Indexed elements in ascending handle order.
    pub fn elements(&self) -> impl Iterator<Item = ElementRef> + '_ {
        self.group_slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some())
            .flat_map(move |(g, _)| {
                (0..self.mesh.groups()[g].len()).map(move |i| ElementRef::new(g as u32, i as u32))
            })
    }

    fn slot(&self, element: ElementRef) -> Option<usize> {
        let first = (*self.group_slots.get(element.group())?)?;
        (element.index() < self.mesh.groups()[element.group()].len())
            .then_some(first + element.index())
    }

    /// Whether `element` carries DOFs in this dictionary.
    #[inline]
    pub fn contains_element(&self, element: ElementRef) -> bool {
        self.slot(element).is_some()
    }

    /// Resolve `element` against this dictionary.
    pub fn space(&self, element: ElementRef) -> Option<SpaceElement> {
        self.contains_element(element).then_some(SpaceElement {
            element,
            dictionary: self.id,
        })
    }

    /// Global DOF indices of a space element, ordered like the element's nodes
    /// (a single entry for cell-centered layouts).
    ///
    /// Returns `None` when `space` was resolved against another dictionary.
    pub fn element_dofs(&self, space: &SpaceElement) -> Option<&[usize]> {
        if space.dictionary != self.id {
            return None;
        }
        let (offset, len) = self.element_spans[self.slot(space.element)?];
        Some(&self.connectivity[offset..offset + len])
    }

    /// Physical location of a DOF.
    pub fn dof_coordinates(&self, dof: usize) -> Option<&[f64]> {
        let dimension = self.dimension();
        let start = dof.checked_mul(dimension)?;
        self.dof_coordinates.get(start..start + dimension)
    }
}
