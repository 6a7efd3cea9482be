//! Stencil computers: grow the set of elements contributing to one query.
//!
//! Every stencil starts with the containing element. `Rings` then adds
//! neighbour layers breadth-first; each layer is sorted ascending and
//! filtered to elements carrying DOFs in the dictionary, and elements already
//! visited are never added twice, so cyclic adjacency terminates.

use hashbrown::HashSet;

use crate::data::dictionary::{Dictionary, SpaceElement};
use crate::interpolation::error::InterpolationError;
use crate::interpolation::options::{StencilKind, StencilOptions};
use crate::interpolation::weight_set::Stencil;
use crate::topology::adjacency::Adjacency;
use crate::topology::element::ElementRef;

/// Grows a stencil around the element containing the query point.
pub trait StencilBuilder: Send + Sync {
    /// Stencil around `center`; `center` is always the first entry.
    fn compute_stencil(
        &self,
        dictionary: &Dictionary,
        center: SpaceElement,
    ) -> Result<Stencil, InterpolationError>;
}

/// Configured stencil computer.
#[derive(Clone, Debug, PartialEq)]
pub enum StencilComputer {
    OneCell,
    Rings {
        rings: usize,
        adjacency: Adjacency,
        max_elements: Option<usize>,
    },
}

impl StencilComputer {
    pub fn new(kind: StencilKind, options: &StencilOptions) -> Self {
        match kind {
            StencilKind::OneCell => StencilComputer::OneCell,
            StencilKind::Rings => StencilComputer::Rings {
                rings: options.rings,
                adjacency: options.adjacency,
                max_elements: options.max_elements,
            },
        }
    }

    pub fn kind(&self) -> StencilKind {
        match self {
            StencilComputer::OneCell => StencilKind::OneCell,
            StencilComputer::Rings { .. } => StencilKind::Rings,
        }
    }
}

impl StencilBuilder for StencilComputer {
    fn compute_stencil(
        &self,
        dictionary: &Dictionary,
        center: SpaceElement,
    ) -> Result<Stencil, InterpolationError> {
        if center.dictionary() != dictionary.id() {
            return Err(InterpolationError::StaleConfiguration {
                expected: dictionary.id(),
                found: center.dictionary(),
            });
        }
        match *self {
            StencilComputer::OneCell => Ok(vec![center]),
            StencilComputer::Rings {
                rings,
                adjacency,
                max_elements,
            } => grow_rings(dictionary, center, rings, adjacency, max_elements.unwrap_or(usize::MAX)),
        }
    }
}

fn grow_rings(
    dictionary: &Dictionary,
    center: SpaceElement,
    rings: usize,
    adjacency: Adjacency,
    limit: usize,
) -> Result<Stencil, InterpolationError> {
    let mesh = dictionary.mesh();
    let mut stencil = vec![center];
    let mut visited: HashSet<ElementRef> = HashSet::new();
    visited.insert(center.element());
    let mut frontier = vec![center.element()];

    for _ in 0..rings {
        if frontier.is_empty() || stencil.len() >= limit {
            break;
        }
        let mut layer = Vec::new();
        for element in &frontier {
            for neighbor in mesh.element_neighbors(*element, adjacency)? {
                if dictionary.contains_element(neighbor) && visited.insert(neighbor) {
                    layer.push(neighbor);
                }
            }
        }
        layer.sort_unstable();
        layer.truncate(limit - stencil.len());
        stencil.extend(layer.iter().filter_map(|&e| dictionary.space(e)));
        frontier = layer;
    }
    Ok(stencil)
}
