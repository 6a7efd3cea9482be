//! Adaptive 2^d tree over element bounding boxes.
//!
//! Nodes live in one arena; a split node owns `2^dim` consecutive children
//! starting at `first_child`, child `i` taking the upper half of axis `a`
//! when bit `a` of `i` is set. Leaves point into one flat `items` array of
//! element-table slots, kept in ascending order so the shared candidate test
//! sees candidates lowest handle first.
//!
//! An element is stored in every leaf its bounding box overlaps, so the leaf
//! containing a point always holds every element that can contain it.

use std::ops::Range;

use crate::algs::element_finder::{ElementTable, SpatialIndex};
use crate::data::dictionary::{Dictionary, SpaceElement};
use crate::geometry::bounds::Aabb;
use crate::interpolation::error::InterpolationError;
use crate::interpolation::options::FinderOptions;

#[derive(Clone, Debug)]
struct OctreeNode {
    bounds: Aabb,
    first_child: Option<usize>,
    items: Range<usize>,
}

impl OctreeNode {
    fn leaf(bounds: Aabb) -> Self {
        Self {
            bounds,
            first_child: None,
            items: 0..0,
        }
    }
}

/// Octree (quadtree in 2D, binary tree in 1D) element finder.
#[derive(Debug)]
pub struct Octree {
    table: ElementTable,
    nodes: Vec<OctreeNode>,
    items: Vec<usize>,
}

impl Octree {
    pub(crate) fn new(table: ElementTable, options: &FinderOptions) -> Self {
        let mut tree = Octree {
            nodes: vec![OctreeNode::leaf(table.bounds)],
            items: Vec::with_capacity(table.len()),
            table,
        };
        let dimension = tree.table.dimension();
        let mut deepest = 0;
        let mut pending = vec![(0usize, (0..tree.table.len()).collect::<Vec<_>>(), 0usize)];

        while let Some((node, slots, depth)) = pending.pop() {
            deepest = deepest.max(depth);
            let split = if slots.len() > options.max_elements_per_leaf && depth < options.max_depth {
                tree.partition(&tree.nodes[node].bounds, dimension, &slots)
            } else {
                None
            };
            match split {
                Some(children) => {
                    let first = tree.nodes.len();
                    tree.nodes[node].first_child = Some(first);
                    for (offset, (bounds, part)) in children.into_iter().enumerate() {
                        tree.nodes.push(OctreeNode::leaf(bounds));
                        pending.push((first + offset, part, depth + 1));
                    }
                }
                None => {
                    let start = tree.items.len();
                    tree.items.extend_from_slice(&slots);
                    tree.nodes[node].items = start..tree.items.len();
                }
            }
        }

        log::debug!(
            "octree: {} elements, {} nodes, {} leaves, depth {}, {} leaf entries",
            tree.table.len(),
            tree.nodes.len(),
            tree.leaf_count(),
            deepest,
            tree.items.len()
        );
        tree
    }

    /// Split `bounds` at its center; `None` when no child would hold fewer
    /// elements than the parent.
    fn partition(
        &self,
        bounds: &Aabb,
        dimension: usize,
        slots: &[usize],
    ) -> Option<Vec<(Aabb, Vec<usize>)>> {
        let center = bounds.center();
        let children: Vec<(Aabb, Vec<usize>)> = (0..1usize << dimension)
            .map(|child| {
                let mut b = *bounds;
                for axis in 0..dimension {
                    if (child >> axis) & 1 == 1 {
                        b.min[axis] = center[axis];
                    } else {
                        b.max[axis] = center[axis];
                    }
                }
                let part = slots
                    .iter()
                    .copied()
                    .filter(|&slot| self.table.elements[slot].bounds.overlaps(&b))
                    .collect();
                (b, part)
            })
            .collect();
        children
            .iter()
            .any(|(_, part)| part.len() < slots.len())
            .then_some(children)
    }

    /// Number of leaves.
    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.first_child.is_none()).count()
    }

    /// Number of indexed elements.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.len() == 0
    }

    fn leaf_for(&self, point: &[f64; 3]) -> &OctreeNode {
        let dimension = self.table.dimension();
        let mut node = &self.nodes[0];
        while let Some(first) = node.first_child {
            let center = node.bounds.center();
            let child = (0..dimension)
                .filter(|&axis| point[axis] > center[axis])
                .fold(0usize, |acc, axis| acc | (1 << axis));
            node = &self.nodes[first + child];
        }
        node
    }
}

impl SpatialIndex for Octree {
    fn find_element(
        &self,
        dictionary: &Dictionary,
        coordinate: &[f64],
    ) -> Result<Option<SpaceElement>, InterpolationError> {
        let Some(point) = self.table.prepare(dictionary, coordinate)? else {
            return Ok(None);
        };
        if !self.table.bounds.contains(&point) {
            return Ok(None);
        }
        let leaf = self.leaf_for(&point);
        self.table
            .locate_among(dictionary, &point, self.items[leaf.items.clone()].iter().copied())
    }
}
