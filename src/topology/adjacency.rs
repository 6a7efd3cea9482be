//! Element-to-element adjacency through shared mesh connectivity.
//!
//! The node → element map is stored CSR-style (`xadj`/`adjncy`) like a dual
//! graph. Neighbor lists derived from it are always sorted and deduplicated,
//! so stencil growth over them is deterministic.

use serde::{Deserialize, Serialize};

use crate::topology::element::ElementRef;

/// Which shared entity makes two elements neighbors.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Adjacency {
    /// Elements sharing at least one node.
    #[default]
    Node,
    /// Elements sharing a full facet (node in 1D, edge in 2D, face in 3D).
    Face,
}

impl std::str::FromStr for Adjacency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "node" => Ok(Adjacency::Node),
            "face" => Ok(Adjacency::Face),
            other => Err(format!("unknown adjacency `{other}` (expected `node` or `face`)")),
        }
    }
}

/// CSR node → incident elements map.
#[derive(Debug, Clone, Default)]
pub struct NodeElements {
    /// `xadj[n] .. xadj[n+1]` spans the elements incident to node `n`.
    pub xadj: Vec<usize>,
    /// Concatenated incident elements, ascending per node.
    pub adjncy: Vec<ElementRef>,
}

impl NodeElements {
    /// Build from `(element, nodes)` pairs over `node_count` nodes.
    pub fn build<'a>(
        node_count: usize,
        elements: impl IntoIterator<Item = (ElementRef, &'a [usize])>,
    ) -> Self {
        let mut incident: Vec<Vec<ElementRef>> = vec![Vec::new(); node_count];
        for (element, nodes) in elements {
            for &node in nodes {
                incident[node].push(element);
            }
        }

        let mut xadj = Vec::with_capacity(node_count + 1);
        let mut adjncy = Vec::new();
        xadj.push(0);
        for mut list in incident {
            list.sort_unstable();
            list.dedup();
            adjncy.extend(list);
            xadj.push(adjncy.len());
        }
        Self { xadj, adjncy }
    }

    /// Elements incident to `node` (ascending). Empty for unknown nodes.
    #[inline]
    pub fn incident(&self, node: usize) -> &[ElementRef] {
        match (self.xadj.get(node), self.xadj.get(node + 1)) {
            (Some(&start), Some(&end)) => &self.adjncy[start..end],
            _ => &[],
        }
    }
}
