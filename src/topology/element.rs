//! `ElementRef`: a compact, copyable handle for mesh elements
//!
//! Every geometric cell of a mesh is named by the element group it belongs to
//! and its local index inside that group. The pair is immutable for the
//! lifetime of the mesh, so handles can be stored freely in spatial indices
//! and stencils.
//!
//! Handles order lexicographically by `(group, index)`. Element finders rely
//! on this ordering for their deterministic tie-break: when a coordinate lies
//! on a boundary shared by several elements, the lowest handle wins.

use std::fmt;

/// Handle of one geometric element: `(group, local index)`.
#[derive(
    Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct ElementRef {
    group: u32,
    index: u32,
}

impl ElementRef {
    /// Creates a handle from a group handle and a local index.
    #[inline]
    pub const fn new(group: u32, index: u32) -> Self {
        Self { group, index }
    }

    /// Element group this element belongs to.
    #[inline]
    pub const fn group(self) -> usize {
        self.group as usize
    }

    /// Local index of the element inside its group.
    #[inline]
    pub const fn index(self) -> usize {
        self.index as usize
    }
}

// -----------------------------------------------------------------------------
// Formatting traits
// -----------------------------------------------------------------------------

impl fmt::Debug for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ElementRef")
            .field(&self.group)
            .field(&self.index)
            .finish()
    }
}

/// Prints `group:index`.
impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group, self.index)
    }
}

#[cfg(test)]
mod layout_tests {
    use super::*;
    use static_assertions::assert_eq_size;

    // Stencils and octree leaves store handles by value.
    assert_eq_size!(ElementRef, u64);
}
