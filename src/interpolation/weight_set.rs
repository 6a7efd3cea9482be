//! Sparse interpolation weights and the full result of one query.

use serde::{Deserialize, Serialize};

use crate::data::dictionary::{DictionaryId, SpaceElement};

/// Ordered sequence of space elements contributing to one interpolation.
pub type Stencil = Vec<SpaceElement>;

/// Sparse `(global DOF index, weight)` pairs of one dictionary.
///
/// A field value at the queried coordinate is reconstructed as
/// `Σ weight · value[dof]`. The set is empty exactly when point location
/// failed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeightSet {
    dictionary: DictionaryId,
    entries: Vec<(usize, f64)>,
}

impl WeightSet {
    /// Weights over the DOFs of `dictionary`.
    pub fn new(dictionary: DictionaryId, entries: Vec<(usize, f64)>) -> Self {
        Self {
            dictionary,
            entries,
        }
    }

    /// The "not found" result.
    pub fn empty(dictionary: DictionaryId) -> Self {
        Self::new(dictionary, Vec::new())
    }

    /// Dictionary whose DOF numbering the indices refer to.
    #[inline]
    pub fn dictionary(&self) -> DictionaryId {
        self.dictionary
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `(dof, weight)` pairs in emission order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.entries.iter().copied()
    }

    /// DOF indices in emission order.
    pub fn points(&self) -> impl Iterator<Item = usize> + '_ {
        self.entries.iter().map(|(dof, _)| *dof)
    }

    /// Weights in emission order.
    pub fn weights(&self) -> impl Iterator<Item = f64> + '_ {
        self.entries.iter().map(|(_, w)| *w)
    }

    /// Sum of all weights (1 for partition-of-unity schemes).
    pub fn sum(&self) -> f64 {
        self.weights().sum()
    }

    /// Weight attached to `dof`, summing repeated entries.
    pub fn weight_of(&self, dof: usize) -> Option<f64> {
        let mut found = None;
        for (d, w) in self.iter() {
            if d == dof {
                *found.get_or_insert(0.0) += w;
            }
        }
        found
    }

    /// Reconstruct a scalar field stored one value per DOF.
    ///
    /// Returns `None` when a DOF index is out of range of `values` or the set
    /// is empty.
    pub fn apply(&self, values: &[f64]) -> Option<f64> {
        self.apply_component(values, 1, 0)
    }

    /// Reconstruct component `component` of a field stored row-major with
    /// `stride` values per DOF.
    pub fn apply_component(&self, values: &[f64], stride: usize, component: usize) -> Option<f64> {
        if self.is_empty() || component >= stride {
            return None;
        }
        self.iter().try_fold(0.0, |acc, (dof, w)| {
            values.get(dof * stride + component).map(|v| acc + w * v)
        })
    }

    /// Consume the set, returning its entries.
    pub fn into_entries(self) -> Vec<(usize, f64)> {
        self.entries
    }
}

/// Full storage of one successful query: containing element, stencil and weights.
#[derive(Clone, Debug, PartialEq)]
pub struct Interpolation {
    /// Element containing the coordinate.
    pub element: SpaceElement,
    /// Stencil grown around `element`; `stencil[0] == element`.
    pub stencil: Stencil,
    /// Interpolation weights.
    pub weights: WeightSet,
}
