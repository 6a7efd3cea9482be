//! Node coordinate storage for meshes.
//!
//! Coordinates are stored as one flat array with a fixed dimension per node.

use crate::mesh_error::MeshError;

/// Coordinate storage with an attached spatial dimension.
#[derive(Clone, Debug)]
pub struct Coordinates {
    dimension: usize,
    values: Vec<f64>,
}

impl Coordinates {
    /// Wrap a flat `[x0, y0, x1, y1, ..]` array, validating the layout.
    pub fn try_new(dimension: usize, values: Vec<f64>) -> Result<Self, MeshError> {
        if !(1..=3).contains(&dimension) {
            return Err(MeshError::UnsupportedDimension(dimension));
        }
        if values.len() % dimension != 0 {
            return Err(MeshError::CoordinateDimensionMismatch {
                len: values.len(),
                dimension,
            });
        }
        if let Some(pos) = values.iter().position(|v| !v.is_finite()) {
            return Err(MeshError::NonFiniteCoordinate {
                node: pos / dimension,
            });
        }
        Ok(Self { dimension, values })
    }

    /// Build from per-node rows; every row must have `dimension` entries.
    pub fn from_rows<const D: usize>(rows: &[[f64; D]]) -> Result<Self, MeshError> {
        Self::try_new(D, rows.iter().flatten().copied().collect())
    }

    /// Returns the spatial dimension per node.
    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len() / self.dimension
    }

    /// Whether no node is stored.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Read-only view of the coordinates of `node`, or `None` when out of range.
    #[inline]
    pub fn get(&self, node: usize) -> Option<&[f64]> {
        let start = node.checked_mul(self.dimension)?;
        self.values.get(start..start + self.dimension)
    }

    /// Coordinates of `node` padded with zeros to three components.
    #[inline]
    pub fn padded(&self, node: usize) -> Option<[f64; 3]> {
        self.get(node).map(pad)
    }
}

/// Pad a 1-, 2- or 3-component coordinate to three components.
#[inline]
pub fn pad(slice: &[f64]) -> [f64; 3] {
    let mut out = [0.0; 3];
    for (o, v) in out.iter_mut().zip(slice) {
        *o = *v;
    }
    out
}
