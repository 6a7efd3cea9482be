//! Linear-scan element finder.
//!
//! Tests every element in ascending handle order. Useful as a reference for
//! the octree and for meshes too small to be worth indexing.

use crate::algs::element_finder::{ElementTable, SpatialIndex};
use crate::data::dictionary::{Dictionary, SpaceElement};
use crate::interpolation::error::InterpolationError;

#[derive(Debug)]
pub struct BruteForce {
    table: ElementTable,
}

impl BruteForce {
    pub(crate) fn new(table: ElementTable) -> Self {
        log::debug!("brute-force finder over {} elements", table.len());
        Self { table }
    }

    /// Number of indexed elements.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.len() == 0
    }
}

impl SpatialIndex for BruteForce {
    fn find_element(
        &self,
        dictionary: &Dictionary,
        coordinate: &[f64],
    ) -> Result<Option<SpaceElement>, InterpolationError> {
        let Some(point) = self.table.prepare(dictionary, coordinate)? else {
            return Ok(None);
        };
        self.table.locate_among(dictionary, &point, 0..self.table.len())
    }
}
