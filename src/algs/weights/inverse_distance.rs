//! Inverse-distance weighting over the DOFs of a stencil.
//!
//! `w_i = d_i^-p / Σ d_j^-p`. A DOF closer to the coordinate than
//! `coincidence_tolerance` times the stencil extent takes the full weight
//! (the first such DOF in stencil order), which keeps the scheme finite and
//! exact at DOF locations.

use crate::algs::weights::{WeightEngine, distance, stencil_dofs};
use crate::data::dictionary::{Dictionary, SpaceElement};
use crate::interpolation::error::InterpolationError;
use crate::interpolation::options::WeightOptions;
use crate::interpolation::weight_set::WeightSet;

#[derive(Clone, Debug, PartialEq)]
pub struct InverseDistance {
    power: f64,
    coincidence_tolerance: f64,
}

impl InverseDistance {
    pub fn new(options: &WeightOptions) -> Self {
        Self {
            power: options.power,
            coincidence_tolerance: options.coincidence_tolerance,
        }
    }
}

impl Default for InverseDistance {
    fn default() -> Self {
        Self::new(&WeightOptions::default())
    }
}

impl WeightEngine for InverseDistance {
    fn compute_interpolation_weights(
        &self,
        dictionary: &Dictionary,
        coordinate: &[f64],
        stencil: &[SpaceElement],
    ) -> Result<WeightSet, InterpolationError> {
        let dofs = stencil_dofs(dictionary, stencil)?;
        let distances: Vec<f64> = dofs.iter().map(|(_, x)| distance(x, coordinate)).collect();
        let extent = distances.iter().copied().fold(0.0, f64::max);
        let near = self.coincidence_tolerance * extent;

        if let Some(i) = distances.iter().position(|&d| d <= near) {
            return Ok(WeightSet::new(dictionary.id(), vec![(dofs[i].0, 1.0)]));
        }

        let raw: Vec<f64> = distances.iter().map(|d| d.powf(-self.power)).collect();
        let total: f64 = raw.iter().sum();
        Ok(WeightSet::new(
            dictionary.id(),
            dofs.iter().zip(raw).map(|((dof, _), w)| (*dof, w / total)).collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::coordinates::Coordinates;
    use crate::topology::cell_type::CellType;
    use crate::topology::element::ElementRef;
    use crate::topology::mesh::{ElementGroup, Mesh};
    use std::sync::Arc;

    fn segment() -> Dictionary {
        let mesh = Mesh::try_new(
            Coordinates::from_rows(&[[5.0], [10.0]]).unwrap(),
            vec![ElementGroup::new("cells", CellType::Segment, vec![0, 1])],
        )
        .unwrap();
        Dictionary::continuous("u", Arc::new(mesh))
    }

    #[test]
    fn midpoint_splits_evenly() {
        let dict = segment();
        let stencil = [dict.space(ElementRef::new(0, 0)).unwrap()];
        let w = InverseDistance::default()
            .compute_interpolation_weights(&dict, &[7.5], &stencil)
            .unwrap();
        assert!((w.weight_of(0).unwrap() - 0.5).abs() < 1e-12);
        assert!((w.sum() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn closer_dof_weighs_more() {
        let dict = segment();
        let stencil = [dict.space(ElementRef::new(0, 0)).unwrap()];
        let w = InverseDistance::default()
            .compute_interpolation_weights(&dict, &[6.0], &stencil)
            .unwrap();
        // d = 1 and 4 with p = 2: 1 : 1/16.
        assert!((w.weight_of(0).unwrap() - 16.0 / 17.0).abs() < 1e-12);
    }

    #[test]
    fn coincident_dof_takes_full_weight() {
        let dict = segment();
        let stencil = [dict.space(ElementRef::new(0, 0)).unwrap()];
        let w = InverseDistance::default()
            .compute_interpolation_weights(&dict, &[10.0], &stencil)
            .unwrap();
        assert_eq!(w.into_entries(), vec![(1, 1.0)]);
    }
}
