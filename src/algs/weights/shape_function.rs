//! Shape-function interpolation inside the containing element.
//!
//! Pulls the coordinate back to reference coordinates and uses the element's
//! linear shape functions as weights over its DOFs. Only `stencil[0]` is
//! used. For cell-centered dictionaries the single element DOF gets weight 1.

use crate::algs::weights::{WeightEngine, element_dofs};
use crate::data::coordinates::pad;
use crate::data::dictionary::{Dictionary, DofLayout, SpaceElement};
use crate::geometry::mapping::{InversionOpts, physical_to_reference, shape_functions};
use crate::interpolation::error::InterpolationError;
use crate::interpolation::weight_set::WeightSet;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ShapeFunction {
    inversion: InversionOpts,
}

impl ShapeFunction {
    pub fn new(inversion: InversionOpts) -> Self {
        Self { inversion }
    }
}

impl WeightEngine for ShapeFunction {
    fn compute_interpolation_weights(
        &self,
        dictionary: &Dictionary,
        coordinate: &[f64],
        stencil: &[SpaceElement],
    ) -> Result<WeightSet, InterpolationError> {
        let center = stencil.first().ok_or(InterpolationError::EmptyStencil)?;
        let dofs = element_dofs(dictionary, center)?;
        if dictionary.layout() == DofLayout::CellCentered {
            return Ok(WeightSet::new(
                dictionary.id(),
                dofs.iter().map(|&dof| (dof, 1.0)).collect(),
            ));
        }

        let element = center.element();
        let mesh = dictionary.mesh();
        let cell_type = mesh.cell_type(element)?;
        let vertices = mesh.element_vertices(element)?;
        let reference = physical_to_reference(cell_type, &vertices, &pad(coordinate), &self.inversion)
            .map_err(|cause| InterpolationError::degenerate(element, cause))?;
        let (values, _) = shape_functions(cell_type, &reference)
            .map_err(|cause| InterpolationError::degenerate(element, cause))?;

        Ok(WeightSet::new(
            dictionary.id(),
            dofs.iter().copied().zip(values).collect(),
        ))
    }
}
