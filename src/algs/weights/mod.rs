//! Interpolation functions: turn a coordinate and a stencil into DOF weights.

pub mod inverse_distance;
pub mod least_squares;
pub mod shape_function;

use itertools::Itertools;

use crate::data::dictionary::{Dictionary, SpaceElement};
use crate::geometry::mapping::InversionOpts;
use crate::interpolation::error::InterpolationError;
use crate::interpolation::options::{FunctionKind, WeightOptions};
use crate::interpolation::weight_set::WeightSet;
use crate::mesh_error::MeshError;

pub use inverse_distance::InverseDistance;
pub use least_squares::LeastSquares;
pub use shape_function::ShapeFunction;

/// Computes interpolation weights at a coordinate from a stencil.
pub trait WeightEngine: Send + Sync {
    /// Weights over DOFs of `dictionary`. `stencil[0]` is the element
    /// containing `coordinate`.
    fn compute_interpolation_weights(
        &self,
        dictionary: &Dictionary,
        coordinate: &[f64],
        stencil: &[SpaceElement],
    ) -> Result<WeightSet, InterpolationError>;
}

/// Configured interpolation function.
#[derive(Clone, Debug, PartialEq)]
pub enum InterpolationFunction {
    ShapeFunction(ShapeFunction),
    InverseDistance(InverseDistance),
    LeastSquares(LeastSquares),
}

impl InterpolationFunction {
    pub fn new(kind: FunctionKind, options: &WeightOptions, inversion: &InversionOpts) -> Self {
        match kind {
            FunctionKind::ShapeFunction => {
                InterpolationFunction::ShapeFunction(ShapeFunction::new(*inversion))
            }
            FunctionKind::InverseDistance => {
                InterpolationFunction::InverseDistance(InverseDistance::new(options))
            }
            FunctionKind::LeastSquares => InterpolationFunction::LeastSquares(LeastSquares),
        }
    }

    pub fn kind(&self) -> FunctionKind {
        match self {
            InterpolationFunction::ShapeFunction(_) => FunctionKind::ShapeFunction,
            InterpolationFunction::InverseDistance(_) => FunctionKind::InverseDistance,
            InterpolationFunction::LeastSquares(_) => FunctionKind::LeastSquares,
        }
    }
}

impl WeightEngine for InterpolationFunction {
    fn compute_interpolation_weights(
        &self,
        dictionary: &Dictionary,
        coordinate: &[f64],
        stencil: &[SpaceElement],
    ) -> Result<WeightSet, InterpolationError> {
        if coordinate.len() != dictionary.dimension() {
            return Err(InterpolationError::DimensionMismatch {
                expected: dictionary.dimension(),
                found: coordinate.len(),
            });
        }
        if stencil.is_empty() {
            return Err(InterpolationError::EmptyStencil);
        }
        match self {
            InterpolationFunction::ShapeFunction(f) => {
                f.compute_interpolation_weights(dictionary, coordinate, stencil)
            }
            InterpolationFunction::InverseDistance(f) => {
                f.compute_interpolation_weights(dictionary, coordinate, stencil)
            }
            InterpolationFunction::LeastSquares(f) => {
                f.compute_interpolation_weights(dictionary, coordinate, stencil)
            }
        }
    }
}

/// DOFs of one space element, rejecting handles of another dictionary.
pub(crate) fn element_dofs<'d>(
    dictionary: &'d Dictionary,
    space: &SpaceElement,
) -> Result<&'d [usize], InterpolationError> {
    if space.dictionary() != dictionary.id() {
        return Err(InterpolationError::StaleConfiguration {
            expected: dictionary.id(),
            found: space.dictionary(),
        });
    }
    dictionary
        .element_dofs(space)
        .ok_or_else(|| MeshError::UnknownElement(space.element()).into())
}

/// Distinct DOFs of a stencil, in first-seen stencil order, with their
/// coordinates.
pub(crate) fn stencil_dofs(
    dictionary: &Dictionary,
    stencil: &[SpaceElement],
) -> Result<Vec<(usize, Vec<f64>)>, InterpolationError> {
    let mut dofs = Vec::new();
    for space in stencil {
        dofs.extend_from_slice(element_dofs(dictionary, space)?);
    }
    dofs.into_iter()
        .unique()
        .map(|dof| {
            dictionary
                .dof_coordinates(dof)
                .map(|x| (dof, x.to_vec()))
                .ok_or_else(|| {
                    InterpolationError::from(MeshError::InvalidGeometry(format!(
                        "dof {dof} has no coordinates"
                    )))
                })
        })
        .collect()
}

fn distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum::<f64>().sqrt()
}
