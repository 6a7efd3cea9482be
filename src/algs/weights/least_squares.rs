//! Linear least-squares reconstruction over the DOFs of a stencil.
//!
//! Fits `f(x) ≈ c0 + g·(x - x_q)/h` through the stencil DOFs, `x_q` being the
//! query coordinate and `h` the largest DOF distance. The reconstructed value
//! is `c0 = e0ᵀ (AᵀA)⁻¹ Aᵀ f`, so the weights are `w = A (AᵀA)⁻¹ e0`. They sum
//! to one and reproduce linear fields exactly.

use crate::algs::weights::{WeightEngine, distance, stencil_dofs};
use crate::data::dictionary::{Dictionary, SpaceElement};
use crate::interpolation::error::InterpolationError;
use crate::interpolation::weight_set::WeightSet;

/// Pivots below this fraction of the largest normal-matrix entry are singular.
const PIVOT_EPS: f64 = 1e-12;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LeastSquares;

impl WeightEngine for LeastSquares {
    fn compute_interpolation_weights(
        &self,
        dictionary: &Dictionary,
        coordinate: &[f64],
        stencil: &[SpaceElement],
    ) -> Result<WeightSet, InterpolationError> {
        let center = stencil.first().ok_or(InterpolationError::EmptyStencil)?;
        let dofs = stencil_dofs(dictionary, stencil)?;
        let ill = || InterpolationError::IllConditioned {
            element: center.element(),
            points: dofs.len(),
        };

        let dim = coordinate.len();
        let m = dim + 1;
        if dofs.len() < m {
            return Err(ill());
        }
        let h = dofs.iter().map(|(_, x)| distance(x, coordinate)).fold(0.0, f64::max);
        if !(h > 0.0) {
            return Err(ill());
        }

        let rows: Vec<Vec<f64>> = dofs
            .iter()
            .map(|(_, x)| {
                std::iter::once(1.0)
                    .chain(x.iter().zip(coordinate).map(|(xi, ci)| (xi - ci) / h))
                    .collect()
            })
            .collect();

        let mut normal = vec![0.0; m * m];
        for row in &rows {
            for i in 0..m {
                for j in 0..m {
                    normal[i * m + j] += row[i] * row[j];
                }
            }
        }
        let mut rhs = vec![0.0; m];
        rhs[0] = 1.0;
        let z = solve(&mut normal, &mut rhs, m).ok_or_else(ill)?;

        let entries = dofs
            .iter()
            .zip(&rows)
            .map(|((dof, _), row)| (*dof, row.iter().zip(&z).map(|(a, b)| a * b).sum()))
            .collect();
        Ok(WeightSet::new(dictionary.id(), entries))
    }
}

/// Gaussian elimination with partial pivoting on a dense `n × n` system.
fn solve(a: &mut [f64], b: &mut [f64], n: usize) -> Option<Vec<f64>> {
    let scale = a.iter().fold(0.0_f64, |m, x| m.max(x.abs()));
    let threshold = PIVOT_EPS * scale;
    for col in 0..n {
        let pivot = (col..n).max_by(|&i, &j| a[i * n + col].abs().total_cmp(&a[j * n + col].abs()))?;
        if !(a[pivot * n + col].abs() > threshold) {
            return None;
        }
        if pivot != col {
            for k in 0..n {
                a.swap(pivot * n + k, col * n + k);
            }
            b.swap(pivot, col);
        }
        for row in col + 1..n {
            let factor = a[row * n + col] / a[col * n + col];
            for k in col..n {
                a[row * n + k] -= factor * a[col * n + k];
            }
            b[row] -= factor * b[col];
        }
    }
    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| a[row * n + k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row * n + row];
    }
    Some(x)
}
