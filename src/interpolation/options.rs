//! Strategy selectors and tuning options of the point interpolator.
//!
//! The three selectors name which element finder, stencil computer and
//! interpolation function to build. They parse from their kebab-case names
//! (`"octree"`, `"one-cell"`, `"shape-function"`, ...) through [`FromStr`] and
//! through serde, so an external options system can drive them with plain
//! strings. Defaults form the reference pipeline: octree finder, one-cell
//! stencil, shape-function interpolation.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::geometry::mapping::InversionOpts;
use crate::interpolation::error::ConfigurationError;
use crate::topology::adjacency::Adjacency;

macro_rules! selector {
    (
        $(#[$meta:meta])*
        $name:ident, $role:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "kebab-case")]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// Every accepted selector name, comma separated.
            pub const NAMES: &'static str = concat!($( $text, ", " ),+);

            /// Selector name of this variant.
            pub fn name(self) -> &'static str {
                match self {
                    $( $name::$variant => $text ),+
                }
            }
        }

        impl FromStr for $name {
            type Err = ConfigurationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $text => Ok($name::$variant), )+
                    other => Err(ConfigurationError::UnknownStrategy {
                        role: $role,
                        name: other.to_string(),
                        expected: Self::NAMES,
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

selector! {
    /// Which spatial index locates the containing element.
    FinderKind, "element finder" {
        /// Adaptive 2^d tree over element bounding boxes.
        #[default]
        Octree => "octree",
        /// Linear scan over all elements.
        BruteForce => "brute-force",
    }
}

selector! {
    /// Which stencil grows around the containing element.
    StencilKind, "stencil computer" {
        /// The containing element only.
        #[default]
        OneCell => "one-cell",
        /// The containing element plus `rings` layers of neighbours.
        Rings => "rings",
    }
}

selector! {
    /// Which function turns a coordinate and a stencil into weights.
    FunctionKind, "interpolation function" {
        /// Shape functions of the containing element.
        #[default]
        ShapeFunction => "shape-function",
        /// Inverse-distance weighting over the stencil DOFs.
        InverseDistance => "inverse-distance",
        /// Linear least-squares reconstruction over the stencil DOFs.
        LeastSquares => "least-squares",
    }
}

/// Element finder tuning.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinderOptions {
    /// Octree leaves holding more elements than this are split.
    pub max_elements_per_leaf: usize,
    /// Octree depth limit.
    pub max_depth: usize,
    /// Relative point-in-element tolerance: reference-coordinate slack and
    /// bounding-box inflation as a fraction of the element extent.
    pub tolerance: f64,
    /// Fail configuration on degenerate elements instead of reporting them
    /// per query as degenerate locations. Degenerate means zero measure, or
    /// a non-convex or tangled quad/hex whose corner Jacobians change sign;
    /// Newton inversion stalls inside such cells.
    pub reject_degenerate_elements: bool,
}

impl Default for FinderOptions {
    fn default() -> Self {
        Self {
            max_elements_per_leaf: 8,
            max_depth: 12,
            tolerance: 1e-10,
            reject_degenerate_elements: false,
        }
    }
}

/// Stencil computer tuning (ignored by `one-cell`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StencilOptions {
    /// Number of neighbour layers around the containing element.
    pub rings: usize,
    /// Which shared entity makes two elements neighbours.
    pub adjacency: Adjacency,
    /// Upper bound on stencil size; layers are truncated in ascending
    /// element order.
    pub max_elements: Option<usize>,
}

impl Default for StencilOptions {
    fn default() -> Self {
        Self {
            rings: 1,
            adjacency: Adjacency::Node,
            max_elements: None,
        }
    }
}

/// Interpolation function tuning.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightOptions {
    /// Inverse-distance exponent.
    pub power: f64,
    /// Distance (relative to the stencil extent) under which a DOF counts as
    /// coincident with the coordinate and receives the full weight.
    pub coincidence_tolerance: f64,
}

impl Default for WeightOptions {
    fn default() -> Self {
        Self {
            power: 2.0,
            coincidence_tolerance: 1e-12,
        }
    }
}

/// Full configuration of an [`InterpolationPipeline`](crate::interpolation::pipeline::InterpolationPipeline)
/// apart from the source dictionary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct InterpolatorOptions {
    pub element_finder: FinderKind,
    pub stencil_computer: StencilKind,
    pub function: FunctionKind,
    pub finder: FinderOptions,
    pub stencil: StencilOptions,
    pub weights: WeightOptions,
    pub inversion: InversionOpts,
}

impl InterpolatorOptions {
    /// Default tuning with the three strategies selected by name.
    pub fn with_selectors(
        element_finder: &str,
        stencil_computer: &str,
        function: &str,
    ) -> Result<Self, ConfigurationError> {
        Ok(Self {
            element_finder: element_finder.parse()?,
            stencil_computer: stencil_computer.parse()?,
            function: function.parse()?,
            ..Self::default()
        })
    }

    /// Range-check every tuning value.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let invalid = |msg: String| Err(ConfigurationError::InvalidOption(msg));
        if self.finder.max_elements_per_leaf == 0 {
            return invalid("finder.max_elements_per_leaf must be positive".into());
        }
        if !(self.finder.tolerance.is_finite() && self.finder.tolerance >= 0.0) {
            return invalid(format!("finder.tolerance {} out of range", self.finder.tolerance));
        }
        if self.stencil.max_elements == Some(0) {
            return invalid("stencil.max_elements must be positive".into());
        }
        if !(self.weights.power.is_finite() && self.weights.power > 0.0) {
            return invalid(format!("weights.power {} out of range", self.weights.power));
        }
        if !(self.weights.coincidence_tolerance.is_finite()
            && self.weights.coincidence_tolerance >= 0.0)
        {
            return invalid(format!(
                "weights.coincidence_tolerance {} out of range",
                self.weights.coincidence_tolerance
            ));
        }
        if !(self.inversion.tolerance.is_finite() && self.inversion.tolerance > 0.0) {
            return invalid(format!("inversion.tolerance {} out of range", self.inversion.tolerance));
        }
        Ok(())
    }
}
