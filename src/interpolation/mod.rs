//! The point interpolator and its options, results and errors.

pub mod error;
pub mod options;
pub mod pipeline;
pub mod weight_set;

pub use error::{ConfigurationError, InterpolationError};
pub use options::{
    FinderKind, FinderOptions, FunctionKind, InterpolatorOptions, StencilKind, StencilOptions,
    WeightOptions,
};
pub use pipeline::InterpolationPipeline;
pub use weight_set::{Interpolation, Stencil, WeightSet};
