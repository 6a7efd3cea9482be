//! Error types of the point interpolator.
//!
//! Not finding a containing element is *not* an error: it surfaces as an
//! empty [`WeightSet`](crate::interpolation::weight_set::WeightSet) or a
//! `None` location, because out-of-domain queries are routine when a physical
//! point is searched across many mesh partitions.

use thiserror::Error;

use crate::data::dictionary::DictionaryId;
use crate::geometry::mapping::MappingError;
use crate::mesh_error::MeshError;
use crate::topology::element::ElementRef;

/// Errors raised while (re)configuring the pipeline.
///
/// A failed reconfiguration leaves the previous configuration in place.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigurationError {
    /// A strategy selector names no known implementation.
    #[error("Unknown {role} `{name}` (expected one of: {expected})")]
    UnknownStrategy {
        role: &'static str,
        name: String,
        expected: &'static str,
    },
    /// Reconfiguration requested without a source dictionary.
    #[error("No source dictionary configured")]
    MissingSource,
    /// The source dictionary indexes no element.
    #[error("Dictionary `{0}` has no indexable elements")]
    EmptyDictionary(String),
    /// A zero-measure or inverted element was found and degenerate elements
    /// are rejected.
    #[error("Element {0} is degenerate (zero measure or inverted corner)")]
    DegenerateElement(ElementRef),
    /// An option value is out of range.
    #[error("Invalid option: {0}")]
    InvalidOption(String),
    /// The mesh behind the dictionary is inconsistent.
    #[error(transparent)]
    Mesh(#[from] MeshError),
}

/// Errors raised by a single query.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InterpolationError {
    /// Local-coordinate inversion failed inside `element`.
    #[error("Location degenerate in element {element} after {iterations} Newton iterations: {cause}")]
    LocationDegenerate {
        element: ElementRef,
        iterations: usize,
        #[source]
        cause: MappingError,
    },
    /// The weight scheme cannot be solved on the given stencil.
    #[error("Ill-conditioned reconstruction around element {element} ({points} stencil points)")]
    IllConditioned { element: ElementRef, points: usize },
    /// The coordinate's dimension differs from the mesh dimension.
    #[error("Coordinate has {found} components, mesh dimension is {expected}")]
    DimensionMismatch { expected: usize, found: usize },
    /// A handle from another configuration reached the current one.
    #[error("Stale configuration: expected dictionary {expected}, got {found}")]
    StaleConfiguration {
        expected: DictionaryId,
        found: DictionaryId,
    },
    /// Query issued before any successful configuration.
    #[error("Point interpolator is not configured")]
    Unconfigured,
    /// An empty stencil reached the weight engine.
    #[error("Empty stencil")]
    EmptyStencil,
    /// The mesh behind the dictionary is inconsistent.
    #[error(transparent)]
    Mesh(#[from] MeshError),
}

impl InterpolationError {
    pub(crate) fn degenerate(element: ElementRef, cause: MappingError) -> Self {
        InterpolationError::LocationDegenerate {
            element,
            iterations: cause.iterations(),
            cause,
        }
    }
}
