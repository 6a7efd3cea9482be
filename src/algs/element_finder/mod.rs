//! Point location: find the element of a dictionary containing a coordinate.
//!
//! Both finders share one candidate test. Candidates are visited in ascending
//! [`ElementRef`] order; each is pre-filtered on its (slightly inflated)
//! bounding box, then the coordinate is pulled back to reference coordinates
//! and tested against the reference element. The first hit wins, so a point
//! on a shared boundary always resolves to the lowest element handle whatever
//! finder is used.
//!
//! When no candidate contains the point but some candidate's pull-back
//! failed (singular Jacobian or Newton not converging), the query reports
//! [`InterpolationError::LocationDegenerate`] instead of `None`: the point
//! may well lie in that element, and returning "outside" would be a lie.

pub mod brute_force;
pub mod octree;

use crate::data::coordinates::pad;
use crate::data::dictionary::{Dictionary, DictionaryId, SpaceElement};
use crate::geometry::bounds::Aabb;
use crate::geometry::mapping::{InversionOpts, MappingError, physical_to_reference};
use crate::geometry::metrics::is_degenerate;
use crate::interpolation::error::{ConfigurationError, InterpolationError};
use crate::interpolation::options::{FinderKind, FinderOptions};
use crate::topology::cell_type::CellType;
use crate::topology::element::ElementRef;

pub use brute_force::BruteForce;
pub use octree::Octree;

/// Relative measure under which an element counts as degenerate at build time.
/// Quads and hexes with corner Jacobians of both signs are degenerate too.
const DEGENERATE_EPS: f64 = 1e-12;

/// Locates the element of a dictionary containing a coordinate.
pub trait SpatialIndex: Send + Sync {
    /// `Ok(None)` when the coordinate lies outside every element (within the
    /// finder tolerance); never an error for out-of-domain points.
    fn find_element(
        &self,
        dictionary: &Dictionary,
        coordinate: &[f64],
    ) -> Result<Option<SpaceElement>, InterpolationError>;
}

/// Configured element finder.
#[derive(Debug)]
pub enum ElementFinder {
    Octree(Octree),
    BruteForce(BruteForce),
}

impl ElementFinder {
    /// Index every element of `dictionary` with the selected scheme.
    pub fn build(
        kind: FinderKind,
        dictionary: &Dictionary,
        options: &FinderOptions,
        inversion: &InversionOpts,
    ) -> Result<Self, ConfigurationError> {
        let table = ElementTable::build(dictionary, options, inversion)?;
        Ok(match kind {
            FinderKind::Octree => ElementFinder::Octree(Octree::new(table, options)),
            FinderKind::BruteForce => ElementFinder::BruteForce(BruteForce::new(table)),
        })
    }

    pub fn kind(&self) -> FinderKind {
        match self {
            ElementFinder::Octree(_) => FinderKind::Octree,
            ElementFinder::BruteForce(_) => FinderKind::BruteForce,
        }
    }
}

impl SpatialIndex for ElementFinder {
    fn find_element(
        &self,
        dictionary: &Dictionary,
        coordinate: &[f64],
    ) -> Result<Option<SpaceElement>, InterpolationError> {
        match self {
            ElementFinder::Octree(tree) => tree.find_element(dictionary, coordinate),
            ElementFinder::BruteForce(scan) => scan.find_element(dictionary, coordinate),
        }
    }
}

/// One indexed element: handle, cell type and inflated bounding box.
#[derive(Clone, Debug)]
pub(crate) struct IndexedElement {
    pub(crate) element: ElementRef,
    pub(crate) cell_type: CellType,
    pub(crate) bounds: Aabb,
}

/// Elements of one dictionary in ascending handle order, with the settings
/// of the candidate test.
#[derive(Debug)]
pub(crate) struct ElementTable {
    dictionary: DictionaryId,
    dimension: usize,
    tolerance: f64,
    inversion: InversionOpts,
    pub(crate) elements: Vec<IndexedElement>,
    pub(crate) bounds: Aabb,
}

impl ElementTable {
    pub(crate) fn build(
        dictionary: &Dictionary,
        options: &FinderOptions,
        inversion: &InversionOpts,
    ) -> Result<Self, ConfigurationError> {
        if dictionary.is_empty() {
            return Err(ConfigurationError::EmptyDictionary(dictionary.name().to_string()));
        }
        let mesh = dictionary.mesh();
        let dimension = dictionary.dimension();
        let mut elements = Vec::with_capacity(dictionary.element_count());
        let mut bounds = Aabb::EMPTY;
        let mut degenerate = 0usize;

        for element in dictionary.elements() {
            let cell_type = mesh.cell_type(element)?;
            let vertices = mesh.element_vertices(element)?;
            if is_degenerate(cell_type, &vertices, DEGENERATE_EPS) {
                if options.reject_degenerate_elements {
                    return Err(ConfigurationError::DegenerateElement(element));
                }
                log::warn!(
                    "dictionary `{}`: element {element} ({cell_type:?}) has zero measure or an inverted corner",
                    dictionary.name()
                );
                degenerate += 1;
            }
            let raw = Aabb::from_points(&vertices);
            let element_bounds = raw.inflate(options.tolerance * raw.longest_extent(), dimension);
            bounds = bounds.union(&element_bounds);
            elements.push(IndexedElement {
                element,
                cell_type,
                bounds: element_bounds,
            });
        }
        if degenerate > 0 {
            log::warn!(
                "dictionary `{}`: {degenerate} degenerate element(s) indexed; queries inside them fail",
                dictionary.name()
            );
        }

        Ok(Self {
            dictionary: dictionary.id(),
            dimension,
            tolerance: options.tolerance,
            inversion: *inversion,
            elements,
            bounds,
        })
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.elements.len()
    }

    #[inline]
    pub(crate) fn dimension(&self) -> usize {
        self.dimension
    }

    /// Validate a query and pad it to three components.
    ///
    /// `Ok(None)` for non-finite coordinates, which lie in no element.
    pub(crate) fn prepare(
        &self,
        dictionary: &Dictionary,
        coordinate: &[f64],
    ) -> Result<Option<[f64; 3]>, InterpolationError> {
        if dictionary.id() != self.dictionary {
            return Err(InterpolationError::StaleConfiguration {
                expected: self.dictionary,
                found: dictionary.id(),
            });
        }
        if coordinate.len() != self.dimension {
            return Err(InterpolationError::DimensionMismatch {
                expected: self.dimension,
                found: coordinate.len(),
            });
        }
        if coordinate.iter().any(|x| !x.is_finite()) {
            return Ok(None);
        }
        Ok(Some(pad(coordinate)))
    }

    /// Run the candidate test over table slots given in ascending order.
    pub(crate) fn locate_among(
        &self,
        dictionary: &Dictionary,
        point: &[f64; 3],
        candidates: impl IntoIterator<Item = usize>,
    ) -> Result<Option<SpaceElement>, InterpolationError> {
        let mesh = dictionary.mesh();
        let mut failure: Option<(ElementRef, MappingError)> = None;

        for slot in candidates {
            let indexed = &self.elements[slot];
            if !indexed.bounds.contains(point) {
                continue;
            }
            let vertices = mesh.element_vertices(indexed.element)?;
            match physical_to_reference(indexed.cell_type, &vertices, point, &self.inversion) {
                Ok(reference) => {
                    if indexed.cell_type.contains_reference(&reference, self.tolerance) {
                        return Ok(dictionary.space(indexed.element));
                    }
                }
                Err(cause) => {
                    log::trace!("pull-back into {} failed: {cause}", indexed.element);
                    failure.get_or_insert((indexed.element, cause));
                }
            }
        }

        match failure {
            Some((element, cause)) => Err(InterpolationError::degenerate(element, cause)),
            None => Ok(None),
        }
    }
}
