//! The point interpolator: element finder → stencil computer → interpolation
//! function, over one source dictionary.
//!
//! # Configuration snapshots
//! The three components and the source dictionary they were built against
//! form one immutable snapshot behind an `Arc`. Queries clone the current
//! snapshot under a short read lock and run entirely on it; reconfiguration
//! builds a complete new snapshot *outside* the lock and swaps it in under
//! the write lock. A query therefore sees either the old or the new
//! configuration, never a mix, and every query issued after
//! [`InterpolationPipeline::reconfigure`] returns sees the new one.
//!
//! Reconfigurations are serialized by a separate mutex so two concurrent
//! setters cannot lose each other's updates. A failing reconfiguration leaves
//! the active snapshot untouched.
//!
//! Components never cache the dictionary: each call receives it from the
//! snapshot, and handles resolved against another dictionary are rejected
//! with [`InterpolationError::StaleConfiguration`].

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::algs::element_finder::{ElementFinder, SpatialIndex};
use crate::algs::stencil::{StencilBuilder, StencilComputer};
use crate::algs::weights::{InterpolationFunction, WeightEngine};
use crate::data::dictionary::Dictionary;
use crate::interpolation::error::{ConfigurationError, InterpolationError};
use crate::interpolation::options::InterpolatorOptions;
use crate::interpolation::weight_set::{Interpolation, WeightSet};

#[derive(Debug)]
struct Configured {
    source: Arc<Dictionary>,
    options: InterpolatorOptions,
    finder: ElementFinder,
    stencil: StencilComputer,
    function: InterpolationFunction,
}

impl Configured {
    fn build(
        source: Arc<Dictionary>,
        options: InterpolatorOptions,
    ) -> Result<Self, ConfigurationError> {
        options.validate()?;
        let finder =
            ElementFinder::build(options.element_finder, &source, &options.finder, &options.inversion)?;
        let stencil = StencilComputer::new(options.stencil_computer, &options.stencil);
        let function =
            InterpolationFunction::new(options.function, &options.weights, &options.inversion);
        Ok(Self {
            source,
            options,
            finder,
            stencil,
            function,
        })
    }

    fn locate(&self, coordinate: &[f64]) -> Result<Option<Interpolation>, InterpolationError> {
        let dictionary = &*self.source;
        let Some(element) = self.finder.find_element(dictionary, coordinate)? else {
            return Ok(None);
        };
        let stencil = self.stencil.compute_stencil(dictionary, element)?;
        let weights = self
            .function
            .compute_interpolation_weights(dictionary, coordinate, &stencil)?;
        debug_assert!(!weights.is_empty(), "located point produced no weights");
        debug_assert!(
            weights.points().all(|dof| dictionary.contains_dof(dof)),
            "weight outside the source dictionary"
        );
        Ok(Some(Interpolation {
            element,
            stencil,
            weights,
        }))
    }

    fn locate_and_interpolate(&self, coordinate: &[f64]) -> Result<WeightSet, InterpolationError> {
        Ok(match self.locate(coordinate)? {
            Some(found) => found.weights,
            None => WeightSet::empty(self.source.id()),
        })
    }
}

/// Point interpolator over one source dictionary.
#[derive(Debug, Default)]
pub struct InterpolationPipeline {
    active: RwLock<Option<Arc<Configured>>>,
    reconfiguring: Mutex<()>,
}

static_assertions::assert_impl_all!(InterpolationPipeline: Send, Sync);

impl InterpolationPipeline {
    /// An unconfigured pipeline; queries fail with
    /// [`InterpolationError::Unconfigured`] until a source is set.
    pub fn new() -> Self {
        Self::default()
    }

    /// A pipeline configured on `source`.
    pub fn with_source(
        source: Arc<Dictionary>,
        options: InterpolatorOptions,
    ) -> Result<Self, ConfigurationError> {
        let pipeline = Self::new();
        pipeline.reconfigure(source, options)?;
        Ok(pipeline)
    }

    /// Rebuild all three components on `source` and swap them in atomically.
    pub fn reconfigure(
        &self,
        source: Arc<Dictionary>,
        options: InterpolatorOptions,
    ) -> Result<(), ConfigurationError> {
        let _serial = self.reconfiguring.lock();
        self.install(source, options)
    }

    /// [`reconfigure`](Self::reconfigure) with the three strategies given by
    /// name and the current tuning (defaults when unconfigured).
    pub fn reconfigure_named(
        &self,
        source: Arc<Dictionary>,
        element_finder: &str,
        stencil_computer: &str,
        function: &str,
    ) -> Result<(), ConfigurationError> {
        let _serial = self.reconfiguring.lock();
        let mut options = self.options().unwrap_or_default();
        options.element_finder = element_finder.parse()?;
        options.stencil_computer = stencil_computer.parse()?;
        options.function = function.parse()?;
        self.install(source, options)
    }

    /// Change the source dictionary, keeping the current options.
    pub fn set_source(&self, source: Arc<Dictionary>) -> Result<(), ConfigurationError> {
        let _serial = self.reconfiguring.lock();
        let options = self.options().unwrap_or_default();
        self.install(source, options)
    }

    /// Change every option, keeping the current source.
    pub fn set_options(&self, options: InterpolatorOptions) -> Result<(), ConfigurationError> {
        self.update(|current| {
            *current = options;
            Ok(())
        })
    }

    /// Select the element finder by name.
    pub fn set_element_finder(&self, name: &str) -> Result<(), ConfigurationError> {
        self.update(|options| {
            options.element_finder = name.parse()?;
            Ok(())
        })
    }

    /// Select the stencil computer by name.
    pub fn set_stencil_computer(&self, name: &str) -> Result<(), ConfigurationError> {
        self.update(|options| {
            options.stencil_computer = name.parse()?;
            Ok(())
        })
    }

    /// Select the interpolation function by name.
    pub fn set_function(&self, name: &str) -> Result<(), ConfigurationError> {
        self.update(|options| {
            options.function = name.parse()?;
            Ok(())
        })
    }

    fn update(
        &self,
        edit: impl FnOnce(&mut InterpolatorOptions) -> Result<(), ConfigurationError>,
    ) -> Result<(), ConfigurationError> {
        let _serial = self.reconfiguring.lock();
        let current = self.snapshot().map_err(|_| ConfigurationError::MissingSource)?;
        let mut options = current.options;
        edit(&mut options)?;
        self.install(current.source.clone(), options)
    }

    /// Build outside the lock, then swap. Callers hold `reconfiguring`.
    fn install(
        &self,
        source: Arc<Dictionary>,
        options: InterpolatorOptions,
    ) -> Result<(), ConfigurationError> {
        let configured = match Configured::build(source, options) {
            Ok(configured) => configured,
            Err(err) => {
                log::debug!("reconfiguration rejected, keeping previous configuration: {err}");
                return Err(err);
            }
        };
        log::debug!(
            "interpolator configured on `{}` ({}, {} elements, {} dofs): {} / {} / {}",
            configured.source.name(),
            configured.source.id(),
            configured.source.element_count(),
            configured.source.size(),
            configured.finder.kind(),
            configured.stencil.kind(),
            configured.function.kind(),
        );
        *self.active.write() = Some(Arc::new(configured));
        Ok(())
    }

    fn snapshot(&self) -> Result<Arc<Configured>, InterpolationError> {
        self.active.read().clone().ok_or(InterpolationError::Unconfigured)
    }

    /// Whether a configuration is active.
    pub fn is_configured(&self) -> bool {
        self.active.read().is_some()
    }

    /// Current source dictionary.
    pub fn source(&self) -> Option<Arc<Dictionary>> {
        self.active.read().as_ref().map(|c| c.source.clone())
    }

    /// Current options.
    pub fn options(&self) -> Option<InterpolatorOptions> {
        self.active.read().as_ref().map(|c| c.options)
    }

    /// Locate `coordinate` and return the containing element, its stencil and
    /// the weights; `Ok(None)` when no element contains it.
    pub fn locate(&self, coordinate: &[f64]) -> Result<Option<Interpolation>, InterpolationError> {
        self.snapshot()?.locate(coordinate)
    }

    /// Interpolation weights at `coordinate`; empty when no element contains it.
    pub fn locate_and_interpolate(&self, coordinate: &[f64]) -> Result<WeightSet, InterpolationError> {
        self.snapshot()?.locate_and_interpolate(coordinate)
    }

    /// [`locate_and_interpolate`](Self::locate_and_interpolate) over many
    /// coordinates against one configuration snapshot, in input order.
    ///
    /// Runs in parallel with the `rayon` feature.
    pub fn locate_and_interpolate_batch<C>(
        &self,
        coordinates: &[C],
    ) -> Result<Vec<Result<WeightSet, InterpolationError>>, InterpolationError>
    where
        C: AsRef<[f64]> + Sync,
    {
        let snapshot = self.snapshot()?;
        #[cfg(feature = "rayon")]
        let out = coordinates
            .par_iter()
            .map(|c| snapshot.locate_and_interpolate(c.as_ref()))
            .collect();
        #[cfg(not(feature = "rayon"))]
        let out = coordinates
            .iter()
            .map(|c| snapshot.locate_and_interpolate(c.as_ref()))
            .collect();
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::coordinates::Coordinates;
    use crate::topology::cell_type::CellType;
    use crate::topology::element::ElementRef;
    use crate::topology::mesh::{ElementGroup, Mesh};

    fn segment_source() -> Arc<Dictionary> {
        let mesh = Mesh::try_new(
            Coordinates::from_rows(&[[5.0], [10.0]]).unwrap(),
            vec![ElementGroup::new("cells", CellType::Segment, vec![0, 1])],
        )
        .unwrap();
        Arc::new(Dictionary::continuous("u", Arc::new(mesh)))
    }

    #[test]
    fn unconfigured_queries_fail() {
        let pipeline = InterpolationPipeline::new();
        assert!(!pipeline.is_configured());
        assert_eq!(
            pipeline.locate_and_interpolate(&[1.0]).unwrap_err(),
            InterpolationError::Unconfigured
        );
        assert_eq!(
            pipeline.set_function("least-squares").unwrap_err(),
            ConfigurationError::MissingSource
        );
    }

    #[test]
    fn locate_returns_full_storage() {
        let pipeline =
            InterpolationPipeline::with_source(segment_source(), InterpolatorOptions::default())
                .unwrap();
        let found = pipeline.locate(&[7.5]).unwrap().unwrap();
        assert_eq!(found.element.element(), ElementRef::new(0, 0));
        assert_eq!(found.stencil, vec![found.element]);
        assert_eq!(found.weights.apply(&[3.0, 8.0]), Some(5.5));
        assert!(pipeline.locate(&[11.0]).unwrap().is_none());
    }

    #[test]
    fn failed_setter_keeps_configuration() {
        let pipeline =
            InterpolationPipeline::with_source(segment_source(), InterpolatorOptions::default())
                .unwrap();
        let before = pipeline.options().unwrap();
        assert!(pipeline.set_element_finder("kd-tree").is_err());
        assert_eq!(pipeline.options().unwrap(), before);
        pipeline.set_element_finder("brute-force").unwrap();
        assert_eq!(
            pipeline.options().unwrap().element_finder,
            crate::interpolation::options::FinderKind::BruteForce
        );
    }

    #[test]
    fn batch_preserves_input_order() {
        let pipeline =
            InterpolationPipeline::with_source(segment_source(), InterpolatorOptions::default())
                .unwrap();
        let points = [[6.0], [20.0], [9.0]];
        let out = pipeline.locate_and_interpolate_batch(&points).unwrap();
        assert_eq!(out.len(), 3);
        assert!((out[0].as_ref().unwrap().weight_of(0).unwrap() - 0.8).abs() < 1e-12);
        assert!(out[1].as_ref().unwrap().is_empty());
        assert!((out[2].as_ref().unwrap().weight_of(1).unwrap() - 0.8).abs() < 1e-12);
    }
}
