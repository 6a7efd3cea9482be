//! Interpolation strategies: element finders, stencil computers and
//! interpolation functions.

pub mod element_finder;
pub mod stencil;
pub mod weights;
