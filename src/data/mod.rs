//! Data module: node coordinates and DOF dictionaries
#![warn(missing_docs)]

pub mod coordinates;
pub mod dictionary;

pub use coordinates::Coordinates;
pub use dictionary::{Dictionary, DictionaryId, DofLayout, SpaceElement};
