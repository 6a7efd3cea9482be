//! Geometry utilities: bounding boxes, reference-element mappings and cell
//! measures.

pub mod bounds;
pub mod mapping;
pub mod metrics;
