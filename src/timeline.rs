//! Timeline documents and the validated in-memory model built from them.

pub mod document;
pub mod model;
