//! Time-parameterized motion of image clips and the name -> effect table.

pub mod motion;
pub mod registry;
