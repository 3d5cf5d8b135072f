//! Resolution of clips into contiguous video and audio layer sequences.

pub mod compositor;
pub mod gaps;
pub mod layer;
