//! Lowering of compositions to ffmpeg filter graphs, and the encoder that runs them.

pub mod ffmpeg;
pub mod graph;
pub mod settings;
