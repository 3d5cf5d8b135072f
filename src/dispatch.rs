//! Bounded worker pool executing independent render jobs.

pub mod dispatcher;
pub mod job;
pub mod queue;
