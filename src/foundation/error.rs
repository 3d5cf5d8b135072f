/// Convenience result type used across reelcast.
pub type ReelResult<T> = Result<T, ReelError>;

/// Error taxonomy for timeline rendering and job dispatch.
#[derive(thiserror::Error, Debug)]
pub enum ReelError {
    /// Malformed timeline document. Fatal to the job.
    #[error("parse error: {0}")]
    Parse(String),

    /// Missing or unreadable asset, or one whose dimensions could not be probed.
    #[error("asset error: {0}")]
    Asset(String),

    /// Nothing on the timeline resolved to a renderable layer.
    #[error("empty composition: {0}")]
    EmptyComposition(String),

    /// The external encoder failed.
    #[error("encode error: {0}")]
    Encode(String),

    /// Unexpected failure inside a job, caught at the worker boundary.
    #[error("worker fault: {0}")]
    WorkerFault(String),

    /// A job exceeded its time budget.
    #[error("timeout: {0}")]
    Timeout(String),

    /// Invalid programmatic input (options, sizes, lifecycle misuse).
    #[error("validation error: {0}")]
    Validation(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReelError {
    /// Build a [`ReelError::Parse`] value.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Build a [`ReelError::Asset`] value.
    pub fn asset(msg: impl Into<String>) -> Self {
        Self::Asset(msg.into())
    }

    /// Build a [`ReelError::EmptyComposition`] value.
    pub fn empty_composition(msg: impl Into<String>) -> Self {
        Self::EmptyComposition(msg.into())
    }

    /// Build a [`ReelError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`ReelError::WorkerFault`] value.
    pub fn worker_fault(msg: impl Into<String>) -> Self {
        Self::WorkerFault(msg.into())
    }

    /// Build a [`ReelError::Timeout`] value.
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// Build a [`ReelError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// `true` for errors that only invalidate a single clip rather than the whole job.
    pub fn is_clip_local(&self) -> bool {
        matches!(self, Self::Asset(_))
    }
}

impl From<serde_json::Error> for ReelError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
