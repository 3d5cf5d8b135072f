use std::path::PathBuf;

use crate::{
    foundation::error::ReelResult, render::pipeline::RenderReport, timeline::model::Timeline,
};

/// Identifier handed out on submission.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct JobId(uuid::Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// First 8 hex digits, used for default file names and thread names.
    pub fn short(&self) -> String {
        let mut s = self.0.simple().to_string();
        s.truncate(8);
        s
    }

    pub fn as_uuid(&self) -> uuid::Uuid {
        self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Lifecycle of a job: `Queued -> Running -> {Succeeded | Failed}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Queued,
    Running,
    Succeeded,
    Failed,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        })
    }
}

/// What a job renders.
#[derive(Clone, Debug)]
pub enum JobInput {
    /// Already parsed and validated.
    Timeline(Timeline),
    /// Raw JSON document, parsed by the worker that runs the job.
    Document(String),
}

impl JobInput {
    pub fn into_timeline(self) -> ReelResult<Timeline> {
        match self {
            Self::Timeline(t) => Ok(t),
            Self::Document(doc) => Timeline::from_json_str(&doc),
        }
    }
}

impl From<Timeline> for JobInput {
    fn from(value: Timeline) -> Self {
        Self::Timeline(value)
    }
}

/// A queued unit of work. Owned by the queue, then by exactly one worker.
#[derive(Clone, Debug)]
pub struct RenderJob {
    pub id: JobId,
    pub input: JobInput,
    pub destination: PathBuf,
}

/// Observable state of a job.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct JobStatus {
    pub state: JobState,
    /// Failure message for `Failed` jobs.
    pub error: Option<String>,
    /// Index of the worker that picked the job up.
    pub worker: Option<usize>,
    pub output: PathBuf,
    pub report: Option<RenderReport>,
}

impl JobStatus {
    pub(crate) fn queued(output: PathBuf) -> Self {
        Self {
            state: JobState::Queued,
            error: None,
            worker: None,
            output,
            report: None,
        }
    }
}
