use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use parking_lot::Mutex;

use crate::{
    dispatch::{
        job::{JobId, JobInput, JobState, JobStatus, RenderJob},
        queue::{Entry, JobQueue},
    },
    foundation::{
        cancel::CancelToken,
        error::{ReelError, ReelResult},
    },
    render::pipeline::{RenderPipeline, RenderReport},
    timeline::model::Timeline,
};

/// Work executed for each job.
///
/// Runners should poll `cancel` and return promptly once it fires; the worker stays busy until
/// `run` returns.
pub trait JobRunner: Send + Sync + 'static {
    fn run(
        &self,
        timeline: &Timeline,
        destination: &Path,
        cancel: &CancelToken,
    ) -> ReelResult<RenderReport>;
}

impl JobRunner for RenderPipeline {
    fn run(
        &self,
        timeline: &Timeline,
        destination: &Path,
        cancel: &CancelToken,
    ) -> ReelResult<RenderReport> {
        self.render_with_cancel(timeline, destination, cancel)
    }
}

/// Options for [`Dispatcher::start`].
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct DispatcherOpts {
    /// Pool size; `None` uses the available parallelism.
    pub workers: Option<usize>,
    /// Cancel a job and mark it failed after this long. Nothing is left at its destination.
    pub job_timeout: Option<Duration>,
    /// Destination directory for jobs submitted without one.
    pub output_dir: PathBuf,
}

impl Default for DispatcherOpts {
    fn default() -> Self {
        Self {
            workers: None,
            job_timeout: None,
            output_dir: PathBuf::from("."),
        }
    }
}

impl DispatcherOpts {
    /// Resolved pool size, at least 1.
    pub fn worker_count(&self) -> usize {
        self.workers
            .unwrap_or_else(|| {
                std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(1)
            })
            .max(1)
    }
}

#[derive(Debug)]
struct Tracked {
    seq: u64,
    status: JobStatus,
}

struct Shared {
    queue: JobQueue<RenderJob>,
    jobs: Mutex<HashMap<JobId, Tracked>>,
    next_seq: AtomicU64,
    accepting: AtomicBool,
}

impl Shared {
    fn update(&self, id: JobId, f: impl FnOnce(&mut JobStatus)) {
        if let Some(tracked) = self.jobs.lock().get_mut(&id) {
            f(&mut tracked.status);
        }
    }
}

/// Fixed-size pool of render workers draining one FIFO queue.
///
/// Jobs start in submission order. Each job's status is written only by the worker running it.
pub struct Dispatcher {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
    opts: DispatcherOpts,
}

impl Dispatcher {
    /// Spawn the worker pool.
    pub fn start(opts: DispatcherOpts, runner: Arc<dyn JobRunner>) -> ReelResult<Self> {
        if opts.job_timeout.is_some_and(|t| t.is_zero()) {
            return Err(ReelError::validation("job timeout must be > 0"));
        }
        let shared = Arc::new(Shared {
            queue: JobQueue::new(),
            jobs: Mutex::new(HashMap::new()),
            next_seq: AtomicU64::new(0),
            accepting: AtomicBool::new(true),
        });

        let count = opts.worker_count();
        let mut dispatcher = Self {
            shared,
            workers: Vec::with_capacity(count),
            opts,
        };
        for idx in 0..count {
            let shared = Arc::clone(&dispatcher.shared);
            let runner = Arc::clone(&runner);
            let timeout = dispatcher.opts.job_timeout;
            let handle = std::thread::Builder::new()
                .name(format!("reelcast-worker-{idx}"))
                .spawn(move || worker_loop(idx, &shared, runner.as_ref(), timeout))
                .map_err(|e| ReelError::worker_fault(format!("failed to spawn worker {idx}: {e}")))?;
            dispatcher.workers.push(handle);
        }
        tracing::info!(workers = count, "dispatcher started");
        Ok(dispatcher)
    }

    /// Enqueue a job. Without a destination the output goes to
    /// `<output_dir>/<short id>.mp4`.
    pub fn submit(
        &self,
        input: impl Into<JobInput>,
        destination: Option<PathBuf>,
    ) -> ReelResult<JobId> {
        if !self.shared.accepting.load(Ordering::SeqCst) {
            return Err(ReelError::validation("dispatcher is shutting down"));
        }
        let id = JobId::new();
        let destination =
            destination.unwrap_or_else(|| self.opts.output_dir.join(format!("{}.mp4", id.short())));

        let seq = self.shared.next_seq.fetch_add(1, Ordering::SeqCst);
        self.shared.jobs.lock().insert(
            id,
            Tracked {
                seq,
                status: JobStatus::queued(destination.clone()),
            },
        );
        self.shared.queue.push(Entry::Job(RenderJob {
            id,
            input: input.into(),
            destination,
        }));
        tracing::debug!(job = %id, "job queued");
        Ok(id)
    }

    /// Current status of a job that has not been taken yet.
    pub fn status(&self, id: JobId) -> Option<JobStatus> {
        self.shared.jobs.lock().get(&id).map(|t| t.status.clone())
    }

    /// Block until every job submitted so far reached a terminal state.
    pub fn wait_idle(&self) {
        self.shared.queue.join();
    }

    /// Remove and return terminal jobs in submission order.
    pub fn take_finished(&self) -> Vec<(JobId, JobStatus)> {
        let mut jobs = self.shared.jobs.lock();
        let done: Vec<JobId> = jobs
            .iter()
            .filter(|(_, t)| t.status.state.is_terminal())
            .map(|(id, _)| *id)
            .collect();
        let mut out: Vec<(u64, JobId, JobStatus)> = done
            .into_iter()
            .filter_map(|id| jobs.remove(&id).map(|t| (t.seq, id, t.status)))
            .collect();
        out.sort_by_key(|(seq, _, _)| *seq);
        out.into_iter().map(|(_, id, status)| (id, status)).collect()
    }

    /// Jobs submitted but not yet acknowledged by a worker.
    pub fn pending(&self) -> usize {
        self.shared.queue.unfinished()
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Stop accepting jobs, let the workers finish everything queued, then join them.
    pub fn shutdown(mut self) {
        self.stop_and_join();
    }

    fn stop_and_join(&mut self) {
        if self.workers.is_empty() {
            return;
        }
        self.shared.accepting.store(false, Ordering::SeqCst);
        for _ in 0..self.workers.len() {
            self.shared.queue.push(Entry::Stop);
        }
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                tracing::error!("worker thread panicked outside a job");
            }
        }
        tracing::info!("dispatcher stopped");
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        self.stop_and_join();
    }
}

fn worker_loop(idx: usize, shared: &Shared, runner: &dyn JobRunner, timeout: Option<Duration>) {
    loop {
        let job = match shared.queue.pop_blocking() {
            Entry::Stop => {
                shared.queue.task_done();
                tracing::debug!(worker = idx, "worker stopping");
                return;
            }
            Entry::Job(job) => job,
        };

        let id = job.id;
        let span = tracing::info_span!("job", job = %id, worker = idx);
        let _enter = span.enter();

        shared.update(id, |s| {
            s.state = JobState::Running;
            s.worker = Some(idx);
        });
        tracing::info!("job started");

        match execute(runner, job, timeout) {
            Ok(report) => {
                tracing::info!(duration = report.duration, "job succeeded");
                shared.update(id, |s| {
                    s.state = JobState::Succeeded;
                    s.report = Some(report);
                });
            }
            Err(err) => {
                tracing::warn!(error = %err, "job failed");
                shared.update(id, |s| {
                    s.state = JobState::Failed;
                    s.error = Some(err.to_string());
                });
            }
        }
        shared.queue.task_done();
    }
}

fn execute(
    runner: &dyn JobRunner,
    job: RenderJob,
    timeout: Option<Duration>,
) -> ReelResult<RenderReport> {
    let Some(limit) = timeout else {
        return run_guarded(runner, job, &CancelToken::new());
    };

    let cancel = CancelToken::with_deadline(limit);
    let destination = job.destination.clone();
    let timed_out = || ReelError::timeout(format!("job did not finish within {limit:?}"));
    match run_guarded(runner, job, &cancel) {
        Ok(_) if cancel.is_cancelled() => {
            discard_output(&destination);
            Err(timed_out())
        }
        Err(ReelError::Timeout(_)) => Err(timed_out()),
        other => other,
    }
}

/// Remove the output of a job that finished past its deadline.
fn discard_output(destination: &Path) {
    if !destination.exists() {
        return;
    }
    match std::fs::remove_file(destination) {
        Ok(()) => {
            tracing::debug!(out = %destination.display(), "removed output of timed out job");
        }
        Err(e) => tracing::error!(
            out = %destination.display(),
            error = %e,
            "failed to remove output of timed out job"
        ),
    }
}

fn run_guarded(
    runner: &dyn JobRunner,
    job: RenderJob,
    cancel: &CancelToken,
) -> ReelResult<RenderReport> {
    let RenderJob {
        input, destination, ..
    } = job;
    std::panic::catch_unwind(AssertUnwindSafe(|| {
        let timeline = input.into_timeline()?;
        runner.run(&timeline, &destination, cancel)
    }))
    .unwrap_or_else(|payload| Err(ReelError::worker_fault(panic_message(&*payload))))
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("job panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("job panicked: {s}")
    } else {
        "job panicked".to_string()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/dispatch/dispatcher.rs"]
mod tests;
