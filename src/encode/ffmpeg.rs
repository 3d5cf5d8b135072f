use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use crate::{
    compose::compositor::Composition,
    encode::{graph::lower, settings::EncodeSettings},
    foundation::{
        cancel::CancelToken,
        error::{ReelError, ReelResult},
    },
};

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Turns a composition into a media file.
pub trait Encoder: Send + Sync {
    /// Encode `composition` to `out`. On error, including cancellation, no file is left at
    /// `out`.
    fn encode(
        &self,
        composition: &Composition,
        out: &Path,
        cancel: &CancelToken,
    ) -> ReelResult<()>;
}

/// Encoder backed by the system `ffmpeg` binary.
#[derive(Clone, Debug, Default)]
pub struct FfmpegEncoder {
    settings: EncodeSettings,
}

impl FfmpegEncoder {
    pub fn new(settings: EncodeSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &EncodeSettings {
        &self.settings
    }
}

impl Encoder for FfmpegEncoder {
    fn encode(
        &self,
        composition: &Composition,
        out: &Path,
        cancel: &CancelToken,
    ) -> ReelResult<()> {
        self.settings.validate(composition.size)?;
        let graph = lower(composition)?;
        cancel.check()?;

        ensure_parent_dir(out)?;
        if !self.settings.overwrite && out.exists() {
            return Err(ReelError::validation(format!(
                "output file '{}' already exists",
                out.display()
            )));
        }

        let partial = partial_path(out);
        let result = run_ffmpeg(
            &self.settings.ffmpeg_bin,
            graph.args(&self.settings, &partial),
            self.settings.timeout,
            cancel,
        )
        .and_then(|()| cancel.check())
        .and_then(|()| {
            std::fs::rename(&partial, out).map_err(|e| {
                ReelError::encode(format!(
                    "failed to move '{}' into place: {e}",
                    partial.display()
                ))
            })
        });

        if result.is_err() && partial.exists() {
            let _ = std::fs::remove_file(&partial);
        }
        result?;

        tracing::info!(
            out = %out.display(),
            duration = composition.duration,
            inputs = graph.inputs.len(),
            "encoded"
        );
        Ok(())
    }
}

/// How waiting on the encoder child ended.
enum Wait {
    Exited(ExitStatus),
    DeadlinePassed,
    Cancelled,
}

fn run_ffmpeg(
    bin: &str,
    args: Vec<std::ffi::OsString>,
    timeout: Option<Duration>,
    cancel: &CancelToken,
) -> ReelResult<()> {
    tracing::debug!(bin, args = ?args, "spawning ffmpeg");
    let mut child = Command::new(bin)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            ReelError::encode(format!(
                "failed to spawn {bin} (is it installed and on PATH?): {e}"
            ))
        })?;

    let mut stderr = child
        .stderr
        .take()
        .ok_or_else(|| ReelError::encode("failed to open ffmpeg stderr (unexpected)"))?;
    let stderr_drain = std::thread::spawn(move || {
        let mut stderr_bytes = Vec::new();
        stderr.read_to_end(&mut stderr_bytes)?;
        Ok::<_, std::io::Error>(stderr_bytes)
    });

    let deadline = timeout.and_then(|limit| Instant::now().checked_add(limit));
    let status = match wait_with_deadline(&mut child, deadline, cancel)? {
        Wait::Exited(status) => status,
        stopped => {
            let _ = child.kill();
            let _ = child.wait();
            let _ = stderr_drain.join();
            return Err(match stopped {
                Wait::Cancelled => {
                    tracing::warn!("job cancelled, ffmpeg killed");
                    ReelError::timeout("job cancelled while encoding; ffmpeg was killed")
                }
                _ => ReelError::encode(format!(
                    "ffmpeg did not finish within {:?} and was killed",
                    timeout.unwrap_or_default()
                )),
            });
        }
    };

    let stderr_bytes = stderr_drain
        .join()
        .map_err(|_| ReelError::encode("ffmpeg stderr drain thread panicked"))?
        .map_err(|e| ReelError::encode(format!("ffmpeg stderr read failed: {e}")))?;

    if !status.success() {
        let stderr = String::from_utf8_lossy(&stderr_bytes);
        return Err(ReelError::encode(format!(
            "ffmpeg exited with status {}: {}",
            status,
            stderr.trim()
        )));
    }
    Ok(())
}

fn wait_with_deadline(
    child: &mut std::process::Child,
    deadline: Option<Instant>,
    cancel: &CancelToken,
) -> ReelResult<Wait> {
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(Wait::Exited(status)),
            Ok(None) if cancel.is_cancelled() => return Ok(Wait::Cancelled),
            Ok(None) if deadline.is_some_and(|d| Instant::now() >= d) => {
                return Ok(Wait::DeadlinePassed);
            }
            Ok(None) => std::thread::sleep(POLL_INTERVAL),
            Err(e) => {
                return Err(ReelError::encode(format!("failed to poll ffmpeg: {e}")));
            }
        }
    }
}

/// Hidden sibling of `out` that ffmpeg writes to before the final rename.
pub fn partial_path(out: &Path) -> PathBuf {
    let name = out
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let tag = uuid::Uuid::new_v4().simple().to_string();
    out.with_file_name(format!(".{name}.{}.partial", &tag[..8]))
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> ReelResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    is_on_path("ffmpeg")
}

/// Return `true` when `bin -version` runs successfully.
pub fn is_on_path(bin: &str) -> bool {
    Command::new(bin)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
