use std::thread;

use futures::{
    channel::mpsc::{self, UnboundedSender},
    stream::BoxStream,
    StreamExt,
};

use crate::{
    domain::{JobError, JobKind, JobOutcome},
    tool::{OutputMode, ProcessRunner, ToolCommand},
};

/// What a worker hands back to the UI context, in the order it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobEvent {
    Line { kind: JobKind, line: String },
    Completed { kind: JobKind, outcome: JobOutcome },
}

/// Receives job output on the UI context.
pub trait JobObserver {
    fn on_line(&mut self, kind: JobKind, line: &str);
    fn on_complete(&mut self, kind: JobKind, outcome: JobOutcome);
}

/// Owns the running/idle state of download and fetch jobs.
///
/// Lives on the UI context. Workers never touch it; they only send
/// [`JobEvent`]s, which the UI context feeds back through [`JobController::dispatch`].
#[derive(Debug, Default)]
pub struct JobController {
    runner: ProcessRunner,
    active: Option<JobKind>,
}

impl JobController {
    pub fn new(runner: ProcessRunner) -> Self {
        Self {
            runner,
            active: None,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.active.is_none()
    }

    /// Start `command` on a dedicated worker thread.
    ///
    /// Downloads and fetches exclude each other, so any active job
    /// rejects the request. The returned stream ends after exactly one
    /// [`JobEvent::Completed`].
    pub fn start(
        &mut self,
        kind: JobKind,
        command: ToolCommand,
    ) -> Result<BoxStream<'static, JobEvent>, JobError> {
        if let Some(active) = self.active {
            log::warn!("Rejected {} job: {} job still running", kind, active);
            return Err(JobError::AlreadyRunning {
                requested: kind,
                active,
            });
        }

        log::info!("Starting {} job: {}", kind, command.display());
        self.active = Some(kind);

        let (tx, rx) = mpsc::unbounded();
        let runner = self.runner;
        let fallback = tx.clone();

        let spawned = thread::Builder::new()
            .name(format!("{}-job", kind))
            .spawn(move || run_job(runner, kind, command, tx));

        if let Err(e) = spawned {
            log::error!("Failed to start worker thread for {} job: {}", kind, e);
            let _ = fallback.unbounded_send(JobEvent::Completed {
                kind,
                outcome: JobOutcome::SpawnFailed(e.to_string()),
            });
        }

        Ok(rx.boxed())
    }

    /// Deliver one worker event to `observer`, then go idle on completion.
    pub fn dispatch(&mut self, event: JobEvent, observer: &mut impl JobObserver) {
        match event {
            JobEvent::Line { kind, line } => observer.on_line(kind, &line),
            JobEvent::Completed { kind, outcome } => {
                observer.on_complete(kind, outcome);
                if self.active == Some(kind) {
                    self.active = None;
                }
            }
        }
    }
}

fn output_mode(kind: JobKind) -> OutputMode {
    match kind {
        JobKind::Download => OutputMode::Merged,
        JobKind::Fetch => OutputMode::CaptureStderr,
    }
}

fn run_job(
    runner: ProcessRunner,
    kind: JobKind,
    command: ToolCommand,
    tx: UnboundedSender<JobEvent>,
) {
    let outcome = match runner.spawn(&command, output_mode(kind)) {
        Ok(mut process) => {
            for line in process.lines() {
                match line {
                    Ok(line) => {
                        // The receiver may be gone; keep draining so the child can finish.
                        let _ = tx.unbounded_send(JobEvent::Line { kind, line });
                    }
                    Err(e) => {
                        log::warn!("Stopped reading {} output: {}", kind, e);
                        break;
                    }
                }
            }

            match process.wait() {
                Ok(exit) => {
                    if exit.code != Some(0) {
                        log::warn!("{} job exited with {:?}", kind, exit.code);
                    }
                    JobOutcome::Exited {
                        code: exit.code,
                        stderr: exit.stderr,
                    }
                }
                Err(e) => {
                    log::error!("Failed to wait for {} job: {}", kind, e);
                    JobOutcome::Exited {
                        code: None,
                        stderr: Some(e.to_string()),
                    }
                }
            }
        }
        Err(e) => {
            log::error!("{}", e);
            JobOutcome::SpawnFailed(e.to_string())
        }
    };

    let _ = tx.unbounded_send(JobEvent::Completed { kind, outcome });
}
