use std::io::{self, BufRead, BufReader, Read};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};

use thiserror::Error;

use crate::utils::decode_line;

use super::command::ToolCommand;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("Failed to start {}: {source}", program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("I/O error while running process: {0}")]
    Io(#[from] io::Error),
}

/// How the child's output streams are wired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// stdout and stderr share one pipe, so lines keep their true order.
    Merged,
    /// stdout is streamed, stderr is collected and returned on exit.
    CaptureStderr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessExit {
    pub code: Option<i32>,
    pub stderr: Option<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }

    pub fn spawn(
        &self,
        command: &ToolCommand,
        mode: OutputMode,
    ) -> Result<RunningProcess, ProcessError> {
        match mode {
            OutputMode::Merged => spawn_merged(command),
            OutputMode::CaptureStderr => spawn_capturing(command),
        }
    }
}

fn spawn_error(command: &ToolCommand, source: io::Error) -> ProcessError {
    ProcessError::Spawn {
        program: command.program().to_path_buf(),
        source,
    }
}

fn spawn_merged(command: &ToolCommand) -> Result<RunningProcess, ProcessError> {
    let (reader, writer) = io::pipe()?;
    let child = {
        let mut cmd = Command::new(command.program());
        cmd.args(command.arguments())
            .stdin(Stdio::null())
            .stdout(writer.try_clone()?)
            .stderr(writer);
        // `cmd` keeps the write ends alive until it is dropped at the end
        // of this block, otherwise the reader would never see EOF.
        cmd.spawn().map_err(|e| spawn_error(command, e))?
    };

    Ok(RunningProcess {
        child,
        reader: BufReader::new(Box::new(reader)),
        stderr: None,
    })
}

fn spawn_capturing(command: &ToolCommand) -> Result<RunningProcess, ProcessError> {
    let mut child = Command::new(command.program())
        .args(command.arguments())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| spawn_error(command, e))?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| io::Error::other("child stdout was not captured"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| io::Error::other("child stderr was not captured"))?;

    // Drained on its own thread so a chatty stderr cannot stall stdout.
    let stderr = thread::Builder::new()
        .name("stderr-drain".to_string())
        .spawn(move || {
            let mut buf = Vec::new();
            let mut stderr = stderr;
            if let Err(e) = stderr.read_to_end(&mut buf) {
                log::warn!("Failed to read child stderr: {}", e);
            }
            String::from_utf8_lossy(&buf).into_owned()
        })?;

    Ok(RunningProcess {
        child,
        reader: BufReader::new(Box::new(stdout)),
        stderr: Some(stderr),
    })
}

/// A spawned child. Drain [`RunningProcess::lines`] first, then [`RunningProcess::wait`].
pub struct RunningProcess {
    child: Child,
    reader: BufReader<Box<dyn Read + Send>>,
    stderr: Option<JoinHandle<String>>,
}

impl RunningProcess {
    /// Lazily yields output lines until the child closes its output.
    pub fn lines(&mut self) -> OutputLines<'_> {
        OutputLines {
            reader: &mut self.reader,
            done: false,
        }
    }

    pub fn wait(self) -> Result<ProcessExit, ProcessError> {
        let RunningProcess {
            mut child,
            reader,
            stderr,
        } = self;
        drop(reader);

        let status = child.wait()?;
        let stderr = stderr.map(|handle| handle.join().unwrap_or_default());

        Ok(ProcessExit {
            code: status.code(),
            stderr,
        })
    }
}

pub struct OutputLines<'a> {
    reader: &'a mut BufReader<Box<dyn Read + Send>>,
    done: bool,
}

impl Iterator for OutputLines<'_> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut buf = Vec::new();
        match self.reader.read_until(b'\n', &mut buf) {
            Ok(0) => {
                self.done = true;
                None
            }
            Ok(_) => Some(Ok(decode_line(&buf))),
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
