use std::path::PathBuf;

use thiserror::Error;

use super::model::JobKind;

/// Problems detected before any process is started.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Cannot find cookies file at {}", .0.display())]
    CookieFileMissing(PathBuf),

    #[error("No target URL given")]
    NoTargets,

    #[error("Cannot find yt-dlp executable at {}", .0.display())]
    MissingExecutable(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum JobError {
    #[error("Cannot start {requested} job while a {active} job is running")]
    AlreadyRunning { requested: JobKind, active: JobKind },
}

/// Error surfaced to the presentation layer.
#[derive(Debug, Clone, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Job(#[from] JobError),
}

impl AppError {
    /// Short dialog-style heading for the error.
    pub fn title(&self) -> &'static str {
        match self {
            AppError::Config(ConfigError::CookieFileMissing(_)) => "Cookies file missing",
            AppError::Config(ConfigError::NoTargets) => "Missing URL",
            AppError::Config(ConfigError::MissingExecutable(_)) => "Missing binary",
            AppError::Job(_) => "Busy",
        }
    }
}
