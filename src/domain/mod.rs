pub mod error;
pub mod model;

pub use error::{AppError, ConfigError, JobError};
pub use model::{
    Browser, CookieSource, DownloadMode, DownloadRequest, DownloadTargets, JobKind, JobOutcome,
    Quality, VideoDescriptor,
};
