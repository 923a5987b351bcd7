use futures::stream::BoxStream;

use crate::{
    domain::{JobError, JobKind, JobOutcome, VideoDescriptor},
    tool::{playlist::parse_entry, CommandBuilder},
};

use super::job_controller::{JobController, JobEvent};

/// Result of one flat-playlist listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchReport {
    pub videos: Vec<VideoDescriptor>,
    pub outcome: JobOutcome,
}

impl FetchReport {
    pub fn exit_code(&self) -> Option<i32> {
        self.outcome.exit_code()
    }

    /// True when the listing tool failed, as opposed to an empty playlist.
    pub fn is_failure(&self) -> bool {
        !self.outcome.success()
    }

    /// Text explaining a failure, if any was captured.
    pub fn error_text(&self) -> Option<String> {
        match &self.outcome {
            JobOutcome::SpawnFailed(_) => Some("yt-dlp executable not found.".to_string()),
            JobOutcome::Exited { stderr, .. } => stderr
                .as_deref()
                .map(str::trim_end)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        }
    }
}

/// Collects the entries of a running fetch job, in arrival order.
#[derive(Debug, Default)]
pub struct PlaylistFetcher {
    videos: Vec<VideoDescriptor>,
}

impl PlaylistFetcher {
    /// Start a fetch job for `url`. Feed the job's lines into
    /// [`PlaylistFetcher::push_line`] and its outcome into [`PlaylistFetcher::finish`].
    pub fn fetch(
        controller: &mut JobController,
        builder: &CommandBuilder,
        url: &str,
    ) -> Result<(Self, BoxStream<'static, JobEvent>), JobError> {
        let stream = controller.start(JobKind::Fetch, builder.flat_playlist(url))?;
        Ok((Self::default(), stream))
    }

    pub fn push_line(&mut self, line: &str) {
        if let Some(video) = parse_entry(line) {
            self.videos.push(video);
        }
    }

    pub fn finish(self, outcome: JobOutcome) -> FetchReport {
        FetchReport {
            videos: self.videos,
            outcome,
        }
    }
}
