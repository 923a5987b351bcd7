use crate::{
    domain::{AppError, JobKind, JobOutcome},
    subtitles::ConversionEvent,
    tool::ToolCommand,
};

use super::{
    job_controller::JobObserver,
    playlist_fetcher::{FetchReport, PlaylistFetcher},
    playlist_selection::PlaylistSelection,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A message that should be put in front of the user as a dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
}

impl Notice {
    fn new(level: NoticeLevel, title: &str, message: impl Into<String>) -> Self {
        Self {
            level,
            title: title.to_string(),
            message: message.into(),
        }
    }
}

/// State owned by the UI context: the run log, the playlist table and
/// pending notices. Job output reaches it only through [`JobObserver`].
#[derive(Debug, Default)]
pub struct Session {
    log: String,
    pub playlist: PlaylistSelection,
    pub playlist_status: String,
    pub playlist_visible: bool,
    fetcher: Option<PlaylistFetcher>,
    notice: Option<Notice>,
}

impl Session {
    pub fn log(&self) -> &str {
        &self.log
    }

    pub fn append_log(&mut self, line: &str) {
        self.log.push_str(line);
        if !line.ends_with('\n') {
            self.log.push('\n');
        }
    }

    /// Takes the notice raised since the last call, if any.
    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    pub fn report_error(&mut self, error: &AppError) {
        log::warn!("{}", error);
        self.notice = Some(Notice::new(
            NoticeLevel::Warning,
            error.title(),
            error.to_string(),
        ));
    }

    pub fn begin_download(&mut self, command: &ToolCommand) {
        self.append_log(&format!("Running: {}", command.display()));
    }

    /// Drops the previous listing; indices from it are no longer valid.
    pub fn begin_fetch(&mut self, fetcher: PlaylistFetcher) {
        self.playlist.clear();
        self.playlist_visible = true;
        self.playlist_status = "Fetching video list...".to_string();
        self.fetcher = Some(fetcher);
    }

    pub fn begin_conversion(&mut self, count: usize) {
        self.append_log(&format!(
            "Converting {} subtitle file(s) to text\u{2026}",
            count
        ));
    }

    pub fn on_conversion(&mut self, event: ConversionEvent) {
        match event {
            ConversionEvent::Converted { input, output } => {
                self.append_log(&format!(
                    "Converted: {} -> {}",
                    input.display(),
                    output.display()
                ));
            }
            ConversionEvent::Failed { input, error } => {
                self.append_log(&format!("Failed: {} -> {}", input.display(), error));
            }
            ConversionEvent::Finished { converted, failed } => {
                self.notice = Some(if failed > 0 {
                    Notice::new(
                        NoticeLevel::Warning,
                        "Conversion finished",
                        format!(
                            "Converted {} file(s) with {} failure(s).",
                            converted, failed
                        ),
                    )
                } else {
                    Notice::new(
                        NoticeLevel::Info,
                        "Conversion finished",
                        format!("Converted {} subtitle file(s) to plain text.", converted),
                    )
                });
            }
        }
    }

    fn finish_download(&mut self, outcome: &JobOutcome) {
        let message = match outcome {
            JobOutcome::SpawnFailed(_) => {
                "Failed to start yt-dlp. Check the executable path.".to_string()
            }
            JobOutcome::Exited { code: Some(0), .. } => {
                "\nDownload completed successfully.".to_string()
            }
            JobOutcome::Exited {
                code: Some(code), ..
            } => format!("\nyt-dlp exited with code {}.", code),
            JobOutcome::Exited { code: None, .. } => {
                "\nyt-dlp was terminated before finishing.".to_string()
            }
        };
        self.append_log(&message);
    }

    fn finish_fetch(&mut self, report: FetchReport) {
        self.playlist.clear();

        if report.is_failure() {
            log::warn!("Playlist fetch failed (exit code {:?})", report.exit_code());
            self.playlist_status = "Failed to fetch videos. See log for details.".to_string();
            if let Some(text) = report.error_text() {
                self.append_log(&text);
            }
            self.notice = Some(Notice::new(
                NoticeLevel::Error,
                "Fetch failed",
                "Unable to fetch playlist information. Check the log for details.",
            ));
            return;
        }

        if report.videos.is_empty() {
            self.playlist_status = "No videos found in this playlist/channel.".to_string();
            return;
        }

        let count = report.videos.len();
        self.playlist.replace(report.videos);
        self.playlist_status = format!("Fetched {} videos. Select the ones you need.", count);
    }
}

impl JobObserver for Session {
    fn on_line(&mut self, kind: JobKind, line: &str) {
        match kind {
            JobKind::Download => self.append_log(line),
            JobKind::Fetch => {
                if let Some(fetcher) = self.fetcher.as_mut() {
                    fetcher.push_line(line);
                }
            }
        }
    }

    fn on_complete(&mut self, kind: JobKind, outcome: JobOutcome) {
        match kind {
            JobKind::Download => self.finish_download(&outcome),
            JobKind::Fetch => {
                let fetcher = self.fetcher.take().unwrap_or_default();
                self.finish_fetch(fetcher.finish(outcome));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ConfigError;
    use std::path::PathBuf;

    fn exited(code: i32, stderr: Option<&str>) -> JobOutcome {
        JobOutcome::Exited {
            code: Some(code),
            stderr: stderr.map(str::to_string),
        }
    }

    #[test]
    fn test_download_log() {
        let mut session = Session::default();
        session.begin_download(&ToolCommand::new("/opt/yt-dlp").args(["--newline", "a b"]));
        session.on_line(JobKind::Download, "[download]  50.0% of 10MiB");
        session.on_complete(JobKind::Download, exited(1, None));

        assert_eq!(
            session.log(),
            "Running: /opt/yt-dlp --newline 'a b'\n[download]  50.0% of 10MiB\n\nyt-dlp exited with code 1.\n"
        );
    }

    #[test]
    fn test_download_spawn_failure() {
        let mut session = Session::default();
        session.on_complete(
            JobKind::Download,
            JobOutcome::SpawnFailed("No such file or directory".to_string()),
        );
        assert_eq!(
            session.log(),
            "Failed to start yt-dlp. Check the executable path.\n"
        );
    }

    #[test]
    fn test_fetch_fills_playlist() {
        let mut session = Session::default();
        session.begin_fetch(PlaylistFetcher::default());
        assert!(session.playlist_visible);
        assert_eq!(session.playlist_status, "Fetching video list...");

        session.on_line(JobKind::Fetch, r#"{"_type":"url","url":"abc123","title":"Song"}"#);
        session.on_line(JobKind::Fetch, r#"{"_type":"url","url":"def456","title":"Other"}"#);
        session.on_complete(JobKind::Fetch, exited(0, Some("")));

        assert_eq!(session.playlist.len(), 2);
        assert_eq!(
            session.playlist_status,
            "Fetched 2 videos. Select the ones you need."
        );
        assert!(session.take_notice().is_none());
    }

    #[test]
    fn test_fetch_failure_reports_stderr() {
        let mut session = Session::default();
        session.begin_fetch(PlaylistFetcher::default());
        session.on_complete(JobKind::Fetch, exited(1, Some("ERROR: no such channel\n")));

        assert!(session.playlist.is_empty());
        assert_eq!(
            session.playlist_status,
            "Failed to fetch videos. See log for details."
        );
        assert_eq!(session.log(), "ERROR: no such channel\n");
        let notice = session.take_notice().unwrap();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(notice.title, "Fetch failed");
    }

    #[test]
    fn test_fetch_empty_playlist() {
        let mut session = Session::default();
        session.begin_fetch(PlaylistFetcher::default());
        session.on_line(JobKind::Fetch, r#"{"_type":"playlist"}"#);
        session.on_complete(JobKind::Fetch, exited(0, None));

        assert_eq!(
            session.playlist_status,
            "No videos found in this playlist/channel."
        );
        assert!(session.take_notice().is_none());
    }

    #[test]
    fn test_new_fetch_discards_old_selection() {
        let mut session = Session::default();
        session.begin_fetch(PlaylistFetcher::default());
        session.on_line(JobKind::Fetch, r#"{"_type":"url","url":"abc123"}"#);
        session.on_complete(JobKind::Fetch, exited(0, None));
        session.playlist.select_all();

        session.begin_fetch(PlaylistFetcher::default());
        assert!(session.playlist.selected_urls().is_empty());
    }

    #[test]
    fn test_conversion_summary() {
        let mut session = Session::default();
        session.begin_conversion(2);
        session.on_conversion(ConversionEvent::Converted {
            input: PathBuf::from("/tmp/a.srt"),
            output: PathBuf::from("/tmp/a.txt"),
        });
        session.on_conversion(ConversionEvent::Failed {
            input: PathBuf::from("/tmp/b.srt"),
            error: "failed to read /tmp/b.srt: denied".to_string(),
        });
        session.on_conversion(ConversionEvent::Finished {
            converted: 1,
            failed: 1,
        });

        assert!(session.log().contains("Converted: /tmp/a.srt -> /tmp/a.txt\n"));
        assert!(session.log().contains("Failed: /tmp/b.srt -> failed to read"));
        let notice = session.take_notice().unwrap();
        assert_eq!(notice.level, NoticeLevel::Warning);
        assert_eq!(notice.message, "Converted 1 file(s) with 1 failure(s).");
    }

    #[test]
    fn test_report_error_raises_notice() {
        let mut session = Session::default();
        session.report_error(&AppError::from(ConfigError::CookieFileMissing(PathBuf::from(
            "/nope/cookies.txt",
        ))));
        let notice = session.take_notice().unwrap();
        assert_eq!(notice.title, "Cookies file missing");
        assert_eq!(notice.message, "Cannot find cookies file at /nope/cookies.txt");
        assert!(session.take_notice().is_none());
    }
}
