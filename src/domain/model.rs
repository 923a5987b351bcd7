use std::fmt;
use std::path::PathBuf;

use super::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DownloadMode {
    #[default]
    Video,
    Audio,
    Subtitles,
}

/// Video quality tier, mapped to a yt-dlp format selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Quality {
    #[default]
    Best,
    P1080,
    P720,
    P480,
}

impl Quality {
    pub const ALL: [Quality; 4] = [Quality::Best, Quality::P1080, Quality::P720, Quality::P480];

    pub fn format_selector(self) -> &'static str {
        match self {
            Quality::Best => "bestvideo+bestaudio/best",
            Quality::P1080 => "bestvideo[height<=1080]+bestaudio/best[height<=1080]",
            Quality::P720 => "bestvideo[height<=720]+bestaudio/best[height<=720]",
            Quality::P480 => "bestvideo[height<=480]+bestaudio/best[height<=480]",
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Quality::Best => "Best available",
            Quality::P1080 => "1080p",
            Quality::P720 => "720p",
            Quality::P480 => "480p",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Browser {
    #[default]
    Chrome,
    Brave,
    Edge,
    Firefox,
    Safari,
}

impl Browser {
    pub const ALL: [Browser; 5] = [
        Browser::Chrome,
        Browser::Brave,
        Browser::Edge,
        Browser::Firefox,
        Browser::Safari,
    ];

    /// Identifier understood by `--cookies-from-browser`.
    pub fn id(self) -> &'static str {
        match self {
            Browser::Chrome => "chrome",
            Browser::Brave => "brave",
            Browser::Edge => "edge",
            Browser::Firefox => "firefox",
            Browser::Safari => "safari",
        }
    }
}

impl fmt::Display for Browser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Browser::Chrome => "Chrome",
            Browser::Brave => "Brave",
            Browser::Edge => "Edge",
            Browser::Firefox => "Firefox",
            Browser::Safari => "Safari",
        };
        f.write_str(label)
    }
}

/// Where yt-dlp should take its cookies from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CookieSource {
    Browser(Browser),
    /// An empty path means "use the configured default if it exists".
    File(PathBuf),
    None,
}

/// The ordered URLs a download acts on, and where they came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTargets {
    urls: Vec<String>,
    from_selection: bool,
}

impl DownloadTargets {
    pub fn explicit(url: impl Into<String>) -> Self {
        Self {
            urls: vec![url.into()],
            from_selection: false,
        }
    }

    pub fn from_selection(urls: Vec<String>) -> Self {
        Self {
            urls,
            from_selection: true,
        }
    }

    /// Picks the targets for `mode` from the URL field and the checked
    /// playlist entries. Only subtitle downloads use the playlist
    /// selection, and a non-empty selection wins over the URL field.
    pub fn resolve(
        mode: DownloadMode,
        url_input: &str,
        selected: Vec<String>,
    ) -> Result<Self, ConfigError> {
        let url = url_input.trim();
        if mode == DownloadMode::Subtitles && !selected.is_empty() {
            return Ok(Self::from_selection(selected));
        }
        if url.is_empty() {
            return Err(ConfigError::NoTargets);
        }
        Ok(Self::explicit(url))
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    pub fn is_from_selection(&self) -> bool {
        self.from_selection
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub mode: DownloadMode,
    pub quality: Quality,
    pub cookies: CookieSource,
    pub output_dir: Option<PathBuf>,
    pub targets: DownloadTargets,
}

/// One leaf entry of a flat playlist listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoDescriptor {
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobKind {
    Download,
    Fetch,
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobKind::Download => f.write_str("download"),
            JobKind::Fetch => f.write_str("fetch"),
        }
    }
}

/// How a job ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    /// The process ran. `code` is `None` when it was terminated by a signal.
    Exited {
        code: Option<i32>,
        stderr: Option<String>,
    },
    /// The executable could not be launched.
    SpawnFailed(String),
}

impl JobOutcome {
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            JobOutcome::Exited { code, .. } => *code,
            JobOutcome::SpawnFailed(_) => None,
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code() == Some(0)
    }

    pub fn stderr(&self) -> Option<&str> {
        match self {
            JobOutcome::Exited { stderr, .. } => stderr.as_deref(),
            JobOutcome::SpawnFailed(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subtitles_prefer_selection() {
        let selected = vec!["https://a".to_string(), "https://b".to_string()];
        let targets =
            DownloadTargets::resolve(DownloadMode::Subtitles, "https://channel", selected).unwrap();
        assert!(targets.is_from_selection());
        assert_eq!(targets.urls(), ["https://a", "https://b"]);
    }

    #[test]
    fn test_subtitles_fall_back_to_url_field() {
        let targets =
            DownloadTargets::resolve(DownloadMode::Subtitles, "  https://x  ", vec![]).unwrap();
        assert!(!targets.is_from_selection());
        assert_eq!(targets.urls(), ["https://x"]);
    }

    #[test]
    fn test_video_ignores_selection() {
        let targets = DownloadTargets::resolve(
            DownloadMode::Video,
            "https://x",
            vec!["https://a".to_string()],
        )
        .unwrap();
        assert_eq!(targets.urls(), ["https://x"]);

        let err =
            DownloadTargets::resolve(DownloadMode::Audio, " ", vec!["https://a".to_string()])
                .unwrap_err();
        assert_eq!(err, ConfigError::NoTargets);
    }

    #[test]
    fn test_outcome_codes() {
        let failed = JobOutcome::SpawnFailed("not found".to_string());
        assert_eq!(failed.exit_code(), None);
        assert!(!failed.success());

        let ok = JobOutcome::Exited {
            code: Some(0),
            stderr: None,
        };
        assert!(ok.success());
    }
}
