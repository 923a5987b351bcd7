use std::path::{Path, PathBuf};

use crate::domain::{ConfigError, CookieSource, DownloadMode, DownloadRequest};

use super::config::ToolConfig;

/// A fully built yt-dlp invocation: the executable followed by its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<String>,
}

impl ToolCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    /// The whole argument vector, executable first.
    pub fn to_argv(&self) -> Vec<String> {
        std::iter::once(self.program.to_string_lossy().into_owned())
            .chain(self.args.iter().cloned())
            .collect()
    }

    /// Shell-quoted rendering for the run log.
    pub fn display(&self) -> String {
        shell_words::join(self.to_argv())
    }
}

/// Turns user choices into yt-dlp command lines. Never runs anything.
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    config: ToolConfig,
}

impl CommandBuilder {
    pub fn new(config: ToolConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ToolConfig {
        &self.config
    }

    pub fn build(&self, request: &DownloadRequest) -> Result<ToolCommand, ConfigError> {
        if request.targets.is_empty() {
            return Err(ConfigError::NoTargets);
        }

        let mut cmd = ToolCommand::new(&self.config.executable).arg("--newline");

        match &request.cookies {
            CookieSource::Browser(browser) => {
                cmd = cmd.args(["--cookies-from-browser", browser.id()]);
            }
            CookieSource::File(path) => {
                if let Some(path) = self.resolve_cookie_file(path)? {
                    cmd = cmd
                        .arg("--cookies")
                        .arg(path.to_string_lossy().into_owned());
                }
            }
            CookieSource::None => {}
        }

        if let Some(dir) = request
            .output_dir
            .as_ref()
            .filter(|dir| !dir.as_os_str().is_empty())
        {
            cmd = cmd.arg("-P").arg(dir.to_string_lossy().into_owned());
        }

        cmd = match request.mode {
            DownloadMode::Video => cmd.args(["-f", request.quality.format_selector()]),
            DownloadMode::Audio => cmd.args(["-f", "bestaudio/best", "-x", "--audio-format", "mp3"]),
            DownloadMode::Subtitles => {
                let cmd = cmd.args([
                    "--skip-download",
                    "--write-subs",
                    "--write-auto-subs",
                    "--sub-format",
                    "best",
                ]);
                if request.targets.is_from_selection() {
                    cmd.arg("--no-playlist")
                } else {
                    cmd
                }
            }
        };

        Ok(cmd.args(request.targets.urls().iter().cloned()))
    }

    /// Listing invocation: one JSON object per playlist entry on stdout.
    pub fn flat_playlist(&self, url: &str) -> ToolCommand {
        ToolCommand::new(&self.config.executable).args(["--flat-playlist", "--dump-json", url])
    }

    /// An empty path falls back to the default cookie file when it exists.
    /// `None` means no cookie flags at all.
    pub fn resolve_cookie_file(&self, path: &Path) -> Result<Option<PathBuf>, ConfigError> {
        let resolved = if path.as_os_str().is_empty() {
            match self.config.default_cookies_if_present() {
                Some(default) => default.to_path_buf(),
                None => return Ok(None),
            }
        } else {
            path.to_path_buf()
        };

        if resolved.is_file() {
            Ok(Some(resolved))
        } else {
            Err(ConfigError::CookieFileMissing(resolved))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Browser, DownloadTargets, Quality};
    use pretty_assertions::assert_eq;

    fn builder(dir: &Path) -> CommandBuilder {
        CommandBuilder::new(ToolConfig {
            executable: PathBuf::from("/opt/yt-dlp"),
            default_cookies: dir.join("cookies.txt"),
        })
    }

    fn request(mode: DownloadMode, cookies: CookieSource, targets: DownloadTargets) -> DownloadRequest {
        DownloadRequest {
            mode,
            quality: Quality::P720,
            cookies,
            output_dir: None,
            targets,
        }
    }

    #[test]
    fn test_video_with_browser_cookies() {
        let dir = tempfile::tempdir().unwrap();
        let mut req = request(
            DownloadMode::Video,
            CookieSource::Browser(Browser::Firefox),
            DownloadTargets::explicit("https://youtu.be/abc"),
        );
        req.output_dir = Some(PathBuf::from("/downloads"));

        let argv = builder(dir.path()).build(&req).unwrap().to_argv();
        assert_eq!(
            argv,
            vec![
                "/opt/yt-dlp",
                "--newline",
                "--cookies-from-browser",
                "firefox",
                "-P",
                "/downloads",
                "-f",
                "bestvideo[height<=720]+bestaudio/best[height<=720]",
                "https://youtu.be/abc",
            ]
        );
    }

    #[test]
    fn test_audio_flags() {
        let dir = tempfile::tempdir().unwrap();
        let req = request(
            DownloadMode::Audio,
            CookieSource::None,
            DownloadTargets::explicit("https://youtu.be/abc"),
        );
        let cmd = builder(dir.path()).build(&req).unwrap();
        assert_eq!(
            cmd.arguments(),
            [
                "--newline",
                "-f",
                "bestaudio/best",
                "-x",
                "--audio-format",
                "mp3",
                "https://youtu.be/abc"
            ]
        );
    }

    #[test]
    fn test_subtitles_from_selection_disable_playlist() {
        let dir = tempfile::tempdir().unwrap();
        let urls = vec![
            "https://www.youtube.com/watch?v=b".to_string(),
            "https://www.youtube.com/watch?v=a".to_string(),
        ];
        let req = request(
            DownloadMode::Subtitles,
            CookieSource::None,
            DownloadTargets::from_selection(urls.clone()),
        );
        let argv = builder(dir.path()).build(&req).unwrap().to_argv();

        assert!(argv.contains(&"--no-playlist".to_string()));
        assert!(argv.contains(&"--write-auto-subs".to_string()));
        assert_eq!(&argv[argv.len() - 2..], urls.as_slice());
    }

    #[test]
    fn test_subtitles_from_url_keep_playlist() {
        let dir = tempfile::tempdir().unwrap();
        let req = request(
            DownloadMode::Subtitles,
            CookieSource::None,
            DownloadTargets::explicit("https://www.youtube.com/@channel"),
        );
        let argv = builder(dir.path()).build(&req).unwrap().to_argv();
        assert!(!argv.contains(&"--no-playlist".to_string()));
        assert_eq!(argv.last().unwrap(), "https://www.youtube.com/@channel");
    }

    #[test]
    fn test_empty_cookie_path_uses_default() {
        let dir = tempfile::tempdir().unwrap();
        let default = dir.path().join("cookies.txt");
        std::fs::write(&default, "").unwrap();

        let req = request(
            DownloadMode::Video,
            CookieSource::File(PathBuf::new()),
            DownloadTargets::explicit("https://youtu.be/abc"),
        );
        let argv = builder(dir.path()).build(&req).unwrap().to_argv();
        let pos = argv.iter().position(|a| a == "--cookies").unwrap();
        assert_eq!(argv[pos + 1], default.to_string_lossy());
    }

    #[test]
    fn test_empty_cookie_path_without_default_adds_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let req = request(
            DownloadMode::Video,
            CookieSource::File(PathBuf::new()),
            DownloadTargets::explicit("https://youtu.be/abc"),
        );
        let argv = builder(dir.path()).build(&req).unwrap().to_argv();
        assert!(!argv.iter().any(|a| a.starts_with("--cookies")));
    }

    #[test]
    fn test_missing_cookie_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("elsewhere.txt");
        let req = request(
            DownloadMode::Video,
            CookieSource::File(missing.clone()),
            DownloadTargets::explicit("https://youtu.be/abc"),
        );
        assert_eq!(
            builder(dir.path()).build(&req),
            Err(ConfigError::CookieFileMissing(missing))
        );
    }

    #[test]
    fn test_empty_targets_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let req = request(
            DownloadMode::Subtitles,
            CookieSource::None,
            DownloadTargets::from_selection(Vec::new()),
        );
        assert_eq!(builder(dir.path()).build(&req), Err(ConfigError::NoTargets));
    }

    #[test]
    fn test_flat_playlist_command() {
        let dir = tempfile::tempdir().unwrap();
        let cmd = builder(dir.path()).flat_playlist("https://www.youtube.com/@channel/videos");
        assert_eq!(
            cmd.to_argv(),
            vec![
                "/opt/yt-dlp",
                "--flat-playlist",
                "--dump-json",
                "https://www.youtube.com/@channel/videos"
            ]
        );
    }

    #[test]
    fn test_display_quotes_selectors() {
        let cmd = ToolCommand::new("/opt/yt-dlp").args(["-f", "best[height<=480]", "-P", "My Videos"]);
        assert_eq!(
            cmd.display(),
            "/opt/yt-dlp -f 'best[height<=480]' -P 'My Videos'"
        );
    }

    #[test]
    fn test_display_quoting_edge_cases() {
        let cmd = ToolCommand::new("/opt/yt-dlp").args(["--newline", "", "it's", "caf\u{e9}"]);
        assert_eq!(cmd.display(), r"/opt/yt-dlp --newline '' 'it'\''s' café");
    }
}
