use std::env;
use std::path::{Path, PathBuf};

use crate::domain::ConfigError;

/// Overrides the yt-dlp executable location.
pub const EXECUTABLE_ENV: &str = "YTDL_GUI_EXECUTABLE";
/// Overrides the default cookies.txt location.
pub const COOKIES_ENV: &str = "YTDL_GUI_COOKIES";

#[cfg(windows)]
const EXECUTABLE_NAME: &str = "yt-dlp.exe";
#[cfg(not(windows))]
const EXECUTABLE_NAME: &str = "yt-dlp";

const COOKIES_NAME: &str = "cookies.txt";

/// Where the external downloader and its default cookie file live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolConfig {
    pub executable: PathBuf,
    pub default_cookies: PathBuf,
}

impl Default for ToolConfig {
    fn default() -> Self {
        let base = base_dir();
        Self {
            executable: base.join(EXECUTABLE_NAME),
            default_cookies: base.join(COOKIES_NAME),
        }
    }
}

impl ToolConfig {
    /// Defaults next to the running binary, overridden by the environment.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(path) = env_path(EXECUTABLE_ENV) {
            config.executable = path;
        }
        if let Some(path) = env_path(COOKIES_ENV) {
            config.default_cookies = path;
        }
        config
    }

    /// Startup check that the executable is present.
    pub fn verify(&self) -> Result<(), ConfigError> {
        if self.executable.is_file() {
            Ok(())
        } else {
            Err(ConfigError::MissingExecutable(self.executable.clone()))
        }
    }

    pub fn default_cookies_if_present(&self) -> Option<&Path> {
        self.default_cookies
            .is_file()
            .then_some(self.default_cookies.as_path())
    }
}

fn env_path(key: &str) -> Option<PathBuf> {
    env::var_os(key)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

fn base_dir() -> PathBuf {
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}
