use serde::Deserialize;
use url::Url;

use crate::domain::VideoDescriptor;

const WATCH_URL: &str = "https://www.youtube.com/watch";

/// One record of `--flat-playlist --dump-json` output.
#[derive(Debug, Clone, Deserialize)]
pub struct FlatEntry {
    #[serde(rename = "_type", default)]
    pub entry_type: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

impl FlatEntry {
    /// Only leaf `url` entries become descriptors.
    pub fn into_descriptor(self) -> Option<VideoDescriptor> {
        if self.entry_type.as_deref() != Some("url") {
            return None;
        }

        let raw = self.url.filter(|u| !u.is_empty())?;
        let url = if Url::parse(&raw).is_ok() {
            raw
        } else {
            watch_url(&raw)
        };
        let title = self
            .title
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| url.clone());

        Some(VideoDescriptor { title, url })
    }
}

/// Parse one output line. Malformed lines and non-leaf records yield `None`.
pub fn parse_entry(line: &str) -> Option<VideoDescriptor> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    match serde_json::from_str::<FlatEntry>(line) {
        Ok(entry) => entry.into_descriptor(),
        Err(e) => {
            log::debug!("Skipping unparsable playlist line: {}", e);
            None
        }
    }
}

/// Canonical watch-page URL for a bare video id.
pub fn watch_url(video_id: &str) -> String {
    Url::parse_with_params(WATCH_URL, &[("v", video_id)])
        .map(String::from)
        .unwrap_or_else(|_| format!("{}?v={}", WATCH_URL, video_id))
}
