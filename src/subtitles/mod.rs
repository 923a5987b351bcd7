//! Turning caption files into deduplicated plain text.

pub mod convert;

use std::collections::HashSet;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

pub use convert::{convert_batch, ConversionEvent};

/// Extensions offered in the subtitle file picker.
pub const SUBTITLE_EXTENSIONS: [&str; 6] = ["srt", "vtt", "ass", "sbv", "ttml", "json"];

/// Upper-cased prefixes of header and note lines in timed caption files.
const HEADER_MARKERS: [&str; 4] = ["WEBVTT", "NOTE", "KIND:", "LANGUAGE:"];

static MARKUP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("markup regex"));

/// SubViewer timing, e.g. `0:00:01.000,0:00:03.500`.
static SBV_TIMING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d+:\d{2}:\d{2}\.\d{3},\d+:\d{2}:\d{2}\.\d{3}$").expect("sbv timing regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubtitleFormat {
    Srt,
    Vtt,
    Sbv,
    Ttml,
    Ass,
    Json,
    Plain,
}

impl SubtitleFormat {
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "srt" => SubtitleFormat::Srt,
            "vtt" => SubtitleFormat::Vtt,
            "sbv" => SubtitleFormat::Sbv,
            "ttml" => SubtitleFormat::Ttml,
            "ass" => SubtitleFormat::Ass,
            "json" => SubtitleFormat::Json,
            _ => SubtitleFormat::Plain,
        }
    }

    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(SubtitleFormat::Plain)
    }

    /// Formats carrying cue counters, timing lines and headers.
    pub fn is_structured(self) -> bool {
        matches!(
            self,
            SubtitleFormat::Srt | SubtitleFormat::Vtt | SubtitleFormat::Sbv | SubtitleFormat::Ttml
        )
    }
}

/// Category of one trimmed caption line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Blank,
    CueIndex,
    TimingRange,
    Header,
    Content,
}

/// Classify a trimmed line. Checks run in order; the first match wins.
pub fn classify(line: &str) -> LineKind {
    if line.is_empty() {
        return LineKind::Blank;
    }
    if line.chars().all(|c| c.is_ascii_digit()) {
        return LineKind::CueIndex;
    }
    if line.contains("-->") || SBV_TIMING_RE.is_match(line) {
        return LineKind::TimingRange;
    }
    let upper = line.to_uppercase();
    if HEADER_MARKERS.iter().any(|marker| upper.starts_with(marker)) {
        return LineKind::Header;
    }
    LineKind::Content
}

pub fn strip_markup(line: &str) -> String {
    MARKUP_RE.replace_all(line, "").into_owned()
}

/// Clean caption text into plain text.
///
/// Structural lines are dropped for structured formats, markup and
/// character references are removed from everything else, blank runs
/// collapse to one blank line, and a line whose case-folded form was
/// already emitted anywhere earlier in the file is dropped.
pub fn normalize(raw: &str, format: SubtitleFormat) -> String {
    let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    let structured = format.is_structured();

    let raw = raw.replace("\r\n", "\n");

    let mut lines: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    // Old Mac files end lines with a lone '\r'
    for raw_line in raw.split(['\n', '\r']) {
        let line = raw_line.trim();
        match classify(line) {
            LineKind::Blank => {
                if lines.last().is_some_and(|last| !last.is_empty()) {
                    lines.push(String::new());
                }
                continue;
            }
            LineKind::CueIndex | LineKind::TimingRange | LineKind::Header if structured => {
                continue;
            }
            _ => {}
        }

        let stripped = strip_markup(line);
        let text = html_escape::decode_html_entities(&stripped).trim().to_string();
        if text.is_empty() {
            continue;
        }
        // `<i>1984</i>` would read as a cue index once the tags are gone
        if structured && classify(&text) != LineKind::Content {
            continue;
        }

        if !seen.insert(text.to_lowercase()) {
            continue;
        }
        lines.push(text);
    }

    let mut output = lines.join("\n").trim().to_string();
    output.push('\n');
    output
}
