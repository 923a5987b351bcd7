use std::path::PathBuf;

use iced::{
    widget::{button, checkbox, column, pick_list, radio, row, scrollable, text, text_input, Column},
    Element, Length,
};

use crate::{
    application::Session,
    domain::{
        Browser, ConfigError, CookieSource, DownloadMode, DownloadRequest, DownloadTargets,
        Quality, VideoDescriptor,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CookieMode {
    #[default]
    Browser,
    File,
}

/// Form state of the main window
#[derive(Debug, Default)]
pub struct DownloadView {
    pub url: String,
    pub cookie_mode: CookieMode,
    pub cookies_path: String,
    pub browser: Browser,
    pub output_dir: String,
    pub mode: DownloadMode,
    pub quality: Quality,
}

#[derive(Debug, Clone)]
pub enum DownloadMessage {
    UrlChanged(String),
    FetchPressed,
    CookieModeChanged(CookieMode),
    CookiesPathChanged(String),
    BrowseCookies,
    BrowserSelected(Browser),
    OutputDirChanged(String),
    BrowseOutputDir,
    ModeSelected(DownloadMode),
    QualitySelected(Quality),
    PlaylistToggled(usize, bool),
    SelectAll,
    ClearSelection,
    ConvertSubtitles,
    DownloadPressed,
}

impl DownloadView {
    pub fn update(&mut self, message: DownloadMessage) {
        match message {
            DownloadMessage::UrlChanged(url) => self.url = url,
            DownloadMessage::CookieModeChanged(mode) => self.cookie_mode = mode,
            DownloadMessage::CookiesPathChanged(path) => self.cookies_path = path,
            DownloadMessage::BrowserSelected(browser) => self.browser = browser,
            DownloadMessage::OutputDirChanged(dir) => self.output_dir = dir,
            DownloadMessage::ModeSelected(mode) => self.mode = mode,
            DownloadMessage::QualitySelected(quality) => self.quality = quality,
            // Will be handled by the app
            _ => {}
        }
    }

    pub fn cookie_source(&self) -> CookieSource {
        match self.cookie_mode {
            CookieMode::Browser => CookieSource::Browser(self.browser),
            CookieMode::File => CookieSource::File(PathBuf::from(self.cookies_path.trim())),
        }
    }

    /// Snapshot of the form as a request. `selected` are the checked playlist URLs.
    pub fn download_request(&self, selected: Vec<String>) -> Result<DownloadRequest, ConfigError> {
        let targets = DownloadTargets::resolve(self.mode, &self.url, selected)?;
        let output_dir = self.output_dir.trim();

        Ok(DownloadRequest {
            mode: self.mode,
            quality: self.quality,
            cookies: self.cookie_source(),
            output_dir: (!output_dir.is_empty()).then(|| PathBuf::from(output_dir)),
            targets,
        })
    }

    pub fn view<'a>(
        &'a self,
        session: &'a Session,
        can_run: bool,
    ) -> Element<'a, DownloadMessage> {
        let url_row = row![
            text_input("Paste a video, playlist or channel URL...", &self.url)
                .on_input(DownloadMessage::UrlChanged)
                .padding(8)
                .width(Length::Fill),
            button("Fetch Videos")
                .on_press_maybe(can_run.then_some(DownloadMessage::FetchPressed))
                .padding([8, 16]),
        ]
        .spacing(8);

        let file_mode = self.cookie_mode == CookieMode::File;
        let cookie_detail: Element<'a, DownloadMessage> = if file_mode {
            row![
                text_input("cookies.txt", &self.cookies_path)
                    .on_input(DownloadMessage::CookiesPathChanged)
                    .padding(8)
                    .width(Length::Fill),
                button("Browse").on_press(DownloadMessage::BrowseCookies),
            ]
            .spacing(8)
            .into()
        } else {
            row![
                text("Browser:"),
                pick_list(
                    &Browser::ALL[..],
                    Some(self.browser),
                    DownloadMessage::BrowserSelected
                ),
            ]
            .spacing(8)
            .into()
        };

        let cookies = column![
            text("Cookies").size(16),
            row![
                radio(
                    "Use browser cookies",
                    CookieMode::Browser,
                    Some(self.cookie_mode),
                    DownloadMessage::CookieModeChanged
                ),
                radio(
                    "Use cookies.txt",
                    CookieMode::File,
                    Some(self.cookie_mode),
                    DownloadMessage::CookieModeChanged
                ),
            ]
            .spacing(16),
            cookie_detail,
        ]
        .spacing(8);

        let output_row = row![
            text("Output folder:"),
            text_input("Current directory", &self.output_dir)
                .on_input(DownloadMessage::OutputDirChanged)
                .padding(8)
                .width(Length::Fill),
            button("Browse").on_press(DownloadMessage::BrowseOutputDir),
        ]
        .spacing(8);

        let quality_row: Element<'a, DownloadMessage> = if self.mode == DownloadMode::Video {
            row![
                text("Video quality:"),
                pick_list(
                    &Quality::ALL[..],
                    Some(self.quality),
                    DownloadMessage::QualitySelected
                ),
            ]
            .spacing(8)
            .into()
        } else {
            Column::new().into()
        };

        let options = column![
            text("Download Options").size(16),
            row![
                radio(
                    "Video",
                    DownloadMode::Video,
                    Some(self.mode),
                    DownloadMessage::ModeSelected
                ),
                radio(
                    "Audio",
                    DownloadMode::Audio,
                    Some(self.mode),
                    DownloadMessage::ModeSelected
                ),
                radio(
                    "Subtitles",
                    DownloadMode::Subtitles,
                    Some(self.mode),
                    DownloadMessage::ModeSelected
                ),
            ]
            .spacing(16),
            quality_row,
        ]
        .spacing(8);

        let actions = row![
            button("Download")
                .on_press_maybe(can_run.then_some(DownloadMessage::DownloadPressed))
                .padding([10, 20]),
            button("Convert Subtitles\u{2026}")
                .on_press(DownloadMessage::ConvertSubtitles)
                .padding([10, 20]),
        ]
        .spacing(12);

        column![
            url_row,
            cookies,
            output_row,
            options,
            playlist_panel(session),
            actions,
            scrollable(text(session.log()).size(13))
                .width(Length::Fill)
                .height(Length::Fill),
        ]
        .padding(12)
        .spacing(12)
        .into()
    }
}

fn playlist_panel(session: &Session) -> Element<'_, DownloadMessage> {
    if !session.playlist_visible {
        return Column::new().into();
    }

    let entries = Column::with_children(
        session
            .playlist
            .iter()
            .map(|(index, video, checked)| playlist_row(index, video, checked)),
    )
    .spacing(4);

    column![
        text("Playlist Videos").size(16),
        scrollable(entries).height(Length::Fixed(160.0)),
        text(&session.playlist_status).size(14),
        row![
            button("Select All").on_press(DownloadMessage::SelectAll),
            button("Clear Selection").on_press(DownloadMessage::ClearSelection),
            text(format!(
                "{} of {} selected",
                session.playlist.checked_count(),
                session.playlist.len()
            ))
            .size(14),
        ]
        .spacing(8),
    ]
    .spacing(8)
    .into()
}

fn playlist_row(index: usize, video: &VideoDescriptor, checked: bool) -> Element<'_, DownloadMessage> {
    row![
        checkbox(checked).on_toggle(move |value| DownloadMessage::PlaylistToggled(index, value)),
        text(format!("{}", index + 1)).width(Length::Fixed(36.0)),
        text(&video.title),
    ]
    .spacing(8)
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_to_request() {
        let mut view = DownloadView::default();
        view.update(DownloadMessage::UrlChanged(" https://youtu.be/abc ".to_string()));
        view.update(DownloadMessage::CookieModeChanged(CookieMode::File));
        view.update(DownloadMessage::CookiesPathChanged("/tmp/c.txt".to_string()));
        view.update(DownloadMessage::OutputDirChanged("  ".to_string()));
        view.update(DownloadMessage::QualitySelected(Quality::P480));

        let request = view.download_request(Vec::new()).unwrap();
        assert_eq!(request.mode, DownloadMode::Video);
        assert_eq!(request.quality, Quality::P480);
        assert_eq!(request.cookies, CookieSource::File(PathBuf::from("/tmp/c.txt")));
        assert_eq!(request.output_dir, None);
        assert_eq!(request.targets.urls(), ["https://youtu.be/abc"]);
    }

    #[test]
    fn test_subtitles_request_uses_selection() {
        let mut view = DownloadView::default();
        view.update(DownloadMessage::ModeSelected(DownloadMode::Subtitles));
        view.update(DownloadMessage::BrowserSelected(Browser::Safari));
        view.update(DownloadMessage::OutputDirChanged("/media/subs".to_string()));

        let request = view
            .download_request(vec!["https://www.youtube.com/watch?v=a".to_string()])
            .unwrap();
        assert!(request.targets.is_from_selection());
        assert_eq!(request.cookies, CookieSource::Browser(Browser::Safari));
        assert_eq!(request.output_dir, Some(PathBuf::from("/media/subs")));
    }

    #[test]
    fn test_missing_url_rejected() {
        let view = DownloadView::default();
        assert_eq!(
            view.download_request(Vec::new()).unwrap_err(),
            ConfigError::NoTargets
        );
    }
}
