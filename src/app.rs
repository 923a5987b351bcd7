use std::path::PathBuf;

use futures::StreamExt;
use iced::Task;

use crate::application::{
    JobController, JobEvent, Notice, NoticeLevel, PlaylistFetcher, Session,
};
use crate::domain::{AppError, ConfigError, JobKind};
use crate::subtitles::{convert_batch, ConversionEvent, SUBTITLE_EXTENSIONS};
use crate::tool::{CommandBuilder, ProcessRunner, ToolConfig};
use crate::ui::{CookieMode, DownloadMessage, DownloadView};

pub struct DownloadApp {
    view: DownloadView,
    session: Session,
    jobs: JobController,
    builder: CommandBuilder,
    // Cleared when the executable is missing at startup
    tool_ready: bool,
}

impl DownloadApp {
    pub fn new() -> (Self, Task<Message>) {
        let config = ToolConfig::from_env();
        let mut view = DownloadView::default();
        if let Some(cookies) = config.default_cookies_if_present() {
            view.cookies_path = cookies.display().to_string();
        }

        let mut session = Session::default();
        let tool_ready = match config.verify() {
            Ok(()) => {
                log::info!("Using yt-dlp at {}", config.executable.display());
                true
            }
            Err(e) => {
                session.report_error(&AppError::from(e));
                false
            }
        };

        let mut app = Self {
            view,
            session,
            jobs: JobController::new(ProcessRunner::new()),
            builder: CommandBuilder::new(config),
            tool_ready,
        };
        let task = app.flush_notice(Task::none());
        (app, task)
    }

    fn can_run(&self) -> bool {
        self.tool_ready && self.jobs.is_idle()
    }

    /// Show the session's pending notice, if any, alongside `task`.
    fn flush_notice(&mut self, task: Task<Message>) -> Task<Message> {
        match self.session.take_notice() {
            Some(notice) => Task::batch([task, show_notice(notice)]),
            None => task,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    UiMessage(DownloadMessage),
    /// Output or completion of the running download/fetch job
    Job(JobEvent),
    CookiesSelected(Option<PathBuf>),
    OutputDirSelected(Option<PathBuf>),
    SubtitlesSelected(Vec<PathBuf>),
    Conversion(ConversionEvent),
    NoticeClosed,
}

pub fn update(app: &mut DownloadApp, message: Message) -> Task<Message> {
    let task = match message {
        Message::UiMessage(ui_msg) => {
            app.view.update(ui_msg.clone());
            handle_action(app, ui_msg)
        }
        Message::Job(event) => {
            app.jobs.dispatch(event, &mut app.session);
            Task::none()
        }
        Message::CookiesSelected(path) => {
            if let Some(path) = path {
                app.view.cookies_path = path.display().to_string();
                app.view.cookie_mode = CookieMode::File;
            }
            Task::none()
        }
        Message::OutputDirSelected(path) => {
            if let Some(path) = path {
                app.view.output_dir = path.display().to_string();
            }
            Task::none()
        }
        Message::SubtitlesSelected(paths) => {
            if paths.is_empty() {
                Task::none()
            } else {
                app.session.begin_conversion(paths.len());
                Task::stream(convert_batch(paths).map(Message::Conversion))
            }
        }
        Message::Conversion(event) => {
            app.session.on_conversion(event);
            Task::none()
        }
        Message::NoticeClosed => Task::none(),
    };

    app.flush_notice(task)
}

fn handle_action(app: &mut DownloadApp, message: DownloadMessage) -> Task<Message> {
    match message {
        DownloadMessage::DownloadPressed => start_download(app),
        DownloadMessage::FetchPressed => start_fetch(app),
        DownloadMessage::PlaylistToggled(index, checked) => {
            app.session.playlist.set_checked(index, checked);
            Task::none()
        }
        DownloadMessage::SelectAll => {
            app.session.playlist.select_all();
            Task::none()
        }
        DownloadMessage::ClearSelection => {
            app.session.playlist.clear_selection();
            Task::none()
        }
        DownloadMessage::BrowseCookies => Task::perform(
            async {
                rfd::AsyncFileDialog::new()
                    .set_title("Select cookies.txt")
                    .add_filter("Text files", &["txt"])
                    .pick_file()
                    .await
                    .map(|handle| handle.path().to_path_buf())
            },
            Message::CookiesSelected,
        ),
        DownloadMessage::BrowseOutputDir => Task::perform(
            async {
                rfd::AsyncFileDialog::new()
                    .set_title("Select download folder")
                    .pick_folder()
                    .await
                    .map(|handle| handle.path().to_path_buf())
            },
            Message::OutputDirSelected,
        ),
        DownloadMessage::ConvertSubtitles => Task::perform(
            async {
                rfd::AsyncFileDialog::new()
                    .set_title("Select subtitle files")
                    .add_filter("Subtitle files", &SUBTITLE_EXTENSIONS)
                    .add_filter("All files", &["*"])
                    .pick_files()
                    .await
                    .map(|handles| {
                        handles
                            .iter()
                            .map(|handle| handle.path().to_path_buf())
                            .collect()
                    })
                    .unwrap_or_default()
            },
            Message::SubtitlesSelected,
        ),
        // Plain field edits, already applied to the view
        _ => Task::none(),
    }
}

fn start_download(app: &mut DownloadApp) -> Task<Message> {
    if !app.can_run() {
        return Task::none();
    }

    if app.view.cookie_mode == CookieMode::File && app.view.cookies_path.trim().is_empty() {
        if let Some(cookies) = app.builder.config().default_cookies_if_present() {
            app.view.cookies_path = cookies.display().to_string();
        }
    }

    let selected = app.session.playlist.selected_urls();
    let command = match app
        .view
        .download_request(selected)
        .and_then(|request| app.builder.build(&request))
    {
        Ok(command) => command,
        Err(e) => {
            app.session.report_error(&AppError::from(e));
            return Task::none();
        }
    };

    app.session.begin_download(&command);
    match app.jobs.start(JobKind::Download, command) {
        Ok(events) => Task::stream(events.map(Message::Job)),
        Err(e) => {
            app.session.report_error(&AppError::from(e));
            Task::none()
        }
    }
}

fn start_fetch(app: &mut DownloadApp) -> Task<Message> {
    if !app.can_run() {
        return Task::none();
    }

    let url = app.view.url.trim().to_string();
    if url.is_empty() {
        app.session
            .report_error(&AppError::from(ConfigError::NoTargets));
        return Task::none();
    }

    match PlaylistFetcher::fetch(&mut app.jobs, &app.builder, &url) {
        Ok((fetcher, events)) => {
            app.session.begin_fetch(fetcher);
            Task::stream(events.map(Message::Job))
        }
        Err(e) => {
            app.session.report_error(&AppError::from(e));
            Task::none()
        }
    }
}

fn show_notice(notice: Notice) -> Task<Message> {
    let level = match notice.level {
        NoticeLevel::Info => rfd::MessageLevel::Info,
        NoticeLevel::Warning => rfd::MessageLevel::Warning,
        NoticeLevel::Error => rfd::MessageLevel::Error,
    };

    Task::perform(
        async move {
            rfd::AsyncMessageDialog::new()
                .set_level(level)
                .set_title(notice.title)
                .set_description(notice.message)
                .set_buttons(rfd::MessageButtons::Ok)
                .show()
                .await;
        },
        |_| Message::NoticeClosed,
    )
}

pub fn view(app: &DownloadApp) -> iced::Element<'_, Message> {
    app.view
        .view(&app.session, app.can_run())
        .map(Message::UiMessage)
}
