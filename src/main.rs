mod app;
mod application;
mod domain;
mod subtitles;
mod tool;
mod ui;
mod utils;

use iced::{window, Size};
use simplelog::{ColorChoice, ConfigBuilder, LevelFilter, TermLogger, TerminalMode};

const DEBUG_ENV: &str = "YTDL_GUI_DEBUG";

fn init_logging() {
    let level = if std::env::var_os(DEBUG_ENV).is_some() {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let config = ConfigBuilder::new()
        .add_filter_allow_str(env!("CARGO_CRATE_NAME"))
        .build();

    if let Err(e) = TermLogger::init(level, config, TerminalMode::Mixed, ColorChoice::Auto) {
        eprintln!("Failed to initialize logger: {}", e);
    }
}

fn main() -> iced::Result {
    init_logging();
    log::info!("Starting {} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    iced::application(app::DownloadApp::new, app::update, app::view)
        .title("YouTube Downloader")
        .window(window::Settings {
            size: Size::new(640.0, 720.0),
            ..Default::default()
        })
        .run()
}
