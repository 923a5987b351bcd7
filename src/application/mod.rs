pub mod job_controller;
pub mod playlist_fetcher;
pub mod playlist_selection;
pub mod session;

pub use job_controller::{JobController, JobEvent};
pub use playlist_fetcher::PlaylistFetcher;
pub use session::{Notice, NoticeLevel, Session};
