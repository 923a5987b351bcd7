pub mod command;
pub mod config;
pub mod playlist;
pub mod process;

pub use command::{CommandBuilder, ToolCommand};
pub use config::ToolConfig;
pub use process::{OutputMode, ProcessRunner};
