pub mod accounts;
pub mod archive;
pub mod command;
pub mod config;
pub mod context;
pub mod date_window;
pub mod error;
pub mod logging;
pub mod model;
pub mod service;

pub use archive::{ArchiveReport, Archiver};
pub use command::{CommandOutput, CommandRunner, ShellRunner};
pub use config::AppConfig;
pub use context::RunContext;
pub use error::{Error, Result};
pub use model::FileType;
