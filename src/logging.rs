use file_rotate::{compression::Compression, suffix::AppendCount, ContentLimit, FileRotate};
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub const LOG_FILE_SIZE: usize = 100 * 1024 * 1024;
pub const LOG_BACKUP_COUNT: usize = 10;

/// `LOG_FILE_PATH` if set, otherwise `logs/archiving.log` next to the executable.
pub fn default_log_path() -> PathBuf {
    if let Ok(path) = env::var("LOG_FILE_PATH") {
        return PathBuf::from(path);
    }

    let base_dir = env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."));
    base_dir.join("logs").join("archiving.log")
}

pub fn init_logger(log_file_path: &Path) -> io::Result<impl Drop> {
    let filter = env::var("TRACING_LEVEL").unwrap_or_else(|_| "debug".to_string());
    let filter_layer = EnvFilter::new(filter);

    if let Some(log_dir) = log_file_path.parent() {
        fs::create_dir_all(log_dir)?;
    }

    let file_appender = FileRotate::new(
        log_file_path,
        AppendCount::new(LOG_BACKUP_COUNT),
        ContentLimit::BytesSurpassed(LOG_FILE_SIZE),
        Compression::None,
        #[cfg(unix)]
        None,
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_target(false)
                .with_ansi(false),
        )
        .with(filter_layer)
        .init();

    info!("Logging to {}", log_file_path.display());

    Ok(guard)
}
