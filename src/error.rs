use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid argument: {0}")]
    Argument(String),

    #[error("Could not parse date '{input}': {reason}")]
    Parse { input: String, reason: String },

    #[error("{command}: {stderr}")]
    Command { command: String, stderr: String },

    #[error("{command}: timed out after {timeout_secs}s")]
    Timeout { command: String, timeout_secs: u64 },

    #[error("{command}: could not start shell: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Service '{service}' reported '{status}' after stop, expected 'inactive'")]
    ServiceState { service: String, status: String },
}

impl Error {
    /// Input errors raised before anything on disk is touched.
    pub fn is_argument(&self) -> bool {
        matches!(self, Error::Argument(_) | Error::Parse { .. })
    }
}
