use config::{Config, ConfigError, Environment, File as ConfigFile};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub accounts_root: PathBuf,
    pub backup_root: PathBuf,
    pub service_name: String,
    pub service_manager: String,
    pub command_timeout_secs: u64,
    pub max_service_restart_attempts: u32,
    pub utc_offset_hours: i32,
    pub default_from: String,
    /// Reject a `--to` that is today or later.
    pub enforce_to_in_past: bool,
    /// Reject boundaries closer than `min_age_days` to now.
    pub enforce_min_age: bool,
    pub min_age_days: i64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            accounts_root: PathBuf::from("/var/lib/demisto/tenants"),
            backup_root: PathBuf::from("/var/lib/demisto-archive"),
            service_name: "demisto".to_string(),
            service_manager: "systemctl".to_string(),
            command_timeout_secs: 7200,
            max_service_restart_attempts: 5,
            utc_offset_hours: 3,
            default_from: "2010-01-01".to_string(),
            enforce_to_in_past: false,
            enforce_min_age: false,
            min_age_days: 90,
        }
    }
}

/// Layers `Archiver.*` from the working directory, then `explicit` if given,
/// then `ARCHIVER_*` environment variables.
pub fn load_configuration(explicit: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder =
        Config::builder().add_source(ConfigFile::with_name("Archiver").required(false));

    if let Some(path) = explicit {
        builder = builder.add_source(ConfigFile::from(path).required(true));
    }

    let settings = builder
        .add_source(Environment::with_prefix("ARCHIVER").try_parsing(true))
        .build()?;
    settings.try_deserialize::<AppConfig>()
}
