use crate::accounts;
use crate::config::AppConfig;
use crate::date_window::{DateWindow, Timestamp, WindowPolicy};
use crate::error::Result;
use crate::model::{FileType, MovedFilesLedger};
use crate::service::ServiceController;
use chrono::NaiveDate;
use std::path::PathBuf;
use tracing::{debug, info};

/// Everything one archiving run needs, resolved and validated up front.
pub struct RunContext {
    pub accounts_root: PathBuf,
    pub backup_root: PathBuf,
    pub accounts: Vec<String>,
    pub window: DateWindow,
    pub now: Timestamp,
    pub service: ServiceController,
    pub ledger: MovedFilesLedger,
}

impl RunContext {
    /// Parse and validate the run inputs. Touches nothing on disk besides
    /// listing `accounts_root`.
    pub fn prepare(
        config: &AppConfig,
        requested: &[String],
        from: Option<&str>,
        to: &str,
        now: Timestamp,
    ) -> Result<Self> {
        let window = DateWindow::resolve(from, to, &config.default_from, &now)?;
        debug!("Archive window: {} .. {}", window.from, window.to);

        let available = accounts::discover(&config.accounts_root, &FileType::ALL)?;
        debug!("Available accounts: {:?}", available);
        let selected = accounts::resolve_selection(requested, &available)?;

        let policy = WindowPolicy {
            enforce_to_in_past: config.enforce_to_in_past,
            enforce_min_age: config.enforce_min_age,
            min_age_days: config.min_age_days,
        };
        window.validate(&now, &policy)?;

        info!("Archiving accounts: {:?}", selected);

        Ok(Self {
            accounts_root: config.accounts_root.clone(),
            backup_root: config.backup_root.clone(),
            ledger: MovedFilesLedger::new(&selected),
            accounts: selected,
            window,
            now,
            service: ServiceController::new(
                &config.service_manager,
                &config.service_name,
                config.max_service_restart_attempts,
            ),
        })
    }

    pub fn run_date(&self) -> NaiveDate {
        self.now.date_naive()
    }

    pub fn pairs(&self) -> impl Iterator<Item = (&str, FileType)> + '_ {
        self.accounts
            .iter()
            .flat_map(|account| FileType::ALL.iter().map(move |ft| (account.as_str(), *ft)))
    }

    pub fn live_dir(&self, account: &str, file_type: FileType) -> PathBuf {
        self.accounts_root.join(account).join(file_type.as_str())
    }

    pub fn account_backup_dir(&self, account: &str) -> PathBuf {
        self.backup_root.join(account)
    }

    pub fn backup_dir(&self, account: &str, file_type: FileType) -> PathBuf {
        self.account_backup_dir(account).join(file_type.as_str())
    }

    pub fn bundle_name(&self, file_type: FileType) -> String {
        format!("{}_{}.tar.gz", file_type, self.run_date().format("%Y-%m-%d"))
    }

    pub fn bundle_path(&self, account: &str, file_type: FileType) -> PathBuf {
        self.account_backup_dir(account).join(self.bundle_name(file_type))
    }
}
