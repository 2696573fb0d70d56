use crate::command::{shell_quote, CommandRunner};
use crate::context::RunContext;
use crate::error::Result;
use crate::model::FileType;
use std::fs;
use std::io;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, warn};

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ArchiveReport {
    pub bundles_written: usize,
    pub directories_removed: usize,
    pub pairs_skipped: usize,
}

pub struct Archiver<'a> {
    ctx: &'a mut RunContext,
    runner: &'a dyn CommandRunner,
}

impl<'a> Archiver<'a> {
    pub fn new(ctx: &'a mut RunContext, runner: &'a dyn CommandRunner) -> Self {
        Self { ctx, runner }
    }

    /// Stage the matching files with the service stopped, bring the service
    /// back, then bundle and clean up each staging directory.
    pub fn run(mut self) -> Result<ArchiveReport> {
        let start = Instant::now();

        self.create_backup_dirs()?;

        // Already compensated inside the controller.
        self.ctx.service.stop(self.runner)?;

        match self.relocate_and_archive() {
            Ok(report) => {
                info!(
                    "Done in {:.2}s: {} bundles written, {} empty directories removed, {} skipped",
                    start.elapsed().as_secs_f64(),
                    report.bundles_written,
                    report.directories_removed,
                    report.pairs_skipped,
                );
                Ok(report)
            }
            Err(err) => {
                error!("Archiving aborted: {:?}", err);
                Err(self.ctx.service.compensate(self.runner, err))
            }
        }
    }

    pub fn create_backup_dirs(&self) -> Result<()> {
        debug!("Started making backup directories.");
        for (account, file_type) in self.ctx.pairs() {
            fs::create_dir_all(self.ctx.backup_dir(account, file_type))?;
        }
        debug!("Successfully created backup directories.");
        Ok(())
    }

    fn relocate_and_archive(&mut self) -> Result<ArchiveReport> {
        self.move_pass();

        if let Err(err) = self.ctx.service.start(self.runner) {
            warn!("Service '{}' did not start cleanly: {}", self.ctx.service.name(), err);
        }

        self.archive_pass()
    }

    pub fn move_command(&self, account: &str, file_type: FileType) -> String {
        format!(
            "find {} -maxdepth 1 -type f{} -print0 | xargs --no-run-if-empty -0 mv -t {}",
            shell_quote(&self.ctx.live_dir(account, file_type).to_string_lossy()),
            self.ctx.window.mtime_clauses(&self.ctx.now),
            shell_quote(&self.ctx.backup_dir(account, file_type).to_string_lossy()),
        )
    }

    /// Per-pair failures are logged and the loop moves on.
    fn move_pass(&mut self) {
        let pairs: Vec<(String, FileType)> = self
            .ctx
            .pairs()
            .map(|(account, ft)| (account.to_string(), ft))
            .collect();

        for (account, file_type) in pairs {
            let command = self.move_command(&account, file_type);
            match self.runner.run(&command, None) {
                Ok(output) if !output.failed() => {
                    let staged = self.ctx.backup_dir(&account, file_type);
                    if matches!(is_empty_dir(&staged), Ok(false)) {
                        self.ctx.ledger.mark_moved(&account, file_type);
                    }
                }
                Ok(_) => {}
                Err(err) => error!("Moving {} for '{}' failed: {}", file_type, account, err),
            }
        }

        self.ctx.ledger.log_summary();
    }

    fn archive_pass(&self) -> Result<ArchiveReport> {
        let mut report = ArchiveReport::default();

        for (account, file_type) in self.ctx.pairs() {
            let account_dir = self.ctx.account_backup_dir(account);
            let staged = self.ctx.backup_dir(account, file_type);

            if !is_empty_dir(&staged)? {
                let bundle = self.ctx.bundle_name(file_type);
                let archive = format!("tar -czf {} {}", shell_quote(&bundle), file_type);
                if !self.run_in(&archive, &account_dir) {
                    report.pairs_skipped += 1;
                    continue;
                }
                info!("Wrote {}", account_dir.join(&bundle).display());
                self.run_in(&remove_command(file_type), &account_dir);
                report.bundles_written += 1;
            } else if is_empty_dir(&staged)? {
                if self.run_in(&remove_command(file_type), &account_dir) {
                    report.directories_removed += 1;
                }
            }
        }

        Ok(report)
    }

    /// True when the command ran and wrote nothing to stderr.
    fn run_in(&self, command: &str, dir: &Path) -> bool {
        match self.runner.run(command, Some(dir)) {
            Ok(output) => !output.failed(),
            Err(err) => {
                error!("{}", err);
                false
            }
        }
    }
}

fn remove_command(file_type: FileType) -> String {
    format!("rm -rf {}", file_type)
}

fn is_empty_dir(dir: &Path) -> io::Result<bool> {
    Ok(fs::read_dir(dir)?.next().is_none())
}
