use crate::command::CommandRunner;
use crate::error::{Error, Result};
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceStatus {
    Active,
    Inactive,
    Unknown(String),
}

impl ServiceStatus {
    pub fn parse(output: &str) -> Self {
        match output.trim() {
            "active" => ServiceStatus::Active,
            "inactive" => ServiceStatus::Inactive,
            other => ServiceStatus::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ServiceStatus::Active => "active",
            ServiceStatus::Inactive => "inactive",
            ServiceStatus::Unknown(raw) => raw,
        }
    }
}

/// Stops and restarts the platform service around the file moves.
///
/// Failures while checking or stopping the service trigger a compensation:
/// re-query status and start the service if it is down. Only
/// `max_attempts` compensations happen per run; later failures are just
/// logged and propagated.
pub struct ServiceController {
    name: String,
    status_cmd: String,
    start_cmd: String,
    stop_cmd: String,
    attempts: u32,
    max_attempts: u32,
}

impl ServiceController {
    pub fn new(manager: &str, name: &str, max_attempts: u32) -> Self {
        Self {
            name: name.to_string(),
            status_cmd: format!("{} is-active {}", manager, name),
            start_cmd: format!("{} start {}", manager, name),
            stop_cmd: format!("{} stop {}", manager, name),
            attempts: 0,
            max_attempts,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn compensation_attempts(&self) -> u32 {
        self.attempts
    }

    pub fn status(&self, runner: &dyn CommandRunner) -> Result<ServiceStatus> {
        let out = runner.run(&self.status_cmd, None)?.into_result(&self.status_cmd)?;
        Ok(ServiceStatus::parse(&out))
    }

    /// Stop the service and confirm it reports `inactive`.
    pub fn stop(&mut self, runner: &dyn CommandRunner) -> Result<()> {
        match self.try_stop(runner) {
            Ok(()) => {
                info!("Service '{}' is inactive", self.name);
                Ok(())
            }
            Err(err) => Err(self.compensate(runner, err)),
        }
    }

    fn try_stop(&self, runner: &dyn CommandRunner) -> Result<()> {
        if self.status(runner)? == ServiceStatus::Active {
            runner.run(&self.stop_cmd, None)?.into_result(&self.stop_cmd)?;
        }

        match self.status(runner)? {
            ServiceStatus::Inactive => Ok(()),
            other => Err(Error::ServiceState {
                service: self.name.clone(),
                status: other.as_str().to_string(),
            }),
        }
    }

    /// Start unconditionally. A failure is logged by the runner and returned.
    pub fn start(&self, runner: &dyn CommandRunner) -> Result<()> {
        runner.run(&self.start_cmd, None)?.into_result(&self.start_cmd)?;
        info!("Service '{}' started", self.name);
        Ok(())
    }

    /// Log `err`, try to bring the service back if it is down, and hand `err` back.
    pub fn compensate(&mut self, runner: &dyn CommandRunner, err: Error) -> Error {
        error!("{}", err);

        if self.attempts >= self.max_attempts {
            warn!(
                "Service '{}' compensation limit of {} reached; not retrying",
                self.name, self.max_attempts
            );
            return err;
        }
        self.attempts += 1;
        debug!(
            "Service '{}' compensation attempt {}/{}",
            self.name, self.attempts, self.max_attempts
        );

        match runner.run(&self.status_cmd, None) {
            Ok(output) if ServiceStatus::parse(&output.stdout) == ServiceStatus::Inactive => {
                if let Err(start_err) = runner.run(&self.start_cmd, None) {
                    error!("Could not restart service '{}': {}", self.name, start_err);
                }
            }
            Ok(_) => {}
            Err(status_err) => error!("{}", status_err),
        }

        err
    }
}
