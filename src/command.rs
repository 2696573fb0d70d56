use crate::error::{Error, Result};
use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error};

#[cfg(test)]
use mockall::automock;

pub const DEFAULT_TIMEOUT_SECS: u64 = 7200;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Trimmed output of a finished command. Exit status is not inspected:
/// anything on stderr counts as a failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn failed(&self) -> bool {
        !self.stderr.is_empty()
    }

    /// stdout, or `Error::Command` carrying stderr.
    pub fn into_result(self, command: &str) -> Result<String> {
        if self.failed() {
            Err(Error::Command {
                command: command.to_string(),
                stderr: self.stderr,
            })
        } else {
            Ok(self.stdout)
        }
    }
}

#[cfg_attr(test, automock)]
pub trait CommandRunner {
    fn run<'a>(&self, command: &str, working_dir: Option<&'a Path>) -> Result<CommandOutput>;
}

/// Runs commands through `sh -c`, blocking until they exit or time out.
pub struct ShellRunner {
    timeout: Duration,
}

impl ShellRunner {
    pub fn new(timeout_secs: u64) -> Self {
        Self {
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    fn wait(&self, command: &str, child: &mut Child) -> Result<()> {
        let deadline = Instant::now() + self.timeout;
        loop {
            match child.try_wait() {
                Ok(Some(_)) => return Ok(()),
                Ok(None) if Instant::now() >= deadline => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(Error::Timeout {
                        command: command.to_string(),
                        timeout_secs: self.timeout.as_secs(),
                    });
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(err) => return Err(err.into()),
            }
        }
    }
}

impl Default for ShellRunner {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT_SECS)
    }
}

fn drain<R: Read + Send + 'static>(stream: Option<R>) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut stream) = stream {
            let _ = stream.read_to_end(&mut buf);
        }
        buf
    })
}

impl CommandRunner for ShellRunner {
    fn run<'a>(&self, command: &str, working_dir: Option<&'a Path>) -> Result<CommandOutput> {
        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = working_dir {
            cmd.current_dir(dir);
        }

        let mut child = cmd.spawn().map_err(|source| Error::Spawn {
            command: command.to_string(),
            source,
        })?;

        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        // On timeout the readers are left detached; orphaned grandchildren may still hold the pipes.
        if let Err(err) = self.wait(command, &mut child) {
            error!("{}", err);
            return Err(err);
        }
        let stdout = stdout.join().unwrap_or_default();
        let stderr = stderr.join().unwrap_or_default();

        let output = CommandOutput {
            stdout: String::from_utf8_lossy(&stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&stderr).trim().to_string(),
        };

        if output.failed() {
            error!("{}: {}", command, output.stderr);
        } else if !output.stdout.is_empty() {
            debug!("{}: {}", command, output.stdout);
        } else {
            debug!("{}", command);
        }

        Ok(output)
    }
}

/// Single-quote `value` for `sh`.
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}
