use crate::domain::controller::ControllerError;
use std::iter;
use std::time::Duration;
use tokio::process::Command;
use tokio::time;
use tracing::{debug, instrument, trace, warn};

/// Runs `program` to completion and returns what it wrote to stdout. The process is killed when it does not finish
/// within `timeout`.
#[instrument(skip(args, timeout))]
pub async fn run(program: &str, args: &[String], timeout: Duration) -> Result<String, ControllerError> {
    let command = command_line(program, args);
    debug!("⚙️ Running '{}'...", command);

    let output = time::timeout(timeout, Command::new(program).args(args).kill_on_drop(true).output())
        .await
        .map_err(|_| ControllerError::Timeout {
            command: command.clone(),
            timeout,
        })?
        .map_err(|source| ControllerError::Spawn {
            command: command.clone(),
            source,
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        warn!(code = ?output.status.code(), "⚠️ Running '{}'... failed: {}", command, stderr);
        return Err(ControllerError::CommandFailed {
            command,
            code: output.status.code(),
            stderr,
        });
    }

    let stdout = String::from_utf8(output.stdout).map_err(|source| ControllerError::InvalidUtf8 {
        command: command.clone(),
        source,
    })?;
    trace!("{}", stdout);
    debug!("⚙️ Running '{}'... OK", command);

    Ok(stdout)
}

pub fn command_line(program: &str, args: &[String]) -> String {
    iter::once(program).chain(args.iter().map(String::as_str)).collect::<Vec<_>>().join(" ")
}
