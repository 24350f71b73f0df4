//! A child process as the recurring request.

use anyhow::{anyhow, Result};
use std::io;
use std::process::{ExitStatus, Stdio};
use thiserror::Error;
use tokio::process::Command;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: ExitStatus,
        stderr: String,
    },
}

/// Program plus arguments, spawned once per request. The child is killed if
/// the request is cancelled.
#[derive(Debug, Clone)]
pub struct CommandRequest {
    program: String,
    args: Vec<String>,
}

impl CommandRequest {
    pub fn new(argv: &[String]) -> Result<Self> {
        let (program, args) = argv.split_first().ok_or_else(|| anyhow!("no command given"))?;
        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }

    /// Run to completion; stdout on exit status 0, otherwise an error.
    pub async fn run(&self) -> Result<String, CommandError> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| CommandError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if output.status.success() {
            return Ok(String::from_utf8_lossy(&output.stdout).into_owned());
        }
        Err(CommandError::Failed {
            program: self.program.clone(),
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}
