//! Deadline-bound execution of external tools.
//!
//! Every stage of the pipeline that shells out — network setup and removal,
//! the load generators, tool installation — goes through [`ExternalStep`] so
//! that timeout handling, stream capture and error mapping live in one place.

use std::{path::PathBuf, process::Stdio, time::Duration};

use thiserror::Error;
use tokio::time::timeout;

/// Captured output of a completed external step.
#[derive(Debug)]
pub struct StepOutput {
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

/// Errors from running an external step.
#[derive(Debug, Error)]
pub enum StepError {
    /// The step did not finish within its deadline.
    #[error("{step} timed out after {timeout:?}")]
    Timeout {
        /// Step name.
        step: String,
        /// The deadline that was exceeded.
        timeout: Duration,
    },
    /// The process could not be spawned at all.
    #[error("failed to spawn {step}: {source}")]
    Spawn {
        /// Step name.
        step: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The process ran but exited with a non-zero status.
    #[error("{step} exited with code {code:?}: {stderr}")]
    Failed {
        /// Step name.
        step: String,
        /// Exit code, if the process was not killed by a signal.
        code: Option<i32>,
        /// Captured standard error.
        stderr: String,
    },
}

/// One external tool invocation with an enforced deadline.
#[derive(Debug)]
pub struct ExternalStep {
    name: String,
    program: PathBuf,
    args: Vec<String>,
    envs: Vec<(String, String)>,
    deadline: Duration,
}

impl ExternalStep {
    /// Creates a step with a default 60 s deadline.
    pub fn new(name: impl Into<String>, program: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            program: program.into(),
            args: Vec::new(),
            envs: Vec::new(),
            deadline: Duration::from_secs(60),
        }
    }

    /// Appends a single argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Sets an environment variable for the child process.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    /// Sets the deadline for the step.
    pub fn deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Runs the step to completion, enforcing the deadline.
    ///
    /// Exceeding the deadline kills the child and maps to
    /// [`StepError::Timeout`]; a non-zero exit maps to [`StepError::Failed`]
    /// with the captured stderr. Exceeding a deadline is always a failure of
    /// the call, never an indefinite hang.
    pub async fn run(&self) -> Result<StepOutput, StepError> {
        tracing::debug!(step = %self.name, program = %self.program.display(), "Running external step");

        let mut command = tokio::process::Command::new(&self.program);
        command
            .args(&self.args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        for (key, value) in &self.envs {
            command.env(key, value);
        }

        let child = command.output();

        let output = match timeout(self.deadline, child).await {
            Ok(Ok(output)) => output,
            Ok(Err(source)) => {
                return Err(StepError::Spawn { step: self.name.clone(), source });
            }
            Err(_) => {
                return Err(StepError::Timeout { step: self.name.clone(), timeout: self.deadline });
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            return Err(StepError::Failed {
                step: self.name.clone(),
                code: output.status.code(),
                stderr,
            });
        }

        Ok(StepOutput { stdout, stderr })
    }
}
