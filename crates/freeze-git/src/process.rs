//! Git process utilities

use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, trace};

use freeze_source::{SourceError, SourceResult};

const GIT: &str = "git";

/// One git invocation, optionally inside a working copy
#[derive(Debug, Clone)]
pub struct GitCommand {
    args: Vec<String>,
    cwd: Option<PathBuf>,
}

impl GitCommand {
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            cwd: None,
        }
    }

    /// Run inside `dir`
    pub fn in_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Command line as shown in logs and errors
    pub fn display(&self) -> String {
        let mut line = String::from(GIT);
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }

    /// Run to completion and return stdout.
    ///
    /// A non-zero exit becomes [`SourceError::Command`] carrying stderr.
    /// Dropping the returned future kills the child.
    pub async fn output(&self) -> SourceResult<String> {
        let mut cmd = Command::new(GIT);
        cmd.args(&self.args);

        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }

        // Never block on credential prompts
        cmd.env("GIT_TERMINAL_PROMPT", "0");

        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(true);

        debug!(command = %self.display(), "Running git");

        let output = cmd.output().await.map_err(|source| SourceError::Spawn {
            program: GIT.into(),
            source,
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

        if !output.status.success() {
            return Err(SourceError::Command {
                command: self.display(),
                stderr: if stderr.is_empty() {
                    format!("exited with {}", output.status)
                } else {
                    stderr
                },
            });
        }

        trace!(command = %self.display(), stdout = %stdout.trim(), "git finished");
        Ok(stdout)
    }

    /// Run and return the first line of stdout, trimmed
    pub async fn line(&self) -> SourceResult<String> {
        let stdout = self.output().await?;
        Ok(stdout.lines().next().unwrap_or_default().trim().to_string())
    }
}
