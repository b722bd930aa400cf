use std::fmt;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::{Error, Result};

const TMUX_BIN: &str = "tmux";

/// One tmux invocation, as an immutable argument list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TmuxCommand {
    args: Vec<String>,
}

impl TmuxCommand {
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// The tmux subcommand (`new-session`, `neww`, ...).
    pub fn subcommand(&self) -> Option<&str> {
        self.args.first().map(String::as_str)
    }

    pub fn list_sessions() -> Self {
        Self::new(["list-sessions"])
    }

    pub fn has_session(name: &str) -> Self {
        Self::new(["has-session", "-t", exact(name).as_str()])
    }

    pub fn new_session(name: &str, dir: &str, window: Option<&str>) -> Self {
        let mut args = vec!["new-session", "-ds", name, "-c", dir];
        if let Some(window) = window {
            args.extend(["-n", window]);
        }
        Self::new(args)
    }

    pub fn new_window(session: &str, dir: &str, window: &str) -> Self {
        let target = format!("{}:", exact(session));
        Self::new(["neww", "-t", target.as_str(), "-c", dir, "-n", window])
    }

    pub fn attach_session(name: &str) -> Self {
        Self::new(["attach-session", "-t", exact(name).as_str()])
    }

    pub fn switch_client(name: &str) -> Self {
        Self::new(["switch-client", "-t", exact(name).as_str()])
    }

    pub fn kill_session(name: &str) -> Self {
        Self::new(["kill-session", "-t", exact(name).as_str()])
    }
}

/// `=name` makes tmux match the session name exactly instead of accepting
/// a unique prefix (`api` would otherwise resolve to `api-server`).
fn exact(name: &str) -> String {
    format!("={}", name)
}

impl fmt::Display for TmuxCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", TMUX_BIN, self.args.join(" "))
    }
}

/// Executes tmux commands. One command runs at a time, to completion.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run with output captured and discarded. Errors on non-zero exit,
    /// carrying stderr.
    async fn run(&self, cmd: &TmuxCommand) -> Result<()>;

    /// Run and return stdout.
    async fn output(&self, cmd: &TmuxCommand) -> Result<String>;

    /// Run with the terminal's stdin, stdout and stderr forwarded.
    async fn run_attached(&self, cmd: &TmuxCommand) -> Result<()>;
}

/// Runs commands against the real `tmux` binary.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl SystemRunner {
    fn command(cmd: &TmuxCommand) -> Command {
        let mut command = Command::new(TMUX_BIN);
        command.args(cmd.args()).kill_on_drop(true);
        command
    }
}

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, cmd: &TmuxCommand) -> Result<()> {
        self.output(cmd).await.map(|_| ())
    }

    async fn output(&self, cmd: &TmuxCommand) -> Result<String> {
        let output = Self::command(cmd)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| Error::tmux(format!("failed to run `{}`: {}", cmd, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::tmux(format!(
                "`{}` exited with {}: {}",
                cmd,
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn run_attached(&self, cmd: &TmuxCommand) -> Result<()> {
        let status = Self::command(cmd)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| Error::tmux(format!("failed to run `{}`: {}", cmd, e)))?;

        if !status.success() {
            return Err(Error::tmux(format!("`{}` exited with {}", cmd, status)));
        }

        Ok(())
    }
}
