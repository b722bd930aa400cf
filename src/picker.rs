use std::io::ErrorKind;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::error::{Error, Result};

/// fzf exit codes for "no match" (1) and "interrupted" (130).
const CANCEL_EXIT_CODES: [i32; 2] = [1, 130];

/// Interactive single-choice selection over newline-separated candidates.
#[async_trait]
pub trait Picker: Send + Sync {
    /// The chosen line, trimmed, or [`Error::Cancelled`].
    async fn pick(&self, candidates: &[u8]) -> Result<String>;
}

/// Runs fzf as a child process.
///
/// Candidates go to its stdin, the selection comes back on stdout and the UI
/// is drawn on the inherited terminal.
#[derive(Debug, Clone)]
pub struct FzfPicker {
    program: String,
    args: Vec<String>,
}

impl FzfPicker {
    /// Inside tmux fzf opens in a popup, otherwise inline at 70% height.
    pub fn new(inside_tmux: bool) -> Self {
        let args: &[&str] = if inside_tmux {
            &["--tmux", "70%"]
        } else {
            &["--height=70%", "--border", "--margin=1", "--padding=1"]
        };
        Self::with_command("fzf", args.iter().copied())
    }

    pub fn with_command<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl Picker for FzfPicker {
    async fn pick(&self, candidates: &[u8]) -> Result<String> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Error::picker(format!("failed to start {}: {}", self.program, e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            match stdin.write_all(candidates).await {
                Ok(()) => {}
                // The picker may exit before reading everything; its exit
                // status decides what happened.
                Err(e) if e.kind() == ErrorKind::BrokenPipe => {}
                Err(e) => {
                    return Err(Error::picker(format!(
                        "failed to write to {}: {}",
                        self.program, e
                    )))
                }
            }
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| Error::picker(format!("{} did not finish: {}", self.program, e)))?;

        interpret_exit(output.status.code(), &output.stdout)
    }
}

/// Map the picker's exit code and stdout to a selection.
///
/// `None` means the process was killed by a signal.
pub fn interpret_exit(code: Option<i32>, stdout: &[u8]) -> Result<String> {
    match code {
        Some(0) => {
            let selection = String::from_utf8_lossy(stdout).trim().to_string();
            if selection.is_empty() {
                Err(Error::Cancelled)
            } else {
                Ok(selection)
            }
        }
        Some(code) if CANCEL_EXIT_CODES.contains(&code) => Err(Error::Cancelled),
        Some(code) => Err(Error::picker(format!("exited with code {}", code))),
        None => Err(Error::picker("terminated by signal")),
    }
}

/// Session name from a `tmux list-sessions` line (`name: 2 windows ...`).
pub fn session_from_listing(line: &str) -> &str {
    line.split_once(':').map_or(line, |(name, _)| name)
}
