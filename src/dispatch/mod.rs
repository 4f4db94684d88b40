//! Terminal command dispatch.
//!
//! Lines for the simulated DevOps tools are answered from static response
//! tables, one module per tool. Everything else runs in the sandbox shell.

mod docker;
mod git;
mod helm;
mod kubectl;

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::config::LabConfig;
use crate::error::{Error, Result};
use crate::sandbox::SandboxRuntime;
use crate::terminal::TerminalLog;

/// A simulated command-line tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Kubectl,
    Docker,
    Helm,
    Git,
}

impl Tool {
    pub fn name(&self) -> &'static str {
        match self {
            Tool::Kubectl => "kubectl",
            Tool::Docker => "docker",
            Tool::Helm => "helm",
            Tool::Git => "git",
        }
    }

    /// Canned output for `line`, which is looked up verbatim.
    pub fn respond(&self, line: &str) -> String {
        match self {
            Tool::Kubectl => kubectl::respond(line),
            Tool::Docker => docker::respond(line),
            Tool::Helm => helm::respond(line),
            Tool::Git => git::respond(line),
        }
    }
}

/// A terminal line, tagged by who answers it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Kubectl(String),
    Docker(String),
    Helm(String),
    Git(String),
    Shell(String),
}

impl Command {
    /// Classifies by prefix of the trimmed line: `kubectl`, `docker`, `helm`,
    /// `git`, in that order. The variant keeps the line untrimmed.
    pub fn classify(line: &str) -> Self {
        let trimmed = line.trim();
        let owned = line.to_string();

        if trimmed.starts_with("kubectl") {
            Command::Kubectl(owned)
        } else if trimmed.starts_with("docker") {
            Command::Docker(owned)
        } else if trimmed.starts_with("helm") {
            Command::Helm(owned)
        } else if trimmed.starts_with("git") {
            Command::Git(owned)
        } else {
            Command::Shell(owned)
        }
    }

    pub fn line(&self) -> &str {
        match self {
            Command::Kubectl(line)
            | Command::Docker(line)
            | Command::Helm(line)
            | Command::Git(line)
            | Command::Shell(line) => line,
        }
    }

    /// The simulated tool, or `None` for shell commands.
    pub fn tool(&self) -> Option<Tool> {
        match self {
            Command::Kubectl(_) => Some(Tool::Kubectl),
            Command::Docker(_) => Some(Tool::Docker),
            Command::Helm(_) => Some(Tool::Helm),
            Command::Git(_) => Some(Tool::Git),
            Command::Shell(_) => None,
        }
    }
}

/// How a dispatched line was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Answered from a response table.
    Canned(Tool),
    /// Ran in the sandbox shell and exited with this code.
    Exited(i32),
    /// The sandbox could not run the command; the reason was logged.
    Failed,
}

/// Looks `line` up verbatim in `table`, acknowledging unknown lines.
fn lookup(table: &[(&str, &str)], line: &str) -> String {
    table
        .iter()
        .find(|(command, _)| *command == line)
        .map(|(_, output)| output.to_string())
        .unwrap_or_else(|| format!("✅ Executed: {}", line))
}

/// Routes terminal lines to canned responders or the sandbox shell.
pub struct Dispatcher {
    sandbox: Arc<dyn SandboxRuntime>,
    prompt: String,
    shell: String,
    timeout: Option<Duration>,
}

impl Dispatcher {
    pub fn new(sandbox: Arc<dyn SandboxRuntime>, config: &LabConfig) -> Self {
        Self {
            sandbox,
            prompt: config.prompt.clone(),
            shell: config.shell.clone(),
            timeout: config.command_timeout(),
        }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Echoes `line` and appends its output to `log`.
    ///
    /// Never fails: sandbox errors and non-zero exits become log lines.
    pub async fn dispatch(
        &self,
        line: &str,
        log: &mut TerminalLog,
        cancel: &CancellationToken,
    ) -> DispatchOutcome {
        log.append(format!("{}{}", self.prompt, line));

        let command = Command::classify(line);
        match command.tool() {
            Some(tool) => {
                tracing::debug!(tool = tool.name(), line = %line, "simulated command");
                log.append(tool.respond(command.line()));
                DispatchOutcome::Canned(tool)
            }
            None => self.run_shell(command.line(), log, cancel).await,
        }
    }

    async fn run_shell(
        &self,
        line: &str,
        log: &mut TerminalLog,
        cancel: &CancellationToken,
    ) -> DispatchOutcome {
        match self.spawn_shell(line, log, cancel).await {
            Ok(0) => DispatchOutcome::Exited(0),
            Ok(code) => {
                log.append(format!("❌ Command failed with exit code {}", code));
                DispatchOutcome::Exited(code)
            }
            Err(e) => {
                tracing::warn!(error = %e, line = %line, "shell command failed");
                log.append(format!("❌ Error: {}", e));
                DispatchOutcome::Failed
            }
        }
    }

    async fn spawn_shell(
        &self,
        line: &str,
        log: &mut TerminalLog,
        cancel: &CancellationToken,
    ) -> Result<i32> {
        let token = cancel.child_token();
        let expired = CancellationToken::new();
        let deadline = self.timeout.map(|limit| {
            let token = token.clone();
            let expired = expired.clone();
            tokio::spawn(async move {
                tokio::time::sleep(limit).await;
                expired.cancel();
                token.cancel();
            })
        });

        let args = vec!["-c".to_string(), line.to_string()];
        let result: Result<i32> = async {
            let mut process = self.sandbox.spawn(&self.shell, &args, token.clone()).await?;
            while let Some(chunk) = process.output.recv().await {
                log.append(chunk);
            }
            process.exit.wait().await
        }
        .await;

        if let Some(timer) = deadline {
            timer.abort();
        }

        match result {
            Err(Error::Cancelled) if expired.is_cancelled() => Err(Error::TimedOut(
                self.timeout.map(|limit| limit.as_secs()).unwrap_or_default(),
            )),
            other => {
                if let Ok(code) = &other {
                    tracing::info!(line = %line, exit_code = code, "shell command exited");
                }
                other
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_checks_prefixes_in_order() {
        assert_eq!(
            Command::classify("kubectl get pods"),
            Command::Kubectl("kubectl get pods".to_string())
        );
        assert_eq!(
            Command::classify("docker-compose up -d").tool(),
            Some(Tool::Docker)
        );
        assert_eq!(Command::classify("helm list").tool(), Some(Tool::Helm));
        assert_eq!(Command::classify("gitk").tool(), Some(Tool::Git));
        assert_eq!(Command::classify("ls -la").tool(), None);
    }

    #[test]
    fn classify_is_case_sensitive() {
        assert_eq!(
            Command::classify("Kubectl get pods"),
            Command::Shell("Kubectl get pods".to_string())
        );
    }

    #[test]
    fn classify_trims_but_keeps_the_raw_line() {
        let command = Command::classify("  git status");

        assert_eq!(command.tool(), Some(Tool::Git));
        assert_eq!(command.line(), "  git status");
        // Lookup uses the raw line, so the padded form misses the table.
        assert_eq!(
            Tool::Git.respond(command.line()),
            "✅ Executed:   git status"
        );
    }

    #[test]
    fn lookup_falls_back_to_acknowledgement() {
        let table = &[("a", "alpha")];

        assert_eq!(lookup(table, "a"), "alpha");
        assert_eq!(lookup(table, "b"), "✅ Executed: b");
    }
}
