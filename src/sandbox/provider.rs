//! Sandbox runtime trait and process handles.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};
use crate::templates::TemplateBundle;

/// Awaitable exit code of a sandboxed process.
#[derive(Debug)]
pub struct ExitHandle {
    program: String,
    rx: oneshot::Receiver<Result<i32>>,
}

impl ExitHandle {
    pub fn new(program: impl Into<String>, rx: oneshot::Receiver<Result<i32>>) -> Self {
        Self {
            program: program.into(),
            rx,
        }
    }

    /// Waits for the process to exit and returns its exit code.
    ///
    /// A process killed by a signal reports `-1`.
    pub async fn wait(self) -> Result<i32> {
        match self.rx.await {
            Ok(result) => result,
            Err(_) => Err(Error::Spawn {
                program: self.program,
                reason: "process supervisor went away".to_string(),
            }),
        }
    }
}

/// A process running inside a sandbox.
#[derive(Debug)]
pub struct SpawnedProcess {
    /// Output chunks from stdout and stderr, in arrival order.
    ///
    /// The channel closes once both streams reach EOF, or once the process
    /// has exited and output has gone quiet.
    pub output: mpsc::Receiver<String>,
    /// Resolves after the output channel has been fully fed.
    pub exit: ExitHandle,
}

/// An isolated execution environment the lab mounts files into and runs
/// commands in.
#[async_trait]
pub trait SandboxRuntime: Send + Sync {
    /// Returns the host directory backing the sandbox filesystem.
    fn root(&self) -> &Path;

    /// Writes every bundle file into the sandbox, creating directories.
    async fn mount(&self, bundle: &TemplateBundle) -> Result<()>;

    /// Starts `program` with `args` in the sandbox root.
    ///
    /// Cancelling `cancel` kills the process; its exit then resolves to
    /// [`Error::Cancelled`].
    async fn spawn(
        &self,
        program: &str,
        args: &[String],
        cancel: CancellationToken,
    ) -> Result<SpawnedProcess>;

    /// Writes `contents` to a sandbox-absolute path such as `/app.js`.
    async fn write_file(&self, path: &str, contents: &str) -> Result<()>;
}

/// Maps a sandbox path (`/k8s/service.yaml` or `k8s/service.yaml`) onto the
/// host directory `root`, rejecting anything that would escape it.
pub fn resolve_path(root: &Path, path: &str) -> Result<PathBuf> {
    let mut resolved = root.to_path_buf();
    let mut depth = 0usize;

    for component in Path::new(path.trim_start_matches('/')).components() {
        match component {
            Component::Normal(part) => {
                resolved.push(part);
                depth += 1;
            }
            Component::CurDir => {}
            _ => return Err(Error::InvalidPath(PathBuf::from(path))),
        }
    }

    if depth == 0 {
        return Err(Error::InvalidPath(PathBuf::from(path)));
    }

    Ok(resolved)
}
