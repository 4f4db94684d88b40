//! Directory-backed sandbox implementation.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};
use crate::templates::TemplateBundle;

use super::provider::{resolve_path, ExitHandle, SandboxRuntime, SpawnedProcess};

/// Buffered output chunks per process before readers apply backpressure.
const OUTPUT_BUFFER: usize = 256;

/// After the process exits, output readers are stopped once no new line
/// has arrived for this long. Backgrounded children can hold the pipes
/// open indefinitely.
const DRAIN_IDLE: Duration = Duration::from_millis(200);

/// A sandbox rooted at an ephemeral host directory.
///
/// Each sandbox gets its own `lab-<uuid>` directory, which is removed on
/// [`DirSandbox::cleanup`] or drop.
#[derive(Debug)]
pub struct DirSandbox {
    root: PathBuf,
    cleaned_up: bool,
}

impl DirSandbox {
    /// Creates a fresh sandbox directory below `base_dir`, or below the
    /// system temp directory when `base_dir` is `None`.
    pub fn create(base_dir: Option<&Path>) -> Result<Self> {
        let base = match base_dir {
            Some(dir) => dir.to_path_buf(),
            None => std::env::temp_dir().join("devops-lab-sandboxes"),
        };
        let root = base.join(format!("lab-{}", uuid::Uuid::new_v4()));

        std::fs::create_dir_all(&root).map_err(|e| {
            Error::SandboxCreation(format!("cannot create {}: {}", root.display(), e))
        })?;

        tracing::info!(path = ?root, "created lab sandbox");

        Ok(Self {
            root,
            cleaned_up: false,
        })
    }

    /// Removes the sandbox directory and everything in it.
    pub fn cleanup(&mut self) -> Result<()> {
        if self.cleaned_up {
            return Ok(());
        }

        if self.root.exists() {
            std::fs::remove_dir_all(&self.root).map_err(|e| Error::SandboxCleanup {
                path: self.root.clone(),
                reason: e.to_string(),
            })?;
        }

        tracing::debug!(path = ?self.root, "removed lab sandbox");
        self.cleaned_up = true;
        Ok(())
    }
}

impl Drop for DirSandbox {
    fn drop(&mut self) {
        if !self.cleaned_up {
            if let Err(e) = self.cleanup() {
                tracing::error!(error = %e, path = ?self.root, "failed to cleanup sandbox on drop");
            }
        }
    }
}

/// Forwards each line of `stream` into `tx` until EOF or the receiver drops.
///
/// Lines are decoded lossily so binary output never stops the reader.
fn forward_lines<R>(
    stream: Option<R>,
    tx: mpsc::Sender<String>,
    forwarded: Arc<AtomicUsize>,
) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let Some(stream) = stream else {
            return;
        };
        let mut reader = BufReader::new(stream);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => {
                    if buf.ends_with(b"\n") {
                        buf.pop();
                        if buf.ends_with(b"\r") {
                            buf.pop();
                        }
                    }
                    let line = String::from_utf8_lossy(&buf).into_owned();
                    if tx.send(line).await.is_err() {
                        break;
                    }
                    forwarded.fetch_add(1, Ordering::Relaxed);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "error reading process output");
                    break;
                }
            }
        }
    })
}

/// Waits for both readers to hit EOF after the process has exited.
///
/// Gives up once output has been idle for [`DRAIN_IDLE`]. Returns `true`
/// if `cancel` fired first.
async fn drain_output(
    stdout: &mut JoinHandle<()>,
    stderr: &mut JoinHandle<()>,
    forwarded: &AtomicUsize,
    cancel: &CancellationToken,
) -> bool {
    let finished = async {
        let _ = tokio::join!(stdout, stderr);
    };
    tokio::pin!(finished);

    let mut seen = forwarded.load(Ordering::Relaxed);
    loop {
        tokio::select! {
            () = cancel.cancelled() => return true,
            () = &mut finished => return false,
            () = tokio::time::sleep(DRAIN_IDLE) => {
                let now = forwarded.load(Ordering::Relaxed);
                if now == seen {
                    tracing::debug!("output still open after exit, detaching readers");
                    return false;
                }
                seen = now;
            }
        }
    }
}

#[async_trait]
impl SandboxRuntime for DirSandbox {
    fn root(&self) -> &Path {
        &self.root
    }

    async fn mount(&self, bundle: &TemplateBundle) -> Result<()> {
        for (path, contents) in bundle.iter() {
            self.write_file(path, contents).await?;
        }

        tracing::info!(files = bundle.len(), root = ?self.root, "mounted template bundle");
        Ok(())
    }

    async fn spawn(
        &self,
        program: &str,
        args: &[String],
        cancel: CancellationToken,
    ) -> Result<SpawnedProcess> {
        tracing::debug!(program = %program, args = ?args, "spawning sandboxed process");

        let mut child = Command::new(program)
            .args(args)
            .current_dir(&self.root)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Error::Spawn {
                program: program.to_string(),
                reason: e.to_string(),
            })?;

        let (output_tx, output_rx) = mpsc::channel(OUTPUT_BUFFER);
        let (exit_tx, exit_rx) = oneshot::channel();

        let forwarded = Arc::new(AtomicUsize::new(0));
        let mut stdout_task =
            forward_lines(child.stdout.take(), output_tx.clone(), forwarded.clone());
        let mut stderr_task = forward_lines(child.stderr.take(), output_tx, forwarded.clone());

        let name = program.to_string();
        tokio::spawn(async move {
            let status = tokio::select! {
                () = cancel.cancelled() => None,
                status = child.wait() => Some(status),
            };

            let result = match status {
                None => {
                    tracing::warn!(program = %name, "sandboxed process cancelled");
                    child.kill().await.ok();
                    Err(Error::Cancelled)
                }
                Some(status) => {
                    if drain_output(&mut stdout_task, &mut stderr_task, &forwarded, &cancel).await {
                        tracing::warn!(program = %name, "cancelled while draining output");
                        Err(Error::Cancelled)
                    } else {
                        status.map(|s| s.code().unwrap_or(-1)).map_err(|e| Error::Spawn {
                            program: name.clone(),
                            reason: e.to_string(),
                        })
                    }
                }
            };

            // Readers still running belong to backgrounded children; dropping
            // them closes the output channel.
            stdout_task.abort();
            stderr_task.abort();

            if let Ok(code) = &result {
                tracing::debug!(program = %name, exit_code = code, "sandboxed process exited");
            }
            exit_tx.send(result).ok();
        });

        Ok(SpawnedProcess {
            output: output_rx,
            exit: ExitHandle::new(program, exit_rx),
        })
    }

    async fn write_file(&self, path: &str, contents: &str) -> Result<()> {
        let target = resolve_path(&self.root, path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, contents).await?;
        Ok(())
    }
}
