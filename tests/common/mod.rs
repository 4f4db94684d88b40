//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

use devops_lab::sandbox::{ExitHandle, SandboxRuntime, SpawnedProcess};
use devops_lab::{Error, LabConfig, LabController, Result, TemplateBundle, TerminalLog};

/// How the fake sandbox answers spawns.
#[derive(Debug, Clone)]
pub enum Script {
    Exit { output: Vec<String>, code: i32 },
    SpawnError(String),
}

/// Sandbox that records calls instead of running anything.
pub struct RecordingSandbox {
    root: PathBuf,
    script: Script,
    pub spawns: Mutex<Vec<(String, Vec<String>)>>,
    pub writes: Mutex<Vec<(String, String)>>,
    pub mounts: Mutex<usize>,
}

impl RecordingSandbox {
    pub fn new(script: Script) -> Arc<Self> {
        Arc::new(Self {
            root: PathBuf::from("/fake-sandbox"),
            script,
            spawns: Mutex::new(Vec::new()),
            writes: Mutex::new(Vec::new()),
            mounts: Mutex::new(0),
        })
    }

    pub fn exiting(code: i32, output: &[&str]) -> Arc<Self> {
        Self::new(Script::Exit {
            output: output.iter().map(|line| line.to_string()).collect(),
            code,
        })
    }

    pub fn spawns(&self) -> Vec<(String, Vec<String>)> {
        self.spawns.lock().unwrap().clone()
    }

    pub fn writes(&self) -> Vec<(String, String)> {
        self.writes.lock().unwrap().clone()
    }
}

#[async_trait]
impl SandboxRuntime for RecordingSandbox {
    fn root(&self) -> &Path {
        &self.root
    }

    async fn mount(&self, _bundle: &TemplateBundle) -> Result<()> {
        *self.mounts.lock().unwrap() += 1;
        Ok(())
    }

    async fn spawn(
        &self,
        program: &str,
        args: &[String],
        _cancel: CancellationToken,
    ) -> Result<SpawnedProcess> {
        self.spawns
            .lock()
            .unwrap()
            .push((program.to_string(), args.to_vec()));

        match &self.script {
            Script::SpawnError(reason) => Err(Error::Spawn {
                program: program.to_string(),
                reason: reason.clone(),
            }),
            Script::Exit { output, code } => {
                let (tx, rx) = mpsc::channel(output.len().max(1));
                for line in output {
                    tx.send(line.clone()).await.unwrap();
                }
                let (exit_tx, exit_rx) = oneshot::channel();
                exit_tx.send(Ok(*code)).unwrap();

                Ok(SpawnedProcess {
                    output: rx,
                    exit: ExitHandle::new(program, exit_rx),
                })
            }
        }
    }

    async fn write_file(&self, path: &str, contents: &str) -> Result<()> {
        self.writes
            .lock()
            .unwrap()
            .push((path.to_string(), contents.to_string()));
        Ok(())
    }
}

/// Config with short delays so tests run quickly.
pub fn fast_config() -> LabConfig {
    LabConfig::default()
        .with_check_delay(Duration::from_millis(10))
        .with_autosave_delay(Duration::from_millis(50))
}

pub fn controller_with(sandbox: Arc<RecordingSandbox>) -> LabController {
    LabController::new(sandbox, fast_config(), TerminalLog::new())
}
