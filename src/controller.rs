//! The lab controller: single owner of all lab state.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::catalog::{Catalog, Step};
use crate::config::LabConfig;
use crate::debounce::Debouncer;
use crate::dispatch::{DispatchOutcome, Dispatcher};
use crate::editor::EditorState;
use crate::error::Result;
use crate::sandbox::{DirSandbox, SandboxRuntime};
use crate::state::LabProgress;
use crate::templates::TemplateBundle;
use crate::terminal::TerminalLog;
use crate::verify::{CoinFlip, ProgressCheck};
use crate::view::LabView;

/// Editor contents captured for saving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSnapshot {
    pub file: String,
    pub contents: String,
}

/// Drives the lab: navigation, progress checks, the editor and the terminal.
///
/// Front ends call into the controller and render [`LabController::view`];
/// they never keep lab state of their own.
pub struct LabController {
    catalog: Catalog,
    progress: LabProgress,
    editor: EditorState,
    terminal: TerminalLog,
    dispatcher: Dispatcher,
    sandbox: Arc<dyn SandboxRuntime>,
    check: Box<dyn ProgressCheck>,
    config: LabConfig,
    autosave: Debouncer<FileSnapshot>,
    settled: mpsc::UnboundedReceiver<FileSnapshot>,
    cancel: CancellationToken,
}

impl LabController {
    /// Creates a controller on step 0 of the standard catalog.
    ///
    /// Must be called within a tokio runtime.
    pub fn new(sandbox: Arc<dyn SandboxRuntime>, config: LabConfig, terminal: TerminalLog) -> Self {
        let catalog = Catalog::standard();
        let (autosave, settled) = Debouncer::new(config.autosave_delay());

        let mut controller = Self {
            progress: LabProgress::new(catalog.len()),
            catalog,
            editor: EditorState::new(),
            terminal,
            dispatcher: Dispatcher::new(Arc::clone(&sandbox), &config),
            sandbox,
            check: Box::new(CoinFlip),
            config,
            autosave,
            settled,
            cancel: CancellationToken::new(),
        };
        controller.reload_editor();
        controller
    }

    /// Creates a [`DirSandbox`], mounts the lab files and runs the configured
    /// setup command.
    pub async fn boot(config: LabConfig, terminal: TerminalLog) -> Result<Self> {
        let sandbox = DirSandbox::create(config.sandbox_dir.as_deref())?;
        let mut controller = Self::new(Arc::new(sandbox), config, terminal);
        controller.mount(&TemplateBundle::lab_files()).await?;
        controller.run_setup().await;
        Ok(controller)
    }

    /// Replaces the progress check.
    pub fn with_progress_check(mut self, check: Box<dyn ProgressCheck>) -> Self {
        self.check = check;
        self
    }

    /// Replaces the catalog, resetting progress to its first step.
    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.progress = LabProgress::new(catalog.len());
        self.catalog = catalog;
        self.reload_editor();
        self
    }

    /// Mounts `bundle` into the sandbox.
    pub async fn mount(&mut self, bundle: &TemplateBundle) -> Result<()> {
        self.sandbox.mount(bundle).await
    }

    /// Runs the configured setup command, streaming its output.
    ///
    /// Failures are reported in the terminal; setup never aborts the lab.
    pub async fn run_setup(&mut self) {
        let Some(command) = self.config.setup_command.clone() else {
            return;
        };
        let Some((program, args)) = command.split_first() else {
            return;
        };

        self.terminal.append("🚀 Setting up lab environment...");
        let result: Result<i32> = async {
            let mut process = self
                .sandbox
                .spawn(program, args, self.cancel.child_token())
                .await?;
            while let Some(chunk) = process.output.recv().await {
                self.terminal.append(chunk);
            }
            process.exit.wait().await
        }
        .await;

        match result {
            Ok(0) => {}
            Ok(code) => self
                .terminal
                .append(format!("❌ Command failed with exit code {}", code)),
            Err(e) => {
                tracing::warn!(error = %e, program = %program, "lab setup failed");
                self.terminal.append(format!("❌ Error: {}", e));
            }
        }
        self.terminal.append("✅ Environment setup complete!");
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn progress(&self) -> &LabProgress {
        &self.progress
    }

    pub fn editor(&self) -> &EditorState {
        &self.editor
    }

    pub fn terminal(&self) -> &TerminalLog {
        &self.terminal
    }

    pub fn sandbox(&self) -> &Arc<dyn SandboxRuntime> {
        &self.sandbox
    }

    pub fn current_step(&self) -> &'static Step {
        self.catalog
            .get(self.progress.current_step_index())
            .expect("progress index is always inside the catalog")
    }

    /// Token that cancels the shell command currently running.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Selects step `index` and opens its starter files.
    pub fn go_to_step(&mut self, index: usize) -> Result<()> {
        self.progress.go_to_step(index)?;
        self.reload_editor();
        Ok(())
    }

    /// Moves to the next step; a no-op on the last one.
    pub fn next(&mut self) -> bool {
        let moved = self.progress.next();
        if moved {
            self.reload_editor();
        }
        moved
    }

    /// Moves to the previous step; a no-op on the first one.
    pub fn prev(&mut self) -> bool {
        let moved = self.progress.prev();
        if moved {
            self.reload_editor();
        }
        moved
    }

    fn reload_editor(&mut self) {
        let step = self.current_step();
        tracing::debug!(step = self.progress.current_step_index(), id = step.id, "loading step");
        self.editor.load_step(step);
    }

    /// Asks the progress check about the selected step after the configured
    /// delay, marking it completed when the check passes.
    pub async fn check_progress(&mut self) -> Result<bool> {
        let index = self.progress.current_step_index();
        let step = self.current_step();
        self.terminal
            .append(format!("🔍 Checking progress for: {}", step.title));

        tokio::time::sleep(self.config.check_delay()).await;

        let passed = self.check.check(index, step).await;
        if passed {
            self.terminal.append("✅ Step completed successfully!");
            self.progress.mark_completed(index)?;
            tracing::info!(step = index, id = step.id, "step completed");
        } else {
            self.terminal
                .append("⚠️ Some tasks are still incomplete. Keep working!");
        }
        Ok(passed)
    }

    /// Dispatches a terminal line.
    ///
    /// A token cancelled during the command is replaced afterwards, so
    /// [`LabController::cancel_token`] always targets the next command.
    pub async fn run_command(&mut self, line: &str) -> DispatchOutcome {
        self.renew_cancel_token();
        let outcome = self
            .dispatcher
            .dispatch(line, &mut self.terminal, &self.cancel)
            .await;
        self.renew_cancel_token();
        outcome
    }

    fn renew_cancel_token(&mut self) {
        if self.cancel.is_cancelled() {
            self.cancel = CancellationToken::new();
        }
    }

    /// Activates an editor tab.
    pub fn switch_tab(&mut self, file: &str) -> Result<()> {
        self.editor.switch_tab(file)
    }

    /// Replaces the editor buffer and schedules an autosave.
    pub fn edit(&mut self, text: impl Into<String>) {
        self.editor.set_buffer(text);
        if let Some(snapshot) = self.snapshot() {
            self.autosave.push(snapshot);
        }
    }

    fn snapshot(&self) -> Option<FileSnapshot> {
        self.editor.active_file().map(|file| FileSnapshot {
            file: file.to_string(),
            contents: self.editor.buffer().to_string(),
        })
    }

    /// Saves the editor buffer right away.
    pub async fn save(&mut self) {
        match self.snapshot() {
            Some(snapshot) => self.save_snapshot(snapshot).await,
            None => self.terminal.append("❌ Error: no file is open"),
        }
    }

    /// Waits for the next settled edit burst without saving it.
    ///
    /// Cancel safe, so front ends can `select!` on it.
    pub async fn next_settled_edit(&mut self) -> Option<FileSnapshot> {
        self.settled.recv().await
    }

    /// Waits until an edit burst settles, then saves it.
    ///
    /// Returns `None` if the autosave task has stopped.
    pub async fn autosave(&mut self) -> Option<FileSnapshot> {
        let snapshot = self.next_settled_edit().await?;
        self.save_snapshot(snapshot.clone()).await;
        Some(snapshot)
    }

    /// Writes `snapshot` to `/<file>` in the sandbox.
    pub async fn save_snapshot(&mut self, snapshot: FileSnapshot) {
        let path = format!("/{}", snapshot.file);
        match self.sandbox.write_file(&path, &snapshot.contents).await {
            Ok(()) => {
                tracing::debug!(path = %path, bytes = snapshot.contents.len(), "saved editor buffer");
                self.terminal.append(format!("💾 Saved {}", snapshot.file));
            }
            Err(e) => {
                tracing::warn!(error = %e, path = %path, "failed to save editor buffer");
                self.terminal.append(format!("❌ Error: {}", e));
            }
        }
    }

    pub fn clear_terminal(&mut self) {
        self.terminal.clear();
    }

    /// Current state as a renderable view.
    pub fn view(&self) -> LabView {
        LabView::project(&self.catalog, &self.progress, &self.editor, &self.terminal)
    }
}
