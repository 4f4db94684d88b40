//! Editor buffer and file tabs.

use crate::catalog::Step;
use crate::error::{Error, Result};

/// Text shown when switching to a tab whose contents are not loaded.
pub fn placeholder_for(file: &str) -> String {
    format!("// {}\n// File content will be loaded here...", file)
}

/// The code editor: open tabs, the active one, and the buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditorState {
    tabs: Vec<String>,
    active_file: Option<String>,
    buffer: String,
}

impl EditorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens the step's starter files and loads the first into the buffer.
    pub fn load_step(&mut self, step: &Step) {
        self.tabs = step
            .starter_files
            .iter()
            .map(|file| file.name.to_string())
            .collect();

        match step.first_file() {
            Some(file) => {
                self.active_file = Some(file.name.to_string());
                self.buffer = file.contents.to_string();
            }
            None => {
                self.active_file = None;
                self.buffer.clear();
            }
        }
    }

    /// Activates tab `file`, replacing the buffer with a placeholder.
    ///
    /// Unsaved edits in the previous tab are discarded.
    pub fn switch_tab(&mut self, file: &str) -> Result<()> {
        if !self.tabs.iter().any(|tab| tab == file) {
            return Err(Error::UnknownFile(file.to_string()));
        }
        self.active_file = Some(file.to_string());
        self.buffer = placeholder_for(file);
        Ok(())
    }

    pub fn set_buffer(&mut self, text: impl Into<String>) {
        self.buffer = text.into();
    }

    pub fn tabs(&self) -> &[String] {
        &self.tabs
    }

    pub fn active_file(&self) -> Option<&str> {
        self.active_file.as_deref()
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }
}
