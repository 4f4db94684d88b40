//! The lab's terminal output log.

use tokio::sync::mpsc;

/// Append-only terminal output.
///
/// Lines are only removed by [`TerminalLog::clear`]. An optional tap mirrors
/// each appended line to a front end as it arrives.
#[derive(Debug, Default)]
pub struct TerminalLog {
    lines: Vec<String>,
    tap: Option<mpsc::UnboundedSender<String>>,
}

impl TerminalLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a log that also forwards every appended line to `tap`.
    pub fn with_tap(tap: mpsc::UnboundedSender<String>) -> Self {
        Self {
            lines: Vec::new(),
            tap: Some(tap),
        }
    }

    pub fn append(&mut self, line: impl Into<String>) {
        let line = line.into();
        if let Some(tap) = &self.tap {
            if tap.send(line.clone()).is_err() {
                // Front end is gone; keep logging locally.
                self.tap = None;
            }
        }
        self.lines.push(line);
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn last(&self) -> Option<&str> {
        self.lines.last().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}
