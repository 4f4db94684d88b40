//! Lab progress: which step is selected and which steps are done.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Navigation and completion state for a lab with a fixed number of steps.
///
/// `current_step_index` is always inside `0..step_count` and
/// `completed_steps` only ever holds indices from that range. Deserializing
/// checks the same invariants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawProgress")]
pub struct LabProgress {
    step_count: usize,
    current_step_index: usize,
    completed_steps: BTreeSet<usize>,
}

/// Unchecked wire form of [`LabProgress`].
#[derive(Deserialize)]
struct RawProgress {
    step_count: usize,
    current_step_index: usize,
    completed_steps: BTreeSet<usize>,
}

impl TryFrom<RawProgress> for LabProgress {
    type Error = Error;

    fn try_from(raw: RawProgress) -> Result<Self> {
        if raw.step_count == 0 {
            return Err(Error::Config("a lab needs at least one step".to_string()));
        }
        let out_of_range = std::iter::once(raw.current_step_index)
            .chain(raw.completed_steps.iter().copied())
            .find(|&index| index >= raw.step_count);
        if let Some(index) = out_of_range {
            return Err(Error::StepOutOfRange {
                index,
                len: raw.step_count,
            });
        }

        Ok(Self {
            step_count: raw.step_count,
            current_step_index: raw.current_step_index,
            completed_steps: raw.completed_steps,
        })
    }
}

impl LabProgress {
    /// Starts at step 0 with nothing completed.
    ///
    /// # Panics
    ///
    /// Panics if `step_count` is zero.
    pub fn new(step_count: usize) -> Self {
        assert!(step_count > 0, "a lab needs at least one step");
        Self {
            step_count,
            current_step_index: 0,
            completed_steps: BTreeSet::new(),
        }
    }

    pub fn step_count(&self) -> usize {
        self.step_count
    }

    pub fn current_step_index(&self) -> usize {
        self.current_step_index
    }

    pub fn completed_steps(&self) -> &BTreeSet<usize> {
        &self.completed_steps
    }

    /// Selects step `index`. Completion is untouched.
    pub fn go_to_step(&mut self, index: usize) -> Result<()> {
        if index >= self.step_count {
            return Err(Error::StepOutOfRange {
                index,
                len: self.step_count,
            });
        }
        self.current_step_index = index;
        Ok(())
    }

    /// Moves forward one step. Returns false on the last step.
    pub fn next(&mut self) -> bool {
        if !self.can_go_next() {
            return false;
        }
        self.current_step_index += 1;
        true
    }

    /// Moves back one step. Returns false on the first step.
    pub fn prev(&mut self) -> bool {
        if !self.can_go_prev() {
            return false;
        }
        self.current_step_index -= 1;
        true
    }

    pub fn can_go_prev(&self) -> bool {
        self.current_step_index > 0
    }

    pub fn can_go_next(&self) -> bool {
        self.current_step_index + 1 < self.step_count
    }

    /// Records step `index` as completed. Returns false if it already was.
    pub fn mark_completed(&mut self, index: usize) -> Result<bool> {
        if index >= self.step_count {
            return Err(Error::StepOutOfRange {
                index,
                len: self.step_count,
            });
        }
        Ok(self.completed_steps.insert(index))
    }

    pub fn is_completed(&self, index: usize) -> bool {
        self.completed_steps.contains(&index)
    }

    /// Header progress bar fill: position of the selected step, in percent.
    pub fn progress_percent(&self) -> f64 {
        (self.current_step_index + 1) as f64 / self.step_count as f64 * 100.0
    }
}
