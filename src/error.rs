//! Error types for the DevOps lab.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for lab operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to create a sandbox.
    #[error("failed to create sandbox: {0}")]
    SandboxCreation(String),

    /// Failed to clean up a sandbox.
    #[error("failed to clean up sandbox at {path}: {reason}")]
    SandboxCleanup { path: PathBuf, reason: String },

    /// Failed to start or wait on a sandboxed process.
    #[error("failed to run `{program}`: {reason}")]
    Spawn { program: String, reason: String },

    /// IO error during sandbox operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The path would resolve outside the sandbox root.
    #[error("invalid sandbox path: {0}")]
    InvalidPath(PathBuf),

    /// Lab configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Step index outside the catalog.
    #[error("step {index} is out of range (lab has {len} steps)")]
    StepOutOfRange { index: usize, len: usize },

    /// Editor tab that the current step does not own.
    #[error("unknown file tab: {0}")]
    UnknownFile(String),

    /// A sandboxed process was cancelled before it exited.
    #[error("process cancelled")]
    Cancelled,

    /// A sandboxed process ran past its time limit.
    #[error("process timed out after {0} seconds")]
    TimedOut(u64),
}

/// Result type alias for lab operations.
pub type Result<T> = std::result::Result<T, Error>;
