//! DevOps Lab - an interactive microservice deployment tutorial
//!
//! This library provides a guided, step-based lab: a catalog of steps with
//! starter files, an editor that saves into a sandboxed working directory,
//! and a terminal where `kubectl`, `docker`, `helm` and `git` are simulated
//! while every other command runs in the sandbox shell.

pub mod catalog;
pub mod config;
pub mod controller;
pub mod debounce;
pub mod dispatch;
pub mod editor;
pub mod error;
pub mod sandbox;
pub mod state;
pub mod templates;
pub mod terminal;
pub mod verify;
pub mod view;

pub use error::{Error, Result};

pub use catalog::{Catalog, StarterFile, Step};
pub use config::{LabConfig, Validate, ValidationResult};
pub use controller::{FileSnapshot, LabController};
pub use debounce::Debouncer;
pub use dispatch::{Command, DispatchOutcome, Dispatcher, Tool};
pub use editor::EditorState;
pub use sandbox::{DirSandbox, ExitHandle, SandboxRuntime, SpawnedProcess};
pub use state::LabProgress;
pub use templates::TemplateBundle;
pub use terminal::TerminalLog;
pub use verify::{CoinFlip, FixedOutcome, ProgressCheck};
pub use view::{render_text, LabView};
