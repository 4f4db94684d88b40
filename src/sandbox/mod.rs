//! Sandbox module for the lab's isolated execution environment.
//!
//! This module provides the [`SandboxRuntime`] trait the lab runs commands
//! and saves files through, and the [`DirSandbox`] implementation backed by
//! an ephemeral host directory.

mod directory;
mod provider;

pub use directory::DirSandbox;
pub use provider::{resolve_path, ExitHandle, SandboxRuntime, SpawnedProcess};
