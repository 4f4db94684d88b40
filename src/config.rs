//! Lab configuration and its validation.
//!
//! Every field has a default, so an empty TOML document is a valid config.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Environment variable naming a config file for the CLI.
pub const CONFIG_ENV: &str = "DEVOPS_LAB_CONFIG";

/// Configuration for a lab session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabConfig {
    /// Prompt echoed in front of every command.
    #[serde(default = "default_prompt")]
    pub prompt: String,

    /// Shell used for commands that are not simulated (`<shell> -c <line>`).
    #[serde(default = "default_shell")]
    pub shell: String,

    /// Artificial delay before a progress check resolves, in milliseconds.
    #[serde(default = "default_check_delay_ms")]
    pub check_delay_ms: u64,

    /// Quiet period before an edited buffer is auto-saved, in milliseconds.
    #[serde(default = "default_autosave_delay_ms")]
    pub autosave_delay_ms: u64,

    /// Kill shell commands that run longer than this. Unlimited when unset.
    #[serde(default)]
    pub command_timeout_secs: Option<u64>,

    /// Directory that holds sandbox roots. Uses the system temp dir when unset.
    #[serde(default)]
    pub sandbox_dir: Option<PathBuf>,

    /// Command run once after the bundle is mounted, e.g. `["npm", "install"]`.
    #[serde(default)]
    pub setup_command: Option<Vec<String>>,
}

fn default_prompt() -> String {
    "devops@lab:~/microservice$ ".to_string()
}

fn default_shell() -> String {
    "sh".to_string()
}

fn default_check_delay_ms() -> u64 {
    1000
}

fn default_autosave_delay_ms() -> u64 {
    1000
}

impl Default for LabConfig {
    fn default() -> Self {
        Self {
            prompt: default_prompt(),
            shell: default_shell(),
            check_delay_ms: default_check_delay_ms(),
            autosave_delay_ms: default_autosave_delay_ms(),
            command_timeout_secs: None,
            sandbox_dir: None,
            setup_command: None,
        }
    }
}

impl LabConfig {
    /// Parses a config from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::Config(format!("invalid lab config: {}", e)))
    }

    /// Loads and validates a config file. Warnings are logged.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml_str(&text)?;

        for warning in config.validate().into_result()? {
            tracing::warn!(path = %path.display(), "{}", warning);
        }

        Ok(config)
    }

    pub fn check_delay(&self) -> Duration {
        Duration::from_millis(self.check_delay_ms)
    }

    pub fn autosave_delay(&self) -> Duration {
        Duration::from_millis(self.autosave_delay_ms)
    }

    pub fn command_timeout(&self) -> Option<Duration> {
        self.command_timeout_secs.map(Duration::from_secs)
    }

    /// Sets the progress check delay.
    pub fn with_check_delay(mut self, delay: Duration) -> Self {
        self.check_delay_ms = delay.as_millis() as u64;
        self
    }

    /// Sets the autosave quiet period.
    pub fn with_autosave_delay(mut self, delay: Duration) -> Self {
        self.autosave_delay_ms = delay.as_millis() as u64;
        self
    }

    /// Sets the sandbox base directory.
    pub fn with_sandbox_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.sandbox_dir = Some(dir.into());
        self
    }
}

/// Validation result containing all found issues.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    /// List of validation errors (fatal).
    pub errors: Vec<String>,
    /// List of validation warnings (non-fatal).
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// Returns true if validation passed (no errors).
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    pub fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    /// Converts to a Result, failing if there are errors.
    pub fn into_result(self) -> Result<Vec<String>> {
        if self.is_valid() {
            Ok(self.warnings)
        } else {
            Err(Error::Config(self.errors.join("; ")))
        }
    }
}

/// Trait for validatable configuration types.
pub trait Validate {
    /// Validates the configuration and returns any issues found.
    fn validate(&self) -> ValidationResult;
}

impl Validate for LabConfig {
    fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        if self.shell.trim().is_empty() {
            result.add_error("shell cannot be empty");
        }

        if let Some(command) = &self.setup_command {
            if command.first().map_or(true, |program| program.trim().is_empty()) {
                result.add_error("setup_command must name a program");
            }
        }

        if self.command_timeout_secs == Some(0) {
            result.add_error("command_timeout_secs must be at least 1");
        }

        if self.autosave_delay_ms == 0 {
            result.add_warning("autosave_delay_ms = 0 saves on every edit");
        }

        if self.check_delay_ms > 10_000 {
            result.add_warning("check_delay_ms over 10 seconds makes progress checks sluggish");
        }

        result
    }
}
