//! Optional project configuration (SPEC_FULL §2 "Configuration").
//!
//! `loxt.toml` carries non-semantic REPL/logging preferences only — no
//! config key changes language semantics. Precedence: CLI flag >
//! `$PWD/loxt.toml` > built-in default.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{LoxtError, Result};

pub const CONFIG_FILE_NAME: &str = "loxt.toml";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Prompt string printed before each REPL read.
    #[serde(default = "default_prompt")]
    pub prompt: String,

    /// When true, a bare expression statement typed at the REPL has its
    /// value printed automatically, as a convenience layered over the
    /// ordinary parse (the grammar still requires the trailing `;`).
    #[serde(default)]
    pub echo_expr_results: bool,

    /// Bumps `loxt`'s own log verbosity; independent of interpreter output.
    #[serde(default)]
    pub trace: bool,
}

fn default_prompt() -> String {
    ">> ".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self { prompt: default_prompt(), echo_expr_results: false, trace: false }
    }
}

impl Config {
    /// Looks for `loxt.toml` in the current directory only, falling back
    /// to the built-in default (§2: the CLI runs per-invocation, not as a
    /// long-lived project tool, so there is no home/system search path).
    pub fn load() -> Result<Self> {
        let path = PathBuf::from(CONFIG_FILE_NAME);
        if path.exists() {
            Self::load_from_path(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| LoxtError::Config(format!("failed to parse {}: {e}", path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_has_standard_prompt_and_no_echo() {
        let config = Config::default();
        assert_eq!(config.prompt, ">> ");
        assert!(!config.echo_expr_results);
        assert!(!config.trace);
    }

    #[test]
    fn loads_overrides_from_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("loxt.toml");
        std::fs::write(&path, "echo_expr_results = true\nprompt = \"lox> \"\n").unwrap();

        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.prompt, "lox> ");
        assert!(config.echo_expr_results);
    }

    #[test]
    fn missing_config_file_is_an_error_when_path_is_explicit() {
        let result = Config::load_from_path(Path::new("/nonexistent/loxt.toml"));
        assert!(result.is_err());
    }
}
