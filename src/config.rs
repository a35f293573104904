//! Bridge configuration.
//!
//! Defaults cover a stock Keyboard Maestro install; a JSON config file and
//! `MAESTRO_MCP_*` environment variables override individual fields, in
//! that order. MCP clients usually configure servers through environment
//! blocks, so the env layer wins.

use std::env;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{BridgeError, Result};
use crate::types::LogKind;

pub const ENGINE_LOG_ENV: &str = "MAESTRO_MCP_ENGINE_LOG";
pub const EDITOR_LOG_ENV: &str = "MAESTRO_MCP_EDITOR_LOG";
pub const SCRATCH_DIR_ENV: &str = "MAESTRO_MCP_SCRATCH_DIR";
pub const OSASCRIPT_ENV: &str = "MAESTRO_MCP_OSASCRIPT";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BridgeConfig {
    /// Engine log, the one that records macro execution and failures.
    pub engine_log: PathBuf,
    /// Editor log, which records structural edits and reloads.
    pub editor_log: PathBuf,
    /// Directory for staged payload files.
    pub scratch_dir: PathBuf,
    /// AppleScript interpreter binary.
    pub osascript: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        let home = env::var_os("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        let logs = home.join("Library/Logs/Keyboard Maestro");
        Self {
            engine_log: logs.join("Engine.log"),
            editor_log: logs.join("Editor.log"),
            scratch_dir: env::temp_dir(),
            osascript: "osascript".to_string(),
        }
    }
}

impl BridgeConfig {
    /// Resolve the effective config: defaults, then the optional file,
    /// then environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load_from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|name| env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON config file. Missing fields keep their defaults.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&text)?;
        Ok(config)
    }

    fn apply_overrides(&mut self, get: impl Fn(&str) -> Option<String>) {
        if let Some(value) = get(ENGINE_LOG_ENV) {
            self.engine_log = PathBuf::from(value);
        }
        if let Some(value) = get(EDITOR_LOG_ENV) {
            self.editor_log = PathBuf::from(value);
        }
        if let Some(value) = get(SCRATCH_DIR_ENV) {
            self.scratch_dir = PathBuf::from(value);
        }
        if let Some(value) = get(OSASCRIPT_ENV) {
            self.osascript = value;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.osascript.trim().is_empty() {
            return Err(BridgeError::validation("osascript binary must not be empty"));
        }
        for (name, path) in [
            ("engine_log", &self.engine_log),
            ("editor_log", &self.editor_log),
            ("scratch_dir", &self.scratch_dir),
        ] {
            if path.as_os_str().is_empty() {
                return Err(BridgeError::validation(format!("{name} must not be empty")));
            }
        }
        Ok(())
    }

    pub fn log_path(&self, kind: LogKind) -> &Path {
        match kind {
            LogKind::Engine => &self.engine_log,
            LogKind::Editor => &self.editor_log,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_point_at_stock_install() {
        let config = BridgeConfig::default();
        assert!(config
            .engine_log
            .to_string_lossy()
            .ends_with("Library/Logs/Keyboard Maestro/Engine.log"));
        assert!(config
            .editor_log
            .to_string_lossy()
            .ends_with("Library/Logs/Keyboard Maestro/Editor.log"));
        assert_eq!(config.osascript, "osascript");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bridge.json");
        std::fs::write(&path, r#"{"engine_log": "/var/log/km/Engine.log"}"#).unwrap();

        let config = BridgeConfig::load_from_file(&path).unwrap();
        assert_eq!(config.engine_log, PathBuf::from("/var/log/km/Engine.log"));
        assert_eq!(config.osascript, "osascript");
    }

    #[test]
    fn test_malformed_file_is_a_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bridge.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            BridgeConfig::load_from_file(&path),
            Err(BridgeError::Json(_))
        ));
    }

    #[test]
    fn test_overrides_win_over_file_values() {
        let mut config = BridgeConfig::default();
        config.apply_overrides(|name| match name {
            OSASCRIPT_ENV => Some("/usr/local/bin/osascript".to_string()),
            SCRATCH_DIR_ENV => Some("/tmp/bridge".to_string()),
            _ => None,
        });
        assert_eq!(config.osascript, "/usr/local/bin/osascript");
        assert_eq!(config.scratch_dir, PathBuf::from("/tmp/bridge"));
        // Untouched fields keep their defaults.
        assert!(config.engine_log.to_string_lossy().ends_with("Engine.log"));
    }

    #[test]
    fn test_validate_rejects_blank_interpreter() {
        let config = BridgeConfig {
            osascript: "  ".to_string(),
            ..BridgeConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(BridgeError::Validation(_))
        ));
    }

    #[test]
    fn test_log_path_selects_by_kind() {
        let config = BridgeConfig::default();
        assert_eq!(config.log_path(LogKind::Engine), config.engine_log);
        assert_eq!(config.log_path(LogKind::Editor), config.editor_log);
    }
}
