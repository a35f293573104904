//! Script execution boundary.
//!
//! Every effect the bridge has on the outside world funnels through
//! [`ScriptExecutor::run`]. Keeping the boundary to one trait method means
//! tests can substitute a fake executor and exercise the full stack above
//! it without a macro engine installed.

use std::process::Command;

use crate::error::{BridgeError, Result};
use crate::scripts::ControlScript;

/// Executes rendered control scripts and returns their output.
pub trait ScriptExecutor {
    /// Run a script to completion, returning trimmed stdout on success.
    fn run(&self, script: &dyn ControlScript) -> Result<String>;
}

/// Runs scripts through the system AppleScript interpreter.
#[derive(Debug, Clone)]
pub struct Osascript {
    program: String,
}

impl Osascript {
    /// Use a specific interpreter binary instead of `osascript` from PATH.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for Osascript {
    fn default() -> Self {
        Self::new("osascript")
    }
}

impl ScriptExecutor for Osascript {
    fn run(&self, script: &dyn ControlScript) -> Result<String> {
        let source = script.render();
        tracing::debug!(
            op = script.operation(),
            bytes = source.len(),
            "running control script"
        );

        // The whole program goes through one -e argument; osascript accepts
        // embedded newlines there.
        let output = Command::new(&self.program)
            .arg("-e")
            .arg(&source)
            .output()
            .map_err(|e| {
                BridgeError::execution(
                    script.operation(),
                    format!("could not launch {}: {e}", self.program),
                )
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            // osascript reports script errors on stderr; fall back to stdout,
            // then to the bare exit status.
            let diagnostic = if !stderr.is_empty() {
                stderr
            } else if !stdout.is_empty() {
                stdout
            } else {
                "no diagnostic output".to_string()
            };
            let code = output
                .status
                .code()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "signal".to_string());
            tracing::warn!(op = script.operation(), code, "control script failed");
            return Err(BridgeError::execution(
                script.operation(),
                format!("{diagnostic} (exit {code})"),
            ));
        }

        Ok(stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scripts::ReloadEngine;

    #[test]
    fn test_launch_failure_names_the_program() {
        let runner = Osascript::new("/nonexistent/osascript");
        let err = runner.run(&ReloadEngine).unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("reload failed:"), "{message}");
        assert!(message.contains("/nonexistent/osascript"));
    }

    #[test]
    fn test_nonzero_exit_becomes_execution_error() {
        // `false` ignores its arguments and exits 1 with no output.
        let runner = Osascript::new("false");
        let err = runner.run(&ReloadEngine).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("exit 1"), "{message}");
        assert!(message.contains("no diagnostic output"), "{message}");
    }

    #[test]
    fn test_stdout_is_trimmed() {
        // `echo` stands in for the interpreter and parrots the source back.
        let runner = Osascript::new("echo");
        let out = runner.run(&ReloadEngine).unwrap();
        assert!(out.contains("reload"));
        assert!(!out.ends_with('\n'));
    }
}
