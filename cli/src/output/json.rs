//! JSON output helpers.
//!
//! Provides the error-object formatter used by all `--json` code paths when
//! a command fails, and the launch-plan document printed by `tidb --dry-run`.

use anyhow::{Context, Result};

use crate::domain::{ComponentCommand, InstanceSpec};

/// Format a JSON error object.
///
/// Output (pretty-printed):
/// ```json
/// {
///   "error": true,
///   "message": "...",
///   "code": "..."
/// }
/// ```
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_error(message: &str, code: &str) -> Result<String> {
    let obj = serde_json::json!({
        "error": true,
        "message": message,
        "code": code,
    });
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}

/// Format the resolved instance and the command that would launch it.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_plan(spec: &InstanceSpec, command: &ComponentCommand) -> Result<String> {
    let obj = serde_json::json!({
        "component": command.component,
        "addr": spec.addr(),
        "log_file": spec.log_file(),
        "instance": spec,
        "command": command,
    });
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}
