//! Plain-text diagnostics accumulated by a validator.

use serde::Serialize;
use std::fmt;

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// An unsigned plugin was allowed to run.
    Warning,
    /// A plugin was rejected.
    Error,
}

/// One diagnostic entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub plugin_id: String,
    pub severity: Severity,
    pub message: String,
}

impl Diagnostic {
    pub fn warning(plugin_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            plugin_id: plugin_id.into(),
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    pub fn error(plugin_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            plugin_id: plugin_id.into(),
            severity: Severity::Error,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
