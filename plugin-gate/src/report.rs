//! Rendering validation results.

use anyhow::Result;
use plugin_signature::{Diagnostic, ErrorCode, SignatureState, Verdict};
use serde::Serialize;
use std::fmt::Write;

/// Whether a plugin may be activated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Admitted,
    Rejected,
}

/// Result for one plugin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PluginReport {
    pub id: String,
    /// Signature state after inheritance.
    pub signature: SignatureState,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<&Verdict> for PluginReport {
    fn from(verdict: &Verdict) -> Self {
        let (status, error, message) = match &verdict.result {
            Ok(()) => (Status::Admitted, None, None),
            Err(err) => (Status::Rejected, Some(err.code()), Some(err.to_string())),
        };

        Self {
            id: verdict.plugin_id.clone(),
            signature: verdict.signature,
            status,
            error,
            message,
        }
    }
}

/// Results for a whole inventory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub plugins: Vec<PluginReport>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Report {
    pub fn new(verdicts: &[Verdict], diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            plugins: verdicts.iter().map(PluginReport::from).collect(),
            diagnostics,
        }
    }

    pub fn admitted_count(&self) -> usize {
        self.plugins
            .iter()
            .filter(|p| p.status == Status::Admitted)
            .count()
    }

    pub fn rejected_count(&self) -> usize {
        self.plugins.len() - self.admitted_count()
    }

    pub fn has_rejections(&self) -> bool {
        self.rejected_count() > 0
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Human-readable listing, one plugin per line.
    pub fn render_text(&self) -> String {
        // Padding counts chars, so the width must too.
        let width = self
            .plugins
            .iter()
            .map(|p| p.id.chars().count())
            .max()
            .unwrap_or(0);
        let mut out = String::new();

        for plugin in &self.plugins {
            let outcome = match plugin.error {
                Some(code) => format!("rejected: {}", code),
                None => "admitted".to_string(),
            };
            let _ = writeln!(
                out,
                "{:<width$}  {:<9}  {}",
                plugin.id,
                plugin.signature.as_str(),
                outcome,
                width = width
            );
        }

        if !self.diagnostics.is_empty() {
            out.push('\n');
            for diagnostic in &self.diagnostics {
                let _ = writeln!(out, "{:?}: {}", diagnostic.severity, diagnostic);
            }
        }

        let _ = writeln!(
            out,
            "\n{} plugin(s): {} admitted, {} rejected",
            self.plugins.len(),
            self.admitted_count(),
            self.rejected_count()
        );
        out
    }
}
