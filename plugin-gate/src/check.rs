//! The `check` command: apply the signature policy to an inventory.

use crate::config::Config;
use crate::inventory::Inventory;
use crate::report::Report;
use anyhow::Result;
use plugin_signature::{DenyUnsigned, SignatureValidator};
use tracing::{info, warn};

/// Options for one check run.
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckOptions {
    /// Refuse every unsigned plugin, ignoring development mode and the
    /// allow-list.
    pub strict: bool,
}

/// Build the validator described by `config`.
pub fn build_validator(config: &Config, options: CheckOptions) -> SignatureValidator {
    let validator = SignatureValidator::new(config.settings(), config.plugins.require_signed);
    if options.strict {
        validator.with_unsigned_policy(DenyUnsigned)
    } else {
        validator
    }
}

/// Validate every plugin of the inventory, parents first.
pub fn check(config: &Config, inventory: Inventory, options: CheckOptions) -> Result<Report> {
    let mut plugins = inventory.into_plugin_set()?;
    let mut validator = build_validator(config, options);

    info!(
        plugins = plugins.len(),
        app_mode = %config.app_mode,
        require_signed = config.plugins.require_signed,
        strict = options.strict,
        "Validating plugin signatures"
    );

    let verdicts = validator.validate_all(&mut plugins);
    for verdict in &verdicts {
        if let Err(err) = &verdict.result {
            warn!(plugin = %verdict.plugin_id, code = %err.code(), "{}", err);
        }
    }

    let report = Report::new(&verdicts, validator.into_diagnostics());
    info!(
        admitted = report.admitted_count(),
        rejected = report.rejected_count(),
        "Validation complete"
    );
    Ok(report)
}
