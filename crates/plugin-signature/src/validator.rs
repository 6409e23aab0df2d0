//! The signature policy gate.
//!
//! [`SignatureValidator::validate`] decides, for one plugin, whether it may be
//! activated. The checks run in a fixed order:
//!
//! 1. A valid signature admits immediately.
//! 2. A nested plugin adopts its parent's signature state, unless it is a
//!    core plugin or already `internal`. Inheriting a valid state admits.
//! 3. Front-end plugins, and every plugin when signing is not required, are
//!    admitted.
//! 4. The remaining state decides: unsigned plugins go through the unsigned
//!    policy, invalid and modified ones are rejected.

use crate::diagnostics::Diagnostic;
use crate::error::{ErrorCode, PluginError};
use crate::plugin::{Plugin, PluginKey, PluginSet};
use crate::policy::{CustomPolicy, UnsignedPolicy};
use crate::settings::PluginSettings;
use crate::signature::SignatureState;
use tracing::{debug, warn};

/// Outcome of validating one plugin of a [`PluginSet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub key: PluginKey,
    pub plugin_id: String,
    /// Signature state after inheritance.
    pub signature: SignatureState,
    pub result: Result<(), PluginError>,
}

impl Verdict {
    pub fn is_admitted(&self) -> bool {
        self.result.is_ok()
    }
}

/// Policy evaluator for one enforcement session.
///
/// Configuration is fixed at construction. Diagnostics accumulate across
/// calls and are never cleared.
#[derive(Debug)]
pub struct SignatureValidator {
    settings: PluginSettings,
    require_signed: bool,
    unsigned_policy: Option<CustomPolicy>,
    diagnostics: Vec<Diagnostic>,
}

impl SignatureValidator {
    pub fn new(settings: PluginSettings, require_signed: bool) -> Self {
        Self {
            settings,
            require_signed,
            unsigned_policy: None,
            diagnostics: Vec::new(),
        }
    }

    /// Install a policy that replaces the environment and allow-list checks
    /// for unsigned plugins.
    pub fn with_unsigned_policy(mut self, policy: impl UnsignedPolicy + 'static) -> Self {
        self.unsigned_policy = Some(CustomPolicy(Box::new(policy)));
        self
    }

    pub fn settings(&self) -> &PluginSettings {
        &self.settings
    }

    pub fn require_signed(&self) -> bool {
        self.require_signed
    }

    /// Validate the plugin at `key`, inheriting from its parent if nested.
    ///
    /// Returns `None` if the key does not belong to `plugins`.
    pub fn validate(
        &mut self,
        plugins: &mut PluginSet,
        key: PluginKey,
    ) -> Option<Result<(), PluginError>> {
        let (plugin, parent) = plugins.resolve(key)?;
        Some(self.validate_plugin(plugin, parent))
    }

    /// Validate a plugin record against the policy.
    ///
    /// `parent` is the enclosing plugin for nested plugins and `None` for
    /// roots. The plugin's signature is overwritten with the parent's when
    /// inheritance applies.
    ///
    /// # Panics
    ///
    /// Panics if a valid signature survives to the final dispatch, which the
    /// earlier checks rule out.
    pub fn validate_plugin(
        &mut self,
        plugin: &mut Plugin,
        parent: Option<&Plugin>,
    ) -> Result<(), PluginError> {
        if plugin.signature.is_valid() {
            debug!(plugin = %plugin.id, "Plugin has valid signature");
            return Ok(());
        }

        match parent {
            Some(_) if plugin.core || plugin.signature == SignatureState::Internal => {
                debug!(
                    plugin = %plugin.id,
                    signature = %plugin.signature,
                    core = plugin.core,
                    "Not inheriting root signature for core or internal plugin"
                );
            }
            Some(parent) => {
                debug!(
                    plugin = %plugin.id,
                    root = %parent.id,
                    signature = %plugin.signature,
                    root_signature = %parent.signature,
                    "Inheriting signature from root plugin"
                );
                plugin.signature = parent.signature;
                if plugin.signature.is_valid() {
                    debug!(plugin = %plugin.id, "Plugin has valid signature (inherited from root)");
                    return Ok(());
                }
            }
            None => {
                debug!(
                    plugin = %plugin.id,
                    dir = %plugin.dir.display(),
                    signature = %plugin.signature,
                    "Plugin signature is not valid"
                );
            }
        }

        // Only backend plugins run code in the host, so only they are enforced.
        if !plugin.backend || !self.require_signed {
            return Ok(());
        }

        let code = match plugin.signature {
            SignatureState::Unsigned => {
                if self.allow_unsigned(plugin) {
                    warn!(
                        plugin = %plugin.id,
                        dir = %plugin.dir.display(),
                        "Running an unsigned backend plugin"
                    );
                    self.diagnostics.push(Diagnostic::warning(
                        plugin.id.as_str(),
                        format!("running unsigned backend plugin {:?}", plugin.id),
                    ));
                    return Ok(());
                }
                ErrorCode::SignatureMissing
            }
            SignatureState::Invalid => ErrorCode::SignatureInvalid,
            SignatureState::Modified => ErrorCode::SignatureModified,
            SignatureState::Internal => {
                debug!(plugin = %plugin.id, "Admitting internal plugin");
                return Ok(());
            }
            SignatureState::Valid => unreachable!(
                "plugin {:?} reached signature dispatch with a valid signature",
                plugin.id
            ),
        };

        let err = PluginError::new(code, plugin.id.as_str());
        debug!(plugin = %plugin.id, code = %code, "Rejecting plugin");
        self.diagnostics
            .push(Diagnostic::error(plugin.id.as_str(), err.to_string()));
        Err(err)
    }

    /// Validate every plugin of the set in dependency order.
    pub fn validate_all(&mut self, plugins: &mut PluginSet) -> Vec<Verdict> {
        let keys: Vec<PluginKey> = plugins.keys().collect();
        let mut verdicts = Vec::with_capacity(keys.len());

        for key in keys {
            let Some((plugin, parent)) = plugins.resolve(key) else {
                continue;
            };
            let result = self.validate_plugin(plugin, parent);
            verdicts.push(Verdict {
                key,
                plugin_id: plugin.id.clone(),
                signature: plugin.signature,
                result,
            });
        }

        verdicts
    }

    /// Whether an unsigned plugin may run anyway.
    pub fn allow_unsigned(&self, plugin: &Plugin) -> bool {
        if let Some(policy) = &self.unsigned_policy {
            return policy.0.allow_unsigned(plugin);
        }

        if self.settings.environment.is_development() {
            return true;
        }

        self.settings.is_allowed_unsigned(&plugin.id)
    }

    /// Every diagnostic recorded so far, in call order.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Rejection diagnostics only.
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    /// Append the diagnostics of a validator used for a separate pass.
    pub fn merge(&mut self, other: SignatureValidator) {
        self.diagnostics.extend(other.diagnostics);
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}
