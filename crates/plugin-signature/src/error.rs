//! Error types for signature validation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Reason a plugin was refused activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorCode {
    /// No signature, and no relaxation covers the plugin.
    SignatureMissing,

    /// Signature verification failed outright.
    SignatureInvalid,

    /// Signature is well-formed but the content no longer matches it.
    SignatureModified,
}

impl ErrorCode {
    /// Wire form of the code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::SignatureMissing => "signatureMissing",
            ErrorCode::SignatureInvalid => "signatureInvalid",
            ErrorCode::SignatureModified => "signatureModified",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ErrorCode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "signatureMissing" => Ok(ErrorCode::SignatureMissing),
            "signatureInvalid" => Ok(ErrorCode::SignatureInvalid),
            "signatureModified" => Ok(ErrorCode::SignatureModified),
            other => Err(ParseError::ErrorCode(other.to_string())),
        }
    }
}

/// A plugin rejected by the signature policy.
///
/// Terminal for the plugin, never for the host: other plugins are still
/// validated independently.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PluginError {
    #[error("plugin {0:?} is unsigned")]
    SignatureMissing(String),

    #[error("plugin {0:?} has an invalid signature")]
    SignatureInvalid(String),

    #[error("plugin {0:?}'s signature has been modified")]
    SignatureModified(String),
}

impl PluginError {
    /// Build the rejection for `code` against the given plugin.
    pub fn new(code: ErrorCode, plugin_id: impl Into<String>) -> Self {
        let plugin_id = plugin_id.into();
        match code {
            ErrorCode::SignatureMissing => PluginError::SignatureMissing(plugin_id),
            ErrorCode::SignatureInvalid => PluginError::SignatureInvalid(plugin_id),
            ErrorCode::SignatureModified => PluginError::SignatureModified(plugin_id),
        }
    }

    /// The rejection kind.
    pub fn code(&self) -> ErrorCode {
        match self {
            PluginError::SignatureMissing(_) => ErrorCode::SignatureMissing,
            PluginError::SignatureInvalid(_) => ErrorCode::SignatureInvalid,
            PluginError::SignatureModified(_) => ErrorCode::SignatureModified,
        }
    }

    /// Identifier of the rejected plugin.
    pub fn plugin_id(&self) -> &str {
        match self {
            PluginError::SignatureMissing(id)
            | PluginError::SignatureInvalid(id)
            | PluginError::SignatureModified(id) => id,
        }
    }
}

/// Errors raised while building a [`PluginSet`](crate::PluginSet).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A plugin with this identifier is already registered.
    #[error("Plugin already registered: {0}")]
    DuplicatePlugin(String),

    /// The parent key was not issued by this set.
    #[error("Unknown parent for plugin {plugin}: key {index} does not belong to this set")]
    UnknownParent { plugin: String, index: usize },
}

/// Errors parsing the text form of policy values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unrecognized signature state: {0:?}")]
    SignatureState(String),

    #[error("Unrecognized environment: {0:?}")]
    Environment(String),

    #[error("Unrecognized error code: {0:?}")]
    ErrorCode(String),
}

/// Result type for plugin set operations.
pub type RegistryResult<T> = std::result::Result<T, RegistryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = PluginError::new(ErrorCode::SignatureMissing, "acme-plugin");
        assert_eq!(err.to_string(), r#"plugin "acme-plugin" is unsigned"#);

        let err = PluginError::new(ErrorCode::SignatureInvalid, "acme-plugin");
        assert_eq!(
            err.to_string(),
            r#"plugin "acme-plugin" has an invalid signature"#
        );

        let err = PluginError::new(ErrorCode::SignatureModified, "acme-plugin");
        assert_eq!(
            err.to_string(),
            r#"plugin "acme-plugin"'s signature has been modified"#
        );
    }

    #[test]
    fn test_code_and_id_accessors() {
        let err = PluginError::new(ErrorCode::SignatureModified, "panel");
        assert_eq!(err.code(), ErrorCode::SignatureModified);
        assert_eq!(err.plugin_id(), "panel");
    }

    #[test]
    fn test_error_code_wire_form() {
        let json = serde_json::to_string(&ErrorCode::SignatureMissing).unwrap();
        assert_eq!(json, r#""signatureMissing""#);

        let code: ErrorCode = serde_json::from_str(r#""signatureInvalid""#).unwrap();
        assert_eq!(code, ErrorCode::SignatureInvalid);
        assert_eq!("signatureModified".parse(), Ok(ErrorCode::SignatureModified));
        assert!("signature_missing".parse::<ErrorCode>().is_err());
    }
}
