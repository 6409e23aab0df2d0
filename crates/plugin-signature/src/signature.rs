//! Signature states produced by the upstream verifier.
//!
//! The set is closed: every plugin record carries exactly one of these
//! states, and the text form rejects anything else.

use crate::error::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Outcome of checking a plugin's signature.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignatureState {
    /// Verified and unmodified.
    Valid,

    /// Verification failed.
    Invalid,

    /// Signed, but the contents changed after signing.
    Modified,

    /// No signature present.
    #[default]
    Unsigned,

    /// First-party plugin; never downgraded through its parent.
    Internal,
}

impl SignatureState {
    /// Every state, in declaration order.
    pub const ALL: [SignatureState; 5] = [
        SignatureState::Valid,
        SignatureState::Invalid,
        SignatureState::Modified,
        SignatureState::Unsigned,
        SignatureState::Internal,
    ];

    /// Convert the state to its string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            SignatureState::Valid => "valid",
            SignatureState::Invalid => "invalid",
            SignatureState::Modified => "modified",
            SignatureState::Unsigned => "unsigned",
            SignatureState::Internal => "internal",
        }
    }

    pub fn is_valid(&self) -> bool {
        *self == SignatureState::Valid
    }
}

impl fmt::Display for SignatureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignatureState {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SignatureState::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| ParseError::SignatureState(s.to_string()))
    }
}
