//! Host settings consulted by the unsigned-plugin policy.

use crate::error::ParseError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Host run mode.
///
/// Deserializes through [`FromStr`], so config files and environment
/// variables accept the same spellings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Environment {
    /// Relaxed mode: unsigned backend plugins are allowed to run.
    Development,

    #[default]
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }

    pub fn is_development(&self) -> bool {
        *self == Environment::Development
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(ParseError::Environment(s.to_string())),
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = ParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Environment mode and unsigned allow-list, fixed for one validator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginSettings {
    pub environment: Environment,
    allow_unsigned: HashSet<String>,
}

impl PluginSettings {
    pub fn new(environment: Environment) -> Self {
        Self {
            environment,
            allow_unsigned: HashSet::new(),
        }
    }

    /// Replace the allow-list with the given identifiers.
    pub fn with_allow_unsigned<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allow_unsigned = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Split an allow-list written as `"a, b c"` into identifiers.
    ///
    /// Commas and whitespace both separate entries; empty entries are dropped.
    pub fn parse_allow_list(list: &str) -> Vec<String> {
        list.split(|c: char| c == ',' || c.is_whitespace())
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Check whether `plugin_id` may run unsigned by explicit listing.
    pub fn is_allowed_unsigned(&self, plugin_id: &str) -> bool {
        self.allow_unsigned.contains(plugin_id)
    }

    pub fn allowed_unsigned(&self) -> impl Iterator<Item = &str> {
        self.allow_unsigned.iter().map(String::as_str)
    }
}
