//! Custom policy for unsigned plugins.
//!
//! A validator may carry one [`UnsignedPolicy`]. When present its answer is
//! final for unsigned plugins: the development-mode relaxation and the
//! allow-list are not consulted.

use crate::plugin::Plugin;
use std::fmt;

/// Decides whether an unsigned backend plugin may run.
pub trait UnsignedPolicy: Send + Sync {
    fn allow_unsigned(&self, plugin: &Plugin) -> bool;
}

impl<F> UnsignedPolicy for F
where
    F: Fn(&Plugin) -> bool + Send + Sync,
{
    fn allow_unsigned(&self, plugin: &Plugin) -> bool {
        self(plugin)
    }
}

/// Refuses every unsigned plugin.
#[derive(Debug, Clone, Copy, Default)]
pub struct DenyUnsigned;

impl UnsignedPolicy for DenyUnsigned {
    fn allow_unsigned(&self, _plugin: &Plugin) -> bool {
        false
    }
}

/// Boxed policy held by a validator.
pub(crate) struct CustomPolicy(pub(crate) Box<dyn UnsignedPolicy>);

impl fmt::Debug for CustomPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomPolicy(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_policy() {
        let policy = |plugin: &Plugin| plugin.id == "acme-plugin";
        assert!(policy.allow_unsigned(&Plugin::new("acme-plugin")));
        assert!(!policy.allow_unsigned(&Plugin::new("other-plugin")));
    }

    #[test]
    fn test_deny_unsigned() {
        assert!(!DenyUnsigned.allow_unsigned(&Plugin::new("anything")));
    }
}
