//! # plugin-signature
//!
//! Signature policy engine deciding whether a loaded plugin may run.
//!
//! This crate provides:
//! - Plugin records and a dependency-ordered plugin set
//! - Signature states as reported by the upstream verifier
//! - The signature validator with hierarchy inheritance
//! - Unsigned-plugin relaxations (development mode, allow-list, custom policy)
//!
//! ## Policy
//!
//! Only backend plugins are enforced, and only when signing is required.
//! Nested plugins take the signature state of the plugin they ship inside,
//! except core and internal plugins, which keep their own. Rejections carry
//! one of three [`ErrorCode`]s and are recorded as diagnostics on the
//! validator.
//!
//! ```
//! use plugin_signature::{
//!     Environment, ErrorCode, Plugin, PluginSet, PluginSettings, SignatureState,
//!     SignatureValidator,
//! };
//!
//! let mut plugins = PluginSet::new();
//! let app = plugins
//!     .insert(Plugin::new("acme-app").backend(true).signature(SignatureState::Valid))
//!     .unwrap();
//! plugins
//!     .insert_child(app, Plugin::new("acme-datasource").backend(true))
//!     .unwrap();
//! plugins
//!     .insert(Plugin::new("loose-plugin").backend(true))
//!     .unwrap();
//!
//! let settings = PluginSettings::new(Environment::Production);
//! let mut validator = SignatureValidator::new(settings, true);
//! let verdicts = validator.validate_all(&mut plugins);
//!
//! assert!(verdicts[1].is_admitted());
//! assert_eq!(
//!     verdicts[2].result.as_ref().unwrap_err().code(),
//!     ErrorCode::SignatureMissing
//! );
//! ```

pub mod diagnostics;
pub mod error;
pub mod plugin;
pub mod policy;
pub mod settings;
pub mod signature;
pub mod validator;

pub use diagnostics::{Diagnostic, Severity};
pub use error::{ErrorCode, ParseError, PluginError, RegistryError, RegistryResult};
pub use plugin::{Plugin, PluginKey, PluginSet};
pub use policy::{DenyUnsigned, UnsignedPolicy};
pub use settings::{Environment, PluginSettings};
pub use signature::SignatureState;
pub use validator::{SignatureValidator, Verdict};
