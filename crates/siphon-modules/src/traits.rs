//! Module traits and identity

use siphon_config::Dispenser;
use siphon_core::{Encoding, Error, Result};
use std::fmt;
use std::sync::Arc;

/// Zero-argument module constructor
pub type ModuleConstructor = fn() -> Box<dyn Module>;

/// Dotted module identifier such as `http.encoders.br`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(String);

impl ModuleId {
    /// Create a module ID (checked on registration)
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Check the ID is made of non-empty `[a-z0-9_]` labels
    pub fn validate(&self) -> Result<()> {
        let valid = !self.0.is_empty()
            && self.0.split('.').all(|label| {
                !label.is_empty()
                    && label
                        .chars()
                        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
            });

        if valid {
            Ok(())
        } else {
            Err(Error::module(&self.0, "invalid module ID"))
        }
    }

    /// Everything before the last label
    pub fn namespace(&self) -> &str {
        self.0.rsplit_once('.').map_or("", |(ns, _)| ns)
    }

    /// Last label
    pub fn name(&self) -> &str {
        self.0.rsplit_once('.').map_or(self.0.as_str(), |(_, name)| name)
    }

    /// Full ID
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Registration record for a module
#[derive(Debug, Clone)]
pub struct ModuleInfo {
    /// Module ID
    pub id: ModuleId,
    /// Builds an empty, unconfigured instance
    pub new: ModuleConstructor,
}

impl ModuleInfo {
    /// Create module info
    pub fn new(id: impl Into<String>, new: ModuleConstructor) -> Self {
        Self {
            id: ModuleId::new(id),
            new,
        }
    }
}

/// A loadable module.
///
/// Capabilities are discovered through the `as_*` accessors so the
/// lifecycle can drive any module through a trait object.
pub trait Module: Send + Sync + fmt::Debug {
    /// Identity and constructor
    fn module_info(&self) -> ModuleInfo;

    /// Directive parsing capability
    fn as_unmarshaler(&mut self) -> Option<&mut dyn UnmarshalDirective> {
        None
    }

    /// Default-filling capability
    fn as_provisioner(&mut self) -> Option<&mut dyn Provisioner> {
        None
    }

    /// Validation capability
    fn as_validator(&self) -> Option<&dyn Validator> {
        None
    }

    /// Apply structured configuration
    fn configure(&mut self, _raw: serde_json::Value) -> Result<()> {
        Err(Error::module(
            self.module_info().id.as_str(),
            "structured configuration not supported",
        ))
    }

    /// Freeze into a shared encoding, if this module is one
    fn into_encoding(self: Box<Self>) -> Option<Arc<dyn Encoding>> {
        None
    }
}

/// Sets up a module from directive tokens
pub trait UnmarshalDirective {
    /// Consume every occurrence of the module's directive
    fn unmarshal_directive(&mut self, d: &mut Dispenser) -> Result<()>;
}

/// Fills defaults once configuration has been read
pub trait Provisioner {
    /// Fill defaults
    fn provision(&mut self) -> Result<()>;
}

/// Read-only configuration check
pub trait Validator {
    /// Check configuration
    fn validate(&self) -> Result<()>;
}
