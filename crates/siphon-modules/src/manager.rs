//! Module manager
//!
//! Drives modules through their load lifecycle:
//! instantiate → unmarshal (or configure) → provision → validate → freeze.
//! Any failure aborts the whole load; nothing half-configured is returned.

use crate::registry::ModuleRegistry;
use crate::traits::{Module, ModuleId};
use siphon_config::{ConfigSource, Dispenser};
use siphon_core::{ConfigError, Encoding, Error, Result};
use std::sync::Arc;

/// Namespace encoder modules register under
pub const ENCODERS_NAMESPACE: &str = "http.encoders";

/// An encoding that finished loading
#[derive(Debug, Clone)]
pub struct LoadedEncoding {
    /// Module that produced it
    pub id: ModuleId,
    /// Frozen, shareable encoding
    pub encoding: Arc<dyn Encoding>,
}

/// Every encoding loaded from one configuration
#[derive(Debug, Clone, Default)]
pub struct EncodingSet {
    entries: Vec<LoadedEncoding>,
}

impl EncodingSet {
    /// Look up an encoding by its Accept-Encoding token
    pub fn get(&self, token: &str) -> Option<&Arc<dyn Encoding>> {
        self.entries
            .iter()
            .find(|e| e.encoding.accept_encoding() == token)
            .map(|e| &e.encoding)
    }

    /// Accept-Encoding tokens in load order
    pub fn tokens(&self) -> Vec<&'static str> {
        self.entries
            .iter()
            .map(|e| e.encoding.accept_encoding())
            .collect()
    }

    /// Loaded entries
    pub fn iter(&self) -> impl Iterator<Item = &LoadedEncoding> {
        self.entries.iter()
    }

    /// Number of encodings
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no encoding was configured
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Module manager
#[derive(Debug, Clone, Default)]
pub struct ModuleManager {
    registry: ModuleRegistry,
}

impl ModuleManager {
    /// Create a manager over a registry
    pub fn new(registry: ModuleRegistry) -> Self {
        Self { registry }
    }

    /// Get the module registry
    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    /// Load an encoding module from directive tokens
    pub fn load_from_directives(&self, id: &str, d: &mut Dispenser) -> Result<Arc<dyn Encoding>> {
        let mut module = self.registry.instantiate(id)?;

        let unmarshaler = module
            .as_unmarshaler()
            .ok_or_else(|| Error::module(id, "directive configuration not supported"))?;
        unmarshaler.unmarshal_directive(d)?;

        self.finish(id, module)
    }

    /// Load an encoding module from structured configuration
    pub fn load_from_value(&self, id: &str, raw: serde_json::Value) -> Result<Arc<dyn Encoding>> {
        let mut module = self.registry.instantiate(id)?;
        module.configure(raw)?;
        self.finish(id, module)
    }

    fn finish(&self, id: &str, mut module: Box<dyn Module>) -> Result<Arc<dyn Encoding>> {
        if let Some(provisioner) = module.as_provisioner() {
            provisioner.provision()?;
        }

        if let Some(validator) = module.as_validator() {
            if let Err(e) = validator.validate() {
                tracing::warn!(module = %id, error = %e, "Module configuration rejected");
                return Err(e);
            }
        }

        let encoding = module
            .into_encoding()
            .ok_or_else(|| Error::module(id, "module is not an encoding"))?;

        tracing::info!(
            module = %id,
            encoding = encoding.accept_encoding(),
            "Encoding loaded"
        );

        Ok(encoding)
    }

    /// Load every encoding named by a configuration.
    ///
    /// Directive names and structured keys resolve to modules in
    /// [`ENCODERS_NAMESPACE`] by their last ID label.
    pub fn load_encodings(&self, source: &ConfigSource) -> Result<EncodingSet> {
        let mut set = EncodingSet::default();

        match source {
            ConfigSource::Directives(dispenser) => {
                for name in dispenser.directive_names() {
                    let id = self.resolve(name)?;
                    let mut segment = dispenser.filter(name);
                    let encoding = self.load_from_directives(id.as_str(), &mut segment)?;
                    set.entries.push(LoadedEncoding { id, encoding });
                }
            }
            ConfigSource::Modules(modules) => {
                for (name, raw) in modules {
                    let id = self.resolve(name)?;
                    let encoding = self.load_from_value(id.as_str(), raw.clone())?;
                    set.entries.push(LoadedEncoding { id, encoding });
                }
            }
        }

        Ok(set)
    }

    fn resolve(&self, name: &str) -> Result<ModuleId> {
        self.registry
            .find_by_name(ENCODERS_NAMESPACE, name)
            .map(|info| info.id)
            .ok_or_else(|| ConfigError::UnknownDirective(name.to_string()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{ModuleInfo, Provisioner, UnmarshalDirective, Validator};
    use siphon_core::{Encoder, Sink};
    use std::io::Write;

    #[derive(Debug, Default)]
    struct Identity {
        args: Vec<String>,
        provisioned: bool,
    }

    struct PassThrough(Sink);

    impl std::fmt::Debug for PassThrough {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("PassThrough")
        }
    }

    impl Encoder for PassThrough {
        fn write(&mut self, data: &[u8]) -> Result<usize> {
            Ok(self.0.write(data)?)
        }
        fn close(&mut self) -> Result<()> {
            Ok(self.0.flush()?)
        }
        fn reset(&mut self, sink: Sink) {
            self.0 = sink;
        }
    }

    impl Encoding for Identity {
        fn accept_encoding(&self) -> &'static str {
            "identity"
        }
        fn new_encoder(&self, sink: Sink) -> Box<dyn Encoder> {
            Box::new(PassThrough(sink))
        }
    }

    impl UnmarshalDirective for Identity {
        fn unmarshal_directive(&mut self, d: &mut Dispenser) -> Result<()> {
            while d.next_directive() {
                self.args = d.remaining_args();
            }
            Ok(())
        }
    }

    impl Provisioner for Identity {
        fn provision(&mut self) -> Result<()> {
            self.provisioned = true;
            Ok(())
        }
    }

    impl Validator for Identity {
        fn validate(&self) -> Result<()> {
            if !self.provisioned {
                return Err(Error::module("http.encoders.identity", "not provisioned"));
            }
            if self.args.iter().any(|a| a == "bad") {
                return Err(ConfigError::InvalidArgument("bad".to_string()).into());
            }
            Ok(())
        }
    }

    impl Module for Identity {
        fn module_info(&self) -> ModuleInfo {
            ModuleInfo::new("http.encoders.identity", || Box::new(Identity::default()))
        }
        fn as_unmarshaler(&mut self) -> Option<&mut dyn UnmarshalDirective> {
            Some(self)
        }
        fn as_provisioner(&mut self) -> Option<&mut dyn Provisioner> {
            Some(self)
        }
        fn as_validator(&self) -> Option<&dyn Validator> {
            Some(self)
        }
        fn into_encoding(self: Box<Self>) -> Option<Arc<dyn Encoding>> {
            Some(Arc::new(*self))
        }
    }

    fn manager() -> ModuleManager {
        let registry = ModuleRegistry::new();
        registry
            .register(ModuleInfo::new("http.encoders.identity", || {
                Box::new(Identity::default())
            }))
            .unwrap();
        ModuleManager::new(registry)
    }

    #[test]
    fn test_load_from_directives() {
        let manager = manager();
        let mut d = Dispenser::from_tokens("identity", ["x"]);
        let encoding = manager
            .load_from_directives("http.encoders.identity", &mut d)
            .unwrap();
        assert_eq!(encoding.accept_encoding(), "identity");
    }

    #[test]
    fn test_validation_failure_aborts() {
        let manager = manager();
        let mut d = Dispenser::from_tokens("identity", ["bad"]);
        let err = manager
            .load_from_directives("http.encoders.identity", &mut d)
            .unwrap_err();
        assert!(matches!(
            err.as_config(),
            Some(ConfigError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_structured_config_unsupported() {
        let manager = manager();
        let err = manager
            .load_from_value("http.encoders.identity", serde_json::json!({}))
            .unwrap_err();
        assert!(matches!(err, Error::Module { .. }));
    }

    #[test]
    fn test_load_encodings_resolves_directive_names() {
        let manager = manager();
        let source = ConfigSource::Directives(Dispenser::parse("identity a\n").unwrap());
        let set = manager.load_encodings(&source).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.tokens(), vec!["identity"]);
        assert!(set.get("identity").is_some());
        assert!(set.get("br").is_none());
    }

    #[test]
    fn test_unknown_directive() {
        let manager = manager();
        let source = ConfigSource::Directives(Dispenser::parse("gzip 5\n").unwrap());
        let err = manager.load_encodings(&source).unwrap_err();
        assert!(matches!(
            err.as_config(),
            Some(ConfigError::UnknownDirective(name)) if name == "gzip"
        ));
    }

    #[test]
    fn test_encoder_from_loaded_encoding() {
        let manager = manager();
        let mut d = Dispenser::from_tokens("identity", Vec::<String>::new());
        let encoding = manager
            .load_from_directives("http.encoders.identity", &mut d)
            .unwrap();

        let mut encoder = encoding.new_encoder(Box::new(std::io::sink()));
        encoder.write_all(b"abc").unwrap();
        encoder.close().unwrap();
    }
}
