//! Module registry

use crate::traits::{Module, ModuleInfo};
use parking_lot::RwLock;
use siphon_core::{Error, Result};
use std::collections::HashMap;
use std::sync::Arc;

/// Module registry.
///
/// Populated explicitly by the host's startup sequence; there is no
/// process-wide instance.
#[derive(Clone)]
pub struct ModuleRegistry {
    modules: Arc<RwLock<HashMap<String, ModuleInfo>>>,
}

impl std::fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleRegistry")
            .field("modules", &self.list())
            .finish()
    }
}

impl ModuleRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            modules: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register a module
    pub fn register(&self, info: ModuleInfo) -> Result<()> {
        info.id.validate()?;
        let id = info.id.to_string();

        let mut modules = self.modules.write();

        if modules.contains_key(&id) {
            return Err(Error::module(id, "Module already registered"));
        }

        modules.insert(id.clone(), info);

        tracing::info!(module = %id, "Module registered");

        Ok(())
    }

    /// Get a module's registration by ID
    pub fn get(&self, id: &str) -> Option<ModuleInfo> {
        self.modules.read().get(id).cloned()
    }

    /// Check whether an ID is registered
    pub fn contains(&self, id: &str) -> bool {
        self.modules.read().contains_key(id)
    }

    /// Find the module called `name` inside `namespace`
    pub fn find_by_name(&self, namespace: &str, name: &str) -> Option<ModuleInfo> {
        self.modules
            .read()
            .values()
            .find(|info| info.id.namespace() == namespace && info.id.name() == name)
            .cloned()
    }

    /// Build a fresh, unconfigured instance of a module
    pub fn instantiate(&self, id: &str) -> Result<Box<dyn Module>> {
        let info = self
            .get(id)
            .ok_or_else(|| Error::module(id, "Module not found"))?;

        let module = (info.new)();

        let built = module.module_info().id;
        if built != info.id {
            return Err(Error::module(
                id,
                format!("constructor returned module '{built}'"),
            ));
        }

        Ok(module)
    }

    /// All registered module IDs, sorted
    pub fn list(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.modules.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Number of registered modules
    pub fn len(&self) -> usize {
        self.modules.read().len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.modules.read().is_empty()
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}
