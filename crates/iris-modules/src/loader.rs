//! Name-based module instantiation.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::info;

use crate::port::ModulePort;

/// Builds a fresh module instance.
pub type ModuleFactory = Arc<dyn Fn() -> Arc<dyn ModulePort> + Send + Sync>;

/// Capability lookup: turns a module name into a module instance.
pub trait ModuleLoader: Send + Sync + std::fmt::Debug {
    /// Instantiates the module registered under `name`.
    fn load(&self, name: &str) -> Option<Arc<dyn ModulePort>>;

    /// Names of every loadable module, sorted.
    fn available(&self) -> Vec<String>;
}

/// Loader over statically linked module implementations.
#[derive(Default)]
pub struct StaticModuleLoader {
    /// Module name → factory.
    factories: BTreeMap<String, ModuleFactory>,
}

impl StaticModuleLoader {
    /// Creates an empty loader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a factory under `name`, replacing any previous one.
    pub fn register<F>(&mut self, name: &str, factory: F)
    where
        F: Fn() -> Arc<dyn ModulePort> + Send + Sync + 'static,
    {
        info!(module = %name, "Module implementation linked");
        self.factories.insert(name.to_string(), Arc::new(factory));
    }

    /// Builder form of [`StaticModuleLoader::register`].
    pub fn with_module<F>(mut self, name: &str, factory: F) -> Self
    where
        F: Fn() -> Arc<dyn ModulePort> + Send + Sync + 'static,
    {
        self.register(name, factory);
        self
    }
}

impl ModuleLoader for StaticModuleLoader {
    fn load(&self, name: &str) -> Option<Arc<dyn ModulePort>> {
        self.factories.get(name).map(|factory| factory())
    }

    fn available(&self) -> Vec<String> {
        self.factories.keys().cloned().collect()
    }
}

impl std::fmt::Debug for StaticModuleLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticModuleLoader")
            .field("modules", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}
