//! Module manager: wires the registry, hook catalog, binder, and dispatcher
//! over one store and one loader.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{error, info};

use iris_core::config::ModulesConfig;
use iris_core::result::AppResult;
use iris_entity::{CaseContext, HookBinding};

use crate::compat::CompatibilityChecker;
use crate::error::{BindError, RegistrationError};
use crate::hooks::binding::{BindRequest, HookBinder, HookRegistrar};
use crate::hooks::catalog::HookCatalog;
use crate::hooks::dispatcher::Dispatcher;
use crate::hooks::task::TaskSubmitter;
use crate::loader::ModuleLoader;
use crate::registry::ModuleRegistry;
use crate::store::ModuleStore;

/// Entry point of the module engine for the host application.
#[derive(Debug, Clone)]
pub struct ModuleManager {
    store: Arc<dyn ModuleStore>,
    loader: Arc<dyn ModuleLoader>,
    registry: ModuleRegistry,
    catalog: HookCatalog,
    binder: HookBinder,
    dispatcher: Dispatcher,
}

impl ModuleManager {
    /// Creates a manager from the modules configuration section.
    pub fn new(store: Arc<dyn ModuleStore>, loader: Arc<dyn ModuleLoader>, config: &ModulesConfig) -> AppResult<Self> {
        let checker = CompatibilityChecker::new(config.interface_range()?);
        let timeout = Duration::from_secs(config.handler_timeout_seconds);

        Ok(Self {
            registry: ModuleRegistry::new(store.clone(), loader.clone(), checker),
            catalog: HookCatalog::new(store.clone()),
            binder: HookBinder::new(store.clone()),
            dispatcher: Dispatcher::new(store.clone(), loader.clone(), timeout),
            store,
            loader,
        })
    }

    /// Routes asynchronous bindings to `submitter`.
    pub fn with_submitter(mut self, submitter: Arc<dyn TaskSubmitter>) -> Self {
        self.dispatcher = self.dispatcher.with_submitter(submitter);
        self
    }

    /// Seeds the default hooks and registers every `autoload` module not yet known.
    ///
    /// A module that fails to register is logged and skipped.
    pub async fn initialize(&self, autoload: &[String]) -> AppResult<()> {
        self.catalog.seed_defaults().await?;

        for name in autoload {
            match self.registry.register(name).await {
                Ok(module) => info!(module = %module.name, "Autoloaded module"),
                Err(RegistrationError::AlreadyRegistered(_)) => {}
                Err(e) => error!(module = %name, error = %e, logs = ?e.logs(), "Autoload failed"),
            }
        }

        Ok(())
    }

    /// Binds a module to a hook.
    pub async fn bind(&self, request: BindRequest) -> Result<HookBinding, BindError> {
        self.binder.register_hook(request).await
    }

    /// Fires a hook. See [`Dispatcher::fire`].
    pub async fn fire(&self, hook_name: &str, payload: Value, case: &CaseContext) -> AppResult<Value> {
        self.dispatcher.fire(hook_name, payload, case).await
    }

    /// The module registry.
    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    /// The hook catalog.
    pub fn catalog(&self) -> &HookCatalog {
        &self.catalog
    }

    /// The hook dispatcher.
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// The backing store.
    pub fn store(&self) -> &Arc<dyn ModuleStore> {
        &self.store
    }

    /// The module loader.
    pub fn loader(&self) -> &Arc<dyn ModuleLoader> {
        &self.loader
    }
}
