//! Module registry: admission, configuration, and activation of modules.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use iris_core::error::{AppError, ErrorKind};
use iris_core::result::AppResult;
use iris_core::types::ModuleId;
use iris_entity::{ConfigOption, ModuleType, PipelineArg, RegisteredModule};

use crate::compat::{CompatibilityChecker, ValidationReport};
use crate::descriptor::ModuleDescriptor;
use crate::error::RegistrationError;
use crate::hooks::binding::HookBinder;
use crate::loader::ModuleLoader;
use crate::store::ModuleStore;

/// An import pipeline offered by an active module.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineEntry {
    /// Providing module.
    pub module_id: ModuleId,
    /// Module name.
    pub module_name: String,
    /// Module human-readable name.
    pub human_name: String,
    /// Pipeline arguments.
    pub pipeline_args: Vec<PipelineArg>,
    /// Pipeline information as declared.
    pub pipeline_info: Option<Value>,
}

/// Result of a module health check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    /// Module checked.
    pub module_name: String,
    /// Whether the module is compatible and ready.
    pub healthy: bool,
    /// Human-readable findings.
    pub logs: Vec<String>,
}

/// Registry of modules known to the host.
#[derive(Debug, Clone)]
pub struct ModuleRegistry {
    store: Arc<dyn ModuleStore>,
    loader: Arc<dyn ModuleLoader>,
    binder: HookBinder,
    checker: CompatibilityChecker,
}

impl ModuleRegistry {
    /// Creates a registry.
    pub fn new(store: Arc<dyn ModuleStore>, loader: Arc<dyn ModuleLoader>, checker: CompatibilityChecker) -> Self {
        Self {
            binder: HookBinder::new(store.clone()),
            store,
            loader,
            checker,
        }
    }

    /// The compatibility checker used on admission.
    pub fn checker(&self) -> &CompatibilityChecker {
        &self.checker
    }

    /// Admits the module implementation known to the loader as `name`.
    ///
    /// A compatible module that reports it is not ready is registered
    /// inactive. Processors are then asked to bind themselves to hooks.
    pub async fn register(&self, name: &str) -> Result<RegisteredModule, RegistrationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RegistrationError::NoName);
        }

        let port = self.loader.load(name).ok_or_else(|| {
            warn!(module = %name, "Module implementation not found");
            RegistrationError::InstantiationFailed(name.to_string())
        })?;

        if self.store.find_module_by_name(name).await?.is_some() {
            return Err(RegistrationError::AlreadyRegistered(name.to_string()));
        }

        let descriptor = ModuleDescriptor::from_port(name, port.as_ref());
        if let Err(report) = self.checker.validate(&descriptor) {
            warn!(module = %name, issues = report.issues.len(), report = %report, "Module rejected");
            return Err(RegistrationError::Incompatible {
                name: name.to_string(),
                report,
            });
        }

        let (Some(interface_version), Some(module_type)) =
            (descriptor.parsed_interface_version(), descriptor.parsed_module_type())
        else {
            return Err(RegistrationError::Incompatible {
                name: name.to_string(),
                report: ValidationReport::default(),
            });
        };

        let is_ready = port.is_ready();
        if !is_ready {
            warn!(module = %name, "Module is not ready, registering it inactive");
        }

        let record = RegisteredModule {
            module_id: ModuleId::new(0),
            name: name.to_string(),
            human_name: descriptor.human_name.clone(),
            description: descriptor.description.clone(),
            module_version: descriptor.module_version.clone(),
            interface_version,
            module_type,
            is_active: is_ready,
            config: descriptor.seeded_configuration(),
            has_pipeline: descriptor.provides_pipeline,
            pipeline_args: descriptor.pipeline_args.clone(),
            pipeline_info: descriptor.provides_pipeline.then(|| descriptor.pipeline_info.clone()),
            date_added: Utc::now(),
        };

        let module = self.store.insert_module(record).await.map_err(|e| {
            if e.is(ErrorKind::Conflict) {
                RegistrationError::AlreadyRegistered(name.to_string())
            } else {
                RegistrationError::Store(e)
            }
        })?;

        info!(
            module = %module.name,
            module_id = %module.module_id,
            module_type = %module.module_type,
            interface_version = %module.interface_version,
            is_active = module.is_active,
            "Module registered"
        );

        if module.module_type == ModuleType::Processor {
            let status = port.register_hooks(module.module_id, &self.binder).await;
            if status.is_failure() {
                warn!(module = %module.name, message = %status.message, "Module failed to register its hooks");
            } else {
                info!(module = %module.name, message = %status.message, "Module hooks registered");
            }
        }

        Ok(module)
    }

    /// Runs the admission checks against a module implementation without registering it.
    pub async fn check_health(&self, name: &str) -> HealthReport {
        let mut logs = Vec::new();

        let Some(port) = self.loader.load(name) else {
            logs.push(format!("Error - Module {name} could not be instantiated"));
            return HealthReport {
                module_name: name.to_string(),
                healthy: false,
                logs,
            };
        };

        let descriptor = ModuleDescriptor::from_port(name, port.as_ref());
        let compatible = match self.checker.validate(&descriptor) {
            Ok(()) => true,
            Err(report) => {
                logs.extend(report.logs());
                false
            }
        };

        let ready = compatible && port.is_ready();
        if compatible && !ready {
            logs.push(format!("Error - Module {name} reports it is not ready"));
        }
        if ready {
            logs.push(format!("Module {name} is compatible and ready"));
        }

        HealthReport {
            module_name: name.to_string(),
            healthy: ready,
            logs,
        }
    }

    /// Finds a registered module by name.
    pub async fn find(&self, name: &str) -> AppResult<Option<RegisteredModule>> {
        self.store.find_module_by_name(name).await
    }

    /// Every registered module, in registration order.
    pub async fn list(&self) -> AppResult<Vec<RegisteredModule>> {
        self.store.list_modules().await
    }

    /// Current configuration of a registered module.
    pub async fn get_config(&self, name: &str) -> AppResult<Vec<ConfigOption>> {
        self.store
            .find_module_by_name(name)
            .await?
            .map(|module| module.config)
            .ok_or_else(|| AppError::not_found(format!("Module {name} not found")))
    }

    /// Sets the value of one configuration option.
    pub async fn update_config(&self, module_id: ModuleId, param_name: &str, value: Value) -> AppResult<RegisteredModule> {
        let mut module = self.require(module_id).await?;

        let option = module
            .config
            .iter_mut()
            .find(|option| option.param_name == param_name)
            .ok_or_else(|| AppError::not_found(format!("Module {} has no option {param_name}", module_id)))?;
        option.value = Some(value);

        self.store.update_module(&module).await?;
        info!(module = %module.name, param = %param_name, "Module configuration updated");
        Ok(module)
    }

    /// Enables dispatch to a module. Enabling an active module is a no-op.
    pub async fn activate(&self, module_id: ModuleId) -> AppResult<RegisteredModule> {
        self.set_active(module_id, true).await
    }

    /// Disables dispatch to a module. Disabling an inactive module is a no-op.
    pub async fn deactivate(&self, module_id: ModuleId) -> AppResult<RegisteredModule> {
        self.set_active(module_id, false).await
    }

    /// Pipelines of active modules, in registration order.
    pub async fn list_pipelines(&self) -> AppResult<Vec<PipelineEntry>> {
        Ok(self
            .store
            .list_modules()
            .await?
            .into_iter()
            .filter(RegisteredModule::is_available_pipeline)
            .map(|module| PipelineEntry {
                module_id: module.module_id,
                module_name: module.name,
                human_name: module.human_name,
                pipeline_args: module.pipeline_args,
                pipeline_info: module.pipeline_info,
            })
            .collect())
    }

    /// Removes a module and its bindings.
    pub async fn remove(&self, module_id: ModuleId) -> AppResult<()> {
        if !self.store.delete_module(module_id).await? {
            return Err(AppError::not_found(format!("Module ID {module_id} not found")));
        }
        info!(module_id = %module_id, "Module removed");
        Ok(())
    }

    async fn require(&self, module_id: ModuleId) -> AppResult<RegisteredModule> {
        self.store
            .find_module(module_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Module ID {module_id} not found")))
    }

    async fn set_active(&self, module_id: ModuleId, is_active: bool) -> AppResult<RegisteredModule> {
        let mut module = self.require(module_id).await?;
        if module.is_active == is_active {
            return Ok(module);
        }

        module.is_active = is_active;
        self.store.update_module(&module).await?;
        info!(module = %module.name, is_active, "Module activation changed");
        Ok(module)
    }
}
