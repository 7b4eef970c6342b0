//! Module management CLI commands.

use clap::{Args, Subcommand};

use iris_core::config::AppConfig;
use iris_core::error::AppError;

use crate::engine;

/// Arguments for module commands
#[derive(Debug, Args)]
pub struct ModulesArgs {
    /// Module subcommand
    #[command(subcommand)]
    pub command: ModulesCommand,
}

/// Module subcommands
#[derive(Debug, Subcommand)]
pub enum ModulesCommand {
    /// List linked and registered modules
    List,
    /// Run the compatibility and readiness checks on a linked module
    Check {
        /// Module name
        name: String,
    },
    /// Register a linked module and show its record and bindings
    Register {
        /// Module name
        name: String,
    },
    /// List the import pipelines of active modules
    Pipelines,
}

/// Execute module commands
pub async fn execute(args: &ModulesArgs, config: AppConfig) -> Result<(), AppError> {
    let engine = engine::build(&config).await?;
    let registry = engine.manager.registry();

    match &args.command {
        ModulesCommand::List => {
            println!("Linked modules:");
            for name in engine.manager.loader().available() {
                println!("  {}", name);
            }
            println!("Registered modules:");
            for module in registry.list().await? {
                println!(
                    "  [{}] {} v{} ({}, interface {}){}",
                    module.module_id,
                    module.name,
                    module.module_version,
                    module.module_type,
                    module.interface_version,
                    if module.is_active { "" } else { " inactive" }
                );
            }
        }
        ModulesCommand::Check { name } => {
            let report = registry.check_health(name).await;
            for line in &report.logs {
                println!("{}", line);
            }
            if !report.healthy {
                return Err(AppError::module(format!("Module {} is not healthy", name)).with_logs(report.logs));
            }
        }
        ModulesCommand::Register { name } => {
            let module = match registry.find(name).await? {
                Some(existing) => existing,
                None => registry.register(name).await?,
            };
            let bindings = engine.manager.store().bindings_for_module(module.module_id).await?;
            super::print_json(&module);
            println!("{} hook bindings", bindings.len());
        }
        ModulesCommand::Pipelines => {
            super::print_json(&registry.list_pipelines().await?);
        }
    }

    Ok(())
}
