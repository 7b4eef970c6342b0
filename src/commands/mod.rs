//! CLI command definitions and dispatch.

pub mod fire;
pub mod hooks;
pub mod modules;
pub mod serve;

use clap::{Parser, Subcommand};

use iris_core::config::AppConfig;
use iris_core::error::AppError;

/// IRIS module engine
#[derive(Debug, Parser)]
#[command(name = "iris-server", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file; falls back to `IRIS_CONFIG`, then `config/default.toml`
    #[arg(short, long)]
    pub config: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the module engine and its worker pool until interrupted
    Serve,
    /// List the hook catalog
    Hooks(hooks::HooksArgs),
    /// Module management
    Modules(modules::ModulesArgs),
    /// Fire a hook and print the resulting payload
    Fire(fire::FireArgs),
}

impl Cli {
    /// Load configuration from file and environment
    pub fn load_config(&self) -> Result<AppConfig, AppError> {
        let path = self
            .config
            .clone()
            .or_else(|| std::env::var("IRIS_CONFIG").ok())
            .unwrap_or_else(|| "config/default.toml".to_string());
        AppConfig::load(&path)
    }

    /// Execute the CLI command
    pub async fn execute(&self, config: AppConfig) -> Result<(), AppError> {
        match &self.command {
            Commands::Serve => serve::execute(config).await,
            Commands::Hooks(args) => hooks::execute(args, config).await,
            Commands::Modules(args) => modules::execute(args, config).await,
            Commands::Fire(args) => fire::execute(args, config).await,
        }
    }
}

/// Print a value as pretty JSON
pub fn print_json<T: serde::Serialize>(value: &T) {
    let json = serde_json::to_string_pretty(value).unwrap_or_else(|_| "null".to_string());
    println!("{}", json);
}
