//! Fire a hook from the command line.

use clap::Args;
use serde_json::Value;

use iris_core::config::AppConfig;
use iris_core::error::AppError;
use iris_core::types::{BindingId, CaseId};
use iris_entity::CaseContext;

use crate::engine;

/// Arguments for the fire command
#[derive(Debug, Args)]
pub struct FireArgs {
    /// Hook name, e.g. `on_preload_report_create`
    pub hook: String,

    /// JSON payload
    #[arg(short, long, default_value = "{}")]
    pub payload: String,

    /// Case the hook is fired on
    #[arg(long, default_value_t = 1)]
    pub case: i64,

    /// Initiating user
    #[arg(short, long)]
    pub user: Option<String>,

    /// Run this manual trigger binding instead of firing the whole hook
    #[arg(long)]
    pub binding: Option<i64>,
}

/// Execute the fire command
pub async fn execute(args: &FireArgs, config: AppConfig) -> Result<(), AppError> {
    let payload: Value = serde_json::from_str(&args.payload)
        .map_err(|e| AppError::validation(format!("Payload is not valid JSON: {}", e)))?;

    let mut context = CaseContext::new(CaseId::new(args.case));
    if let Some(user) = &args.user {
        context = context.with_user(user.clone());
    }

    let engine = engine::build(&config).await?;
    let worker = engine.worker.map(|w| w.start());
    let dispatcher = engine.manager.dispatcher();

    let result = match args.binding {
        Some(binding_id) => {
            dispatcher
                .trigger_manual(BindingId::new(binding_id), payload, &context)
                .await
        }
        None => dispatcher.fire(&args.hook, payload, &context).await,
    };

    drop(engine.manager);
    if let Some(worker) = worker {
        worker.drain().await;
    }

    super::print_json(&result?);
    Ok(())
}
