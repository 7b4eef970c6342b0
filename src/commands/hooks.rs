//! Hook catalog CLI command.

use clap::Args;

use iris_core::config::AppConfig;
use iris_core::error::AppError;

use crate::engine;

/// Arguments for the hooks command
#[derive(Debug, Args)]
pub struct HooksArgs {
    /// Print JSON instead of one hook per line
    #[arg(long)]
    pub json: bool,

    /// Only list manual trigger hooks
    #[arg(long)]
    pub manual: bool,
}

/// Execute the hooks command
pub async fn execute(args: &HooksArgs, config: AppConfig) -> Result<(), AppError> {
    let engine = engine::build(&config).await?;
    let hooks: Vec<_> = engine
        .manager
        .catalog()
        .list()
        .await?
        .into_iter()
        .filter(|h| !args.manual || h.is_manual())
        .collect();

    if args.json {
        super::print_json(&hooks);
        return Ok(());
    }

    for hook in &hooks {
        println!("{:>4}  {:<40} {}", hook.hook_id.to_string(), hook.hook_name, hook.hook_description);
    }
    Ok(())
}
