//! Status command

use crate::commands::CliCommand;
use artvector_core::Result;
use clap::Args;
use std::path::PathBuf;

/// Show indexing progress
#[derive(Debug, Clone, Args)]
pub struct StatusArgs {
    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl CliCommand for StatusArgs {
    async fn execute(&self) -> Result<()> {
        let config = crate::load_config(self.config.as_deref())?;
        let service = crate::connect_service(&config).await?;

        let status = service.job_status().await?;
        println!(
            "{} of {} objects embedded ({:.1}%), {} remaining",
            status.embedded, status.total, status.percent, status.remaining
        );

        let datasets = service.list_datasets().await?;
        for dataset in datasets {
            println!(
                "  {} - {} ({} objects, from {})",
                dataset.id, dataset.name, dataset.object_count, dataset.source_file
            );
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "status"
    }
}
