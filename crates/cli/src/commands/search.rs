//! Search command

use crate::commands::CliCommand;
use crate::output::{OutputFormat, OutputFormatter};
use artvector_core::{ArtVectorError, DatasetScope, Result};
use clap::Args;
use std::path::PathBuf;

/// Search embedded objects by text
///
/// # Examples
///
/// ```bash
/// artvector search "bronze statue"
/// artvector search "sunflowers" --k 5 --images-only --output json
/// ```
#[derive(Debug, Clone, Args)]
pub struct SearchArgs {
    /// The query text
    pub query: String,

    /// Number of results to return
    #[arg(short, long, default_value = "10")]
    pub k: i64,

    /// Restrict to one dataset (uuid)
    #[arg(short, long)]
    pub dataset: Option<String>,

    /// Restrict to objects carrying an image
    #[arg(long)]
    pub images_only: bool,

    /// Output format (pretty, json, yaml)
    #[arg(short, long, default_value = "pretty")]
    pub output: OutputFormat,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl SearchArgs {
    fn scope(&self) -> Result<DatasetScope> {
        match &self.dataset {
            Some(raw) => raw
                .parse()
                .map(DatasetScope::Dataset)
                .map_err(|_| ArtVectorError::validation(format!("Invalid dataset id: {}", raw))),
            None => Ok(DatasetScope::All),
        }
    }
}

impl CliCommand for SearchArgs {
    async fn execute(&self) -> Result<()> {
        let config = crate::load_config(self.config.as_deref())?;
        let service = crate::connect_service(&config).await?;

        let hits = service
            .search(&self.query, self.k, self.scope()?, self.images_only)
            .await?;

        if hits.is_empty() {
            println!("No results for '{}'", self.query);
            return Ok(());
        }

        let mut formatter = OutputFormatter::new(self.output);
        formatter.output(&hits)?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "search"
    }

    fn validate(&self) -> Result<()> {
        if self.query.trim().is_empty() {
            return Err(ArtVectorError::invalid_query("Query cannot be empty"));
        }
        self.scope().map(|_| ())
    }
}
