//! Index command
//!
//! Drives the embedding batch processor: by default loops until every
//! pending object is embedded, with `--once` running a single batch. There
//! is no cancellation primitive; stopping the loop between batches is the
//! way to stop indexing, and the batch already in flight runs to
//! completion.

use crate::commands::CliCommand;
use artvector_core::{ArtVectorError, Result};
use clap::Args;
use std::path::PathBuf;
use tracing::{info, warn};

/// Embed pending objects in batches
///
/// # Examples
///
/// ```bash
/// # Drain the whole backlog
/// artvector index
///
/// # One batch of 64, then stop
/// artvector index --batch-size 64 --once
/// ```
#[derive(Debug, Clone, Args)]
pub struct IndexArgs {
    /// Objects per embedding batch
    #[arg(short, long)]
    pub batch_size: Option<usize>,

    /// Run a single batch instead of looping until done
    #[arg(long)]
    pub once: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl CliCommand for IndexArgs {
    async fn execute(&self) -> Result<()> {
        let config = crate::load_config(self.config.as_deref())?;
        let batch_size = self.batch_size.unwrap_or(config.indexing.batch_size);
        let service = crate::connect_service(&config).await?;

        loop {
            let outcome = service.process_batch(batch_size).await?;
            println!(
                "Embedded {} objects ({} remaining of {})",
                outcome.embedded_this_batch, outcome.remaining, outcome.total
            );

            if outcome.done {
                info!("Indexing complete");
                break;
            }
            if self.once {
                break;
            }
            if outcome.embedded_this_batch == 0 {
                // Only unembeddable objects are left; looping further would
                // reselect and skip them forever
                warn!(
                    "{} pending objects could not be embedded; stopping",
                    outcome.remaining
                );
                break;
            }
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "index"
    }

    fn validate(&self) -> Result<()> {
        if self.batch_size == Some(0) {
            return Err(ArtVectorError::validation(
                "Batch size must be greater than 0",
            ));
        }
        Ok(())
    }
}
