//! Init command

use crate::commands::CliCommand;
use artvector_core::{ArtVectorConfig, ArtVectorError, Result};
use clap::Args;
use std::path::PathBuf;

/// Write a default configuration file
///
/// # Examples
///
/// ```bash
/// artvector init
/// artvector init --config /etc/artvector/config.yaml --force
/// ```
#[derive(Debug, Clone, Args)]
pub struct InitArgs {
    /// Configuration file path to write
    #[arg(short, long, default_value = "artvector.yaml")]
    pub config: PathBuf,

    /// Overwrite an existing file
    #[arg(short, long)]
    pub force: bool,
}

impl CliCommand for InitArgs {
    async fn execute(&self) -> Result<()> {
        let yaml = ArtVectorConfig::default().to_yaml()?;
        std::fs::write(&self.config, yaml)?;
        println!("Wrote default configuration to {}", self.config.display());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "init"
    }

    fn validate(&self) -> Result<()> {
        if self.config.exists() && !self.force {
            return Err(ArtVectorError::validation(format!(
                "{} already exists; use --force to overwrite",
                self.config.display()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::execute_command;

    #[tokio::test]
    async fn test_init_writes_parseable_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("artvector.yaml");

        let args = InitArgs {
            config: path.clone(),
            force: false,
        };
        execute_command(args).await.unwrap();

        let config = ArtVectorConfig::load(Some(&path)).unwrap();
        assert_eq!(config.ollama.embedding_model, "all-minilm");
    }

    #[tokio::test]
    async fn test_init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("artvector.yaml");
        std::fs::write(&path, "existing: true").unwrap();

        let args = InitArgs {
            config: path.clone(),
            force: false,
        };
        assert!(execute_command(args).await.is_err());

        let args = InitArgs {
            config: path,
            force: true,
        };
        assert!(execute_command(args).await.is_ok());
    }
}
