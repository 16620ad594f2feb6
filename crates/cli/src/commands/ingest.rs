//! Ingest command
//!
//! Loads already-mapped records from a JSON file (a top-level array or
//! newline-delimited objects) into a new dataset with embedding unset. Run
//! `artvector index` afterwards to embed them.

use crate::commands::CliCommand;
use artvector_core::{ArtVectorError, IngestRequest, RawRecord, Result};
use clap::Args;
use std::path::PathBuf;
use tracing::info;

/// Ingest records from a JSON file into a new dataset
///
/// # Examples
///
/// ```bash
/// # A JSON array of records
/// artvector ingest --file met_objects.json --name met
///
/// # Newline-delimited JSON works too
/// artvector ingest --file met_objects.ndjson --name met
/// ```
#[derive(Debug, Clone, Args)]
pub struct IngestArgs {
    /// JSON file containing the records
    #[arg(short, long)]
    pub file: PathBuf,

    /// Dataset display name; defaults to the file stem
    #[arg(short, long)]
    pub name: Option<String>,

    /// Source-type tag recorded on the dataset
    #[arg(long, default_value = "json")]
    pub source_type: String,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl IngestArgs {
    fn dataset_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| {
            self.file
                .file_stem()
                .map(|stem| stem.to_string_lossy().to_string())
                .unwrap_or_else(|| "dataset".to_string())
        })
    }

    /// Parse the input file into raw records
    ///
    /// # Errors
    ///
    /// Returns an ingest error if the file is neither a JSON array of
    /// objects nor newline-delimited JSON objects.
    pub fn read_records(content: &str) -> Result<Vec<RawRecord>> {
        let trimmed = content.trim_start();
        if trimmed.starts_with('[') {
            let records: Vec<RawRecord> = serde_json::from_str(content)
                .map_err(|e| ArtVectorError::ingest(format!("Invalid JSON array: {}", e)))?;
            return Ok(records);
        }

        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                serde_json::from_str(line)
                    .map_err(|e| ArtVectorError::ingest(format!("Invalid JSON line: {}", e)))
            })
            .collect()
    }
}

impl CliCommand for IngestArgs {
    async fn execute(&self) -> Result<()> {
        let config = crate::load_config(self.config.as_deref())?;
        let service = crate::connect_service(&config).await?;

        let content = std::fs::read_to_string(&self.file)?;
        let records = Self::read_records(&content)?;
        info!("Read {} records from {}", records.len(), self.file.display());

        let request = IngestRequest {
            name: self.dataset_name(),
            source_type: self.source_type.clone(),
            source_file: self
                .file
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_default(),
            fields: None,
            records,
        };

        let report = service.ingest(request).await?;
        println!(
            "Ingested {} objects into dataset {}",
            report.count, report.dataset_id
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "ingest"
    }

    fn validate(&self) -> Result<()> {
        if !self.file.exists() {
            return Err(ArtVectorError::not_found(format!(
                "File does not exist: {}",
                self.file.display()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_records_array() {
        let content = r#"[{"ObjectID": "1", "Title": "a"}, {"ObjectID": "2", "Title": "b"}]"#;
        let records = IngestArgs::read_records(content).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["Title"], "a");
    }

    #[test]
    fn test_read_records_ndjson() {
        let content = "{\"ObjectID\": \"1\"}\n\n{\"ObjectID\": \"2\"}\n";
        let records = IngestArgs::read_records(content).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_read_records_invalid() {
        assert!(IngestArgs::read_records("not json").is_err());
    }

    #[test]
    fn test_dataset_name_from_file_stem() {
        let args = IngestArgs {
            file: PathBuf::from("/data/met_objects.json"),
            name: None,
            source_type: "json".to_string(),
            config: None,
        };
        assert_eq!(args.dataset_name(), "met_objects");
    }

    #[test]
    fn test_validate_missing_file() {
        let args = IngestArgs {
            file: PathBuf::from("/does/not/exist.json"),
            name: None,
            source_type: "json".to_string(),
            config: None,
        };
        assert!(args.validate().is_err());
    }
}
