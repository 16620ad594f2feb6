//! Serve command

use crate::commands::CliCommand;
use artvector_core::Result;
use artvector_serve::ServerBuilder;
use clap::Args;
use std::path::PathBuf;
use tracing::info;

/// Start the ArtVector HTTP server
///
/// # Examples
///
/// ```bash
/// artvector serve
/// artvector serve --host 0.0.0.0 --port 8080
/// ```
#[derive(Debug, Clone, Args)]
pub struct ServeArgs {
    /// Host address to bind to
    #[arg(short = 'H', long)]
    pub host: Option<String>,

    /// Port to bind to
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Disable CORS
    #[arg(long)]
    pub no_cors: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl CliCommand for ServeArgs {
    async fn execute(&self) -> Result<()> {
        let config = crate::load_config(self.config.as_deref())?;
        let service = crate::connect_service(&config).await?;

        let host = self.host.clone().unwrap_or(config.server.host.clone());
        let port = self.port.unwrap_or(config.server.port);

        info!("Starting server on {}:{}", host, port);

        let server = ServerBuilder::new()
            .host(host)
            .port(port)
            .cors(!self.no_cors && config.server.cors_enabled)
            .max_request_size(config.server.max_request_size)
            .build(service);

        server.start().await
    }

    fn name(&self) -> &'static str {
        "serve"
    }
}
