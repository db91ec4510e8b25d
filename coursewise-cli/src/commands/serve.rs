//! coursewise serve command for running the HTTP server

use anyhow::Result;
use clap::Args;
use coursewise_server::{CoursewiseServer, ServerConfig};
use tracing::info;

use crate::bootstrap::App;
use crate::config::ConfigLoader;

/// Arguments for the serve command
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Port to listen on (defaults to the configured port)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Host to bind to (defaults to the configured host)
    #[arg(long)]
    pub host: Option<String>,
}

/// Run the server in the foreground until Ctrl-C
pub async fn run(args: ServeArgs) -> Result<()> {
    let config = ConfigLoader::load()?;
    let server_config = ServerConfig::new(
        args.host.unwrap_or_else(|| config.server.host.clone()),
        args.port.unwrap_or(config.server.port),
    );

    let app = App::build(&config).await?;
    info!(
        "Starting coursewise server on {}:{}",
        server_config.host, server_config.port
    );

    CoursewiseServer::new(server_config, app.into_state())
        .run()
        .await?;
    Ok(())
}
