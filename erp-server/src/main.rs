//! ERP Server CLI
//!
//! Provides commands for:
//! - `serve`: Start the HTTP service
//! - `init-admin`: Create the bootstrap admin account

use anyhow::Result;
use clap::Parser;

use erp_common::logging::{init_logging, LogConfig};
use erp_server::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize logging
    init_logging(LogConfig::from_env()).map_err(|e| anyhow::anyhow!(e))?;

    // Parse CLI arguments
    let cli = Cli::parse();

    // Execute command
    match cli.command {
        Commands::Serve(args) => {
            erp_server::cli::serve::execute(args).await?;
        }
        Commands::InitAdmin(args) => {
            erp_server::cli::init_admin::execute(args).await?;
        }
    }

    Ok(())
}
