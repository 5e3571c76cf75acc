//! Command-line interface
//!
//! Provides CLI commands for the ERP server.

pub mod init_admin;
pub mod serve;

use clap::{Parser, Subcommand};

/// ERP Server CLI
#[derive(Parser)]
#[command(name = "erp-server")]
#[command(about = "ERP backend: inventory, orders, clients, analytics")]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP service
    Serve(serve::ServeArgs),
    /// Create the bootstrap admin account
    InitAdmin(init_admin::InitAdminArgs),
}
