//! Serve command - start the HTTP service

use anyhow::Result;
use clap::Args;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use crate::config::Settings;
use crate::http::{router, shutdown_signal, AppState};
use crate::store::{MemoryStore, PgStore, SharedStore};

/// Arguments for the serve command
#[derive(Args)]
pub struct ServeArgs {
    /// Bind address, overrides configuration
    #[arg(long)]
    pub bind: Option<String>,

    /// Run on the in-memory store instead of Postgres (data is lost on exit)
    #[arg(long)]
    pub in_memory: bool,

    /// Skip creating the bootstrap admin on startup
    #[arg(long)]
    pub no_admin_bootstrap: bool,
}

/// Execute the serve command
pub async fn execute(args: ServeArgs) -> Result<()> {
    let settings = Settings::load()?;

    let store: SharedStore = if args.in_memory {
        info!("Using in-memory store");
        Arc::new(MemoryStore::new())
    } else {
        info!("Connecting to database...");
        let store = PgStore::from_settings(&settings.database).await?;
        store.run_migrations().await?;
        Arc::new(store)
    };

    let state = AppState::new(store, &settings);

    if !args.no_admin_bootstrap {
        state
            .users
            .ensure_admin(&settings.auth.admin_email, &settings.auth.admin_password)
            .await?;
    }

    let address = args
        .bind
        .unwrap_or_else(|| settings.server.bind_address());
    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}
