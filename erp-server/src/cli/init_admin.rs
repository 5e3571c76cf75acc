//! Init-admin command - create the bootstrap admin account

use anyhow::Result;
use clap::Args;
use std::sync::Arc;
use tracing::info;

use crate::auth::{RevocationList, TokenKeys};
use crate::config::Settings;
use crate::store::{PgStore, SharedStore};
use crate::users::UserService;

/// Arguments for the init-admin command
#[derive(Args)]
pub struct InitAdminArgs {
    /// Admin email, overrides configuration
    #[arg(long)]
    pub email: Option<String>,

    /// Admin password, overrides configuration
    #[arg(long)]
    pub password: Option<String>,
}

/// Execute the init-admin command
pub async fn execute(args: InitAdminArgs) -> Result<()> {
    let settings = Settings::load()?;

    let store = PgStore::from_settings(&settings.database).await?;
    store.run_migrations().await?;
    let store: SharedStore = Arc::new(store);

    let users = UserService::new(
        store,
        TokenKeys::from_settings(&settings.auth),
        Arc::new(RevocationList::new()),
    );

    let email = args.email.unwrap_or_else(|| settings.auth.admin_email.clone());
    let password = args
        .password
        .unwrap_or_else(|| settings.auth.admin_password.clone());

    users.ensure_admin(&email, &password).await?;
    info!("Admin bootstrap complete");
    Ok(())
}
