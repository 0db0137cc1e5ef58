use std::sync::Arc;

use anyhow::Context;
use log::info;

use intervue::models::Role;
use intervue::orchestrator::NewPrincipal;
use intervue::{AppConfig, Error, OpenAiCompletionClient, Orchestrator, PgStore};

/// Process entry point: loads configuration, builds the connection pool and
/// the completion client, initializes the schema and bootstraps the first
/// admin principal. All lifecycles are owned here and injected downward;
/// nothing is constructed as a module-load side effect.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = AppConfig::from_env();
    info!("Intervue starting");

    let store = PgStore::connect(&config.database)
        .await
        .context("database connection failed")?;
    store.init_schema().await.context("schema init failed")?;

    let completion = OpenAiCompletionClient::new(config.completion.clone());
    let orchestrator = Orchestrator::new(Arc::new(store), Arc::new(completion));

    let admin = NewPrincipal {
        name: std::env::var("ADMIN_NAME").unwrap_or_else(|_| "Administrator".to_string()),
        email: std::env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@intervue.local".to_string()),
        department: std::env::var("ADMIN_DEPARTMENT").unwrap_or_else(|_| "Engineering".to_string()),
        role: Role::Admin,
    };
    match orchestrator.ensure_admin(admin).await {
        Ok(created) => info!("Bootstrap admin created: {}", created.email),
        Err(Error::InvalidState(_)) => info!("Admin already present, bootstrap skipped"),
        Err(e) => return Err(e).context("admin bootstrap failed"),
    }

    info!("Intervue ready");
    Ok(())
}
