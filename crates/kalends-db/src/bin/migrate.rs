use kalends_core::config::load_config;
use kalends_db::db::connection::create_pool;
use kalends_db::db::migrations::run_pending_migrations;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (filter_layer, filter_handle) = reload::Layer::new(EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt::layer().with_target(true).with_line_number(true))
        .init();

    let config = load_config()?;

    if let Ok(filter) = EnvFilter::try_new(config.logging.level.as_str()) {
        if let Err(e) = filter_handle.modify(|current| *current = filter) {
            tracing::warn!(error = %e, "Failed to update log filter from config");
        }
    } else {
        tracing::warn!(level = %config.logging.level, "Invalid log level in config, keeping info");
    }

    tracing::info!("Applying pending migrations");
    let applied = run_pending_migrations(&config.database.url).await?;

    // Confirm the migrated database accepts pooled async connections.
    let pool = create_pool(&config.database.url, u32::from(config.database.max_connections)).await?;
    drop(pool.get().await?);

    tracing::info!(applied, "Database is up to date");
    Ok(())
}
