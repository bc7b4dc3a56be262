use anyhow::Result;
use offer_poster::config::AppConfig;
use offer_poster::db::PostedStore;
use offer_poster::errors::error_logging;
use offer_poster::filter;
use offer_poster::observability;
use offer_poster::offers::CuelinksClient;
use offer_poster::publisher::TelegramPublisher;
use offer_poster::runner::{run_once, RunSettings};
use tracing::info;

/// Load and validate configuration; nothing else runs if this fails
fn load_config() -> Result<AppConfig> {
    let config = AppConfig::from_env().and_then(|config| {
        config.validate()?;
        Ok(config)
    });

    match config {
        Ok(config) => {
            info!("{}", config.summary());
            Ok(config)
        }
        Err(e) => {
            error_logging::log_config_error(&e, "load_config");
            Err(anyhow::anyhow!("Missing or invalid configuration: {}", e))
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file first
    dotenvy::dotenv().ok();

    observability::init_tracing()?;

    let config = load_config()?;
    let merchant_filter = filter::from_config(&config.filter)?;

    let store = PostedStore::open(&config.db_path)
        .await
        .inspect_err(|e| error_logging::log_database_error(e, "open_store", None))?;
    let source = CuelinksClient::new(&config.offers)?;
    let publisher = TelegramPublisher::new(&config.telegram)?;
    let settings = RunSettings::from(&config);

    let summary = run_once(
        &source,
        &store,
        merchant_filter.as_ref(),
        &publisher,
        &settings,
    )
    .await?;

    store.close().await;

    println!("Posted {} offers", summary.posted);
    Ok(())
}
