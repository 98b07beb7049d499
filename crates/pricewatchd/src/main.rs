use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};

use catalog_client::{CatalogConfig, HttpCatalog, HttpResolver};
use chat_notifier::{ChatConfig, ChatNotifier};
use database::{action_config, Database};
use pipeline::{
    ActionProcessor, ActionScheduler, AddProductConfig, AddProductProcessor, CheckProductProcessor,
    NotifyPriceProcessor,
};

#[derive(Debug, Parser)]
#[command(name = "pricewatchd")]
#[command(about = "Run the price-watch action pipeline")]
struct Args {
    /// SQLite database URL
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite:data/pricewatch.db?mode=rwc")]
    database_url: String,

    /// Base URL of the catalog API
    #[arg(long, env = "CATALOG_URL")]
    catalog_url: String,

    /// Catalog API key (bearer token)
    #[arg(long, env = "CATALOG_API_KEY")]
    catalog_api_key: Option<String>,

    /// Catalog request timeout in seconds
    #[arg(long, default_value_t = 30)]
    catalog_timeout_secs: u64,

    /// Base URL of the chat bot API
    #[arg(long, env = "CHAT_API_URL", default_value = "https://api.telegram.org")]
    chat_api_url: String,

    /// Chat bot token
    #[arg(long, env = "CHAT_TOKEN")]
    chat_token: String,

    /// Accepted catalog shop domain (repeatable)
    #[arg(long = "catalog-domain", default_value = "amazon.com")]
    catalog_domains: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pricewatchd=info".parse()?)
                .add_directive("pipeline=info".parse()?)
                .add_directive("database=info".parse()?),
        )
        .init();

    let args = Args::parse();

    let db = Database::connect(&args.database_url).await?;
    db.migrate().await?;
    info!(url = %args.database_url, "database ready");

    let catalog_config = {
        let mut config = CatalogConfig::new(&args.catalog_url)
            .with_timeout(Duration::from_secs(args.catalog_timeout_secs));
        if let Some(api_key) = &args.catalog_api_key {
            config = config.with_api_key(api_key);
        }
        config
    };
    let catalog = Arc::new(HttpCatalog::new(catalog_config)?);
    let resolver = Arc::new(HttpResolver::new()?);
    let channel = Arc::new(ChatNotifier::new(ChatConfig::new(
        &args.chat_api_url,
        &args.chat_token,
    ))?);

    let processors: Vec<Arc<dyn ActionProcessor>> = vec![
        Arc::new(AddProductProcessor::new(
            db.pool().clone(),
            catalog.clone(),
            resolver,
            None,
            AddProductConfig {
                catalog_domains: args.catalog_domains,
            },
        )),
        Arc::new(CheckProductProcessor::new(db.pool().clone(), catalog)),
        Arc::new(NotifyPriceProcessor::new(db.pool().clone(), channel)),
    ];

    if action_config::find_enabled(db.pool()).await?.is_empty() {
        warn!("no enabled action configs; the scheduler will start zero timers");
    }

    let scheduler = ActionScheduler::start(db.pool(), processors).await?;
    info!(tasks = scheduler.task_count(), "scheduler running");

    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received, stopping scheduler");
    scheduler.stop();
    db.close().await;

    Ok(())
}
