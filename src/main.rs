use std::sync::Arc;
use std::time::Duration;

use shipment_alerts::api::{self, AppState};
use shipment_alerts::config::AppConfig;
use shipment_alerts::db::{self, postgres::PgAlertStore, AlertStore};
use shipment_alerts::kafka;
use shipment_alerts::manager::AlertManager;
use shipment_alerts::notify::{console::ConsoleNotifier, slack::SlackNotifier, NotificationDispatcher};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load config
    let config = AppConfig::load()?;

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.log_level))
        .init();

    info!("Starting Shipment Alerts Service...");

    // Init DB (optional: without it the service only notifies)
    let store: Option<Arc<dyn AlertStore>> = match &config.database_url {
        Some(url) => {
            let pool = db::init_pool(url).await?;
            info!("Connected to database");
            Some(Arc::new(PgAlertStore::new(pool)))
        }
        None => {
            warn!("DATABASE_URL not configured, alerts will not be persisted");
            None
        }
    };

    // Notification sinks
    let mut dispatcher = NotificationDispatcher::new().with_sink(Arc::new(ConsoleNotifier));
    if let Some(token) = &config.slack_bot_token {
        let slack = SlackNotifier::new(
            token,
            &config.slack_channel,
            Duration::from_secs(config.notify_timeout_secs),
        )?;
        dispatcher = dispatcher.with_sink(Arc::new(slack));
        info!(channel = %config.slack_channel, "Slack notifications enabled");
    }

    let manager = Arc::new(
        AlertManager::new(store, dispatcher)
            .with_dedup_window(chrono::Duration::seconds(config.dedup_window_secs))
            .with_fail_open(config.fail_open),
    );

    // HTTP API
    let router = api::create_router(AppState {
        manager: manager.clone(),
    });
    let listener = tokio::net::TcpListener::bind(&config.api_bind).await?;
    info!("API listening on {}", config.api_bind);

    // Consume risk events in the background while serving requests.
    let consumer_config = config.clone();
    tokio::spawn(async move {
        if let Err(e) = kafka::start_risk_consumer(&consumer_config, manager).await {
            error!("Kafka consumer terminated: {}", e);
        }
    });

    axum::serve(listener, router).await?;

    Ok(())
}
