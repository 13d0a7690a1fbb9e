use crate::config::AppConfig;
use crate::manager::AlertManager;
use crate::models::alert::AlertCandidate;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::message::Message;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Starts the risk-event consumer with SASL/SCRAM authentication and a
/// circuit breaker mechanism. Each decoded candidate is handed to the alert
/// manager; malformed payloads are logged and skipped.
pub async fn start_risk_consumer(
    config: &AppConfig,
    manager: Arc<AlertManager>,
) -> anyhow::Result<()> {
    info!("Initializing Kafka consumer for topic: {}", config.kafka_topic);

    let mut client_config = ClientConfig::new();
    client_config
        .set("bootstrap.servers", &config.kafka_bootstrap_servers)
        .set("group.id", &config.kafka_group_id)
        .set("auto.offset.reset", &config.kafka_auto_offset_reset)
        // SASL Configuration
        .set("security.protocol", &config.kafka_security_protocol)
        .set("sasl.mechanism", &config.kafka_sasl_mechanism)
        .set("sasl.username", &config.kafka_username)
        .set("sasl.password", &config.kafka_password);

    let consumer: StreamConsumer = client_config.create()?;

    consumer.subscribe(&[&config.kafka_topic])?;
    info!("Subscribed to topic: {}", config.kafka_topic);

    let mut consecutive_failures = 0;
    let max_retries = config.kafka_max_retries;
    let cooldown_duration = Duration::from_secs(config.kafka_circuit_breaker_cooldown);

    loop {
        // Circuit Breaker Check
        if consecutive_failures >= max_retries {
            warn!(
                "Circuit breaker tripped ({} consecutive failures)! Sleeping for {} seconds...",
                consecutive_failures, config.kafka_circuit_breaker_cooldown
            );
            tokio::time::sleep(cooldown_duration).await;
            consecutive_failures = 0;
            info!("Circuit breaker reset. Resuming consumption.");
        }

        match consumer.recv().await {
            Ok(m) => {
                // Success: Reset failure counter
                consecutive_failures = 0;

                let payload = match m.payload() {
                    None => {
                        warn!("Received empty payload from Kafka");
                        continue;
                    }
                    Some(p) => p,
                };

                let candidate: AlertCandidate = match serde_json::from_slice(payload) {
                    Ok(c) => c,
                    Err(e) => {
                        warn!("Failed to parse risk event: {}", e);
                        continue;
                    }
                };

                let manager = manager.clone();

                // Process the event in a background task to not block the consumer loop
                tokio::spawn(async move {
                    match manager.create_alert(candidate).await {
                        Ok(_) => {}
                        Err(e) => error!("Error creating alert: {}", e),
                    }
                });
            }
            Err(e) => {
                error!(
                    "Kafka error: {}. Incrementing failure count ({} / {})",
                    e,
                    consecutive_failures + 1,
                    max_retries
                );
                consecutive_failures += 1;

                // Small delay to prevent tight loop in case of minor network glitches
                tokio::time::sleep(Duration::from_millis(500)).await;
            }
        }
    }
}
