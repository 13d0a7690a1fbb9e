use anyhow::Result;
use dotenvy::dotenv;
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub kafka_bootstrap_servers: String,
    pub kafka_topic: String,
    pub kafka_group_id: String,
    pub kafka_auto_offset_reset: String,
    pub kafka_sasl_mechanism: String,
    pub kafka_username: String,
    pub kafka_password: String,
    pub kafka_security_protocol: String,
    pub kafka_max_retries: u32,
    pub kafka_circuit_breaker_cooldown: u64,
    /// Unset means alerts are not persisted; the service degrades to
    /// observability-only instead of refusing to start.
    pub database_url: Option<String>,
    pub slack_bot_token: Option<String>,
    pub slack_channel: String,
    pub notify_timeout_secs: u64,
    pub dedup_window_secs: i64,
    pub fail_open: bool,
    pub api_bind: String,
    pub log_level: String,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        dotenv().ok();

        let kafka_bootstrap_servers =
            env::var("KAFKA_BOOTSTRAP_SERVERS").unwrap_or_else(|_| "localhost:9092".to_string());
        let kafka_topic =
            env::var("KAFKA_TOPIC").unwrap_or_else(|_| "shipment-risk-events".to_string());
        let kafka_group_id =
            env::var("KAFKA_GROUP_ID").unwrap_or_else(|_| "shipment-alerts-consumer".to_string());
        let kafka_auto_offset_reset =
            env::var("KAFKA_AUTO_OFFSET_RESET").unwrap_or_else(|_| "latest".to_string());
        let kafka_sasl_mechanism =
            env::var("KAFKA_SASL_MECHANISM").unwrap_or_else(|_| "SCRAM-SHA-256".to_string());
        let kafka_username = env::var("KAFKA_USERNAME").unwrap_or_default();
        let kafka_password = env::var("KAFKA_PASSWORD").unwrap_or_default();
        let kafka_security_protocol =
            env::var("KAFKA_SECURITY_PROTOCOL").unwrap_or_else(|_| "SASL_PLAINTEXT".to_string());
        let kafka_max_retries = env::var("KAFKA_MAX_RETRIES")
            .unwrap_or_else(|_| "5".to_string())
            .parse()
            .unwrap_or(5);
        let kafka_circuit_breaker_cooldown = env::var("KAFKA_CIRCUIT_BREAKER_COOLDOWN")
            .unwrap_or_else(|_| "300".to_string())
            .parse()
            .unwrap_or(300);

        let database_url = env::var("DATABASE_URL").ok().filter(|url| !url.is_empty());

        let slack_bot_token = env::var("SLACK_BOT_TOKEN").ok().filter(|t| !t.is_empty());
        let slack_channel = env::var("SLACK_CHANNEL").unwrap_or_else(|_| "#alerts".to_string());
        let notify_timeout_secs = env::var("NOTIFY_TIMEOUT_SECS")
            .unwrap_or_else(|_| "5".to_string())
            .parse()
            .unwrap_or(5);

        let dedup_window_secs = env::var("ALERT_DEDUP_WINDOW_SECS")
            .unwrap_or_else(|_| "3600".to_string())
            .parse()
            .unwrap_or(3600);
        let fail_open = env::var("ALERT_FAIL_OPEN")
            .map(|v| v.to_lowercase() != "false")
            .unwrap_or(true);

        let api_bind = env::var("API_BIND").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            kafka_bootstrap_servers,
            kafka_topic,
            kafka_group_id,
            kafka_auto_offset_reset,
            kafka_sasl_mechanism,
            kafka_username,
            kafka_password,
            kafka_security_protocol,
            kafka_max_retries,
            kafka_circuit_breaker_cooldown,
            database_url,
            slack_bot_token,
            slack_channel,
            notify_timeout_secs,
            dedup_window_secs,
            fail_open,
            api_bind,
            log_level,
        })
    }
}
