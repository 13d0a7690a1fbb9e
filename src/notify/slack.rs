use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

use crate::error::NotifyError;
use crate::models::alert::AlertRecord;
use crate::models::severity::Severity;
use crate::notify::AlertNotifier;

const POST_MESSAGE_URL: &str = "https://slack.com/api/chat.postMessage";

pub fn severity_emoji(severity: Severity) -> &'static str {
    match severity {
        Severity::Low => "🟡",
        Severity::Medium => "🟠",
        Severity::High => "🔴",
        Severity::Critical => "🚨",
    }
}

pub fn severity_color(severity: Severity) -> &'static str {
    match severity {
        Severity::Low => "#ffcc00",
        Severity::Medium => "#ff9900",
        Severity::High => "#ff3300",
        Severity::Critical => "#cc0000",
    }
}

/// Posts alerts to a Slack channel via `chat.postMessage`. Only constructed
/// when a bot token is configured; delivery failures are reported to the
/// dispatcher, which logs and swallows them.
pub struct SlackNotifier {
    client: reqwest::Client,
    token: String,
    channel: String,
}

impl SlackNotifier {
    /// The timeout bounds the whole request so a slow channel cannot stall
    /// alert creation.
    pub fn new(
        token: impl Into<String>,
        channel: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            token: token.into(),
            channel: channel.into(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct PostMessageResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    ts: Option<String>,
}

#[async_trait]
impl AlertNotifier for SlackNotifier {
    fn name(&self) -> &'static str {
        "slack"
    }

    async fn notify(&self, alert: &AlertRecord) -> Result<(), NotifyError> {
        let payload = build_payload(&self.channel, alert);

        let response: PostMessageResponse = self
            .client
            .post(POST_MESSAGE_URL)
            .bearer_auth(&self.token)
            .json(&payload)
            .send()
            .await?
            .json()
            .await?;

        if response.ok {
            debug!(
                ts = response.ts.as_deref().unwrap_or(""),
                channel = %self.channel,
                "Sent Slack notification"
            );
            Ok(())
        } else {
            Err(NotifyError::Channel(
                response.error.unwrap_or_else(|| "unknown error".to_string()),
            ))
        }
    }
}

fn header_text(alert: &AlertRecord) -> String {
    format!(
        "{} {} - {} SEVERITY",
        severity_emoji(alert.severity),
        alert.title,
        alert.severity.as_str().to_uppercase()
    )
}

/// Builds the full `chat.postMessage` body: header, shipment/severity
/// fields, details, optional prediction fields, and a color-keyed
/// attachment carrying the timestamp.
pub fn build_payload(channel: &str, alert: &AlertRecord) -> Value {
    let mut blocks = vec![
        json!({
            "type": "header",
            "text": { "type": "plain_text", "text": header_text(alert) }
        }),
        json!({
            "type": "section",
            "fields": [
                { "type": "mrkdwn", "text": format!("*Shipment ID:*\n{}", alert.shipment_id) },
                { "type": "mrkdwn", "text": format!("*Severity:*\n{}", alert.severity) }
            ]
        }),
        json!({
            "type": "section",
            "text": { "type": "mrkdwn", "text": format!("*Details:*\n{}", alert.message) }
        }),
    ];

    if let Some(prediction) = prediction_fields(alert) {
        blocks.push(prediction);
    }

    json!({
        "channel": channel,
        "text": header_text(alert),
        "blocks": blocks,
        "attachments": [{
            "color": severity_color(alert.severity),
            "fields": [{
                "title": "Timestamp",
                "value": Utc::now().format("%Y-%m-%d %H:%M:%S").to_string(),
                "short": true
            }]
        }]
    })
}

fn prediction_fields(alert: &AlertRecord) -> Option<Value> {
    let mut fields = Vec::new();

    if let Some(probability) = alert.metadata.get("delay_probability").and_then(Value::as_f64) {
        fields.push(json!({
            "type": "mrkdwn",
            "text": format!("*Delay Probability:*\n{:.1}%", probability * 100.0)
        }));
    }

    if let Some(minutes) = alert.metadata.get("estimated_delay_minutes").and_then(as_minutes) {
        fields.push(json!({
            "type": "mrkdwn",
            "text": format!("*Est. Delay:*\n{} mins", minutes)
        }));
    }

    if fields.is_empty() {
        None
    } else {
        Some(json!({ "type": "section", "fields": fields }))
    }
}

// Producers send the delay either as an integer or a float.
fn as_minutes(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|v| v.round() as i64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::alert::AlertCandidate;
    use serde_json::Map;
    use uuid::Uuid;

    fn delay_alert() -> AlertRecord {
        let mut metadata = Map::new();
        metadata.insert("delay_probability".to_string(), json!(0.82));
        metadata.insert("estimated_delay_minutes".to_string(), json!(95));

        AlertCandidate {
            shipment_id: "SH001".to_string(),
            alert_type: "delay_prediction".to_string(),
            severity: Severity::High,
            title: "Delay Risk".to_string(),
            message: "ETA slipping".to_string(),
            metadata,
            triggered_at: None,
        }
        .into_record(Uuid::new_v4())
    }

    #[test]
    fn test_payload_renders_prediction_metadata() {
        let payload = build_payload("#alerts", &delay_alert());
        let rendered = payload.to_string();

        assert!(rendered.contains("82.0%"));
        assert!(rendered.contains("95 mins"));
        assert!(rendered.contains("Shipment ID"));
        assert!(rendered.contains("SH001"));
        assert!(rendered.contains("ETA slipping"));
    }

    #[test]
    fn test_payload_header_and_color_follow_severity() {
        let payload = build_payload("#alerts", &delay_alert());

        let header = payload["blocks"][0]["text"]["text"].as_str().unwrap();
        assert!(header.contains("Delay Risk"));
        assert!(header.contains("HIGH SEVERITY"));

        assert_eq!(payload["attachments"][0]["color"], "#ff3300");
        assert_eq!(payload["channel"], "#alerts");
    }

    #[test]
    fn test_payload_omits_prediction_section_without_metadata() {
        let mut alert = delay_alert();
        alert.metadata = Map::new();

        let payload = build_payload("#alerts", &alert);
        assert_eq!(payload["blocks"].as_array().unwrap().len(), 3);
        assert!(!payload.to_string().contains("Delay Probability"));
    }

    #[test]
    fn test_fractional_minutes_are_rounded() {
        let mut alert = delay_alert();
        alert
            .metadata
            .insert("estimated_delay_minutes".to_string(), json!(95.4));

        let payload = build_payload("#alerts", &alert);
        assert!(payload.to_string().contains("95 mins"));
    }

    #[test]
    fn test_timestamp_field_format() {
        let payload = build_payload("#alerts", &delay_alert());
        let timestamp = payload["attachments"][0]["fields"][0]["value"]
            .as_str()
            .unwrap();

        // YYYY-MM-DD HH:MM:SS
        assert_eq!(timestamp.len(), 19);
        assert_eq!(&timestamp[4..5], "-");
        assert_eq!(&timestamp[10..11], " ");
        assert_eq!(&timestamp[13..14], ":");
    }

    #[test]
    fn test_color_ramp_covers_all_severities() {
        let colors: Vec<&str> = [
            Severity::Low,
            Severity::Medium,
            Severity::High,
            Severity::Critical,
        ]
        .into_iter()
        .map(severity_color)
        .collect();

        assert_eq!(colors, vec!["#ffcc00", "#ff9900", "#ff3300", "#cc0000"]);
    }
}
