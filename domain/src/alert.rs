//! Operator alerts.
//!
//! Fatal bot errors page a human through a configured webhook URL. Alert
//! delivery is best effort: a failed POST is logged and dropped, it never
//! fails the transition that produced it.

use log::*;
use serde_json::json;
use service::config::Config;

/// A formatted alert waiting to leave the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorAlert {
    message: String,
}

impl OperatorAlert {
    pub fn new(message: String) -> Self {
        Self { message }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// POSTs the alert to the configured webhook, if one is configured.
pub async fn send_operator_alert(config: &Config, operator_alert: &OperatorAlert) {
    let Some(url) = config.operator_alert_webhook_url() else {
        debug!(
            "No operator alert webhook configured, dropping alert: {}",
            operator_alert.message()
        );
        return;
    };

    let client = match reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(
            config.webhook_request_timeout_secs,
        ))
        .build()
    {
        Ok(client) => client,
        Err(err) => {
            error!("Failed to build operator alert client: {err}");
            return;
        }
    };

    let result = client
        .post(&url)
        .json(&json!({ "text": operator_alert.message() }))
        .send()
        .await;

    match result {
        Ok(response) if response.status().is_success() => {
            debug!("Operator alert delivered");
        }
        Ok(response) => {
            warn!("Operator alert endpoint returned {}", response.status());
        }
        Err(err) => {
            warn!("Failed to deliver operator alert: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[tokio::test]
    async fn alerts_are_dropped_quietly_without_a_configured_url() {
        let config = Config::parse_from(["meetbot_platform"]);
        let operator_alert = OperatorAlert::new(
            "Bot bot_0123456789abcdef encountered a fatal error. Event sub type: \
             heartbeat_timeout. Last bot resource snapshot: None found."
                .to_string(),
        );
        // Must not panic or attempt any network call.
        send_operator_alert(&config, &operator_alert).await;
        assert!(operator_alert.message().contains("heartbeat_timeout"));
    }
}
