// Notification transport: Telegram Bot API `sendMessage` via ureq.

use crate::config::TelegramConfig;
use crate::error::NotifyError;
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;

/// Delivers one text message to the configured destination.
pub trait Notifier: Send + Sync {
    fn deliver(&self, text: &str) -> impl Future<Output = Result<(), NotifyError>> + Send;
}

pub struct TelegramNotifier {
    agent: ureq::Agent,
    /// `{api_url}/bot{token}/sendMessage`; contains the token, never logged.
    endpoint: String,
    channel_id: String,
}

/// Envelope of every Bot API reply.
#[derive(Debug, Deserialize)]
struct TelegramReply {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

impl TelegramNotifier {
    pub fn new(config: &TelegramConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build();
        Self {
            agent,
            endpoint: format!(
                "{}/bot{}/sendMessage",
                config.api_url.trim_end_matches('/'),
                config.bot_token
            ),
            channel_id: config.channel_id.clone(),
        }
    }
}

impl Notifier for TelegramNotifier {
    async fn deliver(&self, text: &str) -> Result<(), NotifyError> {
        let agent = self.agent.clone();
        let endpoint = self.endpoint.clone();
        tracing::debug!(
            repo = "telegram",
            operation = "deliver",
            channel_id = %self.channel_id,
            "sending message"
        );
        let body = serde_json::json!({
            "chat_id": self.channel_id,
            "text": text,
        });
        tokio::task::spawn_blocking(move || send_message(&agent, &endpoint, body))
            .await
            .map_err(|e| NotifyError::new(format!("notify task failed: {}", e)))?
    }
}

fn send_message(
    agent: &ureq::Agent,
    endpoint: &str,
    body: serde_json::Value,
) -> Result<(), NotifyError> {
    match agent.post(endpoint).send_json(body) {
        Ok(resp) => {
            let reply: TelegramReply = resp
                .into_json()
                .map_err(|e| NotifyError::new(format!("invalid telegram reply: {}", e)))?;
            if reply.ok {
                Ok(())
            } else {
                Err(NotifyError::new(format!(
                    "telegram rejected message: {}",
                    reply.description.as_deref().unwrap_or("no description")
                )))
            }
        }
        Err(ureq::Error::Status(code, resp)) => {
            let description = resp
                .into_json::<TelegramReply>()
                .ok()
                .and_then(|r| r.description);
            Err(NotifyError::new(match description {
                Some(d) => format!("telegram returned status {}: {}", code, d),
                None => format!("telegram returned status {}", code),
            }))
        }
        // Transport errors print the request URL, which embeds the token; report kind only.
        Err(ureq::Error::Transport(t)) => Err(NotifyError::new(match t.message() {
            Some(m) => format!("telegram transport error: {}: {}", t.kind(), m),
            None => format!("telegram transport error: {}", t.kind()),
        })),
    }
}
