// Validator staking data from a Cosmos-style LCD endpoint via ureq.
// ureq is blocking; each fetch runs on tokio's blocking pool.

use crate::config::ValidatorConfig;
use crate::error::FetchError;
use crate::models::{MetricSnapshot, ValidatorResponse};
use std::future::Future;
use std::time::Duration;

/// Fractional digits in the on-chain token amount. Fixed by the LCD schema, not configurable.
pub const TOKEN_DECIMALS: u32 = 9;
const TOKEN_SCALE: u128 = 10u128.pow(TOKEN_DECIMALS);

/// Source of one metric observation per call.
pub trait MetricSource: Send + Sync {
    fn fetch(&self) -> impl Future<Output = Result<MetricSnapshot, FetchError>> + Send;
}

pub struct LcdValidatorRepo {
    agent: ureq::Agent,
    url: String,
}

impl LcdValidatorRepo {
    pub fn new(config: &ValidatorConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build();
        let url = format!(
            "{}/staking/validators/{}",
            config.lcd_url.trim_end_matches('/'),
            config.address
        );
        Self { agent, url }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl MetricSource for LcdValidatorRepo {
    async fn fetch(&self) -> Result<MetricSnapshot, FetchError> {
        let agent = self.agent.clone();
        let url = self.url.clone();
        tracing::debug!(repo = "lcd", operation = "fetch", url = %url, "fetching validator");
        tokio::task::spawn_blocking(move || fetch_blocking(&agent, &url))
            .await
            .map_err(|e| FetchError::new(format!("fetch task failed: {}", e)))?
    }
}

fn fetch_blocking(agent: &ureq::Agent, url: &str) -> Result<MetricSnapshot, FetchError> {
    let response = agent.get(url).call().map_err(|e| match e {
        ureq::Error::Status(code, resp) => FetchError::new(format!(
            "{} {} for url: {}",
            code,
            resp.status_text(),
            url
        )),
        ureq::Error::Transport(t) => FetchError::new(t.to_string()),
    })?;
    let body = response
        .into_string()
        .map_err(|e| FetchError::new(format!("reading response from {}: {}", url, e)))?;
    parse_validator_payload(&body)
}

/// Decodes an LCD validator body into a snapshot, truncating tokens to whole units.
pub fn parse_validator_payload(body: &str) -> Result<MetricSnapshot, FetchError> {
    let payload: ValidatorResponse = serde_json::from_str(body)
        .map_err(|e| FetchError::new(format!("invalid validator payload: {}", e)))?;
    let validator = payload.msg.validator;
    let raw = parse_token_amount(validator.tokens.get())?;
    Ok(MetricSnapshot {
        value: to_whole_units(raw)?,
        label: validator.description.moniker,
    })
}

/// Accepts a JSON string of decimal digits or a bare non-negative JSON integer of any width.
fn parse_token_amount(json: &str) -> Result<u128, FetchError> {
    let digits = if json.starts_with('"') {
        serde_json::from_str::<String>(json)
            .map_err(|e| FetchError::new(format!("invalid msg.validator.tokens {}: {}", json, e)))?
    } else {
        json.to_string()
    };
    digits
        .trim()
        .parse::<u128>()
        .map_err(|e| FetchError::new(format!("invalid msg.validator.tokens {}: {}", json, e)))
}

/// Drops the fractional digits (floor, never rounds).
pub fn to_whole_units(raw: u128) -> Result<u64, FetchError> {
    u64::try_from(raw / TOKEN_SCALE)
        .map_err(|_| FetchError::new(format!("token amount {} out of range", raw)))
}
