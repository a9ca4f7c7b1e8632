use serde::Deserialize;
use std::str::FromStr;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub validator: ValidatorConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ValidatorConfig {
    /// LCD REST base URL, e.g. `https://lcd.example.org`.
    #[serde(default)]
    pub lcd_url: String,
    /// Validator operator address queried under `/staking/validators/`.
    #[serde(default)]
    pub address: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            lcd_url: String::new(),
            address: String::new(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

#[derive(Clone, Deserialize)]
pub struct TelegramConfig {
    #[serde(default)]
    pub bot_token: String,
    /// Chat or channel id (`-100...` or `@name`).
    #[serde(default)]
    pub channel_id: String,
    #[serde(default = "default_telegram_api_url")]
    pub api_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            channel_id: String::new(),
            api_url: default_telegram_api_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

// Keeps the bot token out of `{:?}` output (startup logs, test failures).
impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &"<redacted>")
            .field("channel_id", &self.channel_id)
            .field("api_url", &self.api_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleConfig {
    /// Seconds between checks when `cron` is not set.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Optional cron expression (with seconds field, e.g. "0 0 9 * * *"). Evaluated in UTC.
    #[serde(default)]
    pub cron: Option<String>,
    /// Run one check immediately at startup, before the first scheduled tick.
    #[serde(default = "default_run_on_start")]
    pub run_on_start: bool,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            cron: None,
            run_on_start: default_run_on_start(),
        }
    }
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_telegram_api_url() -> String {
    "https://api.telegram.org".into()
}

fn default_interval_secs() -> u64 {
    24 * 60 * 60
}

fn default_run_on_start() -> bool {
    true
}

/// Environment variables that override the matching config keys.
pub const ENV_LCD_URL: &str = "LCD_URL";
pub const ENV_VALIDATOR_ADDRESS: &str = "VALIDATOR_ADDRESS";
pub const ENV_TELEGRAM_BOT_TOKEN: &str = "TELEGRAM_BOT_TOKEN";
pub const ENV_TELEGRAM_CHANNEL_ID: &str = "TELEGRAM_CHANNEL_ID";

impl AppConfig {
    /// Reads `CONFIG_FILE` (default `config.toml`), then applies environment overrides.
    /// A missing file is fine as long as the environment supplies every required value.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = match std::fs::read_to_string(&path) {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path, "config file not found; using environment only");
                String::new()
            }
            Err(e) => return Err(anyhow::anyhow!("reading {}: {}", path, e)),
        };
        Self::load_with_env(&s, |key| std::env::var(key).ok())
    }

    /// Parse and validate config from a string (e.g. for tests). No environment overrides.
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        Self::load_with_env(s, |_| None)
    }

    /// Parse `s`, overlay values returned by `env` for the `ENV_*` keys, then validate.
    pub fn load_with_env(s: &str, env: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut config: AppConfig = toml::from_str(s)?;
        config.apply_env(env);
        config.validator.lcd_url = config.validator.lcd_url.trim_end_matches('/').to_string();
        config.telegram.api_url = config.telegram.api_url.trim_end_matches('/').to_string();
        config.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) {
        let lookup = |key: &str| env(key).filter(|v| !v.trim().is_empty());
        if let Some(v) = lookup(ENV_LCD_URL) {
            self.validator.lcd_url = v;
        }
        if let Some(v) = lookup(ENV_VALIDATOR_ADDRESS) {
            self.validator.address = v;
        }
        if let Some(v) = lookup(ENV_TELEGRAM_BOT_TOKEN) {
            self.telegram.bot_token = v;
        }
        if let Some(v) = lookup(ENV_TELEGRAM_CHANNEL_ID) {
            self.telegram.channel_id = v;
        }
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            !self.validator.lcd_url.is_empty(),
            "validator.lcd_url must be non-empty (or set {})",
            ENV_LCD_URL
        );
        anyhow::ensure!(
            self.validator.lcd_url.starts_with("http://")
                || self.validator.lcd_url.starts_with("https://"),
            "validator.lcd_url must start with http:// or https://, got {}",
            self.validator.lcd_url
        );
        anyhow::ensure!(
            !self.validator.address.is_empty(),
            "validator.address must be non-empty (or set {})",
            ENV_VALIDATOR_ADDRESS
        );
        anyhow::ensure!(
            self.validator.request_timeout_secs > 0,
            "validator.request_timeout_secs must be > 0, got {}",
            self.validator.request_timeout_secs
        );
        anyhow::ensure!(
            !self.telegram.bot_token.is_empty(),
            "telegram.bot_token must be non-empty (or set {})",
            ENV_TELEGRAM_BOT_TOKEN
        );
        anyhow::ensure!(
            !self.telegram.channel_id.is_empty(),
            "telegram.channel_id must be non-empty (or set {})",
            ENV_TELEGRAM_CHANNEL_ID
        );
        anyhow::ensure!(
            self.telegram.api_url.starts_with("http://")
                || self.telegram.api_url.starts_with("https://"),
            "telegram.api_url must start with http:// or https://, got {}",
            self.telegram.api_url
        );
        anyhow::ensure!(
            self.telegram.request_timeout_secs > 0,
            "telegram.request_timeout_secs must be > 0, got {}",
            self.telegram.request_timeout_secs
        );
        anyhow::ensure!(
            self.schedule.interval_secs > 0,
            "schedule.interval_secs must be > 0, got {}",
            self.schedule.interval_secs
        );
        if let Some(expr) = &self.schedule.cron {
            cron::Schedule::from_str(expr)
                .map_err(|e| anyhow::anyhow!("schedule.cron is invalid ({}): {}", expr, e))?;
        }
        Ok(())
    }
}
