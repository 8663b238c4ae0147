use std::collections::HashMap;
use std::env;
use std::fs;
use std::time::Duration;

use chrono_tz::Tz;

use crate::error::ConfigError;

pub const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";
pub const DEFAULT_WEBHOOK_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Default, Clone)]
pub struct AppConfig {
    values: HashMap<String, String>,
}

impl AppConfig {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let mut values = HashMap::new();
        for (idx, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let trimmed = trimmed.strip_prefix("export ").unwrap_or(trimmed);
            let Some((key, value)) = trimmed.split_once('=') else {
                return Err(ConfigError::InvalidLine {
                    line: idx + 1,
                    content: line.to_string(),
                });
            };
            let key = key.trim();
            let mut value = value.trim().to_string();
            if value.len() >= 2
                && ((value.starts_with('"') && value.ends_with('"'))
                    || (value.starts_with('\'') && value.ends_with('\'')))
            {
                value = value[1..value.len() - 1].to_string();
            }
            values.insert(key.to_string(), value);
        }
        Ok(Self { values })
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    /// Config file value first, then the process environment.
    pub fn lookup(&self, key: &str) -> Option<String> {
        self.get(key)
            .or_else(|| env::var(key).ok())
            .filter(|value| !value.trim().is_empty())
    }
}

/// Everything the dispatcher needs. Built once at startup.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    pub webhook_url: String,
    pub timezone: Tz,
    pub webhook_timeout: Duration,
}

impl DispatchConfig {
    pub fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let webhook_url = get("GAS_WEBHOOK_URL").ok_or(ConfigError::Missing("GAS_WEBHOOK_URL"))?;
        let timezone = match get("BOT_TIMEZONE") {
            Some(name) => name.trim().parse::<Tz>().map_err(|_| ConfigError::InvalidValue {
                key: "BOT_TIMEZONE",
                value: name,
            })?,
            None => Tz::UTC,
        };
        let timeout_secs = match get("WEBHOOK_TIMEOUT_SECS") {
            Some(raw) => parse_positive_secs("WEBHOOK_TIMEOUT_SECS", raw)?,
            None => DEFAULT_WEBHOOK_TIMEOUT_SECS,
        };
        Ok(Self {
            webhook_url,
            timezone,
            webhook_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub token: String,
    pub api_base: String,
    /// When set, polling stops after this long. Otherwise it runs until Ctrl-C.
    pub poll_window: Option<Duration>,
}

impl TelegramConfig {
    pub fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = get("TELEGRAM_BOT_TOKEN").ok_or(ConfigError::Missing("TELEGRAM_BOT_TOKEN"))?;
        let api_base = get("TELEGRAM_API_BASE")
            .unwrap_or_else(|| DEFAULT_TELEGRAM_API_BASE.to_string())
            .trim_end_matches('/')
            .to_string();
        let poll_window = get("POLL_WINDOW_SECS")
            .map(|raw| parse_positive_secs("POLL_WINDOW_SECS", raw))
            .transpose()?
            .map(Duration::from_secs);
        Ok(Self {
            token,
            api_base,
            poll_window,
        })
    }
}

fn parse_positive_secs(key: &'static str, raw: String) -> Result<u64, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(ConfigError::InvalidValue { key, value: raw }),
    }
}
