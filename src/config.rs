//! Environment configuration

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4";
const DEFAULT_TEMPERATURE: f32 = 0.3;
const DEFAULT_MAX_TOKENS: u32 = 300;
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Process configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: IpAddr,
    pub port: u16,
    pub llm: LlmConfig,
}

/// Generation backend settings
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let llm = LlmConfig {
            api_key: non_empty(lookup("OPENAI_API_KEY")),
            base_url: non_empty(lookup("OPENAI_BASE_URL"))
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: non_empty(lookup("COMPANION_MODEL")).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature: parsed(&lookup, "COMPANION_TEMPERATURE", DEFAULT_TEMPERATURE),
            max_tokens: parsed(&lookup, "COMPANION_MAX_TOKENS", DEFAULT_MAX_TOKENS),
            timeout: Duration::from_secs(parsed(
                &lookup,
                "COMPANION_LLM_TIMEOUT_SECS",
                DEFAULT_TIMEOUT_SECS,
            )),
        };

        Self {
            host: parsed(&lookup, "COMPANION_HOST", IpAddr::V4(Ipv4Addr::UNSPECIFIED)),
            port: parsed(&lookup, "COMPANION_PORT", DEFAULT_PORT),
            llm,
        }
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Parse an optional variable, falling back to the default when unset or invalid.
fn parsed<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display,
{
    let Some(raw) = non_empty(lookup(key)) else {
        return default;
    };
    raw.parse().unwrap_or_else(|_| {
        tracing::warn!(key, value = %raw, default = %default, "Invalid config value, using default");
        default
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> AppConfig {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        AppConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert_eq!(config.bind_addr().to_string(), "0.0.0.0:8000");
        assert!(config.llm.api_key.is_none());
        assert_eq!(config.llm.base_url, "https://api.openai.com/v1");
        assert_eq!(config.llm.model, "gpt-4");
        assert!((config.llm.temperature - 0.3).abs() < f32::EPSILON);
        assert_eq!(config.llm.max_tokens, 300);
        assert_eq!(config.llm.timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("COMPANION_HOST", "127.0.0.1"),
            ("COMPANION_PORT", "9100"),
            ("OPENAI_API_KEY", "sk-test"),
            ("COMPANION_MODEL", "gpt-4o-mini"),
            ("COMPANION_MAX_TOKENS", "120"),
            ("COMPANION_LLM_TIMEOUT_SECS", "5"),
        ]);
        assert_eq!(config.bind_addr().to_string(), "127.0.0.1:9100");
        assert_eq!(config.llm.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.llm.max_tokens, 120);
        assert_eq!(config.llm.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = config_from(&[
            ("COMPANION_PORT", "eighty"),
            ("COMPANION_TEMPERATURE", "warm"),
            ("COMPANION_HOST", "not-an-ip"),
        ]);
        assert_eq!(config.port, 8000);
        assert!((config.llm.temperature - 0.3).abs() < f32::EPSILON);
        assert_eq!(config.host, IpAddr::V4(Ipv4Addr::UNSPECIFIED));
    }

    #[test]
    fn test_blank_api_key_is_none() {
        let config = config_from(&[("OPENAI_API_KEY", "   ")]);
        assert!(config.llm.api_key.is_none());
    }
}
