//! Configuration management
//!
//! 設定は以下の優先順位で読み込まれます:
//! 1. 環境変数
//! 2. greeter.toml 設定ファイル
//! 3. デフォルト値
//!
//! 設定ファイル内では `${VAR_NAME}` 形式で環境変数を展開できます。

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{Error, Result};

/// Default config file looked up by [`Config::load`]
pub const DEFAULT_CONFIG_FILE: &str = "greeter.toml";

/// Slack workspace settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlackConfig {
    /// Signing secret used to authenticate Events API requests
    #[serde(default, skip_serializing)]
    pub signing_secret: String,

    /// Bot access token (xoxb-...)
    #[serde(default, skip_serializing)]
    pub access_token: String,

    /// Channel that receives status change announcements
    #[serde(default = "default_status_channel")]
    pub status_channel: String,

    /// Slack Web API base URL
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            signing_secret: String::new(),
            access_token: String::new(),
            status_channel: default_status_channel(),
            api_base_url: default_api_base_url(),
        }
    }
}

/// OAuth v2 install flow settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OAuthConfig {
    pub client_id: Option<String>,
    #[serde(skip_serializing)]
    pub client_secret: Option<String>,
    pub redirect_url: Option<String>,
}

impl OAuthConfig {
    /// Client id and secret are both present
    pub fn is_configured(&self) -> bool {
        matches!(
            (&self.client_id, &self.client_secret),
            (Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty()
        )
    }
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

/// Daily greeting schedule settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// cron expression, seconds first (sec min hour dom mon dow)
    #[serde(default = "default_cron")]
    pub cron: String,

    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            cron: default_cron(),
            enabled: default_enabled(),
        }
    }
}

/// Main configuration for the greeter bot
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub slack: SlackConfig,

    #[serde(default)]
    pub oauth: OAuthConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub schedule: ScheduleConfig,
}

fn default_status_channel() -> String {
    "playground".to_string()
}

fn default_api_base_url() -> String {
    "https://slack.com/api".to_string()
}

fn default_port() -> u16 {
    8010
}

fn default_cron() -> String {
    "0 0 10 * * *".to_string()
}

fn default_enabled() -> bool {
    true
}

impl Config {
    /// `${VAR_NAME}` 形式の文字列を環境変数の値に置換します。
    /// 環境変数が存在しない場合は空文字列になります。
    fn expand_env_vars<F>(value: &str, lookup: F) -> String
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut result = String::with_capacity(value.len());
        let mut chars = value.chars().peekable();

        while let Some(c) = chars.next() {
            if c == '$' && chars.peek() == Some(&'{') {
                chars.next(); // '{' を消費

                let mut var_name = String::new();
                for c in chars.by_ref() {
                    if c == '}' {
                        break;
                    }
                    var_name.push(c);
                }

                if let Some(env_value) = lookup(&var_name) {
                    result.push_str(&env_value);
                }
            } else {
                result.push(c);
            }
        }

        result
    }

    /// Parse TOML content, expanding `${VAR}` references with `lookup`
    fn from_toml_str_with<F>(content: &str, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let expanded = Self::expand_env_vars(content, lookup);
        let config: Config = toml::from_str(&expanded)?;
        Ok(config)
    }

    /// TOML 設定ファイルから設定を読み込む
    ///
    /// 設定ファイル内の `${VAR_NAME}` は環境変数の値に置換され、
    /// その後既存の環境変数で上書きされます。
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let mut config = Self::from_toml_str_with(&content, env_lookup)?;
        config.apply_overrides(env_lookup);
        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_overrides(env_lookup);
        Ok(config)
    }

    /// デフォルトパスから設定を読み込む
    ///
    /// `./greeter.toml` があればそれを使い、なければ環境変数のみを使います。
    pub fn load() -> Result<Self> {
        let config = if Path::new(DEFAULT_CONFIG_FILE).exists() {
            tracing::debug!("Loading configuration from {}", DEFAULT_CONFIG_FILE);
            Self::from_toml_file(DEFAULT_CONFIG_FILE)?
        } else {
            Self::from_env()?
        };

        config.validate()?;
        Ok(config)
    }

    /// 環境変数で設定を上書きする
    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // Empty values never override
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(secret) = get("SLACK_SIGNING_SECRET") {
            self.slack.signing_secret = secret;
        }
        if let Some(token) = get("SLACK_ACCESS_TOKEN") {
            self.slack.access_token = token;
        }
        if let Some(channel) = get("SLACK_STATUS_CHANNEL") {
            self.slack.status_channel = channel;
        }
        if let Some(url) = get("SLACK_API_BASE_URL") {
            self.slack.api_base_url = url;
        }

        if let Some(id) = get("SLACK_CLIENT_ID") {
            self.oauth.client_id = Some(id);
        }
        if let Some(secret) = get("SLACK_CLIENT_SECRET") {
            self.oauth.client_secret = Some(secret);
        }
        if let Some(url) = get("SLACK_REDIRECT_URL") {
            self.oauth.redirect_url = Some(url);
        }

        if let Some(port) = get("SERVER_PORT") {
            match port.parse() {
                Ok(p) => self.server.port = p,
                Err(_) => tracing::warn!("Ignoring invalid SERVER_PORT: {}", port),
            }
        }

        if let Some(cron) = get("GREETING_CRON") {
            self.schedule.cron = cron;
        }
        if let Some(enabled) = get("GREETING_ENABLED") {
            self.schedule.enabled = enabled.to_lowercase() != "false";
        }
    }

    /// Check that the required secrets are present
    pub fn validate(&self) -> Result<()> {
        if self.slack.signing_secret.is_empty() {
            return Err(Error::MissingSetting("SLACK_SIGNING_SECRET"));
        }
        if self.slack.access_token.is_empty() {
            return Err(Error::MissingSetting("SLACK_ACCESS_TOKEN"));
        }
        Ok(())
    }
}

fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.server.port, 8010);
        assert_eq!(config.slack.status_channel, "playground");
        assert_eq!(config.slack.api_base_url, "https://slack.com/api");
        assert_eq!(config.schedule.cron, "0 0 10 * * *");
        assert!(config.schedule.enabled);
        assert!(!config.oauth.is_configured());
    }

    #[test]
    fn test_expand_env_vars() {
        let lookup = lookup_from(&[("GREETER_TEST_VAR", "test_value")]);

        let result = Config::expand_env_vars("prefix_${GREETER_TEST_VAR}_suffix", &lookup);
        assert_eq!(result, "prefix_test_value_suffix");

        // 存在しない環境変数
        let result = Config::expand_env_vars("prefix_${NONEXISTENT_VAR}_suffix", &lookup);
        assert_eq!(result, "prefix__suffix");
    }

    #[test]
    fn test_expand_env_vars_no_braces() {
        let result = Config::expand_env_vars("cost: $5", |_| None);
        assert_eq!(result, "cost: $5");
    }

    #[test]
    fn test_toml_config_parsing() {
        let toml_content = r#"
[slack]
signing_secret = "${SIGNING}"
access_token = "xoxb-from-file"
status_channel = "general"

[oauth]
client_id = "123.456"
client_secret = "shh"
redirect_url = "https://example.com/oauth"

[server]
port = 9000

[schedule]
cron = "0 30 9 * * Mon-Fri"
enabled = false
"#;

        let config =
            Config::from_toml_str_with(toml_content, lookup_from(&[("SIGNING", "abc")])).unwrap();

        assert_eq!(config.slack.signing_secret, "abc");
        assert_eq!(config.slack.access_token, "xoxb-from-file");
        assert_eq!(config.slack.status_channel, "general");
        assert_eq!(config.slack.api_base_url, "https://slack.com/api");
        assert!(config.oauth.is_configured());
        assert_eq!(config.oauth.redirect_url.as_deref(), Some("https://example.com/oauth"));
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.schedule.cron, "0 30 9 * * Mon-Fri");
        assert!(!config.schedule.enabled);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = Config::from_toml_str_with("[server]\nport = 1234\n", |_| None).unwrap();
        assert_eq!(config.server.port, 1234);
        assert_eq!(config.schedule.cron, "0 0 10 * * *");
        assert_eq!(config.slack.status_channel, "playground");
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_overrides(lookup_from(&[
            ("SLACK_SIGNING_SECRET", "secret"),
            ("SLACK_ACCESS_TOKEN", "xoxb-token"),
            ("SLACK_STATUS_CHANNEL", "random"),
            ("SERVER_PORT", "3000"),
            ("GREETING_ENABLED", "FALSE"),
        ]));

        assert_eq!(config.slack.signing_secret, "secret");
        assert_eq!(config.slack.access_token, "xoxb-token");
        assert_eq!(config.slack.status_channel, "random");
        assert_eq!(config.server.port, 3000);
        assert!(!config.schedule.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_port_is_ignored() {
        let mut config = Config::default();
        config.apply_overrides(lookup_from(&[("SERVER_PORT", "not-a-port")]));
        assert_eq!(config.server.port, 8010);
    }

    #[test]
    fn test_empty_env_value_does_not_override() {
        let mut config = Config::default();
        config.apply_overrides(lookup_from(&[("SLACK_STATUS_CHANNEL", "")]));
        assert_eq!(config.slack.status_channel, "playground");
    }

    #[test]
    fn test_validate_requires_secrets() {
        let config = Config::default();
        assert!(matches!(
            config.validate(),
            Err(Error::MissingSetting("SLACK_SIGNING_SECRET"))
        ));

        let mut config = Config::default();
        config.slack.signing_secret = "secret".to_string();
        assert!(matches!(
            config.validate(),
            Err(Error::MissingSetting("SLACK_ACCESS_TOKEN"))
        ));
    }

    #[test]
    fn test_oauth_requires_id_and_secret() {
        let oauth = OAuthConfig {
            client_id: Some("id".to_string()),
            client_secret: None,
            redirect_url: None,
        };
        assert!(!oauth.is_configured());
    }
}
