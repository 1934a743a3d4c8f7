//! Application configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable overrides. The configuration
//! file path defaults to `config.yaml` but can be specified via `-f` flag or `VITALSD_CONFIG`
//! environment variable.
//!
//! ## Loading Priority
//!
//! Configuration sources are merged in the following order (later sources override earlier ones):
//!
//! 1. **YAML config file** - Base configuration (default: `config.yaml`)
//! 2. **Environment variables** - Variables prefixed with `VITALSD_` override YAML values
//! 3. **CLAUDE_API_KEY** - Special case: overrides `api_key` if set
//!
//! For nested config values, use double underscores in environment variables. For example,
//! `VITALSD_PROVIDER__MODEL=claude-3-haiku-20240307` sets the `provider.model` field.
//!
//! ## Environment Variable Examples
//!
//! ```bash
//! # Provider credential (either form works)
//! CLAUDE_API_KEY=sk-ant-...
//! VITALSD_API_KEY=sk-ant-...
//!
//! # Switch to an OpenAI-compatible backend
//! VITALSD_PROVIDER__TYPE=openai
//! VITALSD_PROVIDER__MODEL=gpt-4o-mini
//!
//! # English error messages, longer provider timeout
//! VITALSD_LOCALE=en
//! VITALSD_REQUEST_TIMEOUT=45s
//! ```
//!
//! The resulting [`Config`] is built once at startup and shared read-only with every request.

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::providers::ProviderKind;

/// Simple CLI args - just for specifying config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "VITALSD_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
///
/// All fields have defaults defined in the `Default` implementation, so an empty (or missing)
/// config file yields a server on port 5050 that answers every analysis request with 401 until a
/// credential is supplied.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// Credential for the text-generation provider. Absent or empty disables analysis.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Which text-generation backend to call
    pub provider: ProviderConfig,
    /// Upper bound for a single provider call
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    /// Language of user-visible error messages
    pub locale: Locale,
    /// Append internal error detail to 5xx messages. Debug deployments only.
    pub expose_error_details: bool,
    /// Enable Prometheus metrics endpoint at `/internal/metrics`
    pub enable_metrics: bool,
    /// Enable OpenTelemetry OTLP export for distributed tracing
    pub enable_otel_export: bool,
    /// Cross-origin settings for browser clients
    pub cors: CorsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5050,
            api_key: None,
            provider: ProviderConfig::default(),
            request_timeout: Duration::from_secs(30),
            locale: Locale::default(),
            expose_error_details: false,
            enable_metrics: false,
            enable_otel_export: false,
            cors: CorsConfig::default(),
        }
    }
}

/// Text-generation backend selection.
///
/// The `type` tag picks the wire protocol; `base_url` and `model` default to the public endpoint
/// and a reasonable model for that protocol.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    /// Anthropic messages API
    Anthropic {
        #[serde(default = "default_anthropic_url")]
        base_url: Url,
        #[serde(default = "default_anthropic_model")]
        model: String,
    },
    /// OpenAI-compatible chat completions API
    #[serde(rename = "openai")]
    OpenAi {
        #[serde(default = "default_openai_url")]
        base_url: Url,
        #[serde(default = "default_openai_model")]
        model: String,
    },
    /// Hugging Face text-generation inference API
    #[serde(rename = "huggingface")]
    HuggingFace {
        #[serde(default = "default_huggingface_url")]
        base_url: Url,
        #[serde(default = "default_huggingface_model")]
        model: String,
    },
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig::Anthropic {
            base_url: default_anthropic_url(),
            model: default_anthropic_model(),
        }
    }
}

impl ProviderConfig {
    pub fn kind(&self) -> ProviderKind {
        match self {
            ProviderConfig::Anthropic { .. } => ProviderKind::Anthropic,
            ProviderConfig::OpenAi { .. } => ProviderKind::OpenAi,
            ProviderConfig::HuggingFace { .. } => ProviderKind::HuggingFace,
        }
    }

    pub fn base_url(&self) -> &Url {
        match self {
            ProviderConfig::Anthropic { base_url, .. }
            | ProviderConfig::OpenAi { base_url, .. }
            | ProviderConfig::HuggingFace { base_url, .. } => base_url,
        }
    }

    pub fn model(&self) -> &str {
        match self {
            ProviderConfig::Anthropic { model, .. }
            | ProviderConfig::OpenAi { model, .. }
            | ProviderConfig::HuggingFace { model, .. } => model,
        }
    }
}

fn default_anthropic_url() -> Url {
    Url::parse("https://api.anthropic.com").expect("static URL is valid")
}

fn default_anthropic_model() -> String {
    "claude-3-opus-20240229".to_string()
}

fn default_openai_url() -> Url {
    Url::parse("https://api.openai.com").expect("static URL is valid")
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_huggingface_url() -> Url {
    Url::parse("https://api-inference.huggingface.co").expect("static URL is valid")
}

fn default_huggingface_model() -> String {
    "mistralai/Mistral-7B-Instruct-v0.2".to_string()
}

/// Language for user-visible messages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// Turkish
    #[default]
    Tr,
    /// English
    En,
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorsConfig {
    /// Origins allowed to call the API; `*` allows any origin
    pub allowed_origins: Vec<CorsOrigin>,
    /// How long browsers may cache preflight responses, in seconds
    pub max_age: Option<u64>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![CorsOrigin::Wildcard],
            max_age: Some(3600),
        }
    }
}

/// One allowed CORS origin.
///
/// Can be either a wildcard (`*`) to allow all origins, or a specific URL.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum CorsOrigin {
    /// Allow all origins (`*`)
    #[serde(deserialize_with = "parse_wildcard")]
    Wildcard,
    /// Specific origin URL (e.g., `https://app.example.com`)
    #[serde(deserialize_with = "parse_url")]
    Url(Url),
}

fn parse_wildcard<'de, D>(deserializer: D) -> Result<(), D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    if s == "*" {
        Ok(())
    } else {
        Err(serde::de::Error::custom("Expected '*'"))
    }
}

fn parse_url<'de, D>(deserializer: D) -> Result<Url, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    Url::parse(&s).map_err(serde::de::Error::custom)
}

impl Config {
    #[allow(clippy::result_large_err)]
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let mut config: Self = Self::figment(args).extract()?;

        // An empty credential is the same as none at all
        if config.api_key.as_deref().is_some_and(|key| key.trim().is_empty()) {
            config.api_key = None;
        }

        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    /// Validate the configuration for consistency and required fields
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.request_timeout.is_zero() {
            anyhow::bail!("Config validation: request_timeout must be greater than zero");
        }

        if self.provider.model().trim().is_empty() {
            anyhow::bail!(
                "Config validation: provider.model must not be empty for provider '{}'",
                self.provider.kind()
            );
        }

        Ok(())
    }

    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            // Load base config file
            .merge(Yaml::file(&args.config))
            // Environment variables can still override specific values
            // (VITALSD_CONFIG names the file itself and is not a config key)
            .merge(Env::prefixed("VITALSD_").ignore(&["config"]).split("__"))
            // The credential name client deployments already use
            .merge(Env::raw().only(&["CLAUDE_API_KEY"]).map(|_| "api_key".into()))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The configured credential, if analysis is enabled at all.
    pub fn credential(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|key| !key.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    fn args(path: &str) -> Args {
        Args {
            config: path.to_string(),
            validate: false,
        }
    }

    #[test]
    fn test_defaults_without_config_file() {
        Jail::expect_with(|_jail| {
            let config = Config::load(&args("missing.yaml"))?;

            assert_eq!(config.port, 5050);
            assert_eq!(config.provider.kind(), ProviderKind::Anthropic);
            assert_eq!(config.provider.model(), "claude-3-opus-20240229");
            assert_eq!(config.request_timeout, Duration::from_secs(30));
            assert_eq!(config.locale, Locale::Tr);
            assert!(config.credential().is_none());
            assert!(!config.expose_error_details);

            Ok(())
        });
    }

    #[test]
    fn test_provider_section() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "test.yaml",
                r#"
provider:
  type: huggingface
  model: tiiuae/falcon-7b-instruct
request_timeout: 12s
locale: en
"#,
            )?;

            let config = Config::load(&args("test.yaml"))?;

            assert_eq!(config.provider.kind(), ProviderKind::HuggingFace);
            assert_eq!(config.provider.model(), "tiiuae/falcon-7b-instruct");
            assert_eq!(config.provider.base_url().as_str(), "https://api-inference.huggingface.co/");
            assert_eq!(config.request_timeout, Duration::from_secs(12));
            assert_eq!(config.locale, Locale::En);

            Ok(())
        });
    }

    #[test]
    fn test_env_override() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "test.yaml",
                r#"
port: 9000
provider:
  type: openai
"#,
            )?;

            jail.set_env("VITALSD_HOST", "127.0.0.1");
            jail.set_env("VITALSD_PORT", "8080");
            jail.set_env("VITALSD_PROVIDER__MODEL", "gpt-4o");

            let config = Config::load(&args("test.yaml"))?;

            assert_eq!(config.host, "127.0.0.1");
            assert_eq!(config.port, 8080);
            assert_eq!(config.provider.kind(), ProviderKind::OpenAi);
            assert_eq!(config.provider.model(), "gpt-4o");

            Ok(())
        });
    }

    #[test]
    fn test_claude_api_key_env() {
        Jail::expect_with(|jail| {
            jail.set_env("CLAUDE_API_KEY", "sk-ant-test");

            let config = Config::load(&args("missing.yaml"))?;
            assert_eq!(config.credential(), Some("sk-ant-test"));

            Ok(())
        });
    }

    #[test]
    fn test_blank_api_key_is_treated_as_missing() {
        Jail::expect_with(|jail| {
            jail.create_file("test.yaml", "api_key: \"  \"\n")?;

            let config = Config::load(&args("test.yaml"))?;
            assert!(config.api_key.is_none());
            assert!(config.credential().is_none());

            Ok(())
        });
    }

    #[test]
    fn test_cors_origins() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "test.yaml",
                r#"
cors:
  allowed_origins:
    - "*"
    - https://app.example.com
  max_age: 60
"#,
            )?;

            let config = Config::load(&args("test.yaml"))?;
            assert_eq!(config.cors.allowed_origins.len(), 2);
            assert_eq!(config.cors.allowed_origins[0], CorsOrigin::Wildcard);
            assert!(matches!(&config.cors.allowed_origins[1], CorsOrigin::Url(url) if url.host_str() == Some("app.example.com")));
            assert_eq!(config.cors.max_age, Some(60));

            Ok(())
        });
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file("test.yaml", "request_timeout: 0s\n")?;

            let result = Config::load(&args("test.yaml"));
            assert!(result.is_err());
            assert!(result.unwrap_err().to_string().contains("request_timeout"));

            Ok(())
        });
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file("test.yaml", "prot: 1234\n")?;

            assert!(Config::load(&args("test.yaml")).is_err());

            Ok(())
        });
    }
}
