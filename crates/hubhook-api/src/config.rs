//! Configuration management for the hubhook webhook service.

use std::{fmt, net::SocketAddr, str::FromStr};

use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

const CONFIG_FILE: &str = "config.toml";

/// Documented development fallback for the handshake token.
const DEV_VERIFY_TOKEN: &str = "dev-verify-token";

/// Documented development fallback for the HMAC application secret.
const DEV_APP_SECRET: &str = "dev-app-secret";

/// Deployment environment.
///
/// Secrets behave differently per environment: production refuses to
/// start without them, development falls back to documented defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development and test contexts.
    #[default]
    Development,
    /// Production deployments; missing secrets are startup-fatal.
    Production,
}

/// Service configuration with defaults, file, and environment overrides.
///
/// Configuration is loaded in priority order:
/// 1. Environment variables (highest priority)
/// 2. Configuration file (`config.toml`)
/// 3. Built-in defaults (lowest priority)
///
/// The service works out-of-the-box in development. Production requires
/// `ENVIRONMENT=production` plus explicit `VERIFY_TOKEN` and
/// `APP_SECRET` values; both are rejected at startup when absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Deployment environment.
    ///
    /// Environment variable: `ENVIRONMENT`
    #[serde(default, alias = "ENVIRONMENT")]
    pub environment: Environment,

    /// Shared secret the platform echoes during the subscription
    /// handshake. Never logged in full.
    ///
    /// Environment variable: `VERIFY_TOKEN`
    #[serde(default, alias = "VERIFY_TOKEN")]
    pub verify_token: Option<String>,

    /// HMAC-SHA256 key for delivery signature validation. Never logged
    /// in full.
    ///
    /// Environment variable: `APP_SECRET`
    #[serde(default, alias = "APP_SECRET")]
    pub app_secret: Option<String>,

    /// Server bind address.
    ///
    /// Environment variable: `HOST`
    #[serde(default = "default_host", alias = "HOST")]
    pub host: String,

    /// Server bind port.
    ///
    /// Environment variable: `PORT`
    #[serde(default = "default_port", alias = "PORT")]
    pub port: u16,

    /// HTTP request timeout in seconds.
    ///
    /// Environment variable: `REQUEST_TIMEOUT`
    #[serde(default = "default_request_timeout", alias = "REQUEST_TIMEOUT")]
    pub request_timeout: u64,

    /// Log level configuration.
    ///
    /// Environment variable: `RUST_LOG`
    #[serde(default = "default_log_level", alias = "RUST_LOG")]
    pub rust_log: String,
}

impl Config {
    /// Loads configuration from defaults, `config.toml`, and environment
    /// variable overrides, then validates it.
    ///
    /// # Errors
    ///
    /// Fails when a source cannot be read or validation rejects the
    /// merged values (including missing production secrets).
    pub fn load() -> Result<Self> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(""));

        let config: Self = figment.extract().context("Failed to load configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Resolves the handshake and signing secrets for this environment.
    ///
    /// # Errors
    ///
    /// In production, a missing `VERIFY_TOKEN` or `APP_SECRET` is an
    /// error; the message names the variable, never a value. Development
    /// falls back to the documented defaults with a warning.
    pub fn secrets(&self) -> Result<WebhookSecrets> {
        match self.environment {
            Environment::Production => Ok(WebhookSecrets {
                verify_token: self
                    .verify_token
                    .clone()
                    .context("VERIFY_TOKEN must be set in production")?,
                app_secret: self
                    .app_secret
                    .clone()
                    .context("APP_SECRET must be set in production")?,
            }),
            Environment::Development => {
                if self.verify_token.is_none() || self.app_secret.is_none() {
                    tracing::warn!(
                        "using development fallback secrets; set VERIFY_TOKEN and APP_SECRET"
                    );
                }
                Ok(WebhookSecrets {
                    verify_token: self
                        .verify_token
                        .clone()
                        .unwrap_or_else(|| DEV_VERIFY_TOKEN.to_string()),
                    app_secret: self
                        .app_secret
                        .clone()
                        .unwrap_or_else(|| DEV_APP_SECRET.to_string()),
                })
            },
        }
    }

    /// Parses the server socket address from host and port.
    ///
    /// # Errors
    ///
    /// Fails when host and port do not form a valid socket address.
    pub fn parse_server_addr(&self) -> Result<SocketAddr> {
        let addr_str = format!("{}:{}", self.host, self.port);
        SocketAddr::from_str(&addr_str).context("Invalid server address")
    }

    /// Validates configuration values.
    fn validate(&self) -> Result<()> {
        if self.port == 0 {
            anyhow::bail!("port must be greater than 0");
        }

        if self.request_timeout == 0 {
            anyhow::bail!("request_timeout must be greater than 0");
        }

        if self.environment == Environment::Production {
            if self.verify_token.is_none() {
                anyhow::bail!("VERIFY_TOKEN must be set in production");
            }
            if self.app_secret.is_none() {
                anyhow::bail!("APP_SECRET must be set in production");
            }
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            verify_token: None,
            app_secret: None,
            host: default_host(),
            port: default_port(),
            request_timeout: default_request_timeout(),
            rust_log: default_log_level(),
        }
    }
}

/// Resolved handshake and signing secrets.
///
/// `Debug` redacts both values so the struct can appear in logs without
/// leaking them.
#[derive(Clone)]
pub struct WebhookSecrets {
    /// Token the platform must present during the handshake.
    pub verify_token: String,
    /// HMAC key for delivery signature validation.
    pub app_secret: String,
}

impl fmt::Debug for WebhookSecrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookSecrets")
            .field("verify_token", &"***")
            .field("app_secret", &"***")
            .finish()
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}
