use serde::Deserialize;

use crate::error::{CampaignError, CampaignResult};

/// Longest session lifetime accepted, one year.
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 365;

/// Root application configuration. Loaded from environment variables
/// with the prefix `CAMPAIGN_BOARD__` and an optional
/// `config/campaign-board.toml` file.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_node_id")]
    pub node_id: String,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_enabled")]
    pub enabled: bool,
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Lifetime of a bearer token, counted from sign-in.
    #[serde(default = "default_session_ttl_hours")]
    pub ttl_hours: i64,
}

// Default functions
fn default_node_id() -> String {
    "node-01".to_string()
}
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_http_port() -> u16 {
    8080
}
fn default_metrics_enabled() -> bool {
    true
}
fn default_metrics_port() -> u16 {
    9091
}
fn default_session_ttl_hours() -> i64 {
    24
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_metrics_enabled(),
            port: default_metrics_port(),
        }
    }
}

impl SessionConfig {
    /// Reject lifetimes that are not positive or exceed a year.
    pub fn validate(&self) -> CampaignResult<()> {
        if (1..=MAX_SESSION_TTL_HOURS).contains(&self.ttl_hours) {
            Ok(())
        } else {
            Err(CampaignError::Config(format!(
                "session.ttl_hours must be between 1 and {MAX_SESSION_TTL_HOURS}, got {}",
                self.ttl_hours
            )))
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_hours: default_session_ttl_hours(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            node_id: default_node_id(),
            api: ApiConfig::default(),
            metrics: MetricsConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and optional config file.
    pub fn load() -> CampaignResult<Self> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name("config/campaign-board").required(false))
            .add_source(
                config::Environment::with_prefix("CAMPAIGN_BOARD")
                    .separator("__")
                    .try_parsing(true),
            );

        Self::from_settings(builder.build()?)
    }

    /// Deserialize and check already-merged settings.
    pub fn from_settings(settings: config::Config) -> CampaignResult<Self> {
        let config: Self = settings.try_deserialize()?;
        config.session.validate()?;
        Ok(config)
    }
}
