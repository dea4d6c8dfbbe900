//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use lead_intel_core::{NotificationChannel, SalesUser};

use crate::ConfigError;

/// Runtime environment enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    /// Development mode - relaxed validation, warnings only
    #[default]
    Development,
    /// Staging mode - stricter validation
    Staging,
    /// Production mode - all validations enforced
    Production,
}

impl RuntimeEnvironment {
    /// Check if this is a production environment
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    /// Check if strict validation should be applied
    pub fn is_strict(&self) -> bool {
        matches!(self, Self::Production | Self::Staging)
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Runtime environment (development, staging, production)
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Persistence configuration (ScyllaDB)
    #[serde(default)]
    pub persistence: PersistenceConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// Signal annotation through the Claude Messages API
    #[serde(default)]
    pub llm: LlmSettings,

    /// Feedback learning cadence
    #[serde(default)]
    pub learning: LearningSettings,

    /// Lead alert delivery
    #[serde(default)]
    pub notifications: NotificationSettings,

    /// Sales users and the regions they own
    #[serde(default)]
    pub sales_users: Vec<SalesUser>,

    /// Optional YAML override for the scoring tables
    #[serde(default)]
    pub scoring_config_path: Option<String>,

    /// Optional YAML override for the learning policy
    #[serde(default)]
    pub learning_policy_path: Option<String>,
}

/// Persistence configuration for ScyllaDB
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Enable ScyllaDB persistence (false = in-memory only)
    #[serde(default)]
    pub enabled: bool,

    /// ScyllaDB host addresses
    #[serde(default = "default_scylla_hosts")]
    pub scylla_hosts: Vec<String>,

    /// ScyllaDB keyspace name
    #[serde(default = "default_scylla_keyspace")]
    pub keyspace: String,

    /// ScyllaDB replication factor
    #[serde(default = "default_replication_factor")]
    pub replication_factor: u8,
}

fn default_scylla_hosts() -> Vec<String> {
    std::env::var("SCYLLA_HOSTS")
        .map(|s| s.split(',').map(|h| h.trim().to_string()).collect())
        .unwrap_or_else(|_| vec!["127.0.0.1:9042".to_string()])
}

fn default_scylla_keyspace() -> String {
    std::env::var("SCYLLA_KEYSPACE").unwrap_or_else(|_| "lead_intel".to_string())
}

fn default_replication_factor() -> u8 {
    1
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            scylla_hosts: default_scylla_hosts(),
            keyspace: default_scylla_keyspace(),
            replication_factor: default_replication_factor(),
        }
    }
}

impl Settings {
    /// Create default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_persistence()?;
        self.validate_observability()?;
        self.validate_learning()?;
        self.validate_sales_users()?;
        self.validate_llm()?;
        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        let server = &self.server;

        if server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                message: "Port cannot be 0".to_string(),
            });
        }

        if server.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.timeout_seconds".to_string(),
                message: "Timeout must be at least 1 second".to_string(),
            });
        }

        if server.rate_limit.enabled && server.rate_limit.requests_per_minute == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.rate_limit.requests_per_minute".to_string(),
                message: "Must be at least 1 when rate limiting is enabled".to_string(),
            });
        }

        if self.environment.is_production() && server.cors_enabled && server.cors_origins.is_empty()
        {
            tracing::warn!(
                "CORS is enabled in production but no origins are configured. \
                 All origins will be allowed."
            );
        }

        Ok(())
    }

    fn validate_persistence(&self) -> Result<(), ConfigError> {
        let persistence = &self.persistence;
        if !persistence.enabled {
            return Ok(());
        }

        if persistence.keyspace.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "persistence.keyspace".to_string(),
                message: "Keyspace cannot be empty when persistence is enabled".to_string(),
            });
        }

        if persistence.scylla_hosts.is_empty() {
            return Err(ConfigError::MissingField("persistence.scylla_hosts".to_string()));
        }

        Ok(())
    }

    fn validate_observability(&self) -> Result<(), ConfigError> {
        let level = self.observability.log_level.to_lowercase();
        if !matches!(
            level.as_str(),
            "trace" | "debug" | "info" | "warn" | "error"
        ) {
            return Err(ConfigError::InvalidValue {
                field: "observability.log_level".to_string(),
                message: format!("Unknown log level '{}'", self.observability.log_level),
            });
        }
        Ok(())
    }

    fn validate_learning(&self) -> Result<(), ConfigError> {
        if self.learning.retrain_every == 0 {
            return Err(ConfigError::InvalidValue {
                field: "learning.retrain_every".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    fn validate_sales_users(&self) -> Result<(), ConfigError> {
        for (idx, user) in self.sales_users.iter().enumerate() {
            if user.id.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: format!("sales_users[{}].id", idx),
                    message: "Sales user id cannot be empty".to_string(),
                });
            }
            if user.region.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: format!("sales_users[{}].region", idx),
                    message: format!("Sales user '{}' has no region", user.id),
                });
            }
        }
        Ok(())
    }

    fn validate_llm(&self) -> Result<(), ConfigError> {
        if self.llm.enabled && self.llm.api_key.as_deref().map_or(true, |k| k.trim().is_empty()) {
            if self.environment.is_strict() {
                return Err(ConfigError::InvalidValue {
                    field: "llm.api_key".to_string(),
                    message: "API key must be set when annotation is enabled".to_string(),
                });
            }
            tracing::warn!("llm.enabled is set but no API key is configured, using keyword heuristics");
        }
        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// CORS allowed origins
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_timeout() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            timeout_seconds: default_timeout(),
            cors_enabled: true,
            cors_origins: Vec::new(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

/// Rate limiting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Enable rate limiting
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Requests allowed per client key in each one-minute window
    #[serde(default = "default_requests_per_minute")]
    pub requests_per_minute: u32,

    /// Paths that are never rate limited
    #[serde(default = "default_exempt_paths")]
    pub exempt_paths: Vec<String>,
}

fn default_requests_per_minute() -> u32 {
    60
}

fn default_exempt_paths() -> Vec<String> {
    vec!["/health".to_string(), "/metrics".to_string()]
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            requests_per_minute: default_requests_per_minute(),
            exempt_paths: default_exempt_paths(),
        }
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub log_json: bool,

    /// Enable the Prometheus exporter at /metrics
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
            metrics_enabled: true,
        }
    }
}

/// Language-model annotation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    /// Use the Claude backend when an API key is available
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// API key (falls back to ANTHROPIC_API_KEY)
    #[serde(default = "default_llm_api_key")]
    pub api_key: Option<String>,

    /// Model id or alias (haiku, sonnet, opus)
    #[serde(default = "default_llm_model")]
    pub model: String,

    /// API endpoint (for testing or proxy)
    #[serde(default = "default_llm_endpoint")]
    pub endpoint: String,

    /// Request timeout in seconds
    #[serde(default = "default_llm_timeout")]
    pub timeout_seconds: u64,

    /// Maximum tokens to generate
    #[serde(default = "default_llm_max_tokens")]
    pub max_tokens: usize,
}

fn default_llm_api_key() -> Option<String> {
    std::env::var("ANTHROPIC_API_KEY")
        .ok()
        .filter(|k| !k.trim().is_empty())
}

fn default_llm_model() -> String {
    "haiku".to_string()
}

fn default_llm_endpoint() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_llm_timeout() -> u64 {
    20
}

fn default_llm_max_tokens() -> usize {
    512
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: default_llm_api_key(),
            model: default_llm_model(),
            endpoint: default_llm_endpoint(),
            timeout_seconds: default_llm_timeout(),
            max_tokens: default_llm_max_tokens(),
        }
    }
}

impl LlmSettings {
    /// API key to use, if annotation through the API is possible
    pub fn effective_api_key(&self) -> Option<&str> {
        if !self.enabled {
            return None;
        }
        self.api_key.as_deref().filter(|k| !k.trim().is_empty())
    }
}

/// Feedback learning cadence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearningSettings {
    /// Run the analyzer when the feedback count is a multiple of this
    #[serde(default = "default_retrain_every")]
    pub retrain_every: u64,

    /// Also run the analyzer on every conversion
    #[serde(default = "default_true")]
    pub retrain_on_conversion: bool,
}

fn default_retrain_every() -> u64 {
    5
}

impl Default for LearningSettings {
    fn default() -> Self {
        Self {
            retrain_every: default_retrain_every(),
            retrain_on_conversion: true,
        }
    }
}

impl LearningSettings {
    /// Whether a feedback write should trigger the analyzer
    pub fn should_retrain(&self, feedback_count: u64, converted: bool) -> bool {
        let on_cadence = self.retrain_every > 0
            && feedback_count > 0
            && feedback_count % self.retrain_every == 0;
        on_cadence || (converted && self.retrain_on_conversion)
    }
}

/// Lead alert delivery settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationSettings {
    /// Send alerts to the assigned sales user on ingestion
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Channels used for users without a channel preference
    #[serde(default = "default_channels")]
    pub default_channels: Vec<NotificationChannel>,
}

fn default_channels() -> Vec<NotificationChannel> {
    vec![NotificationChannel::Email]
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            default_channels: default_channels(),
        }
    }
}

impl NotificationSettings {
    /// Channels to alert a user on
    pub fn channels_for(&self, user: &SalesUser) -> Vec<NotificationChannel> {
        if user.channels.is_empty() {
            self.default_channels.clone()
        } else {
            user.channels.clone()
        }
    }
}

/// Load settings from files and environment
///
/// Sources, later ones overriding earlier ones:
/// `config/default.*`, `config/{env}.*`, then `LEAD_INTEL__*` variables.
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    // Load default config
    builder = builder.add_source(File::with_name("config/default").required(false));

    // Load environment-specific config
    if let Some(env_name) = env {
        builder =
            builder.add_source(File::with_name(&format!("config/{}", env_name)).required(false));
    }

    // Load from environment variables
    builder = builder.add_source(
        Environment::with_prefix("LEAD_INTEL")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sales_user(id: &str, region: &str) -> SalesUser {
        SalesUser {
            id: id.to_string(),
            name: "Asha".to_string(),
            email: Some("asha@example.com".to_string()),
            phone: None,
            region: region.to_string(),
            channels: Vec::new(),
        }
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.learning.retrain_every, 5);
        assert!(settings.server.rate_limit.enabled);
        assert!(!settings.persistence.enabled);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_server_validation() {
        let mut settings = Settings::default();
        settings.server.port = 0;
        assert!(settings.validate().is_err());

        settings.server.port = 8080;
        settings.server.rate_limit.requests_per_minute = 0;
        assert!(settings.validate().is_err());

        settings.server.rate_limit.enabled = false;
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_persistence_validation() {
        let mut settings = Settings::default();
        settings.persistence.keyspace = " ".to_string();
        assert!(settings.validate().is_ok());

        settings.persistence.enabled = true;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_log_level_validation() {
        let mut settings = Settings::default();
        settings.observability.log_level = "DEBUG".to_string();
        assert!(settings.validate().is_ok());

        settings.observability.log_level = "verbose".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_sales_user_validation() {
        let mut settings = Settings::default();
        settings.sales_users = vec![sales_user("u1", "Gujarat")];
        assert!(settings.validate().is_ok());

        settings.sales_users.push(sales_user("u2", "  "));
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("sales_users[1].region"));
    }

    #[test]
    fn test_should_retrain() {
        let learning = LearningSettings::default();
        assert!(!learning.should_retrain(4, false));
        assert!(learning.should_retrain(5, false));
        assert!(learning.should_retrain(10, false));
        assert!(learning.should_retrain(7, true));
        assert!(!learning.should_retrain(0, false));

        let no_conversion = LearningSettings {
            retrain_every: 5,
            retrain_on_conversion: false,
        };
        assert!(!no_conversion.should_retrain(7, true));
    }

    #[test]
    fn test_notification_channels_fallback() {
        let notifications = NotificationSettings::default();
        let mut user = sales_user("u1", "Gujarat");
        assert_eq!(
            notifications.channels_for(&user),
            vec![NotificationChannel::Email]
        );

        user.channels = vec![NotificationChannel::Sms, NotificationChannel::WhatsApp];
        assert_eq!(notifications.channels_for(&user).len(), 2);
    }

    #[test]
    fn test_deserialize_from_json() {
        let json = r#"{
            "server": {"port": 9000},
            "sales_users": [
                {"id": "u1", "name": "Ravi", "region": "Maharashtra", "channels": ["sms", "whatsapp"]}
            ],
            "learning": {"retrain_every": 3}
        }"#;
        let settings: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.server.timeout_seconds, 30);
        assert_eq!(settings.learning.retrain_every, 3);
        assert!(settings.learning.retrain_on_conversion);
        assert_eq!(settings.sales_users[0].channels.len(), 2);
    }

    #[test]
    fn test_effective_api_key() {
        let mut llm = LlmSettings {
            api_key: Some("sk-test".to_string()),
            ..LlmSettings::default()
        };
        assert_eq!(llm.effective_api_key(), Some("sk-test"));

        llm.enabled = false;
        assert_eq!(llm.effective_api_key(), None);

        llm.enabled = true;
        llm.api_key = Some("  ".to_string());
        assert_eq!(llm.effective_api_key(), None);
    }
}
