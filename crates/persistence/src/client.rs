//! ScyllaDB session for the lead stores

use std::sync::Arc;
use std::time::Duration;

use scylla::{Session, SessionBuilder};

use crate::error::PersistenceError;
use crate::schema;

const MAX_KEYSPACE_LEN: usize = 48;

/// Cluster location and keyspace settings
#[derive(Debug, Clone)]
pub struct ScyllaConfig {
    pub hosts: Vec<String>,
    pub keyspace: String,
    pub replication_factor: u8,
    pub connect_timeout: Duration,
}

impl Default for ScyllaConfig {
    fn default() -> Self {
        Self {
            hosts: vec!["127.0.0.1:9042".to_string()],
            keyspace: "lead_intel".to_string(),
            replication_factor: 1,
            connect_timeout: Duration::from_secs(5),
        }
    }
}

impl ScyllaConfig {
    pub fn new(hosts: Vec<String>, keyspace: impl Into<String>) -> Self {
        Self {
            hosts,
            keyspace: keyspace.into(),
            ..Self::default()
        }
    }

    pub fn with_replication_factor(mut self, replication_factor: u8) -> Self {
        self.replication_factor = replication_factor;
        self
    }

    pub fn validate(&self) -> Result<(), PersistenceError> {
        if self.hosts.iter().all(|h| h.trim().is_empty()) {
            return Err(PersistenceError::Connection(
                "no ScyllaDB hosts configured".to_string(),
            ));
        }
        if !is_plain_identifier(&self.keyspace) {
            return Err(PersistenceError::SchemaError(format!(
                "invalid keyspace name '{}'",
                self.keyspace
            )));
        }
        if self.replication_factor == 0 {
            return Err(PersistenceError::SchemaError(
                "replication factor must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Keyspace names are interpolated into CQL text
fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && name.len() <= MAX_KEYSPACE_LEN
}

/// Shared session handle; cloned into every store
#[derive(Clone)]
pub struct ScyllaClient {
    session: Arc<Session>,
    config: ScyllaConfig,
}

impl ScyllaClient {
    pub async fn connect(config: ScyllaConfig) -> Result<Self, PersistenceError> {
        config.validate()?;
        tracing::info!(
            hosts = ?config.hosts,
            keyspace = %config.keyspace,
            timeout_ms = config.connect_timeout.as_millis() as u64,
            "Connecting to ScyllaDB"
        );

        let session = SessionBuilder::new()
            .known_nodes(&config.hosts)
            .connection_timeout(config.connect_timeout)
            .build()
            .await?;

        Ok(Self {
            session: Arc::new(session),
            config,
        })
    }

    /// Create the keyspace and the lead, feedback, weights and notification tables
    pub async fn ensure_schema(&self) -> Result<(), PersistenceError> {
        let keyspace = &self.config.keyspace;
        schema::create_keyspace(&self.session, keyspace, self.config.replication_factor).await?;
        schema::create_tables(&self.session, keyspace).await?;
        tracing::info!(keyspace = %keyspace, "Lead intelligence schema ready");
        Ok(())
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn keyspace(&self) -> &str {
        &self.config.keyspace
    }

    /// Keyspace-qualified table name for CQL statements
    pub fn table(&self, name: &str) -> String {
        qualified(&self.config.keyspace, name)
    }
}

fn qualified(keyspace: &str, table: &str) -> String {
    format!("{}.{}", keyspace, table)
}
