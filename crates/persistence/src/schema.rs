//! ScyllaDB schema creation
//!
//! Documents are stored as JSON text next to the columns needed for lookups.
//! Timestamps are epoch milliseconds in BIGINT columns.

use crate::error::PersistenceError;
use scylla::Session;

/// Partition key shared by every feedback row
pub const FEEDBACK_BUCKET: &str = "all";

/// Create the keyspace if it doesn't exist
pub async fn create_keyspace(
    session: &Session,
    keyspace: &str,
    replication_factor: u8,
) -> Result<(), PersistenceError> {
    let query = format!(
        "CREATE KEYSPACE IF NOT EXISTS {} WITH replication = {{'class': 'SimpleStrategy', 'replication_factor': {}}}",
        keyspace, replication_factor
    );

    session
        .query_unpaged(query, &[])
        .await
        .map_err(|e| PersistenceError::SchemaError(format!("Failed to create keyspace: {}", e)))?;

    Ok(())
}

/// Create all required tables
pub async fn create_tables(session: &Session, keyspace: &str) -> Result<(), PersistenceError> {
    let tables = [
        (
            "leads",
            format!(
                r#"
        CREATE TABLE IF NOT EXISTS {}.leads (
            lead_id TEXT,
            status TEXT,
            score INT,
            doc TEXT,
            created_at BIGINT,
            updated_at BIGINT,
            PRIMARY KEY (lead_id)
        )"#,
                keyspace
            ),
        ),
        (
            "feedback",
            format!(
                r#"
        CREATE TABLE IF NOT EXISTS {}.feedback (
            bucket TEXT,
            created_at BIGINT,
            feedback_id TEXT,
            lead_id TEXT,
            action TEXT,
            doc TEXT,
            PRIMARY KEY ((bucket), created_at, feedback_id)
        ) WITH CLUSTERING ORDER BY (created_at ASC, feedback_id ASC)"#,
                keyspace
            ),
        ),
        (
            "learned_weights",
            format!(
                r#"
        CREATE TABLE IF NOT EXISTS {}.learned_weights (
            weights_id TEXT,
            version BIGINT,
            doc TEXT,
            updated_at BIGINT,
            PRIMARY KEY (weights_id)
        )"#,
                keyspace
            ),
        ),
        (
            "notifications",
            format!(
                r#"
        CREATE TABLE IF NOT EXISTS {}.notifications (
            user_id TEXT,
            notification_id UUID,
            lead_id TEXT,
            channel TEXT,
            recipient TEXT,
            message_text TEXT,
            status TEXT,
            sent_at BIGINT,
            PRIMARY KEY ((user_id), notification_id)
        )"#,
                keyspace
            ),
        ),
    ];

    for (name, ddl) in tables {
        session.query_unpaged(ddl, &[]).await.map_err(|e| {
            PersistenceError::SchemaError(format!("Failed to create {} table: {}", name, e))
        })?;
    }

    Ok(())
}
