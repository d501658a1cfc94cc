use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use crate::error::AppError;
use crate::messages::repo_types::{
    MailboxRow, MessageDetail, MessageDetailRow, MessageRecord, ReadReceipt, ReceivedMessage,
    SentMessage,
};

/// Access to the `messages` table.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// `Validation` on an empty body or when either user does not exist.
    async fn create(&self, from: &str, to: &str, body: &str) -> Result<MessageRecord, AppError>;
    async fn get(&self, id: i64) -> Result<MessageDetail, AppError>;
    /// Sets `read_at` once; later calls return the original timestamp.
    async fn mark_read(&self, id: i64) -> Result<ReadReceipt, AppError>;
    async fn list_sent_by(&self, username: &str) -> Result<Vec<SentMessage>, AppError>;
    async fn list_received_by(&self, username: &str) -> Result<Vec<ReceivedMessage>, AppError>;
}

#[derive(Clone)]
pub struct PgMessageStore {
    db: PgPool,
}

impl PgMessageStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

pub(crate) fn message_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Message {} not found", id))
}

pub(crate) fn ensure_body(body: &str) -> Result<(), AppError> {
    if body.trim().is_empty() {
        return Err(AppError::Validation("Message body must not be empty".into()));
    }
    Ok(())
}

#[async_trait]
impl MessageStore for PgMessageStore {
    async fn create(&self, from: &str, to: &str, body: &str) -> Result<MessageRecord, AppError> {
        ensure_body(body)?;
        let msg = sqlx::query_as::<_, MessageRecord>(
            r#"
            INSERT INTO messages (from_username, to_username, body, sent_at)
            VALUES ($1, $2, $3, current_timestamp)
            RETURNING id, from_username, to_username, body, sent_at
            "#,
        )
        .bind(from)
        .bind(to)
        .bind(body)
        .fetch_one(&self.db)
        .await?;
        debug!(id = msg.id, %from, %to, "message inserted");
        Ok(msg)
    }

    async fn get(&self, id: i64) -> Result<MessageDetail, AppError> {
        let row = sqlx::query_as::<_, MessageDetailRow>(
            r#"
            SELECT m.id, m.body, m.sent_at, m.read_at,
                   m.from_username,
                   f.first_name AS from_first_name,
                   f.last_name  AS from_last_name,
                   f.phone      AS from_phone,
                   m.to_username,
                   t.first_name AS to_first_name,
                   t.last_name  AS to_last_name,
                   t.phone      AS to_phone
              FROM messages AS m
              JOIN users AS f ON f.username = m.from_username
              JOIN users AS t ON t.username = m.to_username
             WHERE m.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| message_not_found(id))?;
        Ok(row.into())
    }

    async fn mark_read(&self, id: i64) -> Result<ReadReceipt, AppError> {
        sqlx::query_as::<_, ReadReceipt>(
            r#"
            UPDATE messages
               SET read_at = COALESCE(read_at, current_timestamp)
             WHERE id = $1
            RETURNING id, read_at
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| message_not_found(id))
    }

    async fn list_sent_by(&self, username: &str) -> Result<Vec<SentMessage>, AppError> {
        let rows = sqlx::query_as::<_, MailboxRow>(
            r#"
            SELECT m.id, m.body, m.sent_at, m.read_at,
                   u.username, u.first_name, u.last_name, u.phone
              FROM messages AS m
              JOIN users AS u ON u.username = m.to_username
             WHERE m.from_username = $1
             ORDER BY m.id
            "#,
        )
        .bind(username)
        .fetch_all(&self.db)
        .await?;
        Ok(rows.into_iter().map(SentMessage::from).collect())
    }

    async fn list_received_by(&self, username: &str) -> Result<Vec<ReceivedMessage>, AppError> {
        let rows = sqlx::query_as::<_, MailboxRow>(
            r#"
            SELECT m.id, m.body, m.sent_at, m.read_at,
                   u.username, u.first_name, u.last_name, u.phone
              FROM messages AS m
              JOIN users AS u ON u.username = m.from_username
             WHERE m.to_username = $1
             ORDER BY m.id
            "#,
        )
        .bind(username)
        .fetch_all(&self.db)
        .await?;
        Ok(rows.into_iter().map(ReceivedMessage::from).collect())
    }
}
