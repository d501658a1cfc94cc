use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;

use crate::users::repo_types::UserSummary;

/// Anything that knows who sent it and who it is for.
pub trait Parties {
    fn from_username(&self) -> &str;
    fn to_username(&self) -> &str;
}

/// A freshly created message.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MessageRecord {
    pub id: i64,
    pub from_username: String,
    pub to_username: String,
    pub body: String,
    #[serde(with = "time::serde::rfc3339")]
    pub sent_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ReadReceipt {
    pub id: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub read_at: OffsetDateTime,
}

/// Message joined with both parties' contact cards.
#[derive(Debug, Clone, Serialize)]
pub struct MessageDetail {
    pub id: i64,
    pub body: String,
    #[serde(with = "time::serde::rfc3339")]
    pub sent_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub read_at: Option<OffsetDateTime>,
    pub from_user: UserSummary,
    pub to_user: UserSummary,
}

#[derive(Debug, FromRow)]
pub struct MessageDetailRow {
    pub id: i64,
    pub body: String,
    pub sent_at: OffsetDateTime,
    pub read_at: Option<OffsetDateTime>,
    pub from_username: String,
    pub from_first_name: String,
    pub from_last_name: String,
    pub from_phone: String,
    pub to_username: String,
    pub to_first_name: String,
    pub to_last_name: String,
    pub to_phone: String,
}

impl From<MessageDetailRow> for MessageDetail {
    fn from(r: MessageDetailRow) -> Self {
        Self {
            id: r.id,
            body: r.body,
            sent_at: r.sent_at,
            read_at: r.read_at,
            from_user: UserSummary {
                username: r.from_username,
                first_name: r.from_first_name,
                last_name: r.from_last_name,
                phone: r.from_phone,
            },
            to_user: UserSummary {
                username: r.to_username,
                first_name: r.to_first_name,
                last_name: r.to_last_name,
                phone: r.to_phone,
            },
        }
    }
}

/// Entry in a user's outbox, annotated with the recipient.
#[derive(Debug, Clone, Serialize)]
pub struct SentMessage {
    pub id: i64,
    pub to_user: UserSummary,
    pub body: String,
    #[serde(with = "time::serde::rfc3339")]
    pub sent_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub read_at: Option<OffsetDateTime>,
}

/// Entry in a user's inbox, annotated with the sender.
#[derive(Debug, Clone, Serialize)]
pub struct ReceivedMessage {
    pub id: i64,
    pub from_user: UserSummary,
    pub body: String,
    #[serde(with = "time::serde::rfc3339")]
    pub sent_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub read_at: Option<OffsetDateTime>,
}

/// One side of a mailbox listing: the message plus the other party's card.
#[derive(Debug, FromRow)]
pub struct MailboxRow {
    pub id: i64,
    pub body: String,
    pub sent_at: OffsetDateTime,
    pub read_at: Option<OffsetDateTime>,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
}

impl MailboxRow {
    fn contact(&self) -> UserSummary {
        UserSummary {
            username: self.username.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            phone: self.phone.clone(),
        }
    }
}

impl From<MailboxRow> for SentMessage {
    fn from(r: MailboxRow) -> Self {
        Self {
            to_user: r.contact(),
            id: r.id,
            body: r.body,
            sent_at: r.sent_at,
            read_at: r.read_at,
        }
    }
}

impl From<MailboxRow> for ReceivedMessage {
    fn from(r: MailboxRow) -> Self {
        Self {
            from_user: r.contact(),
            id: r.id,
            body: r.body,
            sent_at: r.sent_at,
            read_at: r.read_at,
        }
    }
}

impl Parties for MessageRecord {
    fn from_username(&self) -> &str {
        &self.from_username
    }
    fn to_username(&self) -> &str {
        &self.to_username
    }
}

impl Parties for MessageDetail {
    fn from_username(&self) -> &str {
        &self.from_user.username
    }
    fn to_username(&self) -> &str {
        &self.to_user.username
    }
}
