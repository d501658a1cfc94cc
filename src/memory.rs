//! In-process stand-in for the Postgres stores, used by unit and router tests.
//! Mirrors the SQL semantics: unique usernames, foreign keys on both message
//! parties, insertion-ordered listings and a write-once `read_at`.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::auth::password;
use crate::error::AppError;
use crate::messages::repo::{ensure_body, message_not_found, MessageStore};
use crate::messages::repo_types::{
    MessageDetail, MessageRecord, ReadReceipt, ReceivedMessage, SentMessage,
};
use crate::users::repo::{user_not_found, UserStore};
use crate::users::repo_types::{NewUser, UserProfile, UserSummary};

fn summary_of(p: &UserProfile) -> UserSummary {
    UserSummary {
        username: p.username.clone(),
        first_name: p.first_name.clone(),
        last_name: p.last_name.clone(),
        phone: p.phone.clone(),
    }
}

struct StoredUser {
    profile: UserProfile,
    password_hash: String,
}

struct StoredMessage {
    id: i64,
    from_username: String,
    to_username: String,
    body: String,
    sent_at: OffsetDateTime,
    read_at: Option<OffsetDateTime>,
}

#[derive(Default)]
struct Inner {
    users: Vec<StoredUser>,
    messages: Vec<StoredMessage>,
    next_id: i64,
}

impl Inner {
    fn user(&self, username: &str) -> Option<&StoredUser> {
        self.users.iter().find(|u| u.profile.username == username)
    }

    fn summary(&self, username: &str) -> Result<UserSummary, AppError> {
        self.user(username)
            .map(|u| summary_of(&u.profile))
            .ok_or_else(|| user_not_found(username))
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    fn lock(&self) -> Result<MutexGuard<'_, Inner>, AppError> {
        self.inner
            .lock()
            .map_err(|_| AppError::Internal(anyhow::anyhow!("memory store poisoned")))
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn register(&self, new_user: NewUser) -> Result<UserProfile, AppError> {
        let password_hash = password::hash_password_blocking(new_user.password).await?;
        let now = OffsetDateTime::now_utc();

        let mut inner = self.lock()?;
        if inner.user(&new_user.username).is_some() {
            return Err(AppError::DuplicateKey("Username already taken".into()));
        }
        let profile = UserProfile {
            username: new_user.username,
            first_name: new_user.first_name,
            last_name: new_user.last_name,
            phone: new_user.phone,
            join_at: now,
            last_login_at: now,
        };
        inner.users.push(StoredUser {
            profile: profile.clone(),
            password_hash,
        });
        Ok(profile)
    }

    async fn verify_password(&self, username: &str, password: &str) -> Result<bool, AppError> {
        let hash = self.lock()?.user(username).map(|u| u.password_hash.clone());
        match hash {
            Some(hash) => Ok(password::verify_password_blocking(password.to_string(), hash).await?),
            None => Ok(password::verify_unknown_user_blocking(password.to_string()).await?),
        }
    }

    async fn touch_login(&self, username: &str) -> Result<(), AppError> {
        let mut inner = self.lock()?;
        let user = inner
            .users
            .iter_mut()
            .find(|u| u.profile.username == username)
            .ok_or_else(|| user_not_found(username))?;
        user.profile.last_login_at = OffsetDateTime::now_utc();
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<UserSummary>, AppError> {
        Ok(self.lock()?.users.iter().map(|u| summary_of(&u.profile)).collect())
    }

    async fn get_profile(&self, username: &str) -> Result<UserProfile, AppError> {
        self.lock()?
            .user(username)
            .map(|u| u.profile.clone())
            .ok_or_else(|| user_not_found(username))
    }
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn create(&self, from: &str, to: &str, body: &str) -> Result<MessageRecord, AppError> {
        ensure_body(body)?;
        let mut inner = self.lock()?;
        if inner.user(from).is_none() || inner.user(to).is_none() {
            return Err(AppError::Validation("Unknown user".into()));
        }
        inner.next_id += 1;
        let msg = StoredMessage {
            id: inner.next_id,
            from_username: from.to_string(),
            to_username: to.to_string(),
            body: body.to_string(),
            sent_at: OffsetDateTime::now_utc(),
            read_at: None,
        };
        let record = MessageRecord {
            id: msg.id,
            from_username: msg.from_username.clone(),
            to_username: msg.to_username.clone(),
            body: msg.body.clone(),
            sent_at: msg.sent_at,
        };
        inner.messages.push(msg);
        Ok(record)
    }

    async fn get(&self, id: i64) -> Result<MessageDetail, AppError> {
        let inner = self.lock()?;
        let m = inner
            .messages
            .iter()
            .find(|m| m.id == id)
            .ok_or_else(|| message_not_found(id))?;
        Ok(MessageDetail {
            id: m.id,
            body: m.body.clone(),
            sent_at: m.sent_at,
            read_at: m.read_at,
            from_user: inner.summary(&m.from_username)?,
            to_user: inner.summary(&m.to_username)?,
        })
    }

    async fn mark_read(&self, id: i64) -> Result<ReadReceipt, AppError> {
        let mut inner = self.lock()?;
        let m = inner
            .messages
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| message_not_found(id))?;
        let read_at = *m.read_at.get_or_insert_with(OffsetDateTime::now_utc);
        Ok(ReadReceipt { id, read_at })
    }

    async fn list_sent_by(&self, username: &str) -> Result<Vec<SentMessage>, AppError> {
        let inner = self.lock()?;
        inner
            .messages
            .iter()
            .filter(|m| m.from_username == username)
            .map(|m| {
                Ok(SentMessage {
                    id: m.id,
                    to_user: inner.summary(&m.to_username)?,
                    body: m.body.clone(),
                    sent_at: m.sent_at,
                    read_at: m.read_at,
                })
            })
            .collect()
    }

    async fn list_received_by(&self, username: &str) -> Result<Vec<ReceivedMessage>, AppError> {
        let inner = self.lock()?;
        inner
            .messages
            .iter()
            .filter(|m| m.to_username == username)
            .map(|m| {
                Ok(ReceivedMessage {
                    id: m.id,
                    from_user: inner.summary(&m.from_username)?,
                    body: m.body.clone(),
                    sent_at: m.sent_at,
                    read_at: m.read_at,
                })
            })
            .collect()
    }
}

pub fn new_user(username: &str, password: &str) -> NewUser {
    NewUser {
        username: username.into(),
        password: password.into(),
        first_name: format!("{}-first", username),
        last_name: format!("{}-last", username),
        phone: "+15555550100".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded() -> MemoryStore {
        let store = MemoryStore::default();
        store.register(new_user("alice", "secret1")).await.unwrap();
        store.register(new_user("bob", "secret2")).await.unwrap();
        store
    }

    #[tokio::test]
    async fn verify_password_outcomes() {
        let store = seeded().await;
        assert!(store.verify_password("alice", "secret1").await.unwrap());
        assert!(!store.verify_password("alice", "secret2").await.unwrap());
        assert!(!store.verify_password("nobody", "anything").await.unwrap());
    }

    #[tokio::test]
    async fn unknown_user_still_runs_a_hash_check() {
        let store = seeded().await;
        // the dummy hash's own password must not log anyone in
        assert!(!store.verify_password("nobody", "messagely-unknown-user").await.unwrap());
        assert!(!store.verify_password("", "").await.unwrap());
    }

    #[tokio::test]
    async fn touch_login_unknown_user_is_not_found() {
        let store = seeded().await;
        assert!(matches!(store.touch_login("ghost").await, Err(AppError::NotFound(_))));
        assert!(matches!(store.get_profile("ghost").await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn list_all_is_insertion_ordered_and_public() {
        let store = seeded().await;
        let users = store.list_all().await.unwrap();
        let names: Vec<_> = users.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, ["alice", "bob"]);
        let json = serde_json::to_string(&users).unwrap();
        assert!(!json.contains("argon2"));
    }

    #[tokio::test]
    async fn list_all_follows_registration_not_name() {
        let store = MemoryStore::default();
        for name in ["zed", "amy", "mia"] {
            store.register(new_user(name, "secret1")).await.unwrap();
        }
        let names: Vec<_> = store
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.username)
            .collect();
        assert_eq!(names, ["zed", "amy", "mia"]);
    }

    #[tokio::test]
    async fn create_validates_body_and_parties() {
        let store = seeded().await;
        assert!(matches!(store.create("alice", "bob", "  ").await, Err(AppError::Validation(_))));
        assert!(matches!(store.create("alice", "ghost", "hi").await, Err(AppError::Validation(_))));
        assert!(matches!(store.create("ghost", "bob", "hi").await, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn mark_read_keeps_first_timestamp() {
        let store = seeded().await;
        let msg = store.create("alice", "bob", "hi").await.unwrap();
        assert!(store.get(msg.id).await.unwrap().read_at.is_none());

        let first = store.mark_read(msg.id).await.unwrap();
        assert!(first.read_at >= msg.sent_at);
        let second = store.mark_read(msg.id).await.unwrap();
        assert_eq!(first.read_at, second.read_at);

        assert!(matches!(store.mark_read(999).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn mailboxes_are_split_by_direction() {
        let store = seeded().await;
        let first = store.create("alice", "bob", "hi").await.unwrap();
        let second = store.create("bob", "alice", "hey").await.unwrap();
        assert!(second.id > first.id);

        let sent = store.list_sent_by("alice").await.unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to_user.username, "bob");
        assert_eq!(sent[0].body, "hi");

        let received = store.list_received_by("alice").await.unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].from_user.username, "bob");
        assert_eq!(received[0].from_user.first_name, "bob-first");
    }
}
