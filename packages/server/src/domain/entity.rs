//! Core domain models for the chat application.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::value_object::{
    ChatId, DisplayName, MessageContent, MessageId, PasswordDigest, SessionToken, UserId, Username,
};

/// A registered user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub username: Username,
    pub display_name: DisplayName,
    /// Never serialized
    #[serde(skip)]
    pub key: PasswordDigest,
}

/// A live login of one user.
///
/// Sessions expire lazily: an expired session is only removed the next time it
/// is looked up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: SessionToken,
    pub user_id: UserId,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn new(token: SessionToken, user_id: UserId, expires_at: DateTime<Utc>) -> Self {
        Self {
            token,
            user_id,
            expires_at,
        }
    }

    /// Whether the session is past its expiry at `now`
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Kind of chat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatKind {
    /// Exactly two members
    Private,
    /// Any number of members, usually named
    Group,
}

/// A conversation between members
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    pub id: ChatId,
    pub name: Option<String>,
    pub kind: ChatKind,
    pub member_ids: Vec<UserId>,
}

impl Chat {
    pub fn has_member(&self, user_id: UserId) -> bool {
        self.member_ids.contains(&user_id)
    }
}

/// A message posted to a chat
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub chat_id: ChatId,
    pub user_id: UserId,
    pub content: MessageContent,
    pub created_at: DateTime<Utc>,
}
