//! HTTP API DTOs.
//!
//! Request bodies are deserialized as-is and validated by the use cases
//! through the domain value objects.

use serde::{Deserialize, Serialize};

use crate::domain::{Chat, ChatKind, User};

// ========================================
// Request bodies
// ========================================

/// `POST /user`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateUserInput {
    pub username: String,
    pub password: String,
    /// 省略時は username を表示名に使う
    #[serde(rename = "displayName", default)]
    pub display_name: Option<String>,
}

/// `POST /session`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionInput {
    pub username: String,
    pub password: String,
}

/// `POST /chat`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateChatInput {
    #[serde(rename = "userID")]
    pub user_id: i64,
}

/// `POST /chat/:chatID/message`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SendMessageInput {
    pub content: String,
}

// ========================================
// Response payloads
// ========================================

/// A user as exposed to other users (no credentials)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: i64,
    pub username: String,
    pub display_name: String,
}

/// A chat as listed for one of its members
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatDto {
    pub id: i64,
    /// 名前のないチャットは他のメンバーの表示名から作られる（GetChatsUseCase）
    pub name: String,
    pub kind: ChatKind,
    pub users: Vec<UserDto>,
}

impl ChatDto {
    pub fn new(chat: Chat, members: &[User]) -> Self {
        Self {
            id: chat.id.value(),
            name: chat.name.unwrap_or_default(),
            kind: chat.kind,
            users: members.iter().map(UserDto::from).collect(),
        }
    }
}
