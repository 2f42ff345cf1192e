//! UseCase: プライベートチャット作成

use std::sync::Arc;

use crate::domain::{Chat, ChatKind, ChatRepository, UserId, UserRepository};

use super::error::ChatError;

/// プライベートチャット作成のユースケース
pub struct CreatePrivateChatUseCase {
    chats: Arc<dyn ChatRepository>,
    users: Arc<dyn UserRepository>,
}

impl CreatePrivateChatUseCase {
    pub fn new(chats: Arc<dyn ChatRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { chats, users }
    }

    /// `user_id` と `other_id` の 2 人のチャットを作成する
    ///
    /// # Errors
    ///
    /// - 自分自身とのチャット: `ChatError::SelfChat`
    /// - 相手が存在しない: `ChatError::InvalidUser`
    /// - 既に存在する: `ChatError::AlreadyExists`
    pub async fn execute(&self, user_id: UserId, other_id: UserId) -> Result<Chat, ChatError> {
        if user_id == other_id {
            return Err(ChatError::SelfChat);
        }
        if self.users.get_user(other_id).await?.is_none() {
            return Err(ChatError::InvalidUser(other_id));
        }
        if self.chats.private_chat_exists(user_id, other_id).await? {
            return Err(ChatError::AlreadyExists);
        }

        let chat = self
            .chats
            .create_chat(ChatKind::Private, None, vec![user_id, other_id])
            .await?;
        tracing::info!(
            "Private chat {} created for users {} and {}",
            chat.id,
            user_id,
            other_id
        );
        Ok(chat)
    }
}
