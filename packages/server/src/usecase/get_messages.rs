//! UseCase: チャットのメッセージ一覧

use std::sync::Arc;

use crate::domain::{ChatId, ChatRepository, Message, MessageRepository, UserId};

use super::error::MessageError;

/// メッセージ一覧取得のユースケース
pub struct GetMessagesUseCase {
    chats: Arc<dyn ChatRepository>,
    messages: Arc<dyn MessageRepository>,
}

impl GetMessagesUseCase {
    pub fn new(chats: Arc<dyn ChatRepository>, messages: Arc<dyn MessageRepository>) -> Self {
        Self { chats, messages }
    }

    /// チャットのメッセージを古い順に取得する（メンバーのみ）
    pub async fn execute(
        &self,
        user_id: UserId,
        chat_id: ChatId,
    ) -> Result<Vec<Message>, MessageError> {
        if self.chats.get_chat(chat_id, user_id).await?.is_none() {
            return Err(MessageError::ChatNotFound);
        }
        Ok(self.messages.get_messages_by_chat(chat_id).await?)
    }
}
