//! UseCase: メッセージ送信処理
//!
//! メッセージを保存してから、チャットを購読している SSE 接続に
//! `message` イベントとして配信する。

use std::sync::Arc;

use beango_shared::time::Clock;

use crate::domain::{
    ChatId, ChatRepository, EventPublisher, Message, MessageContent, MessageRepository, UserId,
};

use super::error::MessageError;

/// 新しいメッセージを知らせるイベント名
pub const MESSAGE_EVENT: &str = "message";

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    chats: Arc<dyn ChatRepository>,
    messages: Arc<dyn MessageRepository>,
    /// EventPublisher（リアルタイム配信の抽象化）
    publisher: Arc<dyn EventPublisher>,
    clock: Arc<dyn Clock>,
}

impl SendMessageUseCase {
    pub fn new(
        chats: Arc<dyn ChatRepository>,
        messages: Arc<dyn MessageRepository>,
        publisher: Arc<dyn EventPublisher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            chats,
            messages,
            publisher,
            clock,
        }
    }

    /// メッセージ送信を実行
    ///
    /// # Returns
    ///
    /// * `Ok(Message)` - 保存されたメッセージ
    /// * `Err(MessageError)` - チャットが見つからない、内容が不正、保存に失敗
    pub async fn execute(
        &self,
        user_id: UserId,
        chat_id: ChatId,
        content: String,
    ) -> Result<Message, MessageError> {
        if self.chats.get_chat(chat_id, user_id).await?.is_none() {
            return Err(MessageError::ChatNotFound);
        }
        let content = MessageContent::new(content)?;

        // 1. 保存
        let message = self
            .messages
            .create_message(chat_id, user_id, content, self.clock.now())
            .await?;

        // 2. 配信（配信の失敗は送信の失敗ではない）
        match serde_json::to_string(&message) {
            Ok(data) => {
                let delivered = self.publisher.publish(chat_id, MESSAGE_EVENT, &data);
                tracing::debug!(
                    "Message {} published to {} connection(s) of chat {}",
                    message.id,
                    delivered,
                    chat_id
                );
            }
            Err(e) => tracing::error!("Failed to encode message {}: {}", message.id, e),
        }

        Ok(message)
    }
}
