//! InMemory Chat / Message Repository 実装

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::domain::{
    Chat, ChatId, ChatKind, ChatRepository, Message, MessageContent, MessageId, MessageRepository,
    RepositoryError, UserId,
};

#[derive(Default)]
struct ChatTable {
    next_id: i64,
    rows: BTreeMap<ChatId, Chat>,
}

/// インメモリ Chat Repository 実装
///
/// チャット ID の昇順で一覧を返す。
#[derive(Default)]
pub struct InMemoryChatRepository {
    table: Mutex<ChatTable>,
}

impl InMemoryChatRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChatRepository for InMemoryChatRepository {
    async fn create_chat(
        &self,
        kind: ChatKind,
        name: Option<String>,
        member_ids: Vec<UserId>,
    ) -> Result<Chat, RepositoryError> {
        let mut table = self.table.lock().await;
        table.next_id += 1;
        let chat = Chat {
            id: ChatId::new(table.next_id),
            name,
            kind,
            member_ids,
        };
        table.rows.insert(chat.id, chat.clone());
        tracing::debug!("Chat {} stored", chat.id);
        Ok(chat)
    }

    async fn get_chat(&self, id: ChatId, user_id: UserId) -> Result<Option<Chat>, RepositoryError> {
        let table = self.table.lock().await;
        Ok(table
            .rows
            .get(&id)
            .filter(|chat| chat.has_member(user_id))
            .cloned())
    }

    async fn get_chats_by_user(&self, user_id: UserId) -> Result<Vec<Chat>, RepositoryError> {
        let table = self.table.lock().await;
        Ok(table
            .rows
            .values()
            .filter(|chat| chat.has_member(user_id))
            .cloned()
            .collect())
    }

    async fn private_chat_exists(
        &self,
        first: UserId,
        second: UserId,
    ) -> Result<bool, RepositoryError> {
        let table = self.table.lock().await;
        Ok(table.rows.values().any(|chat| {
            chat.kind == ChatKind::Private && chat.has_member(first) && chat.has_member(second)
        }))
    }
}

#[derive(Default)]
struct MessageTable {
    next_id: i64,
    rows: Vec<Message>,
}

/// インメモリ Message Repository 実装
///
/// 挿入順（= 作成順）でメッセージを保持する。
#[derive(Default)]
pub struct InMemoryMessageRepository {
    table: Mutex<MessageTable>,
}

impl InMemoryMessageRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn create_message(
        &self,
        chat_id: ChatId,
        user_id: UserId,
        content: MessageContent,
        created_at: DateTime<Utc>,
    ) -> Result<Message, RepositoryError> {
        let mut table = self.table.lock().await;
        table.next_id += 1;
        let message = Message {
            id: MessageId::new(table.next_id),
            chat_id,
            user_id,
            content,
            created_at,
        };
        table.rows.push(message.clone());
        Ok(message)
    }

    async fn get_messages_by_chat(&self, chat_id: ChatId) -> Result<Vec<Message>, RepositoryError> {
        let table = self.table.lock().await;
        Ok(table
            .rows
            .iter()
            .filter(|message| message.chat_id == chat_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_chat_requires_membership() {
        // テスト項目: メンバーでないユーザーからはチャットが見えない
        // given (前提条件):
        let repository = InMemoryChatRepository::new();
        let chat = repository
            .create_chat(ChatKind::Private, None, vec![UserId::new(1), UserId::new(2)])
            .await
            .unwrap();

        // when (操作):
        let as_member = repository.get_chat(chat.id, UserId::new(2)).await.unwrap();
        let as_stranger = repository.get_chat(chat.id, UserId::new(3)).await.unwrap();

        // then (期待する結果):
        assert_eq!(as_member, Some(chat));
        assert_eq!(as_stranger, None);
    }

    #[tokio::test]
    async fn test_private_chat_exists_is_symmetric() {
        // テスト項目: プライベートチャットの存在確認はメンバーの順序に依存しない
        // given (前提条件):
        let repository = InMemoryChatRepository::new();
        repository
            .create_chat(ChatKind::Private, None, vec![UserId::new(1), UserId::new(2)])
            .await
            .unwrap();
        repository
            .create_chat(
                ChatKind::Group,
                Some("team".to_string()),
                vec![UserId::new(1), UserId::new(3)],
            )
            .await
            .unwrap();

        // when (操作):
        let forward = repository
            .private_chat_exists(UserId::new(1), UserId::new(2))
            .await
            .unwrap();
        let backward = repository
            .private_chat_exists(UserId::new(2), UserId::new(1))
            .await
            .unwrap();
        let group_only = repository
            .private_chat_exists(UserId::new(1), UserId::new(3))
            .await
            .unwrap();

        // then (期待する結果):
        assert!(forward);
        assert!(backward);
        assert!(!group_only);
    }

    #[tokio::test]
    async fn test_get_chats_by_user() {
        // テスト項目: ユーザーが参加しているチャットのみが ID 順に返される
        // given (前提条件):
        let repository = InMemoryChatRepository::new();
        let first = repository
            .create_chat(ChatKind::Private, None, vec![UserId::new(1), UserId::new(2)])
            .await
            .unwrap();
        repository
            .create_chat(ChatKind::Private, None, vec![UserId::new(2), UserId::new(3)])
            .await
            .unwrap();
        let third = repository
            .create_chat(ChatKind::Private, None, vec![UserId::new(3), UserId::new(1)])
            .await
            .unwrap();

        // when (操作):
        let chats = repository.get_chats_by_user(UserId::new(1)).await.unwrap();

        // then (期待する結果):
        assert_eq!(chats, vec![first, third]);
    }

    #[tokio::test]
    async fn test_get_messages_by_chat_keeps_insertion_order() {
        // テスト項目: チャットごとのメッセージが作成順に返される
        // given (前提条件):
        let repository = InMemoryMessageRepository::new();
        let now = Utc::now();
        for (chat, text) in [(1, "one"), (2, "other"), (1, "two")] {
            repository
                .create_message(
                    ChatId::new(chat),
                    UserId::new(1),
                    MessageContent::new(text.to_string()).unwrap(),
                    now,
                )
                .await
                .unwrap();
        }

        // when (操作):
        let messages = repository
            .get_messages_by_chat(ChatId::new(1))
            .await
            .unwrap();

        // then (期待する結果):
        let contents: Vec<&str> = messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["one", "two"]);
        assert_eq!(messages[0].id, MessageId::new(1));
        assert_eq!(messages[1].id, MessageId::new(3));
    }
}
