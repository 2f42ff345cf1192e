//! UseCase: チャット一覧・チャット取得

use std::sync::Arc;

use crate::domain::{Chat, ChatId, ChatRepository, User, UserId, UserRepository};

use super::error::ChatError;

/// メンバー情報付きのチャット
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatWithMembers {
    pub chat: Chat,
    pub members: Vec<User>,
}

/// チャット一覧取得のユースケース
pub struct GetChatsUseCase {
    chats: Arc<dyn ChatRepository>,
    users: Arc<dyn UserRepository>,
}

impl GetChatsUseCase {
    pub fn new(chats: Arc<dyn ChatRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { chats, users }
    }

    /// ユーザーが参加しているチャットの一覧
    ///
    /// 名前の無いチャットには、他のメンバーの表示名を並べた名前を付ける。
    pub async fn execute(&self, user_id: UserId) -> Result<Vec<ChatWithMembers>, ChatError> {
        let chats = self.chats.get_chats_by_user(user_id).await?;

        let mut output = Vec::with_capacity(chats.len());
        for mut chat in chats {
            let members = self.users.get_users(&chat.member_ids).await?;
            if chat.name.as_deref().is_none_or(str::is_empty) {
                chat.name = Some(generate_chat_name(user_id, &members));
            }
            output.push(ChatWithMembers { chat, members });
        }
        Ok(output)
    }

    /// ユーザーがメンバーであるチャットを取得
    pub async fn get_chat(&self, chat_id: ChatId, user_id: UserId) -> Result<Chat, ChatError> {
        self.chats
            .get_chat(chat_id, user_id)
            .await?
            .ok_or(ChatError::NotFound)
    }
}

/// `viewer` 以外のメンバーの表示名をソートして ", " で連結する
fn generate_chat_name(viewer: UserId, members: &[User]) -> String {
    let mut names: Vec<&str> = members
        .iter()
        .filter(|member| member.id != viewer)
        .map(|member| member.display_name.as_str())
        .collect();
    names.sort_unstable();
    names.join(", ")
}
