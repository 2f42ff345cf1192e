//! Repository trait 定義
//!
//! ドメイン層が必要とするデータアクセスのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{
    Chat, ChatId, ChatKind, DisplayName, Message, MessageContent, PasswordDigest, RepositoryError,
    Session, User, UserId, Username,
};

/// User Repository trait
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// ユーザーを作成（username が重複する場合は `RepositoryError::UsernameTaken`）
    async fn create_user(
        &self,
        username: Username,
        display_name: DisplayName,
        key: PasswordDigest,
    ) -> Result<User, RepositoryError>;

    /// ID でユーザーを取得
    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    /// username でユーザーを取得
    async fn get_user_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, RepositoryError>;

    /// 複数の ID でユーザーを取得（存在しない ID は無視）
    async fn get_users(&self, ids: &[UserId]) -> Result<Vec<User>, RepositoryError>;
}

/// Session Repository trait
///
/// 期限切れのセッションは `check_session` で参照された時点で削除される（遅延失効）。
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// セッションを保存する。同じユーザーの既存セッションは置き換えられる。
    async fn set_session(&self, session: Session);

    /// 有効なセッションを取得
    async fn check_session(&self, token: &str) -> Option<Session>;

    /// セッションを削除（削除した場合 true）
    async fn delete_session(&self, token: &str) -> bool;
}

/// Chat Repository trait
#[async_trait]
pub trait ChatRepository: Send + Sync {
    /// チャットを作成
    async fn create_chat(
        &self,
        kind: ChatKind,
        name: Option<String>,
        member_ids: Vec<UserId>,
    ) -> Result<Chat, RepositoryError>;

    /// メンバーであるユーザーから見えるチャットを取得
    async fn get_chat(&self, id: ChatId, user_id: UserId) -> Result<Option<Chat>, RepositoryError>;

    /// ユーザーが参加しているチャットの一覧
    async fn get_chats_by_user(&self, user_id: UserId) -> Result<Vec<Chat>, RepositoryError>;

    /// 2 人の間のプライベートチャットが既に存在するか
    async fn private_chat_exists(
        &self,
        first: UserId,
        second: UserId,
    ) -> Result<bool, RepositoryError>;
}

/// Message Repository trait
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// メッセージを保存
    async fn create_message(
        &self,
        chat_id: ChatId,
        user_id: UserId,
        content: MessageContent,
        created_at: DateTime<Utc>,
    ) -> Result<Message, RepositoryError>;

    /// チャットのメッセージを古い順に取得
    async fn get_messages_by_chat(&self, chat_id: ChatId) -> Result<Vec<Message>, RepositoryError>;
}

/// Session Validator trait
///
/// 認証ミドルウェアが依存する唯一の外部境界。
/// セッショントークンの有効性の確認と、所有ユーザーの解決のみを行う。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionValidator: Send + Sync {
    /// トークンが有効なセッションを指していれば返す
    async fn check_session(&self, token: &str) -> Option<Session>;

    /// セッションの所有ユーザーを取得
    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepositoryError>;
}

/// Event Publisher trait
///
/// チャット単位でリアルタイムイベントを配信する。
/// 誰も購読していないチャットへの配信は何もしない（エラーではない）。
#[cfg_attr(test, mockall::automock)]
pub trait EventPublisher: Send + Sync {
    /// `chat_id` を購読している全ての接続にイベントを送る。配信した接続数を返す。
    fn publish(&self, chat_id: ChatId, event: &str, data: &str) -> usize;
}
