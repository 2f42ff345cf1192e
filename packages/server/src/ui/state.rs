//! Server state shared by every handler.

use std::{sync::Arc, time::Duration};

use beango_shared::time::Clock;
use tokio_util::sync::CancellationToken;

use crate::{
    infrastructure::{
        message_pusher::ConnectionRegistry,
        repository::{
            InMemoryChatRepository, InMemoryMessageRepository, InMemorySessionRepository,
            InMemoryUserRepository,
        },
    },
    usecase::{
        CheckSessionUseCase, CreatePrivateChatUseCase, CreateUserUseCase, GetChatsUseCase,
        GetMessagesUseCase, LoginUseCase, LogoutUseCase, SendMessageUseCase,
    },
};

/// Shared application state
pub struct AppState {
    /// CreateUserUseCase（ユーザー登録のユースケース）
    pub create_user_usecase: Arc<CreateUserUseCase>,
    /// LoginUseCase（ログインのユースケース）
    pub login_usecase: Arc<LoginUseCase>,
    /// LogoutUseCase（ログアウトのユースケース）
    pub logout_usecase: Arc<LogoutUseCase>,
    /// CheckSessionUseCase（認証ミドルウェアと SSE のセッション監視が使う）
    pub check_session_usecase: Arc<CheckSessionUseCase>,
    /// GetChatsUseCase（チャット一覧・チャット取得のユースケース）
    pub get_chats_usecase: Arc<GetChatsUseCase>,
    /// CreatePrivateChatUseCase（プライベートチャット作成のユースケース）
    pub create_private_chat_usecase: Arc<CreatePrivateChatUseCase>,
    /// GetMessagesUseCase（メッセージ一覧のユースケース）
    pub get_messages_usecase: Arc<GetMessagesUseCase>,
    /// SendMessageUseCase（メッセージ送信のユースケース）
    pub send_message_usecase: Arc<SendMessageUseCase>,
    /// チャットごとの SSE 接続
    pub connections: Arc<ConnectionRegistry>,
    /// キャンセルされると全ての SSE 接続が閉じる
    pub shutdown: CancellationToken,
    /// SSE 接続中のセッション再確認の間隔（`None` で無効）
    pub session_check_interval: Option<Duration>,
}

impl AppState {
    /// Wire every use case over the in-memory repositories.
    pub fn in_memory(
        clock: Arc<dyn Clock>,
        session_ttl: chrono::Duration,
        session_check_interval: Option<Duration>,
    ) -> Self {
        // 1. Repositories
        let users = Arc::new(InMemoryUserRepository::new());
        let sessions = Arc::new(InMemorySessionRepository::new(clock.clone()));
        let chats = Arc::new(InMemoryChatRepository::new());
        let messages = Arc::new(InMemoryMessageRepository::new());

        // 2. SSE connection registry (EventPublisher)
        let connections = Arc::new(ConnectionRegistry::new());

        // 3. UseCases
        Self {
            create_user_usecase: Arc::new(CreateUserUseCase::new(users.clone())),
            login_usecase: Arc::new(LoginUseCase::new(
                users.clone(),
                sessions.clone(),
                clock.clone(),
                session_ttl,
            )),
            logout_usecase: Arc::new(LogoutUseCase::new(sessions.clone())),
            check_session_usecase: Arc::new(CheckSessionUseCase::new(users.clone(), sessions)),
            get_chats_usecase: Arc::new(GetChatsUseCase::new(chats.clone(), users.clone())),
            create_private_chat_usecase: Arc::new(CreatePrivateChatUseCase::new(
                chats.clone(),
                users,
            )),
            get_messages_usecase: Arc::new(GetMessagesUseCase::new(
                chats.clone(),
                messages.clone(),
            )),
            send_message_usecase: Arc::new(SendMessageUseCase::new(
                chats,
                messages,
                connections.clone(),
                clock,
            )),
            connections,
            shutdown: CancellationToken::new(),
            session_check_interval,
        }
    }
}
