//! UseCase: セッション確認
//!
//! 認証ミドルウェアと SSE のセッション監視が使う `SessionValidator` の実装。

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{
    RepositoryError, Session, SessionRepository, SessionValidator, User, UserId, UserRepository,
};

/// セッション確認のユースケース
pub struct CheckSessionUseCase {
    users: Arc<dyn UserRepository>,
    sessions: Arc<dyn SessionRepository>,
}

impl CheckSessionUseCase {
    pub fn new(users: Arc<dyn UserRepository>, sessions: Arc<dyn SessionRepository>) -> Self {
        Self { users, sessions }
    }
}

#[async_trait]
impl SessionValidator for CheckSessionUseCase {
    async fn check_session(&self, token: &str) -> Option<Session> {
        self.sessions.check_session(token).await
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        self.users.get_user(id).await
    }
}
