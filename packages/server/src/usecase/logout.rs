//! UseCase: ログアウト

use std::sync::Arc;

use crate::domain::SessionRepository;

/// ログアウトのユースケース
pub struct LogoutUseCase {
    sessions: Arc<dyn SessionRepository>,
}

impl LogoutUseCase {
    pub fn new(sessions: Arc<dyn SessionRepository>) -> Self {
        Self { sessions }
    }

    /// セッションを削除する。トークンが無い・既に無効な場合は何もしない。
    pub async fn execute(&self, token: Option<&str>) -> bool {
        let Some(token) = token.filter(|token| !token.is_empty()) else {
            return false;
        };
        self.sessions.delete_session(token).await
    }
}
