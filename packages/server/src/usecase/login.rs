//! UseCase: ログイン（セッション作成）

use std::sync::Arc;

use beango_shared::time::Clock;
use chrono::Duration;

use crate::domain::{Session, SessionRepository, SessionToken, UserRepository, Username};

use super::error::LoginError;

/// ログインのユースケース
pub struct LoginUseCase {
    users: Arc<dyn UserRepository>,
    sessions: Arc<dyn SessionRepository>,
    clock: Arc<dyn Clock>,
    /// セッションの有効期間
    session_ttl: Duration,
}

impl LoginUseCase {
    pub fn new(
        users: Arc<dyn UserRepository>,
        sessions: Arc<dyn SessionRepository>,
        clock: Arc<dyn Clock>,
        session_ttl: Duration,
    ) -> Self {
        Self {
            users,
            sessions,
            clock,
            session_ttl,
        }
    }

    /// トークンが有効なセッションを指しているか
    pub async fn is_logged_in(&self, token: &str) -> bool {
        self.sessions.check_session(token).await.is_some()
    }

    /// 資格情報を確認し、新しいセッションを作成する
    ///
    /// 同じユーザーの既存セッションは置き換えられる。
    pub async fn execute(&self, username: String, password: &str) -> Result<Session, LoginError> {
        let username = Username::new(username).map_err(|_| LoginError::InvalidCredentials)?;
        let user = self
            .users
            .get_user_by_username(&username)
            .await?
            .ok_or(LoginError::InvalidCredentials)?;
        if !user.key.verify(&username, password) {
            return Err(LoginError::InvalidCredentials);
        }

        let session = Session::new(
            SessionToken::generate(),
            user.id,
            self.clock.now() + self.session_ttl,
        );
        self.sessions.set_session(session.clone()).await;
        tracing::info!("User {} logged in", user.id);
        Ok(session)
    }
}
