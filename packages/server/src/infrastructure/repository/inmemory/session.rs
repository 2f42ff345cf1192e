//! InMemory Session Repository 実装
//!
//! セッションは遅延失効する。バックグラウンドでの掃除は行わず、
//! `check_session` で期限切れが見つかった時点で削除する。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use beango_shared::time::Clock;
use tokio::sync::Mutex;

use crate::domain::{Session, SessionRepository};

/// インメモリ Session Repository 実装
pub struct InMemorySessionRepository {
    /// Key: session token
    sessions: Mutex<HashMap<String, Session>>,
    clock: Arc<dyn Clock>,
}

impl InMemorySessionRepository {
    /// 新しい InMemorySessionRepository を作成
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// 保持しているセッション数（期限切れを含む）
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn set_session(&self, session: Session) {
        let mut sessions = self.sessions.lock().await;
        // one session per user
        sessions.retain(|_, existing| existing.user_id != session.user_id);
        tracing::debug!("Session stored for user {}", session.user_id);
        sessions.insert(session.token.as_str().to_string(), session);
    }

    async fn check_session(&self, token: &str) -> Option<Session> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions.get(token)?;
        if session.is_expired(self.clock.now()) {
            tracing::debug!("Session for user {} expired", session.user_id);
            sessions.remove(token);
            return None;
        }
        Some(session.clone())
    }

    async fn delete_session(&self, token: &str) -> bool {
        let mut sessions = self.sessions.lock().await;
        sessions.remove(token).is_some()
    }
}
