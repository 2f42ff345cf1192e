//! Server-Sent Events を使った接続レジストリ
//!
//! ## 責務
//!
//! - チャットごとに開いている SSE 接続（`SseSink`）を管理
//! - チャット単位のイベント配信（publish）
//! - 切断・シャットダウン時の接続の後始末（trap / close）
//!
//! ## 設計ノート
//!
//! SSE レスポンスの生成は UI 層（`ui/handler/sse.rs`）で行われます。
//! このレジストリは生成された `SseSink` を受け取り、配信に使用します。
//!
//! 全ての register / close / publish は 1 つのロックの下で実行されます。
//! `close` は drop ガードからも呼ばれるため、非同期ではない
//! `std::sync::Mutex` を使います。

use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard, PoisonError},
};

use tokio_util::sync::CancellationToken;

use crate::{
    domain::{ChatId, ConnectionId, EventPublisher},
    ui::routing::{ResponseError, ResponseWriter, SseSink},
};

type Connections = HashMap<ChatId, HashMap<ConnectionId, SseSink>>;

/// チャットごとの SSE 接続レジストリ
///
/// ## フィールド
///
/// - `connections`: チャット ID → (接続 ID → sink)。空になったチャットのエントリは即座に削除される。
#[derive(Default)]
pub struct ConnectionRegistry {
    connections: Mutex<Connections>,
}

/// `trap` が終わる時に必ず接続を閉じるためのガード
struct CloseGuard<'a> {
    registry: &'a ConnectionRegistry,
    chat_id: ChatId,
    connection_id: ConnectionId,
}

impl Drop for CloseGuard<'_> {
    fn drop(&mut self) {
        self.registry.close(self.chat_id, &self.connection_id);
        tracing::info!(
            "SSE connection {} closed for chat {}",
            self.connection_id,
            self.chat_id
        );
    }
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Connections> {
        self.connections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// レスポンスをイベントストリームに切り替える（まだ送信はしない）
    pub fn upgrade(w: &mut ResponseWriter) {
        w.upgrade_sse();
    }

    /// 接続を登録し、新しい接続 ID を返す
    ///
    /// # Errors
    ///
    /// `w` が `upgrade` されていない場合は `ResponseError::NotFlushable`
    pub fn register(
        &self,
        chat_id: ChatId,
        w: &ResponseWriter,
    ) -> Result<ConnectionId, ResponseError> {
        let sink = w.sink().ok_or(ResponseError::NotFlushable)?;
        let connection_id = ConnectionId::generate();

        let mut connections = self.lock();
        connections
            .entry(chat_id)
            .or_default()
            .insert(connection_id.clone(), sink);
        tracing::debug!(
            "SSE connection {} registered for chat {}",
            connection_id,
            chat_id
        );
        Ok(connection_id)
    }

    /// クライアントが切断するか `shutdown` がキャンセルされるまで待機し、接続を閉じる
    ///
    /// 待機がどのように終わっても（キャンセル・future の破棄を含む）接続は削除される。
    pub async fn trap(
        &self,
        shutdown: CancellationToken,
        chat_id: ChatId,
        connection_id: ConnectionId,
    ) {
        let Some(sink) = self.sink(chat_id, &connection_id) else {
            tracing::warn!(
                "SSE connection {} is not registered for chat {}",
                connection_id,
                chat_id
            );
            return;
        };
        let _guard = CloseGuard {
            registry: self,
            chat_id,
            connection_id: connection_id.clone(),
        };
        tracing::info!(
            "SSE connection {} opened for chat {}",
            connection_id,
            chat_id
        );

        tokio::select! {
            _ = sink.closed() => {}
            _ = shutdown.cancelled() => {}
        }
    }

    /// 接続を削除する。チャットの接続が 0 になった場合はチャットのエントリも削除する。
    pub fn close(&self, chat_id: ChatId, connection_id: &ConnectionId) -> bool {
        let mut connections = self.lock();
        let Some(chat_connections) = connections.get_mut(&chat_id) else {
            return false;
        };
        let removed = chat_connections.remove(connection_id).is_some();
        if chat_connections.is_empty() {
            connections.remove(&chat_id);
        }
        removed
    }

    /// チャットを購読している全ての接続にイベントを送る
    ///
    /// 購読者がいない場合は何もしない。配信できた接続数を返す。
    pub fn publish(&self, chat_id: ChatId, event: &str, data: &str) -> usize {
        let connections = self.lock();
        let Some(chat_connections) = connections.get(&chat_id) else {
            return 0;
        };

        let mut delivered = 0;
        for (connection_id, sink) in chat_connections {
            match sink.send(event, data) {
                Ok(()) => {
                    delivered += 1;
                    tracing::info!("[SSE connection {}] sent '{}' event", connection_id, event);
                }
                // 切断済みの接続は trap 側で削除される
                Err(e) => tracing::warn!(
                    "Failed to push '{}' event to SSE connection {}: {}",
                    event,
                    connection_id,
                    e
                ),
            }
        }
        delivered
    }

    /// 1 つの接続にイベントを送る
    pub fn send_to(
        &self,
        chat_id: ChatId,
        connection_id: &ConnectionId,
        event: &str,
        data: &str,
    ) -> Result<(), ResponseError> {
        let sink = self
            .sink(chat_id, connection_id)
            .ok_or(ResponseError::StreamClosed)?;
        sink.send(event, data)?;
        tracing::info!("[SSE connection {}] sent '{}' event", connection_id, event);
        Ok(())
    }

    /// チャットの接続数
    pub fn connection_count(&self, chat_id: ChatId) -> usize {
        self.lock().get(&chat_id).map_or(0, HashMap::len)
    }

    /// チャットのエントリが存在するか
    pub fn has_resource(&self, chat_id: ChatId) -> bool {
        self.lock().contains_key(&chat_id)
    }

    fn sink(&self, chat_id: ChatId, connection_id: &ConnectionId) -> Option<SseSink> {
        self.lock()
            .get(&chat_id)
            .and_then(|chat_connections| chat_connections.get(connection_id))
            .cloned()
    }
}

impl EventPublisher for ConnectionRegistry {
    fn publish(&self, chat_id: ChatId, event: &str, data: &str) -> usize {
        ConnectionRegistry::publish(self, chat_id, event, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::Response;
    use std::{sync::Arc, time::Duration};

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - ConnectionRegistry の登録・削除・配信
    // - 空になったチャットのエントリが残らないこと
    // - trap がクライアント切断・シャットダウンで終了し、必ず後始末すること
    // ========================================

    fn upgraded_writer() -> ResponseWriter {
        let mut writer = ResponseWriter::new();
        ConnectionRegistry::upgrade(&mut writer);
        writer
    }

    async fn read_frame(response: &mut Response) -> String {
        use axum::body::HttpBody;
        use std::future::poll_fn;
        use std::pin::Pin;

        let frame = poll_fn(|cx| Pin::new(response.body_mut()).poll_frame(cx))
            .await
            .unwrap()
            .unwrap();
        String::from_utf8(frame.into_data().unwrap().to_vec()).unwrap()
    }

    #[test]
    fn test_register_two_connections_same_chat() {
        // テスト項目: 同じチャットに 2 つの接続を登録すると独立した 2 エントリになる
        // given (前提条件):
        let registry = ConnectionRegistry::new();
        let chat = ChatId::new(7);
        let first_writer = upgraded_writer();
        let second_writer = upgraded_writer();

        // when (操作):
        let first = registry.register(chat, &first_writer).unwrap();
        let second = registry.register(chat, &second_writer).unwrap();

        // then (期待する結果):
        assert_ne!(first, second);
        assert_eq!(registry.connection_count(chat), 2);
    }

    #[test]
    fn test_register_requires_upgrade() {
        // テスト項目: SSE に切り替えていない writer は登録できない
        // given (前提条件):
        let registry = ConnectionRegistry::new();
        let writer = ResponseWriter::new();

        // when (操作):
        let result = registry.register(ChatId::new(1), &writer);

        // then (期待する結果):
        assert_eq!(result, Err(ResponseError::NotFlushable));
        assert!(!registry.has_resource(ChatId::new(1)));
    }

    #[test]
    fn test_close_prunes_empty_chat() {
        // テスト項目: 最後の接続を閉じるとチャットのエントリ自体が削除される
        // given (前提条件):
        let registry = ConnectionRegistry::new();
        let chat = ChatId::new(7);
        let (w1, w2) = (upgraded_writer(), upgraded_writer());
        let first = registry.register(chat, &w1).unwrap();
        let second = registry.register(chat, &w2).unwrap();

        // when (操作):
        let closed_first = registry.close(chat, &first);

        // then (期待する結果):
        assert!(closed_first);
        assert!(registry.has_resource(chat));
        assert_eq!(registry.connection_count(chat), 1);

        // when (操作):
        let closed_second = registry.close(chat, &second);

        // then (期待する結果):
        assert!(closed_second);
        assert!(!registry.has_resource(chat));
        assert!(!registry.close(chat, &second));
    }

    #[test]
    fn test_publish_without_connections_is_noop() {
        // テスト項目: 購読者のいないチャットへの配信は何もしない
        // given (前提条件):
        let registry = ConnectionRegistry::new();

        // when (操作):
        let delivered = registry.publish(ChatId::new(42), "message", "{}");

        // then (期待する結果):
        assert_eq!(delivered, 0);
        assert!(!registry.has_resource(ChatId::new(42)));
    }

    #[tokio::test]
    async fn test_publish_reaches_only_subscribers_of_chat() {
        // テスト項目: 配信は対象チャットの全接続にのみ届く
        // given (前提条件):
        let registry = ConnectionRegistry::new();
        let (w1, w2, other) = (upgraded_writer(), upgraded_writer(), upgraded_writer());
        registry.register(ChatId::new(1), &w1).unwrap();
        registry.register(ChatId::new(1), &w2).unwrap();
        registry.register(ChatId::new(2), &other).unwrap();
        let (mut r1, mut r2) = (w1.commit(), w2.commit());

        // when (操作):
        let delivered = registry.publish(ChatId::new(1), "message", r#"{"id":1}"#);

        // then (期待する結果):
        assert_eq!(delivered, 2);
        let expected = "event: message\ndata: {\"id\":1}\n\n";
        assert_eq!(read_frame(&mut r1).await, expected);
        assert_eq!(read_frame(&mut r2).await, expected);
    }

    #[tokio::test]
    async fn test_publish_skips_disconnected_connection() {
        // テスト項目: 切断済みの接続への配信失敗は他の接続に影響しない
        // given (前提条件):
        let registry = ConnectionRegistry::new();
        let (gone, alive) = (upgraded_writer(), upgraded_writer());
        registry.register(ChatId::new(1), &gone).unwrap();
        registry.register(ChatId::new(1), &alive).unwrap();
        drop(gone.commit());
        let mut alive = alive.commit();

        // when (操作):
        let delivered = registry.publish(ChatId::new(1), "", "hello");

        // then (期待する結果):
        assert_eq!(delivered, 1);
        assert_eq!(read_frame(&mut alive).await, "event: message\ndata: hello\n\n");
    }

    #[tokio::test]
    async fn test_trap_closes_on_client_disconnect() {
        // テスト項目: クライアントが切断すると trap が終了し接続が削除される
        // given (前提条件):
        let registry = Arc::new(ConnectionRegistry::new());
        let chat = ChatId::new(3);
        let writer = upgraded_writer();
        let connection = registry.register(chat, &writer).unwrap();
        let response = writer.commit();
        let task = {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move {
                registry
                    .trap(CancellationToken::new(), chat, connection)
                    .await
            })
        };

        // when (操作):
        drop(response);

        // then (期待する結果):
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .unwrap()
            .unwrap();
        assert!(!registry.has_resource(chat));
    }

    #[tokio::test]
    async fn test_trap_closes_on_shutdown() {
        // テスト項目: シャットダウンのキャンセルで trap が終了しストリームも終わる
        // given (前提条件):
        let registry = Arc::new(ConnectionRegistry::new());
        let chat = ChatId::new(4);
        let writer = upgraded_writer();
        let connection = registry.register(chat, &writer).unwrap();
        let response = writer.commit();
        let shutdown = CancellationToken::new();
        let task = {
            let registry = Arc::clone(&registry);
            let shutdown = shutdown.clone();
            tokio::spawn(async move { registry.trap(shutdown, chat, connection).await })
        };

        // when (操作):
        shutdown.cancel();

        // then (期待する結果):
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .unwrap()
            .unwrap();
        assert!(!registry.has_resource(chat));
        // every sender is gone, so the body ends
        let body = tokio::time::timeout(
            Duration::from_secs(1),
            axum::body::to_bytes(response.into_body(), usize::MAX),
        )
        .await
        .unwrap()
        .unwrap();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_trap_cleans_up_when_aborted() {
        // テスト項目: trap のタスクが中断されても接続は削除される
        // given (前提条件):
        let registry = Arc::new(ConnectionRegistry::new());
        let chat = ChatId::new(5);
        let writer = upgraded_writer();
        let connection = registry.register(chat, &writer).unwrap();
        let _response = writer.commit();
        let task = {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move {
                registry
                    .trap(CancellationToken::new(), chat, connection)
                    .await
            })
        };
        tokio::task::yield_now().await;

        // when (操作):
        task.abort();
        let _ = task.await;

        // then (期待する結果):
        assert!(!registry.has_resource(chat));
    }

    #[tokio::test]
    async fn test_send_to_single_connection() {
        // テスト項目: 特定の接続にのみイベントを送れる
        // given (前提条件):
        let registry = ConnectionRegistry::new();
        let chat = ChatId::new(1);
        let (w1, w2) = (upgraded_writer(), upgraded_writer());
        let target = registry.register(chat, &w1).unwrap();
        registry.register(chat, &w2).unwrap();
        let mut target_response = w1.commit();

        // when (操作):
        let result = registry.send_to(chat, &target, "redirect", "");
        let unknown = registry.send_to(chat, &ConnectionId::generate(), "redirect", "");

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(unknown, Err(ResponseError::StreamClosed));
        assert_eq!(
            read_frame(&mut target_response).await,
            "event: redirect\ndata: \n\n"
        );
    }
}
