//! Server-Sent Events endpoint.
//!
//! `GET /chat/:chatID/events` keeps the response open and receives every
//! `message` event published to the chat. When the session watchdog is
//! enabled, the session cookie is re-checked on an interval; once it is no
//! longer valid a `redirect` event is sent and the stream is closed.

use std::{sync::Arc, time::Duration};

use crate::{
    domain::{ChatId, ConnectionId, SessionValidator},
    infrastructure::message_pusher::ConnectionRegistry,
    ui::{
        routing::{HttpError, Request, ResponseWriter, SESSION_COOKIE, cookies},
        state::AppState,
    },
};

use super::params::{chat_id, identity};

/// Tells the client its session is gone
pub const REDIRECT_EVENT: &str = "redirect";

/// `GET /chat/:chatID/events`
pub async fn events(mut w: ResponseWriter, req: Request, state: Arc<AppState>) -> ResponseWriter {
    let prepared = identity(&req).and_then(|user| Ok((user, chat_id(&req)?)));
    let token = cookies::get(req.headers(), SESSION_COOKIE).ok();
    drop(req);

    let (user, chat_id) = match prepared {
        Ok(prepared) => prepared,
        Err(error) => {
            w.write_error(&error);
            return w;
        }
    };
    if let Err(error) = state.get_chats_usecase.get_chat(chat_id, user.id).await {
        w.write_error(&HttpError::from(error));
        return w;
    }

    ConnectionRegistry::upgrade(&mut w);
    let connection = match state.connections.register(chat_id, &w) {
        Ok(connection) => connection,
        Err(e) => {
            // the stream ends as soon as the response is sent
            tracing::error!("Failed to register SSE connection for chat {}: {}", chat_id, e);
            return w;
        }
    };

    tokio::spawn(stream_events(state, chat_id, connection, token));
    w
}

/// Hold the connection open until the client leaves, the server shuts down,
/// or the watchdog finds the session gone.
async fn stream_events(
    state: Arc<AppState>,
    chat_id: ChatId,
    connection: ConnectionId,
    token: Option<String>,
) {
    let trap = state
        .connections
        .trap(state.shutdown.child_token(), chat_id, connection.clone());

    match state.session_check_interval {
        Some(interval) => {
            tokio::select! {
                _ = trap => {}
                _ = watch_session(&state, interval, token.as_deref(), chat_id, &connection) => {}
            }
        }
        None => trap.await,
    }

    // no-op when trap already cleaned up
    state.connections.close(chat_id, &connection);
}

async fn watch_session(
    state: &AppState,
    interval: Duration,
    token: Option<&str>,
    chat_id: ChatId,
    connection: &ConnectionId,
) {
    loop {
        tokio::time::sleep(interval).await;
        let valid = match token {
            Some(token) => state
                .check_session_usecase
                .check_session(token)
                .await
                .is_some(),
            None => false,
        };
        if valid {
            continue;
        }

        tracing::info!(
            "Session behind SSE connection {} is no longer valid",
            connection
        );
        if let Err(e) = state
            .connections
            .send_to(chat_id, connection, REDIRECT_EVENT, "")
        {
            tracing::warn!(
                "Failed to push '{}' event to SSE connection {}: {}",
                REDIRECT_EVENT,
                connection,
                e
            );
        }
        return;
    }
}
