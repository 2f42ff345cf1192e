//! Route table of the chat server.

use std::sync::Arc;

use crate::domain::SessionValidator;

use super::{
    handler::{chat, message, session, sse, user},
    routing::{RouteError, Router},
    state::AppState,
};

/// Register every endpoint.
///
/// Fails on a malformed or duplicate route, which is a programming error the
/// binary reports at start-up.
pub fn build_router(validator: Arc<dyn SessionValidator>) -> Result<Router<AppState>, RouteError> {
    let mut router = Router::new(validator);

    // 認証なし
    router.get("/login", session::login_page)?.no_auth();
    router.post("/session", session::create_session)?.no_auth();
    router.post("/user", user::create_user)?.no_auth();

    // 認証必須（401）
    router.get("/logout", session::logout)?;
    router.get("/chats", chat::get_chats)?;
    router.post("/chat", chat::create_private_chat)?;
    router.get("/chat/:chatID/messages", message::get_messages)?;
    router.post("/chat/:chatID/message", message::send_message)?;

    // 未認証なら /login へ
    router
        .get("/chat/:chatID/events", sse::events)?
        .redirect_to_login();

    Ok(router)
}
