//! Message endpoints.

use std::sync::Arc;

use axum::http::StatusCode;

use crate::{
    infrastructure::dto::http::SendMessageInput,
    ui::{
        routing::{HttpError, Request, ResponseWriter},
        state::AppState,
    },
};

use super::{
    params::{chat_id, identity, read_json},
    respond,
};

/// `GET /chat/:chatID/messages`
pub async fn get_messages(
    mut w: ResponseWriter,
    req: Request,
    state: Arc<AppState>,
) -> ResponseWriter {
    let result = get_messages_inner(&mut w, req, &state).await;
    respond(w, result)
}

async fn get_messages_inner(
    w: &mut ResponseWriter,
    req: Request,
    state: &AppState,
) -> Result<(), HttpError> {
    let user = identity(&req)?;
    let chat_id = chat_id(&req)?;
    let messages = state.get_messages_usecase.execute(user.id, chat_id).await?;
    w.write_json(StatusCode::OK, &messages);
    Ok(())
}

/// `POST /chat/:chatID/message`
///
/// The message is stored, then pushed to every event stream of the chat.
pub async fn send_message(
    mut w: ResponseWriter,
    req: Request,
    state: Arc<AppState>,
) -> ResponseWriter {
    let result = send_message_inner(&mut w, req, &state).await;
    respond(w, result)
}

async fn send_message_inner(
    w: &mut ResponseWriter,
    req: Request,
    state: &AppState,
) -> Result<(), HttpError> {
    let user = identity(&req)?;
    let chat_id = chat_id(&req)?;
    let input: SendMessageInput = read_json(req).await?;
    let message = state
        .send_message_usecase
        .execute(user.id, chat_id, input.content)
        .await?;
    w.write_json(StatusCode::ACCEPTED, &message);
    Ok(())
}
