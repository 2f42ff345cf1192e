//! Chat endpoints.

use std::sync::Arc;

use axum::http::StatusCode;

use crate::{
    domain::UserId,
    infrastructure::dto::http::{ChatDto, CreateChatInput},
    ui::{
        routing::{HttpError, Request, ResponseWriter},
        state::AppState,
    },
};

use super::{
    params::{identity, read_json},
    respond,
};

/// `GET /chats`
pub async fn get_chats(
    mut w: ResponseWriter,
    req: Request,
    state: Arc<AppState>,
) -> ResponseWriter {
    let result = get_chats_inner(&mut w, req, &state).await;
    respond(w, result)
}

async fn get_chats_inner(
    w: &mut ResponseWriter,
    req: Request,
    state: &AppState,
) -> Result<(), HttpError> {
    let user = identity(&req)?;
    let chats: Vec<ChatDto> = state
        .get_chats_usecase
        .execute(user.id)
        .await?
        .into_iter()
        .map(|entry| ChatDto::new(entry.chat, &entry.members))
        .collect();
    w.write_json(StatusCode::OK, &chats);
    Ok(())
}

/// `POST /chat`
pub async fn create_private_chat(
    mut w: ResponseWriter,
    req: Request,
    state: Arc<AppState>,
) -> ResponseWriter {
    let result = create_private_chat_inner(&mut w, req, &state).await;
    respond(w, result)
}

async fn create_private_chat_inner(
    w: &mut ResponseWriter,
    req: Request,
    state: &AppState,
) -> Result<(), HttpError> {
    let user = identity(&req)?;
    let input: CreateChatInput = read_json(req).await?;
    let chat = state
        .create_private_chat_usecase
        .execute(user.id, UserId::new(input.user_id))
        .await?;
    w.write_json(StatusCode::CREATED, &chat);
    Ok(())
}
