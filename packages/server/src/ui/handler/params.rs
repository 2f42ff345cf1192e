//! Request extraction helpers shared by the handlers.

use axum::body::to_bytes;
use serde::de::DeserializeOwned;

use crate::{
    domain::{ChatId, User},
    ui::routing::{HttpError, Request, get_identity, get_param},
};

/// Route parameter holding the chat ID
pub const CHAT_ID: &str = "chatID";

/// Upper bound on JSON request bodies
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// The authenticated user of `req`
pub fn identity(req: &Request) -> Result<User, HttpError> {
    get_identity(req).map_err(|e| {
        tracing::error!("{}", e);
        HttpError::internal("failed to fetch request user")
    })
}

/// The `chatID` route parameter as a chat ID
pub fn chat_id(req: &Request) -> Result<ChatId, HttpError> {
    let raw = get_param(req, CHAT_ID).map_err(|e| {
        tracing::error!("{}", e);
        HttpError::internal(e.to_string())
    })?;
    raw.parse()
        .map_err(|_| HttpError::bad_request("chat ID must be an integer"))
}

/// Decode the JSON body of `req`.
///
/// Consumes the request: extract the identity and route parameters first.
pub async fn read_json<T: DeserializeOwned>(req: Request) -> Result<T, HttpError> {
    let malformed = |e: &dyn std::fmt::Display| {
        HttpError::bad_request(format!("malformed request body: {e}"))
    };
    let body = to_bytes(req.into_body(), MAX_BODY_BYTES)
        .await
        .map_err(|e| malformed(&e))?;
    serde_json::from_slice(&body).map_err(|e| malformed(&e))
}
