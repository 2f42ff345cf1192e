//! HTTP handlers.
//!
//! Every handler has the shape `async fn(ResponseWriter, Request, Arc<AppState>) -> ResponseWriter`
//! and is registered on the dispatcher in `ui::routes`.

pub mod chat;
pub mod message;
pub mod params;
pub mod session;
pub mod sse;
pub mod user;

use crate::{
    ui::routing::{HttpError, ResponseWriter},
    usecase::{ChatError, CreateUserError, LoginError, MessageError},
};

/// Write `result`'s error, if any, and hand the writer back
fn respond(mut w: ResponseWriter, result: Result<(), HttpError>) -> ResponseWriter {
    if let Err(error) = result {
        w.write_error(&error);
    }
    w
}

impl From<CreateUserError> for HttpError {
    fn from(error: CreateUserError) -> Self {
        match error {
            CreateUserError::InvalidInput(e) => HttpError::bad_request(e.to_string()),
            CreateUserError::UsernameTaken => HttpError::conflict(error.to_string()),
            CreateUserError::Repository(e) => HttpError::database(e),
        }
    }
}

impl From<LoginError> for HttpError {
    fn from(error: LoginError) -> Self {
        match error {
            LoginError::InvalidCredentials => {
                HttpError::new(axum::http::StatusCode::UNAUTHORIZED, error.to_string())
            }
            LoginError::Repository(e) => HttpError::database(e),
        }
    }
}

impl From<ChatError> for HttpError {
    fn from(error: ChatError) -> Self {
        match error {
            ChatError::SelfChat | ChatError::InvalidUser(_) => {
                HttpError::bad_request(error.to_string())
            }
            ChatError::AlreadyExists => HttpError::conflict(error.to_string()),
            ChatError::NotFound => HttpError::not_found(error.to_string()),
            ChatError::Repository(e) => HttpError::database(e),
        }
    }
}

impl From<MessageError> for HttpError {
    fn from(error: MessageError) -> Self {
        match error {
            MessageError::InvalidContent(e) => HttpError::bad_request(e.to_string()),
            MessageError::ChatNotFound => HttpError::not_found(error.to_string()),
            MessageError::Repository(e) => HttpError::database(e),
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Helpers for driving handlers directly in unit tests.

    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{HeaderValue, Method, header},
    };
    use beango_shared::time::SystemClock;

    use crate::{
        domain::User,
        ui::{
            routing::{Request, set_identity, set_param},
            state::AppState,
        },
    };

    pub fn state() -> Arc<AppState> {
        Arc::new(AppState::in_memory(
            Arc::new(SystemClock),
            chrono::Duration::hours(1),
            None,
        ))
    }

    pub fn json_request(method: Method, body: &str) -> Request {
        let mut req = Request::new(Body::from(body.to_string()));
        *req.method_mut() = method;
        req.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        req
    }

    pub fn as_user(req: Request, user: &User) -> Request {
        set_identity(req, user.clone()).unwrap()
    }

    pub fn with_chat(req: Request, chat_id: &str) -> Request {
        set_param(req, super::params::CHAT_ID, chat_id.to_string()).unwrap()
    }

    pub async fn register(state: &AppState, username: &str) -> User {
        state
            .create_user_usecase
            .execute(username.to_string(), "secret".to_string(), None)
            .await
            .unwrap()
    }
}
