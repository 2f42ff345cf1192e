//! Login, session and logout endpoints.

use std::sync::Arc;

use axum::http::StatusCode;

use crate::{
    infrastructure::dto::http::SessionInput,
    ui::{
        routing::{
            HttpError, LOGIN_PATH, Request, ResponseWriter, SESSION_COOKIE, cookies, is_htmx,
        },
        state::AppState,
    },
};

use super::{params::read_json, respond};

const LOGIN_PAGE: &str = "<!DOCTYPE html>\n<html>\n<head><title>beango</title></head>\n\
<body>\n<div id='errors'></div>\n\
<form hx-post='/session'>\n\
<input name='username'>\n<input name='password' type='password'>\n\
<button type='submit'>Log in</button>\n</form>\n</body>\n</html>\n";

/// `GET /login`
pub async fn login_page(
    mut w: ResponseWriter,
    _req: Request,
    _state: Arc<AppState>,
) -> ResponseWriter {
    w.write_html(StatusCode::OK, LOGIN_PAGE);
    w
}

/// `POST /session`
///
/// A request already carrying a live session cookie succeeds without
/// checking credentials.
pub async fn create_session(
    mut w: ResponseWriter,
    req: Request,
    state: Arc<AppState>,
) -> ResponseWriter {
    let result = create_session_inner(&mut w, req, &state).await;
    respond(w, result)
}

async fn create_session_inner(
    w: &mut ResponseWriter,
    req: Request,
    state: &AppState,
) -> Result<(), HttpError> {
    let token = cookies::get(req.headers(), SESSION_COOKIE).ok();
    if let Some(token) = token
        && state.login_usecase.is_logged_in(&token).await
    {
        w.write_header(StatusCode::NO_CONTENT);
        return Ok(());
    }

    let input: SessionInput = read_json(req).await?;
    let session = state
        .login_usecase
        .execute(input.username, &input.password)
        .await?;

    cookies::set(
        w,
        SESSION_COOKIE,
        session.token.as_str(),
        session.expires_at,
    )
    .map_err(|e| {
        tracing::error!("failed to create session cookie: {}", e);
        HttpError::internal("failed to create session cookie")
    })?;
    w.write_header(StatusCode::NO_CONTENT);
    Ok(())
}

/// `GET /logout`
pub async fn logout(mut w: ResponseWriter, req: Request, state: Arc<AppState>) -> ResponseWriter {
    let token = cookies::get(req.headers(), SESSION_COOKIE).ok();
    let htmx = is_htmx(req.headers());
    state.logout_usecase.execute(token.as_deref()).await;

    if let Err(e) = cookies::invalidate(&mut w, SESSION_COOKIE) {
        tracing::error!("{}", e);
    }
    w.redirect(LOGIN_PATH, htmx);
    w
}
