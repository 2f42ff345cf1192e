//! Sign-up endpoint.

use std::sync::Arc;

use axum::http::StatusCode;

use crate::{
    infrastructure::dto::http::{CreateUserInput, UserDto},
    ui::{
        routing::{HttpError, Request, ResponseWriter},
        state::AppState,
    },
};

use super::{params::read_json, respond};

/// `POST /user`
pub async fn create_user(
    mut w: ResponseWriter,
    req: Request,
    state: Arc<AppState>,
) -> ResponseWriter {
    let result = create_user_inner(&mut w, req, &state).await;
    respond(w, result)
}

async fn create_user_inner(
    w: &mut ResponseWriter,
    req: Request,
    state: &AppState,
) -> Result<(), HttpError> {
    let input: CreateUserInput = read_json(req).await?;
    let user = state
        .create_user_usecase
        .execute(input.username, input.password, input.display_name)
        .await?;
    w.write_json(StatusCode::CREATED, &UserDto::from(user));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::handler::testing::{json_request, state};
    use axum::http::Method;

    #[tokio::test]
    async fn test_create_user_created() {
        // テスト項目: ユーザー登録は 201 と認証情報を含まない JSON を返す
        // given (前提条件):
        let state = state();
        let req = json_request(
            Method::POST,
            r#"{"username":"alice","password":"secret","displayName":"Alice"}"#,
        );

        // when (操作):
        let w = create_user(ResponseWriter::new(), req, state).await;

        // then (期待する結果):
        assert_eq!(w.status(), StatusCode::CREATED);
        let body: serde_json::Value = serde_json::from_slice(w.body()).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"id": 1, "username": "alice", "displayName": "Alice"})
        );
    }

    #[tokio::test]
    async fn test_create_user_conflict() {
        // テスト項目: 既に使われている username は 409
        // given (前提条件):
        let state = state();
        let body = r#"{"username":"alice","password":"secret"}"#;
        create_user(
            ResponseWriter::new(),
            json_request(Method::POST, body),
            state.clone(),
        )
        .await;

        // when (操作):
        let w = create_user(
            ResponseWriter::new(),
            json_request(Method::POST, body),
            state,
        )
        .await;

        // then (期待する結果):
        assert_eq!(w.status(), StatusCode::CONFLICT);
        assert_eq!(w.body(), b"username is taken");
    }

    #[tokio::test]
    async fn test_create_user_missing_username() {
        // テスト項目: username が空の場合は 400
        // given (前提条件):
        let state = state();
        let req = json_request(Method::POST, r#"{"username":"","password":"secret"}"#);

        // when (操作):
        let w = create_user(ResponseWriter::new(), req, state).await;

        // then (期待する結果):
        assert_eq!(w.status(), StatusCode::BAD_REQUEST);
        assert_eq!(w.body(), b"username is missing");
    }
}
