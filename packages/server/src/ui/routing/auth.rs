//! Cookie-session authentication middleware.

use crate::domain::SessionValidator;

use super::{
    Request, context,
    cookies::{self, SESSION_COOKIE},
    error::HttpError,
    response::{ResponseWriter, is_htmx},
    route::AuthPolicy,
};

/// Where the redirect policy sends unauthenticated clients
pub const LOGIN_PATH: &str = "/login";

/// Resolve the session cookie of `req` to a user and attach it to the request.
///
/// A missing or malformed cookie is a 401. A stale session is a 401 as well,
/// and the cookie is invalidated on `w`. A live session whose user no longer
/// exists is a 404, and a request that already carries a user is a 500.
pub async fn authenticate(
    validator: &dyn SessionValidator,
    w: &mut ResponseWriter,
    req: Request,
) -> Result<Request, HttpError> {
    let token = cookies::get(req.headers(), SESSION_COOKIE).map_err(|e| {
        tracing::debug!("authentication failed: {}", e);
        HttpError::unauthorized()
    })?;

    let Some(session) = validator.check_session(&token).await else {
        if let Err(e) = cookies::invalidate(w, SESSION_COOKIE) {
            tracing::error!("{}", e);
        }
        return Err(HttpError::unauthorized());
    };

    let user = match validator.get_user(session.user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return Err(HttpError::not_found("user not found during authentication"));
        }
        Err(e) => return Err(HttpError::database(e)),
    };

    context::set_identity(req, user).map_err(|e| {
        tracing::error!("{}", e);
        HttpError::internal(e.to_string())
    })
}

/// Run `policy` for `req`.
///
/// Returns the authenticated request, or `None` when the policy has already
/// written the response on `w`.
pub async fn apply(
    policy: AuthPolicy,
    validator: &dyn SessionValidator,
    w: &mut ResponseWriter,
    req: Request,
) -> Option<Request> {
    if policy == AuthPolicy::None {
        return Some(req);
    }

    let htmx = is_htmx(req.headers());
    let error = match authenticate(validator, w, req).await {
        Ok(req) => return Some(req),
        Err(error) => error,
    };

    match policy {
        AuthPolicy::Redirect if error.status.is_server_error() => {
            if htmx {
                w.display_error(&error);
            } else {
                w.write_error(&error);
            }
        }
        AuthPolicy::Redirect => w.redirect(LOGIN_PATH, htmx),
        _ => w.write_error(&error),
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{
            DisplayName, MockSessionValidator, PasswordDigest, RepositoryError, Session,
            SessionToken, User, UserId, Username,
        },
        ui::routing::response::HX_REQUEST,
    };
    use axum::{
        body::Body,
        http::{HeaderValue, StatusCode, header},
    };
    use chrono::{Duration, Utc};

    fn alice() -> User {
        let username = Username::new("alice".to_string()).unwrap();
        User {
            id: UserId::new(1),
            key: PasswordDigest::from_password(&username, "password").unwrap(),
            username,
            display_name: DisplayName::new("Alice".to_string()).unwrap(),
        }
    }

    fn live_session() -> Session {
        Session::new(
            SessionToken::new("token-1".to_string()).unwrap(),
            UserId::new(1),
            Utc::now() + Duration::hours(1),
        )
    }

    fn request_with_cookie(cookie: Option<&str>, htmx: bool) -> Request {
        let mut req = Request::new(Body::empty());
        if let Some(cookie) = cookie {
            req.headers_mut()
                .insert(header::COOKIE, HeaderValue::from_str(cookie).unwrap());
        }
        if htmx {
            req.headers_mut()
                .insert(HX_REQUEST, HeaderValue::from_static("true"));
        }
        req
    }

    fn validator_with(
        session: Option<Session>,
        user: Result<Option<User>, RepositoryError>,
    ) -> MockSessionValidator {
        let mut validator = MockSessionValidator::new();
        validator
            .expect_check_session()
            .returning(move |_| session.clone());
        validator
            .expect_get_user()
            .returning(move |_| user.clone());
        validator
    }

    #[tokio::test]
    async fn test_authenticate_valid_session() {
        // テスト項目: 有効なセッション Cookie でユーザーがコンテキストに設定される
        // given (前提条件):
        let validator = validator_with(Some(live_session()), Ok(Some(alice())));
        let mut writer = ResponseWriter::new();
        let req = request_with_cookie(Some("beango-session=token-1"), false);

        // when (操作):
        let result = authenticate(&validator, &mut writer, req).await;

        // then (期待する結果):
        let req = result.unwrap();
        assert_eq!(context::get_identity(&req), Ok(alice()));
        assert!(!writer.is_written());
    }

    #[tokio::test]
    async fn test_authenticate_missing_cookie() {
        // テスト項目: Cookie が無い場合は 401 で、セッションは参照されない
        // given (前提条件):
        let mut validator = MockSessionValidator::new();
        validator.expect_check_session().never();
        let mut writer = ResponseWriter::new();

        // when (操作):
        let req = request_with_cookie(None, false);
        let result = authenticate(&validator, &mut writer, req).await;

        // then (期待する結果):
        assert_eq!(result.unwrap_err(), HttpError::unauthorized());
        assert!(!writer.headers().contains_key(header::SET_COOKIE));
    }

    #[tokio::test]
    async fn test_authenticate_expired_session_invalidates_cookie() {
        // テスト項目: 期限切れのセッションは 401 になり Cookie が無効化される
        // given (前提条件):
        let validator = validator_with(None, Ok(Some(alice())));
        let mut writer = ResponseWriter::new();
        let req = request_with_cookie(Some("beango-session=stale"), false);

        // when (操作):
        let result = authenticate(&validator, &mut writer, req).await;

        // then (期待する結果):
        assert_eq!(result.unwrap_err().status, StatusCode::UNAUTHORIZED);
        let set_cookie = writer.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(set_cookie.starts_with("beango-session=; "));
        assert!(set_cookie.contains("Expires=Thu, 01 Jan 1970 00:00:00 GMT"));
    }

    #[tokio::test]
    async fn test_authenticate_user_not_found() {
        // テスト項目: セッションは有効だがユーザーが存在しない場合は 404
        // given (前提条件):
        let validator = validator_with(Some(live_session()), Ok(None));
        let mut writer = ResponseWriter::new();
        let req = request_with_cookie(Some("beango-session=token-1"), false);

        // when (操作):
        let result = authenticate(&validator, &mut writer, req).await;

        // then (期待する結果):
        assert_eq!(
            result.unwrap_err(),
            HttpError::not_found("user not found during authentication")
        );
    }

    #[tokio::test]
    async fn test_authenticate_repository_failure() {
        // テスト項目: ユーザー取得で DB エラーが発生した場合は 500
        // given (前提条件):
        let validator = validator_with(
            Some(live_session()),
            Err(RepositoryError::Storage("disk full".to_string())),
        );
        let mut writer = ResponseWriter::new();
        let req = request_with_cookie(Some("beango-session=token-1"), false);

        // when (操作):
        let result = authenticate(&validator, &mut writer, req).await;

        // then (期待する結果):
        assert_eq!(
            result.unwrap_err(),
            HttpError::internal("database operation failed")
        );
    }

    #[tokio::test]
    async fn test_authenticate_identity_already_set() {
        // テスト項目: 既にユーザーが設定されたリクエストの再認証は 500
        // given (前提条件):
        let validator = validator_with(Some(live_session()), Ok(Some(alice())));
        let mut writer = ResponseWriter::new();
        let req = request_with_cookie(Some("beango-session=token-1"), false);
        let req = context::set_identity(req, alice()).unwrap();

        // when (操作):
        let result = authenticate(&validator, &mut writer, req).await;

        // then (期待する結果):
        assert_eq!(
            result.unwrap_err(),
            HttpError::internal("user already in request context")
        );
    }

    #[tokio::test]
    async fn test_strict_policy_writes_401() {
        // テスト項目: Strict ポリシーは認証失敗時に 401 を書き込む
        // given (前提条件):
        let validator = MockSessionValidator::new();
        let mut writer = ResponseWriter::new();

        // when (操作):
        let result = apply(
            AuthPolicy::Strict,
            &validator,
            &mut writer,
            request_with_cookie(None, false),
        )
        .await;

        // then (期待する結果):
        assert!(result.is_none());
        assert_eq!(writer.status(), StatusCode::UNAUTHORIZED);
        assert!(writer.body().is_empty());
    }

    #[tokio::test]
    async fn test_redirect_policy_full_navigation() {
        // テスト項目: Redirect ポリシーは通常のリクエストを 303 で /login へ送る
        // given (前提条件):
        let validator = MockSessionValidator::new();
        let mut writer = ResponseWriter::new();

        // when (操作):
        let result = apply(
            AuthPolicy::Redirect,
            &validator,
            &mut writer,
            request_with_cookie(None, false),
        )
        .await;

        // then (期待する結果):
        assert!(result.is_none());
        assert_eq!(writer.status(), StatusCode::SEE_OTHER);
        assert_eq!(writer.headers()[header::LOCATION], LOGIN_PATH);
    }

    #[tokio::test]
    async fn test_redirect_policy_htmx() {
        // テスト項目: Redirect ポリシーは HTMX リクエストを HX-Redirect で /login へ送る
        // given (前提条件):
        let validator = MockSessionValidator::new();
        let mut writer = ResponseWriter::new();

        // when (操作):
        let result = apply(
            AuthPolicy::Redirect,
            &validator,
            &mut writer,
            request_with_cookie(None, true),
        )
        .await;

        // then (期待する結果):
        assert!(result.is_none());
        assert_eq!(writer.status(), StatusCode::OK);
        assert_eq!(writer.headers()["HX-Redirect"], LOGIN_PATH);
    }

    #[tokio::test]
    async fn test_redirect_policy_server_error_htmx() {
        // テスト項目: Redirect ポリシーでも 5xx は HTMX 向けにエラー表示される
        // given (前提条件):
        let validator = validator_with(
            Some(live_session()),
            Err(RepositoryError::Storage("disk full".to_string())),
        );
        let mut writer = ResponseWriter::new();

        // when (操作):
        let result = apply(
            AuthPolicy::Redirect,
            &validator,
            &mut writer,
            request_with_cookie(Some("beango-session=token-1"), true),
        )
        .await;

        // then (期待する結果):
        assert!(result.is_none());
        assert_eq!(writer.status(), StatusCode::OK);
        assert_eq!(
            writer.body(),
            b"<div id='errors' hx-swap-oob='innerHTML'>database operation failed</div>"
        );
    }

    #[tokio::test]
    async fn test_redirect_policy_server_error_plain() {
        // テスト項目: Redirect ポリシーの 5xx は通常のリクエストにはそのまま返される
        // given (前提条件):
        let validator = validator_with(
            Some(live_session()),
            Err(RepositoryError::Storage("disk full".to_string())),
        );
        let mut writer = ResponseWriter::new();

        // when (操作):
        let result = apply(
            AuthPolicy::Redirect,
            &validator,
            &mut writer,
            request_with_cookie(Some("beango-session=token-1"), false),
        )
        .await;

        // then (期待する結果):
        assert!(result.is_none());
        assert_eq!(writer.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(writer.body(), b"database operation failed");
    }

    #[tokio::test]
    async fn test_no_auth_policy_skips_validation() {
        // テスト項目: None ポリシーはセッションを確認せずに通す
        // given (前提条件):
        let mut validator = MockSessionValidator::new();
        validator.expect_check_session().never();
        let mut writer = ResponseWriter::new();

        // when (操作):
        let result = apply(
            AuthPolicy::None,
            &validator,
            &mut writer,
            request_with_cookie(None, false),
        )
        .await;

        // then (期待する結果):
        assert!(result.is_some());
        assert!(!writer.is_written());
    }
}
