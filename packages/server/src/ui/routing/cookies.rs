//! Session cookie helpers.

use axum::http::{HeaderMap, HeaderValue, header};
use beango_shared::time::to_http_date;
use chrono::{DateTime, Utc};
use thiserror::Error;

use super::response::ResponseWriter;

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "beango-session";

const COOKIE_ATTRIBUTES: &str = "Path=/; Expires={expires}; HttpOnly; Secure; SameSite=Strict";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CookieError {
    #[error("cookie {0} not found")]
    NotFound(String),

    #[error("cookie {0} has an empty value")]
    Empty(String),

    #[error("cookie {0} has an invalid value")]
    InvalidValue(String),
}

/// Read the value of cookie `name` from the request headers.
///
/// When the cookie is sent more than once the first occurrence wins.
pub fn get(headers: &HeaderMap, name: &str) -> Result<String, CookieError> {
    let pairs = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'));
    let found = pairs
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim().trim_matches('"'));

    match found {
        None => Err(CookieError::NotFound(name.to_string())),
        Some("") => Err(CookieError::Empty(name.to_string())),
        Some(value) => Ok(value.to_string()),
    }
}

fn set_cookie_header(name: &str, value: &str, expires: DateTime<Utc>) -> String {
    let attributes = COOKIE_ATTRIBUTES.replace("{expires}", &to_http_date(expires));
    format!("{name}={value}; {attributes}")
}

/// Add a `Set-Cookie` header for cookie `name`
pub fn set(
    w: &mut ResponseWriter,
    name: &str,
    value: &str,
    expires: DateTime<Utc>,
) -> Result<(), CookieError> {
    let header_value = HeaderValue::from_str(&set_cookie_header(name, value, expires))
        .map_err(|_| CookieError::InvalidValue(name.to_string()))?;
    w.headers_mut().append(header::SET_COOKIE, header_value);
    Ok(())
}

/// Make the client drop cookie `name` (empty value, expiry at the Unix epoch)
pub fn invalidate(w: &mut ResponseWriter, name: &str) -> Result<(), CookieError> {
    set(w, name, "", DateTime::<Utc>::UNIX_EPOCH)
}
