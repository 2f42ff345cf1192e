//! Request-dispatch engine.
//!
//! - `route`: path templates, compiled patterns and the handler signature
//! - `dispatcher`: the route table and per-request state machine
//! - `context`: request-scoped identity and path parameters
//! - `auth`: cookie-session authentication policies
//! - `response`: the buffered / streaming response writer
//! - `cookies`, `error`: session cookie helpers and HTTP errors

pub mod auth;
pub mod context;
pub mod cookies;
pub mod dispatcher;
pub mod error;
pub mod response;
pub mod route;

/// The request type every handler receives
pub type Request = axum::extract::Request;

pub use auth::{LOGIN_PATH, authenticate};
pub use context::{Context, ContextError, get_identity, get_param, set_identity, set_param};
pub use cookies::SESSION_COOKIE;
pub use dispatcher::Router;
pub use error::HttpError;
pub use response::{ResponseError, ResponseWriter, SseSink, is_htmx};
pub use route::{AuthPolicy, Handler, Route, RouteError};
