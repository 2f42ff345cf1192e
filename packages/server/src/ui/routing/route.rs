//! Routes and the path-template compiler.

use std::{collections::HashSet, future::Future, sync::Arc};

use axum::http::Method;
use futures_util::future::BoxFuture;
use regex::Regex;
use thiserror::Error;

use super::{Request, response::ResponseWriter};

/// `:name` marks a capturable path segment
const PARAM_TOKEN: &str = ":([a-zA-Z]+)";

/// Matches exactly one path segment
const PARAM_MATCHER: &str = "([^/]+)";

/// Registration-time errors
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("duplicate parameters in path definition: {template}")]
    DuplicateParameter { template: String },

    #[error("route already exists: {method} {template}")]
    DuplicateRoute { method: Method, template: String },

    #[error("invalid path definition {template}: {source}")]
    InvalidPattern {
        template: String,
        #[source]
        source: regex::Error,
    },
}

/// Authentication requirement of a route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPolicy {
    /// No authentication
    None,
    /// Reject with the authentication error (401 for a missing or stale session)
    Strict,
    /// Send the client to the login view on failure
    Redirect,
}

/// A request handler.
///
/// Any `async fn(ResponseWriter, Request, Arc<S>) -> ResponseWriter` is a
/// handler. It receives the buffered writer and hands it back once it has
/// written its response.
pub trait Handler<S>: Send + Sync + 'static {
    fn call(
        &self,
        w: ResponseWriter,
        req: Request,
        state: Arc<S>,
    ) -> BoxFuture<'static, ResponseWriter>;
}

impl<S, F, Fut> Handler<S> for F
where
    S: Send + Sync + 'static,
    F: Fn(ResponseWriter, Request, Arc<S>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ResponseWriter> + Send + 'static,
{
    fn call(
        &self,
        w: ResponseWriter,
        req: Request,
        state: Arc<S>,
    ) -> BoxFuture<'static, ResponseWriter> {
        Box::pin(self(w, req, state))
    }
}

/// A registered (method, pattern, handler) triple
pub struct Route<S> {
    pub(super) method: Method,
    pub(super) template: String,
    pub(super) pattern: Regex,
    pub(super) param_names: Vec<String>,
    pub(super) handler: Arc<dyn Handler<S>>,
    pub(super) auth: AuthPolicy,
}

impl<S> Route<S> {
    pub(super) fn new(
        method: Method,
        template: &str,
        handler: Arc<dyn Handler<S>>,
    ) -> Result<Self, RouteError> {
        let (pattern, param_names) = compile(template)?;
        Ok(Self {
            method,
            template: template.to_string(),
            pattern,
            param_names,
            handler,
            auth: AuthPolicy::Strict,
        })
    }

    /// Serve this route without authentication
    pub fn no_auth(&mut self) -> &mut Self {
        self.auth = AuthPolicy::None;
        self
    }

    /// Redirect to the login view instead of answering 401
    pub fn redirect_to_login(&mut self) -> &mut Self {
        self.auth = AuthPolicy::Redirect;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// The compiled, anchored pattern
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    pub fn auth(&self) -> AuthPolicy {
        self.auth
    }
}

/// Compile a path template into an anchored pattern and its parameter names.
///
/// Each `:name` token becomes a one-segment matcher; the literal text between
/// tokens is escaped.
pub fn compile(template: &str) -> Result<(Regex, Vec<String>), RouteError> {
    let invalid = |source| RouteError::InvalidPattern {
        template: template.to_string(),
        source,
    };
    let token = Regex::new(PARAM_TOKEN).map_err(invalid)?;

    let mut pattern = String::from("^");
    let mut names = Vec::new();
    let mut last = 0;
    for captures in token.captures_iter(template) {
        let (Some(whole), Some(name)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        pattern.push_str(&regex::escape(&template[last..whole.start()]));
        pattern.push_str(PARAM_MATCHER);
        names.push(name.as_str().to_string());
        last = whole.end();
    }
    pattern.push_str(&regex::escape(&template[last..]));
    pattern.push('$');

    let mut seen = HashSet::new();
    if !names.iter().all(|name| seen.insert(name)) {
        return Err(RouteError::DuplicateParameter {
            template: template.to_string(),
        });
    }

    let regex = Regex::new(&pattern).map_err(invalid)?;
    Ok((regex, names))
}
