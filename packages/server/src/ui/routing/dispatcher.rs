//! Request dispatcher.
//!
//! Per request: match path, match method, extract parameters, authenticate,
//! invoke the handler, commit. Routes are scanned in registration order and
//! the first route whose pattern and method both match wins, so more specific
//! templates must be registered first.

use std::{sync::Arc, time::Instant};

use axum::{
    http::{HeaderValue, Method, StatusCode, header::ALLOW},
    response::Response,
};
use percent_encoding::percent_decode_str;

use crate::domain::SessionValidator;

use super::{
    Request, auth, context,
    response::ResponseWriter,
    route::{Handler, Route, RouteError},
};

/// Route table plus the session validator used by authenticated routes
pub struct Router<S> {
    routes: Vec<Route<S>>,
    validator: Arc<dyn SessionValidator>,
}

impl<S: Send + Sync + 'static> Router<S> {
    pub fn new(validator: Arc<dyn SessionValidator>) -> Self {
        Self {
            routes: Vec::new(),
            validator,
        }
    }

    pub fn routes(&self) -> &[Route<S>] {
        &self.routes
    }

    /// Register `handler` for `method` and the path `template`.
    ///
    /// The route requires authentication until downgraded with
    /// [`Route::no_auth`]. Registering the same method twice for the same
    /// compiled pattern is an error, whatever the parameters are called.
    pub fn add_route<H: Handler<S>>(
        &mut self,
        method: Method,
        template: &str,
        handler: H,
    ) -> Result<&mut Route<S>, RouteError> {
        let route = Route::new(method, template, Arc::new(handler))?;
        let duplicate = self.routes.iter().any(|existing| {
            existing.method == route.method && existing.pattern.as_str() == route.pattern.as_str()
        });
        if duplicate {
            return Err(RouteError::DuplicateRoute {
                method: route.method,
                template: template.to_string(),
            });
        }

        let index = self.routes.len();
        self.routes.push(route);
        Ok(&mut self.routes[index])
    }

    pub fn get<H: Handler<S>>(
        &mut self,
        template: &str,
        handler: H,
    ) -> Result<&mut Route<S>, RouteError> {
        self.add_route(Method::GET, template, handler)
    }

    pub fn post<H: Handler<S>>(
        &mut self,
        template: &str,
        handler: H,
    ) -> Result<&mut Route<S>, RouteError> {
        self.add_route(Method::POST, template, handler)
    }

    pub fn put<H: Handler<S>>(
        &mut self,
        template: &str,
        handler: H,
    ) -> Result<&mut Route<S>, RouteError> {
        self.add_route(Method::PUT, template, handler)
    }

    pub fn patch<H: Handler<S>>(
        &mut self,
        template: &str,
        handler: H,
    ) -> Result<&mut Route<S>, RouteError> {
        self.add_route(Method::PATCH, template, handler)
    }

    pub fn delete<H: Handler<S>>(
        &mut self,
        template: &str,
        handler: H,
    ) -> Result<&mut Route<S>, RouteError> {
        self.add_route(Method::DELETE, template, handler)
    }

    /// Route one request and commit its response.
    pub async fn dispatch(&self, req: Request, state: Arc<S>) -> Response {
        let path = req.uri().path().to_string();
        let mut allow: Vec<Method> = Vec::new();

        for route in &self.routes {
            let Some(captures) = route.pattern.captures(&path) else {
                continue;
            };
            if route.method != req.method() {
                allow.push(route.method.clone());
                continue;
            }

            // matching runs on the raw path so `%2F` stays inside one segment
            let values: Vec<String> = captures
                .iter()
                .skip(1)
                .flatten()
                .map(|value| {
                    percent_decode_str(value.as_str())
                        .decode_utf8_lossy()
                        .into_owned()
                })
                .collect();
            drop(captures);
            return self.serve(route, req, values, state).await;
        }

        if !allow.is_empty() {
            return method_not_allowed(allow);
        }
        not_found()
    }

    async fn serve(
        &self,
        route: &Route<S>,
        mut req: Request,
        values: Vec<String>,
        state: Arc<S>,
    ) -> Response {
        let request_line = format!("{} {}", req.method(), req.uri());
        tracing::info!("received {}", request_line);
        let mut w = ResponseWriter::new();

        if values.len() != route.param_names.len() {
            let message = "unexpected number of path parameters in request";
            tracing::error!("{} ({})", message, req.uri().path());
            w.write_string(StatusCode::INTERNAL_SERVER_ERROR, message);
            return finish(w, &request_line);
        }
        for (name, value) in route.param_names.iter().zip(values) {
            req = match context::set_param(req, name, value) {
                Ok(req) => req,
                Err(e) => {
                    tracing::error!("{}", e);
                    w.write_string(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
                    return finish(w, &request_line);
                }
            };
        }

        let Some(req) = auth::apply(route.auth, self.validator.as_ref(), &mut w, req).await else {
            return finish(w, &request_line);
        };

        let start = Instant::now();
        let mut w = route.handler.call(w, req, state).await;
        w.set_elapsed(start.elapsed());
        finish(w, &request_line)
    }
}

fn finish(w: ResponseWriter, request_line: &str) -> Response {
    tracing::info!("{} resolved with {}", request_line, w);
    w.commit()
}

fn method_not_allowed(mut methods: Vec<Method>) -> Response {
    methods.sort_by(|a, b| a.as_str().cmp(b.as_str()));
    methods.dedup();
    let allow = methods
        .iter()
        .map(Method::as_str)
        .collect::<Vec<_>>()
        .join(", ");

    let mut w = ResponseWriter::new();
    match HeaderValue::from_str(&allow) {
        Ok(value) => {
            w.headers_mut().insert(ALLOW, value);
        }
        Err(e) => tracing::error!("invalid Allow header {}: {}", allow, e),
    }
    w.write_header(StatusCode::METHOD_NOT_ALLOWED);
    w.commit()
}

fn not_found() -> Response {
    let mut w = ResponseWriter::new();
    w.write_string(StatusCode::NOT_FOUND, "404 page not found");
    w.commit()
}
