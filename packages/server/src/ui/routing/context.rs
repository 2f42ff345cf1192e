//! Request-scoped context.
//!
//! The authenticated user and the extracted path parameters travel with the
//! request inside its extensions as one immutable [`Context`]. Every setter
//! returns a new context (copy-on-write) and refuses to overwrite a value that
//! is already present, so a middleware bug cannot silently replace a trusted
//! identity.

use std::{collections::HashMap, sync::Arc};

use thiserror::Error;

use crate::domain::User;

use super::Request;

/// Errors raised by the context store
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContextError {
    #[error("user already in request context")]
    IdentityAlreadySet,

    #[error("user not found in request context")]
    IdentityNotFound,

    #[error("path parameter {0} already set")]
    ParamAlreadySet(String),

    #[error("path parameter {0} not found in request context")]
    ParamNotFound(String),
}

// Identity and parameters use distinct key types so that a parameter can never
// shadow the identity, whatever its name.
#[derive(Debug, Clone, PartialEq, Eq)]
struct IdentitySlot(User);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ParamName(String);

/// Immutable per-request value bag
#[derive(Debug, Clone, Default)]
pub struct Context {
    identity: Option<Arc<IdentitySlot>>,
    params: Arc<HashMap<ParamName, String>>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a copy carrying `user` as the identity
    pub fn with_identity(&self, user: User) -> Result<Context, ContextError> {
        if self.identity.is_some() {
            return Err(ContextError::IdentityAlreadySet);
        }
        Ok(Context {
            identity: Some(Arc::new(IdentitySlot(user))),
            params: Arc::clone(&self.params),
        })
    }

    pub fn identity(&self) -> Result<&User, ContextError> {
        self.identity
            .as_deref()
            .map(|slot| &slot.0)
            .ok_or(ContextError::IdentityNotFound)
    }

    /// Return a copy with the path parameter `name` bound to `value`
    pub fn with_param(
        &self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Context, ContextError> {
        let key = ParamName(name.into());
        if self.params.contains_key(&key) {
            return Err(ContextError::ParamAlreadySet(key.0));
        }
        let mut params = (*self.params).clone();
        params.insert(key, value.into());
        Ok(Context {
            identity: self.identity.clone(),
            params: Arc::new(params),
        })
    }

    pub fn param(&self, name: &str) -> Result<&str, ContextError> {
        self.params
            .get(&ParamName(name.to_string()))
            .map(String::as_str)
            .ok_or_else(|| ContextError::ParamNotFound(name.to_string()))
    }
}

fn context_of(req: &Request) -> Context {
    req.extensions().get::<Context>().cloned().unwrap_or_default()
}

/// Attach the authenticated user to the request
pub fn set_identity(mut req: Request, user: User) -> Result<Request, ContextError> {
    let context = context_of(&req).with_identity(user)?;
    req.extensions_mut().insert(context);
    Ok(req)
}

/// The authenticated user of the request
pub fn get_identity(req: &Request) -> Result<User, ContextError> {
    req.extensions()
        .get::<Context>()
        .ok_or(ContextError::IdentityNotFound)?
        .identity()
        .cloned()
}

/// Bind a path parameter on the request
pub fn set_param(mut req: Request, name: &str, value: String) -> Result<Request, ContextError> {
    let context = context_of(&req).with_param(name, value)?;
    req.extensions_mut().insert(context);
    Ok(req)
}

/// A path parameter of the request
pub fn get_param(req: &Request, name: &str) -> Result<String, ContextError> {
    req.extensions()
        .get::<Context>()
        .ok_or_else(|| ContextError::ParamNotFound(name.to_string()))?
        .param(name)
        .map(str::to_string)
}
