//! Domain layer for the chat server.
//!
//! This module contains business rules and the interfaces the other layers
//! depend on. It knows nothing about HTTP or storage.

pub mod entity;
pub mod error;
pub mod repository;
pub mod value_object;

pub use entity::{Chat, ChatKind, Message, Session, User};
pub use error::{RepositoryError, ValueObjectError};
#[cfg(test)]
pub use repository::{MockEventPublisher, MockSessionValidator};
pub use repository::{
    ChatRepository, EventPublisher, MessageRepository, SessionRepository, SessionValidator,
    UserRepository,
};
pub use value_object::{
    ChatId, ConnectionId, DisplayName, MessageContent, MessageId, PasswordDigest, SessionToken,
    UserId, Username,
};
