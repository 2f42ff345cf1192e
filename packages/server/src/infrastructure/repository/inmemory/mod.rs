//! インメモリ Repository 実装

pub mod chat;
pub mod session;
pub mod user;

pub use chat::{InMemoryChatRepository, InMemoryMessageRepository};
pub use session::InMemorySessionRepository;
pub use user::InMemoryUserRepository;
