//! UseCase 層
//!
//! HTTP ハンドラから呼ばれるアプリケーションロジック。
//! Repository / EventPublisher の trait にのみ依存する。

pub mod check_session;
pub mod create_private_chat;
pub mod create_user;
pub mod error;
pub mod get_chats;
pub mod get_messages;
pub mod login;
pub mod logout;
pub mod send_message;

pub use check_session::CheckSessionUseCase;
pub use create_private_chat::CreatePrivateChatUseCase;
pub use create_user::CreateUserUseCase;
pub use error::{ChatError, CreateUserError, LoginError, MessageError};
pub use get_chats::{ChatWithMembers, GetChatsUseCase};
pub use get_messages::GetMessagesUseCase;
pub use login::LoginUseCase;
pub use logout::LogoutUseCase;
pub use send_message::{MESSAGE_EVENT, SendMessageUseCase};
