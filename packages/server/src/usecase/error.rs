//! UseCase 層のエラー定義

use thiserror::Error;

use crate::domain::{RepositoryError, UserId, ValueObjectError};

/// ユーザー登録のエラー
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CreateUserError {
    /// 入力値が不正（username / password / 表示名）
    #[error(transparent)]
    InvalidInput(#[from] ValueObjectError),

    #[error("username is taken")]
    UsernameTaken,

    #[error(transparent)]
    Repository(RepositoryError),
}

impl From<RepositoryError> for CreateUserError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::UsernameTaken => Self::UsernameTaken,
            other => Self::Repository(other),
        }
    }
}

/// ログインのエラー
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LoginError {
    /// ユーザーが存在しない、またはパスワードが一致しない
    #[error("login credentials are incorrect")]
    InvalidCredentials,

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// チャット操作のエラー
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChatError {
    #[error("cannot create a chat with yourself")]
    SelfChat,

    #[error("userID {0} is invalid")]
    InvalidUser(UserId),

    #[error("chat already exists")]
    AlreadyExists,

    /// 存在しない、またはメンバーではない
    #[error("chat not found")]
    NotFound,

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// メッセージ操作のエラー
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MessageError {
    #[error(transparent)]
    InvalidContent(#[from] ValueObjectError),

    #[error("chat not found")]
    ChatNotFound,

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
