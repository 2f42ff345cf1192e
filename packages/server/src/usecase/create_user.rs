//! UseCase: ユーザー登録

use std::sync::Arc;

use crate::domain::{DisplayName, PasswordDigest, User, UserRepository, Username};

use super::error::CreateUserError;

/// ユーザー登録のユースケース
pub struct CreateUserUseCase {
    users: Arc<dyn UserRepository>,
}

impl CreateUserUseCase {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// ユーザーを登録する
    ///
    /// 表示名が省略された場合は username を使う。
    pub async fn execute(
        &self,
        username: String,
        password: String,
        display_name: Option<String>,
    ) -> Result<User, CreateUserError> {
        let username = Username::new(username)?;
        let display_name =
            DisplayName::new(display_name.unwrap_or_else(|| username.as_str().to_string()))?;
        let key = PasswordDigest::from_password(&username, &password)?;

        let user = self.users.create_user(username, display_name, key).await?;
        tracing::info!("User {} ({}) created", user.id, user.username.as_str());
        Ok(user)
    }
}
