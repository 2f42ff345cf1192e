//! InMemory User Repository 実装
//!
//! ドメイン層が定義する UserRepository trait の具体的な実装。
//! HashMap をインメモリ DB として使用します。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    DisplayName, PasswordDigest, RepositoryError, User, UserId, UserRepository, Username,
};

#[derive(Default)]
struct UserTable {
    next_id: i64,
    rows: HashMap<UserId, User>,
}

/// インメモリ User Repository 実装
#[derive(Default)]
pub struct InMemoryUserRepository {
    table: Mutex<UserTable>,
}

impl InMemoryUserRepository {
    /// 新しい InMemoryUserRepository を作成
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create_user(
        &self,
        username: Username,
        display_name: DisplayName,
        key: PasswordDigest,
    ) -> Result<User, RepositoryError> {
        let mut table = self.table.lock().await;
        if table.rows.values().any(|user| user.username == username) {
            return Err(RepositoryError::UsernameTaken);
        }

        table.next_id += 1;
        let user = User {
            id: UserId::new(table.next_id),
            username,
            display_name,
            key,
        };
        table.rows.insert(user.id, user.clone());
        tracing::debug!("User '{}' stored with id {}", user.username, user.id);
        Ok(user)
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let table = self.table.lock().await;
        Ok(table.rows.get(&id).cloned())
    }

    async fn get_user_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, RepositoryError> {
        let table = self.table.lock().await;
        Ok(table
            .rows
            .values()
            .find(|user| &user.username == username)
            .cloned())
    }

    async fn get_users(&self, ids: &[UserId]) -> Result<Vec<User>, RepositoryError> {
        let table = self.table.lock().await;
        Ok(ids
            .iter()
            .filter_map(|id| table.rows.get(id).cloned())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn create(repository: &InMemoryUserRepository, name: &str) -> Result<User, RepositoryError> {
        let username = Username::new(name.to_string()).unwrap();
        let key = PasswordDigest::from_password(&username, "password").unwrap();
        repository
            .create_user(username, DisplayName::new(name.to_uppercase()).unwrap(), key)
            .await
    }

    #[tokio::test]
    async fn test_create_user_assigns_sequential_ids() {
        // テスト項目: ユーザー作成時に連番の ID が割り当てられる
        // given (前提条件):
        let repository = InMemoryUserRepository::new();

        // when (操作):
        let alice = create(&repository, "alice").await.unwrap();
        let bob = create(&repository, "bob").await.unwrap();

        // then (期待する結果):
        assert_eq!(alice.id, UserId::new(1));
        assert_eq!(bob.id, UserId::new(2));
        assert_eq!(repository.get_user(bob.id).await.unwrap(), Some(bob));
    }

    #[tokio::test]
    async fn test_create_user_rejects_taken_username() {
        // テスト項目: 既に使われている username では作成できない
        // given (前提条件):
        let repository = InMemoryUserRepository::new();
        create(&repository, "alice").await.unwrap();

        // when (操作):
        let result = create(&repository, "alice").await;

        // then (期待する結果):
        assert_eq!(result, Err(RepositoryError::UsernameTaken));
    }

    #[tokio::test]
    async fn test_get_user_by_username_and_get_users() {
        // テスト項目: username 検索と複数 ID 検索
        // given (前提条件):
        let repository = InMemoryUserRepository::new();
        let alice = create(&repository, "alice").await.unwrap();
        let bob = create(&repository, "bob").await.unwrap();

        // when (操作):
        let found = repository
            .get_user_by_username(&Username::new("alice".to_string()).unwrap())
            .await
            .unwrap();
        let many = repository
            .get_users(&[bob.id, UserId::new(99), alice.id])
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(found, Some(alice.clone()));
        assert_eq!(many, vec![bob, alice]);
    }
}
