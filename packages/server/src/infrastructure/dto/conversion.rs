//! Conversion logic from domain entities to DTOs.

use crate::domain::User;
use crate::infrastructure::dto::http as dto;

impl From<&User> for dto::UserDto {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.value(),
            username: user.username.as_str().to_string(),
            display_name: user.display_name.as_str().to_string(),
        }
    }
}

impl From<User> for dto::UserDto {
    fn from(user: User) -> Self {
        Self::from(&user)
    }
}
