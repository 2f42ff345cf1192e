//! Value Objects for domain models.
//!
//! Value Objects are immutable objects that represent values in the domain.
//! They are compared by their value, not by identity.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::error::ValueObjectError;

/// Maximum length of a username
pub const USERNAME_MAX_LENGTH: usize = 32;

/// Maximum length of a display name
pub const DISPLAY_NAME_MAX_LENGTH: usize = 64;

/// Maximum length of a message body
pub const MESSAGE_CONTENT_MAX_LENGTH: usize = 10_000;

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            pub fn new(id: i64) -> Self {
                Self(id)
            }

            pub fn value(&self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse::<i64>().map(Self)
            }
        }
    };
}

numeric_id!(
    /// User identifier value object.
    UserId
);

numeric_id!(
    /// Chat identifier value object.
    ///
    /// Also the resource key of the SSE connection registry.
    ChatId
);

numeric_id!(
    /// Message identifier value object.
    MessageId
);

/// Opaque session token carried in the session cookie.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wrap an existing token (e.g. read from a cookie).
    pub fn new(token: String) -> Result<Self, ValueObjectError> {
        if token.is_empty() {
            return Err(ValueObjectError::SessionTokenEmpty);
        }
        Ok(Self(token))
    }

    /// Generate a fresh random token (UUID v4).
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of one open SSE connection.
///
/// Distinguishes several tabs or devices of the same viewer on one chat.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionId(String);

impl ConnectionId {
    /// Allocate a fresh unique connection id (UUID v4).
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Login name of a user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    /// Create a new Username.
    ///
    /// # Returns
    ///
    /// A Result containing the Username or an error if validation fails
    pub fn new(username: String) -> Result<Self, ValueObjectError> {
        if username.is_empty() {
            return Err(ValueObjectError::UsernameEmpty);
        }
        if username.chars().any(char::is_whitespace) {
            return Err(ValueObjectError::UsernameWhitespace);
        }
        let len = username.chars().count();
        if len > USERNAME_MAX_LENGTH {
            return Err(ValueObjectError::UsernameTooLong {
                max: USERNAME_MAX_LENGTH,
                actual: len,
            });
        }
        Ok(Self(username))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Name shown to other chat members.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DisplayName(String);

impl DisplayName {
    pub fn new(name: String) -> Result<Self, ValueObjectError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(ValueObjectError::DisplayNameEmpty);
        }
        let len = trimmed.chars().count();
        if len > DISPLAY_NAME_MAX_LENGTH {
            return Err(ValueObjectError::DisplayNameTooLong {
                max: DISPLAY_NAME_MAX_LENGTH,
                actual: len,
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Message content value object.
///
/// Represents the content of a chat message with validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageContent(String);

impl MessageContent {
    pub fn new(content: String) -> Result<Self, ValueObjectError> {
        if content.trim().is_empty() {
            return Err(ValueObjectError::MessageContentEmpty);
        }
        let len = content.chars().count();
        if len > MESSAGE_CONTENT_MAX_LENGTH {
            return Err(ValueObjectError::MessageContentTooLong {
                max: MESSAGE_CONTENT_MAX_LENGTH,
                actual: len,
            });
        }
        Ok(Self(content))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// SHA-256 digest of a password, salted with the username.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordDigest(String);

impl PasswordDigest {
    /// Hash `password` for `username`.
    pub fn from_password(username: &Username, password: &str) -> Result<Self, ValueObjectError> {
        if password.is_empty() {
            return Err(ValueObjectError::PasswordEmpty);
        }
        Ok(Self(Self::hash(username, password)))
    }

    /// Check a candidate password against this digest.
    pub fn verify(&self, username: &Username, password: &str) -> bool {
        self.0 == Self::hash(username, password)
    }

    fn hash(username: &Username, password: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(username.as_str().as_bytes());
        hasher.update(b":");
        hasher.update(password.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

impl fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordDigest(..)")
    }
}
