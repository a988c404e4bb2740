use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, DomainResult, Entity, UserId};

const MAX_USERNAME_LEN: usize = 150;

/// A registered account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> UserId {
        self.id
    }
}

/// Sign-up form as submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signup {
    pub username: String,
    pub password: String,
    pub repassword: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl Signup {
    /// Check the form. Username uniqueness is checked against storage by the caller.
    pub fn validate(self) -> DomainResult<Self> {
        let username = self.username.trim().to_string();
        if username.is_empty() || username.chars().count() > MAX_USERNAME_LEN {
            return Err(DomainError::validation("Please enter a valid username"));
        }
        if self.password.is_empty() {
            return Err(DomainError::validation("Please enter a password"));
        }
        if self.password != self.repassword {
            return Err(DomainError::validation("Please enter same password"));
        }
        let email = self
            .email
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty());
        Ok(Self { username, email, ..self })
    }
}

/// A validated account ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub email: Option<String>,
    pub password_hash: String,
}
