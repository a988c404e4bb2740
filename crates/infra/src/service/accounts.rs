use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::instrument;

use stockroom_auth::{
    Hs256JwtValidator, JwtClaims, NewUser, Signup, User, hash_password, verify_password,
};
use stockroom_core::DomainError;

use crate::error::{InfraError, InfraResult};
use crate::repository::InventoryRepository;

/// A signed access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Sign-up and login.
#[derive(Clone)]
pub struct AccountService {
    repo: Arc<dyn InventoryRepository>,
    jwt: Arc<Hs256JwtValidator>,
    token_ttl: Duration,
}

impl AccountService {
    pub fn new(repo: Arc<dyn InventoryRepository>, jwt: Arc<Hs256JwtValidator>, token_ttl: Duration) -> Self {
        Self { repo, jwt, token_ttl }
    }

    #[instrument(skip(self, form), fields(username = %form.username), err)]
    pub async fn signup(&self, form: Signup) -> InfraResult<User> {
        let form = form.validate()?;
        if self.repo.user_by_username(&form.username).await?.is_some() {
            return Err(DomainError::conflict("Username already exists!").into());
        }

        let password = form.password;
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| InfraError::backend(format!("hashing task failed: {e}")))?
            .map_err(|e| InfraError::backend(e.to_string()))?;

        let user = self
            .repo
            .insert_user(NewUser {
                username: form.username,
                email: form.email,
                password_hash,
            })
            .await?;
        tracing::info!(user_id = %user.id, "account created");
        Ok(user)
    }

    /// Check credentials and issue a token. Unknown users and wrong passwords
    /// fail the same way.
    #[instrument(skip(self, password), err)]
    pub async fn login(&self, username: &str, password: &str, now: DateTime<Utc>) -> InfraResult<IssuedToken> {
        let user = self
            .repo
            .user_by_username(username.trim())
            .await?
            .ok_or(DomainError::Unauthorized)?;

        let password = password.to_string();
        let hash = user.password_hash.clone();
        let matches = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|e| InfraError::backend(format!("verify task failed: {e}")))?
            .map_err(|e| InfraError::backend(e.to_string()))?;
        if !matches {
            return Err(DomainError::Unauthorized.into());
        }

        let claims = JwtClaims::new(user.id, now, self.token_ttl);
        let token = self
            .jwt
            .issue(&claims)
            .map_err(|e| InfraError::backend(e.to_string()))?;
        Ok(IssuedToken {
            token,
            expires_at: claims.expires_at,
        })
    }
}
