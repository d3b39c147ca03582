//! Account registration, login, and token issuance.
//!
//! Passwords are stored as bcrypt hashes. Tokens are HS256 JWTs carrying the
//! account id and expire after the configured number of hours.

use std::sync::Arc;

use chrono::Duration;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::error::ApiError;
use crate::models::PublicUser;
use crate::store::Store;

// ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Account id.
    pub id: i64,
    pub iat: i64,
    pub exp: i64,
}

/// Result of a successful register or login.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user: PublicUser,
}

#[derive(Clone)]
pub struct Authenticator {
    // ---
    store: Store,
    clock: Arc<dyn Clock>,
    secret: Arc<str>,
    ttl: Duration,
    bcrypt_cost: u32,
}

impl Authenticator {
    // ---
    pub fn new(
        store: Store,
        clock: Arc<dyn Clock>,
        secret: &str,
        ttl_hours: u32,
        bcrypt_cost: u32,
    ) -> Self {
        Self {
            store,
            clock,
            secret: Arc::from(secret),
            ttl: Duration::hours(i64::from(ttl_hours)),
            bcrypt_cost,
        }
    }

    /// Create an account. Fails with [`ApiError::Auth`] if the username or
    /// email is taken.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<Session, ApiError> {
        // ---
        let exists = self
            .store
            .account_exists(username, email)
            .await
            .map_err(ApiError::store("check existing accounts"))?;
        if exists {
            return Err(duplicate_account());
        }

        let hash = self.hash_password(password).await?;
        let id = self
            .store
            .insert_account(username, email, &hash, &self.clock.timestamp())
            .await
            .map_err(insert_error)?;

        tracing::info!(account_id = id, "Account registered");
        let user = PublicUser {
            id,
            username: username.to_string(),
            email: email.to_string(),
        };
        Ok(Session {
            token: self.issue_token(id)?,
            user,
        })
    }

    /// Check credentials and issue a fresh token.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, ApiError> {
        // ---
        let account = self
            .store
            .find_account_by_email(email)
            .await
            .map_err(ApiError::store("look up account"))?
            .ok_or_else(|| ApiError::Auth("Usuário não encontrado".to_string()))?;

        if !self.verify_password(password, &account.password).await? {
            tracing::debug!(account_id = account.id, "Rejected login with wrong password");
            return Err(ApiError::Auth("Senha inválida".to_string()));
        }

        Ok(Session {
            token: self.issue_token(account.id)?,
            user: PublicUser::from(&account),
        })
    }

    pub fn issue_token(&self, account_id: i64) -> Result<String, ApiError> {
        // ---
        let now = self.clock.now();
        let claims = Claims {
            id: account_id,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| ApiError::Internal(format!("token signing failed: {e}")))
    }

    /// Decode and validate a token, including its expiry.
    pub fn verify_token(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
    }

    async fn hash_password(&self, password: &str) -> Result<String, ApiError> {
        // ---
        let password = password.to_string();
        let cost = self.bcrypt_cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| ApiError::Internal(format!("hashing task failed: {e}")))?
            .map_err(|e| ApiError::Internal(format!("password hashing failed: {e}")))
    }

    async fn verify_password(&self, password: &str, hash: &str) -> Result<bool, ApiError> {
        // ---
        let password = password.to_string();
        let hash = hash.to_string();
        let verified = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| ApiError::Internal(format!("verify task failed: {e}")))?;

        // An unreadable stored hash can never match
        Ok(verified.unwrap_or(false))
    }
}

fn duplicate_account() -> ApiError {
    ApiError::Auth("Usuário ou email já existe".to_string())
}

/// A unique violation at insert means a concurrent registration won.
fn insert_error(e: sqlx::Error) -> ApiError {
    match e {
        sqlx::Error::Database(db) if db.is_unique_violation() => duplicate_account(),
        other => ApiError::store("create account")(other),
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::clock::SystemClock;

    async fn authenticator() -> Authenticator {
        let store = Store::in_memory().await.unwrap();
        Authenticator::new(store, Arc::new(SystemClock), "test-secret", 24, 4)
    }

    #[tokio::test]
    async fn test_register_then_login() {
        // ---
        let auth = authenticator().await;
        let registered = auth.register("ana", "ana@example.com", "s3cret").await.unwrap();
        assert_eq!(registered.user.username, "ana");

        let session = auth.login("ana@example.com", "s3cret").await.unwrap();
        assert_eq!(session.user.id, registered.user.id);

        let claims = auth.verify_token(&session.token).unwrap();
        assert_eq!(claims.id, registered.user.id);
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        // ---
        let auth = authenticator().await;
        auth.register("ana", "ana@example.com", "pw").await.unwrap();

        let err = auth.register("other", "ana@example.com", "pw").await.unwrap_err();
        assert!(matches!(err, ApiError::Auth(_)));
    }

    #[tokio::test]
    async fn test_unique_violation_at_insert_is_duplicate() {
        // ---
        let auth = authenticator().await;
        let ts = "2024-10-14T10:00:00.000Z";
        auth.store.insert_account("ana", "ana@example.com", "hash", ts).await.unwrap();

        // Skips the pre-check, as a racing registration would
        let raced = auth
            .store
            .insert_account("ana2", "ana@example.com", "hash", ts)
            .await
            .unwrap_err();
        let err = insert_error(raced);

        assert!(matches!(err, ApiError::Auth(_)), "got {err:?}");
        assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_other_insert_failures_stay_store_errors() {
        // ---
        let err = insert_error(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, ApiError::Store { context: "create account", .. }));
    }

    #[tokio::test]
    async fn test_wrong_password_rejected() {
        // ---
        let auth = authenticator().await;
        auth.register("ana", "ana@example.com", "right").await.unwrap();

        let err = auth.login("ana@example.com", "wrong").await.unwrap_err();
        assert!(matches!(err, ApiError::Auth(_)));

        let err = auth.login("nobody@example.com", "right").await.unwrap_err();
        assert!(matches!(err, ApiError::Auth(_)));
    }

    #[tokio::test]
    async fn test_password_is_stored_hashed() {
        // ---
        let auth = authenticator().await;
        auth.register("ana", "ana@example.com", "plain").await.unwrap();

        let account = auth.store.find_account_by_email("ana@example.com").await.unwrap().unwrap();
        assert_ne!(account.password, "plain");
        assert!(bcrypt::verify("plain", &account.password).unwrap());
    }

    #[tokio::test]
    async fn test_token_with_other_secret_rejected() {
        // ---
        let auth = authenticator().await;
        let token = auth.issue_token(7).unwrap();

        let other = Authenticator::new(auth.store.clone(), Arc::new(SystemClock), "other", 24, 4);
        assert!(other.verify_token(&token).is_err());
    }
}
