// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Auth Service: registration, login, token verification and profile lookup.
//!
//! Plaintext passwords only ever reach the hasher; every returned user is a
//! [`SanitizedUser`]. Hashing runs on the blocking pool so a slow cost factor
//! never stalls the async workers.

use std::sync::Arc;

use serde::Serialize;
use utoipa::ToSchema;

use super::password::CredentialHasher;
use super::token::{TokenIssuer, TokenPayload};
use super::AuthError;
use crate::config::AuthSettings;
use crate::storage::{NewUser, SanitizedUser, StoreError, User, UserStore};

/// Payload returned by `register` and `login`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthResponse {
    /// Signed bearer token
    pub token: String,
    pub user: SanitizedUser,
}

pub struct AuthService {
    store: Arc<dyn UserStore>,
    hasher: CredentialHasher,
    tokens: TokenIssuer,
}

impl AuthService {
    /// Build the service. Fails when no token secret is configured or the
    /// hash cost is unusable; both are startup errors.
    pub fn new(store: Arc<dyn UserStore>, settings: &AuthSettings) -> Result<Self, AuthError> {
        let tokens = TokenIssuer::new(&settings.jwt_secret, settings.token_expiry)
            .map_err(|e| AuthError::Internal(e.to_string()))?;
        let hasher = CredentialHasher::new(settings.salt_rounds)
            .map_err(|e| AuthError::Internal(e.to_string()))?;
        Ok(Self::from_parts(store, hasher, tokens))
    }

    pub fn from_parts(
        store: Arc<dyn UserStore>,
        hasher: CredentialHasher,
        tokens: TokenIssuer,
    ) -> Self {
        Self {
            store,
            hasher,
            tokens,
        }
    }

    pub fn store(&self) -> &Arc<dyn UserStore> {
        &self.store
    }

    /// Register a new user and return a token for the created record.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, AuthError> {
        let email = normalize_email(email);
        let email = email.as_str();
        if self.store.find_by_email(email).map_err(store_failure)?.is_some() {
            return Err(AuthError::Conflict);
        }

        let password_hash = self.hash_password(password).await?;

        let user_id = self
            .store
            .create(NewUser {
                name: name.to_string(),
                email: email.to_string(),
                password_hash,
            })
            .map_err(|e| match e {
                StoreError::Duplicate(_) => AuthError::Conflict,
                other => store_failure(other),
            })?;

        let created = self
            .store
            .find_by_id(user_id)
            .map_err(store_failure)?
            .ok_or_else(|| AuthError::Internal("Failed to create user".to_string()))?;

        tracing::info!(user_id = created.id, "User registered");
        self.respond_with_token(&created)
    }

    /// Authenticate by email and password.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, AuthError> {
        let email = normalize_email(email);
        let Some(user) = self.store.find_by_email(&email).map_err(store_failure)? else {
            tracing::warn!("Failed login attempt");
            return Err(AuthError::InvalidCredentials);
        };

        if !self.verify_password(password, &user.password_hash).await? {
            tracing::warn!("Failed login attempt");
            return Err(AuthError::InvalidCredentials);
        }

        tracing::info!(user_id = user.id, "User logged in");
        self.respond_with_token(&user)
    }

    /// Validate a bearer token.
    pub fn verify_token(&self, token: &str) -> Result<TokenPayload, AuthError> {
        self.tokens.verify(token).map_err(|e| {
            tracing::debug!(reason = %e, "Token rejected");
            AuthError::InvalidToken
        })
    }

    pub fn get_sanitized_user_by_id(&self, id: u64) -> Result<SanitizedUser, AuthError> {
        self.store
            .find_by_id(id)
            .map_err(store_failure)?
            .map(SanitizedUser::from)
            .ok_or(AuthError::UserNotFound)
    }

    fn respond_with_token(&self, user: &User) -> Result<AuthResponse, AuthError> {
        let token = self
            .tokens
            .issue(user.id, &user.email)
            .map_err(|e| AuthError::Internal(e.to_string()))?;
        Ok(AuthResponse {
            token,
            user: SanitizedUser::from(user),
        })
    }

    async fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let hasher = self.hasher.clone();
        let password = password.to_string();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?
            .map_err(|e| AuthError::Internal(e.to_string()))
    }

    async fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let hasher = self.hasher.clone();
        let password = password.to_string();
        let hash = hash.to_string();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?
            .map_err(|e| AuthError::Internal(e.to_string()))
    }
}

/// Emails are unique regardless of case; stores only ever see this form.
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn store_failure(e: StoreError) -> AuthError {
    AuthError::Internal(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryUserStore;
    use std::time::Duration;

    fn service_with(store: Arc<InMemoryUserStore>) -> AuthService {
        AuthService::from_parts(
            store,
            CredentialHasher::new(1).unwrap(),
            TokenIssuer::new("test-secret", Duration::from_secs(3600)).unwrap(),
        )
    }

    fn service() -> (AuthService, Arc<InMemoryUserStore>) {
        let store = Arc::new(InMemoryUserStore::new());
        (service_with(store.clone()), store)
    }

    #[test]
    fn missing_secret_fails_construction() {
        let settings = AuthSettings {
            jwt_secret: String::new(),
            salt_rounds: 12,
            token_expiry: Duration::from_secs(3600),
        };
        let store: Arc<dyn UserStore> = Arc::new(InMemoryUserStore::new());
        assert!(AuthService::new(store, &settings).is_err());
    }

    #[tokio::test]
    async fn register_returns_sanitized_user_and_token() {
        let (service, store) = service();
        let result = service
            .register("Jane Doe", "jane.doe@example.com", "StrongP@ss1!")
            .await
            .unwrap();

        assert_eq!(result.user.name, "Jane Doe");
        assert_eq!(result.user.email, "jane.doe@example.com");

        let json = serde_json::to_value(&result).unwrap();
        assert!(json["user"].get("password").is_none());
        assert!(json["user"].get("password_hash").is_none());

        let stored = store.find_by_email("jane.doe@example.com").unwrap().unwrap();
        assert_ne!(stored.password_hash, "StrongP@ss1!");

        let payload = service.verify_token(&result.token).unwrap();
        assert_eq!(payload.user_id, result.user.id);
        assert_eq!(payload.email, "jane.doe@example.com");
    }

    #[tokio::test]
    async fn register_then_login_resolves_same_user() {
        let (service, _) = service();
        let registered = service
            .register("Jane", "jane@example.com", "secret-pass")
            .await
            .unwrap();

        let logged_in = service.login("jane@example.com", "secret-pass").await.unwrap();
        let payload = service.verify_token(&logged_in.token).unwrap();
        assert_eq!(payload.user_id, registered.user.id);
        assert_eq!(logged_in.user, registered.user);
    }

    #[tokio::test]
    async fn duplicate_registration_is_conflict_without_create() {
        let (service, store) = service();
        service
            .register("Jane", "jane@example.com", "secret-pass")
            .await
            .unwrap();
        assert_eq!(store.create_calls(), 1);

        let err = service
            .register("Other Jane", "jane@example.com", "another-pass")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Conflict));
        assert_eq!(store.create_calls(), 1);
    }

    #[tokio::test]
    async fn email_case_does_not_create_second_account() {
        let (service, store) = service();
        let registered = service
            .register("Jane", "Jane@Example.com", "secret-pass")
            .await
            .unwrap();
        assert_eq!(registered.user.email, "jane@example.com");

        let err = service
            .register("Jane", " jane@example.com", "other-pass")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Conflict));
        assert_eq!(store.create_calls(), 1);

        let logged_in = service.login("JANE@example.COM", "secret-pass").await.unwrap();
        assert_eq!(logged_in.user.id, registered.user.id);
    }

    #[tokio::test]
    async fn wrong_password_is_indistinguishable_from_unknown_email() {
        let (service, _) = service();
        service
            .register("Jane", "jane@example.com", "secret-pass")
            .await
            .unwrap();

        let wrong_password = service.login("jane@example.com", "nope").await.unwrap_err();
        let unknown_email = service.login("ghost@example.com", "nope").await.unwrap_err();

        assert!(matches!(wrong_password, AuthError::InvalidCredentials));
        assert!(matches!(unknown_email, AuthError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
        assert_eq!(wrong_password.status_code(), unknown_email.status_code());
    }

    #[tokio::test]
    async fn tampered_token_is_unauthorized() {
        let (service, _) = service();
        let registered = service
            .register("Jane", "jane@example.com", "secret-pass")
            .await
            .unwrap();

        let mut token = registered.token.clone();
        token.push('x');
        assert!(matches!(
            service.verify_token(&token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn token_from_other_secret_is_unauthorized() {
        let (service, store) = service();
        let foreign = AuthService::from_parts(
            store,
            CredentialHasher::new(1).unwrap(),
            TokenIssuer::new("someone-else", Duration::from_secs(3600)).unwrap(),
        );
        let registered = foreign
            .register("Jane", "jane@example.com", "secret-pass")
            .await
            .unwrap();

        assert!(matches!(
            service.verify_token(&registered.token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn unknown_user_id_is_not_found() {
        let (service, _) = service();
        assert!(matches!(
            service.get_sanitized_user_by_id(404),
            Err(AuthError::UserNotFound)
        ));
    }
}
