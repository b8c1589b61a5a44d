// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Registration, login and profile endpoints.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::{Auth, AuthResponse};
use crate::error::{ApiError, ApiJson, ErrorBody};
use crate::state::AppState;
use crate::storage::SanitizedUser;

const NAME_LEN: std::ops::RangeInclusive<usize> = 3..=75;
const PASSWORD_LEN: std::ops::RangeInclusive<usize> = 6..=100;
const MAX_EMAIL_LEN: usize = 254;

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    #[schema(example = "Jane Doe")]
    pub name: String,
    #[schema(example = "jane.doe@example.com")]
    pub email: String,
    #[schema(example = "StrongP@ss1!")]
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileResponse {
    pub user: SanitizedUser,
}

impl RegisterRequest {
    fn validate(&self) -> Result<(), ApiError> {
        let name_len = self.name.trim().chars().count();
        if !NAME_LEN.contains(&name_len) {
            return Err(ApiError::bad_request(
                "Name must be between 3 and 75 characters",
            ));
        }
        if !is_plausible_email(self.email.trim()) {
            return Err(ApiError::bad_request("A valid email address is required"));
        }
        if !PASSWORD_LEN.contains(&self.password.chars().count()) {
            return Err(ApiError::bad_request(
                "Password must be between 6 and 100 characters",
            ));
        }
        Ok(())
    }
}

impl LoginRequest {
    fn validate(&self) -> Result<(), ApiError> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return Err(ApiError::bad_request("Email and password are required"));
        }
        Ok(())
    }
}

/// One `@`, a non-empty local part, a dotted domain and no whitespace.
fn is_plausible_email(email: &str) -> bool {
    if email.len() > MAX_EMAIL_LEN || email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && domain.split('.').all(|label| !label.is_empty())
}

/// Register a new user.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created", body = AuthResponse),
        (status = 400, description = "Invalid input", body = ErrorBody),
        (status = 409, description = "Email already registered", body = ErrorBody)
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    request.validate()?;
    let response = state
        .auth
        .register(request.name.trim(), request.email.trim(), &request.password)
        .await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Log in with email and password.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = AuthResponse),
        (status = 400, description = "Invalid input", body = ErrorBody),
        (status = 401, description = "Invalid email or password", body = ErrorBody)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    request.validate()?;
    let response = state
        .auth
        .login(request.email.trim(), &request.password)
        .await?;
    Ok(Json(response))
}

/// Profile of the token holder.
#[utoipa::path(
    get,
    path = "/api/v1/auth/profile",
    tag = "Auth",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Current user", body = ProfileResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 404, description = "User no longer exists", body = ErrorBody)
    )
)]
pub async fn profile(Auth(user): Auth) -> Json<ProfileResponse> {
    Json(ProfileResponse { user })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register_request(name: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn register_validation_bounds() {
        assert!(register_request("Jane", "jane@example.com", "secret").validate().is_ok());
        assert!(register_request("Jo", "jane@example.com", "secret").validate().is_err());
        assert!(register_request(&"x".repeat(76), "jane@example.com", "secret")
            .validate()
            .is_err());
        assert!(register_request("Jane", "jane@example.com", "short").validate().is_err());
        assert!(register_request("Jane", "jane@example.com", &"p".repeat(101))
            .validate()
            .is_err());
    }

    #[test]
    fn email_plausibility() {
        assert!(is_plausible_email("a@b.co"));
        assert!(is_plausible_email("jane.doe+tag@mail.example.com"));
        assert!(!is_plausible_email("no-at-sign.com"));
        assert!(!is_plausible_email("@example.com"));
        assert!(!is_plausible_email("jane@localhost"));
        assert!(!is_plausible_email("jane@example..com"));
        assert!(!is_plausible_email("jane doe@example.com"));
        assert!(!is_plausible_email("a@b@c.com"));
    }

    #[test]
    fn login_requires_both_fields() {
        let empty = LoginRequest {
            email: " ".to_string(),
            password: "pw".to_string(),
        };
        assert!(empty.validate().is_err());
    }
}
