// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::error::ApiError;

/// Generic message for every token verification failure.
pub const INVALID_TOKEN_MESSAGE: &str = "Invalid or expired token";

/// Shared message for unknown email and wrong password.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid email or password";

/// Authentication error type.
///
/// Token failures are deliberately collapsed into `InvalidToken` and login
/// failures into `InvalidCredentials`; callers never learn which check
/// failed.
#[derive(Debug)]
pub enum AuthError {
    /// Email already registered
    Conflict,
    /// Unknown email or wrong password
    InvalidCredentials,
    /// Bad signature, expired, or malformed payload
    InvalidToken,
    /// No `Authorization: Bearer` header
    MissingAuthHeader,
    /// Token subject does not resolve to a user
    UserNotFound,
    /// Hashing, signing or store failure (detail is logged, not returned)
    Internal(String),
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::Conflict => "conflict",
            AuthError::InvalidCredentials | AuthError::InvalidToken => "unauthorized",
            AuthError::MissingAuthHeader => "missing_auth_header",
            AuthError::UserNotFound => "not_found",
            AuthError::Internal(_) => "internal_error",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Conflict => StatusCode::CONFLICT,
            AuthError::InvalidCredentials
            | AuthError::InvalidToken
            | AuthError::MissingAuthHeader => StatusCode::UNAUTHORIZED,
            AuthError::UserNotFound => StatusCode::NOT_FOUND,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to send to the client.
    pub fn public_message(&self) -> &'static str {
        match self {
            AuthError::Conflict => "User already exists",
            AuthError::InvalidCredentials => INVALID_CREDENTIALS_MESSAGE,
            AuthError::InvalidToken => INVALID_TOKEN_MESSAGE,
            AuthError::MissingAuthHeader => "Authorization header is missing or malformed",
            AuthError::UserNotFound => "User not found",
            AuthError::Internal(_) => crate::error::UNEXPECTED_ERROR_MESSAGE,
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::Internal(detail) => write!(f, "Internal authentication error: {detail}"),
            other => f.write_str(other.public_message()),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        if let AuthError::Internal(detail) = &e {
            tracing::error!(error = %detail, "Authentication internal error");
        }
        ApiError::new(e.status_code(), e.public_message()).with_code(e.error_code())
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}
