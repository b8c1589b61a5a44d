// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Email and password accounts with stateless bearer tokens.
//!
//! ## Auth Flow
//!
//! 1. `POST /api/v1/auth/register` or `/login` returns `{ token, user }`
//! 2. Clients send `Authorization: Bearer <token>`
//! 3. The [`Auth`] extractor:
//!    - verifies the HS256 signature and expiry
//!    - parses `sub` into the numeric user id
//!    - loads the user and hands the handler a [`SanitizedUser`]
//!
//! ## Security
//!
//! - Password hashes never leave the storage layer
//! - Unknown email and wrong password fail identically
//! - Every token failure reports the same message
//!
//! [`SanitizedUser`]: crate::storage::SanitizedUser

pub mod error;
pub mod extractor;
pub mod password;
pub mod service;
pub mod token;

pub use error::AuthError;
pub use extractor::Auth;
pub use password::CredentialHasher;
pub use service::{AuthResponse, AuthService};
pub use token::{TokenIssuer, TokenPayload};
