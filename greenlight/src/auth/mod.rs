//! Authentication.
//!
//! Clients log in with email and password at `/v1/tokens/authentication` and receive an opaque
//! bearer token, which they then send as `Authorization: Bearer <token>`.
//!
//! # Modules
//!
//! - [`password`]: Argon2id password hashing and verification
//! - [`tokens`]: token plaintext generation and SHA-256 digests
//! - [`middleware`]: resolves the bearer token on every request
//! - [`current_user`]: extractors for the resolved user

pub mod current_user;
pub mod middleware;
pub mod password;
pub mod tokens;
