//! `stockroom-auth`: accounts, password hashing and bearer tokens.
//!
//! This crate is intentionally decoupled from HTTP and storage.

pub mod claims;
pub mod password;
pub mod token;
pub mod user;

pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use password::{PasswordError, hash_password, verify_password};
pub use token::{Hs256JwtValidator, JwtValidator, TokenError};
pub use user::{NewUser, Signup, User};
