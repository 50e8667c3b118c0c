//! Auth handlers and supporting modules.
//!
//! Passwords are stored as Argon2id PHC strings. Successful signup or login
//! returns an HS256 bearer token carrying the user id and role; protected
//! routes resolve it through [`principal::require_auth`].
//!
//! ## Password reset
//!
//! Reset tokens are 32 random bytes, base64url encoded, mailed as a frontend
//! link and stored only as a SHA-256 hash with an expiry. They are single use.

pub(crate) mod login;
pub(crate) mod password;
pub(crate) mod principal;
pub(crate) mod signup;
mod state;
mod storage;
mod token;
pub(crate) mod types;
mod utils;
pub(crate) mod verify;

pub use principal::Principal;
pub use state::{AuthConfig, AuthState};
pub use storage::{UserRecord, UserStore};
pub use token::{Claims, TokenError, TokenKeys};
