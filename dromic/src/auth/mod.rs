//! Authentication: password hashing, session tokens, lockout, and the request extractor.
//!
//! # Sessions
//!
//! Browser sessions are JWTs carried in an HTTP-only cookie (`auth-token` by default):
//! - Users log in via `POST /api/auth/login` with an email or username and a password
//! - The token carries the account id, email, user level and a per-login session id
//! - Tokens expire after the configured session timeout (7 days by default)
//! - Logout clears the cookie; there is no server-side session store
//!
//! # Lockout
//!
//! Repeated password failures lock an account for a fixed window. While locked, login is
//! refused with `423 Locked` even when the password is correct. See [`lockout`].
//!
//! # Modules
//!
//! - [`current_user`]: Extractor for getting the authenticated user in handlers
//! - [`lockout`]: Failed-login lockout policy
//! - [`password`]: Password hashing and verification using bcrypt, reset tokens
//! - [`session`]: JWT creation and verification
//!
//! # Usage in Handlers
//!
//! ```ignore
//! use dromic::api::models::users::CurrentUser;
//!
//! async fn protected_handler(current_user: CurrentUser) -> Result<String, Error> {
//!     Ok(format!("Hello, {}!", current_user.email))
//! }
//! ```

pub mod current_user;
pub mod lockout;
pub mod password;
pub mod session;
