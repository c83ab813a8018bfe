//! Authentication utilities library
//!
//! Provides the credential primitives behind the NFS-e service gate:
//! - Password hashing (Argon2id)
//! - Bearer token issuing and validation (JWT, HMAC family)
//! - Login coordination with uniform failure cost
//!
//! The service defines its own ports and adapts these implementations.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash).unwrap());
//! ```
//!
//! ## Login and token validation
//! ```
//! use auth::Authenticator;
//! use chrono::Duration;
//!
//! let auth = Authenticator::new(
//!     b"secret_key_at_least_32_bytes_long!",
//!     "HS256",
//!     Duration::minutes(30),
//! )
//! .unwrap();
//!
//! let hash = auth.hash_password("password123").unwrap();
//! let result = auth
//!     .authenticate("password123", Some(hash.as_str()), "ana@example.com")
//!     .unwrap();
//!
//! let claims = auth.verify_token(&result.access_token).unwrap();
//! assert_eq!(claims.sub.as_deref(), Some("ana@example.com"));
//! ```

pub mod authenticator;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::AuthenticationResult;
pub use authenticator::Authenticator;
pub use jwt::Claims;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use password::PasswordError;
pub use password::PasswordHasher;
