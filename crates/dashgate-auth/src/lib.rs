//! # Dashgate Auth
//!
//! JWT claims and token utilities.
//!
//! - **Access token** ([`Claims`]): carries the user id, email, role and the
//!   permission strings that role grants, so request authorization needs no
//!   database lookup.
//! - **Refresh token** ([`RefreshTokenClaims`]): long-lived, exchanged for a
//!   new access token after the role is re-read from the database.
//!
//! ```ignore
//! use dashgate_auth::{create_access_token, verify_token};
//! use dashgate_config::JwtConfig;
//!
//! let config = JwtConfig::from_env();
//! let token = create_access_token(user_id, "user@example.com", "admin", &config)?;
//! let claims = verify_token(&token, &config)?;
//! assert_eq!(claims.role, "admin");
//! ```

pub mod claims;
pub mod jwt;

pub use claims::{Claims, RefreshTokenClaims};
pub use jwt::{create_access_token, create_refresh_token, verify_refresh_token, verify_token};
