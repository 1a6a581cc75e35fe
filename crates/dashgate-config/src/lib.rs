//! # Dashgate Config
//!
//! Configuration types for the Dashgate API, loaded from environment variables:
//!
//! - [`jwt`]: JWT signing secret and token lifetimes
//! - [`cors`]: allowed browser origins
//! - [`rate_limit`]: per-IP rate limiting
//! - [`powerbi`]: Entra ID / Power BI endpoints and token cache lifetime
//! - [`server`]: bind address
//!
//! ```ignore
//! use dashgate_config::{JwtConfig, PowerBiConfig};
//!
//! let jwt_config = JwtConfig::from_env();
//! let powerbi_config = PowerBiConfig::from_env();
//! ```

pub mod cors;
pub mod jwt;
pub mod powerbi;
pub mod rate_limit;
pub mod server;

pub use cors::CorsConfig;
pub use jwt::JwtConfig;
pub use powerbi::PowerBiConfig;
pub use rate_limit::RateLimitConfig;
pub use server::ServerConfig;

/// Reads an environment variable and parses it, falling back on absence or parse failure.
pub(crate) fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
