//! # Dashgate Power BI
//!
//! Client for the Power BI REST API using the OAuth 2.0 client-credentials
//! grant against Entra ID.
//!
//! - [`PowerBiApi`]: token acquisition, the raw [`PowerBiApi::request`]
//!   passthrough and typed helpers (workspaces, reports, pages, embed tokens)
//! - [`TokenCache`]: per-credential access-token cache with a fixed lifetime
//! - [`PowerBiError`]: failures, mapped onto HTTP statuses by
//!   [`PowerBiError::into_app_error`]
//!
//! ```ignore
//! let api = PowerBiApi::new(PowerBiConfig::from_env())?;
//! let token = api.access_token(&credentials).await?;
//! let reports = api.list_all_reports(&token).await?;
//! ```

pub mod cache;
pub mod client;
pub mod error;
pub mod models;
#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use cache::TokenCache;
pub use client::{PowerBiApi, UpstreamResponse};
pub use error::PowerBiError;
pub use models::{
    EffectiveIdentity, EmbedToken, GenerateTokenRequest, PowerBiCredentials, Report, ReportPage,
    Workspace,
};

/// Cache key used when no stored client is named explicitly.
pub const DEFAULT_CACHE_KEY: &str = "default";
