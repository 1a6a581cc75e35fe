//! Power BI and Entra ID endpoint configuration.
//!
//! The base URLs are configurable so a deployment can target a sovereign cloud
//! and tests can point the client at a local mock server.

use std::time::Duration;

use crate::env_or;

pub const DEFAULT_AUTHORITY_URL: &str = "https://login.microsoftonline.com";
pub const DEFAULT_API_URL: &str = "https://api.powerbi.com";
pub const DEFAULT_SCOPE: &str = "https://analysis.windows.net/powerbi/api/.default";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PowerBiConfig {
    /// Base URL of the OAuth authority; the tenant id is appended as a path segment.
    pub authority_url: String,
    /// Base URL that proxied paths such as `v1.0/myorg/groups` are resolved against.
    pub api_url: String,
    pub scope: String,
    /// Upper bound on how long an access token is reused.
    pub token_ttl: Duration,
    pub http_timeout: Duration,
}

impl Default for PowerBiConfig {
    fn default() -> Self {
        Self {
            authority_url: DEFAULT_AUTHORITY_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            scope: DEFAULT_SCOPE.to_string(),
            token_ttl: Duration::from_secs(50 * 60),
            http_timeout: Duration::from_secs(30),
        }
    }
}

impl PowerBiConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            authority_url: trim_url(
                std::env::var("POWERBI_AUTHORITY_URL").unwrap_or(defaults.authority_url),
            ),
            api_url: trim_url(std::env::var("POWERBI_API_URL").unwrap_or(defaults.api_url)),
            scope: std::env::var("POWERBI_SCOPE").unwrap_or(defaults.scope),
            token_ttl: Duration::from_secs(env_or(
                "POWERBI_TOKEN_TTL_SECS",
                defaults.token_ttl.as_secs(),
            )),
            http_timeout: Duration::from_secs(env_or(
                "POWERBI_HTTP_TIMEOUT_SECS",
                defaults.http_timeout.as_secs(),
            )),
        }
    }

    /// Config pointing both endpoints at one base URL, used against mock servers.
    pub fn with_base_url(base_url: &str) -> Self {
        let base = trim_url(base_url.to_string());
        Self {
            authority_url: base.clone(),
            api_url: base,
            ..Self::default()
        }
    }

    pub fn token_url(&self, tenant_id: &str) -> String {
        format!("{}/{}/oauth2/v2.0/token", self.authority_url, tenant_id)
    }

    pub fn api_endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path.trim_start_matches('/'))
    }
}

fn trim_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}
