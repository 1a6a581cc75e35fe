//! HTTP client for Entra ID and the Power BI REST API.

use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, instrument, warn};

use dashgate_config::PowerBiConfig;

use crate::cache::{TokenCache, effective_ttl};
use crate::error::PowerBiError;
use crate::models::{
    EmbedToken, GenerateTokenRequest, ODataList, PowerBiCredentials, Report, ReportPage,
    TokenResponse, Workspace,
};

/// Status and JSON body of a forwarded request. Non-JSON bodies read as `{}`.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub body: Value,
}

#[derive(Clone, Debug)]
pub struct PowerBiApi {
    http: reqwest::Client,
    config: PowerBiConfig,
    cache: TokenCache,
}

impl PowerBiApi {
    pub fn new(config: PowerBiConfig) -> Result<Self, PowerBiError> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;

        Ok(Self {
            http,
            config,
            cache: TokenCache::new(),
        })
    }

    pub fn config(&self) -> &PowerBiConfig {
        &self.config
    }

    pub fn cache(&self) -> &TokenCache {
        &self.cache
    }

    /// Runs the client-credentials grant, bypassing the cache.
    ///
    /// Returns the token and its `expires_in` in seconds when provided.
    #[instrument(skip(self, credentials), fields(tenant_id = %credentials.tenant_id))]
    pub async fn fetch_access_token(
        &self,
        credentials: &PowerBiCredentials,
    ) -> Result<(String, Option<u64>), PowerBiError> {
        if !credentials.is_complete() {
            return Err(PowerBiError::IncompleteCredentials);
        }

        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
            ("scope", self.config.scope.as_str()),
        ];

        let response = self
            .http
            .post(self.config.token_url(&credentials.tenant_id))
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "Token request rejected");
            return Err(PowerBiError::TokenRejected {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: TokenResponse = serde_json::from_str(&text)
            .map_err(|e| PowerBiError::InvalidResponse(format!("token endpoint: {}", e)))?;

        let token = parsed
            .access_token
            .filter(|token| !token.is_empty())
            .ok_or(PowerBiError::MissingAccessToken)?;

        Ok((token, parsed.expires_in))
    }

    /// Returns a cached token for `credentials.cache_key`, minting one on a miss.
    pub async fn access_token(
        &self,
        credentials: &PowerBiCredentials,
    ) -> Result<String, PowerBiError> {
        if let Some(token) = self.cache.get(&credentials.cache_key).await {
            metrics::counter!("powerbi_token_cache_total", "result" => "hit").increment(1);
            debug!(cache_key = %credentials.cache_key, "Access token cache hit");
            return Ok(token);
        }

        metrics::counter!("powerbi_token_cache_total", "result" => "miss").increment(1);
        let (token, expires_in) = self.fetch_access_token(credentials).await?;
        let ttl = effective_ttl(self.config.token_ttl, expires_in);
        self.cache
            .insert(&credentials.cache_key, token.clone(), ttl)
            .await;

        debug!(cache_key = %credentials.cache_key, ttl_secs = ttl.as_secs(), "Cached access token");
        Ok(token)
    }

    /// Sends `method path` to the API as-is and returns whatever came back.
    ///
    /// The body is only sent for non-GET requests.
    #[instrument(skip(self, access_token, body))]
    pub async fn request(
        &self,
        access_token: &str,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<UpstreamResponse, PowerBiError> {
        let mut request = self
            .http
            .request(method.clone(), self.config.api_endpoint(path))
            .bearer_auth(access_token);

        if method != Method::GET
            && let Some(body) = body
        {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        let body = serde_json::from_str(&text).unwrap_or_else(|_| json!({}));

        Ok(UpstreamResponse { status, body })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        access_token: &str,
        path: &str,
    ) -> Result<T, PowerBiError> {
        let response = self
            .http
            .get(self.config.api_endpoint(path))
            .bearer_auth(access_token)
            .send()
            .await?;

        Self::read_json(response).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        access_token: &str,
        path: &str,
        body: &B,
    ) -> Result<T, PowerBiError> {
        let response = self
            .http
            .post(self.config.api_endpoint(path))
            .bearer_auth(access_token)
            .json(body)
            .send()
            .await?;

        Self::read_json(response).await
    }

    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, PowerBiError> {
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(PowerBiError::Upstream {
                status: status.as_u16(),
                body: text,
            });
        }

        serde_json::from_str(&text).map_err(|e| PowerBiError::InvalidResponse(e.to_string()))
    }

    #[instrument(skip(self, access_token))]
    pub async fn list_workspaces(&self, access_token: &str) -> Result<Vec<Workspace>, PowerBiError> {
        let list: ODataList<Workspace> = self.get_json(access_token, "v1.0/myorg/groups").await?;
        Ok(list.value)
    }

    #[instrument(skip(self, access_token))]
    pub async fn list_reports(
        &self,
        access_token: &str,
        workspace_id: &str,
    ) -> Result<Vec<Report>, PowerBiError> {
        let path = format!("v1.0/myorg/groups/{}/reports", segment(workspace_id)?);
        let list: ODataList<Report> = self.get_json(access_token, &path).await?;
        Ok(list.value)
    }

    #[instrument(skip(self, access_token))]
    pub async fn get_report(
        &self,
        access_token: &str,
        workspace_id: &str,
        report_id: &str,
    ) -> Result<Report, PowerBiError> {
        let path = format!(
            "v1.0/myorg/groups/{}/reports/{}",
            segment(workspace_id)?,
            segment(report_id)?
        );
        self.get_json(access_token, &path).await
    }

    /// Every report in every workspace, tagged with its workspace id and name.
    ///
    /// Workspaces are read one after another; the first failure aborts.
    #[instrument(skip(self, access_token))]
    pub async fn list_all_reports(&self, access_token: &str) -> Result<Vec<Report>, PowerBiError> {
        let mut all = Vec::new();
        for workspace in self.list_workspaces(access_token).await? {
            let reports = self.list_reports(access_token, &workspace.id).await?;
            all.extend(reports.into_iter().map(|r| r.tagged_with(&workspace)));
        }
        Ok(all)
    }

    /// Report pages sorted by their `order`.
    #[instrument(skip(self, access_token))]
    pub async fn list_pages(
        &self,
        access_token: &str,
        workspace_id: &str,
        report_id: &str,
    ) -> Result<Vec<ReportPage>, PowerBiError> {
        let path = format!(
            "v1.0/myorg/groups/{}/reports/{}/pages",
            segment(workspace_id)?,
            segment(report_id)?
        );
        let list: ODataList<ReportPage> = self.get_json(access_token, &path).await?;
        let mut pages = list.value;
        pages.sort_by_key(|page| page.order);
        Ok(pages)
    }

    #[instrument(skip(self, access_token, request))]
    pub async fn generate_token(
        &self,
        access_token: &str,
        workspace_id: &str,
        report_id: &str,
        request: &GenerateTokenRequest,
    ) -> Result<EmbedToken, PowerBiError> {
        let path = format!(
            "v1.0/myorg/groups/{}/reports/{}/GenerateToken",
            segment(workspace_id)?,
            segment(report_id)?
        );
        self.post_json(access_token, &path, request).await
    }
}

/// Rejects ids that would change the shape of the request path.
fn segment(id: &str) -> Result<&str, PowerBiError> {
    if !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        Ok(id)
    } else {
        Err(PowerBiError::InvalidIdentifier(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_accepts_guids() {
        assert!(segment("f089354e-8366-4e18-aea3-4cb4a3a50b48").is_ok());
    }

    #[test]
    fn test_segment_rejects_path_tricks() {
        for bad in ["", "../admin", "a/b", "a?b=c", "a%2Fb", "a b"] {
            assert!(segment(bad).is_err(), "{:?} should be rejected", bad);
        }
    }
}
