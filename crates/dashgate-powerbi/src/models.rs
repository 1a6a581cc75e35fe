//! Power BI REST payloads. Field names follow the service's camelCase.

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// `{ "value": [...] }` list envelope. A missing `value` reads as empty.
#[derive(Debug, Clone, Deserialize)]
pub struct ODataList<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub is_read_only: bool,
    #[serde(default)]
    pub is_on_dedicated_capacity: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub embed_url: String,
    #[serde(default)]
    pub web_url: String,
    /// Needed to attach an RLS identity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_name: Option<String>,
}

impl Report {
    pub fn tagged_with(mut self, workspace: &Workspace) -> Self {
        self.workspace_id = Some(workspace.id.clone());
        self.workspace_name = Some(workspace.name.clone());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportPage {
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub order: i64,
}

/// Row-level-security identity attached to an embed token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct EffectiveIdentity {
    pub username: String,
    pub roles: Vec<String>,
    pub datasets: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateTokenRequest {
    pub access_level: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identities: Option<Vec<EffectiveIdentity>>,
}

impl GenerateTokenRequest {
    pub fn view(identity: Option<EffectiveIdentity>) -> Self {
        Self {
            access_level: "View".to_string(),
            identities: identity.map(|i| vec![i]),
        }
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmbedToken {
    pub token: String,
    #[serde(default)]
    pub token_id: String,
    #[serde(default)]
    pub expiration: String,
}

impl fmt::Debug for EmbedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbedToken")
            .field("token_id", &self.token_id)
            .field("expiration", &self.expiration)
            .finish_non_exhaustive()
    }
}

/// Entra ID token endpoint response.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: Option<String>,
    pub expires_in: Option<u64>,
}

/// Tenant credentials for the client-credentials grant.
#[derive(Clone)]
pub struct PowerBiCredentials {
    /// Token cache key: the stored client's id, or `default`
    pub cache_key: String,
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
}

impl PowerBiCredentials {
    pub fn is_complete(&self) -> bool {
        !self.tenant_id.trim().is_empty()
            && !self.client_id.trim().is_empty()
            && !self.client_secret.trim().is_empty()
    }
}

impl fmt::Debug for PowerBiCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PowerBiCredentials")
            .field("cache_key", &self.cache_key)
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}
