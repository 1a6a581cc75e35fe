//! Stored Power BI tenant credentials.
//!
//! `client_secret` and the service-account `password` are write-only: the
//! row type has a redacting `Debug` and is never serialized; responses go
//! through [`PowerBiClientResponse`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use utoipa::ToSchema;
use validator::Validate;

use crate::ids::{OrganizationId, PowerBiClientId};

#[derive(Clone, FromRow)]
pub struct PowerBiClient {
    pub id: PowerBiClientId,
    pub name: String,
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
    pub email: String,
    pub password: String,
    pub organization_id: Option<OrganizationId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PowerBiClient {
    /// True when every field needed for the client-credentials grant is present.
    pub fn has_complete_credentials(&self) -> bool {
        [&self.tenant_id, &self.client_id, &self.client_secret]
            .iter()
            .all(|value| !value.trim().is_empty())
    }
}

impl fmt::Debug for PowerBiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PowerBiClient")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("organization_id", &self.organization_id)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PowerBiClientResponse {
    pub id: PowerBiClientId,
    pub name: String,
    pub tenant_id: String,
    pub client_id: String,
    pub email: String,
    pub organization_id: Option<OrganizationId>,
    pub has_client_secret: bool,
    pub has_password: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PowerBiClient> for PowerBiClientResponse {
    fn from(client: PowerBiClient) -> Self {
        Self {
            id: client.id,
            has_client_secret: !client.client_secret.is_empty(),
            has_password: !client.password.is_empty(),
            name: client.name,
            tenant_id: client.tenant_id,
            client_id: client.client_id,
            email: client.email,
            organization_id: client.organization_id,
            created_at: client.created_at,
            updated_at: client.updated_at,
        }
    }
}

#[derive(Clone, Deserialize, Validate, ToSchema)]
pub struct CreatePowerBiClientDto {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(length(min = 1))]
    pub tenant_id: String,
    #[validate(length(min = 1))]
    pub client_id: String,
    #[validate(length(min = 1))]
    pub client_secret: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub organization_id: Option<OrganizationId>,
}

/// Omitted fields are unchanged, so secrets can be kept by leaving them out.
#[derive(Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdatePowerBiClientDto {
    #[validate(length(min = 1, max = 120))]
    pub name: Option<String>,
    #[validate(length(min = 1))]
    pub tenant_id: Option<String>,
    #[validate(length(min = 1))]
    pub client_id: Option<String>,
    #[validate(length(min = 1))]
    pub client_secret: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub organization_id: Option<OrganizationId>,
}

// DTO Debug impls keep secrets out of `#[instrument]` spans.
impl fmt::Debug for CreatePowerBiClientDto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreatePowerBiClientDto")
            .field("name", &self.name)
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("organization_id", &self.organization_id)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for UpdatePowerBiClientDto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdatePowerBiClientDto")
            .field("name", &self.name)
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("organization_id", &self.organization_id)
            .finish_non_exhaustive()
    }
}
