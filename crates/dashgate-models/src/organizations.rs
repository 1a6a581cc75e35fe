//! Organizations (tenants) and their membership.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::ids::{OrganizationId, OrganizationMemberId, UserId};
use crate::roles::OrganizationRole;
use crate::value_types::Email;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Organization {
    pub id: OrganizationId,
    pub name: String,
    pub owner_id: UserId,
    pub logo_url: Option<String>,
    /// Brand color as `#rrggbb`
    pub primary_color: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateOrganizationDto {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(url)]
    pub logo_url: Option<String>,
    #[validate(custom(function = "validate_hex_color"))]
    pub primary_color: Option<String>,
}

/// Fields left out are unchanged. `logo_url` and `primary_color` cannot be
/// cleared once set, only replaced.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateOrganizationDto {
    #[validate(length(min = 1, max = 120))]
    pub name: Option<String>,
    #[validate(url)]
    pub logo_url: Option<String>,
    #[validate(custom(function = "validate_hex_color"))]
    pub primary_color: Option<String>,
}

fn validate_hex_color(color: &str) -> Result<(), ValidationError> {
    let hex = color.strip_prefix('#').unwrap_or("");
    if hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
        Ok(())
    } else {
        Err(ValidationError::new("hex_color").with_message("Expected a color like #1a2b3c".into()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct OrganizationMember {
    pub id: OrganizationMemberId,
    pub organization_id: OrganizationId,
    pub user_id: UserId,
    pub role: OrganizationRole,
    pub created_at: DateTime<Utc>,
}

/// A membership row joined with the member's profile.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct OrganizationMemberWithProfile {
    pub id: OrganizationMemberId,
    pub organization_id: OrganizationId,
    pub user_id: UserId,
    pub role: OrganizationRole,
    pub email: Email,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AddMemberDto {
    pub user_id: UserId,
    /// Defaults to `member`
    #[serde(default)]
    pub role: OrganizationRole,
}

/// An organization the caller belongs to, with their role in it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct UserOrganization {
    pub id: OrganizationId,
    pub name: String,
    pub logo_url: Option<String>,
    pub primary_color: Option<String>,
    pub role: OrganizationRole,
}
