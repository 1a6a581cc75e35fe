//! # Dashgate Models
//!
//! Domain models, DTOs and the pure access rules of the Dashgate API.
//!
//! - [`users`], [`roles`], [`auth`]: identities, the three application roles and login DTOs
//! - [`organizations`]: tenants and membership
//! - [`powerbi_clients`]: stored Power BI credentials (secrets are write-only)
//! - [`dashboards`]: per-report settings and [`dashboards::is_listed_for`]
//! - [`page_permissions`]: per-page restrictions and [`page_permissions::check_navigation`]
//! - [`tv`]: TV presentation playlists
//!
//! The access rules are plain functions over already-loaded rows so they can
//! be tested without a database.

pub mod auth;
pub mod dashboards;
pub mod ids;
pub mod organizations;
pub mod page_permissions;
pub mod powerbi_clients;
pub mod roles;
pub mod tv;
pub mod users;
pub mod value_types;

pub use auth::{
    Claims, LoginRequest, LoginResponse, MessageResponse, RefreshTokenRequest, TokenPairResponse,
};
pub use dashboards::{
    DashboardSetting, DashboardUserSetting, UpsertDashboardSettingDto,
    UpsertDashboardUserSettingDto, is_listed_for, resolve_rls_role,
};
pub use ids::*;
pub use organizations::{
    AddMemberDto, CreateOrganizationDto, Organization, OrganizationMember,
    OrganizationMemberWithProfile, UpdateOrganizationDto, UserOrganization,
};
pub use page_permissions::{
    NavigationCheckRequest, NavigationDecision, PageAccess, PageAccessResponse, PagePermission,
    ReplacePageUsersDto, check_navigation, filter_pages,
};
pub use powerbi_clients::{
    CreatePowerBiClientDto, PowerBiClient, PowerBiClientResponse, UpdatePowerBiClientDto,
};
pub use roles::{AppRole, OrganizationRole};
pub use tv::{
    CreateTvPresentationDto, ReplaceSlidesDto, TvPresentation, TvPresentationFilterParams,
    TvPresentationWithSlides, TvSlide, TvSlideInput, UpdateTvPresentationDto,
};
pub use users::{
    ChangePasswordDto, CreateUserDto, PaginatedUsersResponse, SetRoleDto, UpdateProfileDto,
    UpdateUserDto, User, UserCredentials, UserFilterParams,
};
pub use value_types::Email;
