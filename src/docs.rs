use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use dashgate_core::PaginationMeta;
use dashgate_models::{
    AddMemberDto, AppRole, ChangePasswordDto, CreateOrganizationDto, CreatePowerBiClientDto,
    CreateTvPresentationDto, CreateUserDto, DashboardSetting, DashboardUserSetting, LoginRequest,
    LoginResponse, MessageResponse, NavigationCheckRequest, NavigationDecision, Organization,
    OrganizationMember, OrganizationMemberWithProfile, OrganizationRole, PageAccess,
    PageAccessResponse, PagePermission, PaginatedUsersResponse, PowerBiClientResponse,
    RefreshTokenRequest, ReplacePageUsersDto, ReplaceSlidesDto, SetRoleDto, TokenPairResponse,
    TvPresentation, TvPresentationWithSlides, TvSlide, TvSlideInput, UpdateOrganizationDto,
    UpdatePowerBiClientDto, UpdateProfileDto, UpdateTvPresentationDto, UpdateUserDto,
    UpsertDashboardSettingDto, UpsertDashboardUserSettingDto, User, UserOrganization,
};
use dashgate_powerbi::{EmbedToken, Report, ReportPage, Workspace};

use crate::modules::auth::controller::{ErrorResponse, SessionResponse};
use crate::modules::navigation::service::{MenuItem, NavigationMenu};
use crate::modules::reports::service::EmbedResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::router::health,
        crate::modules::auth::controller::login_user,
        crate::modules::auth::controller::refresh_token,
        crate::modules::auth::controller::get_session,
        crate::modules::users::controller::get_users,
        crate::modules::users::controller::create_user,
        crate::modules::users::controller::get_user,
        crate::modules::users::controller::update_user,
        crate::modules::users::controller::set_user_role,
        crate::modules::users::controller::delete_user,
        crate::modules::users::controller::get_user_organizations,
        crate::modules::users::controller::get_me,
        crate::modules::users::controller::update_me,
        crate::modules::users::controller::change_password,
        crate::modules::users::controller::get_my_organizations,
        crate::modules::organizations::controller::list_organizations,
        crate::modules::organizations::controller::create_organization,
        crate::modules::organizations::controller::get_organization,
        crate::modules::organizations::controller::update_organization,
        crate::modules::organizations::controller::delete_organization,
        crate::modules::organizations::controller::list_members,
        crate::modules::organizations::controller::add_member,
        crate::modules::organizations::controller::remove_member,
        crate::modules::powerbi_clients::controller::list_clients,
        crate::modules::powerbi_clients::controller::create_client,
        crate::modules::powerbi_clients::controller::get_client,
        crate::modules::powerbi_clients::controller::update_client,
        crate::modules::powerbi_clients::controller::delete_client,
        crate::modules::proxy::controller::proxy,
        crate::modules::dashboards::controller::list_settings,
        crate::modules::dashboards::controller::upsert_setting,
        crate::modules::dashboards::controller::get_setting,
        crate::modules::dashboards::controller::delete_setting,
        crate::modules::dashboards::controller::get_user_setting,
        crate::modules::dashboards::controller::upsert_user_setting,
        crate::modules::page_permissions::controller::list_page_permissions,
        crate::modules::page_permissions::controller::replace_page_users,
        crate::modules::page_permissions::controller::clear_user_page_permissions,
        crate::modules::page_permissions::controller::get_allowed_pages,
        crate::modules::page_permissions::controller::check_navigation,
        crate::modules::reports::controller::list_workspaces,
        crate::modules::reports::controller::list_reports,
        crate::modules::reports::controller::list_all_reports,
        crate::modules::reports::controller::list_my_reports,
        crate::modules::reports::controller::list_pages,
        crate::modules::reports::controller::embed_report,
        crate::modules::navigation::controller::get_navigation,
        crate::modules::tv::controller::list_presentations,
        crate::modules::tv::controller::create_presentation,
        crate::modules::tv::controller::get_presentation,
        crate::modules::tv::controller::update_presentation,
        crate::modules::tv::controller::delete_presentation,
        crate::modules::tv::controller::replace_slides,
    ),
    components(
        schemas(
            ErrorResponse,
            MessageResponse,
            LoginRequest,
            LoginResponse,
            RefreshTokenRequest,
            TokenPairResponse,
            SessionResponse,
            AppRole,
            OrganizationRole,
            User,
            CreateUserDto,
            UpdateUserDto,
            UpdateProfileDto,
            SetRoleDto,
            ChangePasswordDto,
            PaginatedUsersResponse,
            PaginationMeta,
            Organization,
            CreateOrganizationDto,
            UpdateOrganizationDto,
            OrganizationMember,
            OrganizationMemberWithProfile,
            AddMemberDto,
            UserOrganization,
            PowerBiClientResponse,
            CreatePowerBiClientDto,
            UpdatePowerBiClientDto,
            DashboardSetting,
            UpsertDashboardSettingDto,
            DashboardUserSetting,
            UpsertDashboardUserSettingDto,
            PagePermission,
            PageAccess,
            PageAccessResponse,
            ReplacePageUsersDto,
            NavigationCheckRequest,
            NavigationDecision,
            Workspace,
            Report,
            ReportPage,
            EmbedToken,
            EmbedResponse,
            MenuItem,
            NavigationMenu,
            TvPresentation,
            TvPresentationWithSlides,
            TvSlide,
            TvSlideInput,
            CreateTvPresentationDto,
            UpdateTvPresentationDto,
            ReplaceSlidesDto,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness"),
        (name = "Authentication", description = "Login, token refresh and session"),
        (name = "Users", description = "User management and self-service profile"),
        (name = "Organizations", description = "Tenants and their members"),
        (name = "Power BI Clients", description = "Stored Power BI tenant credentials"),
        (name = "Power BI Proxy", description = "Raw Power BI REST passthrough"),
        (name = "Dashboards", description = "Per-report visibility, assignment and RLS settings"),
        (name = "Page Permissions", description = "Per-page restrictions inside a dashboard"),
        (name = "Reports", description = "Workspaces, reports, pages and embed tokens"),
        (name = "Navigation", description = "Role-gated menu"),
        (name = "TV", description = "TV presentation playlists")
    ),
    info(
        title = "Dashgate API",
        version = "0.1.0",
        description = "Business-intelligence portal backend: Power BI embedding with per-user dashboard and page access.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
