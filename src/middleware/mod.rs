//! Request extractors and layers for authentication and authorization.
//!
//! - [`auth`]: the [`auth::AuthUser`] extractor and per-permission extractors
//!   generated by `require_permission!`
//! - [`role`]: role gates for whole route trees
//!
//! ```ignore
//! use crate::middleware::auth::RequireDashboardsManage;
//!
//! async fn upsert_setting(
//!     State(state): State<AppState>,
//!     RequireDashboardsManage(auth_user): RequireDashboardsManage,
//!     ValidatedJson(dto): ValidatedJson<UpsertDashboardSettingDto>,
//! ) -> Result<Json<DashboardSetting>, AppError> {
//!     // Only reached with the "dashboards:manage" permission
//! }
//! ```

pub mod auth;
pub mod role;
