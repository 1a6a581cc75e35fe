use std::collections::HashMap;

use sqlx::PgPool;
use tracing::{debug, info, instrument, warn};

use dashgate_core::AppError;
use dashgate_models::dashboards::dedup_user_ids;
use dashgate_models::{
    AppRole, DashboardSetting, DashboardUserSetting, UpsertDashboardSettingDto,
    UpsertDashboardUserSettingDto, UserId, is_listed_for,
};

use crate::modules::organizations::OrganizationService;
use crate::modules::users::UserService;

const SETTING_COLUMNS: &str = "id, dashboard_id, is_visible, assigned_users, organization_id, \
                               rls_role, created_at, updated_at";

const USER_SETTING_COLUMNS: &str = "id, dashboard_id, user_id, rls_role, created_at, updated_at";

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub struct DashboardService;

impl DashboardService {
    #[instrument(skip(db))]
    pub async fn list_settings(db: &PgPool) -> Result<Vec<DashboardSetting>, AppError> {
        let settings = sqlx::query_as::<_, DashboardSetting>(&format!(
            "SELECT {} FROM powerbi_dashboard_settings ORDER BY dashboard_id",
            SETTING_COLUMNS
        ))
        .fetch_all(db)
        .await?;
        Ok(settings)
    }

    #[instrument(skip(db))]
    pub async fn find_setting(
        db: &PgPool,
        dashboard_id: &str,
    ) -> Result<Option<DashboardSetting>, AppError> {
        let setting = sqlx::query_as::<_, DashboardSetting>(&format!(
            "SELECT {} FROM powerbi_dashboard_settings WHERE dashboard_id = $1",
            SETTING_COLUMNS
        ))
        .bind(dashboard_id)
        .fetch_optional(db)
        .await?;
        Ok(setting)
    }

    pub async fn get_setting(db: &PgPool, dashboard_id: &str) -> Result<DashboardSetting, AppError> {
        Self::find_setting(db, dashboard_id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Dashboard setting not found")))
    }

    /// Fails with 403 unless the dashboard is listed for this user.
    pub async fn ensure_listed(
        db: &PgPool,
        dashboard_id: &str,
        user_id: UserId,
        role: AppRole,
    ) -> Result<(), AppError> {
        let setting = Self::find_setting(db, dashboard_id).await?;
        if is_listed_for(setting.as_ref(), user_id, role) {
            Ok(())
        } else {
            warn!(user.id = %user_id, dashboard_id, "Dashboard access denied");
            Err(AppError::forbidden("You do not have access to this dashboard"))
        }
    }

    /// Settings for the given dashboards, keyed by dashboard id. Dashboards
    /// without a row are absent.
    #[instrument(skip(db, dashboard_ids), fields(count = dashboard_ids.len()))]
    pub async fn settings_for(
        db: &PgPool,
        dashboard_ids: &[String],
    ) -> Result<HashMap<String, DashboardSetting>, AppError> {
        if dashboard_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let settings = sqlx::query_as::<_, DashboardSetting>(&format!(
            "SELECT {} FROM powerbi_dashboard_settings WHERE dashboard_id = ANY($1)",
            SETTING_COLUMNS
        ))
        .bind(dashboard_ids)
        .fetch_all(db)
        .await?;

        Ok(settings
            .into_iter()
            .map(|s| (s.dashboard_id.clone(), s))
            .collect())
    }

    /// Inserts or replaces the setting for `dto.dashboard_id`.
    ///
    /// Assigned users are de-duplicated and must exist. When the setting is
    /// bound to an organization they must also be members of it.
    #[instrument(skip(db, dto), fields(dashboard_id = %dto.dashboard_id))]
    pub async fn upsert_setting(
        db: &PgPool,
        dto: UpsertDashboardSettingDto,
    ) -> Result<DashboardSetting, AppError> {
        let dashboard_id = dto.dashboard_id.trim().to_string();
        let assigned_users = dedup_user_ids(&dto.assigned_users);

        let existing = UserService::existing_ids(db, &assigned_users).await?;
        let unknown: Vec<String> = assigned_users
            .iter()
            .filter(|id| !existing.contains(id))
            .map(ToString::to_string)
            .collect();
        if !unknown.is_empty() {
            return Err(AppError::bad_request(anyhow::anyhow!(
                "Unknown users: {}",
                unknown.join(", ")
            )));
        }

        if let Some(organization_id) = dto.organization_id {
            OrganizationService::get(db, organization_id).await?;
            let outsiders =
                OrganizationService::non_members(db, organization_id, &assigned_users).await?;
            if !outsiders.is_empty() {
                return Err(AppError::bad_request(anyhow::anyhow!(
                    "Users are not members of the organization: {}",
                    outsiders
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join(", ")
                )));
            }
        }

        let setting = sqlx::query_as::<_, DashboardSetting>(&format!(
            "INSERT INTO powerbi_dashboard_settings
                (dashboard_id, is_visible, assigned_users, organization_id, rls_role)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (dashboard_id) DO UPDATE SET
                is_visible = EXCLUDED.is_visible,
                assigned_users = EXCLUDED.assigned_users,
                organization_id = EXCLUDED.organization_id,
                rls_role = EXCLUDED.rls_role,
                updated_at = NOW()
             RETURNING {}",
            SETTING_COLUMNS
        ))
        .bind(&dashboard_id)
        .bind(dto.is_visible)
        .bind(&assigned_users)
        .bind(dto.organization_id)
        .bind(blank_to_none(dto.rls_role))
        .fetch_one(db)
        .await?;

        info!(
            dashboard_id = %setting.dashboard_id,
            is_visible = setting.is_visible,
            assigned = setting.assigned_users.len(),
            "Dashboard setting saved"
        );
        Ok(setting)
    }

    #[instrument(skip(db))]
    pub async fn delete_setting(db: &PgPool, dashboard_id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM powerbi_dashboard_settings WHERE dashboard_id = $1")
            .bind(dashboard_id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!(
                "Dashboard setting not found"
            )));
        }

        info!(dashboard_id, "Dashboard setting deleted");
        Ok(())
    }

    #[instrument(skip(db))]
    pub async fn find_user_setting(
        db: &PgPool,
        dashboard_id: &str,
        user_id: UserId,
    ) -> Result<Option<DashboardUserSetting>, AppError> {
        let setting = sqlx::query_as::<_, DashboardUserSetting>(&format!(
            "SELECT {} FROM powerbi_dashboard_user_settings
             WHERE dashboard_id = $1 AND user_id = $2",
            USER_SETTING_COLUMNS
        ))
        .bind(dashboard_id)
        .bind(user_id)
        .fetch_optional(db)
        .await?;
        Ok(setting)
    }

    #[instrument(skip(db, dto))]
    pub async fn upsert_user_setting(
        db: &PgPool,
        dashboard_id: &str,
        user_id: UserId,
        dto: UpsertDashboardUserSettingDto,
    ) -> Result<DashboardUserSetting, AppError> {
        let rls_role = blank_to_none(dto.rls_role);
        debug!(rls_role = ?rls_role, "Saving per-user dashboard setting");

        let setting = sqlx::query_as::<_, DashboardUserSetting>(&format!(
            "INSERT INTO powerbi_dashboard_user_settings (dashboard_id, user_id, rls_role)
             VALUES ($1, $2, $3)
             ON CONFLICT (dashboard_id, user_id) DO UPDATE SET
                rls_role = EXCLUDED.rls_role,
                updated_at = NOW()
             RETURNING {}",
            USER_SETTING_COLUMNS
        ))
        .bind(dashboard_id)
        .bind(user_id)
        .bind(rls_role)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_foreign_key_violation()
            {
                return AppError::not_found(anyhow::anyhow!("User not found"));
            }
            AppError::from(e)
        })?;

        Ok(setting)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_to_none() {
        assert_eq!(blank_to_none(None), None);
        assert_eq!(blank_to_none(Some("   ".to_string())), None);
        assert_eq!(blank_to_none(Some(" Store ".to_string())), Some("Store".to_string()));
    }
}
