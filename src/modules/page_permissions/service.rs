use sqlx::PgPool;
use tracing::{debug, info, instrument};

use dashgate_core::AppError;
use dashgate_models::dashboards::dedup_user_ids;
use dashgate_models::{
    AppRole, NavigationCheckRequest, NavigationDecision, PageAccess, PagePermission, ReplacePageUsersDto,
    UserId, check_navigation,
};

use crate::metrics;
use crate::modules::dashboards::DashboardService;
use crate::modules::users::UserService;

const PERMISSION_COLUMNS: &str =
    "id, dashboard_id, page_name, page_display_name, user_id, created_at";

pub struct PagePermissionService;

impl PagePermissionService {
    #[instrument(skip(db))]
    pub async fn list_for_dashboard(
        db: &PgPool,
        dashboard_id: &str,
    ) -> Result<Vec<PagePermission>, AppError> {
        let rows = sqlx::query_as::<_, PagePermission>(&format!(
            "SELECT {} FROM powerbi_dashboard_page_permissions
             WHERE dashboard_id = $1
             ORDER BY page_name, created_at",
            PERMISSION_COLUMNS
        ))
        .bind(dashboard_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// The pages `user_id` may open in `dashboard_id`. No rows means every page.
    #[instrument(skip(db))]
    pub async fn allowed_pages(
        db: &PgPool,
        dashboard_id: &str,
        user_id: UserId,
    ) -> Result<PageAccess, AppError> {
        let pages: Vec<String> = sqlx::query_scalar(
            "SELECT page_name FROM powerbi_dashboard_page_permissions
             WHERE dashboard_id = $1 AND user_id = $2",
        )
        .bind(dashboard_id)
        .bind(user_id)
        .fetch_all(db)
        .await?;

        debug!(restricted_to = pages.len(), "Loaded page access");
        Ok(PageAccess::from_rows(pages))
    }

    /// Replaces the users allowed to see one page.
    ///
    /// Runs in a single transaction: on failure the page keeps its previous
    /// rows. An empty `user_ids` clears the page.
    #[instrument(skip(db, dto), fields(page_name = %dto.page_name))]
    pub async fn replace_page_users(
        db: &PgPool,
        dashboard_id: &str,
        dto: ReplacePageUsersDto,
    ) -> Result<Vec<PagePermission>, AppError> {
        let user_ids = dedup_user_ids(&dto.user_ids);

        let existing = UserService::existing_ids(db, &user_ids).await?;
        if let Some(unknown) = user_ids.iter().find(|id| !existing.contains(id)) {
            return Err(AppError::bad_request(anyhow::anyhow!(
                "Unknown user: {}",
                unknown
            )));
        }

        let page_display_name = dto
            .page_display_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());

        let mut tx = db.begin().await?;

        sqlx::query(
            "DELETE FROM powerbi_dashboard_page_permissions
             WHERE dashboard_id = $1 AND page_name = $2",
        )
        .bind(dashboard_id)
        .bind(&dto.page_name)
        .execute(&mut *tx)
        .await?;

        let mut rows = Vec::with_capacity(user_ids.len());
        for user_id in &user_ids {
            let row = sqlx::query_as::<_, PagePermission>(&format!(
                "INSERT INTO powerbi_dashboard_page_permissions
                    (dashboard_id, page_name, page_display_name, user_id)
                 VALUES ($1, $2, $3, $4)
                 RETURNING {}",
                PERMISSION_COLUMNS
            ))
            .bind(dashboard_id)
            .bind(&dto.page_name)
            .bind(&page_display_name)
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;
            rows.push(row);
        }

        tx.commit().await?;

        info!(
            dashboard_id,
            page_name = %dto.page_name,
            users = rows.len(),
            "Page permissions replaced"
        );
        Ok(rows)
    }

    /// Removes every restriction `user_id` has on `dashboard_id`.
    #[instrument(skip(db))]
    pub async fn clear_user(
        db: &PgPool,
        dashboard_id: &str,
        user_id: UserId,
    ) -> Result<u64, AppError> {
        let result = sqlx::query(
            "DELETE FROM powerbi_dashboard_page_permissions
             WHERE dashboard_id = $1 AND user_id = $2",
        )
        .bind(dashboard_id)
        .bind(user_id)
        .execute(db)
        .await?;

        info!(dashboard_id, user.id = %user_id, removed = result.rows_affected(), "Page restrictions cleared");
        Ok(result.rows_affected())
    }

    /// Decides a page switch. The dashboard itself must be listed for the user.
    #[instrument(skip(db, request), fields(target_page = %request.target_page))]
    pub async fn check_navigation(
        db: &PgPool,
        dashboard_id: &str,
        user_id: UserId,
        role: AppRole,
        request: &NavigationCheckRequest,
    ) -> Result<NavigationDecision, AppError> {
        DashboardService::ensure_listed(db, dashboard_id, user_id, role).await?;

        let access = Self::allowed_pages(db, dashboard_id, user_id).await?;
        let decision = check_navigation(
            &access,
            &request.target_page,
            request.current_page.as_deref(),
            request.report_pages.as_deref(),
        );

        let allowed = decision == NavigationDecision::Allow;
        metrics::track_navigation_check(allowed);
        if !allowed {
            debug!(?decision, "Navigation reverted");
        }
        Ok(decision)
    }
}
