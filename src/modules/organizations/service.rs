use sqlx::PgPool;
use tracing::{error, info, instrument, warn};

use dashgate_core::AppError;
use dashgate_models::{
    AddMemberDto, CreateOrganizationDto, Organization, OrganizationId, OrganizationMember,
    OrganizationMemberWithProfile, OrganizationRole, UpdateOrganizationDto, UserId,
    UserOrganization,
};

const ORGANIZATION_COLUMNS: &str =
    "id, name, owner_id, logo_url, primary_color, created_at, updated_at";

pub struct OrganizationService;

impl OrganizationService {
    #[instrument(skip(db))]
    pub async fn list(db: &PgPool) -> Result<Vec<Organization>, AppError> {
        let organizations = sqlx::query_as::<_, Organization>(&format!(
            "SELECT {} FROM organizations ORDER BY name",
            ORGANIZATION_COLUMNS
        ))
        .fetch_all(db)
        .await?;
        Ok(organizations)
    }

    #[instrument(skip(db))]
    pub async fn get(db: &PgPool, id: OrganizationId) -> Result<Organization, AppError> {
        sqlx::query_as::<_, Organization>(&format!(
            "SELECT {} FROM organizations WHERE id = $1",
            ORGANIZATION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Organization not found")))
    }

    /// Creates the organization and makes `owner` its first admin member.
    #[instrument(skip(db, dto), fields(organization.name = %dto.name))]
    pub async fn create(
        db: &PgPool,
        owner: UserId,
        dto: CreateOrganizationDto,
    ) -> Result<Organization, AppError> {
        let mut tx = db.begin().await?;

        let organization = sqlx::query_as::<_, Organization>(&format!(
            "INSERT INTO organizations (name, owner_id, logo_url, primary_color)
             VALUES ($1, $2, $3, $4)
             RETURNING {}",
            ORGANIZATION_COLUMNS
        ))
        .bind(dto.name.trim())
        .bind(owner)
        .bind(&dto.logo_url)
        .bind(&dto.primary_color)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO organization_members (organization_id, user_id, role) VALUES ($1, $2, $3)",
        )
        .bind(organization.id)
        .bind(owner)
        .bind(OrganizationRole::Admin)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(organization.id = %organization.id, "Organization created");
        Ok(organization)
    }

    #[instrument(skip(db, dto))]
    pub async fn update(
        db: &PgPool,
        id: OrganizationId,
        dto: UpdateOrganizationDto,
    ) -> Result<Organization, AppError> {
        sqlx::query_as::<_, Organization>(&format!(
            "UPDATE organizations SET
                name = COALESCE($2, name),
                logo_url = COALESCE($3, logo_url),
                primary_color = COALESCE($4, primary_color),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {}",
            ORGANIZATION_COLUMNS
        ))
        .bind(id)
        .bind(dto.name.as_deref().map(str::trim))
        .bind(&dto.logo_url)
        .bind(&dto.primary_color)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Organization not found")))
    }

    #[instrument(skip(db))]
    pub async fn delete(db: &PgPool, id: OrganizationId) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM organizations WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Organization not found")));
        }

        info!(organization.id = %id, "Organization deleted");
        Ok(())
    }

    #[instrument(skip(db))]
    pub async fn list_members(
        db: &PgPool,
        organization_id: OrganizationId,
    ) -> Result<Vec<OrganizationMemberWithProfile>, AppError> {
        Self::get(db, organization_id).await?;

        let members = sqlx::query_as::<_, OrganizationMemberWithProfile>(
            r#"
            SELECT m.id, m.organization_id, m.user_id, m.role, u.email,
                   p.first_name, p.last_name, m.created_at
            FROM organization_members m
            JOIN users u ON u.id = m.user_id
            LEFT JOIN profiles p ON p.id = m.user_id
            WHERE m.organization_id = $1
            ORDER BY m.created_at
            "#,
        )
        .bind(organization_id)
        .fetch_all(db)
        .await?;

        Ok(members)
    }

    #[instrument(skip(db, dto), fields(member.user_id = %dto.user_id))]
    pub async fn add_member(
        db: &PgPool,
        organization_id: OrganizationId,
        dto: AddMemberDto,
    ) -> Result<OrganizationMember, AppError> {
        Self::get(db, organization_id).await?;

        let member = sqlx::query_as::<_, OrganizationMember>(
            "INSERT INTO organization_members (organization_id, user_id, role)
             VALUES ($1, $2, $3)
             RETURNING id, organization_id, user_id, role, created_at",
        )
        .bind(organization_id)
        .bind(dto.user_id)
        .bind(dto.role)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    warn!("User is already a member of the organization");
                    return AppError::bad_request(anyhow::anyhow!(
                        "User is already a member of this organization"
                    ));
                }
                if db_err.is_foreign_key_violation() {
                    return AppError::not_found(anyhow::anyhow!("User not found"));
                }
            }
            error!(error = %e, "Database error adding organization member");
            AppError::from(e)
        })?;

        info!(organization.id = %organization_id, member.id = %member.id, "Member added");
        Ok(member)
    }

    #[instrument(skip(db))]
    pub async fn remove_member(
        db: &PgPool,
        organization_id: OrganizationId,
        user_id: UserId,
    ) -> Result<(), AppError> {
        let result = sqlx::query(
            "DELETE FROM organization_members WHERE organization_id = $1 AND user_id = $2",
        )
        .bind(organization_id)
        .bind(user_id)
        .execute(db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Membership not found")));
        }

        Ok(())
    }

    #[instrument(skip(db))]
    pub async fn user_organizations(
        db: &PgPool,
        user_id: UserId,
    ) -> Result<Vec<UserOrganization>, AppError> {
        let organizations = sqlx::query_as::<_, UserOrganization>(
            r#"
            SELECT o.id, o.name, o.logo_url, o.primary_color, m.role
            FROM organization_members m
            JOIN organizations o ON o.id = m.organization_id
            WHERE m.user_id = $1
            ORDER BY o.name
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;

        Ok(organizations)
    }

    /// Ids from `user_ids` that are not members of `organization_id`.
    #[instrument(skip(db, user_ids), fields(count = user_ids.len()))]
    pub async fn non_members(
        db: &PgPool,
        organization_id: OrganizationId,
        user_ids: &[UserId],
    ) -> Result<Vec<UserId>, AppError> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        let members = sqlx::query_scalar::<_, UserId>(
            "SELECT user_id FROM organization_members
             WHERE organization_id = $1 AND user_id = ANY($2)",
        )
        .bind(organization_id)
        .bind(user_ids)
        .fetch_all(db)
        .await?;

        Ok(user_ids
            .iter()
            .copied()
            .filter(|id| !members.contains(id))
            .collect())
    }
}
