use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{debug, error, info, instrument, warn};

use dashgate_core::{AppError, PaginationMeta, hash_password, verify_password};
use dashgate_models::{
    AppRole, ChangePasswordDto, CreateUserDto, PaginatedUsersResponse, UpdateUserDto, User,
    UserCredentials, UserFilterParams, UserId,
};

/// Users joined with their profile and role. Missing profile or role rows read
/// as an active `user`.
const USER_SELECT: &str = r#"
    SELECT u.id, u.email, p.first_name, p.last_name,
           COALESCE(p.is_active, true) AS is_active,
           COALESCE(r.role, 'user'::app_role) AS role,
           u.created_at,
           COALESCE(p.updated_at, u.created_at) AS updated_at
    FROM users u
    LEFT JOIN profiles p ON p.id = u.id
    LEFT JOIN user_roles r ON r.user_id = u.id
"#;

const CREDENTIALS_SELECT: &str = r#"
    SELECT u.id, u.email, u.password_hash,
           COALESCE(p.is_active, true) AS is_active,
           COALESCE(r.role, 'user'::app_role) AS role
    FROM users u
    LEFT JOIN profiles p ON p.id = u.id
    LEFT JOIN user_roles r ON r.user_id = u.id
"#;

pub struct UserService;

impl UserService {
    fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filters: &UserFilterParams) {
        builder.push(" WHERE 1=1");

        if let Some(search) = filters.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let pattern = format!("%{}%", search);
            builder
                .push(" AND (u.email ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR p.first_name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR p.last_name ILIKE ")
                .push_bind(pattern)
                .push(")");
        }

        if let Some(role) = filters.role {
            builder
                .push(" AND COALESCE(r.role, 'user'::app_role) = ")
                .push_bind(role);
        }

        if let Some(is_active) = filters.is_active {
            builder
                .push(" AND COALESCE(p.is_active, true) = ")
                .push_bind(is_active);
        }
    }

    #[instrument(skip(db, filters), fields(db.table = "users"))]
    pub async fn list_users(
        db: &PgPool,
        filters: UserFilterParams,
    ) -> Result<PaginatedUsersResponse, AppError> {
        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        let mut count = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM users u
             LEFT JOIN profiles p ON p.id = u.id
             LEFT JOIN user_roles r ON r.user_id = u.id",
        );
        Self::push_filters(&mut count, &filters);
        let total = count
            .build_query_scalar::<i64>()
            .fetch_one(db)
            .await
            .map_err(|e| {
                error!(error = %e, "Database error counting users");
                AppError::from(e)
            })?;

        let mut data = QueryBuilder::<Postgres>::new(USER_SELECT);
        Self::push_filters(&mut data, &filters);
        data.push(" ORDER BY u.created_at DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let users = data.build_query_as::<User>().fetch_all(db).await.map_err(|e| {
            error!(error = %e, "Database error fetching users");
            AppError::from(e)
        })?;

        debug!(total, returned = users.len(), "Fetched users");

        Ok(PaginatedUsersResponse {
            data: users,
            meta: PaginationMeta::from_params(total, &filters.pagination),
        })
    }

    #[instrument(skip(db))]
    pub async fn get_user(db: &PgPool, id: UserId) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(&format!("{} WHERE u.id = $1", USER_SELECT))
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("User not found")))
    }

    #[instrument(skip(db, email))]
    pub async fn find_credentials_by_email(
        db: &PgPool,
        email: &str,
    ) -> Result<Option<UserCredentials>, AppError> {
        let email = email.trim().to_lowercase();
        let credentials =
            sqlx::query_as::<_, UserCredentials>(&format!("{} WHERE u.email = $1", CREDENTIALS_SELECT))
                .bind(email)
                .fetch_optional(db)
                .await?;
        Ok(credentials)
    }

    #[instrument(skip(db))]
    pub async fn find_credentials_by_id(
        db: &PgPool,
        id: UserId,
    ) -> Result<Option<UserCredentials>, AppError> {
        let credentials =
            sqlx::query_as::<_, UserCredentials>(&format!("{} WHERE u.id = $1", CREDENTIALS_SELECT))
                .bind(id)
                .fetch_optional(db)
                .await?;
        Ok(credentials)
    }

    #[instrument(skip(db, dto), fields(user.email = %dto.email))]
    pub async fn create_user(db: &PgPool, dto: CreateUserDto) -> Result<User, AppError> {
        let password_hash = hash_password(&dto.password)?;
        let role = dto.role.unwrap_or_default();

        let mut tx = db.begin().await?;

        let id = sqlx::query_scalar::<_, UserId>(
            "INSERT INTO users (email, password_hash) VALUES ($1, $2) RETURNING id",
        )
        .bind(&dto.email)
        .bind(&password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_unique_violation()
            {
                warn!(user.email = %dto.email, "Attempted to create user with existing email");
                return AppError::bad_request(anyhow::anyhow!("Email already exists"));
            }
            error!(error = %e, "Database error creating user");
            AppError::from(e)
        })?;

        sqlx::query("INSERT INTO profiles (id, first_name, last_name) VALUES ($1, $2, $3)")
            .bind(id)
            .bind(&dto.first_name)
            .bind(&dto.last_name)
            .execute(&mut *tx)
            .await?;

        sqlx::query("INSERT INTO user_roles (user_id, role) VALUES ($1, $2)")
            .bind(id)
            .bind(role)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(user.id = %id, user.role = %role, "User created");
        Self::get_user(db, id).await
    }

    #[instrument(skip(db, dto))]
    pub async fn update_user(
        db: &PgPool,
        id: UserId,
        dto: UpdateUserDto,
    ) -> Result<User, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO profiles (id, first_name, last_name, is_active)
            SELECT u.id, $2, $3, COALESCE($4, true) FROM users u WHERE u.id = $1
            ON CONFLICT (id) DO UPDATE SET
                first_name = COALESCE($2, profiles.first_name),
                last_name = COALESCE($3, profiles.last_name),
                is_active = COALESCE($4, profiles.is_active),
                updated_at = NOW()
            "#,
        )
        .bind(id)
        .bind(&dto.first_name)
        .bind(&dto.last_name)
        .bind(dto.is_active)
        .execute(db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("User not found")));
        }

        Self::get_user(db, id).await
    }

    #[instrument(skip(db))]
    pub async fn set_role(db: &PgPool, id: UserId, role: AppRole) -> Result<User, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO user_roles (user_id, role)
            SELECT u.id, $2 FROM users u WHERE u.id = $1
            ON CONFLICT (user_id) DO UPDATE SET role = EXCLUDED.role
            "#,
        )
        .bind(id)
        .bind(role)
        .execute(db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("User not found")));
        }

        info!(user.id = %id, user.role = %role, "Role changed");
        Self::get_user(db, id).await
    }

    /// Deletes a user and, through cascades, their profile, role, memberships
    /// and page permissions.
    #[instrument(skip(db))]
    pub async fn delete_user(db: &PgPool, id: UserId, acting_user: UserId) -> Result<(), AppError> {
        if id == acting_user {
            return Err(AppError::bad_request(anyhow::anyhow!(
                "You cannot delete your own account"
            )));
        }

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("User not found")));
        }

        info!(user.id = %id, "User deleted");
        Ok(())
    }

    #[instrument(skip(db, dto))]
    pub async fn change_password(
        db: &PgPool,
        id: UserId,
        dto: ChangePasswordDto,
    ) -> Result<(), AppError> {
        let credentials = Self::find_credentials_by_id(db, id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("User not found")))?;

        if !verify_password(&dto.current_password, &credentials.password_hash)? {
            return Err(AppError::bad_request(anyhow::anyhow!(
                "Current password is incorrect"
            )));
        }

        let password_hash = hash_password(&dto.new_password)?;
        sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(db)
            .await?;

        info!(user.id = %id, "Password changed");
        Ok(())
    }

    /// Loads the users in `ids` that exist, in no particular order.
    #[instrument(skip(db, ids), fields(count = ids.len()))]
    pub async fn existing_ids(db: &PgPool, ids: &[UserId]) -> Result<Vec<UserId>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let found = sqlx::query_scalar::<_, UserId>("SELECT id FROM users WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(db)
            .await?;
        Ok(found)
    }
}
