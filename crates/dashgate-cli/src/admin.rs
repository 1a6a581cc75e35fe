use anyhow::{Context, Result, bail};
use sqlx::PgPool;
use uuid::Uuid;

use dashgate_core::hash_password;
use dashgate_models::{AppRole, Email};

/// Creates a user with the `admin_master` role.
///
/// Fails when the email is already registered.
pub async fn create_admin_master(
    db: &PgPool,
    first_name: &str,
    last_name: &str,
    email: &str,
    password: &str,
) -> Result<Uuid> {
    let email = Email::new(email).context("Invalid email address")?;
    if password.len() < 8 {
        bail!("Password must be at least 8 characters");
    }

    let password_hash =
        hash_password(password).map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e.error))?;

    let mut tx = db.begin().await?;

    let user_id = sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO users (email, password_hash)
         VALUES ($1, $2)
         ON CONFLICT (email) DO NOTHING
         RETURNING id",
    )
    .bind(email.as_str())
    .bind(&password_hash)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(user_id) = user_id else {
        tx.rollback().await?;
        bail!("User with this email already exists");
    };

    sqlx::query("INSERT INTO profiles (id, first_name, last_name) VALUES ($1, $2, $3)")
        .bind(user_id)
        .bind(first_name)
        .bind(last_name)
        .execute(&mut *tx)
        .await?;

    sqlx::query("INSERT INTO user_roles (user_id, role) VALUES ($1, $2)")
        .bind(user_id)
        .bind(AppRole::AdminMaster)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(user_id)
}

/// Replaces the role of the user registered under `email`.
pub async fn set_role(db: &PgPool, email: &str, role: AppRole) -> Result<Uuid> {
    let email = Email::new(email).context("Invalid email address")?;

    let user_id = sqlx::query_scalar::<_, Uuid>("SELECT id FROM users WHERE email = $1")
        .bind(email.as_str())
        .fetch_optional(db)
        .await?
        .with_context(|| format!("No user registered as {}", email.as_str()))?;

    sqlx::query(
        "INSERT INTO user_roles (user_id, role) VALUES ($1, $2)
         ON CONFLICT (user_id) DO UPDATE SET role = EXCLUDED.role",
    )
    .bind(user_id)
    .bind(role)
    .execute(db)
    .await?;

    Ok(user_id)
}
