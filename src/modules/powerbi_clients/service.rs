use sqlx::PgPool;
use tracing::{info, instrument, warn};

use dashgate_core::AppError;
use dashgate_models::{
    CreatePowerBiClientDto, PowerBiClient, PowerBiClientId, UpdatePowerBiClientDto,
};
use dashgate_powerbi::{DEFAULT_CACHE_KEY, PowerBiCredentials, TokenCache};

const CLIENT_COLUMNS: &str = "id, name, tenant_id, client_id, client_secret, email, password, \
                              organization_id, created_at, updated_at";

pub struct PowerBiClientService;

impl PowerBiClientService {
    #[instrument(skip(db))]
    pub async fn list(db: &PgPool) -> Result<Vec<PowerBiClient>, AppError> {
        let clients = sqlx::query_as::<_, PowerBiClient>(&format!(
            "SELECT {} FROM powerbi_clients ORDER BY created_at",
            CLIENT_COLUMNS
        ))
        .fetch_all(db)
        .await?;
        Ok(clients)
    }

    #[instrument(skip(db))]
    pub async fn get(db: &PgPool, id: PowerBiClientId) -> Result<PowerBiClient, AppError> {
        sqlx::query_as::<_, PowerBiClient>(&format!(
            "SELECT {} FROM powerbi_clients WHERE id = $1",
            CLIENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Power BI client not found")))
    }

    #[instrument(skip(db, dto), fields(client.name = %dto.name))]
    pub async fn create(
        db: &PgPool,
        dto: CreatePowerBiClientDto,
    ) -> Result<PowerBiClient, AppError> {
        let client = sqlx::query_as::<_, PowerBiClient>(&format!(
            "INSERT INTO powerbi_clients
                (name, tenant_id, client_id, client_secret, email, password, organization_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {}",
            CLIENT_COLUMNS
        ))
        .bind(dto.name.trim())
        .bind(dto.tenant_id.trim())
        .bind(dto.client_id.trim())
        .bind(&dto.client_secret)
        .bind(dto.email.trim())
        .bind(&dto.password)
        .bind(dto.organization_id)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_foreign_key_violation()
            {
                return AppError::not_found(anyhow::anyhow!("Organization not found"));
            }
            AppError::from(e)
        })?;

        info!(client.id = %client.id, "Power BI client created");
        Ok(client)
    }

    /// Updates the given fields and drops any cached access token minted with
    /// the old credentials.
    #[instrument(skip(db, cache, dto))]
    pub async fn update(
        db: &PgPool,
        cache: &TokenCache,
        id: PowerBiClientId,
        dto: UpdatePowerBiClientDto,
    ) -> Result<PowerBiClient, AppError> {
        let client = sqlx::query_as::<_, PowerBiClient>(&format!(
            "UPDATE powerbi_clients SET
                name = COALESCE($2, name),
                tenant_id = COALESCE($3, tenant_id),
                client_id = COALESCE($4, client_id),
                client_secret = COALESCE($5, client_secret),
                email = COALESCE($6, email),
                password = COALESCE($7, password),
                organization_id = COALESCE($8, organization_id),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {}",
            CLIENT_COLUMNS
        ))
        .bind(id)
        .bind(dto.name.as_deref().map(str::trim))
        .bind(dto.tenant_id.as_deref().map(str::trim))
        .bind(dto.client_id.as_deref().map(str::trim))
        .bind(&dto.client_secret)
        .bind(dto.email.as_deref().map(str::trim))
        .bind(&dto.password)
        .bind(dto.organization_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Power BI client not found")))?;

        Self::forget_tokens(cache, id).await;
        info!(client.id = %id, "Power BI client updated");
        Ok(client)
    }

    #[instrument(skip(db, cache))]
    pub async fn delete(
        db: &PgPool,
        cache: &TokenCache,
        id: PowerBiClientId,
    ) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM powerbi_clients WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Power BI client not found")));
        }

        Self::forget_tokens(cache, id).await;
        info!(client.id = %id, "Power BI client deleted");
        Ok(())
    }

    /// The oldest client may be behind the `default` key, so both entries go.
    async fn forget_tokens(cache: &TokenCache, id: PowerBiClientId) {
        cache.invalidate(&id.to_string()).await;
        cache.invalidate(DEFAULT_CACHE_KEY).await;
    }

    /// Loads the credentials to use for a Power BI call.
    ///
    /// With an id, that client; without one, the oldest stored client, cached
    /// under the `default` key.
    ///
    /// # Errors
    ///
    /// 404 when no client matches, 500 when tenant id, client id or secret is blank.
    #[instrument(skip(db))]
    pub async fn resolve_credentials(
        db: &PgPool,
        id: Option<PowerBiClientId>,
    ) -> Result<PowerBiCredentials, AppError> {
        let client = match id {
            Some(id) => sqlx::query_as::<_, PowerBiClient>(&format!(
                "SELECT {} FROM powerbi_clients WHERE id = $1",
                CLIENT_COLUMNS
            ))
            .bind(id)
            .fetch_optional(db)
            .await?,
            None => sqlx::query_as::<_, PowerBiClient>(&format!(
                "SELECT {} FROM powerbi_clients ORDER BY created_at, id LIMIT 1",
                CLIENT_COLUMNS
            ))
            .fetch_optional(db)
            .await?,
        }
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Power BI client not found")))?;

        if !client.has_complete_credentials() {
            warn!(client.id = %client.id, "Power BI client has incomplete credentials");
            return Err(AppError::internal_error(
                "Power BI client credentials are incomplete",
            ));
        }

        Ok(PowerBiCredentials {
            cache_key: id
                .map(|id| id.to_string())
                .unwrap_or_else(|| DEFAULT_CACHE_KEY.to_string()),
            tenant_id: client.tenant_id,
            client_id: client.client_id,
            client_secret: client.client_secret,
        })
    }
}
