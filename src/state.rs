use sqlx::PgPool;

use dashgate_config::{CorsConfig, JwtConfig, PowerBiConfig, RateLimitConfig};
use dashgate_db::init_db_pool;
use dashgate_powerbi::PowerBiApi;

#[derive(Clone, Debug)]
pub struct AppState {
    pub db: PgPool,
    pub jwt_config: JwtConfig,
    pub cors_config: CorsConfig,
    pub rate_limit_config: RateLimitConfig,
    /// Shared Power BI client; clones share the access-token cache.
    pub powerbi: PowerBiApi,
}

impl AppState {
    /// Builds state around an existing pool, reading everything else from the environment.
    pub fn from_pool(db: PgPool) -> Result<Self, dashgate_powerbi::PowerBiError> {
        Ok(Self {
            db,
            jwt_config: JwtConfig::from_env(),
            cors_config: CorsConfig::from_env(),
            rate_limit_config: RateLimitConfig::from_env(),
            powerbi: PowerBiApi::new(PowerBiConfig::from_env())?,
        })
    }
}

/// Connects to the database, applies pending migrations and loads configuration.
///
/// # Panics
///
/// Panics when the database is unreachable, a migration fails or the HTTP
/// client cannot be built.
pub async fn init_app_state() -> AppState {
    let db = init_db_pool().await;

    sqlx::migrate!("./migrations")
        .run(&db)
        .await
        .expect("Failed to run database migrations");

    AppState::from_pool(db).expect("Failed to build Power BI client")
}
