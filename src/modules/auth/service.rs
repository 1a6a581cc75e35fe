use sqlx::PgPool;
use tracing::{info, instrument, warn};

use dashgate_auth::{create_access_token, create_refresh_token, verify_refresh_token};
use dashgate_config::JwtConfig;
use dashgate_core::{AppError, verify_password};
use dashgate_models::{LoginRequest, LoginResponse, TokenPairResponse, UserCredentials, UserId};

use crate::metrics;
use crate::modules::users::UserService;

pub struct AuthService;

impl AuthService {
    fn issue_tokens(
        credentials: &UserCredentials,
        jwt_config: &JwtConfig,
    ) -> Result<TokenPairResponse, AppError> {
        let user_id = credentials.id.into_inner();
        let email = credentials.email.as_str();

        Ok(TokenPairResponse {
            access_token: create_access_token(
                user_id,
                email,
                credentials.role.as_str(),
                jwt_config,
            )?,
            refresh_token: create_refresh_token(user_id, email, jwt_config)?,
        })
    }

    /// Verifies email and password and issues an access/refresh token pair.
    ///
    /// Unknown email and wrong password are indistinguishable to the caller.
    #[instrument(skip(db, dto, jwt_config), fields(user.email = %dto.email))]
    pub async fn login(
        db: &PgPool,
        dto: LoginRequest,
        jwt_config: &JwtConfig,
    ) -> Result<LoginResponse, AppError> {
        let invalid = || AppError::unauthorized("Invalid email or password");

        let Some(credentials) = UserService::find_credentials_by_email(db, &dto.email).await?
        else {
            metrics::track_login_failure("unknown_email");
            return Err(invalid());
        };

        if !verify_password(&dto.password, &credentials.password_hash)? {
            metrics::track_login_failure("wrong_password");
            warn!(user.id = %credentials.id, "Login with wrong password");
            return Err(invalid());
        }

        if !credentials.is_active {
            metrics::track_login_failure("inactive");
            return Err(AppError::forbidden("Account is disabled"));
        }

        let tokens = Self::issue_tokens(&credentials, jwt_config)?;
        let user = UserService::get_user(db, credentials.id).await?;

        metrics::track_login_success(credentials.role.as_str());
        info!(user.id = %credentials.id, user.role = %credentials.role, "User logged in");

        Ok(LoginResponse {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            permissions: credentials
                .role
                .permissions()
                .iter()
                .map(|p| p.to_string())
                .collect(),
            user,
        })
    }

    /// Exchanges a refresh token for a new pair.
    ///
    /// The role is re-read, so a role change takes effect on the next refresh.
    #[instrument(skip_all)]
    pub async fn refresh(
        db: &PgPool,
        refresh_token: &str,
        jwt_config: &JwtConfig,
    ) -> Result<TokenPairResponse, AppError> {
        let claims = verify_refresh_token(refresh_token, jwt_config)?;
        let user_id: UserId = claims
            .sub
            .parse()
            .map_err(|_| AppError::unauthorized("Invalid user ID in token"))?;

        let credentials = UserService::find_credentials_by_id(db, user_id)
            .await?
            .ok_or_else(|| AppError::unauthorized("User no longer exists"))?;

        if !credentials.is_active {
            return Err(AppError::forbidden("Account is disabled"));
        }

        Self::issue_tokens(&credentials, jwt_config)
    }
}
