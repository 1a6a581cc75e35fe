use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Claims embedded in access tokens.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Claims {
    /// User ID (subject claim)
    pub sub: String,
    pub email: String,
    /// Role slug: `admin_master`, `admin` or `user`
    pub role: String,
    /// Permissions granted by `role` at issue time
    pub permissions: Vec<String>,
    /// Expiration (Unix timestamp)
    pub exp: usize,
    /// Issued-at (Unix timestamp)
    pub iat: usize,
}

/// Claims embedded in refresh tokens. They carry no role so a role change
/// takes effect on the next refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshTokenClaims {
    pub sub: String,
    pub email: String,
    pub exp: usize,
    pub iat: usize,
    /// Unique token identifier
    pub jti: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_serialize() {
        let claims = Claims {
            sub: "user-id-123".to_string(),
            email: "ana@example.com".to_string(),
            role: "admin".to_string(),
            permissions: vec!["reports:view".to_string()],
            exp: 1234567890,
            iat: 1234567800,
        };
        let serialized = serde_json::to_string(&claims).unwrap();
        assert!(serialized.contains(r#""role":"admin""#));
        assert!(serialized.contains(r#""permissions":["reports:view"]"#));
    }

    #[test]
    fn test_access_claims_reject_refresh_shape() {
        let json = r#"{"sub":"u","email":"e@x.com","exp":9999999999,"iat":1,"jti":"abc"}"#;
        assert!(serde_json::from_str::<Claims>(json).is_err());
        assert!(serde_json::from_str::<RefreshTokenClaims>(json).is_ok());
    }
}
