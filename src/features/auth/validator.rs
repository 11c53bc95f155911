use super::model::AuthenticatedUser;
use crate::core::error::AppError;
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use std::time::Duration;

/// Validates HS256 bearer tokens signed with the shared `JWT_SECRET`.
pub struct JwtValidator {
    decoding_key: DecodingKey,
    leeway: u64,
}

#[derive(Debug, Clone, Deserialize)]
struct Claims {
    #[serde(alias = "userId")]
    sub: String,
    #[serde(rename = "exp")]
    _exp: u64,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    roles: Vec<String>,
    /// Refresh tokens carry `"type": "refresh"` and are not accepted here
    #[serde(rename = "type", default)]
    token_type: Option<String>,
}

impl JwtValidator {
    pub fn new(secret: &str, leeway: Duration) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            leeway: leeway.as_secs(),
        }
    }

    pub fn validate_token(&self, token: &str) -> Result<AuthenticatedUser, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = self.leeway;
        validation.validate_nbf = true;

        let token_data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::ExpiredSignature => AppError::Auth("Token expired".to_string()),
                    _ => AppError::Auth("Invalid token".to_string()),
                }
            })?;

        let claims = token_data.claims;

        if claims.token_type.as_deref() == Some("refresh") {
            return Err(AppError::Auth("Token is not an access token".to_string()));
        }

        let mut roles = claims.roles;
        if let Some(role) = claims.role {
            if !roles.contains(&role) {
                roles.push(role);
            }
        }

        Ok(AuthenticatedUser {
            sub: claims.sub,
            name: claims.name,
            roles,
        })
    }
}
