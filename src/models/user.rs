//! Bearer token claims and role checks

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Deserializer, Serialize};

use crate::{config::AuthConfig, error::AppError};

/// Role required for catalog changes
pub const ADMINISTRATOR_ROLE: &str = "Administrator";

/// JWT claims for authenticated users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Accepts `roles`, `role` and the ASP.NET identity role claim
    #[serde(
        default,
        alias = "role",
        alias = "http://schemas.microsoft.com/ws/2008/06/identity/claims/role",
        deserialize_with = "one_or_many"
    )]
    pub roles: Vec<String>,
    pub exp: i64,
    pub iat: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
}

/// Role claims arrive either as a single string or as an array
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(role) => vec![role],
        OneOrMany::Many(roles) => roles,
    })
}

impl UserClaims {
    /// Claims valid for `ttl` from now
    pub fn new(sub: impl Into<String>, roles: Vec<String>, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: sub.into(),
            email: None,
            roles,
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
            iss: None,
            aud: None,
        }
    }

    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse and verify a JWT token against the configured secret, issuer and audience
    pub fn from_token(token: &str, config: &AuthConfig) -> Result<Self, jsonwebtoken::errors::Error> {
        let mut validation = Validation::new(Algorithm::HS256);
        let mut required = vec!["exp"];
        if let Some(issuer) = &config.jwt_issuer {
            validation.set_issuer(&[issuer]);
            required.push("iss");
        }
        match &config.jwt_audience {
            Some(audience) => {
                validation.set_audience(&[audience]);
                required.push("aud");
            }
            None => validation.validate_aud = false,
        }
        // Configured iss/aud must be present, not just matching when present
        validation.set_required_spec_claims(&required);

        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            &validation,
        )?;
        Ok(token_data.claims)
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Require a role claim, e.g. [`ADMINISTRATOR_ROLE`]
    pub fn require_role(&self, role: &str) -> Result<(), AppError> {
        if self.has_role(role) {
            Ok(())
        } else {
            Err(AppError::Authorization(format!("{} role required", role)))
        }
    }
}
