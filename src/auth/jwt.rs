//! JWT token management
//!
//! HS256 签发与校验；过期、签名、签发者或受众不符都视为无效令牌。

use entity::UserRole;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use crate::auth::types::JwtClaims;
use crate::config::AuthConfig;
use crate::error::{RegistryError, Result};

/// JWT token manager
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    expires_in: i64,
    issuer: String,
    audience: String,
}

impl JwtManager {
    /// Create new JWT manager
    #[must_use]
    pub fn new(config: &AuthConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_audience(&[config.audience.as_str()]);
        validation.validate_exp = true;
        validation.validate_nbf = false;
        validation.leeway = 30;

        Self {
            encoding_key,
            decoding_key,
            validation,
            expires_in: config.jwt_expires_in,
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
        }
    }

    /// Generate access token
    pub fn generate_token(&self, user_id: i32, role: UserRole) -> Result<String> {
        let claims = JwtClaims::new(user_id, role, self.expires_in, &self.issuer, &self.audience);

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| RegistryError::internal_with_source("Token generation failed", e))
    }

    /// Validate and parse token
    pub fn validate_token(&self, token: &str) -> Result<JwtClaims> {
        let token_data = decode::<JwtClaims>(token, &self.decoding_key, &self.validation)?;
        Ok(token_data.claims)
    }

    /// 令牌有效期（秒）
    #[must_use]
    pub const fn expires_in(&self) -> i64 {
        self.expires_in
    }
}

impl std::fmt::Debug for JwtManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtManager")
            .field("expires_in", &self.expires_in)
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .finish_non_exhaustive()
    }
}
