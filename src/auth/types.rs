//! # 认证类型定义

use chrono::Utc;
use entity::UserRole;
use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, Result};

/// JWT 载荷
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    /// 用户ID
    pub sub: String,
    /// 角色
    pub role: UserRole,
    /// 签发时间
    pub iat: i64,
    /// 过期时间
    pub exp: i64,
    /// 签发者
    pub iss: String,
    /// 受众
    pub aud: String,
    /// JWT ID
    pub jti: String,
}

impl JwtClaims {
    /// 创建新的 JWT 载荷
    #[must_use]
    pub fn new(
        user_id: i32,
        role: UserRole,
        expires_in_seconds: i64,
        issuer: &str,
        audience: &str,
    ) -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub: user_id.to_string(),
            role,
            iat: now,
            exp: now + expires_in_seconds,
            iss: issuer.to_string(),
            aud: audience.to_string(),
            jti: uuid::Uuid::new_v4().to_string(),
        }
    }

    /// 获取用户ID
    pub fn user_id(&self) -> Result<i32> {
        self.sub
            .parse()
            .map_err(|_| RegistryError::authentication("Invalid token"))
    }
}

/// 当前请求的调用者身份
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthContext {
    /// 用户ID
    pub user_id: i32,
    /// 角色
    pub role: UserRole,
}

impl AuthContext {
    /// 从已校验的载荷构造
    pub fn from_claims(claims: &JwtClaims) -> Result<Self> {
        Ok(Self {
            user_id: claims.user_id()?,
            role: claims.role,
        })
    }

    /// 是否为资源所有者
    #[must_use]
    pub const fn owns(&self, owner_id: i32) -> bool {
        self.user_id == owner_id
    }
}
