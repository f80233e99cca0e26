//! # 外部错误到 `RegistryError` 的转换

use axum::extract::multipart::MultipartError;
use sea_orm::DbErr;

use super::RegistryError;

impl From<DbErr> for RegistryError {
    fn from(err: DbErr) -> Self {
        Self::database_with_source("数据库操作失败", err)
    }
}

impl From<std::io::Error> for RegistryError {
    fn from(err: std::io::Error) -> Self {
        Self::io("文件操作失败", err)
    }
}

impl From<toml::de::Error> for RegistryError {
    fn from(err: toml::de::Error) -> Self {
        Self::config_with_source("TOML解析失败", err)
    }
}

impl From<serde_json::Error> for RegistryError {
    fn from(err: serde_json::Error) -> Self {
        Self::internal_with_source("JSON序列化失败", err)
    }
}

/// 任何无法解码的令牌对客户端都只报告 `Invalid token`
impl From<jsonwebtoken::errors::Error> for RegistryError {
    fn from(_err: jsonwebtoken::errors::Error) -> Self {
        Self::authentication("Invalid token")
    }
}

impl From<bcrypt::BcryptError> for RegistryError {
    fn from(err: bcrypt::BcryptError) -> Self {
        Self::internal_with_source("密码哈希处理失败", err)
    }
}

impl From<MultipartError> for RegistryError {
    fn from(err: MultipartError) -> Self {
        Self::validation(format!("Invalid multipart body: {}", err.body_text()))
    }
}
