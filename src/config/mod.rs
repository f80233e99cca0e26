//! # 配置管理模块
//!
//! 处理应用配置加载、验证和管理

mod app_config;
mod database;
mod manager;

pub use app_config::{AppConfig, AuthConfig, BootstrapAdmin, ServerConfig, UploadConfig};
pub use database::DatabaseConfig;
pub use manager::{CONFIG_PATH_ENV, ConfigManager, ENV_PREFIX};

use crate::error::{RegistryError, Result};

/// JWT 密钥的最小长度
pub const MIN_JWT_SECRET_LEN: usize = 16;

/// 验证配置的有效性
pub fn validate_config(config: &AppConfig) -> Result<()> {
    if config.database.url.trim().is_empty() {
        return Err(RegistryError::config("数据库URL不能为空"));
    }

    if config.database.max_connections == 0 {
        return Err(RegistryError::config("数据库最大连接数必须大于0"));
    }

    if config.server.port == 0 {
        return Err(RegistryError::config("服务端口必须大于0"));
    }

    if !config.server.api_prefix.starts_with('/') {
        return Err(RegistryError::config(format!(
            "API前缀必须以 / 开头: {}",
            config.server.api_prefix
        )));
    }

    if config.auth.jwt_secret.len() < MIN_JWT_SECRET_LEN {
        return Err(RegistryError::config(format!(
            "JWT密钥长度至少为 {MIN_JWT_SECRET_LEN} 个字符"
        )));
    }

    if config.auth.jwt_expires_in <= 0 {
        return Err(RegistryError::config("JWT过期时间必须大于0"));
    }

    if !(4..=31).contains(&config.auth.bcrypt_cost) {
        return Err(RegistryError::config(format!(
            "bcrypt cost 必须在 4 到 31 之间: {}",
            config.auth.bcrypt_cost
        )));
    }

    if let Some(admin) = &config.auth.bootstrap_admin {
        if admin.email.trim().is_empty() || admin.password.is_empty() {
            return Err(RegistryError::config("初始超级管理员的邮箱和密码不能为空"));
        }
    }

    if !config.uploads.public_path.starts_with('/') {
        return Err(RegistryError::config(format!(
            "上传文件访问路径必须以 / 开头: {}",
            config.uploads.public_path
        )));
    }

    if config.uploads.max_file_size == 0 {
        return Err(RegistryError::config("上传文件大小上限必须大于0"));
    }

    Ok(())
}
