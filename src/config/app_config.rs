//! # 应用配置结构定义

use serde::{Deserialize, Serialize};

/// 应用主配置结构
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP 服务配置
    pub server: ServerConfig,
    /// 数据库配置
    pub database: super::DatabaseConfig,
    /// 认证配置
    pub auth: AuthConfig,
    /// 图片上传配置
    pub uploads: UploadConfig,
}

/// HTTP 服务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 监听地址
    pub bind_address: String,
    /// 监听端口
    pub port: u16,
    /// 所有接口的路由前缀
    pub api_prefix: String,
    /// 是否启用 CORS
    pub enable_cors: bool,
    /// 允许的跨域来源，`*` 表示任意来源
    pub cors_origins: Vec<String>,
    /// 请求体大小上限（字节）
    pub max_request_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 5000,
            api_prefix: "/api".to_string(),
            enable_cors: true,
            cors_origins: vec!["*".to_string()],
            max_request_size: 10 * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    /// 监听的 socket 地址字符串
    #[must_use]
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

/// 认证配置
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HS256 签名密钥
    pub jwt_secret: String,
    /// 令牌有效期（秒）
    pub jwt_expires_in: i64,
    /// 签发者
    pub issuer: String,
    /// 受众
    pub audience: String,
    /// bcrypt 计算成本
    pub bcrypt_cost: u32,
    /// 启动时确保存在的超级管理员
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "lost-found-development-secret".to_string(),
            jwt_expires_in: 7 * 24 * 3600,
            issuer: "lost-found".to_string(),
            audience: "lost-found-users".to_string(),
            bcrypt_cost: bcrypt::DEFAULT_COST,
            bootstrap_admin: None,
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"***")
            .field("jwt_expires_in", &self.jwt_expires_in)
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("bootstrap_admin", &self.bootstrap_admin)
            .finish()
    }
}

/// 初始超级管理员账号
#[derive(Clone, Serialize, Deserialize)]
pub struct BootstrapAdmin {
    /// 显示名称
    #[serde(default = "default_admin_name")]
    pub name: String,
    /// 登录邮箱
    pub email: String,
    /// 初始密码
    pub password: String,
}

fn default_admin_name() -> String {
    "Super Admin".to_string()
}

impl std::fmt::Debug for BootstrapAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapAdmin")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

/// 图片上传配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// 文件存放目录
    pub dir: String,
    /// 对外访问路径前缀
    pub public_path: String,
    /// 单个文件大小上限（字节）
    pub max_file_size: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            dir: "uploads".to_string(),
            public_path: "/uploads".to_string(),
            max_file_size: 5 * 1024 * 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [server]
            port = 8080

            [auth]
            jwt_secret = "a-very-long-test-secret"

            [auth.bootstrap_admin]
            email = "root@campus.edu"
            password = "changeme123"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.api_prefix, "/api");
        assert_eq!(config.auth.jwt_expires_in, 604_800);
        assert_eq!(config.uploads.public_path, "/uploads");

        let admin = config.auth.bootstrap_admin.unwrap();
        assert_eq!(admin.name, "Super Admin");
        assert_eq!(admin.email, "root@campus.edu");
    }

    #[test]
    fn debug_output_masks_secrets() {
        let mut auth = AuthConfig::default();
        auth.bootstrap_admin = Some(BootstrapAdmin {
            name: "Root".to_string(),
            email: "root@campus.edu".to_string(),
            password: "hunter22".to_string(),
        });

        let rendered = format!("{auth:?}");
        assert!(!rendered.contains("lost-found-development-secret"));
        assert!(!rendered.contains("hunter22"));
    }
}
