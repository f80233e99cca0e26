//! # 配置管理器
//!
//! 按 `--config` 参数、`LOST_FOUND_CONFIG_PATH`、`config/config.<RUST_ENV>.toml`
//! 的顺序定位配置文件，再叠加 `LOST_FOUND_` 前缀的环境变量覆盖。

use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use super::{AppConfig, BootstrapAdmin};
use crate::error::{RegistryError, Result};
use crate::{ldebug, linfo, lwarn, logging::{LogComponent, LogStage}};

/// 环境变量覆盖前缀
pub const ENV_PREFIX: &str = "LOST_FOUND_";

/// 指定配置文件路径的环境变量
pub const CONFIG_PATH_ENV: &str = "LOST_FOUND_CONFIG_PATH";

/// 配置管理器
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: Arc<AppConfig>,
    source: Option<PathBuf>,
}

impl ConfigManager {
    /// 定位并加载配置
    ///
    /// 显式指定的文件不存在时报错；默认路径不存在时使用内置默认值。
    pub fn load(cli_path: Option<&Path>) -> Result<Self> {
        let explicit = cli_path
            .map(Path::to_path_buf)
            .or_else(|| env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from));

        let (config, source) = if let Some(path) = explicit {
            (Self::load_config_file(&path)?, Some(path))
        } else {
            let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
            let default_path = PathBuf::from(format!("config/config.{env_name}.toml"));
            if default_path.exists() {
                (Self::load_config_file(&default_path)?, Some(default_path))
            } else {
                lwarn!(
                    "system",
                    LogStage::Startup,
                    LogComponent::Config,
                    "config_file_missing",
                    &format!("配置文件不存在，使用默认配置: {}", default_path.display())
                );
                (AppConfig::default(), None)
            }
        };

        Self::finish(config, source, env::vars())
    }

    /// 从指定文件加载配置
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config = Self::load_config_file(path)?;
        Self::finish(config, Some(path.to_path_buf()), env::vars())
    }

    /// 叠加环境变量覆盖并校验
    fn finish(
        mut config: AppConfig,
        source: Option<PathBuf>,
        vars: impl IntoIterator<Item = (String, String)>,
    ) -> Result<Self> {
        let overrides = Self::collect_env_overrides(vars);
        Self::apply_env_overrides(&mut config, &overrides)?;
        super::validate_config(&config)?;

        linfo!(
            "system",
            LogStage::Startup,
            LogComponent::Config,
            "config_loaded",
            &format!(
                "配置加载完成: source={}, overrides={}",
                source
                    .as_ref()
                    .map_or_else(|| "defaults".to_string(), |p| p.display().to_string()),
                overrides.len()
            )
        );

        Ok(Self {
            config: Arc::new(config),
            source,
        })
    }

    /// 当前配置
    #[must_use]
    pub fn config(&self) -> Arc<AppConfig> {
        Arc::clone(&self.config)
    }

    /// 配置文件路径，使用默认值时为 `None`
    #[must_use]
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// 加载配置文件
    fn load_config_file(path: &Path) -> Result<AppConfig> {
        if !path.exists() {
            return Err(RegistryError::config(format!(
                "配置文件不存在: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            RegistryError::config_with_source(format!("读取配置文件失败: {}", path.display()), e)
        })?;

        toml::from_str(&content).map_err(|e| {
            RegistryError::config_with_source(
                format!("TOML解析失败 - 配置文件: {}, 详细错误: {e}", path.display()),
                e,
            )
        })
    }

    /// 构建环境变量覆盖映射
    ///
    /// `LOST_FOUND_AUTH_JWT_SECRET` -> `("auth", "jwt_secret")`
    fn collect_env_overrides(
        vars: impl IntoIterator<Item = (String, String)>,
    ) -> HashMap<(String, String), String> {
        vars.into_iter()
            .filter(|(key, _)| key != CONFIG_PATH_ENV)
            .filter_map(|(key, value)| {
                let rest = key.strip_prefix(ENV_PREFIX)?.to_lowercase();
                let (section, field) = rest.split_once('_')?;
                Some(((section.to_string(), field.to_string()), value))
            })
            .collect()
    }

    /// 应用环境变量覆盖
    fn apply_env_overrides(
        config: &mut AppConfig,
        overrides: &HashMap<(String, String), String>,
    ) -> Result<()> {
        for ((section, field), value) in overrides {
            let sensitive = field.contains("secret") || field.contains("password");
            ldebug!(
                "system",
                LogStage::Startup,
                LogComponent::Config,
                "env_override",
                &format!(
                    "应用环境变量覆盖: {section}.{field} = {}",
                    if sensitive { "***" } else { value.as_str() }
                )
            );
            Self::apply_override_to_config(config, section, field, value)?;
        }
        Ok(())
    }

    /// 将单个覆盖项写入配置对象
    fn apply_override_to_config(
        config: &mut AppConfig,
        section: &str,
        field: &str,
        value: &str,
    ) -> Result<()> {
        match (section, field) {
            ("server", "bind_address") => config.server.bind_address = value.to_string(),
            ("server", "port") => config.server.port = parse_value("server.port", value)?,
            ("server", "api_prefix") => config.server.api_prefix = value.to_string(),
            ("server", "enable_cors") => {
                config.server.enable_cors = parse_value("server.enable_cors", value)?;
            }
            ("server", "cors_origins") => {
                config.server.cors_origins = value
                    .split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty())
                    .map(str::to_string)
                    .collect();
            }
            ("server", "max_request_size") => {
                config.server.max_request_size = parse_value("server.max_request_size", value)?;
            }
            ("database", "url") => config.database.url = value.to_string(),
            ("database", "max_connections") => {
                config.database.max_connections = parse_value("database.max_connections", value)?;
            }
            ("database", "connect_timeout") => {
                config.database.connect_timeout = parse_value("database.connect_timeout", value)?;
            }
            ("auth", "jwt_secret") => config.auth.jwt_secret = value.to_string(),
            ("auth", "jwt_expires_in") => {
                config.auth.jwt_expires_in = parse_value("auth.jwt_expires_in", value)?;
            }
            ("auth", "bcrypt_cost") => {
                config.auth.bcrypt_cost = parse_value("auth.bcrypt_cost", value)?;
            }
            ("auth", "admin_name") => bootstrap_admin(config).name = value.to_string(),
            ("auth", "admin_email") => bootstrap_admin(config).email = value.to_string(),
            ("auth", "admin_password") => bootstrap_admin(config).password = value.to_string(),
            ("uploads", "dir") => config.uploads.dir = value.to_string(),
            ("uploads", "public_path") => config.uploads.public_path = value.to_string(),
            ("uploads", "max_file_size") => {
                config.uploads.max_file_size = parse_value("uploads.max_file_size", value)?;
            }
            _ => {
                lwarn!(
                    "system",
                    LogStage::Startup,
                    LogComponent::Config,
                    "unknown_env_override",
                    &format!("未知的配置路径，忽略环境变量覆盖: {section}.{field}")
                );
            }
        }
        Ok(())
    }
}

fn bootstrap_admin(config: &mut AppConfig) -> &mut BootstrapAdmin {
    config.auth.bootstrap_admin.get_or_insert_with(|| BootstrapAdmin {
        name: "Super Admin".to_string(),
        email: String::new(),
        password: String::new(),
    })
}

fn parse_value<T>(path: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value.parse().map_err(|e| {
        RegistryError::config_with_source(format!("无效的配置值 {path}: {value}"), e)
    })
}
