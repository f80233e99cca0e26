//! # 日志配置模块
//!
//! 初始化 `tracing` 订阅器，并提供带请求 ID、阶段与组件字段的结构化日志宏

use std::env;
use std::fmt;

use tracing_subscriber::{
    EnvFilter, fmt as fmt_layer, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::error::{ErrorCategory, RegistryError};

/// 日志所处的处理阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogStage {
    /// 启动
    Startup,
    /// 关闭
    Shutdown,
    /// 请求进入
    RequestStart,
    /// 身份认证
    Authentication,
    /// 权限校验
    Authorization,
    /// 业务处理
    BusinessLogic,
    /// 数据库读写
    Db,
    /// 响应失败
    ResponseFailure,
}

impl LogStage {
    /// 日志字段中的取值
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Startup => "startup",
            Self::Shutdown => "shutdown",
            Self::RequestStart => "request_start",
            Self::Authentication => "authentication",
            Self::Authorization => "authorization",
            Self::BusinessLogic => "business_logic",
            Self::Db => "db",
            Self::ResponseFailure => "response_failure",
        }
    }
}

impl fmt::Display for LogStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 产生日志的组件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogComponent {
    /// 进程入口
    Main,
    /// 配置加载
    Config,
    /// 数据库
    Database,
    /// HTTP 服务装配
    ServerSetup,
    /// 认证与账号
    Auth,
    /// 物品
    Items,
    /// 匹配记录
    Matches,
    /// 管理后台
    Admin,
    /// 图片上传
    Uploads,
    /// 操作审计日志
    AuditLog,
}

impl LogComponent {
    /// 日志字段中的取值
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Config => "config",
            Self::Database => "database",
            Self::ServerSetup => "server_setup",
            Self::Auth => "auth",
            Self::Items => "items",
            Self::Matches => "matches",
            Self::Admin => "admin",
            Self::Uploads => "uploads",
            Self::AuditLog => "audit_log",
        }
    }
}

impl fmt::Display for LogComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 信息级结构化日志
///
/// `linfo!(request_id, LogStage::.., LogComponent::.., "operation", "message", key = value, ..)`
#[macro_export]
macro_rules! linfo {
    ($request_id:expr, $stage:expr, $component:expr, $operation:expr, $message:expr $(, $key:ident = $value:expr)* $(,)?) => {
        ::tracing::info!(
            request_id = %$request_id,
            stage = %$stage,
            component = %$component,
            operation = $operation,
            $($key = %$value,)*
            "{}",
            $message
        )
    };
}

/// 警告级结构化日志
#[macro_export]
macro_rules! lwarn {
    ($request_id:expr, $stage:expr, $component:expr, $operation:expr, $message:expr $(, $key:ident = $value:expr)* $(,)?) => {
        ::tracing::warn!(
            request_id = %$request_id,
            stage = %$stage,
            component = %$component,
            operation = $operation,
            $($key = %$value,)*
            "{}",
            $message
        )
    };
}

/// 错误级结构化日志
#[macro_export]
macro_rules! lerror {
    ($request_id:expr, $stage:expr, $component:expr, $operation:expr, $message:expr $(, $key:ident = $value:expr)* $(,)?) => {
        ::tracing::error!(
            request_id = %$request_id,
            stage = %$stage,
            component = %$component,
            operation = $operation,
            $($key = %$value,)*
            "{}",
            $message
        )
    };
}

/// 调试级结构化日志
#[macro_export]
macro_rules! ldebug {
    ($request_id:expr, $stage:expr, $component:expr, $operation:expr, $message:expr $(, $key:ident = $value:expr)* $(,)?) => {
        ::tracing::debug!(
            request_id = %$request_id,
            stage = %$stage,
            component = %$component,
            operation = $operation,
            $($key = %$value,)*
            "{}",
            $message
        )
    };
}

/// 默认过滤规则：关闭 SQL 明细日志
fn default_filter(level: &str) -> String {
    format!("{level},lost_found=debug,sqlx::query=off,sea_orm::query=warn,sqlx=warn")
}

/// 初始化日志系统
///
/// `RUST_LOG` 存在时优先使用，否则使用默认过滤规则。
pub fn init_logging(log_level: Option<&str>) {
    let level = log_level.unwrap_or("info");
    let log_filter = env::var("RUST_LOG").unwrap_or_else(|_| default_filter(level));

    let result = tracing_subscriber::registry()
        .with(
            EnvFilter::try_new(&log_filter)
                .unwrap_or_else(|_| EnvFilter::new(default_filter(level))),
        )
        .with(
            fmt_layer::layer()
                .with_target(true)
                .with_level(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .try_init();

    if result.is_err() {
        tracing::debug!("日志订阅器已初始化，跳过");
    }
}

/// 记录接口处理失败
///
/// 客户端错误记为 warn，服务端错误连同完整错误链记为 error。
pub fn log_api_error(
    request_id: &dyn fmt::Display,
    stage: LogStage,
    component: LogComponent,
    operation: &str,
    description: &str,
    err: &RegistryError,
) {
    match err.category() {
        ErrorCategory::Client => {
            lwarn!(request_id, stage, component, operation, description, error = err);
        }
        ErrorCategory::Server => {
            lerror!(
                request_id,
                stage,
                component,
                operation,
                description,
                error = format!("{err:?}")
            );
        }
    }
}
