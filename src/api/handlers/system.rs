//! # 系统信息处理器

use std::sync::OnceLock;
use std::time::Instant;

use axum::response::Response;
use serde::Serialize;

use crate::api::response;

/// 全局启动时间
static START_TIME: OnceLock<Instant> = OnceLock::new();

/// 记录启动时间
pub fn init_start_time() {
    START_TIME.get_or_init(Instant::now);
}

#[derive(Serialize)]
struct ServiceInfo {
    name: &'static str,
    version: &'static str,
    uptime_seconds: u64,
}

/// 根路径：服务名称与版本
pub async fn root_handler() -> Response {
    response::success(
        "service",
        ServiceInfo {
            name: "Campus Lost & Found",
            version: env!("CARGO_PKG_VERSION"),
            uptime_seconds: START_TIME.get_or_init(Instant::now).elapsed().as_secs(),
        },
    )
}

/// Ping 处理器
pub async fn ping_handler() -> &'static str {
    "pong"
}
