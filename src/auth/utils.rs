//! # 认证工具函数

use axum::http::{HeaderMap, header::AUTHORIZATION};

/// 认证工具函数集合
pub struct AuthUtils;

impl AuthUtils {
    /// 读取 Authorization 头
    #[must_use]
    pub fn extract_authorization_header(headers: &HeaderMap) -> Option<&str> {
        headers.get(AUTHORIZATION).and_then(|value| value.to_str().ok())
    }

    /// 从 Authorization 头中提取 Bearer token
    ///
    /// 非 Bearer 或令牌为空时返回 `None`。
    #[must_use]
    pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
        auth_header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }

    /// 日志中使用的令牌摘要
    #[must_use]
    pub fn sanitize_token_for_logging(token: &str) -> String {
        match token.get(..10) {
            Some(head) if token.len() > 10 => format!("{head}..."),
            _ => "***".to_string(),
        }
    }
}
