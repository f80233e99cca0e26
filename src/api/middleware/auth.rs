//! # 认证中间件
//!
//! 从请求头中提取JWT，验证后把 [`AuthContext`] 注入到请求扩展中；
//! 角色分级中间件只读取该扩展。

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use super::request_id::RequestId;
use crate::api::{response, server::AppState};
use crate::auth::{AuthContext, RoleGate, utils::AuthUtils};
use crate::error::{RegistryError, Result};
use crate::{ldebug, lwarn, logging::{LogComponent, LogStage}};

/// Axum认证中间件
pub async fn auth(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .cloned()
        .unwrap_or_default();

    match authenticate(&state, &request) {
        Ok(auth_context) => {
            ldebug!(
                request_id,
                LogStage::Authentication,
                LogComponent::Auth,
                "token_verified",
                "令牌校验通过",
                user_id = auth_context.user_id,
                role = auth_context.role
            );
            request.extensions_mut().insert(Arc::new(auth_context));
            next.run(request).await
        }
        Err(err) => {
            let token = AuthUtils::extract_authorization_header(request.headers())
                .and_then(AuthUtils::extract_bearer_token)
                .map(AuthUtils::sanitize_token_for_logging)
                .unwrap_or_default();
            lwarn!(
                request_id,
                LogStage::Authentication,
                LogComponent::Auth,
                "token_rejected",
                "请求未通过认证",
                path = request.uri().path(),
                token = token,
                error = err
            );
            response::app_error(err)
        }
    }
}

fn authenticate(state: &AppState, request: &Request) -> Result<AuthContext> {
    let token = AuthUtils::extract_authorization_header(request.headers())
        .and_then(AuthUtils::extract_bearer_token)
        .ok_or_else(|| RegistryError::authentication("No token provided"))?;

    let claims = state.jwt_manager.validate_token(token)?;
    AuthContext::from_claims(&claims)
}

/// 仅允许 admin 与 super_admin
pub async fn require_admin(request: Request, next: Next) -> Response {
    gate(RoleGate::Admin, request, next).await
}

/// 仅允许 super_admin
pub async fn require_super_admin(request: Request, next: Next) -> Response {
    gate(RoleGate::SuperAdmin, request, next).await
}

async fn gate(gate: RoleGate, request: Request, next: Next) -> Response {
    let Some(auth_context) = request.extensions().get::<Arc<AuthContext>>().cloned() else {
        return response::app_error(RegistryError::authentication("No token provided"));
    };

    if let Err(err) = gate.check(auth_context.role) {
        let request_id = request
            .extensions()
            .get::<RequestId>()
            .cloned()
            .unwrap_or_default();
        lwarn!(
            request_id,
            LogStage::Authorization,
            LogComponent::Auth,
            "role_denied",
            "角色权限不足",
            user_id = auth_context.user_id,
            role = auth_context.role,
            path = request.uri().path()
        );
        return response::app_error(err);
    }

    next.run(request).await
}
