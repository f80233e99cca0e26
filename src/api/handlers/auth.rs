//! # 账号处理器

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::Response,
};

use super::{json_body, path_id};
use crate::api::middleware::RequestId;
use crate::api::response;
use crate::api::server::AppState;
use crate::api::services::{AuthService, LoginRequest, RegisterRequest, UpdateRoleRequest};
use crate::auth::AuthContext;
use crate::logging::{LogComponent, LogStage, log_api_error};
use crate::linfo;

fn service(state: &AppState) -> AuthService<'_> {
    AuthService::new(&state.database, &state.jwt_manager, state.config.auth.bcrypt_cost)
}

/// 注册
pub async fn register(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Response {
    let result = match json_body(body) {
        Ok(request) => service(&state).register(&request).await,
        Err(err) => Err(err),
    };

    match result {
        Ok(session) => {
            linfo!(
                request_id,
                LogStage::BusinessLogic,
                LogComponent::Auth,
                "register_ok",
                "新用户注册",
                user_id = session.user.user_id
            );
            response::fields(StatusCode::CREATED, session, "User registered successfully")
        }
        Err(err) => {
            log_api_error(
                &request_id,
                LogStage::BusinessLogic,
                LogComponent::Auth,
                "register_fail",
                "注册失败",
                &err,
            );
            response::app_error(err)
        }
    }
}

/// 登录
pub async fn login(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Response {
    let result = match json_body(body) {
        Ok(request) => service(&state).login(&request).await,
        Err(err) => Err(err),
    };

    match result {
        Ok(session) => response::fields(StatusCode::OK, session, "Login successful"),
        Err(err) => {
            log_api_error(
                &request_id,
                LogStage::Authentication,
                LogComponent::Auth,
                "login_fail",
                "登录失败",
                &err,
            );
            response::app_error(err)
        }
    }
}

/// 当前用户
pub async fn me(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Extension(auth): Extension<Arc<AuthContext>>,
) -> Response {
    match service(&state).me(&auth).await {
        Ok(user) => response::success("user", user),
        Err(err) => {
            log_api_error(
                &request_id,
                LogStage::BusinessLogic,
                LogComponent::Auth,
                "me_fail",
                "获取当前用户失败",
                &err,
            );
            response::app_error(err)
        }
    }
}

/// 超级管理员修改用户角色
pub async fn update_user_role(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Extension(auth): Extension<Arc<AuthContext>>,
    path: Result<Path<i32>, PathRejection>,
    body: Result<Json<UpdateRoleRequest>, JsonRejection>,
) -> Response {
    let result = match (path_id(path), json_body(body)) {
        (Ok(user_id), Ok(request)) => service(&state).update_role(&auth, user_id, &request).await,
        (Err(err), _) | (_, Err(err)) => Err(err),
    };

    match result {
        Ok(user) => response::success_with_message("user", user, "User role updated successfully"),
        Err(err) => {
            log_api_error(
                &request_id,
                LogStage::BusinessLogic,
                LogComponent::Admin,
                "update_role_fail",
                "修改用户角色失败",
                &err,
            );
            response::app_error(err)
        }
    }
}
